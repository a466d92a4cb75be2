use serde::{Deserialize, Serialize};

use crate::Dice;
use crate::config::QuestConfig;
use crate::error::{GameError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestKind {
    SlayMonsters,
    DefeatBosses,
    EarnGold,
    UseSkills,
    ClearFloors,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestTemplate {
    pub kind: QuestKind,
    /// Inclusive target range.
    pub min: u32,
    pub max: u32,
    pub reward_gold: u32,
    pub reward_xp: u32,
}

/// Things that move quest counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestEvent {
    MonsterSlain,
    BossDefeated,
    GoldEarned(u32),
    SkillUsed,
    FloorCleared,
}

impl QuestEvent {
    fn advances(self, kind: QuestKind) -> Option<u32> {
        match (self, kind) {
            (QuestEvent::MonsterSlain, QuestKind::SlayMonsters)
            | (QuestEvent::BossDefeated, QuestKind::DefeatBosses)
            | (QuestEvent::SkillUsed, QuestKind::UseSkills)
            | (QuestEvent::FloorCleared, QuestKind::ClearFloors) => Some(1),
            (QuestEvent::GoldEarned(amount), QuestKind::EarnGold) => Some(amount),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    pub kind: QuestKind,
    pub description: String,
    pub target: u32,
    pub progress: u32,
    pub reward_gold: u32,
    pub reward_xp: u32,
    pub claimed: bool,
}

impl Quest {
    fn from_template(t: &QuestTemplate, target: u32) -> Self {
        let description = match t.kind {
            QuestKind::SlayMonsters => format!("Slay {} monsters", target),
            QuestKind::DefeatBosses if target == 1 => "Defeat a dungeon boss".to_string(),
            QuestKind::DefeatBosses => format!("Defeat {} dungeon bosses", target),
            QuestKind::EarnGold => format!("Earn {} gold from monsters", target),
            QuestKind::UseSkills => format!("Use skills {} times", target),
            QuestKind::ClearFloors => format!("Clear {} dungeon floors", target),
        };
        Self {
            kind: t.kind,
            description,
            target,
            progress: 0,
            reward_gold: t.reward_gold,
            reward_xp: t.reward_xp,
            claimed: false,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= self.target
    }
}

/// Today's quests. `date` is whatever calendar key the caller uses; the
/// board rerolls whenever it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestBoard {
    pub date: Option<String>,
    pub quests: Vec<Quest>,
}

impl QuestBoard {
    /// Rolls a new board when `date` differs from the stored one. Draws, per
    /// quest: template pick, then target pick. Returns whether it rerolled.
    pub fn refresh(&mut self, date: &str, cfg: &QuestConfig, dice: &mut Dice) -> bool {
        if self.date.as_deref() == Some(date) {
            return false;
        }
        let mut remaining: Vec<&QuestTemplate> = cfg.templates.iter().collect();
        let mut quests = Vec::with_capacity(cfg.per_day);
        while quests.len() < cfg.per_day && !remaining.is_empty() {
            let t = remaining.remove(dice.pick(remaining.len()));
            let span = t.max.saturating_sub(t.min) as usize + 1;
            let target = t.min + dice.pick(span) as u32;
            quests.push(Quest::from_template(t, target.max(1)));
        }
        self.date = Some(date.to_string());
        self.quests = quests;
        tracing::info!(date, count = self.quests.len(), "daily quests rerolled");
        true
    }

    pub fn record(&mut self, event: QuestEvent) {
        for q in self.quests.iter_mut().filter(|q| !q.claimed) {
            if let Some(step) = event.advances(q.kind) {
                q.progress = (q.progress + step).min(q.target);
            }
        }
    }

    /// Marks quest `index` claimed and returns its `(gold, xp)` reward.
    pub fn claim(&mut self, index: usize) -> Result<(u32, u32)> {
        let quest = self.quests.get_mut(index).ok_or(GameError::UnknownQuest(index))?;
        if quest.claimed {
            return Err(GameError::QuestClaimed(quest.description.clone()));
        }
        if !quest.is_complete() {
            return Err(GameError::QuestIncomplete(quest.description.clone()));
        }
        quest.claimed = true;
        Ok((quest.reward_gold, quest.reward_xp))
    }
}
