//! The game state and every operation a front end can drive.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::Dice;
use crate::combat::{MonsterTurn, actions, begin_player_turn, monster_turn};
use crate::config::Difficulty;
use crate::content::{ClassKind, Rules};
use crate::dungeon::{DungeonRun, Monster, Rewards, floors_for, roll_loot, roll_rewards, spawn_monster};
use crate::enhance::{self, EnhanceOutcome};
use crate::error::{GameError, Result};
use crate::items::{Item, Slot};
use crate::player::Player;
use crate::quests::{QuestBoard, QuestEvent};
use crate::skills::{self, SkillDef, SkillKind, SkillNode};
use crate::town::{self, TrainingCosts, TrainingStat};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    Town,
    Dungeon(DungeonRun),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Nothing was decided this turn.
    Ongoing,
    /// A regular floor was cleared; `continue_dungeon` moves on.
    Victory { rewards: Rewards },
    /// The boss fell; the player is back in town.
    DungeonCleared { rewards: Rewards, next_level: u32 },
    Defeat { gold_lost: u32 },
    Escaped,
}

/// What one operation produced: the outcome plus its narration, oldest
/// line first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionReport {
    pub outcome: Outcome,
    pub log: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub player: Player,
    pub difficulty: Difficulty,
    pub dungeon_level: u32,
    pub location: Location,
    pub training: TrainingCosts,
    #[serde(default)]
    pub quests: QuestBoard,
    /// Newest first, bounded by `message_log_len`.
    #[serde(default)]
    pub messages: VecDeque<String>,
}

enum Step {
    Continue,
    MonsterDown,
    PlayerDown,
}

impl Game {
    pub fn new(rules: &Rules, name: &str, class: ClassKind, difficulty: Difficulty) -> Result<Self> {
        let player = Player::new(rules, name, class, difficulty)?;
        tracing::info!(player = name, %class, %difficulty, "new game");
        Ok(Self {
            player,
            difficulty,
            dungeon_level: 1,
            location: Location::Town,
            training: TrainingCosts::new(&rules.config.training),
            quests: QuestBoard::default(),
            messages: VecDeque::new(),
        })
    }

    pub fn in_town(&self) -> bool {
        matches!(self.location, Location::Town)
    }

    pub fn run(&self) -> Option<&DungeonRun> {
        match &self.location {
            Location::Dungeon(run) => Some(run),
            Location::Town => None,
        }
    }

    /// The monster currently being fought, if any.
    pub fn monster(&self) -> Option<&Monster> {
        self.run().and_then(|r| r.monster.as_ref())
    }

    fn require_town(&self) -> Result<()> {
        if self.in_town() { Ok(()) } else { Err(GameError::NotInTown) }
    }

    fn require_fight(&self) -> Result<()> {
        if self.monster().is_some() { Ok(()) } else { Err(GameError::NotInCombat) }
    }

    fn remember(&mut self, rules: &Rules, log: &[String]) {
        for line in log {
            self.messages.push_front(line.clone());
        }
        self.messages.truncate(rules.config.message_log_len);
    }

    fn report(&mut self, rules: &Rules, outcome: Outcome, log: Vec<String>) -> ActionReport {
        self.remember(rules, &log);
        ActionReport { outcome, log }
    }

    // ---- dungeon --------------------------------------------------------

    pub fn enter_dungeon(&mut self, rules: &Rules, dice: &mut Dice) -> Result<ActionReport> {
        self.require_town()?;
        let floors = floors_for(rules, self.dungeon_level);
        let monster = spawn_monster(rules, self.difficulty, self.dungeon_level, 1, dice)?;
        let log = vec![
            format!("[DUNGEON] entered dungeon {} floor 1/{}", self.dungeon_level, floors),
            format!("[SPAWN] {} {} appears ({} HP)", monster.emoji, monster, monster.health.hp),
        ];
        self.location = Location::Dungeon(DungeonRun { floor: 1, floors, monster: Some(monster) });
        self.messages.clear();
        tracing::debug!(level = self.dungeon_level, floors, "dungeon entered");
        Ok(self.report(rules, Outcome::Ongoing, log))
    }

    /// Moves to the next floor after a regular victory.
    pub fn continue_dungeon(&mut self, rules: &Rules, dice: &mut Dice) -> Result<ActionReport> {
        let (next, floors) = match &self.location {
            Location::Town => return Err(GameError::NotInCombat),
            Location::Dungeon(run) if run.monster.is_some() => return Err(GameError::FloorNotCleared),
            Location::Dungeon(run) => (run.floor + 1, run.floors),
        };
        let monster = spawn_monster(rules, self.difficulty, self.dungeon_level, next, dice)?;
        let log = vec![
            format!("[DUNGEON] dungeon {} floor {}/{}", self.dungeon_level, next, floors),
            format!("[SPAWN] {} {} appears ({} HP)", monster.emoji, monster, monster.health.hp),
        ];
        if let Location::Dungeon(run) = &mut self.location {
            run.floor = next;
            run.monster = Some(monster);
        }
        self.messages.clear();
        Ok(self.report(rules, Outcome::Ongoing, log))
    }

    pub fn attack(&mut self, rules: &Rules, dice: &mut Dice) -> Result<ActionReport> {
        self.require_fight()?;
        self.take_turn(rules, dice, None)
    }

    pub fn use_skill(&mut self, id: &str, rules: &Rules, dice: &mut Dice) -> Result<ActionReport> {
        self.require_fight()?;
        let skill = rules
            .content
            .skill(self.player.class, id)
            .ok_or_else(|| GameError::UnknownSkill(id.to_string()))?;
        if self.player.skill_level(id) == 0 {
            return Err(GameError::SkillNotLearned(id.to_string()));
        }
        if skill.kind != SkillKind::Active {
            return Err(GameError::NotActiveSkill(id.to_string()));
        }
        let remaining = self.player.cooldown(id);
        if remaining > 0 {
            return Err(GameError::SkillOnCooldown { id: id.to_string(), remaining });
        }
        self.take_turn(rules, dice, Some(skill))
    }

    /// Drinking does not use up the turn.
    pub fn use_potion(&mut self, rules: &Rules) -> Result<ActionReport> {
        self.require_fight()?;
        let mut log = Vec::new();
        actions::use_potion(&mut self.player, rules, |l| log.push(l))?;
        Ok(self.report(rules, Outcome::Ongoing, log))
    }

    /// Leaves the dungeon with full HP and no penalty.
    pub fn escape(&mut self, rules: &Rules) -> Result<ActionReport> {
        if self.in_town() {
            return Err(GameError::NotInCombat);
        }
        self.player.leave_combat(rules);
        self.player.health.restore();
        self.location = Location::Town;
        let log = vec![format!("[ESCAPE][{}] fled safely back to town", self.player.name)];
        Ok(self.report(rules, Outcome::Escaped, log))
    }

    fn take_turn(&mut self, rules: &Rules, dice: &mut Dice, skill: Option<&SkillDef>) -> Result<ActionReport> {
        let mut log = Vec::new();
        let step = {
            let Location::Dungeon(run) = &mut self.location else {
                return Err(GameError::NotInCombat);
            };
            let Some(monster) = run.monster.as_mut() else {
                return Err(GameError::NotInCombat);
            };
            let player = &mut self.player;

            let start = begin_player_turn(player, rules, |l| log.push(l));
            if start.downed {
                Step::PlayerDown
            } else {
                if !start.stunned {
                    match skill {
                        Some(skill) => {
                            actions::player_skill(player, monster, skill, rules, dice, |l| log.push(l));
                            self.quests.record(QuestEvent::SkillUsed);
                        }
                        None => {
                            actions::player_attack(player, monster, rules, dice, |l| log.push(l));
                        }
                    }
                }
                if monster.health.is_down() {
                    Step::MonsterDown
                } else {
                    match monster_turn(player, monster, rules, dice, |l| log.push(l)) {
                        MonsterTurn::Died => Step::MonsterDown,
                        _ if player.health.is_down() => Step::PlayerDown,
                        _ => Step::Continue,
                    }
                }
            }
        };

        let outcome = match step {
            Step::Continue => Outcome::Ongoing,
            Step::MonsterDown => self.monster_defeated(rules, dice, &mut log)?,
            Step::PlayerDown => self.player_defeated(rules, &mut log),
        };
        Ok(self.report(rules, outcome, log))
    }

    fn monster_defeated(&mut self, rules: &Rules, dice: &mut Dice, log: &mut Vec<String>) -> Result<Outcome> {
        let Location::Dungeon(run) = &mut self.location else {
            return Err(GameError::NotInCombat);
        };
        let Some(monster) = run.monster.take() else {
            return Err(GameError::NotInCombat);
        };
        let template = rules
            .content
            .monster(&monster.template)
            .ok_or_else(|| GameError::Content(format!("unknown monster '{}'", monster.template)))?;
        let boss = monster.boss;

        log.push(format!("[WIN] {} is defeated!", monster));
        let (xp, gold) = roll_rewards(rules, self.difficulty, template, self.dungeon_level, dice)?;
        self.player.gold += gold;
        log.push(format!("[REWARD] +{} XP, +{} gold", xp, gold));

        let loot = roll_loot(rules, template, boss, self.dungeon_level, dice);
        if let Some(item) = &loot {
            log.push(format!("[LOOT] found {} ({:?})", item.name, item.rarity));
            self.player.inventory.push(item.clone());
        }

        self.quests.record(QuestEvent::MonsterSlain);
        self.quests.record(QuestEvent::GoldEarned(gold));
        self.quests.record(QuestEvent::FloorCleared);
        if boss {
            self.quests.record(QuestEvent::BossDefeated);
        }

        self.player.gain_xp(xp, rules, |l| log.push(l));
        let rewards = Rewards { xp, gold, loot };

        if boss {
            let cleared = self.dungeon_level;
            self.dungeon_level += 1;
            self.player.leave_combat(rules);
            self.location = Location::Town;
            log.push(format!("[CLEAR] dungeon {} cleared, returning to town", cleared));
            tracing::info!(cleared, next = self.dungeon_level, "dungeon cleared");
            Ok(Outcome::DungeonCleared { rewards, next_level: self.dungeon_level })
        } else {
            Ok(Outcome::Victory { rewards })
        }
    }

    fn player_defeated(&mut self, rules: &Rules, log: &mut Vec<String>) -> Outcome {
        let floor = self.run().map(|r| r.floor).unwrap_or(1);
        let gold_lost = (f64::from(self.player.gold) * rules.config.defeat_gold_penalty).floor() as u32;
        self.player.gold -= gold_lost;
        self.player.leave_combat(rules);
        self.player.health.restore();
        self.location = Location::Town;
        log.push(format!("[DEFEAT][{}] fell on floor {} and woke up in town", self.player.name, floor));
        log.push(format!("[DEFEAT][{}] lost {} gold", self.player.name, gold_lost));
        tracing::info!(floor, gold_lost, "player defeated");
        Outcome::Defeat { gold_lost }
    }

    // ---- town -----------------------------------------------------------

    pub fn shop_stock(&self, rules: &Rules) -> Vec<Item> {
        town::shop_stock(rules, self.dungeon_level)
    }

    pub fn buy_potion(&mut self, rules: &Rules) -> Result<u32> {
        self.require_town()?;
        town::buy_potion(&mut self.player, rules)
    }

    pub fn buy_item(&mut self, item_id: u32, rules: &Rules) -> Result<Item> {
        self.require_town()?;
        town::buy_item(&mut self.player, rules, self.dungeon_level, item_id)
    }

    pub fn train(&mut self, stat: TrainingStat, rules: &Rules) -> Result<u32> {
        self.require_town()?;
        town::train(&mut self.player, &mut self.training, stat, rules)
    }

    pub fn learn_skill(&mut self, id: &str, rules: &Rules) -> Result<u32> {
        self.require_town()?;
        skills::learn_skill(&mut self.player, rules, id)
    }

    pub fn skill_tree(&self, rules: &Rules) -> Result<Vec<SkillNode>> {
        skills::skill_tree(&self.player, rules)
    }

    pub fn equip(&mut self, index: usize, rules: &Rules) -> Result<Option<Item>> {
        self.require_town()?;
        town::equip(&mut self.player, rules, index)
    }

    pub fn unequip(&mut self, slot: Slot, rules: &Rules) -> Result<Item> {
        self.require_town()?;
        town::unequip(&mut self.player, rules, slot)
    }

    pub fn enhance(&mut self, slot: Slot, rules: &Rules, dice: &mut Dice) -> Result<(EnhanceOutcome, Vec<String>)> {
        self.require_town()?;
        let mut log = Vec::new();
        let outcome = enhance::enhance(&mut self.player, slot, rules, dice, |l| log.push(l))?;
        self.remember(rules, &log);
        Ok((outcome, log))
    }

    // ---- quests ---------------------------------------------------------

    /// Rerolls the board when `date` is a new day. Returns whether it did.
    pub fn refresh_daily_quests(&mut self, date: &str, rules: &Rules, dice: &mut Dice) -> bool {
        self.quests.refresh(date, &rules.config.quests, dice)
    }

    pub fn claim_quest(&mut self, index: usize, rules: &Rules) -> Result<ActionReport> {
        let (gold, xp) = self.quests.claim(index)?;
        let mut log = vec![format!("[QUEST] reward: +{} gold, +{} XP", gold, xp)];
        self.player.gold += gold;
        self.player.gain_xp(xp, rules, |l| log.push(l));
        Ok(self.report(rules, Outcome::Ongoing, log))
    }

    /// Multi-line character sheet.
    pub fn status(&self) -> String {
        let p = &self.player;
        let s = &p.stats;
        let mut out = format!(
            "{} the {} (level {}, {}/{} XP, {} SP)\n",
            p.name, p.class, p.level, p.xp, p.xp_to_next_level, p.skill_points
        );
        out.push_str(&format!(
            "HP {}/{}  ATK {}  DEF {}  CRIT {:.0}%  EVADE {:.0}%\n",
            p.health.hp,
            p.health.max_hp,
            s.attack_power,
            s.defense,
            s.crit_chance * 100.0,
            s.evade_chance * 100.0
        ));
        out.push_str(&format!("Gold {}  Potions {}\n", p.gold, p.potions));
        for slot in [Slot::Weapon, Slot::Armor] {
            let name = p.equipment.get(slot).map(Item::display_name).unwrap_or_else(|| "-".to_string());
            out.push_str(&format!("{}: {}\n", slot, name));
        }
        match &self.location {
            Location::Town => {
                out.push_str(&format!("In town, next dungeon {} ({})", self.dungeon_level, self.difficulty));
            }
            Location::Dungeon(run) => {
                out.push_str(&format!("Dungeon {} floor {}/{}", self.dungeon_level, run.floor, run.floors));
                if let Some(m) = &run.monster {
                    out.push_str(&format!(": {} {} {}/{} HP", m.emoji, m, m.health.hp, m.health.max_hp));
                }
            }
        }
        out
    }
}
