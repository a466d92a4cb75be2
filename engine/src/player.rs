use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::conditions::{ActiveStatus, outgoing_factor};
use crate::config::Difficulty;
use crate::content::{ClassKind, Rules};
use crate::error::Result;
use crate::items::{Equipment, Item};
use crate::life::Health;
use crate::skills::{ActiveBuff, SkillKind};
use crate::stats::{PercentBonus, StatKind, Stats, scale_floor};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub class: ClassKind,
    pub weapon_name: String,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next_level: u32,
    pub gold: u32,
    pub potions: u32,
    pub skill_points: u32,
    /// Skill id -> learned level.
    pub learned_skills: IndexMap<String, u32>,
    /// Skill id -> turns until usable again.
    pub cooldowns: IndexMap<String, u32>,
    pub buffs: Vec<ActiveBuff>,
    pub statuses: Vec<ActiveStatus>,
    /// Class template plus training; never touched by gear or skills.
    pub base: Stats,
    /// Result of the last `recalculate`.
    pub stats: Stats,
    pub health: Health,
    pub equipment: Equipment,
    pub inventory: Vec<Item>,
}

impl Player {
    pub fn new(rules: &Rules, name: &str, class: ClassKind, difficulty: Difficulty) -> Result<Self> {
        let def = rules.content.class(class)?;
        let settings = rules.config.difficulty(difficulty)?;
        let mut player = Self {
            name: name.to_string(),
            class,
            weapon_name: def.weapon.clone(),
            level: 1,
            xp: 0,
            xp_to_next_level: rules.config.progression.start_xp_to_next,
            gold: settings.start_gold,
            potions: settings.start_potions,
            skill_points: 0,
            learned_skills: IndexMap::new(),
            cooldowns: IndexMap::new(),
            buffs: Vec::new(),
            statuses: Vec::new(),
            base: def.base,
            stats: def.base,
            health: Health::new(def.base.max_hp),
            equipment: Equipment::default(),
            inventory: Vec::new(),
        };
        player.recalculate(rules);
        player.health.restore();
        Ok(player)
    }

    pub fn skill_level(&self, id: &str) -> u32 {
        self.learned_skills.get(id).copied().unwrap_or(0)
    }

    pub fn cooldown(&self, id: &str) -> u32 {
        self.cooldowns.get(id).copied().unwrap_or(0)
    }

    pub fn hp(&self) -> i32 {
        self.health.hp
    }

    /// Rebuilds the derived sheet: base, passive skills, equipment, percent
    /// bonuses, buffs, then status effects. Current HP is only clamped.
    pub fn recalculate(&mut self, rules: &Rules) {
        self.stats = self.derive(rules);
        self.health.set_max_clamped(self.stats.max_hp);
    }

    /// Like `recalculate`, but any max HP gained is also added to current HP.
    pub fn recalculate_with_gain(&mut self, rules: &Rules) {
        self.stats = self.derive(rules);
        self.health.set_max(self.stats.max_hp);
    }

    fn derive(&self, rules: &Rules) -> Stats {
        let mut stats = self.base;
        let mut percent = PercentBonus::default();

        for (id, &level) in &self.learned_skills {
            if level == 0 {
                continue;
            }
            let Some(skill) = rules.content.skill(self.class, id) else {
                continue;
            };
            if skill.kind != SkillKind::Passive {
                continue;
            }
            if let Some(bonus) = &skill.effect.passive {
                stats.add(bonus.stat, bonus.value.at(level), &mut percent);
            }
        }

        for item in self.equipment.iter() {
            stats.add_all(&item.total_stats(&rules.config.enhancement));
        }

        stats.apply_percent(&percent);

        let mut buff_atk = 0.0;
        let mut buff_def = 0.0;
        for buff in &self.buffs {
            if buff.percent {
                match buff.stat {
                    StatKind::AttackPower => buff_atk += buff.value,
                    StatKind::Defense => buff_def += buff.value,
                    _ => {}
                }
            } else {
                let mut ignored = PercentBonus::default();
                stats.add(buff.stat, buff.value, &mut ignored);
            }
        }
        stats.attack_power = scale_floor(stats.attack_power, buff_atk);
        stats.defense = scale_floor(stats.defense, buff_def);

        let weaken = outgoing_factor(&self.statuses);
        if weaken < 1.0 {
            stats.attack_power = (f64::from(stats.attack_power) * weaken).floor().max(0.0) as i32;
        }

        stats
    }

    /// Adds experience and resolves every level-up it pays for. Returns the
    /// number of levels gained.
    pub fn gain_xp(&mut self, amount: u32, rules: &Rules, mut log: impl FnMut(String)) -> u32 {
        self.xp += amount;
        let mut gained = 0;
        while self.xp >= self.xp_to_next_level && self.xp_to_next_level > 0 {
            self.xp -= self.xp_to_next_level;
            self.level += 1;
            self.skill_points += 1;
            self.xp_to_next_level =
                (f64::from(self.xp_to_next_level) * rules.config.progression.xp_growth).floor() as u32;
            self.recalculate_with_gain(rules);
            gained += 1;
            log(format!(
                "[LEVEL][{}] reached level {} (+1 SP, next at {} XP)",
                self.name, self.level, self.xp_to_next_level
            ));
            tracing::info!(player = %self.name, level = self.level, "level up");
        }
        gained
    }

    /// Drops combat-only state when leaving the dungeon.
    pub fn leave_combat(&mut self, rules: &Rules) {
        self.buffs.clear();
        self.statuses.clear();
        self.recalculate(rules);
    }
}
