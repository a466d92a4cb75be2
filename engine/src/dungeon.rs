use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Dice;
use crate::conditions::ActiveStatus;
use crate::config::Difficulty;
use crate::content::{MonsterTemplate, Rules};
use crate::error::{GameError, Result};
use crate::items::Item;
use crate::life::Health;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    /// Template id, used to look up rewards and loot.
    pub template: String,
    pub name: String,
    pub emoji: String,
    pub boss: bool,
    pub health: Health,
    pub attack_power: i32,
    pub defense: i32,
    pub statuses: Vec<ActiveStatus>,
}

impl fmt::Display for Monster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.boss {
            write!(f, "👑 {}", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// An expedition into one dungeon level. `monster` is `None` once the
/// current floor has been cleared and the player has not moved on yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonRun {
    pub floor: u32,
    pub floors: u32,
    pub monster: Option<Monster>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Rewards {
    pub xp: u32,
    pub gold: u32,
    pub loot: Option<Item>,
}

pub fn floors_for(rules: &Rules, dungeon_level: u32) -> u32 {
    let p = &rules.config.progression;
    p.base_floors + dungeon_level.saturating_sub(1) / p.levels_per_extra_floor.max(1)
}

fn level_modifier(rules: &Rules, dungeon_level: u32) -> f64 {
    let exp = i32::try_from(dungeon_level.saturating_sub(1)).unwrap_or(i32::MAX);
    rules.config.progression.monster_level_scaling.powi(exp)
}

/// Picks and scales the monster for `floor`. The boss floor always uses the
/// boss matching the dungeon level (the last boss repeats); other floors draw
/// uniformly from the first `dungeon_level + 1` monsters.
pub fn spawn_monster(
    rules: &Rules,
    difficulty: Difficulty,
    dungeon_level: u32,
    floor: u32,
    dice: &mut Dice,
) -> Result<Monster> {
    let content = &rules.content;
    let boss = floor == floors_for(rules, dungeon_level);
    let template = if boss {
        let idx = (dungeon_level.saturating_sub(1) as usize).min(content.bosses.len().saturating_sub(1));
        content.bosses.get(idx)
    } else {
        let pool = content.monsters.len().min(dungeon_level as usize + 1);
        content.monsters.get(dice.pick(pool))
    };
    let template = template.ok_or_else(|| GameError::Content("monster roster is empty".into()))?;

    let settings = rules.config.difficulty(difficulty)?;
    let m = level_modifier(rules, dungeon_level);
    let hp = (f64::from(template.base_hp) * m * settings.monster_hp_mod).floor() as i32;
    let attack = (f64::from(template.base_attack) * m * settings.monster_atk_mod).floor() as i32;

    Ok(Monster {
        template: template.id.clone(),
        name: template.name.clone(),
        emoji: template.emoji.clone(),
        boss,
        health: Health::new(hp.max(1)),
        attack_power: attack,
        defense: 0,
        statuses: Vec::new(),
    })
}

/// XP and gold for defeating `template` in `dungeon_level`. Draws once, for
/// the gold bonus.
pub fn roll_rewards(
    rules: &Rules,
    difficulty: Difficulty,
    template: &MonsterTemplate,
    dungeon_level: u32,
    dice: &mut Dice,
) -> Result<(u32, u32)> {
    let settings = rules.config.difficulty(difficulty)?;
    let level = f64::from(dungeon_level);
    let xp_bonus = 1.0 + (level - 1.0) * rules.config.progression.xp_bonus_per_dungeon_level;
    let xp = (f64::from(template.xp) * xp_bonus * settings.reward_mod).floor() as u32;
    let base_gold = f64::from(template.gold);
    let gold = ((base_gold + dice.roll() * base_gold * level) * settings.reward_mod).floor() as u32;
    Ok((xp, gold))
}

/// Drop check, then a uniform pick among the loot table entries whose rarity
/// is unlocked at this dungeon level.
pub fn roll_loot(
    rules: &Rules,
    template: &MonsterTemplate,
    boss: bool,
    dungeon_level: u32,
    dice: &mut Dice,
) -> Option<Item> {
    let loot = &rules.config.loot;
    let drop_chance = if boss { loot.boss_drop_chance } else { loot.normal_drop_chance };
    if dice.roll() > drop_chance {
        return None;
    }
    let candidates: Vec<&Item> = template
        .loot_table
        .iter()
        .filter_map(|id| rules.content.item(*id))
        .filter(|item| loot.unlocked(item.rarity, dungeon_level))
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let mut item = candidates[dice.pick(candidates.len())].clone();
    item.enhancement = 0;
    Some(item)
}
