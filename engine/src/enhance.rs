use serde::{Deserialize, Serialize};

use crate::Dice;
use crate::config::EnhanceConfig;
use crate::content::Rules;
use crate::error::{GameError, Result};
use crate::items::{Item, Slot};
use crate::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum EnhanceOutcome {
    Success { level: u8 },
    Failed { level: u8 },
    Downgraded { from: u8, to: u8 },
}

pub fn enhance_cost(item: &Item, cfg: &EnhanceConfig) -> u32 {
    (f64::from(item.cost) * cfg.cost_factor * f64::from(u32::from(item.enhancement) + 1)).floor() as u32
}

pub fn success_chance(level: u8, cfg: &EnhanceConfig) -> f64 {
    cfg.success_chance.get(usize::from(level)).copied().unwrap_or(0.0)
}

/// One enhancement attempt on the item in `slot`. Gold is spent whether or
/// not the attempt succeeds.
pub fn enhance(
    player: &mut Player,
    slot: Slot,
    rules: &Rules,
    dice: &mut Dice,
    mut log: impl FnMut(String),
) -> Result<EnhanceOutcome> {
    let cfg = &rules.config.enhancement;
    let (from, cost) = {
        let item = player.equipment.get(slot).ok_or(GameError::EmptySlot(slot))?;
        (item.enhancement, enhance_cost(item, cfg))
    };
    if from >= cfg.max_level {
        return Err(GameError::EnhanceMaxed(from));
    }
    if player.gold < cost {
        return Err(GameError::InsufficientGold { needed: cost, available: player.gold });
    }
    player.gold -= cost;

    let chance = success_chance(from, cfg);
    let succeeded = dice.chance(chance);
    let Some(item) = player.equipment.get_mut(slot) else {
        return Err(GameError::EmptySlot(slot));
    };
    let outcome = if succeeded {
        item.enhancement += 1;
        EnhanceOutcome::Success { level: item.enhancement }
    } else if from > 0 && from >= cfg.downgrade_threshold {
        item.enhancement -= 1;
        EnhanceOutcome::Downgraded { from, to: item.enhancement }
    } else {
        EnhanceOutcome::Failed { level: from }
    };
    let name = item.display_name();

    match outcome {
        EnhanceOutcome::Success { level } => {
            log(format!("[ENHANCE] {} reached +{} ({} gold)", name, level, cost))
        }
        EnhanceOutcome::Failed { level } => {
            log(format!("[ENHANCE] attempt failed, {} stays at +{} ({} gold)", name, level, cost))
        }
        EnhanceOutcome::Downgraded { from, to } => {
            log(format!("[ENHANCE] attempt failed, {} dropped +{} → +{} ({} gold)", name, from, to, cost))
        }
    }
    tracing::info!(slot = %slot, ?outcome, cost, chance, "enhancement attempt");

    player.recalculate_with_gain(rules);
    Ok(outcome)
}
