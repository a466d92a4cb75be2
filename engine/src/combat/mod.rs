//! Turn sequencing. A turn-consuming player action runs
//! `begin_player_turn`, the action itself, then `monster_turn`.

pub mod actions;

use crate::Dice;
use crate::conditions::{ActiveStatus, incoming_factor, tick_statuses};
use crate::content::Rules;
use crate::dungeon::Monster;
use crate::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnStart {
    /// The player loses this turn's action.
    pub stunned: bool,
    /// Damage over time finished the player.
    pub downed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonsterTurn {
    Hit { damage: i32 },
    Evaded,
    Stunned,
    /// Damage over time finished the monster before it could act.
    Died,
}

/// Everything that happens before the player's action: cooldowns and buffs
/// count down, status effects tick, the sheet is rebuilt.
pub fn begin_player_turn(player: &mut Player, rules: &Rules, mut log: impl FnMut(String)) -> TurnStart {
    for remaining in player.cooldowns.values_mut() {
        *remaining = remaining.saturating_sub(1);
    }

    for buff in player.buffs.iter_mut() {
        buff.turns_left = buff.turns_left.saturating_sub(1);
    }
    let name = player.name.clone();
    player.buffs.retain(|b| {
        if b.turns_left == 0 {
            log(format!("[BUFF][{}] {} wears off", name, b.name));
            false
        } else {
            true
        }
    });

    let tick = tick_statuses(&name, &mut player.statuses, &mut player.health, &mut log);
    player.recalculate(rules);

    if tick.stunned && !player.health.is_down() {
        log(format!("[STATUS][{}] is stunned and loses the turn", name));
    }
    TurnStart {
        stunned: tick.stunned,
        downed: player.health.is_down(),
    }
}

/// The monster's half of a round: its statuses tick, then it attacks unless
/// it died or is stunned.
pub fn monster_turn(
    player: &mut Player,
    monster: &mut Monster,
    rules: &Rules,
    dice: &mut Dice,
    mut log: impl FnMut(String),
) -> MonsterTurn {
    let name = monster.to_string();
    let tick = tick_statuses(&name, &mut monster.statuses, &mut monster.health, &mut log);
    if monster.health.is_down() {
        return MonsterTurn::Died;
    }
    if tick.stunned {
        log(format!("[STATUS][{}] is stunned and cannot act", name));
        return MonsterTurn::Stunned;
    }
    actions::monster_attack(player, monster, rules, dice, log)
}

/// `floor(max(1, raw - defense) * vulnerability)`: what actually lands on a
/// combatant.
pub fn landed_damage(raw: i32, defense: i32, target_statuses: &[ActiveStatus]) -> i32 {
    let after_defense = (raw - defense).max(1);
    (f64::from(after_defense) * incoming_factor(target_statuses)).floor() as i32
}

/// Crit multiplier and floor, shared by every crit roll.
pub(crate) fn crit(damage: f64, multiplier: f64) -> f64 {
    (damage * multiplier).floor()
}
