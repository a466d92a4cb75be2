use serde::{Deserialize, Serialize};

use crate::life::{Health, apply_damage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// Loses `max_hp * potency` per tick.
    Poison,
    /// Loses `potency` HP per tick.
    Burn,
    /// Skips the next action.
    Stun,
    /// Outgoing damage scaled by `1 - potency`.
    Weaken,
    /// Incoming damage scaled by `1 + potency`.
    Vulnerable,
}

/// How a skill or a monster attack inflicts a status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSpec {
    pub kind: StatusKind,
    /// Probability on a landed hit. At 1.0 or above no roll is made.
    pub chance: f64,
    pub duration: u32,
    #[serde(default)]
    pub potency: f64,
    #[serde(default)]
    pub potency_per_level: f64,
}

impl StatusSpec {
    pub fn potency_at(&self, level: u32) -> f64 {
        self.potency + self.potency_per_level * f64::from(level)
    }
}

/// A status currently affecting a combatant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveStatus {
    pub kind: StatusKind,
    pub turns_left: u32,
    pub potency: f64,
}

/// What the start-of-turn tick did to a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    pub damage: i32,
    pub stunned: bool,
    /// True if damage over time dropped the combatant to 0 HP.
    pub downed: bool,
}

/// Applies a status; an existing status of the same kind is refreshed to the
/// longer duration and the stronger potency.
pub fn apply_status(
    name: &str,
    statuses: &mut Vec<ActiveStatus>,
    kind: StatusKind,
    duration: u32,
    potency: f64,
    mut log: impl FnMut(String),
) {
    if duration == 0 {
        return;
    }
    if let Some(existing) = statuses.iter_mut().find(|s| s.kind == kind) {
        existing.turns_left = existing.turns_left.max(duration);
        existing.potency = existing.potency.max(potency);
        log(format!(
            "[STATUS][{}] {:?} refreshed ({} turns)",
            name, kind, existing.turns_left
        ));
        return;
    }
    statuses.push(ActiveStatus { kind, turns_left: duration, potency });
    log(format!("[STATUS][{}] gains {:?} ({} turns)", name, kind, duration));
}

/// Start-of-turn processing: damage over time first, then the stun check,
/// then every duration drops by one and expired statuses are removed.
pub fn tick_statuses(
    name: &str,
    statuses: &mut Vec<ActiveStatus>,
    health: &mut Health,
    mut log: impl FnMut(String),
) -> TickOutcome {
    let mut outcome = TickOutcome::default();

    for s in statuses.iter() {
        if health.is_down() {
            break;
        }
        let dmg = match s.kind {
            StatusKind::Poison => (f64::from(health.max_hp) * s.potency).floor().max(1.0) as i32,
            StatusKind::Burn => s.potency.floor().max(1.0) as i32,
            _ => continue,
        };
        log(format!("[STATUS][{}] {:?} deals {}", name, s.kind, dmg));
        outcome.damage += dmg;
        if apply_damage(name, health, dmg, &mut log) {
            outcome.downed = true;
        }
    }

    outcome.stunned = has_status(statuses, StatusKind::Stun);

    for s in statuses.iter_mut() {
        s.turns_left = s.turns_left.saturating_sub(1);
    }
    statuses.retain(|s| {
        if s.turns_left == 0 {
            log(format!("[STATUS][{}] is no longer affected by {:?}", name, s.kind));
            false
        } else {
            true
        }
    });

    outcome
}

pub fn has_status(statuses: &[ActiveStatus], kind: StatusKind) -> bool {
    statuses.iter().any(|s| s.kind == kind)
}

fn potency_of(statuses: &[ActiveStatus], kind: StatusKind) -> f64 {
    statuses
        .iter()
        .filter(|s| s.kind == kind)
        .map(|s| s.potency)
        .fold(0.0, f64::max)
}

/// Multiplier for damage dealt by a combatant carrying `statuses`.
pub fn outgoing_factor(statuses: &[ActiveStatus]) -> f64 {
    (1.0 - potency_of(statuses, StatusKind::Weaken)).max(0.0)
}

/// Multiplier for damage taken by a combatant carrying `statuses`.
pub fn incoming_factor(statuses: &[ActiveStatus]) -> f64 {
    1.0 + potency_of(statuses, StatusKind::Vulnerable)
}
