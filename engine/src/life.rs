use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub hp: i32,
    pub max_hp: i32,
}

impl Health {
    pub fn new(max_hp: i32) -> Self {
        Self { hp: max_hp, max_hp }
    }

    pub fn is_down(&self) -> bool {
        self.hp <= 0
    }

    pub fn restore(&mut self) {
        self.hp = self.max_hp;
    }

    /// Moves to a new maximum. A higher maximum raises current HP by the same
    /// amount; either way HP ends clamped to `[0, max_hp]`.
    pub fn set_max(&mut self, max_hp: i32) {
        let gain = max_hp - self.max_hp;
        self.max_hp = max_hp;
        if gain > 0 {
            self.hp += gain;
        }
        self.clamp();
    }

    /// Adopts a new maximum without granting the difference.
    pub fn set_max_clamped(&mut self, max_hp: i32) {
        self.max_hp = max_hp;
        self.clamp();
    }

    fn clamp(&mut self) {
        self.hp = self.hp.clamp(0, self.max_hp.max(0));
    }
}

/// Apply damage; returns true if this call dropped the creature to 0 HP.
pub fn apply_damage(name: &str, health: &mut Health, dmg: i32, mut log: impl FnMut(String)) -> bool {
    if health.is_down() {
        return false;
    }
    let before = health.hp;
    health.hp = (health.hp - dmg.max(0)).max(0);
    log(format!("[HP][{}] {} → {} (−{})", name, before, health.hp, before - health.hp));
    if health.hp == 0 {
        log(format!("[STATE][{}] drops to 0 HP", name));
        return true;
    }
    false
}

/// Heals up to the maximum and returns the amount actually restored.
pub fn heal(name: &str, health: &mut Health, amount: i32, mut log: impl FnMut(String)) -> i32 {
    if amount <= 0 {
        return 0;
    }
    let before = health.hp;
    health.hp = (health.hp + amount).min(health.max_hp);
    log(format!(
        "[HEAL][{}] +{} HP ({} → {})",
        name,
        health.hp - before,
        before,
        health.hp
    ));
    health.hp - before
}
