use serde::{Deserialize, Serialize};

/// The five combat stats. Used for class templates, item bonuses and the
/// derived sheet alike; missing fields deserialize as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub max_hp: i32,
    pub attack_power: i32,
    pub defense: i32,
    pub crit_chance: f64,
    pub evade_chance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    MaxHp,
    AttackPower,
    Defense,
    CritChance,
    EvadeChance,
    AtkPercent,
    DefPercent,
    HpPercent,
}

/// Percent bonuses collected during recalculation, applied as `1 + sum`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PercentBonus {
    pub max_hp: f64,
    pub attack_power: f64,
    pub defense: f64,
}

impl Stats {
    /// Adds `value` to a flat stat, or to `percent` for the `*Percent` kinds.
    pub fn add(&mut self, kind: StatKind, value: f64, percent: &mut PercentBonus) {
        match kind {
            StatKind::MaxHp => self.max_hp += value.round() as i32,
            StatKind::AttackPower => self.attack_power += value.round() as i32,
            StatKind::Defense => self.defense += value.round() as i32,
            StatKind::CritChance => self.crit_chance += value,
            StatKind::EvadeChance => self.evade_chance += value,
            StatKind::AtkPercent => percent.attack_power += value,
            StatKind::DefPercent => percent.defense += value,
            StatKind::HpPercent => percent.max_hp += value,
        }
    }

    pub fn add_all(&mut self, other: &Stats) {
        self.max_hp += other.max_hp;
        self.attack_power += other.attack_power;
        self.defense += other.defense;
        self.crit_chance += other.crit_chance;
        self.evade_chance += other.evade_chance;
    }

    pub fn scaled(&self, times: i32) -> Stats {
        Stats {
            max_hp: self.max_hp * times,
            attack_power: self.attack_power * times,
            defense: self.defense * times,
            crit_chance: self.crit_chance * f64::from(times),
            evade_chance: self.evade_chance * f64::from(times),
        }
    }

    pub fn apply_percent(&mut self, percent: &PercentBonus) {
        self.max_hp = scale_floor(self.max_hp, percent.max_hp);
        self.attack_power = scale_floor(self.attack_power, percent.attack_power);
        self.defense = scale_floor(self.defense, percent.defense);
    }

    /// Short "+5 ATK, +2% CRIT" rendering of the non-zero fields.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if self.max_hp != 0 {
            parts.push(format!("{:+} HP", self.max_hp));
        }
        if self.attack_power != 0 {
            parts.push(format!("{:+} ATK", self.attack_power));
        }
        if self.defense != 0 {
            parts.push(format!("{:+} DEF", self.defense));
        }
        if self.crit_chance != 0.0 {
            parts.push(format!("{:+.0}% CRIT", self.crit_chance * 100.0));
        }
        if self.evade_chance != 0.0 {
            parts.push(format!("{:+.0}% EVADE", self.evade_chance * 100.0));
        }
        parts.join(", ")
    }
}

/// `floor(value * (1 + bonus))`, the rounding every percent modifier uses.
pub fn scale_floor(value: i32, bonus: f64) -> i32 {
    (f64::from(value) * (1.0 + bonus)).floor() as i32
}
