use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::EnhanceConfig;
use crate::stats::Stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Weapon,
    Armor,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Slot::Weapon => "weapon",
            Slot::Armor => "armor",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
}

/// An item definition from the catalogue, or an owned instance of one. Owned
/// instances carry their own enhancement level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub name: String,
    pub slot: Slot,
    #[serde(default)]
    pub stats: Stats,
    pub rarity: Rarity,
    pub cost: u32,
    #[serde(default)]
    pub enhancement: u8,
}

impl Item {
    /// Stats granted by the enhancement level alone.
    pub fn enhancement_bonus(&self, cfg: &EnhanceConfig) -> Stats {
        let per_level = match self.slot {
            Slot::Weapon => cfg.weapon_bonus,
            Slot::Armor => cfg.armor_bonus,
        };
        per_level.scaled(i32::from(self.enhancement))
    }

    pub fn total_stats(&self, cfg: &EnhanceConfig) -> Stats {
        let mut total = self.stats;
        total.add_all(&self.enhancement_bonus(cfg));
        total
    }

    pub fn display_name(&self) -> String {
        if self.enhancement > 0 {
            format!("+{} {}", self.enhancement, self.name)
        } else {
            self.name.clone()
        }
    }

    /// Rough desirability used by the auto-player when comparing gear.
    pub fn score(&self, cfg: &EnhanceConfig) -> f64 {
        let s = self.total_stats(cfg);
        f64::from(s.attack_power) * 3.0
            + f64::from(s.defense) * 4.0
            + f64::from(s.max_hp) * 0.5
            + s.crit_chance * 100.0
            + s.evade_chance * 100.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub weapon: Option<Item>,
    pub armor: Option<Item>,
}

impl Equipment {
    pub fn get(&self, slot: Slot) -> Option<&Item> {
        match slot {
            Slot::Weapon => self.weapon.as_ref(),
            Slot::Armor => self.armor.as_ref(),
        }
    }

    pub fn get_mut(&mut self, slot: Slot) -> Option<&mut Item> {
        match slot {
            Slot::Weapon => self.weapon.as_mut(),
            Slot::Armor => self.armor.as_mut(),
        }
    }

    /// Puts `item` into its slot and returns whatever was there.
    pub fn replace(&mut self, item: Item) -> Option<Item> {
        match item.slot {
            Slot::Weapon => self.weapon.replace(item),
            Slot::Armor => self.armor.replace(item),
        }
    }

    pub fn take(&mut self, slot: Slot) -> Option<Item> {
        match slot {
            Slot::Weapon => self.weapon.take(),
            Slot::Armor => self.armor.take(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.weapon.iter().chain(self.armor.iter())
    }
}
