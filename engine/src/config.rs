use std::{fmt, fs, path::Path};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::items::Rarity;
use crate::quests::QuestTemplate;
use crate::stats::Stats;

const DEFAULT_CONFIG: &str = include_str!("../content/config.yaml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultySettings {
    pub monster_hp_mod: f64,
    pub monster_atk_mod: f64,
    pub start_gold: u32,
    pub start_potions: u32,
    pub reward_mod: f64,
}

/// Damage variance: `floor(base + low + roll * width)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spread {
    pub low: f64,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progression {
    pub start_xp_to_next: u32,
    pub xp_growth: f64,
    pub monster_level_scaling: f64,
    pub xp_bonus_per_dungeon_level: f64,
    pub base_floors: u32,
    pub levels_per_extra_floor: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingRule {
    pub gain: i32,
    pub cost_growth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub start_cost: u32,
    pub max_hp: TrainingRule,
    pub attack_power: TrainingRule,
    pub defense: TrainingRule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootConfig {
    pub normal_drop_chance: f64,
    pub boss_drop_chance: f64,
    /// Lowest dungeon level at which an item of each rarity may drop.
    pub min_dungeon_level: IndexMap<Rarity, u32>,
}

impl LootConfig {
    pub fn unlocked(&self, rarity: Rarity, dungeon_level: u32) -> bool {
        dungeon_level >= self.min_dungeon_level.get(&rarity).copied().unwrap_or(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopConfig {
    pub max_stock: usize,
    pub common_max_cost: u32,
    pub uncommon_min_level: u32,
    pub uncommon_count: usize,
    pub rare_min_level: u32,
    pub rare_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhanceConfig {
    pub max_level: u8,
    pub cost_factor: f64,
    /// Failing at or above this level costs one level.
    pub downgrade_threshold: u8,
    /// Chance to go from level `i` to `i + 1`.
    pub success_chance: Vec<f64>,
    pub weapon_bonus: Stats,
    pub armor_bonus: Stats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestConfig {
    pub per_day: usize,
    pub templates: Vec<QuestTemplate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub crit_multiplier: f64,
    pub monster_crit_chance: f64,
    pub potion_heal_percent: f64,
    pub potion_cost: u32,
    pub defeat_gold_penalty: f64,
    pub message_log_len: usize,
    pub player_spread: Spread,
    pub monster_spread: Spread,
    pub progression: Progression,
    pub difficulties: IndexMap<Difficulty, DifficultySettings>,
    pub training: TrainingConfig,
    pub loot: LootConfig,
    pub shop: ShopConfig,
    pub enhancement: EnhanceConfig,
    pub quests: QuestConfig,
}

impl GameConfig {
    /// The rules shipped in `content/config.yaml`.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(DEFAULT_CONFIG)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: GameConfig =
            serde_yaml::from_str(text).map_err(|e| GameError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| GameError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text)
    }

    pub fn difficulty(&self, difficulty: Difficulty) -> Result<&DifficultySettings> {
        self.difficulties
            .get(&difficulty)
            .ok_or_else(|| GameError::Config(format!("no settings for difficulty '{}'", difficulty)))
    }

    fn validate(&self) -> Result<()> {
        for d in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
            self.difficulty(d)?;
        }
        if self.enhancement.success_chance.len() < usize::from(self.enhancement.max_level) {
            return Err(GameError::Config(format!(
                "enhancement.success_chance needs {} entries, found {}",
                self.enhancement.max_level,
                self.enhancement.success_chance.len()
            )));
        }
        if self.quests.per_day > self.quests.templates.len() {
            return Err(GameError::Config(
                "quests.per_day exceeds the number of quest templates".to_string(),
            ));
        }
        if self.message_log_len == 0 {
            return Err(GameError::Config("message_log_len must be at least 1".to_string()));
        }
        Ok(())
    }
}
