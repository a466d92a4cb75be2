use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::conditions::StatusSpec;
use crate::config::GameConfig;
use crate::error::{GameError, Result};
use crate::items::Item;
use crate::skills::SkillDef;
use crate::stats::Stats;

const CLASSES: &str = include_str!("../content/classes.json");
const ITEMS: &str = include_str!("../content/items.json");
const MONSTERS: &str = include_str!("../content/monsters.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    Warrior,
    Mage,
    Rogue,
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ClassKind::Warrior => "warrior",
            ClassKind::Mage => "mage",
            ClassKind::Rogue => "rogue",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    pub emoji: String,
    pub weapon: String,
    pub base: Stats,
    pub skills: Vec<SkillDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterTemplate {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub base_hp: i32,
    pub base_attack: i32,
    pub xp: u32,
    pub gold: u32,
    #[serde(default)]
    pub loot_table: Vec<u32>,
    #[serde(default)]
    pub on_hit: Option<StatusSpec>,
}

#[derive(Debug, Clone, Deserialize)]
struct MonsterFile {
    monsters: Vec<MonsterTemplate>,
    bosses: Vec<MonsterTemplate>,
}

/// Static game data: classes with their skill trees, the item catalogue and
/// the monster rosters.
#[derive(Debug, Clone)]
pub struct Content {
    pub classes: IndexMap<ClassKind, ClassDef>,
    pub items: Vec<Item>,
    pub monsters: Vec<MonsterTemplate>,
    pub bosses: Vec<MonsterTemplate>,
}

impl Content {
    pub fn builtin() -> Result<Self> {
        Self::from_json(CLASSES, ITEMS, MONSTERS)
    }

    pub fn from_json(classes: &str, items: &str, monsters: &str) -> Result<Self> {
        let classes: IndexMap<ClassKind, ClassDef> =
            serde_json::from_str(classes).map_err(|e| GameError::Content(format!("classes: {}", e)))?;
        let items: Vec<Item> =
            serde_json::from_str(items).map_err(|e| GameError::Content(format!("items: {}", e)))?;
        let roster: MonsterFile = serde_json::from_str(monsters)
            .map_err(|e| GameError::Content(format!("monsters: {}", e)))?;
        let content = Self {
            classes,
            items,
            monsters: roster.monsters,
            bosses: roster.bosses,
        };
        content.validate()?;
        Ok(content)
    }

    pub fn class(&self, class: ClassKind) -> Result<&ClassDef> {
        self.classes
            .get(&class)
            .ok_or_else(|| GameError::Content(format!("class '{}' is not defined", class)))
    }

    pub fn item(&self, id: u32) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn skill(&self, class: ClassKind, id: &str) -> Option<&SkillDef> {
        self.classes.get(&class)?.skills.iter().find(|s| s.id == id)
    }

    pub fn monster(&self, id: &str) -> Option<&MonsterTemplate> {
        self.monsters.iter().chain(self.bosses.iter()).find(|m| m.id == id)
    }

    fn validate(&self) -> Result<()> {
        if self.monsters.is_empty() || self.bosses.is_empty() {
            return Err(GameError::Content("at least one monster and one boss are required".into()));
        }
        for m in self.monsters.iter().chain(self.bosses.iter()) {
            if let Some(missing) = m.loot_table.iter().find(|id| self.item(**id).is_none()) {
                return Err(GameError::Content(format!(
                    "monster '{}' drops unknown item {}",
                    m.id, missing
                )));
            }
        }
        for (class, def) in &self.classes {
            for skill in &def.skills {
                if let Some(dep) = skill
                    .dependencies
                    .iter()
                    .find(|d| !def.skills.iter().any(|s| &s.id == *d))
                {
                    return Err(GameError::Content(format!(
                        "{} skill '{}' depends on unknown skill '{}'",
                        class, skill.id, dep
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Config plus content: everything an operation needs besides the state it
/// mutates and the dice.
#[derive(Debug, Clone)]
pub struct Rules {
    pub config: GameConfig,
    pub content: Content,
}

impl Rules {
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            config: GameConfig::builtin()?,
            content: Content::builtin()?,
        })
    }

    pub fn with_config(config: GameConfig) -> Result<Self> {
        Ok(Self { config, content: Content::builtin()? })
    }
}
