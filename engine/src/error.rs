use thiserror::Error;

use crate::items::Slot;

/// Rule violations and load failures. An operation that returns an error
/// leaves the game state untouched.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("that can only be done in town")]
    NotInTown,

    #[error("there is no fight in progress")]
    NotInCombat,

    #[error("the monster on this floor is still alive")]
    FloorNotCleared,

    #[error("not enough gold: need {needed}, have {available}")]
    InsufficientGold { needed: u32, available: u32 },

    #[error("no potions left")]
    NoPotions,

    #[error("unknown skill '{0}'")]
    UnknownSkill(String),

    #[error("skill '{0}' has not been learned")]
    SkillNotLearned(String),

    #[error("skill '{id}' is on cooldown for {remaining} more turn(s)")]
    SkillOnCooldown { id: String, remaining: u32 },

    #[error("skill '{0}' is already mastered")]
    SkillMaxed(String),

    #[error("no skill points available")]
    NoSkillPoints,

    #[error("prerequisite skills for '{0}' must be learned first")]
    DependenciesUnmet(String),

    #[error("level {required} is required")]
    LevelTooLow { required: u32 },

    #[error("skill '{0}' is passive")]
    NotActiveSkill(String),

    #[error("unknown item {0}")]
    UnknownItem(u32),

    #[error("no inventory item at index {0}")]
    InventoryIndex(usize),

    #[error("nothing equipped in the {0} slot")]
    EmptySlot(Slot),

    #[error("item is already at the maximum enhancement level {0}")]
    EnhanceMaxed(u8),

    #[error("no quest at index {0}")]
    UnknownQuest(usize),

    #[error("quest '{0}' is not complete yet")]
    QuestIncomplete(String),

    #[error("quest '{0}' was already claimed")]
    QuestClaimed(String),

    #[error("invalid content: {0}")]
    Content(String),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("save error: {0}")]
    Save(String),
}

pub type Result<T> = std::result::Result<T, GameError>;
