//! Persisting a game under a single storage key.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::game::Game;

pub const SAVE_KEY: &str = "dungeon-rpg-save";

/// Current save document version.
pub const SAVE_VERSION: u32 = 1;

/// Key-value storage for serialized games. Implementations decide where the
/// text lives.
pub trait SaveStore {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn store(&mut self, key: &str, value: String) -> Result<()>;
}

/// In-process store, for tests and embedders that persist elsewhere.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: IndexMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn store(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

#[derive(Serialize)]
struct SaveDocument<'a> {
    version: u32,
    state: &'a Game,
}

#[derive(Deserialize)]
struct RawDocument {
    version: u32,
    state: serde_json::Value,
}

pub fn to_json(game: &Game) -> Result<String> {
    serde_json::to_string(&SaveDocument { version: SAVE_VERSION, state: game })
        .map_err(|e| GameError::Save(e.to_string()))
}

pub fn from_json(text: &str) -> Result<Game> {
    let raw: RawDocument = serde_json::from_str(text).map_err(|e| GameError::Save(e.to_string()))?;
    if raw.version != SAVE_VERSION {
        return Err(GameError::Save(format!(
            "incompatible save version: expected {}, found {}",
            SAVE_VERSION, raw.version
        )));
    }
    serde_json::from_value(raw.state).map_err(|e| GameError::Save(e.to_string()))
}

pub fn save_game(store: &mut impl SaveStore, game: &Game) -> Result<()> {
    let text = to_json(game)?;
    store.store(SAVE_KEY, text)?;
    tracing::debug!(key = SAVE_KEY, "game saved");
    Ok(())
}

/// `Ok(None)` when nothing has been saved yet.
pub fn load_game(store: &impl SaveStore) -> Result<Option<Game>> {
    match store.load(SAVE_KEY)? {
        Some(text) => from_json(&text).map(Some),
        None => Ok(None),
    }
}
