pub mod api;
pub mod combat;
pub mod conditions;
pub mod config;
pub mod content;
pub mod dungeon;
pub mod enhance;
pub mod error;
pub mod game;
pub mod items;
pub mod life;
pub mod player;
pub mod quests;
pub mod save;
pub mod skills;
pub mod stats;
pub mod telemetry;
pub mod town;

pub use config::{Difficulty, GameConfig};
pub use content::{ClassKind, Content, Rules};
pub use error::GameError;
pub use game::{ActionReport, Game, Location, Outcome};
pub use items::{Item, Rarity, Slot};
pub use player::Player;
pub use stats::{StatKind, Stats};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

enum Source {
    Seeded(ChaCha8Rng),
    Scripted { values: Vec<f64>, next: usize },
}

/// Every random decision in the engine draws one uniform value in `[0, 1)`.
pub struct Dice {
    source: Source,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self { source: Source::Seeded(ChaCha8Rng::seed_from_u64(seed)) }
    }

    /// Replays `values` in order, wrapping around when exhausted. An empty
    /// script always yields 0.0.
    pub fn from_scripted(values: Vec<f64>) -> Self {
        Self { source: Source::Scripted { values, next: 0 } }
    }

    pub fn roll(&mut self) -> f64 {
        match &mut self.source {
            Source::Seeded(rng) => rng.gen_range(0.0..1.0),
            Source::Scripted { values, next } => {
                if values.is_empty() {
                    return 0.0;
                }
                let v = values[*next % values.len()];
                *next += 1;
                v
            }
        }
    }

    /// True when the draw lands strictly below `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.roll() < p
    }

    /// Uniform index into a collection of `len` elements.
    pub fn pick(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.roll() * len as f64) as usize).min(len - 1)
    }

    /// `low + roll * width`, the shape used for damage variance.
    pub fn spread(&mut self, low: f64, width: f64) -> f64 {
        low + self.roll() * width
    }
}
