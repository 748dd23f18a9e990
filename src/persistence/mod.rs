//! Persistence of achievements, stats, high scores and settings
//!
//! Records are JSON strings in a flat key-value backend:
//! - `MemoryStore` for tests and headless runs
//! - `JsonFileStore`, one file per key (native)
//! - `LocalStore`, browser LocalStorage (wasm32)
//!
//! Loads never fail: a missing record yields the default and a broken one
//! is logged and replaced by the default.

pub mod backends;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::achievements::{self, Achievement, AchievementRecord};
use crate::error::StorageError;
use crate::highscores::HighScores;
use crate::settings::Settings;
use crate::stats::GameStats;

#[cfg(not(target_arch = "wasm32"))]
pub use backends::JsonFileStore;
#[cfg(target_arch = "wasm32")]
pub use backends::LocalStore;
pub use backends::MemoryStore;

pub const ACHIEVEMENTS_KEY: &str = "alpineRushAchievements";
pub const STATS_KEY: &str = "alpineRushStats";
pub const HIGH_SCORES_KEY: &str = "alpineRushHighScores";
pub const SETTINGS_KEY: &str = "alpineRushSettings";

/// Flat string key-value backend
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Record-level persistence used by the engine
pub trait Storage {
    fn load_achievements(&self) -> Vec<Achievement>;
    fn save_achievements(&mut self, achievements: &[Achievement]);
    fn load_game_stats(&self) -> GameStats;
    fn save_game_stats(&mut self, stats: &GameStats);
    fn load_high_scores(&self) -> HighScores;
    /// Insert a score and return the updated board
    fn save_high_score(&mut self, score: u64, name: &str) -> HighScores;
    fn load_settings(&self) -> Settings;
    fn save_settings(&mut self, settings: &Settings);
}

/// JSON records on top of any [`KeyValueStore`]
#[derive(Debug, Default)]
pub struct GameStorage<B> {
    backend: B,
}

impl<B: KeyValueStore> GameStorage<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(json) = self.backend.get(key)? else {
            return Ok(None);
        };
        let value = serde_json::from_str(&json).map_err(|source| StorageError::Malformed {
            key: key.to_string(),
            source,
        })?;
        Ok(Some(value))
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value).map_err(|source| StorageError::Malformed {
            key: key.to_string(),
            source,
        })?;
        self.backend.set(key, &json)
    }

    /// Read a record, falling back to `T::default()` on any failure
    fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.read_json(key) {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(e) => {
                log::warn!("Using defaults for {key}: {e}");
                T::default()
            }
        }
    }

    fn save_logged<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        if let Err(e) = self.write_json(key, value) {
            log::error!("Failed to save {key}: {e}");
        }
    }
}

impl<B: KeyValueStore> Storage for GameStorage<B> {
    fn load_achievements(&self) -> Vec<Achievement> {
        match self.read_json::<Vec<AchievementRecord>>(ACHIEVEMENTS_KEY) {
            Ok(Some(records)) => achievements::restore_from_records(&records),
            Ok(None) => achievements::catalog(),
            Err(e) => {
                log::warn!("Resetting achievements: {e}");
                achievements::catalog()
            }
        }
    }

    fn save_achievements(&mut self, achievements: &[Achievement]) {
        let records = achievements::to_records(achievements);
        self.save_logged(ACHIEVEMENTS_KEY, &records);
    }

    fn load_game_stats(&self) -> GameStats {
        self.load_or_default(STATS_KEY)
    }

    fn save_game_stats(&mut self, stats: &GameStats) {
        self.save_logged(STATS_KEY, stats);
    }

    fn load_high_scores(&self) -> HighScores {
        let scores: HighScores = self.load_or_default(HIGH_SCORES_KEY);
        HighScores::from_entries(scores.entries)
    }

    fn save_high_score(&mut self, score: u64, name: &str) -> HighScores {
        let mut scores = self.load_high_scores();
        match scores.add_score(score, name, &crate::platform::today()) {
            Some(rank) => {
                log::info!("High score {score} placed #{rank}");
                self.save_logged(HIGH_SCORES_KEY, &scores);
            }
            None => log::debug!("Score {score} did not make the board"),
        }
        scores
    }

    fn load_settings(&self) -> Settings {
        self.load_or_default(SETTINGS_KEY)
    }

    fn save_settings(&mut self, settings: &Settings) {
        self.save_logged(SETTINGS_KEY, settings);
    }
}
