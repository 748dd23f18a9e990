//! Data-driven game balance
//!
//! Defaults mirror `crate::consts`. A JSON file may override any subset of
//! fields; missing fields keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::StorageError;

/// Gameplay rates and thresholds read by the simulation each tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Base scroll speed (pixels per frame)
    pub movement_speed: f32,
    pub gravity: f32,
    pub ascent_accel: f32,
    pub max_lives: u8,

    pub powerup_duration_ms: f64,
    pub powerup_spawn_chance: f64,

    pub speed_increase_interval_ms: f64,
    pub speed_increase_amount: f32,
    /// Frames between obstacle spawns at run start
    pub obstacle_spawn_interval: u32,
    pub min_obstacle_spawn_interval: u32,
    pub obstacle_spawn_interval_step: u32,

    pub invincibility_ms: f64,
    pub score_interval_frames: u64,
    pub score_per_interval: u64,

    pub initial_obstacles: usize,
    pub ambient_particles: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            movement_speed: MOVEMENT_SPEED,
            gravity: GRAVITY,
            ascent_accel: ASCENT_ACCEL,
            max_lives: MAX_LIVES,

            powerup_duration_ms: POWERUP_DURATION_MS,
            powerup_spawn_chance: POWERUP_SPAWN_CHANCE,

            speed_increase_interval_ms: SPEED_INCREASE_INTERVAL_MS,
            speed_increase_amount: SPEED_INCREASE_AMOUNT,
            obstacle_spawn_interval: OBSTACLE_SPAWN_INTERVAL,
            min_obstacle_spawn_interval: MIN_OBSTACLE_SPAWN_INTERVAL,
            obstacle_spawn_interval_step: OBSTACLE_SPAWN_INTERVAL_STEP,

            invincibility_ms: INVINCIBILITY_MS,
            score_interval_frames: SCORE_INTERVAL_FRAMES,
            score_per_interval: SCORE_PER_INTERVAL,

            initial_obstacles: INITIAL_OBSTACLES,
            ambient_particles: AMBIENT_PARTICLE_COUNT,
        }
    }
}

impl Tuning {
    /// Parse tuning overrides from JSON
    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        let tuning: Self = serde_json::from_str(json).map_err(|source| StorageError::Malformed {
            key: "tuning".to_string(),
            source,
        })?;
        Ok(tuning.sanitized())
    }

    /// Load tuning from a JSON file
    pub fn load_file(path: &Path) -> Result<Self, StorageError> {
        let json = std::fs::read_to_string(path).map_err(|source| StorageError::Io {
            key: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Clamp values that would stall or break the simulation
    fn sanitized(mut self) -> Self {
        if self.score_interval_frames == 0 {
            log::warn!("score_interval_frames must be positive, using default");
            self.score_interval_frames = SCORE_INTERVAL_FRAMES;
        }
        if self.min_obstacle_spawn_interval == 0 {
            log::warn!("min_obstacle_spawn_interval must be positive, using default");
            self.min_obstacle_spawn_interval = MIN_OBSTACLE_SPAWN_INTERVAL;
        }
        self.obstacle_spawn_interval = self
            .obstacle_spawn_interval
            .max(self.min_obstacle_spawn_interval);
        self.max_lives = self.max_lives.max(1);
        self.powerup_spawn_chance = self.powerup_spawn_chance.clamp(0.0, 1.0);
        self
    }
}
