//! Alpine Rush - A side-scrolling snowboard arcade game
//!
//! Core modules:
//! - `sim`: Per-frame simulation (physics, power-ups, collisions, particles)
//! - `engine`: Loop driver owning the run, storage and achievement bookkeeping
//! - `achievements` / `stats`: Unlock catalog and cumulative statistics
//! - `persistence`: Storage trait with memory, JSON-file and LocalStorage backends
//! - `render`: Engine-agnostic draw intents built from run snapshots
//! - `tuning`: Data-driven game balance

pub mod achievements;
pub mod assets;
pub mod audio;
pub mod characters;
pub mod engine;
pub mod error;
pub mod highscores;
pub mod notifications;
pub mod persistence;
pub mod platform;
pub mod render;
pub mod settings;
pub mod sim;
pub mod stats;
pub mod tuning;

pub use engine::{Engine, Intent, TickReport};
pub use error::{AssetError, EngineError, StorageError};
pub use highscores::HighScores;
pub use settings::Settings;
pub use stats::GameStats;
pub use tuning::Tuning;

/// Display name used in HUD and share text
pub const GAME_NAME: &str = "Alpine Rush";

/// Game configuration constants
pub mod consts {
    /// Playfield dimensions
    pub const CANVAS_WIDTH: f32 = 1000.0;
    pub const CANVAS_HEIGHT: f32 = 500.0;

    /// Base horizontal scroll speed (pixels per frame)
    pub const MOVEMENT_SPEED: f32 = 1.5;
    /// Downward acceleration per frame when not ascending
    pub const GRAVITY: f32 = 0.2;
    /// Upward acceleration per frame while ascending
    pub const ASCENT_ACCEL: f32 = 0.2;

    /// Player sprite extents; the player x never changes
    pub const PLAYER_WIDTH: f32 = 32.0;
    pub const PLAYER_HEIGHT: f32 = 32.0;
    pub const PLAYER_X: f32 = 100.0;
    /// Vertical band the player is clamped to
    pub const PLAYER_MIN_Y: f32 = 50.0;
    pub const PLAYER_MAX_Y: f32 = CANVAS_HEIGHT - 70.0;

    /// Obstacle sprite extents
    pub const OBSTACLE_WIDTH: f32 = 32.0;
    pub const OBSTACLE_HEIGHT: f32 = 48.0;

    pub const MAX_LIVES: u8 = 3;

    pub const POWERUP_SIZE: f32 = 30.0;
    /// Lifetime of a timed power-up effect
    pub const POWERUP_DURATION_MS: f64 = 10_000.0;
    /// Probability of a power-up spawning on any given frame
    pub const POWERUP_SPAWN_CHANCE: f64 = 0.01;

    /// Ambient snow particles created once per engine
    pub const AMBIENT_PARTICLE_COUNT: usize = 100;

    /// Difficulty ramp
    pub const SPEED_INCREASE_INTERVAL_MS: f64 = 2000.0;
    pub const SPEED_INCREASE_AMOUNT: f32 = 0.1;
    pub const OBSTACLE_SPAWN_INTERVAL: u32 = 120;
    pub const MIN_OBSTACLE_SPAWN_INTERVAL: u32 = 30;
    pub const OBSTACLE_SPAWN_INTERVAL_STEP: u32 = 5;

    /// New entities appear this far past the right edge
    pub const SPAWN_MARGIN: f32 = 50.0;
    /// Entities at or left of this x are discarded
    pub const DESPAWN_X: f32 = -50.0;
    /// Window behind the player in which an obstacle counts as avoided
    pub const AVOID_EPSILON: f32 = 5.0;

    /// Trail ribbon
    pub const TRAIL_LENGTH: usize = 50;
    pub const TRAIL_OFFSET_Y: f32 = 10.0;

    /// Score accrual cadence
    pub const SCORE_INTERVAL_FRAMES: u64 = 60;
    pub const SCORE_PER_INTERVAL: u64 = 10;

    /// Post-hit flicker window during which collisions are ignored
    pub const INVINCIBILITY_MS: f64 = 2000.0;

    /// Obstacles scattered across the slope when a run begins
    pub const INITIAL_OBSTACLES: usize = 6;

    /// High score leaderboard size
    pub const MAX_HIGH_SCORES: usize = 5;
}

/// Palette shared by simulation effects and draw intents (0xRRGGBB)
pub mod colors {
    pub const SKY_TOP: u32 = 0x87ceeb;
    pub const SKY_BOTTOM: u32 = 0xe0f7ff;
    pub const SNOW: u32 = 0xffffff;
    pub const SKI_TRAIL: u32 = 0xe6f2ff;
    pub const HEART: u32 = 0xff3366;
    pub const SHIELD: u32 = 0x4287f5;
    pub const MULTIPLIER: u32 = 0xf7d51d;
    pub const SPEED_BOOST: u32 = 0x32cd32;
    pub const EXTRA_LIFE: u32 = 0xff69b4;
    pub const COLLISION: u32 = 0xff0000;
    pub const TEXT: u32 = 0x000000;
}

/// Format whole seconds as `MM:SS`
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", (seconds / 60) % 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(75), "01:15");
        assert_eq!(format_clock(3599), "59:59");
    }
}
