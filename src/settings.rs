//! Player preferences
//!
//! Persisted through the storage backend next to the game records.

use serde::{Deserialize, Serialize};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Silences music and sound cues
    pub muted: bool,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Sound effects volume (0.0 - 1.0), scaling every cue's tone gain
    pub sfx_volume: f32,

    // === Last session ===
    /// Character picked for the previous run
    pub last_character: u32,
    /// Name entered on the last high score
    pub last_player_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            muted: false,
            music_volume: 0.2,
            sfx_volume: 1.0,
            last_character: 0,
            last_player_name: String::new(),
        }
    }
}

impl Settings {
    /// Effective music gain (0 while muted)
    pub fn music_gain(&self) -> f32 {
        if self.muted { 0.0 } else { self.music_volume.clamp(0.0, 1.0) }
    }

    /// Effective sound effect gain (0 while muted)
    pub fn sfx_gain(&self) -> f32 {
        if self.muted { 0.0 } else { self.sfx_volume.clamp(0.0, 1.0) }
    }
}
