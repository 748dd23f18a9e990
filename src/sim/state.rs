//! Run state and core simulation types
//!
//! `RunState` is the single mutable aggregate for one run. Only the loop
//! driver mutates it; renderers read a [`RunSnapshot`] instead.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::particles::Particle;
use super::powerups::{ActiveEffect, EffectTarget, PowerUp, PowerUpKind};
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Active gameplay
    Playing,
    /// Frozen until resumed
    Paused,
    /// Lives exhausted (terminal)
    Over,
}

/// Number of tree sprite variants
pub const TREE_VARIANTS: u8 = 4;
/// Number of snowman sprite variants
pub const SNOWMAN_VARIANTS: u8 = 6;

/// Sprite family and index of an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleVariant {
    Tree(u8),
    Snowman(u8),
}

impl ObstacleVariant {
    /// Trees are picked 70% of the time
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.random::<f32>() > 0.3 {
            ObstacleVariant::Tree(rng.random_range(0..TREE_VARIANTS))
        } else {
            ObstacleVariant::Snowman(rng.random_range(0..SNOWMAN_VARIANTS))
        }
    }
}

/// A tree or snowman scrolling toward the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub pos: Vec2,
    pub variant: ObstacleVariant,
}

/// Trail sample behind the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
}

/// The snowboarder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel_y: f32,
    /// Ascent intent (space held / touch down)
    pub ascending: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(PLAYER_X, CANVAS_HEIGHT / 2.0),
            vel_y: 0.0,
            ascending: false,
        }
    }
}

impl Player {
    /// Accelerate toward the ascent or descent terminal speed, move, clamp
    pub fn step(&mut self, tuning: &Tuning) {
        let max_speed = tuning.movement_speed;
        if self.ascending {
            self.vel_y = (self.vel_y - tuning.ascent_accel).max(-max_speed);
        } else {
            self.vel_y = (self.vel_y + tuning.gravity).min(max_speed);
        }
        self.pos.y = (self.pos.y + self.vel_y).clamp(PLAYER_MIN_Y, PLAYER_MAX_Y);
    }
}

/// Notable things that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PowerUpCollected(PowerUpKind),
    PowerUpExpired(PowerUpKind),
    /// Player hit an obstacle; `absorbed` when a shield took the hit
    Collision { absorbed: bool },
    /// Speed ramp fired
    SpeedUp { multiplier: f32 },
    RunOver,
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct RunState {
    pub tuning: Tuning,
    pub character_id: u32,
    pub phase: RunPhase,
    pub player: Player,
    pub obstacles: Vec<Obstacle>,
    pub power_ups: Vec<PowerUp>,
    pub active_effects: Vec<ActiveEffect>,
    /// Newest first
    pub trail: Vec<TrailPoint>,
    /// Collision and pickup bursts
    pub particles: Vec<Particle>,
    /// Snow, carried over between runs
    pub ambient: Vec<Particle>,
    /// Simulation frame counter
    pub frame: u64,
    pub start_time_ms: f64,
    /// Set when the run ends
    pub end_time_ms: Option<f64>,
    pub last_speed_increase_ms: f64,
    /// Frames between obstacle spawns (decays with the speed ramp)
    pub spawn_interval: u32,
    pub score: u64,
    pub lives: u8,
    pub speed_multiplier: f32,
    pub has_shield: bool,
    pub score_multiplier: u32,
    pub speed_boost: f32,
    pub invincible_until_ms: f64,
    pub power_ups_collected: u32,
    pub obstacles_avoided: u32,
    pub(crate) rng: Pcg32,
}

impl RunState {
    /// Start a fresh run at `now_ms`
    pub fn new(tuning: Tuning, character_id: u32, ambient: Vec<Particle>, seed: u64, now_ms: f64) -> Self {
        let mut state = Self {
            character_id,
            phase: RunPhase::Playing,
            player: Player::default(),
            obstacles: Vec::new(),
            power_ups: Vec::new(),
            active_effects: Vec::new(),
            trail: Vec::with_capacity(TRAIL_LENGTH + 1),
            particles: Vec::new(),
            ambient,
            frame: 0,
            start_time_ms: now_ms,
            end_time_ms: None,
            last_speed_increase_ms: now_ms,
            spawn_interval: tuning.obstacle_spawn_interval,
            score: 0,
            lives: tuning.max_lives,
            speed_multiplier: 1.0,
            has_shield: false,
            score_multiplier: 1,
            speed_boost: 1.0,
            invincible_until_ms: 0.0,
            power_ups_collected: 0,
            obstacles_avoided: 0,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
        };

        for _ in 0..state.tuning.initial_obstacles {
            let x = state.rng.random::<f32>() * CANVAS_WIDTH;
            let y = random_lane_y(&mut state.rng);
            let variant = ObstacleVariant::random(&mut state.rng);
            state.obstacles.push(Obstacle {
                pos: Vec2::new(x, y),
                variant,
            });
        }

        state
    }

    pub fn is_over(&self) -> bool {
        self.phase == RunPhase::Over
    }

    pub fn is_invincible(&self, now_ms: f64) -> bool {
        now_ms < self.invincible_until_ms
    }

    /// Effective horizontal scroll per frame
    pub fn scroll_speed(&self) -> f32 {
        self.tuning.movement_speed * self.speed_multiplier * self.speed_boost
    }

    /// Whole seconds since the run started (frozen once the run is over)
    pub fn elapsed_secs(&self, now_ms: f64) -> u64 {
        let end = self.end_time_ms.unwrap_or(now_ms);
        ((end - self.start_time_ms) / 1000.0).max(0.0).floor() as u64
    }

    /// Build the read-only view handed to renderers
    pub fn snapshot(&self, now_ms: f64) -> RunSnapshot {
        RunSnapshot {
            phase: self.phase,
            character_id: self.character_id,
            frame: self.frame,
            player: self.player.clone(),
            obstacles: self.obstacles.clone(),
            power_ups: self.power_ups.clone(),
            active_effects: self
                .active_effects
                .iter()
                .map(|e| EffectView {
                    kind: e.kind,
                    remaining_ms: e.remaining_ms(now_ms),
                })
                .collect(),
            trail: self.trail.clone(),
            particles: self.particles.clone(),
            ambient: self.ambient.clone(),
            score: self.score,
            lives: self.lives,
            elapsed_secs: self.elapsed_secs(now_ms),
            speed: self.speed_multiplier * self.speed_boost,
            has_shield: self.has_shield,
            score_multiplier: self.score_multiplier,
            speed_boost: self.speed_boost,
            invincible: self.is_invincible(now_ms),
        }
    }
}

impl EffectTarget for RunState {
    fn set_shield(&mut self, on: bool) {
        self.has_shield = on;
    }

    fn set_score_multiplier(&mut self, multiplier: u32) {
        self.score_multiplier = multiplier;
    }

    fn set_speed_boost(&mut self, boost: f32) {
        self.speed_boost = boost;
    }

    fn lives(&self) -> u8 {
        self.lives
    }

    fn set_lives(&mut self, lives: u8) {
        self.lives = lives;
    }
}

/// Random y for a newly spawned obstacle or power-up
pub fn random_lane_y<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.random::<f32>() * (CANVAS_HEIGHT - 100.0) + 50.0
}

/// Remaining time of an active effect, for HUD timers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectView {
    pub kind: PowerUpKind,
    pub remaining_ms: f64,
}

/// Immutable view of a run for one rendered frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub phase: RunPhase,
    pub character_id: u32,
    pub frame: u64,
    pub player: Player,
    pub obstacles: Vec<Obstacle>,
    pub power_ups: Vec<PowerUp>,
    pub active_effects: Vec<EffectView>,
    pub trail: Vec<TrailPoint>,
    pub particles: Vec<Particle>,
    pub ambient: Vec<Particle>,
    pub score: u64,
    pub lives: u8,
    pub elapsed_secs: u64,
    /// Combined scroll speed multiplier shown in the HUD
    pub speed: f32,
    pub has_shield: bool,
    pub score_multiplier: u32,
    pub speed_boost: f32,
    pub invincible: bool,
}
