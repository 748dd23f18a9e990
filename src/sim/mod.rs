//! Run simulation
//!
//! All gameplay logic for a single run lives here. Nothing in this module
//! touches rendering, audio or storage:
//! - Wall-clock timestamps are passed in by the caller
//! - Randomness comes from the run's seeded RNG
//! - Subsystems borrow `RunState` for one call only

pub mod collision;
pub mod particles;
pub mod physics;
pub mod powerups;
pub mod state;
pub mod tick;

pub use collision::{CollisionOutcome, proximity};
pub use particles::{BurstSpec, Lifetime, Particle, spawn_ambient};
pub use powerups::{ActiveEffect, EffectTarget, PowerUp, PowerUpKind};
pub use state::{
    EffectView, GameEvent, Obstacle, ObstacleVariant, Player, RunPhase, RunSnapshot, RunState,
    TrailPoint, SNOWMAN_VARIANTS, TREE_VARIANTS,
};
pub use tick::{TickInput, tick};
