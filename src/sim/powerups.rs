//! Power-up entities and timed effects
//!
//! A power-up is `Spawned` on the slope, becomes an `ActiveEffect` when the
//! player picks it up, and is dropped again when its expiry passes. Effects
//! only touch the run through [`EffectTarget`].

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::colors;
use crate::consts::{PLAYER_WIDTH, POWERUP_SIZE};

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Shield,
    ScoreMultiplier,
    SpeedBoost,
    ExtraLife,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Shield,
        PowerUpKind::ScoreMultiplier,
        PowerUpKind::SpeedBoost,
        PowerUpKind::ExtraLife,
    ];

    /// Uniformly random kind
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Effect magnitude carried by a fresh power-up of this kind
    pub fn magnitude(&self) -> f32 {
        match self {
            PowerUpKind::Shield => 1.0,
            PowerUpKind::ScoreMultiplier => 2.0,
            PowerUpKind::SpeedBoost => 1.5,
            PowerUpKind::ExtraLife => 1.0,
        }
    }

    pub fn color(&self) -> u32 {
        match self {
            PowerUpKind::Shield => colors::SHIELD,
            PowerUpKind::ScoreMultiplier => colors::MULTIPLIER,
            PowerUpKind::SpeedBoost => colors::SPEED_BOOST,
            PowerUpKind::ExtraLife => colors::EXTRA_LIFE,
        }
    }

    /// Whether collecting this kind creates a timed active effect
    pub fn is_timed(&self) -> bool {
        !matches!(self, PowerUpKind::ExtraLife)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::Shield => "shield",
            PowerUpKind::ScoreMultiplier => "multiplier",
            PowerUpKind::SpeedBoost => "speedBoost",
            PowerUpKind::ExtraLife => "extraLife",
        }
    }
}

/// A power-up on the slope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub collected: bool,
    pub active: bool,
    /// Absolute expiry (ms); `None` for instant effects
    pub expires_at: Option<f64>,
    pub value: f32,
}

impl PowerUp {
    pub fn new(kind: PowerUpKind, pos: Vec2) -> Self {
        Self {
            kind,
            pos,
            collected: false,
            active: false,
            expires_at: None,
            value: kind.magnitude(),
        }
    }
}

/// A collected power-up currently modifying the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub kind: PowerUpKind,
    pub value: f32,
    pub expires_at: f64,
}

impl ActiveEffect {
    /// Milliseconds until expiry, never negative
    pub fn remaining_ms(&self, now_ms: f64) -> f64 {
        (self.expires_at - now_ms).max(0.0)
    }
}

/// The run fields a power-up effect is allowed to change
pub trait EffectTarget {
    fn set_shield(&mut self, on: bool);
    fn set_score_multiplier(&mut self, multiplier: u32);
    fn set_speed_boost(&mut self, boost: f32);
    fn lives(&self) -> u8;
    fn set_lives(&mut self, lives: u8);
}

/// Axis-aligned pickup test between the player and a power-up
pub fn check_pickup(player_pos: Vec2, power_up: &PowerUp) -> bool {
    let reach = (PLAYER_WIDTH + POWERUP_SIZE) / 2.0;
    let d = (player_pos - power_up.pos).abs();
    d.x < reach && d.y < reach
}

/// Collect a power-up and apply its effect.
///
/// Returns the active effect to track, if the kind is timed. A power-up that
/// was already collected is left untouched and yields `None`.
pub fn apply_effect(
    power_up: &mut PowerUp,
    target: &mut impl EffectTarget,
    now_ms: f64,
    duration_ms: f64,
    max_lives: u8,
) -> Option<ActiveEffect> {
    if power_up.collected {
        return None;
    }
    power_up.collected = true;
    power_up.active = true;

    match power_up.kind {
        PowerUpKind::Shield => target.set_shield(true),
        PowerUpKind::ScoreMultiplier => target.set_score_multiplier(power_up.value.round() as u32),
        PowerUpKind::SpeedBoost => target.set_speed_boost(power_up.value),
        PowerUpKind::ExtraLife => {
            let lives = target.lives().saturating_add(1).min(max_lives);
            target.set_lives(lives);
            power_up.expires_at = None;
            power_up.active = false;
            return None;
        }
    }

    let expires_at = now_ms + duration_ms;
    power_up.expires_at = Some(expires_at);
    Some(ActiveEffect {
        kind: power_up.kind,
        value: power_up.value,
        expires_at,
    })
}

/// Track a new effect; an existing effect of the same kind is replaced
pub fn activate(effects: &mut Vec<ActiveEffect>, effect: ActiveEffect) {
    if let Some(existing) = effects.iter_mut().find(|e| e.kind == effect.kind) {
        *existing = effect;
    } else {
        effects.push(effect);
    }
}

/// Revert and remove every effect whose expiry is at or before `now_ms`.
///
/// The shield flag is not reverted here; only a collision consumes it.
/// Returns the kinds that expired on this call.
pub fn advance_active_effects(
    effects: &mut Vec<ActiveEffect>,
    target: &mut impl EffectTarget,
    now_ms: f64,
) -> Vec<PowerUpKind> {
    let mut expired = Vec::new();
    effects.retain(|effect| {
        if effect.expires_at > now_ms {
            return true;
        }
        match effect.kind {
            PowerUpKind::ScoreMultiplier => target.set_score_multiplier(1),
            PowerUpKind::SpeedBoost => target.set_speed_boost(1.0),
            PowerUpKind::Shield | PowerUpKind::ExtraLife => {}
        }
        expired.push(effect.kind);
        false
    });
    expired
}
