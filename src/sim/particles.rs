//! Snow and effect particles
//!
//! Ambient snow lives forever and wraps around the playfield. Effect
//! particles (collision and pickup bursts) fade out over a fixed number of
//! frames. `advance` is a pure function of its input.

use std::ops::Range;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::colors;
use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};

/// How long a particle lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifetime {
    /// Ambient snow, never removed
    Infinite,
    /// Removed once `age >= frames`
    Frames(u32),
}

/// A single particle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub color: u32,
    pub alpha: f32,
    /// Frames lived so far
    pub age: u32,
    pub lifetime: Lifetime,
}

impl Particle {
    pub fn is_ambient(&self) -> bool {
        self.lifetime == Lifetime::Infinite
    }

    pub fn is_expired(&self) -> bool {
        match self.lifetime {
            Lifetime::Infinite => false,
            Lifetime::Frames(max) => self.age >= max,
        }
    }
}

/// Parameters for a radial burst
#[derive(Debug, Clone)]
pub struct BurstSpec {
    pub color: u32,
    pub count: usize,
    pub speed: Range<f32>,
    pub size: Range<f32>,
    pub lifetime_frames: u32,
}

impl BurstSpec {
    /// White debris when the player hits an obstacle
    pub fn collision() -> Self {
        Self {
            color: colors::SNOW,
            count: 20,
            speed: 1.0..4.0,
            size: 2.0..6.0,
            lifetime_frames: 30,
        }
    }

    /// Sparkles in the power-up's color
    pub fn pickup(color: u32) -> Self {
        Self {
            color,
            count: 30,
            speed: 2.0..6.0,
            size: 3.0..8.0,
            lifetime_frames: 40,
        }
    }
}

/// Create `count` snow particles scattered over the playfield
pub fn spawn_ambient<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Particle> {
    (0..count)
        .map(|_| Particle {
            pos: Vec2::new(
                rng.random::<f32>() * CANVAS_WIDTH,
                rng.random::<f32>() * CANVAS_HEIGHT,
            ),
            vel: Vec2::new(rng.random::<f32>() * 0.5 - 0.25, rng.random::<f32>() + 0.5),
            size: rng.random::<f32>() * 3.0 + 1.0,
            color: colors::SNOW,
            alpha: rng.random::<f32>() * 0.7 + 0.3,
            age: 0,
            lifetime: Lifetime::Infinite,
        })
        .collect()
}

/// Create a radial burst of finite-lifetime particles at `origin`
pub fn spawn_burst<R: Rng + ?Sized>(origin: Vec2, spec: &BurstSpec, rng: &mut R) -> Vec<Particle> {
    (0..spec.count)
        .map(|_| {
            let angle = rng.random::<f32>() * std::f32::consts::TAU;
            let speed = sample(&spec.speed, rng);
            Particle {
                pos: origin,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                size: sample(&spec.size, rng),
                color: spec.color,
                alpha: 1.0,
                age: 0,
                lifetime: Lifetime::Frames(spec.lifetime_frames),
            }
        })
        .collect()
}

/// Advance every particle by one frame and drop expired ones
pub fn advance(particles: Vec<Particle>) -> Vec<Particle> {
    particles
        .into_iter()
        .filter_map(|mut p| {
            p.pos += p.vel;
            p.age = p.age.saturating_add(1);

            match p.lifetime {
                Lifetime::Infinite => {
                    if p.pos.x < 0.0 {
                        p.pos.x = CANVAS_WIDTH;
                    }
                    if p.pos.x > CANVAS_WIDTH {
                        p.pos.x = 0.0;
                    }
                    if p.pos.y > CANVAS_HEIGHT {
                        p.pos.y = 0.0;
                    }
                    // Gentle sideways drift
                    p.pos.x += (p.age as f32 * 0.01).sin() * 0.5;
                }
                Lifetime::Frames(max) => {
                    p.alpha = (1.0 - p.age as f32 / max as f32).max(0.0);
                    p.vel *= 0.95;
                }
            }

            (!p.is_expired()).then_some(p)
        })
        .collect()
}

/// Uniform sample from a half-open range; empty ranges yield their start
fn sample<R: Rng + ?Sized>(range: &Range<f32>, rng: &mut R) -> f32 {
    if range.is_empty() {
        range.start
    } else {
        rng.random_range(range.clone())
    }
}
