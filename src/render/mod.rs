//! Draw intents
//!
//! Turns a [`RunSnapshot`] into a flat list of [`DrawCommand`]s, back to
//! front. A host rasterizes them with whatever backend it has (canvas,
//! wgpu, a terminal); nothing here touches pixels.

pub mod hud;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::assets::SpriteSlot;
use crate::characters::Character;
use crate::colors;
use crate::consts::{
    CANVAS_HEIGHT, CANVAS_WIDTH, OBSTACLE_HEIGHT, OBSTACLE_WIDTH, PLAYER_HEIGHT, PLAYER_WIDTH,
};
use crate::sim::{Particle, PowerUpKind, RunPhase, RunSnapshot};

pub use hud::{build_hud, build_toast};

/// Height of the snow bank along the bottom edge
pub const GROUND_HEIGHT: f32 = 50.0;
/// Alpha of the character tint laid over the shared player sprite
pub const TINT_ALPHA: f32 = 0x55 as f32 / 255.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// One drawing primitive; colors are 0xRRGGBB
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCommand {
    /// Vertical gradient over the whole playfield
    Gradient { top: u32, bottom: u32 },
    Rect {
        pos: Vec2,
        size: Vec2,
        color: u32,
        alpha: f32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: u32,
        alpha: f32,
    },
    /// Filled disc with an outline
    Ring {
        center: Vec2,
        radius: f32,
        fill: u32,
        fill_alpha: f32,
        stroke: u32,
        width: f32,
    },
    Polyline {
        points: Vec<Vec2>,
        color: u32,
        width: f32,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: u32,
        width: f32,
    },
    /// Sprite with `pos` at its top-left corner
    Sprite {
        slot: SpriteSlot,
        pos: Vec2,
        size: Vec2,
        /// Rotation about the sprite center, radians
        rotation: f32,
        alpha: f32,
        tint: Option<u32>,
    },
    /// Vector icon of a power-up, centered, at `scale` times its nominal size
    PowerUpIcon {
        kind: PowerUpKind,
        center: Vec2,
        scale: f32,
    },
    Heart { center: Vec2, size: f32 },
    Text {
        text: String,
        pos: Vec2,
        size_px: f32,
        color: u32,
        align: TextAlign,
        alpha: f32,
    },
}

/// Everything drawn for one frame of a run, HUD included
pub fn build_frame(snapshot: &RunSnapshot, character: &Character, now_ms: f64) -> Vec<DrawCommand> {
    let mut out = Vec::with_capacity(
        snapshot.ambient.len() + snapshot.particles.len() + snapshot.obstacles.len() + 32,
    );

    background(&mut out, &snapshot.ambient);

    if snapshot.trail.len() >= 2 {
        out.push(DrawCommand::Polyline {
            points: snapshot.trail.iter().map(|p| p.pos).collect(),
            color: colors::SKI_TRAIL,
            width: 2.0,
        });
    }

    let pulse = 1.0 + (snapshot.frame as f32 * 0.1).sin() * 0.1;
    out.extend(snapshot.power_ups.iter().map(|p| DrawCommand::PowerUpIcon {
        kind: p.kind,
        center: p.pos,
        scale: pulse,
    }));

    // Obstacles stand on their anchor point
    out.extend(snapshot.obstacles.iter().map(|o| DrawCommand::Sprite {
        slot: o.variant.into(),
        pos: Vec2::new(o.pos.x - OBSTACLE_WIDTH / 2.0, o.pos.y - OBSTACLE_HEIGHT),
        size: Vec2::new(OBSTACLE_WIDTH, OBSTACLE_HEIGHT),
        rotation: 0.0,
        alpha: 1.0,
        tint: None,
    }));

    player(&mut out, snapshot, character, now_ms);
    particles(&mut out, &snapshot.particles);
    build_hud(&mut out, snapshot);

    out
}

fn background(out: &mut Vec<DrawCommand>, ambient: &[Particle]) {
    out.push(DrawCommand::Gradient {
        top: colors::SKY_TOP,
        bottom: colors::SKY_BOTTOM,
    });
    particles(out, ambient);
    out.push(DrawCommand::Rect {
        pos: Vec2::new(0.0, CANVAS_HEIGHT - GROUND_HEIGHT),
        size: Vec2::new(CANVAS_WIDTH, GROUND_HEIGHT),
        color: colors::SNOW,
        alpha: 1.0,
    });
}

fn particles(out: &mut Vec<DrawCommand>, particles: &[Particle]) {
    out.extend(particles.iter().map(|p| DrawCommand::Circle {
        center: p.pos,
        radius: p.size,
        color: p.color,
        alpha: p.alpha,
    }));
}

/// Half alpha on even 100 ms slots while invincible
pub fn flicker_alpha(invincible: bool, now_ms: f64) -> f32 {
    if invincible && (now_ms / 100.0).floor() as i64 % 2 == 0 {
        0.5
    } else {
        1.0
    }
}

fn player(out: &mut Vec<DrawCommand>, snapshot: &RunSnapshot, character: &Character, now_ms: f64) {
    let center = snapshot.player.pos;

    if snapshot.has_shield {
        out.push(DrawCommand::Ring {
            center,
            radius: PLAYER_WIDTH * 0.8,
            fill: colors::SHIELD,
            fill_alpha: 0.3,
            stroke: colors::SHIELD,
            width: 2.0,
        });
    }

    // The first character is the untinted sprite
    let tint = (character.id > 0).then_some(character.color);
    let rotation = if snapshot.phase == RunPhase::Over {
        -std::f32::consts::FRAC_PI_2
    } else {
        0.0
    };
    out.push(DrawCommand::Sprite {
        slot: SpriteSlot::Player,
        pos: center - Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT) / 2.0,
        size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
        rotation,
        alpha: flicker_alpha(snapshot.invincible, now_ms),
        tint,
    });

    if snapshot.speed_boost > 1.0 {
        // Jitter derives from the frame so a snapshot always draws the same way
        let mut rng = Pcg32::seed_from_u64(snapshot.frame);
        let tail_x = center.x - PLAYER_WIDTH / 2.0;
        for _ in 0..5 {
            let length = rng.random::<f32>() * 20.0 + 10.0;
            let y = center.y + rng.random::<f32>() * 20.0 - 10.0;
            out.push(DrawCommand::Line {
                from: Vec2::new(tail_x, y),
                to: Vec2::new(tail_x - length, y),
                color: colors::SPEED_BOOST,
                width: 2.0,
            });
        }
    }
}
