//! Entity and physics update
//!
//! Player kinematics, scrolling, the difficulty ramp and spawn scheduling.
//! Spawns are driven by the frame counter, the ramp by wall-clock time.

use glam::Vec2;
use rand::Rng;

use super::powerups::{PowerUp, PowerUpKind};
use super::state::{GameEvent, Obstacle, ObstacleVariant, RunState, TrailPoint, random_lane_y};
use crate::consts::*;

/// Run the whole entity/physics step for one frame
pub fn update_entities(state: &mut RunState, now_ms: f64, events: &mut Vec<GameEvent>) {
    if let Some(multiplier) = ramp_speed(state, now_ms) {
        events.push(GameEvent::SpeedUp { multiplier });
    }

    state.player.step(&state.tuning);
    record_trail(state);

    state.obstacles_avoided += count_avoided(&state.obstacles, state.player.pos.x);

    let dx = state.scroll_speed();
    scroll(state, dx);
    spawn(state);
}

/// Raise the speed multiplier once per ramp interval.
///
/// Returns the new multiplier when the ramp fired.
pub fn ramp_speed(state: &mut RunState, now_ms: f64) -> Option<f32> {
    if now_ms - state.last_speed_increase_ms < state.tuning.speed_increase_interval_ms {
        return None;
    }
    state.speed_multiplier += state.tuning.speed_increase_amount;
    state.spawn_interval = state
        .spawn_interval
        .saturating_sub(state.tuning.obstacle_spawn_interval_step)
        .max(state.tuning.min_obstacle_spawn_interval);
    state.last_speed_increase_ms = now_ms;
    log::debug!(
        "Speed ramp: x{:.1}, spawn every {} frames",
        state.speed_multiplier,
        state.spawn_interval
    );
    Some(state.speed_multiplier)
}

/// Push the current player position to the front of the trail
fn record_trail(state: &mut RunState) {
    let pos = state.player.pos + Vec2::new(0.0, TRAIL_OFFSET_Y);
    state.trail.insert(0, TrailPoint { pos });
    if state.trail.len() > TRAIL_LENGTH {
        state.trail.pop();
    }
}

/// Obstacles sitting in the narrow window just behind the player.
///
/// Coarse single-frame heuristic: depending on scroll speed an obstacle may
/// be counted twice or not at all.
pub fn count_avoided(obstacles: &[Obstacle], player_x: f32) -> u32 {
    obstacles
        .iter()
        .filter(|o| o.pos.x < player_x && o.pos.x > player_x - AVOID_EPSILON)
        .count() as u32
}

/// Move obstacles, power-ups and trail left by `dx`, discarding what left the screen
pub fn scroll(state: &mut RunState, dx: f32) {
    for obstacle in &mut state.obstacles {
        obstacle.pos.x -= dx;
    }
    state.obstacles.retain(|o| o.pos.x > DESPAWN_X);

    for power_up in &mut state.power_ups {
        power_up.pos.x -= dx;
    }
    state.power_ups.retain(|p| p.pos.x > DESPAWN_X);

    for point in &mut state.trail {
        point.pos.x -= dx;
    }
    state.trail.retain(|p| p.pos.x > 0.0);
}

/// Frame-cadence obstacle spawns and per-frame power-up rolls
fn spawn(state: &mut RunState) {
    let spawn_x = CANVAS_WIDTH + SPAWN_MARGIN;

    if state.frame % u64::from(state.spawn_interval.max(1)) == 0 {
        let y = random_lane_y(&mut state.rng);
        let variant = ObstacleVariant::random(&mut state.rng);
        state.obstacles.push(Obstacle {
            pos: Vec2::new(spawn_x, y),
            variant,
        });
    }

    if state.rng.random_bool(state.tuning.powerup_spawn_chance) {
        let kind = PowerUpKind::random(&mut state.rng);
        let y = random_lane_y(&mut state.rng);
        state.power_ups.push(PowerUp::new(kind, Vec2::new(spawn_x, y)));
    }
}
