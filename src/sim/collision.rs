//! Pickup and obstacle collision resolution
//!
//! Both use the same axis-aligned proximity test against a half-extent.
//! Obstacle hits consume the shield first, then lives; a run ends the frame
//! lives reach zero.

use glam::Vec2;

use super::particles::{BurstSpec, spawn_burst};
use super::powerups::{activate, apply_effect, check_pickup};
use super::state::{GameEvent, RunPhase, RunState};
use crate::consts::{PLAYER_HEIGHT, PLAYER_WIDTH};

/// True when `a` and `b` are closer than `half_extent` on both axes
#[inline]
pub fn proximity(a: Vec2, b: Vec2, half_extent: Vec2) -> bool {
    let d = (a - b).abs();
    d.x < half_extent.x && d.y < half_extent.y
}

/// Result of resolving obstacle collisions for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollisionOutcome {
    pub hit: bool,
    /// The shield took the hit
    pub absorbed: bool,
    /// This hit exhausted the last life
    pub run_over: bool,
}

/// Collect every power-up the player overlaps
pub fn resolve_pickups(state: &mut RunState, now_ms: f64, events: &mut Vec<GameEvent>) {
    let player_pos = state.player.pos;
    let duration = state.tuning.powerup_duration_ms;
    let max_lives = state.tuning.max_lives;

    let mut power_ups = std::mem::take(&mut state.power_ups);
    for power_up in power_ups.iter_mut() {
        if power_up.collected || !check_pickup(player_pos, power_up) {
            continue;
        }
        if let Some(effect) = apply_effect(power_up, state, now_ms, duration, max_lives) {
            activate(&mut state.active_effects, effect);
        }
        state.power_ups_collected += 1;

        let burst = spawn_burst(power_up.pos, &BurstSpec::pickup(power_up.kind.color()), &mut state.rng);
        state.particles.extend(burst);
        events.push(GameEvent::PowerUpCollected(power_up.kind));
        log::debug!("Collected {} power-up", power_up.kind.as_str());
    }
    power_ups.retain(|p| !p.collected);
    state.power_ups = power_ups;
}

/// Test the player against all obstacles and apply at most one hit
pub fn resolve_obstacles(state: &mut RunState, now_ms: f64, events: &mut Vec<GameEvent>) -> CollisionOutcome {
    let mut outcome = CollisionOutcome::default();
    if state.phase != RunPhase::Playing || state.is_invincible(now_ms) {
        return outcome;
    }

    let half_extent = Vec2::new(PLAYER_WIDTH / 2.0, PLAYER_HEIGHT / 2.0);
    let player_pos = state.player.pos;
    if !state
        .obstacles
        .iter()
        .any(|o| proximity(player_pos, o.pos, half_extent))
    {
        return outcome;
    }

    outcome.hit = true;
    let burst = spawn_burst(player_pos, &BurstSpec::collision(), &mut state.rng);
    state.particles.extend(burst);

    if state.has_shield {
        state.has_shield = false;
        state
            .active_effects
            .retain(|e| e.kind != super::powerups::PowerUpKind::Shield);
        outcome.absorbed = true;
    } else {
        state.lives = state.lives.saturating_sub(1);
    }
    events.push(GameEvent::Collision {
        absorbed: outcome.absorbed,
    });

    if state.lives == 0 {
        state.phase = RunPhase::Over;
        state.end_time_ms = Some(now_ms);
        outcome.run_over = true;
        events.push(GameEvent::RunOver);
        log::info!(
            "Run over: score {} after {}s",
            state.score,
            state.elapsed_secs(now_ms)
        );
    } else if !outcome.absorbed {
        state.invincible_until_ms = now_ms + state.tuning.invincibility_ms;
    }

    outcome
}

/// Award interval points while the run is still going
pub fn accrue_score(state: &mut RunState) {
    if state.phase == RunPhase::Playing && state.frame % state.tuning.score_interval_frames == 0 {
        state.score += state.tuning.score_per_interval * u64::from(state.score_multiplier);
    }
}
