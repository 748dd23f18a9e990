//! Per-frame simulation tick
//!
//! Advances one run by one frame in a fixed order: input, entities, pickups
//! and effect expiry, obstacle collisions, scoring, particles, frame counter.

use super::collision::{accrue_score, resolve_obstacles, resolve_pickups};
use super::particles;
use super::physics::update_entities;
use super::powerups::advance_active_effects;
use super::state::{GameEvent, RunPhase, RunState};

/// Input buffered for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// New ascent intent, if it changed since the last tick
    pub ascending: Option<bool>,
    /// Pause toggle
    pub toggle_pause: bool,
}

/// Advance the run by one frame and return what happened
pub fn tick(state: &mut RunState, input: &TickInput, now_ms: f64) -> Vec<GameEvent> {
    let mut events = Vec::new();

    // Ascent tracks the key state even while paused; only motion is frozen
    if let Some(ascending) = input.ascending {
        state.player.ascending = ascending;
    }

    if input.toggle_pause {
        match state.phase {
            RunPhase::Playing => {
                state.phase = RunPhase::Paused;
                log::debug!("Paused at frame {}", state.frame);
                return events;
            }
            RunPhase::Paused => {
                state.phase = RunPhase::Playing;
                log::debug!("Resumed at frame {}", state.frame);
            }
            RunPhase::Over => {}
        }
    }

    if state.phase != RunPhase::Playing {
        return events;
    }

    update_entities(state, now_ms, &mut events);

    resolve_pickups(state, now_ms, &mut events);
    let mut effects = std::mem::take(&mut state.active_effects);
    let expired = advance_active_effects(&mut effects, state, now_ms);
    state.active_effects = effects;
    events.extend(expired.into_iter().map(GameEvent::PowerUpExpired));

    if resolve_obstacles(state, now_ms, &mut events).run_over {
        return events;
    }

    accrue_score(state);

    state.particles = particles::advance(std::mem::take(&mut state.particles));
    state.ambient = particles::advance(std::mem::take(&mut state.ambient));

    state.frame += 1;
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::powerups::{PowerUp, PowerUpKind};
    use crate::sim::state::{Obstacle, ObstacleVariant};
    use crate::tuning::Tuning;
    use glam::Vec2;
    use proptest::prelude::*;

    fn empty_run(seed: u64) -> RunState {
        let tuning = Tuning {
            initial_obstacles: 0,
            powerup_spawn_chance: 0.0,
            ..Tuning::default()
        };
        RunState::new(tuning, 0, Vec::new(), seed, 0.0)
    }

    /// Obstacle that still overlaps the player after this frame's scroll
    fn obstacle_ahead(state: &mut RunState) {
        state.obstacles.push(Obstacle {
            pos: state.player.pos,
            variant: ObstacleVariant::Snowman(2),
        });
    }

    #[test]
    fn test_three_hits_end_the_run() {
        let mut state = empty_run(1);
        let input = TickInput::default();

        obstacle_ahead(&mut state);
        tick(&mut state, &input, 0.0);
        assert_eq!(state.lives, 2);
        state.obstacles.clear();

        obstacle_ahead(&mut state);
        tick(&mut state, &input, 1_000.0);
        assert_eq!(state.lives, 2, "invincible for two seconds");
        state.obstacles.clear();

        obstacle_ahead(&mut state);
        tick(&mut state, &input, 2_500.0);
        assert_eq!(state.lives, 1);
        state.obstacles.clear();

        obstacle_ahead(&mut state);
        let events = tick(&mut state, &input, 5_000.0);
        assert_eq!(state.lives, 0);
        assert!(state.is_over());
        assert!(events.contains(&GameEvent::RunOver));
        assert_eq!(state.elapsed_secs(99_000.0), 5);

        // Terminal: further ticks change nothing
        let frame = state.frame;
        assert!(tick(&mut state, &input, 6_000.0).is_empty());
        assert_eq!(state.frame, frame);
    }

    #[test]
    fn test_shielded_run_survives_one_extra_hit() {
        let mut state = empty_run(2);
        let input = TickInput::default();
        state.power_ups.push(PowerUp::new(PowerUpKind::Shield, state.player.pos));
        tick(&mut state, &input, 0.0);
        assert!(state.has_shield);

        obstacle_ahead(&mut state);
        let events = tick(&mut state, &input, 100.0);
        assert!(events.contains(&GameEvent::Collision { absorbed: true }));
        assert_eq!(state.lives, 3);
        assert!(!state.has_shield);
    }

    #[test]
    fn test_pause_freezes_and_resumes() {
        let mut state = empty_run(3);
        tick(&mut state, &TickInput::default(), 0.0);
        assert_eq!(state.frame, 1);

        let toggle = TickInput {
            toggle_pause: true,
            ..Default::default()
        };
        tick(&mut state, &toggle, 16.0);
        assert_eq!(state.phase, RunPhase::Paused);

        let y = state.player.pos.y;
        for i in 0..10 {
            tick(&mut state, &TickInput::default(), 32.0 + i as f64 * 16.0);
        }
        assert_eq!(state.frame, 1);
        assert_eq!(state.player.pos.y, y);

        tick(&mut state, &toggle, 300.0);
        assert_eq!(state.phase, RunPhase::Playing);
        assert_eq!(state.frame, 2, "resume tick advances");
    }

    #[test]
    fn test_ascent_release_while_paused_applies() {
        let mut state = empty_run(8);
        let up = TickInput {
            ascending: Some(true),
            ..Default::default()
        };
        tick(&mut state, &up, 0.0);

        let release_and_pause = TickInput {
            ascending: Some(false),
            toggle_pause: true,
        };
        tick(&mut state, &release_and_pause, 16.0);
        assert_eq!(state.phase, RunPhase::Paused);
        assert!(!state.player.ascending);

        let (frame, y) = (state.frame, state.player.pos.y);
        tick(&mut state, &up, 32.0);
        assert!(state.player.ascending);
        assert_eq!(state.frame, frame);
        assert_eq!(state.player.pos.y, y);
    }

    #[test]
    fn test_ascent_input_latches() {
        let mut state = empty_run(4);
        let up = TickInput {
            ascending: Some(true),
            ..Default::default()
        };
        tick(&mut state, &up, 0.0);
        for _ in 0..5 {
            tick(&mut state, &TickInput::default(), 0.0);
        }
        assert!(state.player.ascending);
        assert!(state.player.vel_y < 0.0);
    }

    #[test]
    fn test_score_on_first_frame_and_every_sixty() {
        let mut state = empty_run(5);
        for _ in 0..61 {
            tick(&mut state, &TickInput::default(), 0.0);
        }
        assert_eq!(state.score, 20);
    }

    #[test]
    fn test_multiplier_scenario() {
        let mut state = empty_run(6);
        let input = TickInput::default();
        state.power_ups.push(PowerUp::new(PowerUpKind::ScoreMultiplier, state.player.pos));
        tick(&mut state, &input, 0.0);
        assert_eq!(state.score_multiplier, 2);

        tick(&mut state, &input, 9_999.0);
        assert_eq!(state.score_multiplier, 2);

        let events = tick(&mut state, &input, 10_001.0);
        assert_eq!(state.score_multiplier, 1);
        assert!(events.contains(&GameEvent::PowerUpExpired(PowerUpKind::ScoreMultiplier)));
        assert!(state.active_effects.is_empty());
    }

    #[test]
    fn test_same_seed_same_run() {
        let tuning = Tuning::default();
        let mut a = RunState::new(tuning.clone(), 1, Vec::new(), 77, 0.0);
        let mut b = RunState::new(tuning, 1, Vec::new(), 77, 0.0);
        for i in 0..600 {
            let input = TickInput {
                ascending: Some(i % 90 < 45),
                ..Default::default()
            };
            let now = i as f64 * 16.0;
            assert_eq!(tick(&mut a, &input, now), tick(&mut b, &input, now));
        }
        assert_eq!(a.snapshot(9_600.0), b.snapshot(9_600.0));
    }

    proptest! {
        #[test]
        fn prop_lives_bounded_and_monotone(
            seed in any::<u64>(),
            steps in prop::collection::vec((any::<bool>(), 0u8..8, 1u32..40), 1..300),
        ) {
            let mut state = empty_run(seed);
            let max = state.tuning.max_lives;
            let mut now = 0.0;

            for (ascending, roll, dt) in steps {
                now += f64::from(dt);
                match roll {
                    0 | 1 => obstacle_ahead(&mut state),
                    2 => state.power_ups.push(PowerUp::new(PowerUpKind::ExtraLife, state.player.pos)),
                    3 => state.power_ups.push(PowerUp::new(
                        PowerUpKind::Shield,
                        state.player.pos + Vec2::new(10.0, 0.0),
                    )),
                    _ => {}
                }
                let before = state.lives;
                let was_over = state.is_over();
                let input = TickInput { ascending: Some(ascending), toggle_pause: false };
                let events = tick(&mut state, &input, now);

                prop_assert!(state.lives <= max);
                prop_assert!(before.saturating_sub(state.lives) <= 1, "at most one hit per tick");
                if state.lives > before {
                    prop_assert!(events.contains(&GameEvent::PowerUpCollected(PowerUpKind::ExtraLife)));
                }
                if was_over {
                    prop_assert!(state.is_over());
                }
                if state.lives == 0 {
                    prop_assert!(state.is_over());
                }
            }
        }
    }
}
