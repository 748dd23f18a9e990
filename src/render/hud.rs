//! Heads-up display and overlays

use glam::Vec2;

use super::{DrawCommand, TextAlign};
use crate::colors;
use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::notifications::Toast;
use crate::sim::{RunPhase, RunSnapshot};

const HUD_TEXT_PX: f32 = 16.0;
const TIMER_TEXT_PX: f32 = 12.0;

const HEART_SIZE: f32 = 20.0;
const HEART_SPACING: f32 = 30.0;
const HEARTS_ORIGIN: Vec2 = Vec2::new(30.0, 60.0);

const EFFECTS_ORIGIN: Vec2 = Vec2::new(20.0, 100.0);
const EFFECT_SPACING: f32 = 40.0;
const EFFECT_ICON_SCALE: f32 = 0.7;

fn text(out: &mut Vec<DrawCommand>, text: String, pos: Vec2, size_px: f32, align: TextAlign) {
    out.push(DrawCommand::Text {
        text,
        pos,
        size_px,
        color: colors::TEXT,
        align,
        alpha: 1.0,
    });
}

/// "Score: 120", with "(x2)" appended while a multiplier is active
pub fn score_label(score: u64, multiplier: u32) -> String {
    if multiplier > 1 {
        format!("Score: {score} (x{multiplier})")
    } else {
        format!("Score: {score}")
    }
}

pub fn speed_label(speed: f32) -> String {
    format!("Speed: {speed:.1}x")
}

pub fn timer_label(remaining_ms: f64) -> String {
    format!("{:.1}s", (remaining_ms / 1000.0).max(0.0))
}

/// Score, clock, speed, lives, active effect timers and the pause overlay
pub fn build_hud(out: &mut Vec<DrawCommand>, snapshot: &RunSnapshot) {
    text(
        out,
        score_label(snapshot.score, snapshot.score_multiplier),
        Vec2::new(CANVAS_WIDTH - 20.0, 30.0),
        HUD_TEXT_PX,
        TextAlign::Right,
    );
    text(
        out,
        crate::format_clock(snapshot.elapsed_secs),
        Vec2::new(20.0, 30.0),
        HUD_TEXT_PX,
        TextAlign::Left,
    );
    text(
        out,
        speed_label(snapshot.speed),
        Vec2::new(CANVAS_WIDTH - 200.0, 60.0),
        HUD_TEXT_PX,
        TextAlign::Left,
    );

    out.extend((0..snapshot.lives).map(|i| DrawCommand::Heart {
        center: HEARTS_ORIGIN + Vec2::new(f32::from(i) * HEART_SPACING, 0.0),
        size: HEART_SIZE,
    }));

    for (i, effect) in snapshot.active_effects.iter().enumerate() {
        let center = EFFECTS_ORIGIN + Vec2::new(0.0, i as f32 * EFFECT_SPACING);
        out.push(DrawCommand::PowerUpIcon {
            kind: effect.kind,
            center,
            scale: EFFECT_ICON_SCALE,
        });
        text(
            out,
            timer_label(effect.remaining_ms),
            center + Vec2::new(25.0, 5.0),
            TIMER_TEXT_PX,
            TextAlign::Left,
        );
    }

    if snapshot.phase == RunPhase::Paused {
        pause_overlay(out);
    }
}

fn pause_overlay(out: &mut Vec<DrawCommand>) {
    out.push(DrawCommand::Rect {
        pos: Vec2::ZERO,
        size: Vec2::new(CANVAS_WIDTH, CANVAS_HEIGHT),
        color: 0x000000,
        alpha: 0.7,
    });
    let mid = Vec2::new(CANVAS_WIDTH, CANVAS_HEIGHT) / 2.0;
    for (line, size_px, offset) in [
        ("PAUSED", 24.0, 0.0),
        ("Press P or tap Pause button to continue", HUD_TEXT_PX, 40.0),
    ] {
        out.push(DrawCommand::Text {
            text: line.to_string(),
            pos: mid + Vec2::new(0.0, offset),
            size_px,
            color: colors::SNOW,
            align: TextAlign::Center,
            alpha: 1.0,
        });
    }
}

/// Achievement toast in the top-right corner
pub fn build_toast(toast: &Toast<'_>) -> Vec<DrawCommand> {
    let a = toast.achievement;
    let pos = Vec2::new(CANVAS_WIDTH - 320.0, 20.0);
    let mut out = vec![DrawCommand::Rect {
        pos,
        size: Vec2::new(300.0, 70.0),
        color: 0x000000,
        alpha: 0.8 * toast.opacity,
    }];
    for (line, offset, size_px) in [
        (format!("{} Achievement Unlocked!", a.display_icon()), 25.0, 14.0),
        (a.display_name().to_string(), 45.0, 12.0),
        (a.display_description().to_string(), 62.0, 10.0),
    ] {
        out.push(DrawCommand::Text {
            text: line,
            pos: pos + Vec2::new(15.0, offset),
            size_px,
            color: colors::SNOW,
            align: TextAlign::Left,
            alpha: toast.opacity,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::catalog;
    use crate::sim::{EffectView, PowerUpKind, RunState, spawn_ambient};
    use crate::tuning::Tuning;
    use rand::SeedableRng;

    fn snapshot() -> RunSnapshot {
        let mut rng = rand_pcg::Pcg32::seed_from_u64(2);
        let state = RunState::new(Tuning::default(), 0, spawn_ambient(0, &mut rng), 2, 0.0);
        state.snapshot(75_000.0)
    }

    fn texts(cmds: &[DrawCommand]) -> Vec<String> {
        cmds.iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_labels() {
        assert_eq!(score_label(120, 1), "Score: 120");
        assert_eq!(score_label(120, 2), "Score: 120 (x2)");
        assert_eq!(speed_label(1.5), "Speed: 1.5x");
        assert_eq!(timer_label(9_540.0), "9.5s");
        assert_eq!(timer_label(-5.0), "0.0s");
    }

    #[test]
    fn test_hud_contents() {
        let mut snap = snapshot();
        snap.active_effects = vec![EffectView {
            kind: PowerUpKind::SpeedBoost,
            remaining_ms: 4_200.0,
        }];
        let mut out = Vec::new();
        build_hud(&mut out, &snap);

        let labels = texts(&out);
        assert!(labels.contains(&"01:15".to_string()));
        assert!(labels.contains(&"Speed: 1.0x".to_string()));
        assert!(labels.contains(&"4.2s".to_string()));
        let hearts = out.iter().filter(|c| matches!(c, DrawCommand::Heart { .. })).count();
        assert_eq!(hearts, usize::from(snap.lives));
        assert!(!labels.contains(&"PAUSED".to_string()));
    }

    #[test]
    fn test_pause_overlay() {
        let mut snap = snapshot();
        snap.phase = RunPhase::Paused;
        let mut out = Vec::new();
        build_hud(&mut out, &snap);
        assert!(texts(&out).contains(&"PAUSED".to_string()));
    }

    #[test]
    fn test_secret_toast_is_masked() {
        let secret = catalog().into_iter().find(|a| a.secret).unwrap();
        let toast = Toast {
            achievement: &secret,
            opacity: 0.5,
        };
        let labels = texts(&build_toast(&toast));
        assert!(labels.contains(&"???".to_string()));
    }
}
