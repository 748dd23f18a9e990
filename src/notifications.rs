//! Achievement toast queue
//!
//! One toast at a time, FIFO. A toast stays fully visible for
//! [`DISPLAY_MS`], fades out over [`FADE_MS`], then the next one starts.

use std::collections::VecDeque;

use serde::Serialize;

use crate::achievements::Achievement;

pub const DISPLAY_MS: f64 = 5_000.0;
pub const FADE_MS: f64 = 500.0;

/// The toast to draw this frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toast<'a> {
    pub achievement: &'a Achievement,
    /// 1.0 while displayed, falling to 0.0 during the fade
    pub opacity: f32,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    pending: VecDeque<Achievement>,
    /// When the front toast first became visible
    shown_since: Option<f64>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, achievement: Achievement) {
        log::info!("Achievement unlocked: {}", achievement.name);
        self.pending.push_back(achievement);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop the current toast; the next one starts on the following update
    pub fn dismiss(&mut self) -> Option<Achievement> {
        self.shown_since = None;
        self.pending.pop_front()
    }

    /// Expire the front toast if its time is up and return what to draw
    pub fn update(&mut self, now_ms: f64) -> Option<Toast<'_>> {
        if self
            .shown_since
            .is_some_and(|since| now_ms - since >= DISPLAY_MS + FADE_MS)
        {
            self.dismiss();
        }
        if self.pending.is_empty() {
            return None;
        }

        let since = *self.shown_since.get_or_insert(now_ms);
        let elapsed = now_ms - since;
        let opacity = if elapsed < DISPLAY_MS {
            1.0
        } else {
            (1.0 - (elapsed - DISPLAY_MS) / FADE_MS).clamp(0.0, 1.0) as f32
        };
        self.pending.front().map(|achievement| Toast { achievement, opacity })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::catalog;

    #[test]
    fn test_fifo_with_timeout() {
        let all = catalog();
        let mut queue = NotificationQueue::new();
        queue.push(all[0].clone());
        queue.push(all[1].clone());

        let toast = queue.update(1_000.0).unwrap();
        assert_eq!(toast.achievement.id, "first_game");
        assert_eq!(toast.opacity, 1.0);

        let fading = queue.update(6_250.0).unwrap();
        assert_eq!(fading.achievement.id, "first_game");
        assert!((fading.opacity - 0.5).abs() < 1e-6);

        let next = queue.update(6_500.0).unwrap();
        assert_eq!(next.achievement.id, "score_100");
        assert_eq!(next.opacity, 1.0);

        assert!(queue.update(12_000.0).is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_dismiss_advances() {
        let all = catalog();
        let mut queue = NotificationQueue::new();
        queue.push(all[2].clone());
        queue.push(all[3].clone());
        queue.update(0.0);

        assert_eq!(queue.dismiss().map(|a| a.id), Some("score_500".to_string()));
        let toast = queue.update(100.0).unwrap();
        assert_eq!(toast.achievement.id, "score_1000");
        assert_eq!(queue.len(), 1);
    }
}
