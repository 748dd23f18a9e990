//! Cumulative player statistics
//!
//! Persisted across runs and fed to the achievement catalog.

use serde::{Deserialize, Serialize};

use crate::sim::RunState;

/// Lifetime totals across all runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameStats {
    pub high_score: u64,
    pub total_games_played: u64,
    /// Sum of run scores (score doubles as distance)
    pub total_distance: u64,
    pub power_ups_collected: u64,
    pub obstacles_avoided: u64,
    /// Longest single run, in seconds
    pub longest_run: u64,
    /// Seconds
    pub total_play_time: u64,
}

/// Totals of one finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: u64,
    pub seconds: u64,
    pub power_ups_collected: u32,
    pub obstacles_avoided: u32,
}

impl RunSummary {
    /// Summarise a run at `now_ms` (the end time wins once the run is over)
    pub fn from_run(state: &RunState, now_ms: f64) -> Self {
        Self {
            score: state.score,
            seconds: state.elapsed_secs(now_ms),
            power_ups_collected: state.power_ups_collected,
            obstacles_avoided: state.obstacles_avoided,
        }
    }
}

/// Fold one finished run into the lifetime totals
pub fn update_game_stats(stats: &GameStats, run: &RunSummary) -> GameStats {
    GameStats {
        high_score: stats.high_score.max(run.score),
        total_games_played: stats.total_games_played + 1,
        total_distance: stats.total_distance + run.score,
        power_ups_collected: stats.power_ups_collected + u64::from(run.power_ups_collected),
        obstacles_avoided: stats.obstacles_avoided + u64::from(run.obstacles_avoided),
        longest_run: stats.longest_run.max(run.seconds),
        total_play_time: stats.total_play_time + run.seconds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_accumulates_and_maxes() {
        let stats = GameStats {
            high_score: 500,
            total_games_played: 4,
            total_distance: 1200,
            power_ups_collected: 3,
            obstacles_avoided: 40,
            longest_run: 90,
            total_play_time: 200,
        };
        let run = RunSummary {
            score: 300,
            seconds: 45,
            power_ups_collected: 2,
            obstacles_avoided: 11,
        };
        let next = update_game_stats(&stats, &run);
        assert_eq!(next.high_score, 500);
        assert_eq!(next.total_games_played, 5);
        assert_eq!(next.total_distance, 1500);
        assert_eq!(next.power_ups_collected, 5);
        assert_eq!(next.obstacles_avoided, 51);
        assert_eq!(next.longest_run, 90);
        assert_eq!(next.total_play_time, 245);

        let better = update_game_stats(&next, &RunSummary { score: 900, seconds: 120, ..run });
        assert_eq!(better.high_score, 900);
        assert_eq!(better.longest_run, 120);
    }

    #[test]
    fn test_camel_case_keys_and_partial_records() {
        let json = serde_json::to_string(&GameStats::default()).unwrap();
        assert!(json.contains("\"highScore\":0"));
        assert!(json.contains("\"totalGamesPlayed\":0"));

        let partial: GameStats = serde_json::from_str(r#"{"highScore": 250}"#).unwrap();
        assert_eq!(partial.high_score, 250);
        assert_eq!(partial.total_play_time, 0);
    }
}
