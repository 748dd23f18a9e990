//! High score leaderboard
//!
//! Top five scores, sorted descending. Persisted through the storage
//! backend as a plain JSON array.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_HIGH_SCORES;

/// Name recorded when the player leaves the field empty
pub const DEFAULT_NAME: &str = "Anonymous";

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Locale date string of when the score was set
    pub date: String,
    pub name: String,
}

/// High score leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Rebuild from stored entries, restoring order and size
    pub fn from_entries(mut entries: Vec<HighScoreEntry>) -> Self {
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_HIGH_SCORES);
        Self { entries }
    }

    /// Check if a score makes the board; a tie with the last entry does not
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a new score to the leaderboard (if it qualifies).
    ///
    /// Returns the rank achieved (1-indexed) or None if didn't qualify.
    pub fn add_score(&mut self, score: u64, name: &str, date: &str) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let name = name.trim();
        let entry = HighScoreEntry {
            score,
            date: date.to_string(),
            name: if name.is_empty() { DEFAULT_NAME } else { name }.to_string(),
        };

        // Equal scores keep their earlier position
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn board(scores: &[u64]) -> HighScores {
        let mut hs = HighScores::new();
        for &s in scores {
            hs.add_score(s, "rider", "1/2/2025");
        }
        hs
    }

    #[test]
    fn test_insert_sorted_and_ranked() {
        let mut hs = board(&[100, 300]);
        assert_eq!(hs.add_score(200, "Mika", "1/3/2025"), Some(2));
        let scores: Vec<u64> = hs.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![300, 200, 100]);
        assert_eq!(hs.top_score(), Some(300));
    }

    #[test]
    fn test_tie_with_fifth_is_rejected() {
        let mut hs = board(&[500, 400, 300, 200, 100]);
        assert!(!hs.qualifies(100));
        assert_eq!(hs.add_score(100, "late", "today"), None);
        assert_eq!(hs.entries.len(), 5);
        assert!(hs.entries.iter().all(|e| e.name == "rider"));

        assert_eq!(hs.potential_rank(101), Some(5));
        assert_eq!(hs.add_score(101, "edge", "today"), Some(5));
        assert_eq!(hs.entries[4].name, "edge");
    }

    #[test]
    fn test_blank_name_becomes_anonymous() {
        let mut hs = HighScores::new();
        hs.add_score(50, "   ", "today");
        assert_eq!(hs.entries[0].name, DEFAULT_NAME);
    }

    #[test]
    fn test_zero_admitted_while_board_has_room() {
        let mut hs = HighScores::new();
        assert_eq!(hs.add_score(0, "", "today"), Some(1));
    }

    #[test]
    fn test_stored_as_plain_array() {
        let hs = board(&[10]);
        let json = serde_json::to_string(&hs).unwrap();
        assert!(json.starts_with('['));
        let back: HighScores = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hs);
    }

    #[test]
    fn test_from_entries_repairs_order() {
        let entry = |score| HighScoreEntry {
            score,
            date: String::new(),
            name: "x".into(),
        };
        let hs = HighScores::from_entries((1..=8).map(entry).collect());
        let scores: Vec<u64> = hs.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![8, 7, 6, 5, 4]);
    }

    proptest! {
        #[test]
        fn prop_board_sorted_and_bounded(scores in prop::collection::vec(0u64..1000, 0..40)) {
            let hs = board(&scores);
            prop_assert!(hs.entries.len() <= MAX_HIGH_SCORES);
            prop_assert!(hs.entries.windows(2).all(|w| w[0].score >= w[1].score));

            let mut expected = scores.clone();
            expected.sort_unstable_by(|a, b| b.cmp(a));
            expected.truncate(MAX_HIGH_SCORES);
            let actual: Vec<u64> = hs.entries.iter().map(|e| e.score).collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
