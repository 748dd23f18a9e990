//! Achievement catalog and evaluation
//!
//! The catalog is static; only `{id, unlocked}` pairs are persisted and the
//! full list is rebuilt from the catalog on load. Unlocks are latches.

use serde::{Deserialize, Serialize};

use crate::stats::GameStats;

/// Which lifetime statistic a condition reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    HighScore,
    GamesPlayed,
    PowerUpsCollected,
    ObstaclesAvoided,
    LongestRun,
    TotalPlayTime,
}

impl Stat {
    fn read(self, stats: &GameStats) -> u64 {
        match self {
            Stat::HighScore => stats.high_score,
            Stat::GamesPlayed => stats.total_games_played,
            Stat::PowerUpsCollected => stats.power_ups_collected,
            Stat::ObstaclesAvoided => stats.obstacles_avoided,
            Stat::LongestRun => stats.longest_run,
            Stat::TotalPlayTime => stats.total_play_time,
        }
    }
}

/// Unlock predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    AtLeast(Stat, u64),
}

impl Condition {
    pub fn is_met(&self, stats: &GameStats) -> bool {
        match *self {
            Condition::AtLeast(stat, threshold) => stat.read(stats) >= threshold,
        }
    }
}

/// Static definition of an achievement
#[derive(Debug)]
pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub secret: bool,
    pub condition: Condition,
}

pub static CATALOG: [AchievementDef; 9] = [
    AchievementDef {
        id: "first_game",
        name: "First Descent",
        description: "Play your first game",
        icon: "🏂",
        secret: false,
        condition: Condition::AtLeast(Stat::GamesPlayed, 1),
    },
    AchievementDef {
        id: "score_100",
        name: "Beginner Boarder",
        description: "Score 100 points in a single run",
        icon: "🔢",
        secret: false,
        condition: Condition::AtLeast(Stat::HighScore, 100),
    },
    AchievementDef {
        id: "score_500",
        name: "Intermediate Rider",
        description: "Score 500 points in a single run",
        icon: "📈",
        secret: false,
        condition: Condition::AtLeast(Stat::HighScore, 500),
    },
    AchievementDef {
        id: "score_1000",
        name: "Pro Snowboarder",
        description: "Score 1000 points in a single run",
        icon: "🏆",
        secret: false,
        condition: Condition::AtLeast(Stat::HighScore, 1000),
    },
    AchievementDef {
        id: "collect_10_powerups",
        name: "Power Collector",
        description: "Collect 10 power-ups in total",
        icon: "⚡",
        secret: false,
        condition: Condition::AtLeast(Stat::PowerUpsCollected, 10),
    },
    AchievementDef {
        id: "avoid_100_obstacles",
        name: "Obstacle Ninja",
        description: "Avoid 100 obstacles in total",
        icon: "🥷",
        secret: false,
        condition: Condition::AtLeast(Stat::ObstaclesAvoided, 100),
    },
    AchievementDef {
        id: "play_10_games",
        name: "Dedicated Rider",
        description: "Play 10 games",
        icon: "🎮",
        secret: false,
        condition: Condition::AtLeast(Stat::GamesPlayed, 10),
    },
    AchievementDef {
        id: "play_60_seconds",
        name: "Endurance Run",
        description: "Stay alive for 60 seconds in a single run",
        icon: "⏱️",
        secret: false,
        condition: Condition::AtLeast(Stat::LongestRun, 60),
    },
    AchievementDef {
        id: "secret_achievement",
        name: "Mystery Achievement",
        description: "Spend five minutes on the slopes",
        icon: "❓",
        secret: true,
        condition: Condition::AtLeast(Stat::TotalPlayTime, 300),
    },
];

/// Look up a catalog entry by id
pub fn find(id: &str) -> Option<&'static AchievementDef> {
    CATALOG.iter().find(|def| def.id == id)
}

fn catalog_index(id: &str) -> usize {
    CATALOG.iter().position(|def| def.id == id).unwrap_or(CATALOG.len())
}

/// An achievement with its unlock latch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub secret: bool,
    pub unlocked: bool,
}

impl Achievement {
    fn from_def(def: &AchievementDef) -> Self {
        Self {
            id: def.id.to_string(),
            name: def.name.to_string(),
            description: def.description.to_string(),
            icon: def.icon.to_string(),
            secret: def.secret,
            unlocked: false,
        }
    }

    /// Name shown in galleries; secret entries stay hidden until unlocked
    pub fn display_name(&self) -> &str {
        if self.secret && !self.unlocked { "???" } else { &self.name }
    }

    pub fn display_description(&self) -> &str {
        if self.secret && !self.unlocked { "???" } else { &self.description }
    }

    pub fn display_icon(&self) -> &str {
        if self.secret && !self.unlocked { "❓" } else { &self.icon }
    }
}

/// Persisted form of an achievement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementRecord {
    pub id: String,
    pub unlocked: bool,
}

/// Fresh catalog with everything locked
pub fn catalog() -> Vec<Achievement> {
    CATALOG.iter().map(Achievement::from_def).collect()
}

/// Latch every locked achievement whose condition holds.
///
/// An id missing from the catalog is logged and left locked; the rest are
/// still evaluated.
pub fn evaluate(achievements: &[Achievement], stats: &GameStats) -> Vec<Achievement> {
    achievements
        .iter()
        .map(|achievement| {
            let mut next = achievement.clone();
            if next.unlocked {
                return next;
            }
            match find(&next.id) {
                Some(def) => next.unlocked = def.condition.is_met(stats),
                None => log::warn!("No condition for achievement '{}', skipping", next.id),
            }
            next
        })
        .collect()
}

/// Achievements unlocked in `after` that `before` lists as locked, in catalog
/// order. Ids absent from `before` are never reported.
pub fn diff_newly_unlocked(before: &[Achievement], after: &[Achievement]) -> Vec<Achievement> {
    let was_locked = |id: &str| before.iter().any(|a| a.id == id && !a.unlocked);
    let mut fresh: Vec<Achievement> = after
        .iter()
        .filter(|a| a.unlocked && was_locked(&a.id))
        .cloned()
        .collect();
    fresh.sort_by_key(|a| catalog_index(&a.id));
    fresh
}

pub fn to_records(achievements: &[Achievement]) -> Vec<AchievementRecord> {
    achievements
        .iter()
        .map(|a| AchievementRecord {
            id: a.id.clone(),
            unlocked: a.unlocked,
        })
        .collect()
}

/// Rebuild the catalog and apply saved latches
pub fn restore_from_records(records: &[AchievementRecord]) -> Vec<Achievement> {
    let mut achievements = catalog();
    for record in records {
        match achievements.iter_mut().find(|a| a.id == record.id) {
            Some(achievement) => achievement.unlocked |= record.unlocked,
            None => log::warn!("Dropping unknown achievement id '{}'", record.id),
        }
    }
    achievements
}
