//! Leaderboard and global statistics panels.

use shared::protocol::{GlobalStats, LeaderboardEntry};
use tracing::warn;

use crate::service::GameService;

pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 20;
const LEADERBOARD_FAILED_MESSAGE: &str = "Failed to load leaderboard";
const STATS_FAILED_MESSAGE: &str = "Failed to load statistics";

#[derive(Debug, Clone, PartialEq)]
pub enum PanelState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBadge {
    Gold,
    Silver,
    Bronze,
    Ranked(u32),
}

impl RankBadge {
    pub fn for_rank(rank: u32) -> Self {
        match rank {
            1 => RankBadge::Gold,
            2 => RankBadge::Silver,
            3 => RankBadge::Bronze,
            other => RankBadge::Ranked(other),
        }
    }

    pub fn label(self) -> String {
        match self {
            RankBadge::Gold => "👑".to_string(),
            RankBadge::Silver => "🥈".to_string(),
            RankBadge::Bronze => "🥉".to_string(),
            RankBadge::Ranked(rank) => format!("#{rank}"),
        }
    }
}

pub struct LeaderboardPanel {
    pub state: PanelState<Vec<LeaderboardEntry>>,
    limit: u32,
}

impl LeaderboardPanel {
    pub fn new(limit: u32) -> Self {
        Self {
            state: PanelState::Loading,
            limit,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub async fn refresh(&mut self, service: &dyn GameService) {
        self.state = PanelState::Loading;
        self.state = match service.leaderboard(self.limit).await {
            Ok(entries) => PanelState::Ready(entries),
            Err(err) => {
                warn!(error = %err, "leaderboard: refresh failed");
                PanelState::Failed(LEADERBOARD_FAILED_MESSAGE.to_string())
            }
        };
    }
}

/// Totals shown under the ranking table; all zero for an empty board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LeaderboardSummary {
    pub active_players: usize,
    pub top_score: i64,
    pub average_points: i64,
}

impl LeaderboardSummary {
    /// Entries arrive ranked, so the first one holds the top score.
    pub fn from_entries(entries: &[LeaderboardEntry]) -> Self {
        let Some(first) = entries.first() else {
            return Self::default();
        };
        let total: i64 = entries.iter().map(|entry| entry.total_points).sum();
        Self {
            active_players: entries.len(),
            top_score: first.total_points,
            average_points: (total as f64 / entries.len() as f64).round() as i64,
        }
    }
}

impl Default for LeaderboardPanel {
    fn default() -> Self {
        Self::new(DEFAULT_LEADERBOARD_LIMIT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinRateTier {
    Excellent,
    VeryGood,
    Fair,
    NeedsWork,
}

impl WinRateTier {
    pub fn for_rate(rate: f64) -> Self {
        if rate >= 80.0 {
            WinRateTier::Excellent
        } else if rate >= 60.0 {
            WinRateTier::VeryGood
        } else if rate >= 40.0 {
            WinRateTier::Fair
        } else {
            WinRateTier::NeedsWork
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            WinRateTier::Excellent => "Excellent! 🏆",
            WinRateTier::VeryGood => "Very good! 👍",
            WinRateTier::Fair => "Fair 😐",
            WinRateTier::NeedsWork => "Needs work 💪",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinRateColor {
    High,
    Medium,
    Low,
}

impl WinRateColor {
    pub fn for_rate(rate: f64) -> Self {
        if rate >= 70.0 {
            WinRateColor::High
        } else if rate >= 50.0 {
            WinRateColor::Medium
        } else {
            WinRateColor::Low
        }
    }
}

pub struct StatsPanel {
    pub state: PanelState<GlobalStats>,
}

impl StatsPanel {
    pub fn new() -> Self {
        Self {
            state: PanelState::Loading,
        }
    }

    pub async fn refresh(&mut self, service: &dyn GameService) {
        self.state = PanelState::Loading;
        self.state = match service.global_stats().await {
            Ok(stats) => PanelState::Ready(stats),
            Err(err) => {
                warn!(error = %err, "stats: refresh failed");
                PanelState::Failed(STATS_FAILED_MESSAGE.to_string())
            }
        };
    }
}

impl Default for StatsPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/scoreboard_tests.rs"]
mod tests;
