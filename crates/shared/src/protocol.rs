use serde::{Deserialize, Serialize};

use crate::domain::{Letter, Outcome, SessionId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPuzzleResponse {
    #[serde(rename = "game_id")]
    pub session_id: SessionId,
    pub category: String,
    pub hint: String,
    pub word_display: String,
    pub max_wrong: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuessRequest {
    #[serde(rename = "game_id")]
    pub session_id: SessionId,
    pub letter: Letter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuessResponse {
    #[serde(rename = "game_id")]
    pub session_id: SessionId,
    pub word_display: String,
    pub guessed_letters: Vec<Letter>,
    pub wrong_guesses: u32,
    pub max_wrong: u32,
    pub status: Outcome,
    pub points: u32,
    pub message: String,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub correct_word: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub name: String,
    pub total_points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_games: u64,
    pub won_games: u64,
    pub total_players: u64,
    #[serde(rename = "win_rate")]
    pub win_rate_percent: f64,
}

impl GlobalStats {
    /// Fill ratio for a 0-100% bar.
    pub fn bar_fraction(&self) -> f64 {
        if self.win_rate_percent.is_nan() {
            return 0.0;
        }
        self.win_rate_percent.clamp(0.0, 100.0) / 100.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
