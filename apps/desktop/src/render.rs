use std::fmt::Write as _;

use client_core::{
    board::{BoardView, KeyState},
    scoreboard::{LeaderboardSummary, PanelState, RankBadge, WinRateColor, WinRateTier},
    Notice, NoticeLevel, Screen,
};
use shared::protocol::{GlobalStats, LeaderboardEntry};

const BAR_WIDTH: usize = 30;

pub fn header(screen: Screen, player_name: Option<&str>) -> String {
    let player = player_name.unwrap_or("anonymous");
    format!("== GIT GAME :: {} :: {player} ==", screen.title())
}

pub fn welcome(remembered: Option<&str>) -> String {
    let mut out = String::from("Welcome to the Git Game!\nGuess the Git term one letter at a time.\n");
    match remembered {
        Some(name) => {
            let _ = write!(out, "Your name [{name}]: ");
        }
        None => out.push_str("Your name: "),
    }
    out
}

pub fn board(view: &BoardView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{}]  score: {}  {}", view.category, view.score, view.errors_label);
    let _ = writeln!(out, "{}", view.stage.art);

    let slots: String = view
        .indicator
        .iter()
        .map(|spent| if *spent { '●' } else { '○' })
        .collect();
    let _ = writeln!(out, "lives: {slots}");
    let _ = writeln!(
        out,
        "attempts left: {}  letters tried: {}/{}",
        view.remaining_attempts, view.letters_tried, view.letters_total
    );
    let _ = writeln!(out, "[{}]", meter(view.progress));
    if let Some(banner) = view.danger.banner() {
        let _ = writeln!(out, "{banner}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "    {}", view.word);
    let _ = writeln!(out, "hint: {}", view.hint);
    if let Some(word) = &view.revealed_word {
        let _ = writeln!(out, "The word was: {word}");
    }
    let _ = writeln!(out, "{}", view.status_message);
    let _ = writeln!(out);

    for row in &view.keyboard {
        let keys: Vec<String> = row
            .iter()
            .map(|key| match key.state {
                KeyState::Available => key.letter.as_char().to_string(),
                KeyState::Guessed => "·".to_string(),
                KeyState::Disabled => key.letter.as_char().to_ascii_lowercase().to_string(),
            })
            .collect();
        let _ = writeln!(out, "  {}", keys.join(" "));
    }

    if view.can_start_new {
        out.push_str("type a letter to guess, `new` for another word");
    } else {
        out.push_str("waiting for the game service...");
    }
    out
}

pub fn leaderboard(state: &PanelState<Vec<LeaderboardEntry>>) -> String {
    match state {
        PanelState::Loading => "Loading ranking...".to_string(),
        PanelState::Failed(message) => format!("{message} (type `refresh` to retry)"),
        PanelState::Ready(entries) if entries.is_empty() => {
            "No players yet. Be the first!".to_string()
        }
        PanelState::Ready(entries) => {
            let mut out = String::from("🏆 Top Git players\n");
            for entry in entries {
                let _ = writeln!(
                    out,
                    "{:>4}  {:<20} {:>6} pts",
                    RankBadge::for_rank(entry.rank).label(),
                    entry.name,
                    entry.total_points
                );
            }
            let summary = LeaderboardSummary::from_entries(entries);
            let _ = write!(
                out,
                "players: {}  top score: {}  average: {} pts",
                summary.active_players, summary.top_score, summary.average_points
            );
            out
        }
    }
}

pub fn stats(state: &PanelState<GlobalStats>) -> String {
    match state {
        PanelState::Loading => "Loading statistics...".to_string(),
        PanelState::Failed(message) => format!("{message} (type `refresh` to retry)"),
        PanelState::Ready(stats) => {
            let rate = stats.win_rate_percent;
            let bar = meter(stats.bar_fraction());
            let color = match WinRateColor::for_rate(rate) {
                WinRateColor::High => "high",
                WinRateColor::Medium => "medium",
                WinRateColor::Low => "low",
            };

            let mut out = String::new();
            let _ = writeln!(out, "games played: {}", stats.total_games);
            let _ = writeln!(out, "games won:    {}", stats.won_games);
            let _ = writeln!(out, "players:      {}", stats.total_players);
            let _ = writeln!(out, "win rate:     {rate:.1}% ({color})");
            let _ = writeln!(out, "[{bar}]");
            out.push_str(WinRateTier::for_rate(rate).message());
            out
        }
    }
}

/// Fixed-width bar for a fraction in `0.0..=1.0`.
fn meter(fraction: f64) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

pub fn notice(notice: &Notice) -> String {
    let marker = match notice.level {
        NoticeLevel::Info => "i",
        NoticeLevel::Success => "+",
        NoticeLevel::Error => "!",
    };
    format!("[{marker}] {}", notice.text)
}

pub fn help() -> &'static str {
    "commands: <letter> guess | new | rank | stats | game | refresh | exit | quit"
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
