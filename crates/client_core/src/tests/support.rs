//! In-process stand-in for the game service, scoring guesses the same way
//! the real service does.

use std::{
    collections::{HashMap, VecDeque},
    sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use shared::{
    domain::{Letter, Outcome, SessionId},
    protocol::{GlobalStats, GuessResponse, LeaderboardEntry, NewPuzzleResponse},
};
use tokio::sync::{oneshot, Mutex};

use crate::{error::GameServiceError, service::GameService};

pub(crate) const MAX_WRONG: u32 = 6;

struct FakeGame {
    word: String,
    hint: String,
    guessed: Vec<Letter>,
    wrong: u32,
    status: Outcome,
    points: u32,
}

impl FakeGame {
    fn display(&self) -> String {
        self.word
            .chars()
            .map(|c| {
                if self.guessed.iter().any(|l| l.as_char() == c) {
                    c.to_string()
                } else {
                    "_".to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn guess(&mut self, session_id: SessionId, letter: Letter) -> Result<GuessResponse, GameServiceError> {
        if self.status != Outcome::InProgress {
            return Err(validation("Game already finished"));
        }
        if self.guessed.contains(&letter) {
            return Err(validation("Letter already guessed"));
        }
        self.guessed.push(letter);

        let message = if self.word.contains(letter.as_char()) {
            if !self.display().contains('_') {
                self.status = Outcome::Won;
                self.points = 100u32.saturating_sub(self.wrong * 10).max(10);
                format!("🏆 CONGRATULATIONS! You won! +{} points!", self.points)
            } else {
                format!("🎯 Hit! The letter '{letter}' is in the word!")
            }
        } else {
            self.wrong += 1;
            if self.wrong >= MAX_WRONG {
                self.status = Outcome::Lost;
                "💀 Game Over!".to_string()
            } else {
                format!("❌ Oops! The letter '{letter}' is not in the word.")
            }
        };

        Ok(GuessResponse {
            session_id,
            word_display: self.display(),
            guessed_letters: self.guessed.clone(),
            wrong_guesses: self.wrong,
            max_wrong: MAX_WRONG,
            status: self.status,
            points: self.points,
            message,
            hint: Some(self.hint.clone()),
            correct_word: (self.status == Outcome::Lost).then(|| self.word.clone()),
        })
    }
}

pub(crate) fn validation(detail: &str) -> GameServiceError {
    GameServiceError::Validation {
        status: 400,
        detail: detail.to_string(),
    }
}

pub(crate) fn outage() -> GameServiceError {
    GameServiceError::Service {
        status: 503,
        body: "upstream unavailable".to_string(),
    }
}

pub(crate) enum FailMode {
    Validation(&'static str),
    Outage,
}

/// Handles for a call that is parked inside the fake service. Dropping
/// `release` without sending lets the call continue; keeping it alive parks
/// the call for good.
pub(crate) struct HeldCall {
    pub entered: oneshot::Receiver<()>,
    pub release: oneshot::Sender<()>,
}

struct Hold {
    entered: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

impl Hold {
    fn pair() -> (Self, HeldCall) {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        (
            Hold {
                entered: entered_tx,
                release: release_rx,
            },
            HeldCall {
                entered: entered_rx,
                release: release_tx,
            },
        )
    }

    async fn park(slot: &Mutex<Option<Hold>>) {
        let hold = slot.lock().await.take();
        if let Some(hold) = hold {
            let _ = hold.entered.send(());
            let _ = hold.release.await;
        }
    }
}

pub(crate) struct FakeGameService {
    words: Mutex<VecDeque<&'static str>>,
    games: Mutex<HashMap<SessionId, FakeGame>>,
    next_id: AtomicI64,
    pub new_puzzle_calls: AtomicUsize,
    pub guess_calls: AtomicUsize,
    pub player_names: Mutex<Vec<Option<String>>>,
    fail_new_puzzle: AtomicBool,
    fail_next_guess: Mutex<Option<FailMode>>,
    hold_next_guess: Mutex<Option<Hold>>,
    hold_next_puzzle: Mutex<Option<Hold>>,
    pub leaderboard: Mutex<Option<Vec<LeaderboardEntry>>>,
    pub stats: Mutex<Option<GlobalStats>>,
}

impl FakeGameService {
    pub fn with_words(words: &[&'static str]) -> Self {
        Self {
            words: Mutex::new(words.iter().copied().collect()),
            games: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            new_puzzle_calls: AtomicUsize::new(0),
            guess_calls: AtomicUsize::new(0),
            player_names: Mutex::new(Vec::new()),
            fail_new_puzzle: AtomicBool::new(false),
            fail_next_guess: Mutex::new(None),
            hold_next_guess: Mutex::new(None),
            hold_next_puzzle: Mutex::new(None),
            leaderboard: Mutex::new(None),
            stats: Mutex::new(None),
        }
    }

    pub fn guess_calls(&self) -> usize {
        self.guess_calls.load(Ordering::SeqCst)
    }

    pub fn new_puzzle_calls(&self) -> usize {
        self.new_puzzle_calls.load(Ordering::SeqCst)
    }

    pub fn set_new_puzzle_failing(&self, failing: bool) {
        self.fail_new_puzzle.store(failing, Ordering::SeqCst);
    }

    pub async fn fail_next_guess(&self, mode: FailMode) {
        *self.fail_next_guess.lock().await = Some(mode);
    }

    pub async fn hold_next_guess(&self) -> HeldCall {
        let (hold, held) = Hold::pair();
        *self.hold_next_guess.lock().await = Some(hold);
        held
    }

    pub async fn hold_next_puzzle(&self) -> HeldCall {
        let (hold, held) = Hold::pair();
        *self.hold_next_puzzle.lock().await = Some(hold);
        held
    }
}

#[async_trait]
impl GameService for FakeGameService {
    async fn new_puzzle(&self) -> Result<NewPuzzleResponse, GameServiceError> {
        self.new_puzzle_calls.fetch_add(1, Ordering::SeqCst);
        Hold::park(&self.hold_next_puzzle).await;
        if self.fail_new_puzzle.load(Ordering::SeqCst) {
            return Err(outage());
        }

        let word = self.words.lock().await.pop_front().unwrap_or("COMMIT");
        let session_id = SessionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let hint = format!("hint for {word}");
        self.games.lock().await.insert(
            session_id,
            FakeGame {
                word: word.to_string(),
                hint: hint.clone(),
                guessed: Vec::new(),
                wrong: 0,
                status: Outcome::InProgress,
                points: 0,
            },
        );

        Ok(NewPuzzleResponse {
            session_id,
            category: "GIT".to_string(),
            hint,
            word_display: "_".repeat(word.len()),
            max_wrong: MAX_WRONG,
        })
    }

    async fn submit_guess(
        &self,
        session_id: SessionId,
        letter: Letter,
        player_name: Option<&str>,
    ) -> Result<GuessResponse, GameServiceError> {
        self.guess_calls.fetch_add(1, Ordering::SeqCst);
        self.player_names
            .lock()
            .await
            .push(player_name.map(str::to_string));

        Hold::park(&self.hold_next_guess).await;

        if let Some(mode) = self.fail_next_guess.lock().await.take() {
            return Err(match mode {
                FailMode::Validation(detail) => validation(detail),
                FailMode::Outage => outage(),
            });
        }

        let mut games = self.games.lock().await;
        let game = games
            .get_mut(&session_id)
            .ok_or_else(|| GameServiceError::Validation {
                status: 404,
                detail: "Game not found".to_string(),
            })?;
        game.guess(session_id, letter)
    }

    async fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, GameServiceError> {
        match self.leaderboard.lock().await.clone() {
            Some(entries) => Ok(entries.into_iter().take(limit as usize).collect()),
            None => Err(outage()),
        }
    }

    async fn global_stats(&self) -> Result<GlobalStats, GameServiceError> {
        self.stats.lock().await.clone().ok_or_else(outage)
    }
}
