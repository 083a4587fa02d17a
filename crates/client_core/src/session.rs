use std::{
    collections::BTreeSet,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use shared::{
    domain::{DisplayPattern, Letter, Outcome, SessionId},
    protocol::{GuessResponse, NewPuzzleResponse},
};
use storage::{IdentityStore, PLAYER_NAME_KEY};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    error::{GameServiceError, LocalRejection},
    events::{ClientEvent, Notice},
    service::GameService,
};

pub const DEFAULT_STATUS_MESSAGE: &str = "Good luck! 🚀";
const START_FAILED_MESSAGE: &str = "Failed to start a new game";
const GUESS_FAILED_MESSAGE: &str = "Failed to submit guess";

/// One attempt at a single secret word, mirrored from the game service.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub session_id: SessionId,
    pub category: String,
    pub hint: String,
    pub display_pattern: DisplayPattern,
    pub guessed_letters: BTreeSet<Letter>,
    pub wrong_count: u32,
    pub max_wrong: u32,
    pub outcome: Outcome,
    pub score: u32,
    pub status_message: String,
    pub revealed_word: Option<String>,
}

impl Session {
    fn from_puzzle(puzzle: NewPuzzleResponse) -> Self {
        Self {
            session_id: puzzle.session_id,
            category: puzzle.category,
            hint: puzzle.hint,
            display_pattern: DisplayPattern::parse(&puzzle.word_display),
            guessed_letters: BTreeSet::new(),
            wrong_count: 0,
            max_wrong: puzzle.max_wrong,
            outcome: Outcome::InProgress,
            score: 0,
            status_message: DEFAULT_STATUS_MESSAGE.to_string(),
            revealed_word: None,
        }
    }

    /// Builds the replacement session for a guess reply. Only `category`
    /// survives from the current session; the reply is authoritative for
    /// everything else.
    fn replaced_by(&self, reply: GuessResponse) -> Self {
        let revealed_word = match reply.status {
            Outcome::Lost => reply.correct_word,
            Outcome::InProgress | Outcome::Won => None,
        };
        Self {
            session_id: reply.session_id,
            category: self.category.clone(),
            hint: reply.hint.unwrap_or_else(|| self.hint.clone()),
            display_pattern: DisplayPattern::parse(&reply.word_display),
            guessed_letters: reply.guessed_letters.into_iter().collect(),
            wrong_count: reply.wrong_guesses,
            max_wrong: reply.max_wrong,
            outcome: reply.status,
            score: reply.points,
            status_message: reply.message,
            revealed_word,
        }
    }

    pub fn has_guessed(&self, letter: Letter) -> bool {
        self.guessed_letters.contains(&letter)
    }

    pub fn remaining_attempts(&self) -> u32 {
        self.max_wrong.saturating_sub(self.wrong_count)
    }

    /// Share of the wrong-guess budget still unspent; `None` without a budget.
    pub fn progress_fraction(&self) -> Option<f64> {
        if self.max_wrong == 0 {
            return None;
        }
        Some(f64::from(self.remaining_attempts()) / f64::from(self.max_wrong))
    }

    pub fn phase(&self) -> SessionPhase {
        match self.outcome {
            Outcome::InProgress => SessionPhase::InProgress,
            Outcome::Won => SessionPhase::Won,
            Outcome::Lost => SessionPhase::Lost,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NoSession,
    InProgress,
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartDisposition {
    Started(SessionId),
    /// A later `start_session` or `exit` made this request irrelevant.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessDisposition {
    Applied(Outcome),
    Ignored(LocalRejection),
    /// The session changed while the request was outstanding.
    Stale,
}

/// Point-in-time copy of the controller state for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub session: Option<Session>,
    pub busy: bool,
}

impl SessionSnapshot {
    pub fn phase(&self) -> SessionPhase {
        self.session
            .as_ref()
            .map(Session::phase)
            .unwrap_or(SessionPhase::NoSession)
    }

    pub fn is_letter_available(&self, letter: Letter) -> bool {
        match &self.session {
            Some(session) => {
                session.outcome == Outcome::InProgress && !session.has_guessed(letter) && !self.busy
            }
            None => false,
        }
    }

    pub fn remaining_attempts(&self) -> Option<u32> {
        self.session.as_ref().map(Session::remaining_attempts)
    }

    pub fn progress_fraction(&self) -> Option<f64> {
        self.session.as_ref().and_then(Session::progress_fraction)
    }
}

#[derive(Default)]
struct ControllerState {
    session: Option<Session>,
    /// Bumped whenever the session is replaced or discarded.
    generation: u64,
    guess_in_flight: bool,
    latest_puzzle_ticket: u64,
}

impl ControllerState {
    fn busy(&self, puzzle_pending: bool) -> bool {
        self.guess_in_flight || puzzle_pending
    }

    fn check_guess(
        &self,
        raw: char,
        puzzle_pending: bool,
    ) -> Result<(SessionId, Letter), LocalRejection> {
        let session = self.session.as_ref().ok_or(LocalRejection::NoSession)?;
        if session.outcome.is_terminal() {
            return Err(LocalRejection::NotInProgress);
        }
        let letter = Letter::parse(raw).map_err(|_| LocalRejection::InvalidLetter(raw))?;
        if session.has_guessed(letter) {
            return Err(LocalRejection::AlreadyGuessed(letter));
        }
        if self.busy(puzzle_pending) {
            return Err(LocalRejection::RequestInFlight);
        }
        Ok((session.session_id, letter))
    }
}

pub struct SessionController {
    service: Arc<dyn GameService>,
    identity: Arc<dyn IdentityStore>,
    inner: Mutex<ControllerState>,
    /// Ticket of the one `start_session` whose reply is still awaited, or
    /// [`NO_PENDING_PUZZLE`].
    pending_puzzle: AtomicU64,
    events: broadcast::Sender<ClientEvent>,
}

const NO_PENDING_PUZZLE: u64 = 0;

/// Clears the pending-puzzle marker when its `start_session` finishes or is
/// cancelled, unless a newer request or `exit` already replaced it.
struct PendingPuzzle<'a> {
    slot: &'a AtomicU64,
    ticket: u64,
}

impl Drop for PendingPuzzle<'_> {
    fn drop(&mut self) {
        let _ = self.slot.compare_exchange(
            self.ticket,
            NO_PENDING_PUZZLE,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }
}

impl SessionController {
    pub fn new(service: Arc<dyn GameService>, identity: Arc<dyn IdentityStore>) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            service,
            identity,
            inner: Mutex::new(ControllerState::default()),
            pending_puzzle: AtomicU64::new(NO_PENDING_PUZZLE),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let guard = self.inner.lock().await;
        SessionSnapshot {
            session: guard.session.clone(),
            busy: guard.busy(self.puzzle_pending()),
        }
    }

    pub async fn phase(&self) -> SessionPhase {
        self.snapshot().await.phase()
    }

    pub async fn is_letter_available(&self, raw: char) -> bool {
        match Letter::parse(raw) {
            Ok(letter) => self.snapshot().await.is_letter_available(letter),
            Err(_) => false,
        }
    }

    fn puzzle_pending(&self) -> bool {
        self.pending_puzzle.load(Ordering::SeqCst) != NO_PENDING_PUZZLE
    }

    /// Requests a fresh puzzle and, on success, replaces any current session.
    /// On failure the current session is left as it was.
    pub async fn start_session(&self) -> Result<StartDisposition, GameServiceError> {
        let pending = {
            let mut guard = self.inner.lock().await;
            guard.latest_puzzle_ticket += 1;
            let ticket = guard.latest_puzzle_ticket;
            self.pending_puzzle.store(ticket, Ordering::SeqCst);
            PendingPuzzle {
                slot: &self.pending_puzzle,
                ticket,
            }
        };
        let ticket = pending.ticket;

        let result = self.service.new_puzzle().await;

        let mut guard = self.inner.lock().await;
        drop(pending);
        if ticket != guard.latest_puzzle_ticket {
            debug!(ticket, "game: dropping superseded puzzle response");
            return Ok(StartDisposition::Superseded);
        }

        match result {
            Ok(puzzle) => {
                let session = Session::from_puzzle(puzzle);
                let session_id = session.session_id;
                let category = session.category.clone();
                guard.generation += 1;
                guard.guess_in_flight = false;
                guard.session = Some(session);
                drop(guard);

                info!(%session_id, %category, "game: session started");
                self.emit(ClientEvent::SessionStarted {
                    session_id,
                    category,
                });
                Ok(StartDisposition::Started(session_id))
            }
            Err(err) => {
                drop(guard);
                warn!(error = %err, "game: failed to start session");
                self.emit(ClientEvent::Notice(Notice::error(START_FAILED_MESSAGE)));
                Err(err)
            }
        }
    }

    pub async fn submit_guess(&self, raw: char) -> Result<GuessDisposition, GameServiceError> {
        let (session_id, letter, generation) = {
            let mut guard = self.inner.lock().await;
            let (session_id, letter) = match guard.check_guess(raw, self.puzzle_pending()) {
                Ok(checked) => checked,
                Err(rejection) => {
                    debug!(%rejection, "game: guess ignored locally");
                    return Ok(GuessDisposition::Ignored(rejection));
                }
            };
            guard.guess_in_flight = true;
            (session_id, letter, guard.generation)
        };

        let player_name = match self.identity.get(PLAYER_NAME_KEY).await {
            Ok(name) => name,
            Err(err) => {
                warn!(error = %err, "game: could not read player name; guessing anonymously");
                None
            }
        };

        let result = self
            .service
            .submit_guess(session_id, letter, player_name.as_deref())
            .await;

        let mut guard = self.inner.lock().await;
        if guard.generation != generation {
            debug!(%session_id, %letter, "game: dropping response for replaced session");
            return Ok(GuessDisposition::Stale);
        }
        guard.guess_in_flight = false;

        let reply = match result {
            Ok(reply) => reply,
            Err(err) => {
                drop(guard);
                warn!(%session_id, %letter, error = %err, "game: guess failed");
                self.emit(ClientEvent::Notice(Notice::error(
                    err.user_message(GUESS_FAILED_MESSAGE),
                )));
                return Err(err);
            }
        };

        let Some(current) = guard.session.as_ref() else {
            return Ok(GuessDisposition::Stale);
        };
        if reply.session_id != current.session_id {
            warn!(
                expected = %current.session_id,
                received = %reply.session_id,
                "game: dropping guess response for another session"
            );
            return Ok(GuessDisposition::Stale);
        }

        let next = current.replaced_by(reply);
        let hit = next.wrong_count == current.wrong_count;
        let outcome = next.outcome;
        let score = next.score;
        let message = next.status_message.clone();
        if next.guessed_letters.len() != current.guessed_letters.len() + 1 {
            warn!(
                %session_id,
                before = current.guessed_letters.len(),
                after = next.guessed_letters.len(),
                "game: service letter set did not grow by one"
            );
        }
        guard.session = Some(next);
        drop(guard);

        info!(%session_id, %letter, hit, ?outcome, "game: guess applied");
        self.emit(ClientEvent::GuessApplied {
            letter,
            hit,
            outcome,
        });
        let notice = match outcome {
            Outcome::Won => Notice::success(format!("VICTORY! +{score} points!")),
            Outcome::Lost => Notice::error("Game over!"),
            Outcome::InProgress if hit => Notice::success(message),
            Outcome::InProgress => Notice::error(message),
        };
        self.emit(ClientEvent::Notice(notice));

        Ok(GuessDisposition::Applied(outcome))
    }

    /// Drops the current session and ignores any response still on its way.
    pub async fn exit(&self) {
        let had_session = {
            let mut guard = self.inner.lock().await;
            guard.generation += 1;
            guard.latest_puzzle_ticket += 1;
            guard.guess_in_flight = false;
            self.pending_puzzle.store(NO_PENDING_PUZZLE, Ordering::SeqCst);
            guard.session.take().is_some()
        };
        if had_session {
            info!("game: session discarded");
            self.emit(ClientEvent::SessionDiscarded);
        }
    }

    fn emit(&self, event: ClientEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
