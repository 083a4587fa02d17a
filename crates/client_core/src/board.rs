//! Render model for the game screen, derived from a [`SessionSnapshot`].

use shared::domain::{Letter, Outcome};

use crate::{
    hangman::{self, DangerLevel, HangmanStage},
    session::SessionSnapshot,
};

/// Keyboard rows: A-I, J-R, S-Z.
const ROW_SPLITS: [(usize, usize); 3] = [(0, 9), (9, 18), (18, 26)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Available,
    Guessed,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    pub letter: Letter,
    pub state: KeyState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Neutral,
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
    pub category: String,
    pub score: u32,
    pub errors_label: String,
    pub remaining_attempts: u32,
    /// Guessed letters out of the whole alphabet.
    pub letters_tried: usize,
    pub letters_total: usize,
    /// Unspent share of the wrong-guess budget, 1.0 at the start.
    pub progress: f64,
    pub status_message: String,
    pub status_tone: StatusTone,
    pub word: String,
    pub hint: String,
    pub revealed_word: Option<String>,
    pub keyboard: Vec<Vec<Key>>,
    pub stage: &'static HangmanStage,
    pub indicator: Vec<bool>,
    pub danger: DangerLevel,
    pub can_start_new: bool,
}

impl BoardView {
    /// `None` until a session exists.
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Option<Self> {
        let session = snapshot.session.as_ref()?;

        let keyboard = ROW_SPLITS
            .iter()
            .map(|&(start, end)| {
                Letter::ALPHABET[start..end]
                    .iter()
                    .map(|&letter| Key {
                        letter,
                        state: if session.has_guessed(letter) {
                            KeyState::Guessed
                        } else if snapshot.is_letter_available(letter) {
                            KeyState::Available
                        } else {
                            KeyState::Disabled
                        },
                    })
                    .collect()
            })
            .collect();

        let status_tone = match session.outcome {
            Outcome::InProgress => StatusTone::Neutral,
            Outcome::Won => StatusTone::Success,
            Outcome::Lost => StatusTone::Failure,
        };

        Some(Self {
            category: session.category.clone(),
            score: session.score,
            errors_label: format!("{}/{} errors", session.wrong_count, session.max_wrong),
            remaining_attempts: session.remaining_attempts(),
            letters_tried: session.guessed_letters.len(),
            letters_total: Letter::ALPHABET.len(),
            progress: session.progress_fraction().unwrap_or(0.0),
            status_message: session.status_message.clone(),
            status_tone,
            word: session.display_pattern.to_string(),
            hint: session.hint.clone(),
            revealed_word: session.revealed_word.clone(),
            keyboard,
            stage: hangman::stage(session.wrong_count),
            indicator: hangman::indicator(session.wrong_count, session.max_wrong),
            danger: hangman::danger(session.wrong_count, session.max_wrong),
            can_start_new: !snapshot.busy,
        })
    }
}
