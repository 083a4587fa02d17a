use shared::domain::Letter;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameServiceError {
    /// The service refused the request itself (unknown session, repeated
    /// letter, finished game). `detail` is meant to be shown verbatim.
    #[error("request rejected ({status}): {detail}")]
    Validation { status: u16, detail: String },
    #[error("game service failure ({status}): {body}")]
    Service { status: u16, body: String },
    #[error("failed to reach game service: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected game service payload: {0}")]
    Decode(String),
    #[error("invalid game service url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

impl GameServiceError {
    pub fn is_validation(&self) -> bool {
        matches!(self, GameServiceError::Validation { .. })
    }

    /// Text suitable for a user-facing notice. Validation details pass
    /// through untouched, everything else collapses to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            GameServiceError::Validation { detail, .. } => detail.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Why a guess was dropped before reaching the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocalRejection {
    #[error("no active session")]
    NoSession,
    #[error("session already finished")]
    NotInProgress,
    #[error("'{0}' is not a letter between A and Z")]
    InvalidLetter(char),
    #[error("letter {0} was already guessed")]
    AlreadyGuessed(Letter),
    #[error("another request is still in flight")]
    RequestInFlight,
}
