//! Client side of the Git Game: session state mirrored from the game
//! service, render models, and the player identity shell.

pub mod board;
pub mod error;
pub mod events;
pub mod hangman;
pub mod scoreboard;
pub mod service;
pub mod session;
pub mod shell;

pub use error::{GameServiceError, LocalRejection};
pub use events::{ClientEvent, Notice, NoticeLevel};
pub use service::{GameService, HttpGameService};
pub use session::{
    GuessDisposition, Session, SessionController, SessionPhase, SessionSnapshot,
    StartDisposition,
};
pub use shell::{Screen, Shell};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
