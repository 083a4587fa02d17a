//! Screen navigation and player identity, held as explicit owned state.

use storage::{IdentityStore, PLAYER_NAME_KEY};
use thiserror::Error;
use tracing::info;

use crate::{events::Notice, session::SessionController};

pub const MIN_NAME_CHARS: usize = 2;
pub const MAX_NAME_CHARS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("name must be at least {MIN_NAME_CHARS} characters")]
    TooShort,
    #[error("name must be at most {MAX_NAME_CHARS} characters")]
    TooLong,
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Name(#[from] NameError),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub fn validate_player_name(raw: &str) -> Result<String, NameError> {
    let name = raw.trim();
    let chars = name.chars().count();
    if chars < MIN_NAME_CHARS {
        return Err(NameError::TooShort);
    }
    if chars > MAX_NAME_CHARS {
        return Err(NameError::TooLong);
    }
    Ok(name.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Game,
    Leaderboard,
    Stats,
}

impl Screen {
    pub fn title(self) -> &'static str {
        match self {
            Screen::Game => "GAME",
            Screen::Leaderboard => "RANKING",
            Screen::Stats => "STATS",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shell {
    pub screen: Screen,
    pub player_name: Option<String>,
    pub game_started: bool,
}

impl Shell {
    /// Pre-fills the remembered name. The player still confirms it before
    /// a game starts.
    pub async fn restore(store: &dyn IdentityStore) -> Result<Self, ShellError> {
        let player_name = store.get(PLAYER_NAME_KEY).await?;
        Ok(Self {
            player_name,
            ..Self::default()
        })
    }

    pub fn navigate(&mut self, screen: Screen) {
        self.screen = screen;
    }

    /// The welcome screen shows until a name is submitted.
    pub fn on_welcome_screen(&self) -> bool {
        self.screen == Screen::Game && !self.game_started
    }

    pub async fn submit_name(
        &mut self,
        raw: &str,
        store: &dyn IdentityStore,
    ) -> Result<Notice, ShellError> {
        let name = validate_player_name(raw)?;
        store.set(PLAYER_NAME_KEY, &name).await?;
        info!(player = %name, "shell: player name saved");
        let notice = Notice::success(format!("🎮 Welcome, {name}!"));
        self.player_name = Some(name);
        self.game_started = true;
        Ok(notice)
    }

    pub async fn exit(
        &mut self,
        store: &dyn IdentityStore,
        controller: &SessionController,
    ) -> Result<Notice, ShellError> {
        controller.exit().await;
        store.remove(PLAYER_NAME_KEY).await?;
        let notice = match self.player_name.take() {
            Some(name) => Notice::info(format!("👋 See you soon, {name}!")),
            None => Notice::info("👋 See you soon!"),
        };
        self.game_started = false;
        info!("shell: returned to welcome screen");
        Ok(notice)
    }
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;
