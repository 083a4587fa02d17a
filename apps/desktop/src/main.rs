mod config;
mod render;

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use client_core::{
    board::BoardView,
    scoreboard::{LeaderboardPanel, StatsPanel},
    shell::ShellError,
    ClientEvent, GameService, GuessDisposition, HttpGameService, Screen, SessionController,
    Shell,
};
use storage::{IdentityStore, Storage};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin},
    sync::broadcast::{self, error::TryRecvError},
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "git-game", about = "Guess the Git term before the hangman is complete")]
struct Args {
    /// TOML settings file; defaults to ./git_game.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    identity_db: Option<String>,
    #[arg(long)]
    leaderboard_limit: Option<u32>,
}

struct App {
    service: Arc<HttpGameService>,
    identity: Arc<dyn IdentityStore>,
    controller: Arc<SessionController>,
    events: broadcast::Receiver<ClientEvent>,
    shell: Shell,
    leaderboard: LeaderboardPanel,
    stats: StatsPanel,
}

enum Flow {
    Continue,
    Quit,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = config::load_settings(args.config.as_deref())?;
    if let Some(api_url) = args.api_url {
        settings.api_url = api_url;
    }
    if let Some(identity_db) = args.identity_db {
        settings.identity_database_url = config::normalize_database_url(&identity_db);
    }
    if let Some(limit) = args.leaderboard_limit {
        settings.leaderboard_limit = limit;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let service = Arc::new(HttpGameService::with_timeout(
        &settings.api_url,
        settings.request_timeout(),
    )?);
    if let Err(err) = service.health().await {
        warn!(api_url = %settings.api_url, error = %err, "game service health check failed");
    }

    let storage = Storage::new(&settings.identity_database_url).await?;
    storage.health_check().await?;
    let identity: Arc<dyn IdentityStore> = Arc::new(storage.clone());
    let controller = SessionController::new(service.clone(), identity.clone());
    let events = controller.subscribe_events();
    let shell = Shell::restore(identity.as_ref()).await?;

    info!(
        api_url = %settings.api_url,
        identity_db = %settings.identity_database_url,
        "git game client starting"
    );

    let mut app = App {
        service,
        identity,
        controller,
        events,
        shell,
        leaderboard: LeaderboardPanel::new(settings.leaderboard_limit),
        stats: StatsPanel::new(),
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let flow = if app.shell.on_welcome_screen() {
            app.welcome_step(&mut lines).await?
        } else {
            app.command_step(&mut lines).await?
        };
        if let Flow::Quit = flow {
            break;
        }
    }

    storage.close().await;
    info!("git game client stopped");
    Ok(())
}

impl App {
    async fn welcome_step(&mut self, lines: &mut Lines<BufReader<Stdin>>) -> Result<Flow> {
        prompt(&render::welcome(self.shell.player_name.as_deref())).await?;
        let Some(line) = lines.next_line().await? else {
            return Ok(Flow::Quit);
        };
        let input = line.trim();
        if input.eq_ignore_ascii_case("quit") {
            return Ok(Flow::Quit);
        }

        let candidate = match (input.is_empty(), self.shell.player_name.clone()) {
            (true, Some(remembered)) => remembered,
            _ => input.to_string(),
        };

        match self.shell.submit_name(&candidate, self.identity.as_ref()).await {
            Ok(notice) => {
                println!("{}", render::notice(&notice));
                self.start_game().await;
                self.show().await;
            }
            Err(ShellError::Name(err)) => println!("{err}"),
            Err(ShellError::Storage(err)) => return Err(err),
        }
        Ok(Flow::Continue)
    }

    async fn command_step(&mut self, lines: &mut Lines<BufReader<Stdin>>) -> Result<Flow> {
        prompt("> ").await?;
        let Some(line) = lines.next_line().await? else {
            return Ok(Flow::Quit);
        };
        let input = line.trim().to_ascii_lowercase();

        match input.as_str() {
            "" => {}
            "quit" => return Ok(Flow::Quit),
            "exit" => {
                match self
                    .shell
                    .exit(self.identity.as_ref(), &self.controller)
                    .await
                {
                    Ok(notice) => println!("{}", render::notice(&notice)),
                    Err(ShellError::Storage(err)) => return Err(err),
                    Err(ShellError::Name(err)) => println!("{err}"),
                }
                self.drain_events();
                return Ok(Flow::Continue);
            }
            "new" => {
                self.shell.navigate(Screen::Game);
                self.start_game().await;
            }
            "rank" => {
                self.shell.navigate(Screen::Leaderboard);
                self.refresh_panel().await;
            }
            "stats" => {
                self.shell.navigate(Screen::Stats);
                self.refresh_panel().await;
            }
            "game" => self.shell.navigate(Screen::Game),
            "refresh" => self.refresh_panel().await,
            "help" => println!("{}", render::help()),
            other => match single_char(other) {
                Some(letter) => {
                    self.shell.navigate(Screen::Game);
                    self.guess(letter).await;
                }
                None => println!("{}", render::help()),
            },
        }

        self.show().await;
        Ok(Flow::Continue)
    }

    async fn start_game(&mut self) {
        if let Err(err) = self.controller.start_session().await {
            debug!(error = %err, "new game request failed");
        }
    }

    async fn guess(&mut self, letter: char) {
        match self.controller.submit_guess(letter).await {
            Ok(GuessDisposition::Ignored(reason)) => {
                debug!(%reason, "guess ignored");
            }
            Ok(_) => {}
            Err(err) => debug!(error = %err, "guess request failed"),
        }
    }

    async fn refresh_panel(&mut self) {
        let service: &dyn GameService = self.service.as_ref();
        match self.shell.screen {
            Screen::Game => {}
            Screen::Leaderboard => self.leaderboard.refresh(service).await,
            Screen::Stats => self.stats.refresh(service).await,
        }
    }

    fn drain_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(ClientEvent::Notice(notice)) => println!("{}", render::notice(&notice)),
                Ok(other) => debug!(event = ?other, "client event"),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "dropped client events");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }

    async fn show(&mut self) {
        self.drain_events();
        println!();
        println!(
            "{}",
            render::header(self.shell.screen, self.shell.player_name.as_deref())
        );
        match self.shell.screen {
            Screen::Game => {
                let snapshot = self.controller.snapshot().await;
                match BoardView::from_snapshot(&snapshot) {
                    Some(view) => println!("{}", render::board(&view)),
                    None => println!("No game in progress. Type `new` to start one."),
                }
            }
            Screen::Leaderboard => println!("{}", render::leaderboard(&self.leaderboard.state)),
            Screen::Stats => println!("{}", render::stats(&self.stats.state)),
        }
    }
}

fn single_char(input: &str) -> Option<char> {
    let mut chars = input.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

async fn prompt(text: &str) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}
