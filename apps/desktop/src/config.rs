use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "git_game.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub identity_database_url: String,
    pub leaderboard_limit: u32,
    pub request_timeout_secs: u64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".into(),
            identity_database_url: "sqlite://./data/identity.db".into(),
            leaderboard_limit: 20,
            request_timeout_secs: 10,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    identity_database_url: Option<String>,
    leaderboard_limit: Option<u32>,
    request_timeout_secs: Option<u64>,
    log_filter: Option<String>,
}

pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    load_settings_with_env(config_path, |key| std::env::var(key).ok())
}

/// Defaults, then the TOML file, then environment variables. A missing
/// default file is fine; a missing explicit file is an error.
pub fn load_settings_with_env(
    config_path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match config_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    match fs::read_to_string(&path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
            if let Some(v) = file_cfg.api_url {
                settings.api_url = v;
            }
            if let Some(v) = file_cfg.identity_database_url {
                settings.identity_database_url = v;
            }
            if let Some(v) = file_cfg.leaderboard_limit {
                settings.leaderboard_limit = v;
            }
            if let Some(v) = file_cfg.request_timeout_secs {
                settings.request_timeout_secs = v;
            }
            if let Some(v) = file_cfg.log_filter {
                settings.log_filter = v;
            }
        }
        Err(err) if required => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()));
        }
        Err(_) => {}
    }

    if let Some(v) = env("GIT_GAME_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = env("GIT_GAME_IDENTITY_DB") {
        settings.identity_database_url = v;
    }
    if let Some(v) = env("APP__IDENTITY_DB") {
        settings.identity_database_url = v;
    }

    if let Some(v) = env("APP__LEADERBOARD_LIMIT") {
        if let Ok(parsed) = v.parse::<u32>() {
            settings.leaderboard_limit = parsed;
        }
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    settings.identity_database_url = normalize_database_url(&settings.identity_database_url);
    Ok(settings)
}

/// Accepts a bare file path or a `sqlite:` URL and returns the
/// `sqlite://` form the storage layer expects.
pub fn normalize_database_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return Settings::default().identity_database_url;
    }
    if raw.starts_with("sqlite::memory:") || raw.contains("://") {
        return raw.to_string();
    }

    let path = raw.strip_prefix("sqlite:").unwrap_or(raw);
    format!("sqlite://{}", path.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
