use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Letter, SessionId},
    error::ApiErrorBody,
    protocol::{
        GlobalStats, GuessRequest, GuessResponse, HealthResponse, LeaderboardEntry,
        LeaderboardQuery, NewPuzzleResponse,
    },
};
use tracing::{debug, warn};
use url::Url;

use crate::error::GameServiceError;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote authority for puzzles, guesses, ranking and statistics.
#[async_trait]
pub trait GameService: Send + Sync {
    async fn new_puzzle(&self) -> Result<NewPuzzleResponse, GameServiceError>;
    async fn submit_guess(
        &self,
        session_id: SessionId,
        letter: Letter,
        player_name: Option<&str>,
    ) -> Result<GuessResponse, GameServiceError>;
    async fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, GameServiceError>;
    async fn global_stats(&self) -> Result<GlobalStats, GameServiceError>;
}

pub struct HttpGameService {
    http: Client,
    base_url: Url,
}

impl HttpGameService {
    pub fn new(base_url: &str) -> Result<Self, GameServiceError> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, GameServiceError> {
        let base_url = normalize_base_url(base_url)?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthResponse, GameServiceError> {
        let res = self.http.get(self.endpoint("health")?).send().await?;
        decode(res).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, GameServiceError> {
        Ok(self.base_url.join(path)?)
    }
}

#[async_trait]
impl GameService for HttpGameService {
    async fn new_puzzle(&self) -> Result<NewPuzzleResponse, GameServiceError> {
        let res = self.http.get(self.endpoint("game/new")?).send().await?;
        let puzzle: NewPuzzleResponse = decode(res).await?;
        debug!(session_id = %puzzle.session_id, category = %puzzle.category, "game: puzzle issued");
        Ok(puzzle)
    }

    async fn submit_guess(
        &self,
        session_id: SessionId,
        letter: Letter,
        player_name: Option<&str>,
    ) -> Result<GuessResponse, GameServiceError> {
        let res = self
            .http
            .post(self.endpoint("game/guess")?)
            .json(&GuessRequest {
                session_id,
                letter,
                user_name: player_name.map(str::to_string),
            })
            .send()
            .await?;
        decode(res).await
    }

    async fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, GameServiceError> {
        let res = self
            .http
            .get(self.endpoint("leaderboard")?)
            .query(&LeaderboardQuery { limit })
            .send()
            .await?;
        decode(res).await
    }

    async fn global_stats(&self) -> Result<GlobalStats, GameServiceError> {
        let res = self.http.get(self.endpoint("stats")?).send().await?;
        decode(res).await
    }
}

/// `Url::join` drops the last path segment unless it ends in a slash.
fn normalize_base_url(raw: &str) -> Result<Url, GameServiceError> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, GameServiceError> {
    let status = res.status();
    if status.is_client_error() {
        let body = res.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|parsed| parsed.message())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request rejected")
                    .to_string()
            });
        return Err(GameServiceError::Validation {
            status: status.as_u16(),
            detail,
        });
    }

    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "game: service returned an error status");
        return Err(GameServiceError::Service {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = res.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|err| GameServiceError::Decode(err.to_string()))
}

#[cfg(test)]
#[path = "tests/service_tests.rs"]
mod tests;
