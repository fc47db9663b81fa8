use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::config::ChessComConfig;
use crate::error::ChessComError;
use crate::models::{
    ArchiveGames, ArchiveList, CurrentGames, PlayerProfile, PlayerStats, TitledPlayers,
};
use crate::title::ChessTitle;

/// Read-only access to the Chess.com published-data API.
#[async_trait]
pub trait ChessComApi: Send + Sync {
    async fn get_profile(&self, username: &str) -> Result<PlayerProfile, ChessComError>;

    async fn get_stats(&self, username: &str) -> Result<PlayerStats, ChessComError>;

    async fn get_current_games(&self, username: &str) -> Result<CurrentGames, ChessComError>;

    /// Archive URLs in upstream order (oldest first).
    async fn list_archive_urls(&self, username: &str) -> Result<Vec<String>, ChessComError>;

    async fn get_archive_games(
        &self,
        username: &str,
        year: i32,
        month: u32,
    ) -> Result<ArchiveGames, ChessComError>;

    async fn list_titled_players(&self, title: ChessTitle)
    -> Result<TitledPlayers, ChessComError>;

    /// Canonical URL of a monthly archive, as it appears in the archive list.
    fn archive_url(&self, username: &str, year: i32, month: u32) -> String;
}

/// `reqwest`-backed client. One GET per call, no retries.
#[derive(Clone)]
pub struct HttpChessClient {
    http: Client,
    base_url: String,
}

impl HttpChessClient {
    pub fn new(config: &ChessComConfig) -> Result<Self, ChessComError> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChessComError::upstream(None, format!("failed to build client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn player_url(&self, username: &str, suffix: &str) -> String {
        format!(
            "{}/player/{}{}",
            self.base_url,
            username.to_ascii_lowercase(),
            suffix
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        subject: &str,
    ) -> Result<T, ChessComError> {
        debug!(url, "GET upstream");

        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ChessComError::from_transport(url, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ChessComError::NotFound(subject.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            warn!(url, status = status.as_u16(), body = %snippet, "Upstream returned an error status");
            return Err(ChessComError::upstream(
                Some(status.as_u16()),
                format!("{url} returned {status}"),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ChessComError::from_transport(url, e))
    }
}

#[async_trait]
impl ChessComApi for HttpChessClient {
    #[instrument(skip(self))]
    async fn get_profile(&self, username: &str) -> Result<PlayerProfile, ChessComError> {
        let url = self.player_url(username, "");
        self.get_json(&url, &format!("Player '{username}'")).await
    }

    #[instrument(skip(self))]
    async fn get_stats(&self, username: &str) -> Result<PlayerStats, ChessComError> {
        let url = self.player_url(username, "/stats");
        self.get_json(&url, &format!("Stats for player '{username}'"))
            .await
    }

    #[instrument(skip(self))]
    async fn get_current_games(&self, username: &str) -> Result<CurrentGames, ChessComError> {
        let url = self.player_url(username, "/games");
        self.get_json(&url, &format!("Current games for player '{username}'"))
            .await
    }

    #[instrument(skip(self))]
    async fn list_archive_urls(&self, username: &str) -> Result<Vec<String>, ChessComError> {
        let url = self.player_url(username, "/games/archives");
        let list: ArchiveList = self
            .get_json(&url, &format!("Player '{username}'"))
            .await?;
        Ok(list.archives)
    }

    #[instrument(skip(self))]
    async fn get_archive_games(
        &self,
        username: &str,
        year: i32,
        month: u32,
    ) -> Result<ArchiveGames, ChessComError> {
        let url = self.archive_url(username, year, month);
        self.get_json(
            &url,
            &format!("Archive {year:04}/{month:02} for player '{username}'"),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn list_titled_players(
        &self,
        title: ChessTitle,
    ) -> Result<TitledPlayers, ChessComError> {
        let url = format!("{}/titled/{}", self.base_url, title);
        self.get_json(&url, &format!("Title '{title}'")).await
    }

    fn archive_url(&self, username: &str, year: i32, month: u32) -> String {
        self.player_url(username, &format!("/games/{year:04}/{month:02}"))
    }
}
