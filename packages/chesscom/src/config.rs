use serde::Deserialize;

/// Upstream Chess.com API configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ChessComConfig {
    /// Base URL of the published-data API. Default: "https://api.chess.com/pub".
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds. Default: 10.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// User-Agent sent with every request. Chess.com rejects anonymous clients.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "https://api.chess.com/pub".into()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_user_agent() -> String {
    concat!("chess-elo-api/", env!("CARGO_PKG_VERSION")).into()
}

impl Default for ChessComConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}
