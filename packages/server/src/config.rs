use chesscom::ChessComConfig;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    1
}

/// TTLs for the upstream response cache, one per proxied endpoint.
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    #[serde(default = "default_profile_ttl")]
    pub profile_ttl_secs: u64,
    #[serde(default = "default_stats_ttl")]
    pub stats_ttl_secs: u64,
    #[serde(default = "default_current_games_ttl")]
    pub current_games_ttl_secs: u64,
    #[serde(default = "default_archive_ttl")]
    pub archive_ttl_secs: u64,
    #[serde(default = "default_titled_ttl")]
    pub titled_ttl_secs: u64,
}

fn default_cache_enabled() -> bool {
    true
}
fn default_profile_ttl() -> u64 {
    60 * 60
}
fn default_stats_ttl() -> u64 {
    15 * 60
}
fn default_current_games_ttl() -> u64 {
    60
}
fn default_archive_ttl() -> u64 {
    5 * 60
}
fn default_titled_ttl() -> u64 {
    24 * 60 * 60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            profile_ttl_secs: default_profile_ttl(),
            stats_ttl_secs: default_stats_ttl(),
            current_games_ttl_secs: default_current_games_ttl(),
            archive_ttl_secs: default_archive_ttl(),
            titled_ttl_secs: default_titled_ttl(),
        }
    }
}

/// Periodic re-sync of the current month's archive for every stored player.
#[derive(Debug, Deserialize, Clone)]
pub struct RefreshConfig {
    /// Default: false.
    #[serde(default)]
    pub enabled: bool,
    /// Default: 3600.
    #[serde(default = "default_refresh_interval")]
    pub interval_secs: u64,
    /// Rating step whose crossing is reported. Default: 50.
    #[serde(default = "default_rating_threshold")]
    pub rating_threshold: i32,
}

fn default_refresh_interval() -> u64 {
    60 * 60
}
fn default_rating_threshold() -> i32 {
    50
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_refresh_interval(),
            rating_threshold: default_rating_threshold(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub chesscom: ChessComConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.url", "sqlite://chess_elo.db?mode=rwc")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., CHESS_ELO__DATABASE__URL)
            .add_source(Environment::with_prefix("CHESS_ELO").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
