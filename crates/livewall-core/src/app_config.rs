use std::net::SocketAddr;
use std::str::FromStr;

use crate::live::{Platform, Ranking};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Where the current snapshot is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("expected \"postgres\" or \"memory\", got \"{other}\"")),
        }
    }
}

/// Which Helix listing the Twitch client pulls.
///
/// `TopGames` ranks categories rather than live channels and is kept as an
/// opt-in alternative; `Streams` is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TwitchMode {
    #[default]
    Streams,
    TopGames,
}

impl FromStr for TwitchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "streams" => Ok(TwitchMode::Streams),
            "top-games" | "top_games" => Ok(TwitchMode::TopGames),
            other => Err(format!("expected \"streams\" or \"top-games\", got \"{other}\"")),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub snapshot_key: String,
    pub youtube_api_key: Option<String>,
    pub twitch_client_id: Option<String>,
    pub twitch_client_secret: Option<String>,
    pub twitch_mode: TwitchMode,
    /// Platform priority order; also decides which clients are built.
    pub platforms: Vec<Platform>,
    pub ranking: Ranking,
    pub default_query: String,
    pub default_limit: u32,
    pub platform_timeout_secs: u64,
    pub http_timeout_secs: u64,
    pub upstream_max_retries: u32,
    pub upstream_backoff_ms: u64,
    pub user_agent: String,
    pub refresh_cron: Option<String>,
    pub refresh_keys: Vec<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("store_backend", &self.store_backend)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("snapshot_key", &self.snapshot_key)
            .field(
                "youtube_api_key",
                &self.youtube_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("twitch_client_id", &self.twitch_client_id)
            .field(
                "twitch_client_secret",
                &self.twitch_client_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("twitch_mode", &self.twitch_mode)
            .field("platforms", &self.platforms)
            .field("ranking", &self.ranking)
            .field("default_query", &self.default_query)
            .field("default_limit", &self.default_limit)
            .field("platform_timeout_secs", &self.platform_timeout_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("upstream_max_retries", &self.upstream_max_retries)
            .field("upstream_backoff_ms", &self.upstream_backoff_ms)
            .field("user_agent", &self.user_agent)
            .field("refresh_cron", &self.refresh_cron)
            .field("refresh_keys", &format!("[{} redacted]", self.refresh_keys.len()))
            .finish()
    }
}
