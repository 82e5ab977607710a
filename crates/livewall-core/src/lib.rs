//! Shared data model and configuration for the live-stream aggregator.

pub mod app_config;
pub mod config;
pub mod live;

pub use app_config::{AppConfig, Environment, StoreBackend, TwitchMode};
pub use config::{build_app_config, load_app_config, load_app_config_from_env};
pub use live::{LiveItem, Platform, Ranking, Snapshot, UnknownPlatform};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
