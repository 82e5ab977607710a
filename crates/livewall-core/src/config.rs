use std::str::FromStr;

use crate::app_config::{AppConfig, Environment, StoreBackend, TwitchMode};
use crate::live::{Platform, Ranking};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty strings count as unset so `.env` templates with blank secrets
    // behave like missing ones.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_from = |var: &str, raw: &str| -> ConfigError {
        ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("could not parse \"{raw}\""),
        }
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.trim().parse::<u32>().map_err(|_| parse_from(var, &raw))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim().parse::<u64>().map_err(|_| parse_from(var, &raw))
    };

    let env = parse_environment(&or_default("LIVEWALL_ENV", "development"))?;

    let bind_raw = or_default("LIVEWALL_BIND_ADDR", "0.0.0.0:3000");
    let bind_addr = bind_raw
        .parse()
        .map_err(|e: std::net::AddrParseError| ConfigError::InvalidEnvVar {
            var: "LIVEWALL_BIND_ADDR".to_string(),
            reason: e.to_string(),
        })?;
    let log_level = or_default("LIVEWALL_LOG_LEVEL", "info");

    let store_backend = StoreBackend::from_str(&or_default("LIVEWALL_STORE_BACKEND", "postgres"))
        .map_err(|reason| ConfigError::InvalidEnvVar {
            var: "LIVEWALL_STORE_BACKEND".to_string(),
            reason,
        })?;
    let database_url = optional("DATABASE_URL");
    if store_backend == StoreBackend::Postgres && database_url.is_none() {
        return Err(ConfigError::MissingEnvVar("DATABASE_URL".to_string()));
    }

    let db_max_connections = parse_u32("LIVEWALL_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("LIVEWALL_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("LIVEWALL_DB_ACQUIRE_TIMEOUT_SECS", "10")?;
    let snapshot_key = or_default("LIVEWALL_SNAPSHOT_KEY", "live-json");

    let twitch_mode = TwitchMode::from_str(&or_default("LIVEWALL_TWITCH_MODE", "streams"))
        .map_err(|reason| ConfigError::InvalidEnvVar {
            var: "LIVEWALL_TWITCH_MODE".to_string(),
            reason,
        })?;
    let platforms = parse_platforms(&or_default("LIVEWALL_PLATFORMS", "youtube,twitch"))?;
    let ranking = Ranking::from_str(&or_default("LIVEWALL_RANKING", "platform-order"))
        .map_err(|reason| ConfigError::InvalidEnvVar {
            var: "LIVEWALL_RANKING".to_string(),
            reason,
        })?;

    let default_query = or_default("LIVEWALL_DEFAULT_QUERY", "game live streaming");
    let default_limit = parse_u32("LIVEWALL_DEFAULT_LIMIT", "10")?;
    if default_limit == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "LIVEWALL_DEFAULT_LIMIT".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let platform_timeout_secs = parse_u64("LIVEWALL_PLATFORM_TIMEOUT_SECS", "8")?;
    if platform_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "LIVEWALL_PLATFORM_TIMEOUT_SECS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    // A single HTTP attempt must give up before the per-platform deadline.
    let http_default = platform_timeout_secs.min(5).to_string();
    let http_timeout_secs = parse_u64("LIVEWALL_HTTP_TIMEOUT_SECS", &http_default)?;
    if http_timeout_secs == 0 || http_timeout_secs > platform_timeout_secs {
        return Err(ConfigError::InvalidEnvVar {
            var: "LIVEWALL_HTTP_TIMEOUT_SECS".to_string(),
            reason: format!("must be between 1 and {platform_timeout_secs} (the platform timeout)"),
        });
    }
    let upstream_max_retries = parse_u32("LIVEWALL_UPSTREAM_MAX_RETRIES", "1")?;
    let upstream_backoff_ms = parse_u64("LIVEWALL_UPSTREAM_BACKOFF_MS", "500")?;
    let user_agent = or_default("LIVEWALL_USER_AGENT", "livewall/0.1 (live-aggregator)");

    let refresh_keys = optional("LIVEWALL_REFRESH_KEYS")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default();

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        store_backend,
        database_url,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        snapshot_key,
        youtube_api_key: optional("YOUTUBE_API_KEY"),
        twitch_client_id: optional("TWITCH_CLIENT_ID"),
        twitch_client_secret: optional("TWITCH_CLIENT_SECRET"),
        twitch_mode,
        platforms,
        ranking,
        default_query,
        default_limit,
        platform_timeout_secs,
        http_timeout_secs,
        upstream_max_retries,
        upstream_backoff_ms,
        user_agent,
        refresh_cron: optional("LIVEWALL_REFRESH_CRON"),
        refresh_keys,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LIVEWALL_ENV".to_string(),
            reason: format!("expected development, test, or production; got \"{other}\""),
        }),
    }
}

/// Parse the comma-separated platform priority list.
///
/// Order is preserved; repeats after the first occurrence are ignored.
fn parse_platforms(raw: &str) -> Result<Vec<Platform>, ConfigError> {
    let mut platforms = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let platform = name
            .parse::<Platform>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: "LIVEWALL_PLATFORMS".to_string(),
                reason: e.to_string(),
            })?;
        if !platforms.contains(&platform) {
            platforms.push(platform);
        }
    }
    Ok(platforms)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
