//! The platform-client seam and the HTTP plumbing shared by every client.

use std::time::Duration;

use async_trait::async_trait;
use livewall_core::{AppConfig, Platform};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use crate::error::PlatformError;
use crate::normalize::RawItem;

/// Upstream error bodies are kept for diagnostics but capped at this many
/// characters.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// One refresh's request parameters, shared by every client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Free-text search. Platforms without search ignore it.
    pub query: String,
    /// Maximum items wanted from each platform.
    pub limit: u32,
}

impl FetchRequest {
    #[must_use]
    pub fn new(query: impl Into<String>, limit: u32) -> Self {
        Self {
            query: query.into(),
            limit,
        }
    }
}

/// A source of live items for one platform.
///
/// Implementations return up to `request.limit` raw items ready for
/// [`crate::normalize`]. An empty result is a success, never an error.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    fn platform(&self) -> Platform;

    /// Fetches the platform's current live items.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] on auth failure, non-success HTTP status,
    /// network failure, or an unparseable body.
    async fn fetch_live(&self, request: &FetchRequest) -> Result<Vec<RawItem>, PlatformError>;
}

/// Outbound HTTP behaviour common to every client.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after the first failure for retriable errors.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            user_agent: "livewall/0.1 (live-aggregator)".to_string(),
            max_retries: 1,
            backoff_base_ms: 500,
        }
    }
}

impl HttpSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.http_timeout_secs,
            user_agent: config.user_agent.clone(),
            max_retries: config.upstream_max_retries,
            backoff_base_ms: config.upstream_backoff_ms,
        }
    }

    /// Builds a `reqwest::Client` with the configured timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Http`] if the client cannot be constructed.
    pub(crate) fn build_client(&self) -> Result<Client, PlatformError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(self.user_agent.as_str())
            .build()?;
        Ok(client)
    }
}

/// Parses `base_url`, ensuring it ends with exactly one slash so that
/// [`Url::join`] appends relative endpoint paths instead of replacing the
/// last segment.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, PlatformError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| PlatformError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })
}

/// Joins a relative endpoint path onto a base URL built by [`parse_base_url`].
pub(crate) fn endpoint(base: &Url, path: &str) -> Result<Url, PlatformError> {
    base.join(path).map_err(|e| PlatformError::InvalidBaseUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })
}

/// Asserts a 2xx status and decodes the body as JSON.
///
/// Non-success statuses become [`PlatformError::Upstream`] carrying the
/// (truncated) response body.
pub(crate) async fn read_json<T: DeserializeOwned>(
    platform: Platform,
    response: Response,
    context: &str,
) -> Result<T, PlatformError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(PlatformError::Upstream {
            platform,
            status: status.as_u16(),
            body: truncate_body(&body),
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| PlatformError::Deserialize {
        context: context.to_string(),
        source: e,
    })
}

pub(crate) fn truncate_body(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_base_url_appends_single_trailing_slash() {
        let url = parse_base_url("https://www.googleapis.com/youtube/v3//").unwrap();
        assert_eq!(url.as_str(), "https://www.googleapis.com/youtube/v3/");
    }

    #[test]
    fn endpoint_appends_relative_path() {
        let base = parse_base_url("https://api.twitch.tv/helix").unwrap();
        let url = endpoint(&base, "games/top").unwrap();
        assert_eq!(url.as_str(), "https://api.twitch.tv/helix/games/top");
    }

    #[test]
    fn parse_base_url_rejects_garbage() {
        let err = parse_base_url("not a url").unwrap_err();
        assert!(matches!(err, PlatformError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn truncate_body_caps_length() {
        let long = "x".repeat(2_000);
        assert_eq!(truncate_body(&long).len(), MAX_ERROR_BODY_CHARS);
        assert_eq!(truncate_body("short"), "short");
    }
}
