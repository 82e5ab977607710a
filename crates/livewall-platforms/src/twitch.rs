//! HTTP client for the Twitch Helix API.
//!
//! Auth is the OAuth client-credentials flow against `id.twitch.tv`. The
//! resulting app token is cached until shortly before it expires and is
//! dropped early if Helix rejects it with 401.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use livewall_core::{AppConfig, Platform, TwitchMode};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::client::{
    endpoint, parse_base_url, read_json, truncate_body, FetchRequest, HttpSettings,
    PlatformClient,
};
use crate::error::PlatformError;
use crate::normalize::RawItem;
use crate::retry::retry_with_backoff;
use crate::types::{HelixPage, TwitchGame, TwitchStream, TwitchTokenResponse};

pub const DEFAULT_AUTH_BASE_URL: &str = "https://id.twitch.tv/";
pub const DEFAULT_API_BASE_URL: &str = "https://api.twitch.tv/helix/";

/// Upper bound Helix accepts for `first`.
pub const MAX_FIRST: u32 = 100;

/// Tokens are treated as expired this long before Twitch says they are.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct TwitchConfig {
    pub client_id: String,
    pub client_secret: String,
    pub mode: TwitchMode,
    pub auth_base_url: String,
    pub api_base_url: String,
}

impl std::fmt::Debug for TwitchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitchConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("mode", &self.mode)
            .field("auth_base_url", &self.auth_base_url)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl TwitchConfig {
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            mode: TwitchMode::default(),
            auth_base_url: DEFAULT_AUTH_BASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: TwitchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Overrides both hosts, e.g. with a mock server in tests.
    #[must_use]
    pub fn with_base_urls(
        mut self,
        auth_base_url: impl Into<String>,
        api_base_url: impl Into<String>,
    ) -> Self {
        self.auth_base_url = auth_base_url.into();
        self.api_base_url = api_base_url.into();
        self
    }

    /// `None` unless both `TWITCH_CLIENT_ID` and `TWITCH_CLIENT_SECRET` are set.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Option<Self> {
        let id = config.twitch_client_id.as_deref()?;
        let secret = config.twitch_client_secret.as_deref()?;
        Some(Self::new(id, secret).with_mode(config.twitch_mode))
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    /// `None` when the token response carried no `expires_in`; such a token
    /// is reused until Helix rejects it.
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn from_response(response: TwitchTokenResponse, now: Instant) -> Self {
        let expires_at = response
            .expires_in
            .map(|secs| now + Duration::from_secs(secs).saturating_sub(TOKEN_EXPIRY_MARGIN));
        Self {
            access_token: response.access_token,
            expires_at,
        }
    }

    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

pub struct TwitchClient {
    client: Client,
    client_id: String,
    client_secret: String,
    mode: TwitchMode,
    auth_base_url: Url,
    api_base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
    token: Mutex<Option<CachedToken>>,
}

impl TwitchClient {
    /// # Errors
    ///
    /// Returns [`PlatformError::Http`] if the HTTP client cannot be built, or
    /// [`PlatformError::InvalidBaseUrl`] if either base URL does not parse.
    pub fn new(config: TwitchConfig, http: &HttpSettings) -> Result<Self, PlatformError> {
        Ok(Self {
            client: http.build_client()?,
            client_id: config.client_id,
            client_secret: config.client_secret,
            mode: config.mode,
            auth_base_url: parse_base_url(&config.auth_base_url)?,
            api_base_url: parse_base_url(&config.api_base_url)?,
            max_retries: http.max_retries,
            backoff_base_ms: http.backoff_base_ms,
            token: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn mode(&self) -> TwitchMode {
        self.mode
    }

    /// Returns the cached app token, exchanging credentials for a new one
    /// when none is cached or the cached one is about to expire.
    ///
    /// The lock is held across the exchange so concurrent callers share a
    /// single token request.
    async fn access_token(&self) -> Result<String, PlatformError> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref().filter(|t| t.is_fresh(Instant::now())) {
            return Ok(token.access_token.clone());
        }

        let token = self.request_token().await?;
        let access_token = token.access_token.clone();
        *guard = Some(token);
        Ok(access_token)
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    async fn request_token(&self) -> Result<CachedToken, PlatformError> {
        let mut url = endpoint(&self.auth_base_url, "oauth2/token")?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("client_secret", &self.client_secret)
            .append_pair("grant_type", "client_credentials");
        let url = &url;

        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let response = self.client.post(url.clone()).send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(PlatformError::Auth {
                    platform: Platform::Twitch,
                    status: status.as_u16(),
                    body: truncate_body(&body),
                });
            }
            Ok(response.text().await?)
        })
        .await?;

        let parsed: TwitchTokenResponse =
            serde_json::from_str(&body).map_err(|e| PlatformError::Deserialize {
                context: "twitch token".to_string(),
                source: e,
            })?;
        if parsed.access_token.is_empty() {
            return Err(PlatformError::Auth {
                platform: Platform::Twitch,
                status: 200,
                body: "token response carried an empty access_token".to_string(),
            });
        }

        tracing::debug!(expires_in = ?parsed.expires_in, "twitch: obtained app access token");
        Ok(CachedToken::from_response(parsed, Instant::now()))
    }

    /// GETs one Helix list page, refreshing the token once on HTTP 401.
    async fn helix_list<T>(&self, path: &str, first: u32) -> Result<Vec<T>, PlatformError>
    where
        T: DeserializeOwned + Send,
    {
        let token = self.access_token().await?;
        match self.helix_page(path, first, &token).await {
            Err(PlatformError::Upstream { status: 401, .. }) => {
                tracing::info!(path, "twitch: app token rejected, requesting a new one");
                self.invalidate_token().await;
                let token = self.access_token().await?;
                self.helix_page(path, first, &token).await
            }
            other => other,
        }
    }

    async fn helix_page<T>(
        &self,
        path: &str,
        first: u32,
        token: &str,
    ) -> Result<Vec<T>, PlatformError>
    where
        T: DeserializeOwned + Send,
    {
        let mut url = endpoint(&self.api_base_url, path)?;
        url.query_pairs_mut().append_pair("first", &first.to_string());
        let url = &url;
        let context = format!("twitch {path}");
        let context = context.as_str();

        let page: HelixPage<T> =
            retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
                let response = self
                    .client
                    .get(url.clone())
                    .header("Client-ID", &self.client_id)
                    .bearer_auth(token)
                    .send()
                    .await?;
                read_json(Platform::Twitch, response, context).await
            })
            .await?;
        Ok(page.data)
    }
}

#[async_trait]
impl PlatformClient for TwitchClient {
    fn platform(&self) -> Platform {
        Platform::Twitch
    }

    async fn fetch_live(&self, request: &FetchRequest) -> Result<Vec<RawItem>, PlatformError> {
        if request.limit == 0 {
            return Ok(Vec::new());
        }
        let first = request.limit.min(MAX_FIRST);
        let items: Vec<RawItem> = match self.mode {
            TwitchMode::Streams => self
                .helix_list::<TwitchStream>("streams", first)
                .await?
                .into_iter()
                .filter(|s| !s.id.is_empty())
                .map(RawItem::TwitchStream)
                .collect(),
            TwitchMode::TopGames => self
                .helix_list::<TwitchGame>("games/top", first)
                .await?
                .into_iter()
                .filter(|g| !g.id.is_empty())
                .map(RawItem::TwitchGame)
                .collect(),
        };
        tracing::debug!(mode = ?self.mode, count = items.len(), "twitch: fetched live items");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_with_expiry_goes_stale_before_deadline() {
        let now = Instant::now();
        let token = CachedToken::from_response(
            TwitchTokenResponse {
                access_token: "abc".to_string(),
                expires_in: Some(3_600),
            },
            now,
        );
        assert!(token.is_fresh(now));
        assert!(token.is_fresh(now + Duration::from_secs(3_500)));
        assert!(!token.is_fresh(now + Duration::from_secs(3_541)));
    }

    #[test]
    fn short_lived_token_is_stale_immediately() {
        let now = Instant::now();
        let token = CachedToken::from_response(
            TwitchTokenResponse {
                access_token: "abc".to_string(),
                expires_in: Some(30),
            },
            now,
        );
        assert!(!token.is_fresh(now));
    }

    #[test]
    fn token_without_expiry_stays_fresh() {
        let now = Instant::now();
        let token = CachedToken::from_response(
            TwitchTokenResponse {
                access_token: "abc".to_string(),
                expires_in: None,
            },
            now,
        );
        assert!(token.is_fresh(now + Duration::from_secs(86_400)));
    }

    #[test]
    fn from_app_config_requires_both_credentials() {
        let mut config = livewall_core::build_app_config(|key| match key {
            "LIVEWALL_STORE_BACKEND" => Ok("memory".to_string()),
            _ => Err(std::env::VarError::NotPresent),
        })
        .expect("memory backend needs no other vars");
        config.twitch_client_id = Some("id".to_string());
        config.twitch_client_secret = None;
        assert!(TwitchConfig::from_app_config(&config).is_none());

        config.twitch_client_secret = Some("secret".to_string());
        config.twitch_mode = TwitchMode::TopGames;
        let twitch = TwitchConfig::from_app_config(&config).expect("both set");
        assert_eq!(twitch.mode, TwitchMode::TopGames);
    }

    #[test]
    fn debug_redacts_client_secret() {
        let rendered = format!("{:?}", TwitchConfig::new("id", "super-secret"));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("id"));
    }
}
