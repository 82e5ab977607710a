//! HTTP client for the `YouTube` Data API v3.
//!
//! Two-step protocol: `search` (live videos matching a query) yields video
//! ids, then one `videos` call fetches snippet and statistics for the whole
//! batch. The API key travels as the `key` query parameter.

use async_trait::async_trait;
use livewall_core::{AppConfig, Platform};
use reqwest::{Client, Url};

use crate::client::{
    endpoint, parse_base_url, read_json, FetchRequest, HttpSettings, PlatformClient,
};
use crate::error::PlatformError;
use crate::normalize::RawItem;
use crate::retry::retry_with_backoff;
use crate::types::{YouTubeSearchResponse, YouTubeVideoListResponse};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

/// Upper bound the search endpoint accepts for `maxResults`.
pub const MAX_RESULTS: u32 = 50;

/// Credentials and endpoint for the `YouTube` client.
#[derive(Clone)]
pub struct YouTubeConfig {
    pub api_key: String,
    pub base_url: String,
}

impl std::fmt::Debug for YouTubeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YouTubeConfig")
            .field("api_key", &"[redacted]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl YouTubeConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Points the client at another host (a mock server in tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// `None` when `YOUTUBE_API_KEY` is not configured.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Option<Self> {
        config.youtube_api_key.as_deref().map(Self::new)
    }
}

pub struct YouTubeClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl YouTubeClient {
    /// # Errors
    ///
    /// Returns [`PlatformError::Http`] if the HTTP client cannot be built, or
    /// [`PlatformError::InvalidBaseUrl`] if the configured base URL does not
    /// parse.
    pub fn new(config: YouTubeConfig, http: &HttpSettings) -> Result<Self, PlatformError> {
        Ok(Self {
            client: http.build_client()?,
            api_key: config.api_key,
            base_url: parse_base_url(&config.base_url)?,
            max_retries: http.max_retries,
            backoff_base_ms: http.backoff_base_ms,
        })
    }

    /// Step 1: live-video search. Returns candidate video ids in upstream
    /// order; results without a `videoId` are skipped.
    async fn search_live_ids(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<String>, PlatformError> {
        let max_results = limit.to_string();
        let url = self.build_url(
            "search",
            &[
                ("part", "snippet"),
                ("q", query),
                ("type", "video"),
                ("eventType", "live"),
                ("maxResults", &max_results),
            ],
        )?;
        let response: YouTubeSearchResponse = self.get_json(&url, "youtube search").await?;

        Ok(response
            .items
            .into_iter()
            .filter_map(|item| item.id.and_then(|id| id.video_id))
            .filter(|id| !id.is_empty())
            .collect())
    }

    /// Step 2: batch detail lookup for the given ids.
    async fn video_details(&self, ids: &[String]) -> Result<Vec<RawItem>, PlatformError> {
        let joined = ids.join(",");
        let url = self.build_url("videos", &[("part", "snippet,statistics"), ("id", &joined)])?;
        let response: YouTubeVideoListResponse = self.get_json(&url, "youtube videos").await?;

        Ok(response
            .items
            .into_iter()
            .filter(|video| !video.id.is_empty())
            .map(RawItem::YouTube)
            .collect())
    }

    /// Builds an endpoint URL with `key` first, then the given parameters,
    /// all percent-encoded by [`Url::query_pairs_mut`].
    fn build_url(&self, path: &str, extra: &[(&str, &str)]) -> Result<Url, PlatformError> {
        let mut url = endpoint(&self.base_url, path)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, PlatformError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let response = self.client.get(url.clone()).send().await?;
            read_json(Platform::YouTube, response, context).await
        })
        .await
    }
}

#[async_trait]
impl PlatformClient for YouTubeClient {
    fn platform(&self) -> Platform {
        Platform::YouTube
    }

    async fn fetch_live(&self, request: &FetchRequest) -> Result<Vec<RawItem>, PlatformError> {
        if request.limit == 0 {
            return Ok(Vec::new());
        }
        let limit = request.limit.min(MAX_RESULTS);
        let ids = self.search_live_ids(&request.query, limit).await?;
        if ids.is_empty() {
            tracing::debug!(query = %request.query, "youtube: search returned no live videos");
            return Ok(Vec::new());
        }

        let items = self.video_details(&ids).await?;
        tracing::debug!(
            searched = ids.len(),
            detailed = items.len(),
            "youtube: fetched live video details"
        );
        Ok(items)
    }
}
