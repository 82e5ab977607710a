//! Upstream response shapes.
//!
//! Only the fields the normalizer reads are modelled. Everything optional
//! upstream is `Option` or `#[serde(default)]` here so a sparse item never
//! fails the whole batch.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// YouTube Data API v3
// ---------------------------------------------------------------------------

/// `GET /search` response.
#[derive(Debug, Deserialize)]
pub struct YouTubeSearchResponse {
    #[serde(default)]
    pub items: Vec<YouTubeSearchItem>,
}

#[derive(Debug, Deserialize)]
pub struct YouTubeSearchItem {
    #[serde(default)]
    pub id: Option<YouTubeSearchItemId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeSearchItemId {
    #[serde(default)]
    pub video_id: Option<String>,
}

/// `GET /videos` response.
#[derive(Debug, Deserialize)]
pub struct YouTubeVideoListResponse {
    #[serde(default)]
    pub items: Vec<YouTubeVideo>,
}

/// One item of the `videos` detail batch (`part=snippet,statistics`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct YouTubeVideo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub snippet: Option<YouTubeSnippet>,
    #[serde(default)]
    pub statistics: Option<YouTubeStatistics>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeSnippet {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub channel_title: Option<String>,
    #[serde(default)]
    pub thumbnails: Option<YouTubeThumbnails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct YouTubeThumbnails {
    #[serde(default)]
    pub high: Option<YouTubeThumbnail>,
    #[serde(default)]
    pub medium: Option<YouTubeThumbnail>,
    #[serde(default, rename = "default")]
    pub fallback: Option<YouTubeThumbnail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct YouTubeThumbnail {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeStatistics {
    /// The API sends counts as decimal strings; numbers are accepted too.
    #[serde(default)]
    pub view_count: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Twitch (id.twitch.tv + Helix)
// ---------------------------------------------------------------------------

/// Client-credentials token response from `POST /oauth2/token`.
#[derive(Debug, Deserialize)]
pub struct TwitchTokenResponse {
    pub access_token: String,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Helix list envelope: `{ "data": [...], "pagination": {...} }`.
#[derive(Debug, Deserialize)]
pub struct HelixPage<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// One entry of `GET /helix/streams`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TwitchStream {
    pub id: String,
    #[serde(default)]
    pub user_login: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub game_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub viewer_count: Option<u64>,
    /// Template containing literal `{width}` and `{height}` placeholders.
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

/// One entry of `GET /helix/games/top`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TwitchGame {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Template containing literal `{width}` and `{height}` placeholders.
    #[serde(default)]
    pub box_art_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_item_without_video_id_deserializes() {
        let json = serde_json::json!({
            "items": [
                { "id": { "kind": "youtube#channel", "channelId": "UC1" } },
                { "id": { "kind": "youtube#video", "videoId": "abc" } },
                {}
            ]
        });
        let parsed: YouTubeSearchResponse = serde_json::from_value(json).expect("parse");
        let ids: Vec<Option<String>> = parsed
            .items
            .into_iter()
            .map(|i| i.id.and_then(|id| id.video_id))
            .collect();
        assert_eq!(ids, vec![None, Some("abc".to_string()), None]);
    }

    #[test]
    fn video_tolerates_missing_snippet_and_statistics() {
        let parsed: YouTubeVideo =
            serde_json::from_value(serde_json::json!({ "id": "abc" })).expect("parse");
        assert_eq!(parsed.id, "abc");
        assert!(parsed.snippet.is_none());
        assert!(parsed.statistics.is_none());
    }

    #[test]
    fn default_thumbnail_key_maps_to_fallback() {
        let parsed: YouTubeThumbnails = serde_json::from_value(serde_json::json!({
            "default": { "url": "https://i.ytimg.com/vi/abc/default.jpg" }
        }))
        .expect("parse");
        assert!(parsed.high.is_none());
        assert_eq!(
            parsed.fallback.and_then(|t| t.url).as_deref(),
            Some("https://i.ytimg.com/vi/abc/default.jpg")
        );
    }

    #[test]
    fn helix_page_without_data_is_empty() {
        let parsed: HelixPage<TwitchStream> =
            serde_json::from_value(serde_json::json!({ "pagination": {} })).expect("parse");
        assert!(parsed.data.is_empty());
    }
}
