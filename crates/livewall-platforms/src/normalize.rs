//! Mapping from platform-specific raw items to [`LiveItem`].
//!
//! Pure and infallible: absent optional fields degrade to empty strings or
//! zero, never to an error.

use livewall_core::{LiveItem, Platform};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde_json::{Map, Value};

use crate::types::{TwitchGame, TwitchStream, YouTubeVideo};

/// Fixed size substituted into Twitch `{width}x{height}` thumbnail templates.
pub const TWITCH_THUMBNAIL_WIDTH: u32 = 640;
pub const TWITCH_THUMBNAIL_HEIGHT: u32 = 360;

const YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch?v=";
const TWITCH_CHANNEL_URL: &str = "https://www.twitch.tv/";
const TWITCH_GAME_URL: &str = "https://www.twitch.tv/directory/game/";

/// A raw upstream item, tagged by the listing it came from.
#[derive(Debug, Clone)]
pub enum RawItem {
    YouTube(YouTubeVideo),
    TwitchStream(TwitchStream),
    TwitchGame(TwitchGame),
}

impl RawItem {
    #[must_use]
    pub fn platform(&self) -> Platform {
        match self {
            RawItem::YouTube(_) => Platform::YouTube,
            RawItem::TwitchStream(_) | RawItem::TwitchGame(_) => Platform::Twitch,
        }
    }
}

/// Converts one raw upstream item into the common [`LiveItem`] shape.
#[must_use]
pub fn normalize(raw: RawItem) -> LiveItem {
    match raw {
        RawItem::YouTube(video) => normalize_youtube(video),
        RawItem::TwitchStream(stream) => normalize_twitch_stream(stream),
        RawItem::TwitchGame(game) => normalize_twitch_game(game),
    }
}

fn normalize_youtube(video: YouTubeVideo) -> LiveItem {
    let snippet = video.snippet.unwrap_or_default();
    let viewers = video
        .statistics
        .and_then(|s| s.view_count)
        .map_or(0, |v| parse_count(&v));

    let mut raw = Map::new();
    raw.insert("videoId".to_string(), Value::String(video.id.clone()));
    if let Some(channel) = snippet.channel_title.filter(|c| !c.is_empty()) {
        raw.insert("channelTitle".to_string(), Value::String(channel));
    }

    LiveItem {
        id: LiveItem::compose_id(Platform::YouTube, &video.id),
        platform: Platform::YouTube,
        title: snippet.title.unwrap_or_default(),
        thumbnail_url: select_youtube_thumbnail(snippet.thumbnails.as_ref()),
        viewers,
        url: format!("{YOUTUBE_WATCH_URL}{}", video.id),
        raw,
    }
}

/// Picks `high`, then `medium`, then `default`; empty when none carries a URL.
fn select_youtube_thumbnail(thumbnails: Option<&crate::types::YouTubeThumbnails>) -> String {
    let Some(thumbnails) = thumbnails else {
        return String::new();
    };
    [&thumbnails.high, &thumbnails.medium, &thumbnails.fallback]
        .into_iter()
        .filter_map(|t| t.as_ref().and_then(|t| t.url.as_deref()))
        .find(|url| !url.is_empty())
        .unwrap_or_default()
        .to_string()
}

fn normalize_twitch_stream(stream: TwitchStream) -> LiveItem {
    let login = stream
        .user_login
        .clone()
        .filter(|l| !l.is_empty())
        .or_else(|| stream.user_name.as_ref().map(|n| n.to_lowercase()))
        .unwrap_or_default();

    let mut raw = Map::new();
    if let Some(user_name) = stream.user_name {
        raw.insert("user_name".to_string(), Value::String(user_name));
    }
    if let Some(game_name) = stream.game_name.filter(|g| !g.is_empty()) {
        raw.insert("game_name".to_string(), Value::String(game_name));
    }

    LiveItem {
        id: LiveItem::compose_id(Platform::Twitch, &stream.id),
        platform: Platform::Twitch,
        title: stream.title.unwrap_or_default(),
        thumbnail_url: fill_thumbnail_template(stream.thumbnail_url.as_deref().unwrap_or_default()),
        viewers: stream.viewer_count.unwrap_or(0),
        url: format!("{TWITCH_CHANNEL_URL}{login}"),
        raw,
    }
}

fn normalize_twitch_game(game: TwitchGame) -> LiveItem {
    let name = game.name.unwrap_or_default();
    let mut raw = Map::new();
    raw.insert("game_id".to_string(), Value::String(game.id.clone()));

    LiveItem {
        id: LiveItem::compose_id(Platform::Twitch, &game.id),
        platform: Platform::Twitch,
        url: format!(
            "{TWITCH_GAME_URL}{}",
            utf8_percent_encode(&name, NON_ALPHANUMERIC)
        ),
        title: name,
        thumbnail_url: fill_thumbnail_template(game.box_art_url.as_deref().unwrap_or_default()),
        viewers: 0,
        raw,
    }
}

/// Substitutes the literal `{width}`/`{height}` placeholders Twitch puts in
/// thumbnail URLs.
#[must_use]
pub fn fill_thumbnail_template(template: &str) -> String {
    template
        .replace("{width}", &TWITCH_THUMBNAIL_WIDTH.to_string())
        .replace("{height}", &TWITCH_THUMBNAIL_HEIGHT.to_string())
}

/// Reads a count sent either as a JSON number or a decimal string.
/// Anything else, including negatives, reads as 0.
fn parse_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
