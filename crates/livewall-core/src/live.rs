//! The normalized live-stream model shared by every crate.
//!
//! [`LiveItem`] is the one shape every platform client is mapped into, and
//! [`Snapshot`] is the immutable result of a single refresh cycle. Both use
//! camelCase field names on the wire because the front-end consumes them
//! as-is.

use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upstream streaming platform.
///
/// Variant order is the default ranking priority: `YouTube` sorts before
/// `Twitch`, which is also the key order of `byPlatform` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[serde(rename = "youtube")]
    YouTube,
    Twitch,
}

impl Platform {
    /// All known platforms in default priority order.
    pub const ALL: [Platform; 2] = [Platform::YouTube, Platform::Twitch];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::YouTube => "youtube",
            Platform::Twitch => "twitch",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown platform: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "youtube" => Ok(Platform::YouTube),
            "twitch" => Ok(Platform::Twitch),
            _ => Err(UnknownPlatform(s.to_string())),
        }
    }
}

/// One live stream (or, in Twitch top-games mode, one category) in the
/// ranked gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveItem {
    /// `{platform}_{nativeId}`, unique within a snapshot.
    pub id: String,
    pub platform: Platform,
    /// Empty when the upstream omits it.
    pub title: String,
    /// Best available thumbnail; empty when none.
    pub thumbnail_url: String,
    /// Current viewers (Twitch) or total views (`YouTube`); 0 when unknown.
    pub viewers: u64,
    /// Canonical watch URL.
    pub url: String,
    /// Platform-specific passthrough fields, never interpreted here.
    #[serde(default)]
    pub raw: serde_json::Map<String, serde_json::Value>,
}

impl LiveItem {
    /// Composes the globally unique item id for a platform-native id.
    #[must_use]
    pub fn compose_id(platform: Platform, native_id: &str) -> String {
        format!("{}_{native_id}", platform.as_str())
    }
}

/// How `Snapshot::all` is ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Ranking {
    /// Concatenate per-platform lists in platform priority order, keeping
    /// each platform's upstream order.
    #[default]
    PlatformOrder,
    /// Stable sort of the concatenation by viewer count, highest first.
    Viewers,
}

impl FromStr for Ranking {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "platform-order" | "platform_order" | "concat" => Ok(Ranking::PlatformOrder),
            "viewers" => Ok(Ranking::Viewers),
            other => Err(format!(
                "expected \"platform-order\" or \"viewers\", got \"{other}\""
            )),
        }
    }
}

/// The persisted result of one refresh cycle.
///
/// Never mutated after construction; a refresh builds a new one and the
/// store replaces the old value wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub all: Vec<LiveItem>,
    pub by_platform: BTreeMap<Platform, Vec<LiveItem>>,
    pub updated_at: DateTime<Utc>,
}

impl Snapshot {
    /// A snapshot with no items and no platform keys.
    #[must_use]
    pub fn empty(updated_at: DateTime<Utc>) -> Self {
        Self {
            all: Vec::new(),
            by_platform: BTreeMap::new(),
            updated_at,
        }
    }

    /// Builds a snapshot from per-platform lists given in priority order.
    ///
    /// Every listed platform gets a `byPlatform` key, even when its list is
    /// empty. Items whose `platform` does not match their list are dropped,
    /// as is any item whose `id` was already seen earlier in priority order.
    #[must_use]
    pub fn assemble(
        lists: Vec<(Platform, Vec<LiveItem>)>,
        ranking: Ranking,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        let mut all = Vec::new();
        let mut by_platform = BTreeMap::new();

        for (platform, items) in lists {
            let kept: Vec<LiveItem> = items
                .into_iter()
                .filter(|item| item.platform == platform)
                .filter(|item| seen.insert(item.id.clone()))
                .collect();
            all.extend(kept.iter().cloned());
            by_platform
                .entry(platform)
                .or_insert_with(Vec::new)
                .extend(kept);
        }

        if ranking == Ranking::Viewers {
            all.sort_by(|a, b| b.viewers.cmp(&a.viewers));
        }

        Self {
            all,
            by_platform,
            updated_at,
        }
    }

    /// Items for one platform; empty when the platform is absent.
    #[must_use]
    pub fn platform_items(&self, platform: Platform) -> &[LiveItem] {
        self.by_platform
            .get(&platform)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(platform: Platform, native: &str, viewers: u64) -> LiveItem {
        LiveItem {
            id: LiveItem::compose_id(platform, native),
            platform,
            title: format!("stream {native}"),
            thumbnail_url: String::new(),
            viewers,
            url: format!("https://example.com/{native}"),
            raw: serde_json::Map::new(),
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn platform_parses_case_insensitively() {
        assert_eq!("YouTube".parse::<Platform>().unwrap(), Platform::YouTube);
        assert_eq!(" twitch ".parse::<Platform>().unwrap(), Platform::Twitch);
        assert!("nicovideo".parse::<Platform>().is_err());
    }

    #[test]
    fn compose_id_prefixes_platform() {
        assert_eq!(LiveItem::compose_id(Platform::YouTube, "abc"), "youtube_abc");
        assert_eq!(LiveItem::compose_id(Platform::Twitch, "42"), "twitch_42");
    }

    #[test]
    fn assemble_concatenates_in_priority_order() {
        let snapshot = Snapshot::assemble(
            vec![
                (Platform::Twitch, vec![item(Platform::Twitch, "t1", 900)]),
                (
                    Platform::YouTube,
                    vec![
                        item(Platform::YouTube, "y1", 5),
                        item(Platform::YouTube, "y2", 50),
                    ],
                ),
            ],
            Ranking::PlatformOrder,
            at(),
        );

        let ids: Vec<&str> = snapshot.all.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["twitch_t1", "youtube_y1", "youtube_y2"]);
        assert_eq!(snapshot.platform_items(Platform::YouTube).len(), 2);
    }

    #[test]
    fn assemble_keeps_empty_platform_keys() {
        let snapshot = Snapshot::assemble(
            vec![
                (Platform::YouTube, vec![]),
                (Platform::Twitch, vec![item(Platform::Twitch, "t1", 1)]),
            ],
            Ranking::PlatformOrder,
            at(),
        );
        assert!(snapshot.by_platform.contains_key(&Platform::YouTube));
        assert!(snapshot.platform_items(Platform::YouTube).is_empty());
        assert_eq!(snapshot.all.len(), 1);
    }

    #[test]
    fn assemble_drops_duplicate_ids_and_foreign_items() {
        let snapshot = Snapshot::assemble(
            vec![(
                Platform::YouTube,
                vec![
                    item(Platform::YouTube, "dup", 1),
                    item(Platform::YouTube, "dup", 2),
                    item(Platform::Twitch, "stray", 3),
                ],
            )],
            Ranking::PlatformOrder,
            at(),
        );
        assert_eq!(snapshot.all.len(), 1);
        assert_eq!(snapshot.all[0].viewers, 1);
        assert!(snapshot
            .platform_items(Platform::YouTube)
            .iter()
            .all(|i| i.platform == Platform::YouTube));
    }

    #[test]
    fn viewers_ranking_sorts_all_but_not_by_platform() {
        let snapshot = Snapshot::assemble(
            vec![
                (
                    Platform::YouTube,
                    vec![
                        item(Platform::YouTube, "y1", 10),
                        item(Platform::YouTube, "y2", 300),
                    ],
                ),
                (Platform::Twitch, vec![item(Platform::Twitch, "t1", 100)]),
            ],
            Ranking::Viewers,
            at(),
        );
        let viewers: Vec<u64> = snapshot.all.iter().map(|i| i.viewers).collect();
        assert_eq!(viewers, [300, 100, 10]);
        assert_eq!(snapshot.platform_items(Platform::YouTube)[0].id, "youtube_y1");
    }

    #[test]
    fn snapshot_wire_format_uses_camel_case_and_platform_keys() {
        let snapshot = Snapshot::assemble(
            vec![(Platform::YouTube, vec![item(Platform::YouTube, "abc", 7)])],
            Ranking::PlatformOrder,
            at(),
        );
        let json = serde_json::to_value(&snapshot).expect("serialize");
        assert!(json["byPlatform"]["youtube"].is_array());
        assert_eq!(json["all"][0]["thumbnailUrl"], "");
        assert_eq!(json["all"][0]["platform"], "youtube");
        assert_eq!(json["updatedAt"], "2025-03-01T12:00:00Z");

        let back: Snapshot = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, snapshot);
    }
}
