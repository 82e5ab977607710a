use std::sync::Arc;

use livewall_core::{AppConfig, Platform};
use livewall_platforms::{
    HttpSettings, PlatformClient, PlatformError, TwitchClient, TwitchConfig, YouTubeClient,
    YouTubeConfig,
};

/// Builds one client per configured platform, in `LIVEWALL_PLATFORMS` order.
///
/// A platform without credentials is skipped with a warning rather than
/// failing startup; the remaining platforms still serve.
///
/// # Errors
///
/// Returns [`PlatformError`] if a client with credentials cannot be built.
pub fn build_clients(config: &AppConfig) -> Result<Vec<Arc<dyn PlatformClient>>, PlatformError> {
    let http = HttpSettings::from_app_config(config);
    let mut clients: Vec<Arc<dyn PlatformClient>> = Vec::with_capacity(config.platforms.len());

    for platform in &config.platforms {
        match platform {
            Platform::YouTube => match YouTubeConfig::from_app_config(config) {
                Some(yt) => clients.push(Arc::new(YouTubeClient::new(yt, &http)?)),
                None => tracing::warn!(
                    platform = %platform,
                    "YOUTUBE_API_KEY not set; platform disabled"
                ),
            },
            Platform::Twitch => match TwitchConfig::from_app_config(config) {
                Some(tw) => {
                    tracing::info!(mode = ?tw.mode, "twitch client enabled");
                    clients.push(Arc::new(TwitchClient::new(tw, &http)?));
                }
                None => tracing::warn!(
                    platform = %platform,
                    "TWITCH_CLIENT_ID/TWITCH_CLIENT_SECRET not set; platform disabled"
                ),
            },
        }
    }

    if clients.is_empty() {
        tracing::warn!("no platform clients configured; refreshes will produce empty snapshots");
    }
    Ok(clients)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .chain([("LIVEWALL_STORE_BACKEND".to_string(), "memory".to_string())])
            .collect();
        livewall_core::build_app_config(|key| {
            map.get(key).cloned().ok_or(std::env::VarError::NotPresent)
        })
        .expect("valid test config")
    }

    #[test]
    fn platforms_without_credentials_are_skipped() {
        let clients = build_clients(&config(&[("YOUTUBE_API_KEY", "k")])).unwrap();
        let platforms: Vec<_> = clients.iter().map(|c| c.platform()).collect();
        assert_eq!(platforms, vec![Platform::YouTube]);
    }

    #[test]
    fn client_order_follows_configured_priority() {
        let clients = build_clients(&config(&[
            ("LIVEWALL_PLATFORMS", "twitch,youtube"),
            ("YOUTUBE_API_KEY", "k"),
            ("TWITCH_CLIENT_ID", "id"),
            ("TWITCH_CLIENT_SECRET", "secret"),
        ]))
        .unwrap();
        let platforms: Vec<_> = clients.iter().map(|c| c.platform()).collect();
        assert_eq!(platforms, vec![Platform::Twitch, Platform::YouTube]);
    }

    #[test]
    fn twitch_needs_both_id_and_secret() {
        let clients = build_clients(&config(&[("TWITCH_CLIENT_ID", "id")])).unwrap();
        assert!(clients.is_empty());
    }

    #[test]
    fn unlisted_platform_is_not_built_even_with_credentials() {
        let clients = build_clients(&config(&[
            ("LIVEWALL_PLATFORMS", "twitch"),
            ("YOUTUBE_API_KEY", "k"),
        ]))
        .unwrap();
        assert!(clients.is_empty());
    }
}
