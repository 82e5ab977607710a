//! Upstream platform clients and the normalizer that maps their raw items
//! into [`livewall_core::LiveItem`].
//!
//! Each client owns its platform's auth flow and request protocol and
//! exposes a single operation through [`PlatformClient::fetch_live`].

pub mod client;
pub mod error;
pub mod normalize;
pub mod twitch;
pub mod types;
pub mod youtube;

mod retry;

pub use client::{FetchRequest, HttpSettings, PlatformClient};
pub use error::PlatformError;
pub use normalize::{normalize, RawItem};
pub use twitch::{TwitchClient, TwitchConfig};
pub use youtube::{YouTubeClient, YouTubeConfig};
