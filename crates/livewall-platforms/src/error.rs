use livewall_core::Platform;
use thiserror::Error;

/// Errors returned by the platform clients.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The platform API answered with a non-success HTTP status.
    #[error("{platform} upstream returned HTTP {status}: {body}")]
    Upstream {
        platform: Platform,
        status: u16,
        body: String,
    },

    /// The credential exchange was rejected.
    #[error("{platform} auth failed with HTTP {status}: {body}")]
    Auth {
        platform: Platform,
        status: u16,
        body: String,
    },

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The platform did not answer within the per-client deadline.
    #[error("{platform} did not respond within {secs}s")]
    Timeout { platform: Platform, secs: u64 },
}

impl PlatformError {
    /// Returns `true` for errors worth retrying after a back-off delay:
    /// connect/timeout failures, HTTP 429, and HTTP 5xx.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            PlatformError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            PlatformError::Upstream { status, .. } => *status == 429 || *status >= 500,
            PlatformError::Auth { .. }
            | PlatformError::Deserialize { .. }
            | PlatformError::InvalidBaseUrl { .. }
            | PlatformError::Timeout { .. } => false,
        }
    }
}
