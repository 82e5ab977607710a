use livewall_core::Snapshot;
use livewall_store::{SnapshotStore, StoreError};

pub const NO_DATA: &str = "No data in store";
pub const INVALID_JSON: &str = "Invalid JSON in store";
pub const STORE_UNAVAILABLE: &str = "Snapshot store unavailable";

/// What a read of the stored snapshot produced. Every non-`Found` case maps
/// to an empty result with a diagnostic string; none of them is an error
/// for the caller to propagate.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    Found(Snapshot),
    Empty,
    Corrupt(String),
    Unavailable(String),
}

impl ReadOutcome {
    /// The message shown to consumers for a non-`Found` outcome.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&'static str> {
        match self {
            ReadOutcome::Found(_) => None,
            ReadOutcome::Empty => Some(NO_DATA),
            ReadOutcome::Corrupt(_) => Some(INVALID_JSON),
            ReadOutcome::Unavailable(_) => Some(STORE_UNAVAILABLE),
        }
    }
}

/// Reads the current snapshot without performing any upstream calls.
pub async fn read_snapshot(store: &SnapshotStore) -> ReadOutcome {
    match store.get().await {
        Ok(Some(snapshot)) => ReadOutcome::Found(snapshot),
        Ok(None) => ReadOutcome::Empty,
        Err(e @ StoreError::Corrupt { .. }) => {
            tracing::error!(key = store.key(), error = %e, "stored snapshot is corrupt");
            ReadOutcome::Corrupt(e.to_string())
        }
        Err(e) => {
            tracing::error!(key = store.key(), error = %e, "snapshot store read failed");
            ReadOutcome::Unavailable(e.to_string())
        }
    }
}
