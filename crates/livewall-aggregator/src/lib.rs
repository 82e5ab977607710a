//! Refresh orchestration and the snapshot read path.
//!
//! [`Aggregator::refresh`] fans out to every platform client, tolerates
//! individual failures, and persists the merged [`livewall_core::Snapshot`].
//! [`read_snapshot`] serves the stored snapshot without touching upstreams.

mod clients;
mod read;
mod refresh;

pub use clients::build_clients;
pub use read::{read_snapshot, ReadOutcome, INVALID_JSON, NO_DATA, STORE_UNAVAILABLE};
pub use refresh::{Aggregator, PlatformFailure, RefreshReport};
