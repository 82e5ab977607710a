use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::join_all;
use livewall_core::{AppConfig, LiveItem, Platform, Ranking, Snapshot};
use livewall_platforms::{normalize, FetchRequest, PlatformClient, PlatformError};
use livewall_store::SnapshotStore;
use serde::Serialize;
use tokio::sync::Mutex;

/// One platform that contributed nothing to a refresh, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformFailure {
    pub platform: Platform,
    pub message: String,
}

/// Result of one [`Aggregator::refresh`].
#[derive(Debug, Clone)]
pub struct RefreshReport {
    pub snapshot: Snapshot,
    pub failures: Vec<PlatformFailure>,
    /// Number of platform clients that were asked for data.
    pub attempted: usize,
    /// `false` when the store write failed; the snapshot is still returned.
    pub persisted: bool,
}

impl RefreshReport {
    /// `true` when at least one client ran and every one of them failed.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        self.attempted > 0 && self.failures.len() == self.attempted
    }

    #[must_use]
    pub fn no_platforms(&self) -> bool {
        self.attempted == 0
    }

    /// `"youtube: <reason>; twitch: <reason>"`.
    #[must_use]
    pub fn failure_summary(&self) -> String {
        self.failures
            .iter()
            .map(|f| format!("{}: {}", f.platform, f.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Runs the platform clients, merges their results into a [`Snapshot`], and
/// persists it.
pub struct Aggregator {
    /// In platform priority order.
    clients: Vec<Arc<dyn PlatformClient>>,
    store: SnapshotStore,
    ranking: Ranking,
    platform_timeout: Duration,
    refresh_lock: Mutex<()>,
}

impl Aggregator {
    #[must_use]
    pub fn new(
        clients: Vec<Arc<dyn PlatformClient>>,
        store: SnapshotStore,
        ranking: Ranking,
        platform_timeout: Duration,
    ) -> Self {
        Self {
            clients,
            store,
            ranking,
            platform_timeout,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Builds the configured clients and wires them to `store`.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] if a client cannot be constructed.
    pub fn from_config(config: &AppConfig, store: SnapshotStore) -> Result<Self, PlatformError> {
        let clients = crate::build_clients(config)?;
        Ok(Self::new(
            clients,
            store,
            config.ranking,
            Duration::from_secs(config.platform_timeout_secs),
        ))
    }

    #[must_use]
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Platforms this aggregator queries, in priority order.
    #[must_use]
    pub fn platforms(&self) -> Vec<Platform> {
        self.clients.iter().map(|c| c.platform()).collect()
    }

    /// Fetches every platform concurrently, merges, persists, and returns.
    ///
    /// With no clients configured nothing is fetched or persisted, and the
    /// stored snapshot is left as it was.
    ///
    /// Never fails as a whole: a platform that errors or exceeds the
    /// per-platform deadline contributes an empty list and a
    /// [`PlatformFailure`]. A failed store write is logged and reported via
    /// [`RefreshReport::persisted`].
    ///
    /// Concurrent calls are serialized, so two refreshes never interleave
    /// their store writes.
    pub async fn refresh(&self, query: &str, limit: u32) -> RefreshReport {
        let _guard = self.refresh_lock.lock().await;

        // Nothing was queried, so there is no result to replace the stored one with.
        if self.clients.is_empty() {
            tracing::warn!("refresh skipped: no platform clients configured");
            return RefreshReport {
                snapshot: Snapshot::empty(Utc::now()),
                failures: Vec::new(),
                attempted: 0,
                persisted: false,
            };
        }

        let started = Instant::now();
        let request = FetchRequest::new(query, limit);

        // join_all yields results in input order, so `lists` follows client
        // priority no matter which platform answers first.
        let outcomes = join_all(
            self.clients
                .iter()
                .map(|client| self.fetch_one(client.as_ref(), &request)),
        )
        .await;

        let mut lists: Vec<(Platform, Vec<LiveItem>)> = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (platform, outcome) in outcomes {
            match outcome {
                Ok(items) => {
                    tracing::debug!(
                        platform = %platform,
                        count = items.len(),
                        "platform fetch succeeded"
                    );
                    lists.push((platform, items));
                }
                Err(e) => {
                    tracing::warn!(platform = %platform, error = %e, "platform fetch failed");
                    failures.push(PlatformFailure {
                        platform,
                        message: e.to_string(),
                    });
                    lists.push((platform, Vec::new()));
                }
            }
        }

        let snapshot = Snapshot::assemble(lists, self.ranking, Utc::now());

        let persisted = match self.store.put(&snapshot).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(key = self.store.key(), error = %e, "failed to persist snapshot");
                false
            }
        };

        tracing::info!(
            total = snapshot.all.len(),
            failed = failures.len(),
            attempted = self.clients.len(),
            persisted,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "refresh complete"
        );

        RefreshReport {
            snapshot,
            failures,
            attempted: self.clients.len(),
            persisted,
        }
    }

    async fn fetch_one(
        &self,
        client: &dyn PlatformClient,
        request: &FetchRequest,
    ) -> (Platform, Result<Vec<LiveItem>, PlatformError>) {
        let platform = client.platform();
        let outcome = match tokio::time::timeout(self.platform_timeout, client.fetch_live(request))
            .await
        {
            Ok(Ok(raw)) => Ok(raw.into_iter().map(normalize).collect()),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(PlatformError::Timeout {
                platform,
                secs: self.platform_timeout.as_secs(),
            }),
        };
        (platform, outcome)
    }
}
