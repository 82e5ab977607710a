//! Persistence for the aggregated [`Snapshot`].
//!
//! The store holds one JSON document under a well-known key. Every write
//! replaces the whole document; there is no merge and no history.

pub mod backend;
pub mod error;
pub mod postgres;

use std::sync::Arc;

use livewall_core::{AppConfig, Snapshot, StoreBackend};

pub use backend::{MemoryBackend, SnapshotBackend};
pub use error::StoreError;
pub use postgres::{
    connect_pool, connect_pool_from_config, run_migrations, PgBackend, PoolConfig,
};

/// Typed access to the snapshot document under a single key.
#[derive(Clone)]
pub struct SnapshotStore {
    backend: Arc<dyn SnapshotBackend>,
    key: String,
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("backend", &self.backend.name())
            .field("key", &self.key)
            .finish()
    }
}

impl SnapshotStore {
    #[must_use]
    pub fn new(backend: Arc<dyn SnapshotBackend>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// In-memory store under `key`.
    #[must_use]
    pub fn in_memory(key: impl Into<String>) -> Self {
        Self::new(Arc::new(MemoryBackend::new()), key)
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Serializes and writes `snapshot`, replacing whatever was stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialize`] or [`StoreError::Persist`].
    pub async fn put(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let body = serde_json::to_string(snapshot).map_err(StoreError::Serialize)?;
        self.backend.put_raw(&self.key, &body).await?;
        tracing::debug!(
            key = %self.key,
            items = snapshot.all.len(),
            bytes = body.len(),
            "snapshot persisted"
        );
        Ok(())
    }

    /// Reads the current snapshot. `Ok(None)` when nothing has been stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the backend is unreachable and
    /// [`StoreError::Corrupt`] if the stored value does not parse.
    pub async fn get(&self) -> Result<Option<Snapshot>, StoreError> {
        let Some(body) = self.backend.get_raw(&self.key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                key: self.key.clone(),
                source,
            })
    }

    /// Writes an arbitrary string under the store key, bypassing
    /// serialization. Used to seed fixtures.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persist`] if the write fails.
    pub async fn put_raw(&self, body: &str) -> Result<(), StoreError> {
        self.backend.put_raw(&self.key, body).await
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the backend is unreachable.
    pub async fn health_check(&self) -> Result<(), StoreError> {
        self.backend.ping().await
    }
}

/// Builds the store selected by `LIVEWALL_STORE_BACKEND`, running pending
/// migrations when the backend is Postgres.
///
/// # Errors
///
/// Returns [`StoreError`] if the pool cannot connect or migrations fail.
pub async fn open_store(config: &AppConfig) -> Result<SnapshotStore, StoreError> {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("using in-memory snapshot store; data is lost on restart");
            Ok(SnapshotStore::in_memory(config.snapshot_key.clone()))
        }
        StoreBackend::Postgres => {
            let pool = connect_pool_from_config(config).await?;
            let applied = run_migrations(&pool).await?;
            tracing::info!(applied, "database migrations complete");
            Ok(SnapshotStore::new(
                Arc::new(PgBackend::new(pool)),
                config.snapshot_key.clone(),
            ))
        }
    }
}
