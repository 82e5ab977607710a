//! Key-value backends the snapshot store writes through.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::StoreError;

/// A string-keyed document store holding serialized snapshots.
///
/// `put_raw` must replace the value atomically: a concurrent `get_raw`
/// observes either the previous document or the new one, never a mix.
#[async_trait]
pub trait SnapshotBackend: Send + Sync {
    /// # Errors
    ///
    /// Returns [`StoreError::Persist`] if the write fails.
    async fn put_raw(&self, key: &str, body: &str) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the store cannot be queried.
    async fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Verifies the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if it is not.
    async fn ping(&self) -> Result<(), StoreError>;

    fn name(&self) -> &'static str;
}

/// Process-local backend. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotBackend for MemoryBackend {
    async fn put_raw(&self, key: &str, body: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), body.to_string());
        Ok(())
    }

    async fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
