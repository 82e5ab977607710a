use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,

    /// Writing the snapshot under `key` failed.
    #[error("failed to persist snapshot under \"{key}\": {source}")]
    Persist {
        key: String,
        #[source]
        source: sqlx::Error,
    },

    /// The store could not be reached or queried.
    #[error("failed to read snapshot \"{key}\": {source}")]
    Read {
        key: String,
        #[source]
        source: sqlx::Error,
    },

    /// A value exists under `key` but is not a valid snapshot document.
    #[error("stored snapshot \"{key}\" is not valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Connect(#[from] sqlx::Error),
}
