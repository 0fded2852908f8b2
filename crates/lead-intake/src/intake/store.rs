use async_trait::async_trait;

/// A single row as written to the backend: column name to JSON value.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Row-insert contract of the backend data store.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn insert(&self, table: &str, row: Row) -> Result<(), StoreError>;
}

/// Remote insert failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store rejected insert into {table} (status {status}): {detail}")]
    Rejected {
        table: String,
        status: u16,
        detail: String,
    },
    #[error("store transport failed: {0}")]
    Transport(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
