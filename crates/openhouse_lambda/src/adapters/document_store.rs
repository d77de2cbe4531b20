use async_trait::async_trait;
use serde_json::{Map, Value};

/// A stored document: top-level attribute names mapped to JSON values.
pub type Item = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Backend(String),
    #[error("The conditional request failed on table {table}")]
    ConditionFailed { table: String },
    #[error("failed to decode item from {table}: {message}")]
    Decode { table: String, message: String },
    #[error("failed to encode item for {table}: {message}")]
    Encode { table: String, message: String },
    #[error("{count} request(s) left unprocessed by {table}")]
    Unprocessed { table: String, count: usize },
}

/// Key/value document storage keyed by the `uuid` attribute.
///
/// Batch methods accept a single chunk; callers split larger inputs with
/// `openhouse_core::batching` first.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn scan(&self, table: &str) -> Result<Vec<Item>, StoreError>;

    async fn get(&self, table: &str, uuid: &str) -> Result<Option<Item>, StoreError>;

    async fn put(&self, table: &str, item: Item) -> Result<(), StoreError>;

    async fn delete(&self, table: &str, uuid: &str) -> Result<(), StoreError>;

    async fn batch_put(&self, table: &str, items: Vec<Item>) -> Result<(), StoreError>;

    async fn batch_delete(&self, table: &str, uuids: Vec<String>) -> Result<(), StoreError>;

    async fn batch_get(&self, table: &str, uuids: Vec<String>) -> Result<Vec<Item>, StoreError>;

    async fn increment(&self, table: &str, uuid: &str, attribute: &str) -> Result<(), StoreError>;

    /// Decrements `attribute` only while it is above zero, failing with
    /// [`StoreError::ConditionFailed`] otherwise.
    async fn decrement_above_zero(
        &self,
        table: &str,
        uuid: &str,
        attribute: &str,
    ) -> Result<(), StoreError>;
}
