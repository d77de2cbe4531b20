use async_trait::async_trait;
use openhouse_core::contract::EntityKind;

use super::error::HandlerError;
use crate::adapters::document_store::StoreError;

/// Point-read existence checks shared by every entity handler.
#[async_trait]
pub trait RecordLookup: Send + Sync {
    async fn record_exists(&self, kind: EntityKind, uuid: &str) -> Result<bool, StoreError>;
}

/// 404 unless the record being updated exists.
pub async fn ensure_found<S: RecordLookup + ?Sized>(
    store: &S,
    kind: EntityKind,
    uuid: &str,
) -> Result<(), HandlerError> {
    if store.record_exists(kind, uuid).await? {
        Ok(())
    } else {
        Err(HandlerError::NotFound(kind.not_found_message()))
    }
}

/// 400 unless the referenced record exists.
pub async fn ensure_referenced<S: RecordLookup + ?Sized>(
    store: &S,
    kind: EntityKind,
    uuid: &str,
) -> Result<(), HandlerError> {
    if store.record_exists(kind, uuid).await? {
        Ok(())
    } else {
        Err(HandlerError::missing_reference(kind))
    }
}
