use futures::future::try_join_all;
use openhouse_core::batching::{plan_for, BatchOperation, ChunkAssignment};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::document_store::{DocumentStore, Item, StoreError};

/// Typed view of a single table on top of a [`DocumentStore`].
pub struct Table<'a, S: ?Sized> {
    store: &'a S,
    name: &'a str,
}

impl<'a, S: DocumentStore + ?Sized> Table<'a, S> {
    pub fn new(store: &'a S, name: &'a str) -> Self {
        Self { store, name }
    }

    pub async fn scan<T: DeserializeOwned>(&self) -> Result<Vec<T>, StoreError> {
        let items = self.store.scan(self.name).await?;
        items.into_iter().map(|item| self.decode(item)).collect()
    }

    /// Point read used for foreign-key checks.
    pub async fn exists(&self, uuid: &str) -> Result<bool, StoreError> {
        Ok(self.store.get(self.name, uuid).await?.is_some())
    }

    pub async fn put<T: Serialize>(&self, record: &T) -> Result<(), StoreError> {
        let item = self.encode(record)?;
        self.store.put(self.name, item).await
    }

    pub async fn delete(&self, uuid: &str) -> Result<(), StoreError> {
        self.store.delete(self.name, uuid).await
    }

    /// Writes every record with one batch call per chunk of 25, all chunks
    /// in flight at once.
    pub async fn put_all<T: Serialize>(&self, records: &[T]) -> Result<(), StoreError> {
        let items = records
            .iter()
            .map(|record| self.encode(record))
            .collect::<Result<Vec<_>, _>>()?;
        let plan = self.plan(BatchOperation::Write, items.len())?;

        try_join_all(
            plan.iter()
                .map(|chunk| self.store.batch_put(self.name, slice(&items, chunk).to_vec())),
        )
        .await?;
        Ok(())
    }

    pub async fn delete_all(&self, uuids: &[String]) -> Result<(), StoreError> {
        let plan = self.plan(BatchOperation::Write, uuids.len())?;

        try_join_all(
            plan.iter()
                .map(|chunk| self.store.batch_delete(self.name, slice(uuids, chunk).to_vec())),
        )
        .await?;
        Ok(())
    }

    /// Reads records by key with one batch call per chunk of 100. Missing
    /// keys are absent from the result; order is not preserved.
    pub async fn get_all<T: DeserializeOwned>(&self, uuids: &[String]) -> Result<Vec<T>, StoreError> {
        let plan = self.plan(BatchOperation::Get, uuids.len())?;

        let chunks = try_join_all(
            plan.iter()
                .map(|chunk| self.store.batch_get(self.name, slice(uuids, chunk).to_vec())),
        )
        .await?;

        chunks
            .into_iter()
            .flatten()
            .map(|item| self.decode(item))
            .collect()
    }

    fn plan(
        &self,
        operation: BatchOperation,
        total_items: usize,
    ) -> Result<Vec<ChunkAssignment>, StoreError> {
        plan_for(operation, total_items).map_err(|error| StoreError::Backend(error.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, item: Item) -> Result<T, StoreError> {
        serde_json::from_value(Value::Object(item)).map_err(|error| StoreError::Decode {
            table: self.name.to_string(),
            message: error.to_string(),
        })
    }

    fn encode<T: Serialize>(&self, record: &T) -> Result<Item, StoreError> {
        match serde_json::to_value(record) {
            Ok(Value::Object(item)) => Ok(item),
            Ok(other) => Err(StoreError::Encode {
                table: self.name.to_string(),
                message: format!("expected an object, got {other}"),
            }),
            Err(error) => Err(StoreError::Encode {
                table: self.name.to_string(),
                message: error.to_string(),
            }),
        }
    }
}

fn slice<'a, T>(items: &'a [T], chunk: &ChunkAssignment) -> &'a [T] {
    &items[chunk.start_index..chunk.end_index_exclusive]
}
