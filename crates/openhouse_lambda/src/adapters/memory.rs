use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use openhouse_core::batching::{BATCH_GET_MAX, BATCH_WRITE_MAX};
use openhouse_core::contract::KEY_ATTRIBUTE;
use serde_json::Value;

use super::document_store::{DocumentStore, Item, StoreError};

/// A store operation as observed by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Scan { table: String },
    Get { table: String, uuid: String },
    Put { table: String, uuid: String },
    Delete { table: String, uuid: String },
    BatchPut { table: String, count: usize },
    BatchDelete { table: String, uuids: Vec<String> },
    BatchGet { table: String, count: usize },
    Increment { table: String, uuid: String },
    Decrement { table: String, uuid: String },
}

impl StoreCall {
    pub fn table(&self) -> &str {
        match self {
            Self::Scan { table }
            | Self::Get { table, .. }
            | Self::Put { table, .. }
            | Self::Delete { table, .. }
            | Self::BatchPut { table, .. }
            | Self::BatchDelete { table, .. }
            | Self::BatchGet { table, .. }
            | Self::Increment { table, .. }
            | Self::Decrement { table, .. } => table,
        }
    }

    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Self::Put { .. }
                | Self::Delete { .. }
                | Self::BatchPut { .. }
                | Self::BatchDelete { .. }
                | Self::Increment { .. }
                | Self::Decrement { .. }
        )
    }
}

/// In-process [`DocumentStore`] that records every call, enforces the
/// DynamoDB batch limits and can be told to fail per table.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, BTreeMap<String, Item>>>,
    calls: Mutex<Vec<StoreCall>>,
    failures: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts raw items; values without a string `uuid` are ignored.
    pub fn seed(&self, table: &str, items: impl IntoIterator<Item = Value>) {
        let mut tables = lock(&self.tables);
        let rows = tables.entry(table.to_string()).or_default();
        for value in items {
            let Value::Object(item) = value else {
                continue;
            };
            if let Ok(uuid) = item_key(table, &item) {
                rows.insert(uuid, item);
            }
        }
    }

    pub fn items(&self, table: &str) -> Vec<Item> {
        lock(&self.tables)
            .get(table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn item(&self, table: &str, uuid: &str) -> Option<Item> {
        lock(&self.tables)
            .get(table)
            .and_then(|rows| rows.get(uuid).cloned())
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        lock(&self.calls).clone()
    }

    /// Makes every subsequent call against `table` fail with `message`.
    pub fn fail_table(&self, table: &str, message: &str) {
        lock(&self.failures).insert(table.to_string(), message.to_string());
    }

    fn record(&self, call: StoreCall) -> Result<(), StoreError> {
        let table = call.table().to_string();
        lock(&self.calls).push(call);
        match lock(&self.failures).get(&table) {
            Some(message) => Err(StoreError::Backend(message.clone())),
            None => Ok(()),
        }
    }

    fn check_batch(table: &str, count: usize, max: usize, operation: &str) -> Result<(), StoreError> {
        if count == 0 || count > max {
            return Err(StoreError::Backend(format!(
                "{operation} on {table} requires between 1 and {max} requests, got {count}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn scan(&self, table: &str) -> Result<Vec<Item>, StoreError> {
        self.record(StoreCall::Scan {
            table: table.to_string(),
        })?;
        Ok(self.items(table))
    }

    async fn get(&self, table: &str, uuid: &str) -> Result<Option<Item>, StoreError> {
        self.record(StoreCall::Get {
            table: table.to_string(),
            uuid: uuid.to_string(),
        })?;
        Ok(self.item(table, uuid))
    }

    async fn put(&self, table: &str, item: Item) -> Result<(), StoreError> {
        let uuid = item_key(table, &item)?;
        self.record(StoreCall::Put {
            table: table.to_string(),
            uuid: uuid.clone(),
        })?;
        lock(&self.tables)
            .entry(table.to_string())
            .or_default()
            .insert(uuid, item);
        Ok(())
    }

    async fn delete(&self, table: &str, uuid: &str) -> Result<(), StoreError> {
        self.record(StoreCall::Delete {
            table: table.to_string(),
            uuid: uuid.to_string(),
        })?;
        if let Some(rows) = lock(&self.tables).get_mut(table) {
            rows.remove(uuid);
        }
        Ok(())
    }

    async fn batch_put(&self, table: &str, items: Vec<Item>) -> Result<(), StoreError> {
        self.record(StoreCall::BatchPut {
            table: table.to_string(),
            count: items.len(),
        })?;
        Self::check_batch(table, items.len(), BATCH_WRITE_MAX, "BatchWriteItem")?;

        let keyed = items
            .into_iter()
            .map(|item| item_key(table, &item).map(|uuid| (uuid, item)))
            .collect::<Result<Vec<_>, _>>()?;
        lock(&self.tables)
            .entry(table.to_string())
            .or_default()
            .extend(keyed);
        Ok(())
    }

    async fn batch_delete(&self, table: &str, uuids: Vec<String>) -> Result<(), StoreError> {
        self.record(StoreCall::BatchDelete {
            table: table.to_string(),
            uuids: uuids.clone(),
        })?;
        Self::check_batch(table, uuids.len(), BATCH_WRITE_MAX, "BatchWriteItem")?;

        if let Some(rows) = lock(&self.tables).get_mut(table) {
            for uuid in &uuids {
                rows.remove(uuid);
            }
        }
        Ok(())
    }

    async fn batch_get(&self, table: &str, uuids: Vec<String>) -> Result<Vec<Item>, StoreError> {
        self.record(StoreCall::BatchGet {
            table: table.to_string(),
            count: uuids.len(),
        })?;
        Self::check_batch(table, uuids.len(), BATCH_GET_MAX, "BatchGetItem")?;

        let tables = lock(&self.tables);
        let Some(rows) = tables.get(table) else {
            return Ok(Vec::new());
        };
        Ok(uuids
            .iter()
            .filter_map(|uuid| rows.get(uuid).cloned())
            .collect())
    }

    async fn increment(&self, table: &str, uuid: &str, attribute: &str) -> Result<(), StoreError> {
        self.record(StoreCall::Increment {
            table: table.to_string(),
            uuid: uuid.to_string(),
        })?;

        let mut tables = lock(&self.tables);
        let current = tables
            .get_mut(table)
            .and_then(|rows| rows.get_mut(uuid))
            .and_then(|item| item.get_mut(attribute));
        match current {
            Some(value) => {
                let next = value.as_i64().unwrap_or_default() + 1;
                *value = Value::from(next);
                Ok(())
            }
            None => Err(StoreError::Backend(format!(
                "The provided expression refers to an attribute that does not exist in the item: {attribute}"
            ))),
        }
    }

    async fn decrement_above_zero(
        &self,
        table: &str,
        uuid: &str,
        attribute: &str,
    ) -> Result<(), StoreError> {
        self.record(StoreCall::Decrement {
            table: table.to_string(),
            uuid: uuid.to_string(),
        })?;

        let mut tables = lock(&self.tables);
        let current = tables
            .get_mut(table)
            .and_then(|rows| rows.get_mut(uuid))
            .and_then(|item| item.get_mut(attribute));
        match current {
            Some(value) if value.as_i64().is_some_and(|count| count > 0) => {
                let next = value.as_i64().unwrap_or_default() - 1;
                *value = Value::from(next);
                Ok(())
            }
            _ => Err(StoreError::ConditionFailed {
                table: table.to_string(),
            }),
        }
    }
}

fn item_key(table: &str, item: &Item) -> Result<String, StoreError> {
    item.get(KEY_ATTRIBUTE)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StoreError::Backend(format!("item for {table} is missing the key attribute")))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
