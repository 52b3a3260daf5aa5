//! In-process storage engine for tests and local tooling.

use crate::key::PrimaryKey;
use crate::storage::{StorageEngine, StorageError, StorageResult};
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tablekey_schema::Item;
use tracing::debug;

type Table = BTreeMap<PrimaryKey, Item>;

/// Keeps every table in memory, ordered by primary key.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items stored in `table`.
    pub fn len(&self, table: &str) -> StorageResult<usize> {
        Ok(self.read()?.get(table).map_or(0, BTreeMap::len))
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, HashMap<String, Table>>> {
        self.tables
            .read()
            .map_err(|_| StorageError::Backend("memory engine lock poisoned".into()))
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, HashMap<String, Table>>> {
        self.tables
            .write()
            .map_err(|_| StorageError::Backend("memory engine lock poisoned".into()))
    }
}

fn check_key_attributes(key: &PrimaryKey, item: &Item) -> StorageResult<()> {
    for (name, value) in key.attributes() {
        if item.get_str(name) != Some(value) {
            return Err(StorageError::InvalidData(format!(
                "item attribute `{name}` does not match its key"
            )));
        }
    }
    Ok(())
}

impl StorageEngine for MemoryEngine {
    fn get(&self, table: &str, key: &PrimaryKey) -> StorageResult<Option<Item>> {
        Ok(self.read()?.get(table).and_then(|t| t.get(key)).cloned())
    }

    fn put(&self, table: &str, key: &PrimaryKey, item: Item) -> StorageResult<()> {
        check_key_attributes(key, &item)?;
        self.write()?
            .entry(table.to_string())
            .or_default()
            .insert(key.clone(), item);
        debug!(table, "Stored item");
        Ok(())
    }

    fn update(&self, table: &str, key: &PrimaryKey, changes: Item) -> StorageResult<Item> {
        for (name, value) in key.attributes() {
            if changes.get(name).is_some_and(|v| v.as_str() != Some(value)) {
                return Err(StorageError::InvalidData(format!(
                    "update may not change key attribute `{name}`"
                )));
            }
        }
        let mut tables = self.write()?;
        let stored = tables
            .entry(table.to_string())
            .or_default()
            .entry(key.clone())
            .or_insert_with(|| key.to_item());
        for (name, value) in changes.into_map() {
            stored.set(&name, value);
        }
        Ok(stored.clone())
    }

    fn delete(&self, table: &str, key: &PrimaryKey) -> StorageResult<()> {
        if let Some(t) = self.write()?.get_mut(table) {
            t.remove(key);
        }
        Ok(())
    }

    fn batch_get(&self, table: &str, keys: &[PrimaryKey]) -> StorageResult<Vec<Item>> {
        let tables = self.read()?;
        let Some(t) = tables.get(table) else {
            return Ok(Vec::new());
        };
        Ok(keys.iter().filter_map(|k| t.get(k).cloned()).collect())
    }

    fn transact_put(&self, table: &str, items: Vec<(PrimaryKey, Item)>) -> StorageResult<()> {
        for (i, (key, item)) in items.iter().enumerate() {
            check_key_attributes(key, item)
                .map_err(|e| StorageError::TransactionRejected(format!("item {i}: {e}")))?;
            if items[..i].iter().any(|(k, _)| k == key) {
                return Err(StorageError::TransactionRejected(format!(
                    "item {i} repeats an earlier key"
                )));
            }
        }
        let mut tables = self.write()?;
        let t = tables.entry(table.to_string()).or_default();
        let count = items.len();
        for (key, item) in items {
            t.insert(key, item);
        }
        debug!(table, count, "Committed transactional put");
        Ok(())
    }
}
