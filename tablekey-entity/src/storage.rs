//! The storage engine seam.
//!
//! The entity layer derives keys and hands them to a [`StorageEngine`]; it
//! never performs I/O itself. Engines receive fully materialized items
//! (derived key attributes included) and primary keys as attribute maps.

use crate::key::PrimaryKey;
use tablekey_schema::Item;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Errors reported by a storage engine.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The engine's backend failed.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A transactional write was rejected as a whole.
    #[error("transaction rejected: {0}")]
    TransactionRejected(String),

    /// Invalid data.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

/// A single-table key-value store.
///
/// Implementations own retries, timeouts and wire formats. `table` is the
/// physical table the entity lives in.
pub trait StorageEngine: Send + Sync {
    /// Fetches the item stored under `key`.
    fn get(&self, table: &str, key: &PrimaryKey) -> StorageResult<Option<Item>>;

    /// Writes `item` (which carries its own key attributes), replacing any
    /// item with the same key.
    fn put(&self, table: &str, key: &PrimaryKey, item: Item) -> StorageResult<()>;

    /// Merges `changes` into the item under `key`, creating it if absent.
    /// Returns the item as stored afterwards.
    fn update(&self, table: &str, key: &PrimaryKey, changes: Item) -> StorageResult<Item>;

    /// Removes the item under `key`. Removing an absent item is not an error.
    fn delete(&self, table: &str, key: &PrimaryKey) -> StorageResult<()>;

    /// Fetches several items; absent keys are skipped.
    fn batch_get(&self, table: &str, keys: &[PrimaryKey]) -> StorageResult<Vec<Item>>;

    /// Writes every item or none of them.
    fn transact_put(&self, table: &str, items: Vec<(PrimaryKey, Item)>) -> StorageResult<()>;
}
