//! Entity facade for single-table key-value designs.
//!
//! An [`Entity`] ties a [`CompositeKeySchema`](tablekey_schema::CompositeKeySchema)
//! to an optional [`OpaqueIdCodec`](tablekey_codec::OpaqueIdCodec) and an
//! optional [`StorageEngine`]:
//! - `key` / `index_key` / `primary_key`: derive physical keys from a record
//! - `get_hash_id` / `parse_hash_id`: opaque ids for external callers
//! - `materialize` / `parse`: add or strip derived key attributes
//! - `get` / `put` / `update` / `delete` / `batch_get` / `transact_put`:
//!   derive keys, then delegate to the engine
//!
//! ```
//! use std::sync::Arc;
//! use tablekey_codec::OpaqueIdCodec;
//! use tablekey_entity::Entity;
//! use tablekey_schema::{Attribute, Item, KeyDerivation, SchemaBuilder};
//!
//! let schema = SchemaBuilder::with_non_key_attributes([
//!     Attribute::required("userId"),
//!     Attribute::required("orderId"),
//! ])?
//! .add_partition_key("PK", KeyDerivation::join(["userId"]))?
//! .add_sort_key("SK", KeyDerivation::join(["orderId"]))?
//! .build();
//!
//! let orders = Entity::new("Order", schema)
//!     .with_codec(Arc::new(OpaqueIdCodec::with_secret("s3cr3t-salt")?));
//!
//! let item = Item::new().with("userId", "u1").with("orderId", "o42");
//! let id = orders.get_hash_id(&item)?;
//! assert_eq!(orders.parse_hash_id(&id)?, orders.primary_key(&item)?);
//! # Ok::<(), tablekey_entity::Error>(())
//! ```

mod entity;
mod error;
mod key;
mod memory;
mod storage;

pub use entity::Entity;
pub use error::{Error, ErrorKind, Result};
pub use key::PrimaryKey;
pub use memory::MemoryEngine;
pub use storage::{StorageEngine, StorageError, StorageResult};
