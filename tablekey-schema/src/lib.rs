//! Composite key schemas for single-table key-value stores.
//!
//! An entity stores its records under a partition key, an optional sort key
//! and any number of secondary-index keys, each synthesized by joining other
//! attribute values with `#`. This crate describes those keys as data:
//! - [`Attribute`] / [`AttributeSchema`]: the non-key attributes and which of
//!   them are always present
//! - [`KeyDerivation`]: a dependency list plus a function returning key parts
//! - [`SchemaBuilder`]: staged construction: attributes, partition key,
//!   sort key, index keys, in that order
//! - [`CompositeKeySchema`]: the immutable, shareable result
//! - [`Gsi`]: secondary index descriptors used when querying
//! - [`SchemaDefinition`]: the same schema described in TOML or JSON
//!
//! Nothing here performs I/O.

mod attribute;
mod builder;
mod definition;
mod derivation;
mod error;
mod gsi;
mod schema;

pub use attribute::{Attribute, AttributeSchema, Item};
pub use builder::{SchemaBuilder, WithIndexKeys, WithPartitionKey, WithSortKey};
pub use definition::{KeyDefinition, KeyPart, RoleDefinition, SchemaDefinition};
pub use derivation::{render_part, DeriveFn, KeyDerivation, KeyInput, SEPARATOR};
pub use error::{KeyError, KeyResult, SchemaError, SchemaResult};
pub use gsi::Gsi;
pub use schema::{CompositeKeySchema, DerivedKeyAttribute, KeyRole};
