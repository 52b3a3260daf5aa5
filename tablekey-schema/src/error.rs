//! Error types for schema construction and key derivation.

use thiserror::Error;

/// Result type for schema construction.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for key derivation.
pub type KeyResult<T> = Result<T, KeyError>;

/// Errors raised while building a [`CompositeKeySchema`](crate::CompositeKeySchema)
/// or validating an item against its attributes.
///
/// All of these are configuration mistakes: they are deterministic and never
/// worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A key derivation depends on an attribute that is not declared.
    #[error("key `{key}` depends on unknown attribute `{attribute}`")]
    UnknownDependency { key: String, attribute: String },

    /// A key derivation depends on an attribute that may be absent.
    #[error("key `{key}` depends on `{attribute}`, which is neither required nor defaulted")]
    OptionalDependency { key: String, attribute: String },

    /// A key derivation lists the same attribute twice.
    #[error("key `{key}` lists dependency `{attribute}` more than once")]
    DuplicateDependency { key: String, attribute: String },

    /// Two attributes (key or non-key) share a name.
    #[error("duplicate attribute name `{0}`")]
    DuplicateAttribute(String),

    /// A second partition key was declared.
    #[error("partition key already defined as `{existing}`, cannot add `{name}`")]
    DuplicatePartitionKey { existing: String, name: String },

    /// A second sort key was declared.
    #[error("sort key already defined as `{existing}`, cannot add `{name}`")]
    DuplicateSortKey { existing: String, name: String },

    /// A sort key was declared before any partition key.
    #[error("sort key `{0}` declared before a partition key")]
    SortKeyBeforePartitionKey(String),

    /// Index keys were declared before any partition key.
    #[error("index key `{0}` declared before a partition key")]
    IndexKeysBeforePartitionKey(String),

    /// A sort key was declared after index keys were registered.
    #[error("sort key `{0}` declared after index keys")]
    SortKeyAfterIndexKeys(String),

    /// The schema definition has no partition key at all.
    #[error("schema defines no partition key")]
    MissingPartitionKey,

    /// A secondary index refers to an attribute the schema does not have.
    #[error("index `{index}` refers to unknown attribute `{attribute}`")]
    UnknownIndexAttribute { index: String, attribute: String },

    /// An item lacks a required attribute.
    #[error("missing required attribute `{0}`")]
    MissingRequired(String),
}

/// Errors raised while deriving a key value from an item.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The item has no value for a declared dependency.
    #[error("key `{key}` is missing a value for dependency `{attribute}`")]
    DependencyMissing { key: String, attribute: String },

    /// The derivation read an attribute it did not declare.
    #[error("key `{key}` read undeclared attribute `{attribute}`")]
    UndeclaredDependency { key: String, attribute: String },

    /// The dependency value cannot be rendered into a key part.
    #[error("attribute `{attribute}` of key `{key}` is a {found}, which cannot be used as a key part")]
    UnrenderableValue {
        key: String,
        attribute: String,
        found: &'static str,
    },

    /// No derivation is registered for the requested key.
    #[error("no key registered for {0}")]
    NoSuchKey(String),
}
