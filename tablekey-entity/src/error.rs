//! Unified error type for entity operations.

use crate::storage::StorageError;
use tablekey_codec::CodecError;
use tablekey_schema::{KeyError, SchemaError};
use thiserror::Error;

/// Result type for entity operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`]. None of these are transient; the
/// caller decides what to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The schema, codec or entity is set up wrongly.
    Configuration,
    /// An opaque id is malformed or foreign.
    Decode,
    /// The input record lacks a value a key or required attribute needs.
    DependencyMissing,
    /// The storage engine failed.
    Storage,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The entity was used for storage without an engine.
    #[error("entity `{0}` has no storage engine")]
    NoEngine(String),

    /// An update tried to set a derived key attribute directly.
    #[error("cannot update derived key attribute `{0}`")]
    KeyAttributeUpdate(String),

    /// An update touched an attribute the primary key is derived from.
    #[error("cannot update `{attribute}`: primary key `{key}` is derived from it")]
    KeyDependencyUpdate { key: String, attribute: String },

    /// A decoded tuple does not fit the entity's partition/sort shape.
    #[error("opaque id does not fit entity `{entity}`: {reason}")]
    KeyShape { entity: String, reason: String },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Schema(SchemaError::MissingRequired(_)) => ErrorKind::DependencyMissing,
            Self::Schema(_) => ErrorKind::Configuration,
            Self::Key(KeyError::DependencyMissing { .. } | KeyError::UnrenderableValue { .. }) => {
                ErrorKind::DependencyMissing
            }
            Self::Key(_) => ErrorKind::Configuration,
            Self::Codec(e) if e.is_configuration() => ErrorKind::Configuration,
            Self::Codec(_) | Self::KeyShape { .. } => ErrorKind::Decode,
            Self::Storage(_) => ErrorKind::Storage,
            Self::NoEngine(_) | Self::KeyAttributeUpdate(_) | Self::KeyDependencyUpdate { .. } => {
                ErrorKind::Configuration
            }
        }
    }
}
