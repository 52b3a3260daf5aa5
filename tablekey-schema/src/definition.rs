//! Declarative schema definitions, loadable from TOML or JSON.
//!
//! ```toml
//! attributes = [
//!     { name = "userId", required = true },
//!     { name = "status", default = "active" },
//! ]
//!
//! [[keys]]
//! name = "PK"
//! role = "partition"
//! parts = [{ literal = "USER" }, { attribute = "userId" }]
//! ```
//!
//! Unlike the staged builder, a definition can list keys in any order, so
//! ordering mistakes are reported as [`SchemaError`]s by [`SchemaDefinition::compile`].

use crate::attribute::{Attribute, AttributeSchema};
use crate::builder::SchemaBuilder;
use crate::derivation::KeyDerivation;
use crate::error::{SchemaError, SchemaResult};
use crate::gsi::Gsi;
use crate::schema::CompositeKeySchema;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A complete entity schema described as data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub keys: Vec<KeyDefinition>,
    #[serde(default)]
    pub indexes: Vec<Gsi>,
}

/// One derived key attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyDefinition {
    pub name: String,
    pub role: RoleDefinition,
    #[serde(default)]
    pub parts: Vec<KeyPart>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleDefinition {
    Partition,
    Sort,
    Index,
}

/// A single part of a templated key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPart {
    /// Emitted verbatim.
    Literal(String),
    /// The rendered value of a non-key attribute.
    Attribute(String),
}

impl KeyDefinition {
    /// Builds the derivation for this key's parts. Attribute parts become the
    /// dependency list, in order.
    pub fn derivation(&self) -> KeyDerivation {
        let dependencies: Vec<String> = self
            .parts
            .iter()
            .filter_map(|p| match p {
                KeyPart::Attribute(name) => Some(name.clone()),
                KeyPart::Literal(_) => None,
            })
            .collect();
        let parts = self.parts.clone();
        KeyDerivation::new(dependencies, move |input| {
            parts
                .iter()
                .map(|p| match p {
                    KeyPart::Literal(text) => Ok(text.clone()),
                    KeyPart::Attribute(name) => input.part(name),
                })
                .collect()
        })
    }
}

impl SchemaDefinition {
    /// Parses a definition from JSON text.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Validates key ordering and dependencies, then builds the schema.
    pub fn compile(&self) -> SchemaResult<CompositeKeySchema> {
        let mut partition: Option<&KeyDefinition> = None;
        let mut sort: Option<&KeyDefinition> = None;
        let mut indexes: Vec<&KeyDefinition> = Vec::new();

        for key in &self.keys {
            match key.role {
                RoleDefinition::Partition => {
                    if let Some(existing) = partition {
                        return Err(SchemaError::DuplicatePartitionKey {
                            existing: existing.name.clone(),
                            name: key.name.clone(),
                        });
                    }
                    partition = Some(key);
                }
                RoleDefinition::Sort => {
                    if partition.is_none() {
                        return Err(SchemaError::SortKeyBeforePartitionKey(key.name.clone()));
                    }
                    if let Some(existing) = sort {
                        return Err(SchemaError::DuplicateSortKey {
                            existing: existing.name.clone(),
                            name: key.name.clone(),
                        });
                    }
                    if !indexes.is_empty() {
                        return Err(SchemaError::SortKeyAfterIndexKeys(key.name.clone()));
                    }
                    sort = Some(key);
                }
                RoleDefinition::Index => {
                    if partition.is_none() {
                        return Err(SchemaError::IndexKeysBeforePartitionKey(key.name.clone()));
                    }
                    indexes.push(key);
                }
            }
        }

        let partition = partition.ok_or(SchemaError::MissingPartitionKey)?;
        let builder = SchemaBuilder::from_schema(AttributeSchema::new(self.attributes.clone())?)
            .add_partition_key(&partition.name, partition.derivation())?;
        let index_keys = indexes.iter().map(|k| (k.name.clone(), k.derivation()));
        let schema = match sort {
            Some(sort) => builder
                .add_sort_key(&sort.name, sort.derivation())?
                .add_index_keys(index_keys)?
                .build(),
            None => builder.add_index_keys(index_keys)?.build(),
        };

        for index in &self.indexes {
            index.validate_against(&schema)?;
        }

        info!(
            partition_key = %partition.name,
            index_keys = indexes.len(),
            "Compiled schema definition"
        );
        Ok(schema)
    }
}
