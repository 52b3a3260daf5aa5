use crate::attribute::{AttributeSchema, Item};
use crate::derivation::KeyDerivation;
use crate::error::{KeyError, KeyResult};
use std::fmt;

/// The part a derived attribute plays in the physical key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyRole {
    Partition,
    Sort,
    SecondaryIndex(String),
}

impl KeyRole {
    /// Shorthand for a named secondary-index role.
    pub fn index(name: &str) -> Self {
        Self::SecondaryIndex(name.into())
    }
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Partition => f.write_str("partition key"),
            Self::Sort => f.write_str("sort key"),
            Self::SecondaryIndex(name) => write!(f, "index key `{name}`"),
        }
    }
}

/// A key attribute whose value is synthesized from non-key attributes.
#[derive(Debug, Clone)]
pub struct DerivedKeyAttribute {
    name: String,
    role: KeyRole,
    derivation: KeyDerivation,
}

impl DerivedKeyAttribute {
    pub(crate) fn new(name: String, role: KeyRole, derivation: KeyDerivation) -> Self {
        Self {
            name,
            role,
            derivation,
        }
    }

    /// Attribute name the storage engine sees, e.g. `PK`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> &KeyRole {
        &self.role
    }

    pub fn dependencies(&self) -> &[String] {
        self.derivation.dependencies()
    }

    pub fn derivation(&self) -> &KeyDerivation {
        &self.derivation
    }
}

/// The immutable result of a [`SchemaBuilder`](crate::SchemaBuilder):
/// non-key attributes plus every derived key attribute.
///
/// Safe to share between threads; derivations are expected to be pure.
#[derive(Debug, Clone)]
pub struct CompositeKeySchema {
    attributes: AttributeSchema,
    partition: DerivedKeyAttribute,
    sort: Option<DerivedKeyAttribute>,
    indexes: Vec<DerivedKeyAttribute>,
}

impl CompositeKeySchema {
    pub(crate) fn new(
        attributes: AttributeSchema,
        partition: DerivedKeyAttribute,
        sort: Option<DerivedKeyAttribute>,
        indexes: Vec<DerivedKeyAttribute>,
    ) -> Self {
        Self {
            attributes,
            partition,
            sort,
            indexes,
        }
    }

    pub fn attributes(&self) -> &AttributeSchema {
        &self.attributes
    }

    pub fn partition_key(&self) -> &DerivedKeyAttribute {
        &self.partition
    }

    pub fn sort_key(&self) -> Option<&DerivedKeyAttribute> {
        self.sort.as_ref()
    }

    pub fn index_key(&self, name: &str) -> Option<&DerivedKeyAttribute> {
        self.indexes.iter().find(|k| k.name == name)
    }

    pub fn index_keys(&self) -> impl Iterator<Item = &DerivedKeyAttribute> {
        self.indexes.iter()
    }

    /// Looks up the derived attribute playing `role`.
    pub fn key(&self, role: &KeyRole) -> Option<&DerivedKeyAttribute> {
        match role {
            KeyRole::Partition => Some(&self.partition),
            KeyRole::Sort => self.sort.as_ref(),
            KeyRole::SecondaryIndex(name) => self.index_key(name),
        }
    }

    /// Every derived attribute: partition, sort, then index keys in
    /// registration order.
    pub fn derived_attributes(&self) -> impl Iterator<Item = &DerivedKeyAttribute> {
        std::iter::once(&self.partition)
            .chain(self.sort.as_ref())
            .chain(self.indexes.iter())
    }

    pub fn is_key_attribute(&self, name: &str) -> bool {
        self.derived_attributes().any(|k| k.name == name)
    }

    /// Derives the value of the key playing `role` from `item`.
    pub fn derive(&self, role: &KeyRole, item: &Item) -> KeyResult<String> {
        let key = self
            .key(role)
            .ok_or_else(|| KeyError::NoSuchKey(role.to_string()))?;
        self.compose(key, item)
    }

    /// Derives the value of `key`, which must belong to this schema.
    pub fn compose(&self, key: &DerivedKeyAttribute, item: &Item) -> KeyResult<String> {
        key.derivation.compose(&key.name, &self.attributes, item)
    }
}
