//! Staged schema construction.
//!
//! Each stage only exposes the operations that are legal next:
//!
//! ```text
//! SchemaBuilder --add_partition_key--> WithPartitionKey --add_sort_key--> WithSortKey
//!                                           |                                 |
//!                                           +--------add_index_keys-----------+--> WithIndexKeys
//! ```
//!
//! A second partition key, a sort key without a partition key, or index keys
//! ahead of the partition key cannot be expressed. Dependency names are
//! checked against the non-key attributes at each step.

use crate::attribute::{Attribute, AttributeSchema};
use crate::derivation::KeyDerivation;
use crate::error::{SchemaError, SchemaResult};
use crate::schema::{CompositeKeySchema, DerivedKeyAttribute, KeyRole};
use tracing::debug;

/// First stage: non-key attributes only.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    attributes: AttributeSchema,
}

impl SchemaBuilder {
    pub fn with_non_key_attributes(
        attributes: impl IntoIterator<Item = Attribute>,
    ) -> SchemaResult<Self> {
        Ok(Self::from_schema(AttributeSchema::new(attributes)?))
    }

    pub fn from_schema(attributes: AttributeSchema) -> Self {
        Self { attributes }
    }

    pub fn add_partition_key(
        self,
        name: &str,
        derivation: KeyDerivation,
    ) -> SchemaResult<WithPartitionKey> {
        let partition = declare(&self.attributes, &[], name, KeyRole::Partition, derivation)?;
        Ok(WithPartitionKey {
            attributes: self.attributes,
            partition,
        })
    }
}

/// Second stage: a partition key exists.
#[derive(Debug, Clone)]
pub struct WithPartitionKey {
    attributes: AttributeSchema,
    partition: DerivedKeyAttribute,
}

impl WithPartitionKey {
    pub fn add_sort_key(self, name: &str, derivation: KeyDerivation) -> SchemaResult<WithSortKey> {
        let sort = declare(
            &self.attributes,
            &[self.partition.name()],
            name,
            KeyRole::Sort,
            derivation,
        )?;
        Ok(WithSortKey {
            attributes: self.attributes,
            partition: self.partition,
            sort,
        })
    }

    pub fn add_index_keys<I, N>(self, keys: I) -> SchemaResult<WithIndexKeys>
    where
        I: IntoIterator<Item = (N, KeyDerivation)>,
        N: Into<String>,
    {
        finish_with_indexes(self.attributes, self.partition, None, keys)
    }

    pub fn build(self) -> CompositeKeySchema {
        finish(self.attributes, self.partition, None, Vec::new())
    }
}

/// Third stage: partition and sort keys exist.
#[derive(Debug, Clone)]
pub struct WithSortKey {
    attributes: AttributeSchema,
    partition: DerivedKeyAttribute,
    sort: DerivedKeyAttribute,
}

impl WithSortKey {
    pub fn add_index_keys<I, N>(self, keys: I) -> SchemaResult<WithIndexKeys>
    where
        I: IntoIterator<Item = (N, KeyDerivation)>,
        N: Into<String>,
    {
        finish_with_indexes(self.attributes, self.partition, Some(self.sort), keys)
    }

    pub fn build(self) -> CompositeKeySchema {
        finish(self.attributes, self.partition, Some(self.sort), Vec::new())
    }
}

/// Final stage: index keys are registered; nothing more may be added.
#[derive(Debug, Clone)]
pub struct WithIndexKeys {
    schema: CompositeKeySchema,
}

impl WithIndexKeys {
    pub fn build(self) -> CompositeKeySchema {
        self.schema
    }
}

fn declare(
    attributes: &AttributeSchema,
    taken: &[&str],
    name: &str,
    role: KeyRole,
    derivation: KeyDerivation,
) -> SchemaResult<DerivedKeyAttribute> {
    if attributes.contains(name) || taken.contains(&name) {
        return Err(SchemaError::DuplicateAttribute(name.to_string()));
    }
    let dependencies = derivation.dependencies();
    for (i, dependency) in dependencies.iter().enumerate() {
        if dependencies[..i].contains(dependency) {
            return Err(SchemaError::DuplicateDependency {
                key: name.to_string(),
                attribute: dependency.clone(),
            });
        }
        attributes.check_dependency(name, dependency)?;
    }
    Ok(DerivedKeyAttribute::new(name.to_string(), role, derivation))
}

fn finish_with_indexes<I, N>(
    attributes: AttributeSchema,
    partition: DerivedKeyAttribute,
    sort: Option<DerivedKeyAttribute>,
    keys: I,
) -> SchemaResult<WithIndexKeys>
where
    I: IntoIterator<Item = (N, KeyDerivation)>,
    N: Into<String>,
{
    let mut indexes: Vec<DerivedKeyAttribute> = Vec::new();
    for (name, derivation) in keys {
        let name = name.into();
        let mut taken: Vec<&str> = vec![partition.name()];
        taken.extend(sort.as_ref().map(DerivedKeyAttribute::name));
        taken.extend(indexes.iter().map(DerivedKeyAttribute::name));
        let index = declare(
            &attributes,
            &taken,
            &name,
            KeyRole::SecondaryIndex(name.clone()),
            derivation,
        )?;
        indexes.push(index);
    }
    Ok(WithIndexKeys {
        schema: finish(attributes, partition, sort, indexes),
    })
}

fn finish(
    attributes: AttributeSchema,
    partition: DerivedKeyAttribute,
    sort: Option<DerivedKeyAttribute>,
    indexes: Vec<DerivedKeyAttribute>,
) -> CompositeKeySchema {
    debug!(
        partition_key = partition.name(),
        sort_key = sort.as_ref().map(DerivedKeyAttribute::name),
        index_keys = indexes.len(),
        "Composite key schema built"
    );
    CompositeKeySchema::new(attributes, partition, sort, indexes)
}
