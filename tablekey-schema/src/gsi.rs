use crate::error::{SchemaError, SchemaResult};
use crate::schema::CompositeKeySchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Describes a global secondary index: its name and which attributes act as
/// its partition and sort key.
///
/// Purely descriptive; queries against the index are issued by the storage
/// engine. Displays as the index name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gsi {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<String>,
}

impl Gsi {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            partition_key: None,
            sort_key: None,
        }
    }

    #[must_use]
    pub fn with_partition_key(mut self, attribute: &str) -> Self {
        self.partition_key = Some(attribute.into());
        self
    }

    #[must_use]
    pub fn with_sort_key(mut self, attribute: &str) -> Self {
        self.sort_key = Some(attribute.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn partition_key(&self) -> Option<&str> {
        self.partition_key.as_deref()
    }

    pub fn sort_key(&self) -> Option<&str> {
        self.sort_key.as_deref()
    }

    /// Checks that both key references name an attribute of `schema`,
    /// derived or not.
    pub fn validate_against(&self, schema: &CompositeKeySchema) -> SchemaResult<()> {
        for attribute in [&self.partition_key, &self.sort_key].into_iter().flatten() {
            if !schema.is_key_attribute(attribute) && !schema.attributes().contains(attribute) {
                return Err(SchemaError::UnknownIndexAttribute {
                    index: self.name.clone(),
                    attribute: attribute.clone(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Gsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
