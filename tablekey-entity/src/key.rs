use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use tablekey_codec::KeyTuple;
use tablekey_schema::Item;

/// The physical primary key of one item: the partition attribute and its
/// value, plus the sort attribute and its value when the schema has one.
///
/// Serializes as a map, e.g. `{"PK": "u1", "SK": "o42"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimaryKey {
    partition: (String, String),
    sort: Option<(String, String)>,
}

impl PrimaryKey {
    pub fn new(partition_name: &str, partition_value: impl Into<String>) -> Self {
        Self {
            partition: (partition_name.to_string(), partition_value.into()),
            sort: None,
        }
    }

    #[must_use]
    pub fn with_sort(mut self, sort_name: &str, sort_value: impl Into<String>) -> Self {
        self.sort = Some((sort_name.to_string(), sort_value.into()));
        self
    }

    pub fn partition_name(&self) -> &str {
        &self.partition.0
    }

    pub fn partition_value(&self) -> &str {
        &self.partition.1
    }

    pub fn sort_name(&self) -> Option<&str> {
        self.sort.as_ref().map(|(n, _)| n.as_str())
    }

    pub fn sort_value(&self) -> Option<&str> {
        self.sort.as_ref().map(|(_, v)| v.as_str())
    }

    /// Value of the named key attribute.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// `(name, value)` pairs: partition first, then sort.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        std::iter::once(&self.partition)
            .chain(self.sort.as_ref())
            .map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// The positional form used for opaque ids.
    pub fn to_tuple(&self) -> KeyTuple {
        KeyTuple::new(self.partition.1.clone(), self.sort_value().map(String::from))
    }

    /// The key as an item with string attributes.
    pub fn to_item(&self) -> Item {
        self.attributes().collect()
    }
}

impl From<PrimaryKey> for BTreeMap<String, String> {
    fn from(key: PrimaryKey) -> Self {
        std::iter::once(key.partition).chain(key.sort).collect()
    }
}

impl Serialize for PrimaryKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.sort.is_some() { 2 } else { 1 };
        let mut map = serializer.serialize_map(Some(len))?;
        for (name, value) in self.attributes() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
