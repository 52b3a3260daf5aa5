use crate::error::{SchemaError, SchemaResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A non-key attribute of an entity.
///
/// Only attributes that are guaranteed to be present on every stored item
/// (required, or filled in from a default) may feed a key derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    /// Value substituted when an item omits the attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl Attribute {
    /// Shorthand for a required attribute.
    pub fn required(name: &str) -> Self {
        Self {
            name: name.into(),
            required: true,
            default: None,
        }
    }

    /// Shorthand for an optional attribute with no default.
    pub fn optional(name: &str) -> Self {
        Self {
            name: name.into(),
            required: false,
            default: None,
        }
    }

    /// Shorthand for an optional attribute that falls back to `default`.
    pub fn defaulted(name: &str, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            required: false,
            default: Some(default.into()),
        }
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Whether the attribute is always present and may be a key dependency.
    pub fn is_key_eligible(&self) -> bool {
        self.required || self.has_default()
    }
}

/// The ordered set of non-key attributes of an entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSchema {
    attributes: Vec<Attribute>,
}

impl AttributeSchema {
    /// Creates a schema, rejecting duplicate attribute names.
    pub fn new(attributes: impl IntoIterator<Item = Attribute>) -> SchemaResult<Self> {
        let mut schema = Self::default();
        for attribute in attributes {
            if schema.get(&attribute.name).is_some() {
                return Err(SchemaError::DuplicateAttribute(attribute.name));
            }
            schema.attributes.push(attribute);
        }
        Ok(schema)
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Checks that `key` may depend on `attribute`.
    pub(crate) fn check_dependency(&self, key: &str, attribute: &str) -> SchemaResult<()> {
        match self.get(attribute) {
            None => Err(SchemaError::UnknownDependency {
                key: key.into(),
                attribute: attribute.into(),
            }),
            Some(a) if !a.is_key_eligible() => Err(SchemaError::OptionalDependency {
                key: key.into(),
                attribute: attribute.into(),
            }),
            Some(_) => Ok(()),
        }
    }

    /// Reports the first required attribute the item lacks.
    ///
    /// A `null` value counts as missing.
    pub fn validate(&self, item: &Item) -> SchemaResult<()> {
        for attribute in self.attributes.iter().filter(|a| a.required) {
            match item.get(&attribute.name) {
                None | Some(Value::Null) => {
                    return Err(SchemaError::MissingRequired(attribute.name.clone()));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Fills every absent or `null` defaulted attribute in place.
    pub fn apply_defaults(&self, item: &mut Item) {
        for attribute in &self.attributes {
            if let Some(default) = &attribute.default {
                if matches!(item.get(&attribute.name), None | Some(Value::Null)) {
                    item.set(&attribute.name, default.clone());
                }
            }
        }
    }
}

/// A logical record: attribute name to JSON value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item(Map<String, Value>);

impl Item {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns the attribute as a string slice if it is a JSON string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.to_string(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Item {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Item> for Value {
    fn from(item: Item) -> Self {
        Value::Object(item.0)
    }
}

/// Fails with the original value when it is not a JSON object.
impl TryFrom<Value> for Item {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Item {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
