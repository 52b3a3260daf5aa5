//! Key derivations: a dependency list plus a function producing key parts.
//!
//! The composed key is the derived parts joined with [`SEPARATOR`], in the
//! order the derivation returns them. Parts are not escaped, so a value that
//! itself contains `#` makes the composed key ambiguous to split.

use crate::attribute::{AttributeSchema, Item};
use crate::error::{KeyError, KeyResult};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Separator placed between key parts.
pub const SEPARATOR: &str = "#";

/// Shared derivation function.
pub type DeriveFn = Arc<dyn Fn(&KeyInput<'_>) -> KeyResult<Vec<String>> + Send + Sync>;

/// The projection of an item onto a derivation's declared dependencies.
///
/// Reading any attribute outside the dependency list is an error.
pub struct KeyInput<'a> {
    key: &'a str,
    values: Vec<(&'a str, &'a Value)>,
}

impl<'a> KeyInput<'a> {
    /// Name of the key attribute being derived.
    pub fn key_name(&self) -> &str {
        self.key
    }

    /// Raw JSON value of a declared dependency.
    pub fn value(&self, name: &str) -> KeyResult<&Value> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
            .ok_or_else(|| KeyError::UndeclaredDependency {
                key: self.key.to_string(),
                attribute: name.to_string(),
            })
    }

    /// A declared dependency rendered as a key part.
    pub fn part(&self, name: &str) -> KeyResult<String> {
        render_part(self.key, name, self.value(name)?)
    }

    /// Every dependency rendered as a key part, in declaration order.
    pub fn parts(&self) -> KeyResult<Vec<String>> {
        self.values
            .iter()
            .map(|(name, value)| render_part(self.key, name, value))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Renders a JSON scalar as a key part: strings verbatim, numbers and
/// booleans as their JSON text.
pub fn render_part(key: &str, attribute: &str, value: &Value) -> KeyResult<String> {
    let found = match value {
        Value::String(s) => return Ok(s.clone()),
        Value::Number(n) => return Ok(n.to_string()),
        Value::Bool(b) => return Ok(b.to_string()),
        Value::Null => "null",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    Err(KeyError::UnrenderableValue {
        key: key.to_string(),
        attribute: attribute.to_string(),
        found,
    })
}

/// How one key attribute is derived from the non-key attributes.
#[derive(Clone)]
pub struct KeyDerivation {
    dependencies: Vec<String>,
    derive: DeriveFn,
}

impl KeyDerivation {
    /// A derivation reading `dependencies` and producing parts with `derive`.
    pub fn new<I, S, F>(dependencies: I, derive: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&KeyInput<'_>) -> KeyResult<Vec<String>> + Send + Sync + 'static,
    {
        Self {
            dependencies: dependencies.into_iter().map(Into::into).collect(),
            derive: Arc::new(derive),
        }
    }

    /// Joins the dependency values in declaration order.
    pub fn join<I, S>(dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(dependencies, |input| input.parts())
    }

    /// Like [`join`](Self::join) with a literal leading part, e.g. `USER#u1`.
    pub fn prefixed<I, S>(prefix: &str, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prefix = prefix.to_string();
        Self::new(dependencies, move |input| {
            let mut parts = Vec::with_capacity(input.len() + 1);
            parts.push(prefix.clone());
            parts.extend(input.parts()?);
            Ok(parts)
        })
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Projects `item` onto the dependencies, falling back to attribute
    /// defaults, and runs the derivation.
    pub fn derive_parts(
        &self,
        key: &str,
        attributes: &AttributeSchema,
        item: &Item,
    ) -> KeyResult<Vec<String>> {
        let input = self.project(key, attributes, item)?;
        (self.derive)(&input)
    }

    /// Derives the parts and joins them into the key value.
    pub fn compose(&self, key: &str, attributes: &AttributeSchema, item: &Item) -> KeyResult<String> {
        Ok(self.derive_parts(key, attributes, item)?.join(SEPARATOR))
    }

    fn project<'a>(
        &'a self,
        key: &'a str,
        attributes: &'a AttributeSchema,
        item: &'a Item,
    ) -> KeyResult<KeyInput<'a>> {
        let mut values = Vec::with_capacity(self.dependencies.len());
        for name in &self.dependencies {
            let value = match item.get(name) {
                Some(v) if !v.is_null() => v,
                _ => match attributes.get(name).and_then(|a| a.default.as_ref()) {
                    Some(default) => default,
                    None => {
                        return Err(KeyError::DependencyMissing {
                            key: key.to_string(),
                            attribute: name.clone(),
                        });
                    }
                },
            };
            values.push((name.as_str(), value));
        }
        Ok(KeyInput { key, values })
    }
}

impl fmt::Debug for KeyDerivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyDerivation")
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}
