use crate::error::{CodecError, CodecResult};
use std::fmt;

/// A primary key as an ordered pair: partition value, then the optional sort
/// value.
///
/// The canonical text form is a JSON array, `["p"]` or `["p","s"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyTuple {
    partition: String,
    sort: Option<String>,
}

impl KeyTuple {
    pub fn new(partition: impl Into<String>, sort: Option<String>) -> Self {
        Self {
            partition: partition.into(),
            sort,
        }
    }

    pub fn partition_only(partition: impl Into<String>) -> Self {
        Self::new(partition, None)
    }

    pub fn with_sort(partition: impl Into<String>, sort: impl Into<String>) -> Self {
        Self::new(partition, Some(sort.into()))
    }

    pub fn partition(&self) -> &str {
        &self.partition
    }

    pub fn sort(&self) -> Option<&str> {
        self.sort.as_deref()
    }

    pub fn into_parts(self) -> (String, Option<String>) {
        (self.partition, self.sort)
    }

    /// Canonical JSON bytes.
    pub fn to_json(&self) -> Vec<u8> {
        let mut parts: Vec<&str> = vec![self.partition.as_str()];
        parts.extend(self.sort.as_deref());
        // Serializing a slice of strings cannot fail.
        serde_json::to_vec(&parts).unwrap_or_default()
    }

    /// Parses canonical JSON. Accepts `[p]`, `[p, s]` and `[p, null]`.
    pub fn from_json(bytes: &[u8]) -> CodecResult<Self> {
        let parts: Vec<Option<String>> = serde_json::from_slice(bytes)
            .map_err(|e| CodecError::Decode(format!("not a key tuple: {e}")))?;
        let mut parts = parts.into_iter();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(Some(partition)), sort, None) => Ok(Self::new(partition, sort.flatten())),
            (Some(None), _, _) => Err(CodecError::Decode("partition value is null".into())),
            (None, _, _) => Err(CodecError::Decode("empty key tuple".into())),
            (Some(Some(_)), _, Some(_)) => {
                Err(CodecError::Decode("key tuple has more than two values".into()))
            }
        }
    }
}

impl fmt::Display for KeyTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.to_json()))
    }
}

impl From<(String, Option<String>)> for KeyTuple {
    fn from((partition, sort): (String, Option<String>)) -> Self {
        Self::new(partition, sort)
    }
}
