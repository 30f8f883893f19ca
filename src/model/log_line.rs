//! The [`LogLine`] record type.

use crate::codec::finite::check_finite;
use crate::codec::CodecError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A single event from a logs collection.
///
/// Any JSON object is a valid `LogLine`, e.g.
/// `{"time": "2019-06-29T00:00:00+00:00", "ip": "0.0.0.0", "method": "GET", "url": "/test/url"}`.
///
/// Keys are kept in sorted order, which is also the order they are written to disk.
/// Numbers read back from a collection file are always floating point, so a line appended
/// as `{"a": 1}` reads back as `{"a": 1.0}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogLine {
    fields: Map<String, Value>,
    /// Fields whose inserted value has no JSON form, with the reason. Such a line cannot be
    /// encoded.
    #[serde(skip)]
    unencodable: BTreeMap<String, String>,
}

impl LogLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a `LogLine` from any serializable value that renders as a JSON object.
    ///
    /// Fails with [`CodecError::EncodeFailure`] if the value cannot be represented as JSON
    /// (a NaN or infinite float, a map with non-string keys) and [`CodecError::NotAnObject`]
    /// if it is valid JSON but not an object.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, CodecError> {
        check_finite(value).map_err(CodecError::EncodeFailure)?;
        let value = serde_json::to_value(value).map_err(CodecError::EncodeFailure)?;
        Self::try_from(value)
    }

    /// Inserts a field, returning the previous value for that key.
    ///
    /// A value with no JSON form, such as `f64::NAN`, is stored as `null` and marks the line
    /// unencodable: [`encode_line`](crate::codec::encode_line) and therefore every append of
    /// it fail with [`CodecError::EncodeFailure`] until the key is overwritten with a valid value.
    pub fn insert<V: Serialize>(&mut self, key: impl Into<String>, value: V) -> Option<Value> {
        let key = key.into();
        let value = match check_finite(&value).and_then(|()| serde_json::to_value(&value)) {
            Ok(value) => {
                self.unencodable.remove(&key);
                value
            }
            Err(err) => {
                self.unencodable.insert(key.clone(), err.to_string());
                Value::Null
            }
        };
        self.fields.insert(key, value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.fields.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }

    /// The first field that was inserted with a value JSON cannot hold, and why.
    pub(crate) fn unencodable_field(&self) -> Option<(&str, &str)> {
        self.unencodable
            .iter()
            .next()
            .map(|(key, reason)| (key.as_str(), reason.as_str()))
    }
}

impl From<Map<String, Value>> for LogLine {
    fn from(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            unencodable: BTreeMap::new(),
        }
    }
}

impl TryFrom<Value> for LogLine {
    type Error = CodecError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self::from(map)),
            _ => Err(CodecError::NotAnObject),
        }
    }
}

impl<'a> IntoIterator for &'a LogLine {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
