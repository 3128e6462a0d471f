//! Schema-free view over the `DATA` node of a response envelope.
//!
//! # Design
//! The API returns upper-case field names (`DATACENTERID`, `LABEL`) whose
//! set varies per action. Rather than a struct per action, `wrap` turns any
//! JSON node into a `Value` tree whose objects expose their fields under
//! lower-cased names only. Callers that want typed data call `Value::decode`
//! with a serde type whose fields use the lower-cased names.

use std::collections::btree_map::{self, Entry};
use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::ApiError;

/// A read-only node of a mapped response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Object(ResponseObject),
    Array(Vec<Value>),
    String(String),
    Number(serde_json::Number),
    Bool(bool),
    Null,
}

/// A JSON object whose fields are reachable by their lower-cased names.
///
/// Field names are folded when the object is built. When two source keys
/// fold to the same name, a key that was already lower-case wins; otherwise
/// the first key seen wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResponseObject {
    fields: BTreeMap<String, Value>,
}

/// Map a parsed JSON node into a `Value`, recursively.
pub fn wrap(node: JsonValue) -> Value {
    match node {
        JsonValue::Object(map) => Value::Object(ResponseObject::from_map(map)),
        JsonValue::Array(items) => Value::Array(items.into_iter().map(wrap).collect()),
        JsonValue::String(s) => Value::String(s),
        JsonValue::Number(n) => Value::Number(n),
        JsonValue::Bool(b) => Value::Bool(b),
        JsonValue::Null => Value::Null,
    }
}

impl From<JsonValue> for Value {
    fn from(node: JsonValue) -> Self {
        wrap(node)
    }
}

impl ResponseObject {
    fn from_map(map: serde_json::Map<String, JsonValue>) -> Self {
        let mut fields = BTreeMap::new();
        for (key, node) in map {
            let name = key.to_lowercase();
            let already_lower = name == key;
            let value = wrap(node);
            match fields.entry(name) {
                Entry::Vacant(slot) => {
                    slot.insert(value);
                }
                Entry::Occupied(mut slot) if already_lower => {
                    slot.insert(value);
                }
                Entry::Occupied(_) => {}
            }
        }
        Self { fields }
    }

    /// Field by lower-cased name. Names containing upper-case letters never
    /// match.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a> IntoIterator for &'a ResponseObject {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl Value {
    /// Field of an object by lower-cased name; `None` for non-objects.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_object().and_then(|obj| obj.get(name))
    }

    /// Element of an array; `None` for non-arrays or out of range.
    pub fn at(&self, index: usize) -> Option<&Value> {
        self.as_array().and_then(|items| items.get(index))
    }

    pub fn as_object(&self) -> Option<&ResponseObject> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Deserialize the lower-cased view of this node into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let json = serde_json::to_value(self).map_err(|e| ApiError::Decode(e.to_string()))?;
        serde_json::from_value(json).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
