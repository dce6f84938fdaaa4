//! Records: column name to value maps.

use crate::error::{CodecError, CodecResult};
use crate::value::Value;
use crate::OBJECT_ID;
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// A dynamic record.
///
/// Keys are kept sorted so that rendering, diffing, and serialization are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Inserts a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// Returns true if `key` is present, even when it holds `Null`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Iterates over the keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterates over key/value pairs in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the identifier held under [`OBJECT_ID`] as text.
    pub fn id(&self) -> Option<String> {
        self.opt_str(OBJECT_ID)
    }

    /// Sets the identifier.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.fields
            .insert(OBJECT_ID.to_string(), Value::Text(id.into()));
    }

    /// Returns the value under `key` rendered as text.
    ///
    /// Absent keys and `Null` both yield `None`.
    pub fn opt_str(&self, key: &str) -> Option<String> {
        self.get(key).and_then(Value::to_text)
    }

    /// Returns the value under `key` as an integer.
    ///
    /// Text holding a decimal integer is parsed.
    pub fn opt_i64(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            Value::Integer(n) => Some(*n),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Returns the value under `key` as a float.
    #[allow(clippy::cast_precision_loss)]
    pub fn opt_f64(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            Value::Double(n) => Some(*n),
            Value::Integer(n) => Some(*n as f64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Returns the value under `key` as a boolean.
    ///
    /// Integers are true when non-zero; text must read `true` or `false`.
    pub fn opt_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::Integer(n) => Some(*n != 0),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Converts the record to a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    /// Renders the record as compact JSON text.
    pub fn to_json_string(&self) -> CodecResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Builds a record from a JSON object.
    pub fn from_json(json: &serde_json::Value) -> CodecResult<Self> {
        let serde_json::Value::Object(map) = json else {
            return Err(CodecError::NotAnObject {
                found: json_kind(json),
            });
        };
        map.iter()
            .map(|(k, v)| Ok::<_, CodecError>((k.clone(), Value::from_json(k, v)?)))
            .collect()
    }

    /// Parses a record from JSON text.
    pub fn from_json_str(text: &str) -> CodecResult<Self> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        Self::from_json(&json)
    }
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn id_reads_any_scalar() {
        let record = Record::new().with(OBJECT_ID, 17_i64);
        assert_eq!(record.id().as_deref(), Some("17"));

        let mut record = Record::new();
        assert_eq!(record.id(), None);
        record.set_id("abc");
        assert_eq!(record.id().as_deref(), Some("abc"));
    }

    #[test]
    fn null_counts_as_present_key() {
        let record = Record::new().with("a", Value::Null);
        assert!(record.contains_key("a"));
        assert_eq!(record.opt_str("a"), None);
    }

    #[test]
    fn typed_accessors_coerce_text() {
        let record = Record::new()
            .with("count", "12")
            .with("flag", "true")
            .with("ratio", "0.5")
            .with("bit", 1_i64);

        assert_eq!(record.opt_i64("count"), Some(12));
        assert_eq!(record.opt_bool("flag"), Some(true));
        assert_eq!(record.opt_bool("bit"), Some(true));
        assert_eq!(record.opt_f64("ratio"), Some(0.5));
        assert_eq!(record.opt_i64("missing"), None);
    }

    #[test]
    fn from_json_rejects_non_objects() {
        let err = Record::from_json(&serde_json::json!([1, 2])).unwrap_err();
        assert!(matches!(err, CodecError::NotAnObject { found: "array" }));
    }

    #[test]
    fn json_text_round_trip() {
        let record = Record::new()
            .with(OBJECT_ID, "1")
            .with("title", "hello")
            .with("views", 3_i64)
            .with("draft", false)
            .with("note", Value::Null);

        let text = record.to_json_string().unwrap();
        assert_eq!(Record::from_json_str(&text).unwrap(), record);
    }

    proptest! {
        #[test]
        fn keys_come_out_sorted(keys in proptest::collection::vec("[a-z]{1,8}", 0..20)) {
            let record: Record = keys
                .iter()
                .map(|k| (k.clone(), Value::from(k.as_str())))
                .collect();
            let collected: Vec<&str> = record.keys().collect();
            let mut sorted = collected.clone();
            sorted.sort_unstable();
            prop_assert_eq!(collected, sorted);
        }
    }
}
