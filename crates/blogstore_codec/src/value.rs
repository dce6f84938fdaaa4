//! Dynamic column value type.

use crate::error::{CodecError, CodecResult};
use crate::{DATETIME_FORMAT, DATE_FORMAT};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A dynamic column value.
///
/// This is the closed set of values a record may hold. Dates and datetimes
/// are naive; callers agree on the time zone out of band.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL `NULL` or an absent value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer.
    Integer(i64),
    /// Double precision float.
    Double(f64),
    /// Text string (UTF-8).
    Text(String),
    /// Byte string.
    Bytes(Vec<u8>),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time of day.
    DateTime(NaiveDateTime),
}

impl Value {
    /// Returns true if this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the boolean if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer if this is an `Integer`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the float if this is a `Double`.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string slice if this is `Text`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the byte slice if this is `Bytes`.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the date if this is a `Date`.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the datetime if this is a `DateTime`.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(d) => Some(*d),
            _ => None,
        }
    }

    /// Renders the value as text, or `None` for `Null`.
    ///
    /// This is the lenient string view used when comparing old and new
    /// records: `Integer(5)` and `Text("5")` render identically.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Bool(b) => Some(b.to_string()),
            Value::Integer(n) => Some(n.to_string()),
            Value::Double(n) => Some(n.to_string()),
            Value::Text(s) => Some(s.clone()),
            Value::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
            Value::Date(d) => Some(d.format(DATE_FORMAT).to_string()),
            Value::DateTime(d) => Some(d.format(DATETIME_FORMAT).to_string()),
        }
    }

    /// Returns a short name for the kind of value.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Double(_) => "double",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
        }
    }

    /// Converts the value to a JSON document value.
    ///
    /// Bytes become an array of numbers, dates become formatted strings.
    /// Non-finite doubles become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Integer(n) => Json::from(*n),
            Value::Double(n) => serde_json::Number::from_f64(*n).map_or(Json::Null, Json::Number),
            Value::Text(s) => Json::String(s.clone()),
            Value::Bytes(b) => Json::Array(b.iter().map(|byte| Json::from(*byte)).collect()),
            Value::Date(_) | Value::DateTime(_) => self.to_text().map_or(Json::Null, Json::String),
        }
    }

    /// Converts a JSON document value held under `key`.
    ///
    /// Strings stay text; the schema decides later whether they are dates.
    /// Arrays are accepted only as byte strings.
    pub fn from_json(key: &str, json: &serde_json::Value) -> CodecResult<Self> {
        use serde_json::Value as Json;
        match json {
            Json::Null => Ok(Value::Null),
            Json::Bool(b) => Ok(Value::Bool(*b)),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Value::Double(f))
                } else {
                    Err(CodecError::unsupported(key, format!("number {n} out of range")))
                }
            }
            Json::String(s) => Ok(Value::Text(s.clone())),
            Json::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_u64()
                        .and_then(|n| u8::try_from(n).ok())
                        .ok_or_else(|| CodecError::unsupported(key, "arrays must hold bytes"))
                })
                .collect::<CodecResult<Vec<u8>>>()
                .map(Value::Bytes),
            Json::Object(_) => Err(CodecError::unsupported(key, "nested objects")),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Some(text) => f.write_str(&text),
            None => f.write_str("null"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(n) => serializer.serialize_i64(*n),
            Value::Double(n) => serializer.serialize_f64(*n),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Bytes(b) => b.serialize(serializer),
            Value::Date(d) => serializer.serialize_str(&d.format(DATE_FORMAT).to_string()),
            Value::DateTime(d) => serializer.serialize_str(&d.format(DATETIME_FORMAT).to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        Value::from_json("", &json).map_err(serde::de::Error::custom)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_rendering_is_lenient() {
        assert_eq!(Value::Integer(5).to_text(), Value::from("5").to_text());
        assert_eq!(Value::Bool(true).to_text().as_deref(), Some("true"));
        assert_eq!(Value::Null.to_text(), None);
    }

    #[test]
    fn dates_render_with_fixed_formats() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(Value::Date(date).to_string(), "2024-02-29");

        let at = date.and_hms_milli_opt(13, 5, 9, 42).unwrap();
        assert_eq!(Value::DateTime(at).to_string(), "2024-02-29 13:05:09.042");

        let whole = date.and_hms_opt(13, 5, 9).unwrap();
        assert_eq!(Value::DateTime(whole).to_string(), "2024-02-29 13:05:09");
    }

    #[test]
    fn datetimes_keep_sub_millisecond_precision() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let micro = date.and_hms_micro_opt(3, 4, 5, 123_456).unwrap();
        let nano = date.and_hms_nano_opt(3, 4, 5, 123_456_789).unwrap();
        assert_eq!(Value::DateTime(micro).to_string(), "2024-01-02 03:04:05.123456");
        assert_eq!(Value::DateTime(nano).to_string(), "2024-01-02 03:04:05.123456789");
        assert_ne!(Value::DateTime(micro).to_text(), Value::DateTime(nano).to_text());
    }

    #[test]
    fn json_numbers_prefer_integers() {
        let json = serde_json::json!(42);
        assert_eq!(Value::from_json("n", &json).unwrap(), Value::Integer(42));

        let json = serde_json::json!(1.5);
        assert_eq!(Value::from_json("n", &json).unwrap(), Value::Double(1.5));
    }

    #[test]
    fn json_arrays_are_bytes() {
        let json = serde_json::json!([1, 2, 255]);
        assert_eq!(
            Value::from_json("b", &json).unwrap(),
            Value::Bytes(vec![1, 2, 255])
        );

        let json = serde_json::json!([1, 256]);
        assert!(Value::from_json("b", &json).is_err());
    }

    #[test]
    fn nested_objects_are_rejected() {
        let json = serde_json::json!({"a": 1});
        let err = Value::from_json("meta", &json).unwrap_err();
        assert!(err.to_string().contains("meta"));
    }

    #[test]
    fn option_maps_none_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }

    #[test]
    fn non_finite_double_becomes_json_null() {
        assert_eq!(Value::Double(f64::NAN).to_json(), serde_json::Value::Null);
    }
}
