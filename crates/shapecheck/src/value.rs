//! Dynamic value model shared by schema fragments and validated elements.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;

/// Largest integer magnitude that prints exactly without a decimal point.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A dynamic runtime value.
///
/// `Value` plays two roles: it is the element being validated, and it is the
/// raw material schemas are authored in before compilation. Objects keep
/// their keys in insertion order, which validation diagnostics rely on.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Date(DateTime<Utc>),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
    /// Opaque callable placeholder; matched by the `Function` descriptor.
    Function,
    /// Unresolved-async placeholder; the only value the `promise` marker
    /// accepts.
    Pending,
}

impl Value {
    /// Build an object value from key/value pairs, preserving their order.
    pub fn object<K, I>(entries: I) -> Value
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }

    /// Build an array value.
    pub fn array<I>(items: I) -> Value
    where
        I: IntoIterator<Item = Value>,
    {
        Value::Array(items.into_iter().collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Lowercase runtime type word used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function => "function",
            Value::Pending => "promise",
        }
    }

    /// Convert a JSON value into a `Value`. Total: every JSON document has a
    /// representation, and object key order is preserved.
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Value::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// Convert back to JSON. Dates become RFC 3339 strings; `Function`,
    /// `Pending` and non-finite numbers have no JSON form and yield `None`.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        match self {
            Value::Null => Some(serde_json::Value::Null),
            Value::Bool(b) => Some(serde_json::Value::Bool(*b)),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER {
                    Some(serde_json::Value::Number(serde_json::Number::from(*n as i64)))
                } else {
                    serde_json::Number::from_f64(*n).map(serde_json::Value::Number)
                }
            }
            Value::String(s) => Some(serde_json::Value::String(s.clone())),
            Value::Date(d) => Some(serde_json::Value::String(
                d.to_rfc3339_opts(SecondsFormat::Secs, true),
            )),
            Value::Array(items) => items
                .iter()
                .map(Value::to_json)
                .collect::<Option<Vec<_>>>()
                .map(serde_json::Value::Array),
            Value::Object(entries) => entries
                .iter()
                .map(|(key, value)| value.to_json().map(|json| (key.clone(), json)))
                .collect::<Option<serde_json::Map<String, serde_json::Value>>>()
                .map(serde_json::Value::Object),
            Value::Function | Value::Pending => None,
        }
    }
}

/// String rendering used inside violation messages: integral numbers print
/// without a decimal point, arrays print their elements comma-joined, and
/// opaque values print bracketed placeholders.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => {
                if n.is_infinite() {
                    f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
                } else if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => f.write_str(s),
            Value::Date(d) => f.write_str(&d.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Value::Object(_) => f.write_str("[object Object]"),
            Value::Function => f.write_str("[function]"),
            Value::Pending => f.write_str("[object Promise]"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Value {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Value {
        Value::Number(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Value {
        Value::Number(f64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Value {
        Value::Number(v as f64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Value {
        Value::Number(f64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Value {
        Value::String(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Value {
        Value::Date(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Value {
        Value::Array(v)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Value {
        Value::Array(iter.into_iter().collect())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Value {
        Value::object(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_numbers() {
        assert_eq!(Value::from(42).to_string(), "42");
        assert_eq!(Value::from(-3).to_string(), "-3");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
        assert_eq!(Value::Number(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::Number(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(Value::Number(f64::NEG_INFINITY).to_string(), "-Infinity");
    }

    #[test]
    fn test_display_scalars() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from("hello").to_string(), "hello");
        assert_eq!(Value::Pending.to_string(), "[object Promise]");
        assert_eq!(Value::Function.to_string(), "[function]");
    }

    #[test]
    fn test_display_compound() {
        let nested = Value::array([
            Value::array([1.into(), 2.into()]),
            3.into(),
            "x".into(),
        ]);
        assert_eq!(nested.to_string(), "1,2,3,x");
        assert_eq!(
            Value::object([("a", Value::from(1))]).to_string(),
            "[object Object]"
        );
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::from(1).type_name(), "number");
        assert_eq!(Value::from("s").type_name(), "string");
        assert_eq!(Value::from(false).type_name(), "boolean");
        assert_eq!(Value::array([]).type_name(), "array");
        assert_eq!(Value::Object(IndexMap::new()).type_name(), "object");
        assert_eq!(Value::from(Utc::now()).type_name(), "date");
        assert_eq!(Value::Function.type_name(), "function");
        assert_eq!(Value::Pending.type_name(), "promise");
    }

    #[test]
    fn test_object_preserves_insertion_order() {
        let value = Value::object([("z", Value::Null), ("a", Value::Null), ("m", Value::Null)]);
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn test_from_json_round_trip() {
        let json = json!({
            "name": "Ada",
            "tags": ["a", "b"],
            "age": 36,
            "active": true,
            "nickname": null,
        });
        let value = Value::from_json(json.clone());
        assert_eq!(
            value,
            Value::object([
                ("name", "Ada".into()),
                ("tags", Value::array(["a".into(), "b".into()])),
                ("age", 36.into()),
                ("active", true.into()),
                ("nickname", Value::Null),
            ])
        );
        assert_eq!(value.to_json(), Some(json));
    }

    #[test]
    fn test_to_json_opaque_values() {
        assert_eq!(Value::Pending.to_json(), None);
        assert_eq!(Value::Function.to_json(), None);
        assert_eq!(Value::array([Value::Pending]).to_json(), None);
        assert!(Value::from(Utc::now()).to_json().is_some());
    }
}
