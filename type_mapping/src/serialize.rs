//! Serialization utilities
//!
//! Conversions between `Value` and `serde_json::Value`, used by the codec and
//! by anything that needs a stable textual fingerprint of a structure.

use crate::types::{Fields, Value};

impl From<serde_json::Value> for Value {
    fn from(val: serde_json::Value) -> Self {
        match val {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(val: Value) -> Self {
        match val {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::from(i),
            // Non-finite floats have no JSON form
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s),
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Map(fields) => serde_json::Value::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, value.into()))
                    .collect(),
            ),
        }
    }
}

/// Build a property bag from a JSON object; any other JSON shape yields `None`
pub fn fields_from_json(value: serde_json::Value) -> Option<Fields> {
    match Value::from(value) {
        Value::Map(fields) => Some(fields),
        _ => None,
    }
}

/// Convert a property bag into a JSON object
pub fn fields_to_json(fields: &Fields) -> serde_json::Value {
    serde_json::Value::from(Value::Map(fields.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_object_to_fields() {
        let fields = fields_from_json(json!({"id": 7, "title": "Hello", "tags": ["a", "b"]}))
            .expect("object converts");
        assert_eq!(fields.get("id"), Some(&Value::Int(7)));
        assert_eq!(
            fields.get("tags"),
            Some(&Value::List(vec![Value::from("a"), Value::from("b")]))
        );
        // key order is preserved
        let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "title", "tags"]);
    }

    #[test]
    fn test_non_objects_are_rejected() {
        assert!(fields_from_json(json!([1, 2, 3])).is_none());
        assert!(fields_from_json(json!("text")).is_none());
    }

    #[test]
    fn test_nan_becomes_null() {
        assert_eq!(
            serde_json::Value::from(Value::Float(f64::NAN)),
            serde_json::Value::Null
        );
    }
}
