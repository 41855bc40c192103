//! Type mapping definitions
//!
//! `Value` is the runtime representation of every entity property and every
//! raw storage cell. `Fields` is the ordered property bag built from them.

use crate::validate::{is_numeric_str, parse_leading_float, parse_leading_int};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered mapping from property name to value
pub type Fields = IndexMap<String, Value>;

/// Loosely typed value stored in entity properties and storage rows
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
    Map(Fields),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Lists and maps are stored serialized, never in a scalar column
    pub fn is_composite(&self) -> bool {
        matches!(self, Value::List(_) | Value::Map(_))
    }

    /// Integers, floats and strings holding a complete numeric literal
    pub fn is_numeric(&self) -> bool {
        match self {
            Value::Int(_) => true,
            Value::Float(f) => f.is_finite(),
            Value::Text(s) => is_numeric_str(s),
            _ => false,
        }
    }

    /// Truthiness as the storage layer understands it: null, false, zero,
    /// empty string, "0" and empty collections are false
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Text(s) => !(s.is_empty() || s == "0"),
            Value::List(items) => !items.is_empty(),
            Value::Map(fields) => !fields.is_empty(),
        }
    }

    /// Integer conversion following storage semantics (text uses its numeric prefix)
    pub fn to_int(&self) -> i64 {
        match self {
            Value::Null => 0,
            Value::Bool(b) => i64::from(*b),
            Value::Int(i) => *i,
            Value::Float(f) => {
                if f.is_finite() {
                    f.trunc() as i64
                } else {
                    0
                }
            }
            Value::Text(s) => parse_leading_int(s),
            Value::List(items) => i64::from(!items.is_empty()),
            Value::Map(fields) => i64::from(!fields.is_empty()),
        }
    }

    /// Floating point conversion following storage semantics
    pub fn to_float(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Int(i) => *i as f64,
            Value::Float(f) => *f,
            Value::Text(s) => parse_leading_float(s),
            Value::List(items) => f64::from(u8::from(!items.is_empty())),
            Value::Map(fields) => f64::from(u8::from(!fields.is_empty())),
        }
    }

    /// Text form of a scalar; composites have none
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => Some(String::new()),
            Value::Bool(true) => Some("1".to_string()),
            Value::Bool(false) => Some(String::new()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Text(s) => Some(s.clone()),
            Value::List(_) | Value::Map(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Fields> {
        match self {
            Value::Map(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Fields> {
        match self {
            Value::Map(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short tag used in log lines and error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Some(text) => f.write_str(&text),
            None => write!(f, "{}", serde_json::Value::from(self.clone())),
        }
    }
}

impl From<String> for Value {
    fn from(val: String) -> Self {
        Value::Text(val)
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::Text(val.to_string())
    }
}

impl From<i64> for Value {
    fn from(val: i64) -> Self {
        Value::Int(val)
    }
}

impl From<i32> for Value {
    fn from(val: i32) -> Self {
        Value::Int(i64::from(val))
    }
}

impl From<u32> for Value {
    fn from(val: u32) -> Self {
        Value::Int(i64::from(val))
    }
}

impl From<f64> for Value {
    fn from(val: f64) -> Self {
        Value::Float(val)
    }
}

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Value::Bool(val)
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(val: Vec<T>) -> Self {
        Value::List(val.into_iter().map(Into::into).collect())
    }
}

impl<T, const N: usize> From<[T; N]> for Value
where
    T: Into<Value>,
{
    fn from(val: [T; N]) -> Self {
        Value::List(val.into_iter().map(Into::into).collect())
    }
}

impl From<Fields> for Value {
    fn from(val: Fields) -> Self {
        Value::Map(val)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(val: Option<T>) -> Self {
        match val {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::from("0").is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
        assert!(Value::from("false").is_truthy());
        assert!(Value::Int(-1).is_truthy());
    }

    #[test]
    fn test_loose_conversions() {
        assert_eq!(Value::from("42").to_int(), 42);
        assert_eq!(Value::Float(9.99).to_int(), 9);
        assert_eq!(Value::Bool(true).to_float(), 1.0);
        assert_eq!(Value::Int(3).to_text().as_deref(), Some("3"));
        assert_eq!(Value::Bool(false).to_text().as_deref(), Some(""));
        assert_eq!(Value::List(vec![Value::Int(1)]).to_text(), None);
    }

    #[test]
    fn test_strict_equality_distinguishes_types() {
        assert_ne!(Value::from("42"), Value::Int(42));
        assert_ne!(Value::Int(1), Value::Bool(true));
        assert_eq!(Value::from(Some(5)), Value::Int(5));
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }

    #[test]
    fn test_untagged_json_shape() {
        let mut fields = Fields::new();
        fields.insert("name".to_string(), Value::from("gallery"));
        fields.insert("count".to_string(), Value::Int(3));
        let encoded = serde_json::to_string(&Value::Map(fields.clone())).unwrap();
        assert_eq!(encoded, r#"{"name":"gallery","count":3}"#);

        let decoded: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, Value::Map(fields));
    }
}
