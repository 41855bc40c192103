//! SQL type conversion utilities
//!
//! Declared column types are free-form SQL (`varchar(255)`, `bigint(20)`,
//! `tinyint(1)`, `decimal(7,2)`...). Marshaling only needs to know which of a
//! handful of casts applies, so the declared type is classified by pattern.

use crate::types::Value;
use once_cell::sync::Lazy;
use regex::Regex;

static TEXT_TYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)varchar|text").unwrap());
static FLOAT_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)decimal|numeric|double|float").unwrap());
static INT_TYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)int").unwrap());
static BOOL_TYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)bool").unwrap());

/// Cast applied to a column value when a row becomes an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastKind {
    Text,
    Float,
    Int,
    Bool,
    /// Unrecognized type, value is left untouched
    Passthrough,
}

/// Classify a declared SQL type. Patterns are checked in order, so
/// `tinyint(1)` is an integer and `mediumtext` is text.
pub fn cast_kind(sql_type: &str) -> CastKind {
    if TEXT_TYPE.is_match(sql_type) {
        CastKind::Text
    } else if FLOAT_TYPE.is_match(sql_type) {
        CastKind::Float
    } else if INT_TYPE.is_match(sql_type) {
        CastKind::Int
    } else if BOOL_TYPE.is_match(sql_type) {
        CastKind::Bool
    } else {
        CastKind::Passthrough
    }
}

/// Cast a value to the semantic type of a column
pub fn cast_value(kind: CastKind, value: Value) -> Value {
    match kind {
        CastKind::Text => match value.to_text() {
            Some(text) => Value::Text(text),
            // lists and maps are left for the serializer
            None => value,
        },
        CastKind::Float => Value::Float(value.to_float()),
        CastKind::Int => Value::Int(value.to_int()),
        CastKind::Bool => Value::Bool(value.is_truthy()),
        CastKind::Passthrough => value,
    }
}

/// Render a scalar as a SQL literal for DDL defaults
pub fn sql_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Text(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
        Value::List(_) | Value::Map(_) => {
            let json = serde_json::Value::from(value.clone()).to_string();
            format!("'{}'", json.replace('\\', "\\\\").replace('\'', "\\'"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_kind_patterns() {
        assert_eq!(cast_kind("varchar(255)"), CastKind::Text);
        assert_eq!(cast_kind("LONGTEXT"), CastKind::Text);
        assert_eq!(cast_kind("decimal(7,2)"), CastKind::Float);
        assert_eq!(cast_kind("DOUBLE"), CastKind::Float);
        assert_eq!(cast_kind("bigint(20) unsigned"), CastKind::Int);
        assert_eq!(cast_kind("tinyint(1)"), CastKind::Int);
        assert_eq!(cast_kind("boolean"), CastKind::Bool);
        assert_eq!(cast_kind("datetime"), CastKind::Passthrough);
    }

    #[test]
    fn test_cast_values() {
        assert_eq!(cast_value(CastKind::Int, Value::from("42")), Value::Int(42));
        assert_eq!(cast_value(CastKind::Float, Value::from("1.25")), Value::Float(1.25));
        assert_eq!(cast_value(CastKind::Text, Value::Int(9)), Value::from("9"));
        assert_eq!(cast_value(CastKind::Bool, Value::from("0")), Value::Bool(false));
        let list = Value::List(vec![Value::Int(1)]);
        assert_eq!(cast_value(CastKind::Text, list.clone()), list);
        assert_eq!(
            cast_value(CastKind::Passthrough, Value::from("2024-01-01")),
            Value::from("2024-01-01")
        );
    }

    #[test]
    fn test_sql_literal_escapes_quotes() {
        assert_eq!(sql_literal(&Value::from("it's")), "'it\\'s'");
        assert_eq!(sql_literal(&Value::Int(5)), "5");
        assert_eq!(sql_literal(&Value::Bool(true)), "1");
    }
}
