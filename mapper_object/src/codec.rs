//! Serialization of composite column values

use crate::errors::MapperError;
use std::fmt::Debug;
use type_mapping::Value;

/// Turns a composite value into column text and back
pub trait Codec: Debug {
    fn encode(&self, value: &Value) -> Result<String, MapperError>;
    fn decode(&self, text: &str) -> Result<Value, MapperError>;
}

/// JSON text, the default codec for serialized columns and document content
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, value: &Value) -> Result<String, MapperError> {
        Ok(serde_json::to_string(value)?)
    }

    fn decode(&self, text: &str) -> Result<Value, MapperError> {
        let parsed: serde_json::Value = serde_json::from_str(text)?;
        Ok(Value::from(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use type_mapping::Fields;

    #[test]
    fn test_encode_map() {
        let mut fields = Fields::new();
        fields.insert("width".to_string(), Value::Int(640));
        fields.insert("crop".to_string(), Value::Bool(true));
        let encoded = JsonCodec.encode(&Value::Map(fields.clone())).unwrap();
        assert_eq!(encoded, r#"{"width":640,"crop":true}"#);
        assert_eq!(JsonCodec.decode(&encoded).unwrap(), Value::Map(fields));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(
            JsonCodec.decode("a:1:{"),
            Err(MapperError::Codec(_))
        ));
    }
}
