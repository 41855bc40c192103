//! Entity - the plain record a mapper hands out and accepts

use crate::errors::MapperError;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use type_mapping::{fields_from_json, Fields, Value};

/// Property used when an entity is exported with its primary-key marker
pub const ID_FIELD_PROPERTY: &str = "id_field";

/// A dynamic record: an ordered property bag plus the name of the property
/// holding its primary key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entity {
    fields: Fields,
    id_field: Option<String>,
    defaults_set: bool,
}

impl Entity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: Fields) -> Self {
        Self {
            fields,
            id_field: None,
            defaults_set: false,
        }
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut Fields {
        &mut self.fields
    }

    pub fn into_fields(self) -> Fields {
        self.fields
    }

    pub fn get(&self, property: &str) -> Option<&Value> {
        self.fields.get(property)
    }

    pub fn get_mut(&mut self, property: &str) -> Option<&mut Value> {
        self.fields.get_mut(property)
    }

    pub fn set(&mut self, property: &str, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(property.to_string(), value.into());
        self
    }

    /// Builder-style setter
    pub fn with(mut self, property: &str, value: impl Into<Value>) -> Self {
        self.set(property, value);
        self
    }

    pub fn remove(&mut self, property: &str) -> Option<Value> {
        self.fields.shift_remove(property)
    }

    pub fn contains(&self, property: &str) -> bool {
        self.fields.contains_key(property)
    }

    /// Copy every property from `other`, overwriting existing ones
    pub fn merge(&mut self, other: Fields) {
        for (key, value) in other {
            self.fields.insert(key, value);
        }
    }

    pub fn id_field(&self) -> Option<&str> {
        self.id_field.as_deref()
    }

    pub fn set_id_field(&mut self, property: &str) {
        self.id_field = Some(property.to_string());
    }

    pub fn clear_id_field(&mut self) {
        self.id_field = None;
    }

    /// Value of the primary-key property, if the marker and the value are both present
    pub fn id(&self) -> Option<&Value> {
        self.id_field.as_deref().and_then(|key| self.fields.get(key))
    }

    /// Whether the defaults hook has already been applied
    pub fn has_default_values(&self) -> bool {
        self.defaults_set
    }

    pub fn mark_defaults_set(&mut self) {
        self.defaults_set = true;
    }

    pub fn clear_defaults_marker(&mut self) {
        self.defaults_set = false;
    }

    /// JSON object with every property plus the primary-key marker
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl From<Fields> for Entity {
    fn from(fields: Fields) -> Self {
        Entity::from_fields(fields)
    }
}

impl FromIterator<(String, Value)> for Entity {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Entity::from_fields(iter.into_iter().collect())
    }
}

impl TryFrom<serde_json::Value> for Entity {
    type Error = MapperError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        let kind = match &value {
            serde_json::Value::Object(_) => "object",
            serde_json::Value::Array(_) => "array",
            serde_json::Value::String(_) => "string",
            serde_json::Value::Number(_) => "number",
            serde_json::Value::Bool(_) => "bool",
            serde_json::Value::Null => "null",
        };
        let mut fields = fields_from_json(value).ok_or_else(|| {
            MapperError::InvalidEntity(format!("expected an object, got {kind}"))
        })?;

        let id_field = match fields.shift_remove(ID_FIELD_PROPERTY) {
            Some(Value::Text(name)) => Some(name),
            _ => None,
        };
        Ok(Self {
            fields,
            id_field,
            defaults_set: false,
        })
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = usize::from(self.id_field.is_some());
        let mut map = serializer.serialize_map(Some(self.fields.len() + extra))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        if let Some(id_field) = &self.id_field {
            map.serialize_entry(ID_FIELD_PROPERTY, id_field)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_follows_marker() {
        let mut entity = Entity::new().with("gid", 7).with("title", "Holiday");
        assert_eq!(entity.id(), None);

        entity.set_id_field("gid");
        assert_eq!(entity.id(), Some(&Value::Int(7)));
        assert_eq!(entity.id_field(), Some("gid"));
    }

    #[test]
    fn test_json_round_trip_keeps_marker() {
        let entity = Entity::try_from(json!({"ID": 3, "title": "x", "id_field": "ID"})).unwrap();
        assert_eq!(entity.id_field(), Some("ID"));
        assert!(!entity.contains(ID_FIELD_PROPERTY));
        assert_eq!(entity.to_json(), json!({"ID": 3, "title": "x", "id_field": "ID"}));
    }

    #[test]
    fn test_non_object_json_is_rejected() {
        let err = Entity::try_from(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, MapperError::InvalidEntity(_)));
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_merge_overwrites() {
        let mut entity = Entity::new().with("a", 1).with("b", 2);
        let mut other = Fields::new();
        other.insert("b".to_string(), Value::Int(20));
        other.insert("c".to_string(), Value::Int(30));
        entity.merge(other);
        let keys: Vec<&str> = entity.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(entity.get("b"), Some(&Value::Int(20)));
    }
}
