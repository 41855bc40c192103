//! Row-to-entity marshaling
//!
//! Casting, slash stripping and decoding of serialized columns, plus the
//! helpers defaults hooks use to fill in missing values.

use crate::codec::Codec;
use crate::entity::Entity;
use crate::query_builder::prepare::unescape;
use crate::schema::ColumnRegistry;
use crate::traits::defaults::DefaultsHook;
use crate::traits::marshaler::Marshaler;
use type_mapping::{cast_value, Fields, Value};

/// Remove one level of backslash escaping from every string in a value tree
pub fn strip_slashes(value: &mut Value) {
    match value {
        Value::Text(text) => {
            if text.contains('\\') {
                *text = unescape(text);
            }
        }
        Value::List(items) => items.iter_mut().for_each(strip_slashes),
        Value::Map(fields) => fields.values_mut().for_each(strip_slashes),
        _ => {}
    }
}

fn is_unset(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Text(text)) => text.is_empty(),
        Some(_) => false,
    }
}

/// Set a property only when it is absent, null or an empty string
pub fn set_default_value(entity: &mut Entity, property: &str, default: impl Into<Value>) {
    if is_unset(entity.get(property)) {
        entity.set(property, default);
    }
}

/// Set a key inside a map-valued property only when the key is unset.
/// A missing or non-map property is replaced by a fresh map first.
pub fn set_default_array_value(
    entity: &mut Entity,
    property: &str,
    key: &str,
    default: impl Into<Value>,
) {
    if !matches!(entity.get(property), Some(Value::Map(_))) {
        entity.set(property, Fields::new());
    }
    if let Some(fields) = entity.get_mut(property).and_then(Value::as_map_mut) {
        if is_unset(fields.get(key)) {
            fields.insert(key.to_string(), default.into());
        }
    }
}

/// Marshaler driven by a mapper's column registry and codec
pub struct EntityMarshaler<'a> {
    pub registry: &'a ColumnRegistry,
    pub codec: &'a dyn Codec,
    pub primary_key: &'a str,
    pub defaults: Option<&'a dyn DefaultsHook>,
}

impl Marshaler for EntityMarshaler<'_> {
    fn primary_key_column(&self) -> &str {
        self.primary_key
    }

    /// A present value that differs from the column default is cast to the
    /// column type; an absent or null value, or one equal to the default,
    /// becomes the default as declared.
    fn cast_columns(&self, entity: &mut Entity) {
        for definition in self.registry.columns() {
            let value = match entity.get(&definition.name) {
                Some(value) if !value.is_null() && *value != definition.default_value => {
                    cast_value(definition.cast_kind(), value.clone())
                }
                _ => definition.default_value.clone(),
            };
            entity.set(&definition.name, value);
        }
    }

    fn strip_slashes(&self, entity: &mut Entity) {
        entity.fields_mut().values_mut().for_each(strip_slashes);
    }

    /// Serialized columns holding text are decoded; text that does not
    /// decode is left as it is
    fn unserialize_columns(&self, entity: &mut Entity) {
        for column in self.registry.serialized_columns() {
            let decoded = match entity.get(column) {
                Some(Value::Text(text)) => self.codec.decode(text).ok(),
                _ => None,
            };
            if let Some(decoded) = decoded {
                entity.set(column, decoded);
            }
        }
    }

    fn set_defaults(&self, entity: &mut Entity) {
        if let Some(hook) = self.defaults {
            hook.set_defaults(entity);
        }
    }
}
