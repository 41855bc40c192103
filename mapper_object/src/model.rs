//! Model - a mutable record bound to the mapper that loads and saves it

use crate::entity::Entity;
use crate::errors::MapperError;
use crate::generic_mapper::DataMapper;
use crate::traits::validation::{FieldError, Validation};
use serde::{Serialize, Serializer};
use std::fmt;
use type_mapping::{Fields, Value};

/// Property access over one entity plus save/destroy through its mapper.
/// Changes stay local until [`Model::save`].
#[derive(Clone)]
pub struct Model {
    mapper: DataMapper,
    entity: Entity,
    errors: Vec<FieldError>,
}

impl Model {
    /// Wrap an entity; the mapper's defaults are applied unless they already were
    pub fn new(mapper: DataMapper, mut entity: Entity) -> Self {
        if !entity.has_default_values() {
            mapper.set_defaults(&mut entity);
            entity.mark_defaults_set();
        }
        if entity.id_field().is_none() {
            entity.set_id_field(mapper.primary_key_column());
        }
        Self {
            mapper,
            entity,
            errors: Vec::new(),
        }
    }

    pub fn mapper(&self) -> &DataMapper {
        &self.mapper
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }

    pub fn into_entity(self) -> Entity {
        self.entity
    }

    pub fn get(&self, property: &str) -> Option<&Value> {
        self.entity.get(property)
    }

    pub fn set(&mut self, property: &str, value: impl Into<Value>) -> &mut Self {
        self.entity.set(property, value);
        self
    }

    pub fn contains(&self, property: &str) -> bool {
        self.entity.contains(property)
    }

    pub fn update_attributes(&mut self, updates: Fields) -> &mut Self {
        self.entity.merge(updates);
        self
    }

    /// Apply `updates` and persist through the mapper
    pub fn save(&mut self, updates: Fields) -> Result<Option<i64>, MapperError> {
        self.update_attributes(updates);
        let mapper = self.mapper.clone();
        mapper.save_model(self)
    }

    pub fn destroy(&self) -> bool {
        self.mapper.destroy(&self.entity)
    }

    pub fn id(&self) -> Option<&Value> {
        self.entity.get(self.mapper.primary_key_column())
    }

    pub fn set_id(&mut self, id: impl Into<Value>) -> &mut Self {
        let key = self.mapper.primary_key_column().to_string();
        self.entity.set(&key, id);
        self
    }

    /// No usable primary key yet
    pub fn is_new(&self) -> bool {
        !self.id().is_some_and(Value::is_truthy)
    }

    pub fn has_default_values(&self) -> bool {
        self.entity.has_default_values()
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.entity.to_json()
    }
}

impl Validation for Model {
    fn validate(&mut self) -> bool {
        self.errors = self.mapper.validate_entity(&self.entity);
        self.errors.is_empty()
    }

    fn is_valid(&self) -> bool {
        self.mapper.validate_entity(&self.entity).is_empty()
    }

    fn get_errors(&self) -> &[FieldError] {
        &self.errors
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("object_name", &self.mapper.object_name())
            .field("entity", &self.entity)
            .field("errors", &self.errors)
            .finish()
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entity.serialize(serializer)
    }
}
