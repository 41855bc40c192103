//! Saving, destroying and entity conversion

use super::core::{DataMapper, EntityRef};
use crate::entity::Entity;
use crate::errors::MapperError;
use crate::marshal::EntityMarshaler;
use crate::model::Model;
use crate::traits::marshaler::Marshaler;
use crate::traits::validation::{FieldError, Validation};
use type_mapping::Fields;

impl DataMapper {
    /// Validate and persist an entity, returning its primary key.
    ///
    /// The entity is marshaled first, so what gets written is cast and
    /// carries the declared defaults. It is updated in place with the
    /// assigned key and whatever the storage filled in. `Ok(None)` means
    /// validation failed or the storage rejected the write; the failure is
    /// logged and [`DataMapper::get_errors`] explains validation problems.
    pub fn save(&self, entity: &mut Entity) -> Result<Option<i64>, MapperError> {
        self.flush_query_cache();

        let mut record = entity.clone();
        record.clear_defaults_marker();
        let mut model = self.convert_to_model(record);
        if !model.validate() {
            debug_log!(
                "Not saving invalid {}: {} error(s)",
                self.object_name(),
                model.get_errors().len()
            );
            self.flush_query_cache();
            return Ok(None);
        }

        let mut record = model.into_entity();
        let outcome = self.with_backend(|backend, ctx| backend.save_entity(ctx, &mut record));
        self.flush_query_cache();

        match outcome {
            Ok(id) => {
                *entity = record;
                Ok(id)
            }
            Err(MapperError::Driver(message)) => {
                tracing::warn!(object = %self.object_name(), error = %message, "save failed");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Save the entity a model wraps; the model keeps its validation errors
    pub fn save_model(&self, model: &mut Model) -> Result<Option<i64>, MapperError> {
        if !model.validate() {
            self.flush_query_cache();
            return Ok(None);
        }
        self.save(model.entity_mut())
    }

    /// Save a record given as JSON. Anything but a JSON object is rejected.
    pub fn save_json(&self, record: serde_json::Value) -> Result<Option<i64>, MapperError> {
        let mut entity = Entity::try_from(record)?;
        self.save(&mut entity)
    }

    /// Delete a record by primary key, or by the key an entity carries
    pub fn destroy(&self, target: impl Into<EntityRef>) -> bool {
        self.flush_query_cache();
        let id = target.into().resolve(self.primary_key_column());
        let destroyed = if id > 0 {
            self.with_backend(|backend, ctx| backend.destroy(ctx, id))
        } else {
            false
        };
        self.flush_query_cache();
        destroyed
    }

    /// Validation errors the entity would produce on save
    pub fn get_errors(&self, entity: &Entity) -> Vec<FieldError> {
        let mut model = self.convert_to_model(entity.clone());
        model.validate();
        model.get_errors().to_vec()
    }

    pub(crate) fn validate_entity(&self, entity: &Entity) -> Vec<FieldError> {
        match &self.inner.validator {
            Some(validator) => validator.validate(entity),
            None => Vec::new(),
        }
    }

    /// Marshal an entity and wrap it in a model; defaults are applied once
    pub fn convert_to_model(&self, mut entity: Entity) -> Model {
        self.convert_to_entity(&mut entity);
        self.wrap_model(entity)
    }

    /// Wrap an entity that already went through the read path
    pub(crate) fn wrap_model(&self, entity: Entity) -> Model {
        Model::new(self.clone(), entity)
    }

    /// Build a model from plain properties
    pub fn create(&self, properties: Fields) -> Model {
        self.convert_to_model(Entity::from_fields(properties))
    }

    /// Run the marshaling pipeline: cast, strip slashes, decode serialized
    /// columns and apply defaults once
    pub fn convert_to_entity(&self, entity: &mut Entity) {
        let registry = self.inner.registry.borrow();
        let marshaler = EntityMarshaler {
            registry: &registry,
            codec: self.inner.codec.as_ref(),
            primary_key: self.primary_key_column(),
            defaults: self.inner.defaults.as_deref(),
        };
        marshaler.convert_to_entity(entity);
    }

    /// Run the defaults hook unconditionally
    pub fn set_defaults(&self, entity: &mut Entity) {
        if let Some(hook) = &self.inner.defaults {
            hook.set_defaults(entity);
        }
    }
}
