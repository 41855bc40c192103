//! Core factory functionality
//!
//! This module contains the mapper factory, which builds mappers from one
//! shared configuration and keeps them registered by name.

use std::collections::HashMap;
use std::rc::Rc;

use cache_system::CacheManager;
use config::{AppConfig, MapperConfig};
use mapper_object::{DataMapper, DocumentStore, MapperBuilder, MetadataStore, RelationalDriver};

use crate::errors::DataMapperError;

/// Builds mappers with a shared configuration and keeps a named registry of them
pub struct DataMapperFactory {
    config: MapperConfig,
    cache_manager: CacheManager,
    mappers: HashMap<String, DataMapper>,
}

impl DataMapperFactory {
    pub fn new(config: MapperConfig, cache_manager: CacheManager) -> Self {
        Self {
            config,
            cache_manager,
            mappers: HashMap::new(),
        }
    }

    /// Create a factory from application configuration; the transient cache
    /// connects to Redis when the cache section is enabled
    pub fn from_app_config(config: &AppConfig) -> Result<Self, DataMapperError> {
        let cache_manager = CacheManager::from_config(config.cache.clone())?;
        Ok(Self::new(config.mapper.clone(), cache_manager))
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn cache_manager(&self) -> &CacheManager {
        &self.cache_manager
    }

    /// Start a relational mapper preconfigured with the shared settings
    pub fn relational(&self, object_name: &str, driver: Rc<dyn RelationalDriver>) -> MapperBuilder {
        DataMapper::relational(object_name, driver)
            .config(self.config.clone())
            .cache_manager(self.cache_manager.clone())
    }

    /// Start a document mapper preconfigured with the shared settings
    pub fn document(
        &self,
        object_name: &str,
        store: Rc<dyn DocumentStore>,
        meta: Rc<dyn MetadataStore>,
    ) -> MapperBuilder {
        DataMapper::document(object_name, store, meta)
            .config(self.config.clone())
            .cache_manager(self.cache_manager.clone())
    }

    /// Register a mapper under a name
    pub fn register(&mut self, name: &str, mapper: DataMapper) -> Result<(), DataMapperError> {
        if self.mappers.contains_key(name) {
            return Err(DataMapperError::MapperAlreadyRegistered(name.to_string()));
        }

        debug_log!("Registering mapper '{}' for {}", name, mapper.table_name());
        self.mappers.insert(name.to_string(), mapper);
        Ok(())
    }

    /// Get a registered mapper by name
    pub fn get(&self, name: &str) -> Result<&DataMapper, DataMapperError> {
        self.mappers
            .get(name)
            .ok_or_else(|| DataMapperError::MapperNotFound(name.to_string()))
    }

    /// List all registered mapper names, sorted
    pub fn list(&self) -> Vec<&String> {
        let mut names: Vec<&String> = self.mappers.keys().collect();
        names.sort();
        names
    }

    /// Remove a mapper by name, handing it back
    pub fn unregister(&mut self, name: &str) -> Result<DataMapper, DataMapperError> {
        self.mappers
            .remove(name)
            .ok_or_else(|| DataMapperError::MapperNotFound(name.to_string()))
    }

    pub(crate) fn mappers(&self) -> impl Iterator<Item = (&String, &DataMapper)> {
        self.mappers.iter()
    }
}
