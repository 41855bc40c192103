//! Cache manager implementation
//!
//! `CacheManager` is the mapper-facing handle to the transient cache. It owns
//! key construction and JSON (de)serialization; the storage itself is any
//! `TransientCache` backend.

use crate::errors::CacheError;
use crate::memory::MemoryCache;
use crate::redis_store::RedisCache;
use config::CacheConfig;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

/// Raw key/value storage for short-lived lookups
pub trait TransientCache: Send + Sync + Debug {
    /// Fetch the stored string for a key
    fn fetch(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a string under a key, replacing any previous value
    fn update(&self, key: &str, value: &str, ttl: u64) -> Result<(), CacheError>;

    /// Remove a key, returning whether it existed
    fn delete(&self, key: &str) -> Result<bool, CacheError>;
}

/// Namespaced, typed access to a transient cache
#[derive(Clone, Debug)]
pub struct CacheManager {
    store: Arc<dyn TransientCache>,
    config: Arc<CacheConfig>,
}

impl CacheManager {
    /// Create a cache manager over an existing store
    pub fn new(store: Arc<dyn TransientCache>, config: CacheConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Pick the backend from configuration: Redis when enabled, otherwise in-process
    pub fn from_config(config: CacheConfig) -> Result<Self, CacheError> {
        let store: Arc<dyn TransientCache> = if config.enabled {
            Arc::new(RedisCache::new(&config.redis_url)?)
        } else {
            Arc::new(MemoryCache::new())
        };
        Ok(Self::new(store, config))
    }

    /// In-process cache with default settings
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCache::new()), CacheConfig::in_memory())
    }

    /// Build the namespaced key for a named entry within a purpose group
    pub fn create_key(&self, name: &str, group: &str) -> String {
        format!("{}:{}:{}", self.config.key_prefix, group, name)
    }

    /// Fetch and decode a cached value
    pub fn fetch<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        match self.store.fetch(key)? {
            Some(json_str) => Ok(Some(serde_json::from_str(&json_str)?)),
            None => Ok(None),
        }
    }

    /// Encode and store a value with the configured TTL
    pub fn update<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json_str = serde_json::to_string(value)?;
        self.store.update(key, &json_str, self.config.default_ttl)
    }

    /// Remove a cached value
    pub fn delete(&self, key: &str) -> Result<bool, CacheError> {
        self.store.delete(key)
    }

    /// Get current configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaced_keys() {
        let manager = CacheManager::in_memory();
        assert_eq!(
            manager.create_key("col_in_wp_ngg_gallery", "columns"),
            "datamapper:columns:col_in_wp_ngg_gallery"
        );
    }

    #[test]
    fn test_typed_round_trip() {
        let manager = CacheManager::in_memory();
        let key = manager.create_key("col_in_wp_pictures", "columns");
        assert_eq!(manager.fetch::<Vec<String>>(&key).unwrap(), None);

        let columns = vec!["pid".to_string(), "filename".to_string()];
        manager.update(&key, &columns).unwrap();
        assert_eq!(manager.fetch::<Vec<String>>(&key).unwrap(), Some(columns));

        assert!(manager.delete(&key).unwrap());
        assert_eq!(manager.fetch::<Vec<String>>(&key).unwrap(), None);
    }
}
