//! In-process transient cache
//!
//! Entries live for the lifetime of the process; TTLs are ignored.

use crate::errors::CacheError;
use crate::manager::TransientCache;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TransientCache for MemoryCache {
    fn fetch(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| CacheError::Poisoned(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn update(&self, key: &str, value: &str, _ttl: u64) -> Result<(), CacheError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| CacheError::Poisoned(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| CacheError::Poisoned(e.to_string()))?;
        Ok(entries.remove(key).is_some())
    }
}
