//! Per-mapper result cache
//!
//! Maps a compiled query (SQL text or a fingerprint of the document-store
//! arguments) to the raw rows it produced. The cache belongs to one mapper
//! instance and is cleared wholesale on every write through that mapper.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Generate a stable hex fingerprint for query parameters
pub fn fingerprint<T: Hash + ?Sized>(query: &T) -> String {
    let mut hasher = DefaultHasher::new();
    query.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}

#[derive(Debug, Clone)]
pub struct QueryCache<V> {
    enabled: bool,
    entries: HashMap<String, V>,
}

impl<V: Clone> QueryCache<V> {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: HashMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turning the cache off also drops everything cached so far
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.entries.clear();
        }
    }

    /// Store results under a key; no-op while disabled
    pub fn cache(&mut self, key: &str, value: V) {
        if self.enabled {
            self.entries.insert(key.to_string(), value);
        }
    }

    /// Cached results for a key, if caching is enabled and the key is present
    pub fn get(&self, key: &str) -> Option<V> {
        if self.enabled {
            self.entries.get(key).cloned()
        } else {
            None
        }
    }

    /// Cached results for a key or the provided default
    pub fn get_or(&self, key: &str, default: V) -> V {
        self.get(key).unwrap_or(default)
    }

    pub fn flush(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_cache_is_a_no_op() {
        let mut cache = QueryCache::new(false);
        cache.cache("SELECT 1", vec![1]);
        assert!(cache.is_empty());
        assert_eq!(cache.get("SELECT 1"), None);
        assert_eq!(cache.get_or("SELECT 1", vec![9]), vec![9]);
    }

    #[test]
    fn test_flush_clears_everything() {
        let mut cache = QueryCache::new(true);
        cache.cache("a", vec![1]);
        cache.cache("b", vec![2]);
        assert_eq!(cache.get("a"), Some(vec![1]));

        cache.flush();
        assert!(cache.is_empty());
        assert_eq!(cache.get("b"), None);
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let first = fingerprint(r#"{"post_type":"ngg_album"}"#);
        let second = fingerprint(r#"{"post_type":"ngg_album"}"#);
        let other = fingerprint(r#"{"post_type":"ngg_gallery"}"#);
        assert_eq!(first, second);
        assert_ne!(first, other);
    }
}
