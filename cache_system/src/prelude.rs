//! Convenience re-exports for common cache-system usage

// Core cache system components
pub use crate::errors::CacheError;
pub use crate::manager::{CacheManager, TransientCache};
pub use crate::memory::MemoryCache;
pub use crate::query_cache::{QueryCache, fingerprint};
pub use crate::redis_store::RedisCache;

// Re-export centralized config
pub use config::CacheConfig;
