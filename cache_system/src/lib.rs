//! Cache system for mapper query results and transient lookups
//!
//! Two layers live here: the per-mapper result cache that maps a compiled
//! query fingerprint to its raw rows, and the transient key/value cache
//! (in-process or Redis) that survives across mapper instances.

pub mod errors;
pub mod manager;
pub mod memory;
pub mod prelude;
pub mod query_cache;
pub mod redis_store;

// Re-export centralized config
pub use config::CacheConfig;

pub use errors::CacheError;
pub use manager::{CacheManager, TransientCache};
pub use memory::MemoryCache;
pub use query_cache::{QueryCache, fingerprint};
pub use redis_store::RedisCache;
