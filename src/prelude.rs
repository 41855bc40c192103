//! Convenience re-exports for common datamapper usage
//!
//! # Example
//!
//! ```rust
//! use datamapper::prelude::*;
//! ```

// Factory and errors
pub use crate::core::DataMapperFactory;
pub use crate::errors::DataMapperError;

// Re-export centralized config
pub use config::{AppConfig, CacheConfig, DatabaseConfig, MapperConfig};

// Mapper, model, drivers and values
pub use mapper_object::prelude::*;

// Transient cache
pub use cache_system::prelude::*;
