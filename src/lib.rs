//! # datamapper
//!
//! Map loosely-typed records onto relational tables or onto documents in a
//! shared posts table with per-document metadata. Conditions are written as
//! SQL fragments with `%s`/`%d`/`%f` placeholders, declared columns are
//! migrated automatically and query results are cached per mapper until the
//! next write.
//!
//! ## Quick Start
//!
//! The in-memory drivers below need the `testing` feature.
//!
//! ```rust
//! use datamapper::prelude::*;
//! use std::rc::Rc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let driver = Rc::new(MemoryDriver::new());
//! driver.create_table("wp_books", &["id", "title"], Some("id"));
//!
//! let factory = DataMapperFactory::new(MapperConfig::default(), CacheManager::in_memory());
//! let books = factory
//!     .relational("books", driver)
//!     .column("pages", "INT", 0)
//!     .build()?;
//!
//! let mut book = books.create(Fields::new()).into_entity();
//! book.set("title", "Dune").set("pages", "412");
//! let id = books.save(&mut book)?;
//! assert!(id.is_some());
//!
//! let found = books.find_first(("pages > %d", 400)).expect("book");
//! assert_eq!(found.get("pages"), Some(&Value::Int(412)));
//! # Ok(())
//! # }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod core;
pub mod errors;
pub mod migration;
pub mod prelude;

// Re-export the main public types for convenience
pub use core::DataMapperFactory;
pub use errors::DataMapperError;

// Re-export centralized config
pub use config::{AppConfig, CacheConfig, DatabaseConfig, MapperConfig};

// Re-export internal crates
pub use cache_system;
pub use mapper_object;
pub use type_mapping;
