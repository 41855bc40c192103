//! Storage drivers
//!
//! The in-memory drivers keep everything in process and understand exactly
//! the statements and query arguments the mappers generate. They are meant
//! for tests and are compiled in with the `testing` feature. The MySQL driver
//! is available behind the `mysql` feature.

#[cfg(any(test, feature = "testing"))]
mod matching;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
#[cfg(any(test, feature = "testing"))]
pub mod memory_document;
#[cfg(feature = "mysql")]
pub mod mysql;

#[cfg(any(test, feature = "testing"))]
pub use memory::MemoryDriver;
#[cfg(any(test, feature = "testing"))]
pub use memory_document::MemoryDocumentStore;
#[cfg(feature = "mysql")]
pub use mysql::MySqlDriver;
