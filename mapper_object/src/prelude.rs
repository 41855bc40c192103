//! Convenience re-exports for common mapper usage

// Mapper and model
pub use crate::generic_mapper::{DataMapper, EntityRef, MapperBuilder};
pub use crate::model::Model;
pub use crate::entity::Entity;

// Hooks
pub use crate::traits::{DefaultsHook, EntityValidator, FieldError, RequiredFields, Validation};

// Drivers
#[cfg(any(test, feature = "testing"))]
pub use crate::drivers::{MemoryDocumentStore, MemoryDriver};
pub use crate::traits::{DocumentStore, MetadataStore, RelationalDriver};

// Error types
pub use crate::errors::MapperError;

// Query building
pub use crate::condition::{Condition, Conditions};
pub use crate::query_builder::SortOrder;

// Values
pub use type_mapping::{Fields, Value};
