//! Mapper Object - core of the datamapper
//!
//! This crate provides the condition parser, the relational and document
//! query builders, the column registry and migrator, entity marshaling and
//! the [`DataMapper`] / [`Model`] pair built on top of them.

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

pub mod codec;
pub mod condition;
pub mod drivers;
pub mod entity;
pub mod errors;
pub mod generic_mapper;
pub mod marshal;
pub mod model;
pub mod prelude;
pub mod query_builder;
pub mod schema;
pub mod traits;
pub mod validation;

pub use codec::{Codec, JsonCodec};
pub use condition::{parse_condition, CompareOp, Condition, Conditions, Predicate, PredicateValue, ValueKind};
#[cfg(any(test, feature = "testing"))]
pub use drivers::{MemoryDocumentStore, MemoryDriver};
#[cfg(feature = "mysql")]
pub use drivers::MySqlDriver;
pub use entity::Entity;
pub use errors::MapperError;
pub use generic_mapper::{DataMapper, DocumentMapper, EntityRef, MapperBuilder, RelationalMapper};
pub use marshal::{set_default_array_value, set_default_value, strip_slashes, EntityMarshaler};
pub use model::Model;
pub use query_builder::{DocumentQuery, LogicalOperator, QueryArgs, SortOrder, SqlQuery};
pub use schema::{ColumnDefinition, ColumnRegistry};
pub use traits::*;
pub use validation::{ValidatedColumnName, ValidatedTableName, ValidationError};
