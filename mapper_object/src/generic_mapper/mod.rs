//! Mappers
//!
//! [`DataMapper`] is the public handle. It owns the query state, column
//! registry and result cache, and delegates storage to a backend strategy
//! chosen at construction: [`RelationalMapper`] for a SQL table or
//! [`DocumentMapper`] for documents in the shared posts table.

pub mod core;
pub mod document;
pub mod persistence;
pub mod query;
pub mod relational;
pub mod schema;

#[cfg(test)]
mod tests;

pub use core::{DataMapper, EntityRef, MapperBuilder};
pub use document::{DocumentMapper, DOCUMENT_PRIMARY_KEY, MAX_OBJECT_NAME_LENGTH};
pub use relational::RelationalMapper;
