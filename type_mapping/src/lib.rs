//! Unified value model shared by every datamapper crate
//!
//! Entities are open-ended property bags whose columns are declared at runtime,
//! so their values are carried as a tagged union rather than typed struct fields.
//! This crate also owns the mapping from declared SQL column types to the casts
//! applied when rows are marshaled into entities.

pub mod serialize;
pub mod sql;
pub mod types;
pub mod validate;

pub use serialize::{fields_from_json, fields_to_json};
pub use sql::{cast_kind, cast_value, sql_literal, CastKind};
pub use types::{Fields, Value};
pub use validate::{is_numeric_str, parse_leading_float, parse_leading_int};
