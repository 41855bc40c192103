//! Query builders
//!
//! Both backends accumulate the same operations (select/delete, where
//! groups, ordering, paging, grouping) through the [`QueryBuilder`] trait but
//! compile them differently: SQL text for tables, query arguments for the
//! document store.

pub mod document;
pub mod filter;
pub mod ordering;
pub mod prepare;
pub mod relational;
pub mod sql_generation;

#[cfg(test)]
mod tests;

pub use crate::traits::mapper::QueryBuilder;
pub use document::{DocumentQuery, MetaClause, MetaGroup, QueryArgs};
pub use filter::{LogicalOperator, PredicateGroup};
pub use ordering::{OrderTerm, SortOrder};
pub use prepare::prepare;
pub use relational::{SqlQuery, Statement};
pub use sql_generation::SqlGenerator;
