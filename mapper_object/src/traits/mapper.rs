//! Backend strategy interfaces

use crate::codec::Codec;
use crate::condition::{parse_condition, Predicate};
use crate::entity::Entity;
use crate::errors::MapperError;
use crate::query_builder::document::QueryArgs;
use crate::query_builder::filter::LogicalOperator;
use crate::query_builder::ordering::SortOrder;
use crate::schema::{ColumnDefinition, ColumnRegistry};
use crate::traits::marshaler::Marshaler;
use cache_system::QueryCache;
use std::fmt::Debug;
use type_mapping::{Fields, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Relational,
    Document,
}

/// Query-state operations shared by both backends
pub trait QueryBuilder: Debug {
    /// Start a fresh SELECT; `None` or `"*"` selects every column
    fn select(&mut self, fields: Option<&str>);
    /// Start a fresh DELETE
    fn delete(&mut self);
    fn add_where_clause(&mut self, predicates: Vec<Predicate>, join: LogicalOperator);
    fn order_by(&mut self, order_by: &str, direction: SortOrder);
    fn limit(&mut self, max: i64, offset: i64);
    fn group_by(&mut self, columns: &[String]);
    fn is_select_statement(&self) -> bool;
    fn is_delete_statement(&self) -> bool;
}

/// What a backend borrows from its mapper for the duration of one operation
pub struct MapperContext<'a> {
    pub object_name: &'a str,
    pub registry: &'a ColumnRegistry,
    pub codec: &'a dyn Codec,
    pub marshaler: &'a dyn Marshaler,
    pub cache: &'a mut QueryCache<Vec<Fields>>,
    pub debug: bool,
}

/// Storage strategy behind a mapper
pub trait EntityMapper: Debug {
    fn kind(&self) -> BackendKind;
    fn table_name(&self) -> &str;
    fn primary_key_column(&self) -> &str;

    fn query(&self) -> &dyn QueryBuilder;
    fn query_mut(&mut self) -> &mut dyn QueryBuilder;

    /// Current query rendered as text: SQL, or the serialized query arguments
    fn generated_query(&self, registry: &ColumnRegistry) -> String;

    /// Structured query arguments, for backends that dispatch them
    fn query_args(&self) -> Option<&QueryArgs> {
        None
    }

    /// Ask the storage for the table's column list
    fn introspect_columns(&self) -> Result<Vec<String>, MapperError>;

    /// Execute the current query (or `sql`, when given) and return raw rows.
    /// Storage failures are logged and yield no rows.
    fn fetch_rows(&mut self, ctx: &mut MapperContext<'_>, sql: Option<&str>) -> Vec<Fields>;

    /// Turn one raw row into an entity; rows that cannot be identified are dropped
    fn row_to_entity(&self, row: Fields, ctx: &MapperContext<'_>) -> Option<Entity>;

    /// Total number of stored records, ignoring any filters
    fn count(&mut self, ctx: &mut MapperContext<'_>) -> usize;

    /// Number of records matching the predicates
    fn count_where(&mut self, ctx: &mut MapperContext<'_>, predicates: Vec<Predicate>) -> usize;

    fn find_last(&mut self, ctx: &mut MapperContext<'_>, predicates: Vec<Predicate>)
        -> Option<Entity>;

    /// Insert or update; the entity is refreshed in place and its id returned
    fn save_entity(
        &mut self,
        ctx: &mut MapperContext<'_>,
        entity: &mut Entity,
    ) -> Result<Option<i64>, MapperError>;

    fn destroy(&mut self, ctx: &mut MapperContext<'_>, id: i64) -> bool;

    fn add_column(&self, _column: &ColumnDefinition) -> Result<bool, MapperError> {
        Ok(false)
    }

    fn remove_column(&self, _column: &str) -> Result<bool, MapperError> {
        Ok(false)
    }

    fn fetch_entities(&mut self, ctx: &mut MapperContext<'_>, sql: Option<&str>) -> Vec<Entity> {
        let rows = self.fetch_rows(ctx, sql);
        rows.into_iter()
            .filter_map(|row| self.row_to_entity(row, ctx))
            .collect()
    }

    fn find_by_id(&mut self, ctx: &mut MapperContext<'_>, id: i64) -> Option<Entity> {
        let condition = format!("{} = %d", self.primary_key_column());
        let query = self.query_mut();
        query.select(None);
        query.add_where_clause(
            vec![parse_condition(&condition, &[Value::Int(id)])],
            LogicalOperator::And,
        );
        query.limit(1, 0);
        self.fetch_entities(ctx, None).into_iter().next()
    }
}
