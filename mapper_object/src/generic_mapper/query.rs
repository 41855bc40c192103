//! Query building, finders and the result cache

use super::core::{DataMapper, EntityRef};
use crate::condition::Conditions;
use crate::entity::Entity;
use crate::errors::MapperError;
use crate::model::Model;
use crate::query_builder::document::QueryArgs;
use crate::query_builder::filter::LogicalOperator;
use crate::query_builder::ordering::SortOrder;
use type_mapping::{Fields, Value};

impl DataMapper {
    // ========================================
    // Builder
    // ========================================

    /// Start a new SELECT, discarding the previous query state
    pub fn select(&self, fields: Option<&str>) -> &Self {
        self.inner.backend.borrow_mut().query_mut().select(fields);
        self
    }

    /// Start a new DELETE, discarding the previous query state
    pub fn delete(&self) -> &Self {
        self.inner.backend.borrow_mut().query_mut().delete();
        self
    }

    /// Add conditions joined with AND among themselves
    pub fn where_and(&self, conditions: impl Into<Conditions>) -> &Self {
        self.add_where(conditions.into(), LogicalOperator::And)
    }

    /// Add conditions joined with OR among themselves; the group is still
    /// ANDed with every other group
    pub fn where_or(&self, conditions: impl Into<Conditions>) -> &Self {
        self.add_where(conditions.into(), LogicalOperator::Or)
    }

    fn add_where(&self, conditions: Conditions, join: LogicalOperator) -> &Self {
        if !conditions.is_empty() {
            self.inner
                .backend
                .borrow_mut()
                .query_mut()
                .add_where_clause(conditions.predicates(), join);
        }
        self
    }

    pub fn order_by(&self, order_by: &str, direction: SortOrder) -> &Self {
        self.inner
            .backend
            .borrow_mut()
            .query_mut()
            .order_by(order_by, direction);
        self
    }

    pub fn limit(&self, max: i64, offset: i64) -> &Self {
        self.inner.backend.borrow_mut().query_mut().limit(max, offset);
        self
    }

    pub fn group_by(&self, columns: &[&str]) -> &Self {
        let columns: Vec<String> = columns.iter().map(|column| column.to_string()).collect();
        self.inner.backend.borrow_mut().query_mut().group_by(&columns);
        self
    }

    pub fn is_select_statement(&self) -> bool {
        self.inner.backend.borrow().query().is_select_statement()
    }

    pub fn is_delete_statement(&self) -> bool {
        self.inner.backend.borrow().query().is_delete_statement()
    }

    /// The current query as the backend would run it: SQL for tables,
    /// serialized query arguments for documents
    pub fn get_generated_query(&self) -> String {
        let registry = self.inner.registry.borrow();
        self.inner.backend.borrow().generated_query(&registry)
    }

    /// Query arguments of a document mapper
    pub fn query_args(&self) -> Option<QueryArgs> {
        self.inner.backend.borrow().query_args().cloned()
    }

    // ========================================
    // Execution
    // ========================================

    /// Run the current query, or `sql` when given, returning entities
    pub fn run_query(&self, sql: Option<&str>) -> Vec<Entity> {
        self.with_backend(|backend, ctx| backend.fetch_entities(ctx, sql))
    }

    pub fn run_query_models(&self, sql: Option<&str>) -> Vec<Model> {
        self.run_query(sql)
            .into_iter()
            .map(|entity| self.wrap_model(entity))
            .collect()
    }

    /// Run the query without entity conversion
    pub fn run_query_rows(&self, sql: Option<&str>) -> Vec<Fields> {
        self.with_backend(|backend, ctx| backend.fetch_rows(ctx, sql))
    }

    // ========================================
    // Finders
    // ========================================

    /// Find a record by primary key, or by the primary key an entity carries
    pub fn find(&self, target: impl Into<EntityRef>) -> Option<Entity> {
        let id = target.into().resolve(self.primary_key_column());
        if id <= 0 {
            return None;
        }
        self.with_backend(|backend, ctx| backend.find_by_id(ctx, id))
    }

    pub fn find_model(&self, target: impl Into<EntityRef>) -> Option<Model> {
        self.find(target).map(|entity| self.wrap_model(entity))
    }

    pub fn find_first(&self, conditions: impl Into<Conditions>) -> Option<Entity> {
        self.select(None).where_and(conditions).limit(1, 0);
        self.run_query(None).into_iter().next()
    }

    pub fn find_first_model(&self, conditions: impl Into<Conditions>) -> Option<Model> {
        self.find_first(conditions)
            .map(|entity| self.wrap_model(entity))
    }

    pub fn find_all(&self, conditions: impl Into<Conditions>) -> Vec<Entity> {
        self.select(None).where_and(conditions);
        self.run_query(None)
    }

    pub fn find_all_models(&self, conditions: impl Into<Conditions>) -> Vec<Model> {
        self.find_all(conditions)
            .into_iter()
            .map(|entity| self.wrap_model(entity))
            .collect()
    }

    pub fn find_last(&self, conditions: impl Into<Conditions>) -> Option<Entity> {
        let predicates = conditions.into().predicates();
        self.with_backend(|backend, ctx| backend.find_last(ctx, predicates))
    }

    pub fn find_last_model(&self, conditions: impl Into<Conditions>) -> Option<Model> {
        self.find_last(conditions)
            .map(|entity| self.wrap_model(entity))
    }

    /// Total number of records, ignoring any query state
    pub fn count(&self) -> usize {
        self.with_backend(|backend, ctx| backend.count(ctx))
    }

    /// Number of records matching the conditions
    pub fn count_where(&self, conditions: impl Into<Conditions>) -> usize {
        let predicates = conditions.into().predicates();
        self.with_backend(|backend, ctx| backend.count_where(ctx, predicates))
    }

    // ========================================
    // Result cache
    // ========================================

    /// Turning the cache off also empties it
    pub fn set_use_cache(&self, use_cache: bool) -> &Self {
        self.inner.cache.borrow_mut().set_enabled(use_cache);
        self
    }

    pub fn is_cache_enabled(&self) -> bool {
        self.inner.cache.borrow().is_enabled()
    }

    pub fn flush_query_cache(&self) {
        self.inner.cache.borrow_mut().flush();
    }

    pub fn cached_queries(&self) -> usize {
        self.inner.cache.borrow().len()
    }

    pub fn cache(&self, key: &str, rows: Vec<Fields>) {
        self.inner.cache.borrow_mut().cache(key, rows);
    }

    pub fn get_from_cache(&self, key: &str, default: Vec<Fields>) -> Vec<Fields> {
        self.inner.cache.borrow().get_or(key, default)
    }

    // ========================================
    // Codec
    // ========================================

    pub fn serialize(&self, value: &Value) -> Result<String, MapperError> {
        self.inner.codec.encode(value)
    }

    pub fn unserialize(&self, text: &str) -> Result<Value, MapperError> {
        self.inner.codec.decode(text)
    }
}
