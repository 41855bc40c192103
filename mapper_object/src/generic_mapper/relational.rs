//! Relational backend: one SQL table per mapper

use crate::condition::Predicate;
use crate::entity::Entity;
use crate::errors::MapperError;
use crate::query_builder::filter::LogicalOperator;
use crate::query_builder::ordering::SortOrder;
use crate::query_builder::relational::SqlQuery;
use crate::schema::{drop_column_sql, ColumnDefinition, ColumnRegistry};
use crate::traits::driver::{QueryOutcome, RelationalDriver};
use crate::traits::mapper::{BackendKind, EntityMapper, MapperContext, QueryBuilder};
use std::rc::Rc;
use type_mapping::{Fields, Value};

#[derive(Debug)]
pub struct RelationalMapper {
    driver: Rc<dyn RelationalDriver>,
    table: String,
    primary_key: String,
    query: SqlQuery,
}

impl RelationalMapper {
    pub fn new(driver: Rc<dyn RelationalDriver>, table: &str, primary_key: &str) -> Self {
        Self {
            driver,
            table: table.to_string(),
            primary_key: primary_key.to_string(),
            query: SqlQuery::new(),
        }
    }

    pub fn driver(&self) -> &Rc<dyn RelationalDriver> {
        &self.driver
    }

    /// Properties that map onto physical columns, composites encoded
    fn table_data(&self, ctx: &MapperContext<'_>, entity: &Entity) -> Result<Fields, MapperError> {
        let mut row = Fields::new();
        for (column, value) in entity.fields() {
            if !ctx.registry.has_table_column(column) {
                continue;
            }
            let value = if value.is_composite() {
                Value::Text(ctx.codec.encode(value)?)
            } else {
                value.clone()
            };
            row.insert(column.clone(), value);
        }
        Ok(row)
    }

    fn write(&mut self, ctx: &mut MapperContext<'_>, entity: &mut Entity) -> Result<Option<i64>, MapperError> {
        let id = entity.get(&self.primary_key).cloned().unwrap_or(Value::Null);
        let mut row = self.table_data(ctx, entity)?;

        if id.is_truthy() && id.to_int() > 0 {
            row.shift_remove(&self.primary_key);
            self.driver.update(&self.table, &row, &self.primary_key, &id)?;
            return Ok(Some(id.to_int()));
        }

        if row.get(&self.primary_key).is_some_and(|value| !value.is_truthy()) {
            row.shift_remove(&self.primary_key);
        }
        self.driver.insert(&self.table, &row)?;
        let id = self.driver.last_insert_id().ok_or_else(|| {
            MapperError::Driver(format!("No insert id returned for {}", self.table))
        })?;
        entity.set(&self.primary_key, id);

        if let Some(stored) = self.find_by_id(ctx, id) {
            entity.merge(stored.into_fields());
        }
        Ok(Some(id))
    }

    fn first_int(&self, rows: &[Fields]) -> usize {
        rows.first()
            .and_then(|row| row.get(&self.primary_key))
            .map(Value::to_int)
            .unwrap_or(0)
            .max(0) as usize
    }
}

impl EntityMapper for RelationalMapper {
    fn kind(&self) -> BackendKind {
        BackendKind::Relational
    }

    fn table_name(&self) -> &str {
        &self.table
    }

    fn primary_key_column(&self) -> &str {
        &self.primary_key
    }

    fn query(&self) -> &dyn QueryBuilder {
        &self.query
    }

    fn query_mut(&mut self) -> &mut dyn QueryBuilder {
        &mut self.query
    }

    fn generated_query(&self, registry: &ColumnRegistry) -> String {
        self.query
            .compile(&self.table, &|column| registry.has_table_column(column))
    }

    fn introspect_columns(&self) -> Result<Vec<String>, MapperError> {
        self.driver.get_columns(&self.table)
    }

    fn fetch_rows(&mut self, ctx: &mut MapperContext<'_>, sql: Option<&str>) -> Vec<Fields> {
        let sql = match sql {
            Some(sql) => sql.to_string(),
            None => self.generated_query(ctx.registry),
        };
        if ctx.debug {
            tracing::debug!(table = %self.table, sql = %sql, "datamapper query");
        }
        debug_log!("Executing on {}: {}", self.table, sql);

        let is_select = sql
            .trim_start()
            .get(..6)
            .is_some_and(|keyword| keyword.eq_ignore_ascii_case("select"));
        if is_select {
            if let Some(rows) = ctx.cache.get(&sql) {
                trace_log!("Result cache hit for {}", sql);
                return rows;
            }
        }

        match self.driver.execute(&sql) {
            Ok(QueryOutcome::Rows(rows)) => {
                if is_select {
                    ctx.cache.cache(&sql, rows.clone());
                }
                rows
            }
            Ok(QueryOutcome::Affected(_)) => {
                if !is_select {
                    ctx.cache.flush();
                }
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(table = %self.table, error = %e, "query failed");
                Vec::new()
            }
        }
    }

    fn row_to_entity(&self, row: Fields, ctx: &MapperContext<'_>) -> Option<Entity> {
        if row.get(&self.primary_key).map_or(true, Value::is_null) {
            return None;
        }
        let mut entity = Entity::from_fields(row);
        ctx.marshaler.convert_to_entity(&mut entity);
        Some(entity)
    }

    fn count(&mut self, ctx: &mut MapperContext<'_>) -> usize {
        let sql = format!(
            "SELECT COUNT(`{key}`) AS `{key}` FROM `{table}`",
            key = self.primary_key,
            table = self.table
        );
        let rows = self.fetch_rows(ctx, Some(&sql));
        self.first_int(&rows)
    }

    fn count_where(&mut self, ctx: &mut MapperContext<'_>, predicates: Vec<Predicate>) -> usize {
        let fields = format!("COUNT(`{key}`) AS `{key}`", key = self.primary_key);
        self.query.select(Some(&fields));
        self.query.add_where_clause(predicates, LogicalOperator::And);
        let rows = self.fetch_rows(ctx, None);
        self.first_int(&rows)
    }

    fn find_last(
        &mut self,
        ctx: &mut MapperContext<'_>,
        predicates: Vec<Predicate>,
    ) -> Option<Entity> {
        let primary_key = self.primary_key.clone();
        self.query.select(None);
        self.query.add_where_clause(predicates, LogicalOperator::And);
        self.query.order_by(&primary_key, SortOrder::Desc);
        self.query.limit(1, 0);
        self.fetch_entities(ctx, None).into_iter().next()
    }

    fn save_entity(
        &mut self,
        ctx: &mut MapperContext<'_>,
        entity: &mut Entity,
    ) -> Result<Option<i64>, MapperError> {
        entity.clear_id_field();
        let outcome = self.write(ctx, entity);
        entity.set_id_field(&self.primary_key);
        ctx.cache.flush();
        outcome
    }

    fn destroy(&mut self, ctx: &mut MapperContext<'_>, id: i64) -> bool {
        let template = format!("DELETE FROM `{}` WHERE `{}` = %d", self.table, self.primary_key);
        let sql = self.driver.prepare(&template, &[Value::Int(id)]);
        debug_log!("Executing on {}: {}", self.table, sql);
        let deleted = match self.driver.execute(&sql) {
            Ok(QueryOutcome::Affected(count)) => count > 0,
            Ok(QueryOutcome::Rows(_)) => false,
            Err(e) => {
                tracing::warn!(table = %self.table, id, error = %e, "delete failed");
                false
            }
        };
        ctx.cache.flush();
        deleted
    }

    fn add_column(&self, column: &ColumnDefinition) -> Result<bool, MapperError> {
        let sql = column.add_column_sql(&self.table)?;
        debug_log!("Migrating {}: {}", self.table, sql);
        self.driver.execute(&sql)?;
        Ok(true)
    }

    fn remove_column(&self, column: &str) -> Result<bool, MapperError> {
        let sql = drop_column_sql(&self.table, column)?;
        debug_log!("Migrating {}: {}", self.table, sql);
        self.driver.execute(&sql)?;
        Ok(true)
    }
}
