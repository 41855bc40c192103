//! Storage driver interfaces

use crate::errors::MapperError;
use crate::query_builder::document::QueryArgs;
use crate::query_builder::prepare::prepare;
use std::fmt::Debug;
use type_mapping::{sql_literal, Fields, Value};

/// Result of executing one SQL statement
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Rows(Vec<Fields>),
    Affected(u64),
}

/// Relational database connection used by SQL-table mappers
pub trait RelationalDriver: Debug {
    /// Execute a complete SQL statement
    fn execute(&self, sql: &str) -> Result<QueryOutcome, MapperError>;

    /// Substitute `%s`/`%d`/`%f` placeholders
    fn prepare(&self, template: &str, args: &[Value]) -> String {
        prepare(template, args)
    }

    /// Primary key generated by the most recent insert
    fn last_insert_id(&self) -> Option<i64>;

    /// Column names of a table, in table order
    fn get_columns(&self, table: &str) -> Result<Vec<String>, MapperError>;

    /// Name of the table's primary-key column, if it has one
    fn primary_key_column(&self, table: &str) -> Result<Option<String>, MapperError>;

    /// Insert one row, returning the number of rows written
    fn insert(&self, table: &str, row: &Fields) -> Result<u64, MapperError> {
        let columns: Vec<String> = row.keys().map(|column| format!("`{}`", column)).collect();
        let values: Vec<String> = row.values().map(sql_literal).collect();
        let sql = format!(
            "INSERT INTO `{}` ({}) VALUES ({})",
            table,
            columns.join(", "),
            values.join(", ")
        );
        match self.execute(&sql)? {
            QueryOutcome::Affected(count) => Ok(count),
            QueryOutcome::Rows(_) => Ok(0),
        }
    }

    /// Update the row whose `key_column` equals `key`, returning the number of rows changed
    fn update(
        &self,
        table: &str,
        row: &Fields,
        key_column: &str,
        key: &Value,
    ) -> Result<u64, MapperError> {
        if row.is_empty() {
            return Ok(0);
        }
        let assignments: Vec<String> = row
            .iter()
            .map(|(column, value)| format!("`{}` = {}", column, sql_literal(value)))
            .collect();
        let sql = format!(
            "UPDATE `{}` SET {} WHERE `{}` = {}",
            table,
            assignments.join(", "),
            key_column,
            sql_literal(key)
        );
        match self.execute(&sql)? {
            QueryOutcome::Affected(count) => Ok(count),
            QueryOutcome::Rows(_) => Ok(0),
        }
    }
}

/// Document store holding typed documents in a shared table
pub trait DocumentStore: Debug {
    /// Run a query. `pre_dispatch` is applied to the store's working copy of
    /// the arguments immediately before execution, after any rewriting the
    /// store itself performs.
    fn query(
        &self,
        args: &QueryArgs,
        pre_dispatch: &mut dyn FnMut(&mut QueryArgs),
    ) -> Result<Vec<Fields>, MapperError>;

    /// Insert a document, or update it when it carries an `ID`. Returns the document id.
    fn save_document(&self, document: &Fields) -> Result<i64, MapperError>;

    /// Remove a document permanently
    fn delete_document(&self, id: i64) -> Result<bool, MapperError>;

    /// Column names of the shared document table
    fn native_columns(&self) -> Result<Vec<String>, MapperError>;
}

/// One metadata row
#[derive(Debug, Clone, PartialEq)]
pub struct MetaRow {
    pub owner_id: i64,
    pub key: String,
    pub value: String,
}

/// Side table of key/value pairs attached to documents
pub trait MetadataStore: Debug {
    fn delete_by_owner(&self, owner_id: i64) -> Result<u64, MapperError>;
    fn bulk_insert(&self, rows: &[MetaRow]) -> Result<u64, MapperError>;
}
