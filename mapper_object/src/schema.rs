//! Declared columns and the introspected table layout

use crate::errors::MapperError;
use crate::validation::{ValidatedColumnName, ValidatedTableName};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use type_mapping::{cast_kind, sql_literal, CastKind, Value};

/// A column the mapper expects its table to have
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub sql_type: String,
    pub default_value: Value,
}

impl ColumnDefinition {
    pub fn new(name: &str, sql_type: &str, default_value: impl Into<Value>) -> Self {
        Self {
            name: name.to_string(),
            sql_type: sql_type.to_string(),
            default_value: default_value.into(),
        }
    }

    pub fn cast_kind(&self) -> CastKind {
        cast_kind(&self.sql_type)
    }

    /// `ALTER TABLE ... ADD COLUMN` statement; a truthy default makes the column NOT NULL
    pub fn add_column_sql(&self, table: &str) -> Result<String, MapperError> {
        let table = ValidatedTableName::new(table)?;
        let column = ValidatedColumnName::new(&self.name)?;
        let mut sql = format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            table.quoted(),
            column.quoted(),
            self.sql_type
        );
        if self.default_value.is_truthy() && !self.default_value.is_composite() {
            sql.push_str(" NOT NULL DEFAULT ");
            sql.push_str(&sql_literal(&self.default_value));
        }
        Ok(sql)
    }
}

/// `ALTER TABLE ... DROP COLUMN` statement
pub fn drop_column_sql(table: &str, column: &str) -> Result<String, MapperError> {
    let table = ValidatedTableName::new(table)?;
    let column = ValidatedColumnName::new(column)?;
    Ok(format!(
        "ALTER TABLE {} DROP COLUMN {}",
        table.quoted(),
        column.quoted()
    ))
}

/// Per-mapper column bookkeeping: what was declared, what is serialized and
/// what the table actually has
#[derive(Debug, Clone, Default)]
pub struct ColumnRegistry {
    columns: IndexMap<String, ColumnDefinition>,
    serialized: Vec<String>,
    table_columns: Vec<String>,
}

impl ColumnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a column; redeclaring replaces the earlier definition
    pub fn define_column(&mut self, definition: ColumnDefinition) {
        self.columns.insert(definition.name.clone(), definition);
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.values()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.get(name)
    }

    pub fn get_defined_column_names(&self) -> Vec<String> {
        self.columns.keys().cloned().collect()
    }

    pub fn has_defined_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn add_serialized_column(&mut self, name: &str) {
        if !self.serialized.iter().any(|column| column == name) {
            self.serialized.push(name.to_string());
        }
    }

    pub fn serialized_columns(&self) -> &[String] {
        &self.serialized
    }

    pub fn is_serialized(&self, name: &str) -> bool {
        self.serialized.iter().any(|column| column == name)
    }

    pub fn table_columns(&self) -> &[String] {
        &self.table_columns
    }

    pub fn set_table_columns(&mut self, columns: Vec<String>) {
        self.table_columns = columns;
    }

    pub fn has_table_column(&self, name: &str) -> bool {
        self.table_columns.iter().any(|column| column == name)
    }

    /// Declared columns the table does not have yet
    pub fn missing_columns(&self) -> Vec<ColumnDefinition> {
        self.columns
            .values()
            .filter(|definition| !self.has_table_column(&definition.name))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_column_sql() {
        let plain = ColumnDefinition::new("title", "varchar(255)", Value::Null);
        assert_eq!(
            plain.add_column_sql("wp_ngg_gallery").unwrap(),
            "ALTER TABLE `wp_ngg_gallery` ADD COLUMN `title` varchar(255)"
        );

        let with_default = ColumnDefinition::new("status", "varchar(20)", "it's draft");
        assert_eq!(
            with_default.add_column_sql("wp_ngg_gallery").unwrap(),
            r"ALTER TABLE `wp_ngg_gallery` ADD COLUMN `status` varchar(20) NOT NULL DEFAULT 'it\'s draft'"
        );

        let numeric = ColumnDefinition::new("sortorder", "bigint", 10);
        assert!(numeric
            .add_column_sql("wp_pictures")
            .unwrap()
            .ends_with("NOT NULL DEFAULT 10"));

        // falsy defaults never force NOT NULL
        let zero = ColumnDefinition::new("exclude", "tinyint", 0);
        assert!(!zero.add_column_sql("wp_pictures").unwrap().contains("DEFAULT"));
    }

    #[test]
    fn test_add_column_sql_rejects_bad_identifiers() {
        let bad = ColumnDefinition::new("name`; DROP", "text", Value::Null);
        assert!(matches!(
            bad.add_column_sql("wp_pictures"),
            Err(MapperError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_registry_bookkeeping() {
        let mut registry = ColumnRegistry::new();
        registry.define_column(ColumnDefinition::new("pid", "bigint", Value::Null));
        registry.define_column(ColumnDefinition::new("filename", "varchar(255)", ""));
        registry.define_column(ColumnDefinition::new("meta_data", "longtext", Value::Null));
        registry.add_serialized_column("meta_data");
        registry.add_serialized_column("meta_data");

        assert_eq!(
            registry.get_defined_column_names(),
            vec!["pid", "filename", "meta_data"]
        );
        assert_eq!(registry.serialized_columns(), ["meta_data"]);

        registry.set_table_columns(vec!["pid".to_string()]);
        let missing: Vec<String> = registry
            .missing_columns()
            .into_iter()
            .map(|definition| definition.name)
            .collect();
        assert_eq!(missing, vec!["filename", "meta_data"]);
    }
}
