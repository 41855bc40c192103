//! Column registry access, column-list caching and migrations

use super::core::DataMapper;
use crate::errors::MapperError;
use crate::schema::ColumnDefinition;
use crate::traits::mapper::BackendKind;
use type_mapping::Value;

const COLUMNS_CACHE_GROUP: &str = "columns";

impl DataMapper {
    /// Declare a column; redeclaring a name replaces the definition
    pub fn define_column(&self, name: &str, sql_type: &str, default_value: impl Into<Value>) -> &Self {
        self.inner
            .registry
            .borrow_mut()
            .define_column(ColumnDefinition::new(name, sql_type, default_value));
        self
    }

    pub fn get_defined_column_names(&self) -> Vec<String> {
        self.inner.registry.borrow().get_defined_column_names()
    }

    pub fn has_defined_column(&self, name: &str) -> bool {
        self.inner.registry.borrow().has_defined_column(name)
    }

    pub fn column_definitions(&self) -> Vec<ColumnDefinition> {
        self.inner.registry.borrow().columns().cloned().collect()
    }

    /// Decode this column with the codec whenever it is read as text
    pub fn add_serialized_column(&self, name: &str) -> &Self {
        self.inner.registry.borrow_mut().add_serialized_column(name);
        self
    }

    /// Whether the physical table has the column
    pub fn has_column(&self, name: &str) -> bool {
        self.inner.registry.borrow().has_table_column(name)
    }

    fn columns_cache_key(&self) -> String {
        self.inner
            .transient
            .create_key(&format!("col_in_{}", self.table_name()), COLUMNS_CACHE_GROUP)
    }

    /// Physical column names, from the transient cache when possible
    pub fn lookup_columns(&self) -> Result<Vec<String>, MapperError> {
        let key = self.columns_cache_key();
        match self.inner.transient.fetch::<Vec<String>>(&key) {
            Ok(Some(columns)) => {
                trace_log!("Column cache hit for {}", key);
                self.inner
                    .registry
                    .borrow_mut()
                    .set_table_columns(columns.clone());
                Ok(columns)
            }
            Ok(None) => self.update_columns_cache(),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "column cache unavailable");
                self.update_columns_cache()
            }
        }
    }

    /// Introspect the table and store the column list in the transient cache
    pub fn update_columns_cache(&self) -> Result<Vec<String>, MapperError> {
        let columns = self.inner.backend.borrow().introspect_columns()?;
        let key = self.columns_cache_key();
        if let Err(e) = self.inner.transient.update(&key, &columns) {
            tracing::warn!(key = %key, error = %e, "could not cache column list");
        }
        self.inner
            .registry
            .borrow_mut()
            .set_table_columns(columns.clone());
        Ok(columns)
    }

    /// Add every declared column the table lacks. Returns how many were added.
    pub fn migrate(&self) -> Result<usize, MapperError> {
        if self.kind() == BackendKind::Document {
            return Ok(0);
        }
        if self.inner.registry.borrow().is_empty() {
            return Err(MapperError::ColumnsNotDefined(self.object_name().to_string()));
        }

        self.lookup_columns()?;
        let missing = self.inner.registry.borrow().missing_columns();
        let mut added = 0;
        for column in &missing {
            if self.inner.backend.borrow().add_column(column)? {
                added += 1;
                self.update_columns_cache()?;
            }
        }

        if added > 0 {
            tracing::info!(table = %self.table_name(), added, "migrated columns");
        }
        Ok(added)
    }

    /// Drop a physical column and refresh the column cache
    pub fn remove_column(&self, name: &str) -> Result<bool, MapperError> {
        let removed = self.inner.backend.borrow().remove_column(name)?;
        if removed {
            self.update_columns_cache()?;
        }
        Ok(removed)
    }
}
