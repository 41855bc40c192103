//! MySQL driver backed by an sqlx connection pool
//!
//! The mapper API is synchronous, so every call blocks on a runtime owned by
//! the driver.

use crate::errors::MapperError;
use crate::traits::driver::{QueryOutcome, RelationalDriver};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use config::DatabaseConfig;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};
use std::cell::Cell;
use tokio::runtime::Runtime;
use type_mapping::{Fields, Value};

pub struct MySqlDriver {
    pool: MySqlPool,
    runtime: Runtime,
    last_insert_id: Cell<Option<i64>>,
}

impl std::fmt::Debug for MySqlDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlDriver")
            .field("pool_size", &self.pool.size())
            .field("last_insert_id", &self.last_insert_id.get())
            .finish_non_exhaustive()
    }
}

impl MySqlDriver {
    pub fn connect(config: &DatabaseConfig) -> Result<Self, MapperError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| MapperError::Driver(format!("Failed to start runtime: {}", e)))?;
        let pool = runtime
            .block_on(
                MySqlPoolOptions::new()
                    .max_connections(5)
                    .connect(&config.connection_string()),
            )
            .map_err(driver_error)?;

        Ok(Self {
            pool,
            runtime,
            last_insert_id: Cell::new(None),
        })
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    fn fetch(&self, sql: &str) -> Result<Vec<Fields>, MapperError> {
        let rows = self
            .runtime
            .block_on(sqlx::query(sql).fetch_all(&self.pool))
            .map_err(driver_error)?;
        Ok(rows.iter().map(row_to_fields).collect())
    }
}

impl RelationalDriver for MySqlDriver {
    fn execute(&self, sql: &str) -> Result<QueryOutcome, MapperError> {
        let keyword = sql
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();
        if matches!(keyword.as_str(), "SELECT" | "SHOW" | "DESCRIBE") {
            return self.fetch(sql).map(QueryOutcome::Rows);
        }

        let result = self
            .runtime
            .block_on(sqlx::query(sql).execute(&self.pool))
            .map_err(driver_error)?;
        if result.last_insert_id() > 0 {
            self.last_insert_id.set(Some(result.last_insert_id() as i64));
        }
        Ok(QueryOutcome::Affected(result.rows_affected()))
    }

    fn last_insert_id(&self) -> Option<i64> {
        self.last_insert_id.get()
    }

    fn get_columns(&self, table: &str) -> Result<Vec<String>, MapperError> {
        let rows = self.fetch(&format!("SHOW COLUMNS FROM `{}`", table))?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get("Field").and_then(Value::to_text))
            .collect())
    }

    fn primary_key_column(&self, table: &str) -> Result<Option<String>, MapperError> {
        let rows = self.fetch(&format!("SHOW COLUMNS FROM `{}`", table))?;
        Ok(rows
            .iter()
            .find(|row| row.get("Key").and_then(Value::as_str) == Some("PRI"))
            .and_then(|row| row.get("Field").and_then(Value::to_text)))
    }
}

fn driver_error(error: sqlx::Error) -> MapperError {
    MapperError::Driver(error.to_string())
}

fn row_to_fields(row: &MySqlRow) -> Fields {
    row.columns()
        .iter()
        .enumerate()
        .map(|(index, column)| (column.name().to_string(), column_value(row, index)))
        .collect()
}

/// How a column is decoded, picked from the type MySQL reports for it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnDecode {
    Signed,
    Unsigned,
    Float,
    DateTime,
    Date,
    Time,
    Text,
}

impl ColumnDecode {
    fn for_type(type_name: &str) -> Self {
        let name = type_name.trim().to_ascii_uppercase();
        let (base, unsigned) = match name.strip_suffix("UNSIGNED") {
            Some(base) => (base.trim(), true),
            None => (name.as_str(), false),
        };
        match base {
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" if unsigned => {
                Self::Unsigned
            }
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" | "BOOLEAN" => {
                Self::Signed
            }
            "FLOAT" | "DOUBLE" => Self::Float,
            "DATETIME" | "TIMESTAMP" => Self::DateTime,
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            _ => Self::Text,
        }
    }
}

fn column_value(row: &MySqlRow, index: usize) -> Value {
    let decode = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => ColumnDecode::for_type(raw.type_info().name()),
        Err(_) => return Value::Null,
    };

    let decoded = match decode {
        ColumnDecode::Signed => row
            .try_get::<i64, _>(index)
            .map(Value::Int)
            .or_else(|_| row.try_get::<bool, _>(index).map(|b| Value::Int(b as i64)))
            .ok(),
        // ids past i64::MAX keep their digits as text
        ColumnDecode::Unsigned => row.try_get::<u64, _>(index).ok().map(|value| {
            i64::try_from(value).map_or_else(|_| Value::Text(value.to_string()), Value::Int)
        }),
        ColumnDecode::Float => row.try_get::<f64, _>(index).map(Value::Float).ok(),
        ColumnDecode::DateTime => row
            .try_get::<NaiveDateTime, _>(index)
            .map(|value| Value::Text(value.format(DATETIME_FORMAT).to_string()))
            .ok(),
        ColumnDecode::Date => row
            .try_get::<NaiveDate, _>(index)
            .map(|value| Value::Text(value.format("%Y-%m-%d").to_string()))
            .ok(),
        ColumnDecode::Time => row
            .try_get::<NaiveTime, _>(index)
            .map(|value| Value::Text(value.format("%H:%M:%S").to_string()))
            .ok(),
        ColumnDecode::Text => None,
    };

    decoded.unwrap_or_else(|| text_value(row, index))
}

/// Text columns, plus DECIMAL and anything else MySQL sends as a string
fn text_value(row: &MySqlRow, index: usize) -> Value {
    if let Ok(value) = row.try_get::<String, _>(index) {
        return Value::Text(value);
    }
    if let Ok(bytes) = row.try_get::<Vec<u8>, _>(index) {
        return Value::Text(String::from_utf8_lossy(&bytes).into_owned());
    }
    match row.try_get_unchecked::<String, _>(index) {
        Ok(value) => Value::Text(value),
        Err(e) => {
            tracing::warn!(index, error = %e, "undecodable column");
            Value::Null
        }
    }
}

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_decode_by_type() {
        assert_eq!(ColumnDecode::for_type("BIGINT UNSIGNED"), ColumnDecode::Unsigned);
        assert_eq!(ColumnDecode::for_type("INT UNSIGNED"), ColumnDecode::Unsigned);
        assert_eq!(ColumnDecode::for_type("BIGINT"), ColumnDecode::Signed);
        assert_eq!(ColumnDecode::for_type("BOOLEAN"), ColumnDecode::Signed);
        assert_eq!(ColumnDecode::for_type("DOUBLE"), ColumnDecode::Float);
        assert_eq!(ColumnDecode::for_type("DATETIME"), ColumnDecode::DateTime);
        assert_eq!(ColumnDecode::for_type("TIMESTAMP"), ColumnDecode::DateTime);
        assert_eq!(ColumnDecode::for_type("DATE"), ColumnDecode::Date);
        assert_eq!(ColumnDecode::for_type("TIME"), ColumnDecode::Time);
        assert_eq!(ColumnDecode::for_type("DECIMAL"), ColumnDecode::Text);
        assert_eq!(ColumnDecode::for_type("LONGTEXT"), ColumnDecode::Text);
    }

    #[test]
    fn test_datetime_renders_like_mysql_text() {
        let value = NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|date| date.and_hms_opt(7, 5, 0))
            .unwrap();
        assert_eq!(value.format(DATETIME_FORMAT).to_string(), "2024-03-09 07:05:00");
    }
}
