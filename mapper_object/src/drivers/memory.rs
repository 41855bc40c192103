//! In-memory relational driver
//!
//! Tables live in process. `execute` understands the statements the mapper
//! emits: SELECT (with WHERE, GROUP BY, ORDER BY, LIMIT and COUNT), DELETE
//! and ALTER TABLE ADD/DROP COLUMN. Values are stored as text, the way a
//! MySQL text-protocol client sees them.

use super::matching::{compare_values, like_match, loose_eq};
use crate::errors::MapperError;
use crate::query_builder::prepare::unescape;
use crate::traits::driver::{QueryOutcome, RelationalDriver};
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use regex::Regex;
use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::HashMap;
use type_mapping::{Fields, Value};

static SELECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)^SELECT\s+(?P<fields>.+?)\s+FROM\s+`?(?P<table>\w+)`?(?:\s+WHERE\s+(?P<where>.+?))?(?:\s+GROUP BY\s+(?P<group>.+?))?(?:\s+ORDER BY\s+(?P<order>.+?))?(?:\s+LIMIT\s+(?P<limit>\d+(?:\s*,\s*\d+)?))?\s*$",
    )
    .unwrap()
});
static DELETE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^DELETE\s+FROM\s+`?(?P<table>\w+)`?(?:\s+WHERE\s+(?P<where>.+?))?\s*$")
        .unwrap()
});
static ADD_COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^ALTER\s+TABLE\s+`?(?P<table>\w+)`?\s+ADD\s+COLUMN\s+`?(?P<column>\w+)`?\s+(?P<definition>.+?)\s*$")
        .unwrap()
});
static DROP_COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^ALTER\s+TABLE\s+`?(?P<table>\w+)`?\s+DROP\s+COLUMN\s+`?(?P<column>\w+)`?\s*$")
        .unwrap()
});
static DEFAULT_CLAUSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)\bDEFAULT\s+(?P<literal>.+)$").unwrap());
static COUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^COUNT\([^)]*\)(?:\s+AS\s+`?(?P<alias>\w+)`?)?$").unwrap()
});

#[derive(Debug, Clone, Default)]
struct MemoryTable {
    columns: Vec<String>,
    primary_key: Option<String>,
    rows: Vec<Fields>,
    auto_increment: i64,
}

/// Relational driver over in-process tables
#[derive(Debug, Default)]
pub struct MemoryDriver {
    tables: RefCell<HashMap<String, MemoryTable>>,
    last_insert_id: Cell<Option<i64>>,
    log: RefCell<Vec<String>>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or replace) a table
    pub fn create_table(&self, name: &str, columns: &[&str], primary_key: Option<&str>) {
        let table = MemoryTable {
            columns: columns.iter().map(|column| column.to_string()).collect(),
            primary_key: primary_key.map(str::to_string),
            ..MemoryTable::default()
        };
        self.tables.borrow_mut().insert(name.to_string(), table);
    }

    /// Every statement passed to `execute`, plus a line per insert and update
    pub fn executed(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }

    /// Snapshot of a table's rows
    pub fn rows(&self, table: &str) -> Vec<Fields> {
        self.tables
            .borrow()
            .get(table)
            .map(|table| table.rows.clone())
            .unwrap_or_default()
    }

    fn record(&self, statement: String) {
        self.log.borrow_mut().push(statement);
    }

    fn select(&self, sql: &str) -> Result<QueryOutcome, MapperError> {
        let caps = SELECT
            .captures(sql)
            .ok_or_else(|| unsupported(sql))?;
        let tables = self.tables.borrow();
        let table = tables
            .get(&caps["table"])
            .ok_or_else(|| no_table(&caps["table"]))?;

        let filter = match caps.name("where") {
            Some(clause) => Some(parse_where(clause.as_str())?),
            None => None,
        };
        let mut rows: Vec<Fields> = table
            .rows
            .iter()
            .filter(|row| filter.as_ref().map_or(true, |expr| expr.eval(row)))
            .cloned()
            .collect();

        let fields = caps["fields"].trim();
        if let Some(count) = COUNT.captures(fields) {
            let alias = count
                .name("alias")
                .map_or("COUNT(*)", |alias| alias.as_str())
                .to_string();
            let mut row = Fields::new();
            row.insert(alias, Value::Text(rows.len().to_string()));
            return Ok(QueryOutcome::Rows(vec![row]));
        }

        if let Some(group) = caps.name("group") {
            let columns: Vec<String> = group.as_str().split(',').map(bare_column).collect();
            let mut seen: Vec<Vec<String>> = Vec::new();
            rows.retain(|row| {
                let key: Vec<String> = columns
                    .iter()
                    .map(|column| row.get(column).map(Value::to_string).unwrap_or_default())
                    .collect();
                if seen.contains(&key) {
                    false
                } else {
                    seen.push(key);
                    true
                }
            });
        }

        if let Some(order) = caps.name("order") {
            sort_rows(&mut rows, order.as_str());
        }

        if let Some(limit) = caps.name("limit") {
            let numbers: Vec<usize> = limit
                .as_str()
                .split(',')
                .filter_map(|part| part.trim().parse().ok())
                .collect();
            let (offset, max) = match numbers.as_slice() {
                [max] => (0, *max),
                [offset, max] => (*offset, *max),
                _ => (0, rows.len()),
            };
            rows = rows.into_iter().skip(offset).take(max).collect();
        }

        if fields != "*" && !fields.ends_with(".*") {
            let columns: Vec<String> = fields.split(',').map(bare_column).collect();
            rows = rows
                .into_iter()
                .map(|row| {
                    columns
                        .iter()
                        .map(|column| {
                            (column.clone(), row.get(column).cloned().unwrap_or(Value::Null))
                        })
                        .collect()
                })
                .collect();
        }

        Ok(QueryOutcome::Rows(rows))
    }

    fn delete(&self, sql: &str) -> Result<QueryOutcome, MapperError> {
        let caps = DELETE.captures(sql).ok_or_else(|| unsupported(sql))?;
        let filter = match caps.name("where") {
            Some(clause) => Some(parse_where(clause.as_str())?),
            None => None,
        };
        let mut tables = self.tables.borrow_mut();
        let table = tables
            .get_mut(&caps["table"])
            .ok_or_else(|| no_table(&caps["table"]))?;

        let before = table.rows.len();
        table
            .rows
            .retain(|row| !filter.as_ref().map_or(true, |expr| expr.eval(row)));
        Ok(QueryOutcome::Affected((before - table.rows.len()) as u64))
    }

    fn alter(&self, sql: &str) -> Result<QueryOutcome, MapperError> {
        let mut tables = self.tables.borrow_mut();

        if let Some(caps) = ADD_COLUMN.captures(sql) {
            let table = tables
                .get_mut(&caps["table"])
                .ok_or_else(|| no_table(&caps["table"]))?;
            let column = caps["column"].to_string();
            if table.columns.contains(&column) {
                return Err(MapperError::Driver(format!(
                    "Duplicate column name '{}'",
                    column
                )));
            }
            let default = DEFAULT_CLAUSE
                .captures(&caps["definition"])
                .map(|default| literal_value(default["literal"].trim()))
                .unwrap_or(Value::Null);
            for row in &mut table.rows {
                row.insert(column.clone(), default.clone());
            }
            table.columns.push(column);
            return Ok(QueryOutcome::Affected(0));
        }

        if let Some(caps) = DROP_COLUMN.captures(sql) {
            let table = tables
                .get_mut(&caps["table"])
                .ok_or_else(|| no_table(&caps["table"]))?;
            let column = &caps["column"];
            if !table.columns.iter().any(|existing| existing == column) {
                return Err(MapperError::Driver(format!(
                    "Can't DROP '{}'; check that column/key exists",
                    column
                )));
            }
            table.columns.retain(|existing| existing != column);
            for row in &mut table.rows {
                row.shift_remove(column);
            }
            return Ok(QueryOutcome::Affected(0));
        }

        Err(unsupported(sql))
    }
}

impl RelationalDriver for MemoryDriver {
    fn execute(&self, sql: &str) -> Result<QueryOutcome, MapperError> {
        self.record(sql.to_string());
        let statement = sql.trim_start();
        let keyword = statement
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();
        match keyword.as_str() {
            "SELECT" => self.select(statement),
            "DELETE" => self.delete(statement),
            "ALTER" => self.alter(statement),
            _ => Err(unsupported(sql)),
        }
    }

    fn last_insert_id(&self) -> Option<i64> {
        self.last_insert_id.get()
    }

    fn get_columns(&self, table: &str) -> Result<Vec<String>, MapperError> {
        self.tables
            .borrow()
            .get(table)
            .map(|table| table.columns.clone())
            .ok_or_else(|| no_table(table))
    }

    fn primary_key_column(&self, table: &str) -> Result<Option<String>, MapperError> {
        self.tables
            .borrow()
            .get(table)
            .map(|table| table.primary_key.clone())
            .ok_or_else(|| no_table(table))
    }

    fn insert(&self, table: &str, row: &Fields) -> Result<u64, MapperError> {
        self.record(format!("INSERT INTO `{}`", table));
        let mut tables = self.tables.borrow_mut();
        let stored_table = tables.get_mut(table).ok_or_else(|| no_table(table))?;
        check_columns(stored_table, row)?;

        let mut stored: Fields = stored_table
            .columns
            .iter()
            .map(|column| (column.clone(), as_stored(row.get(column))))
            .collect();

        if let Some(key) = stored_table.primary_key.clone() {
            let id = match stored.get(&key) {
                Some(value) if value.to_int() > 0 => value.to_int(),
                _ => stored_table.auto_increment + 1,
            };
            if stored_table
                .rows
                .iter()
                .any(|existing| existing.get(&key).is_some_and(|v| v.to_int() == id))
            {
                return Err(MapperError::Driver(format!(
                    "Duplicate entry '{}' for key 'PRIMARY'",
                    id
                )));
            }
            stored_table.auto_increment = stored_table.auto_increment.max(id);
            stored.insert(key, Value::Text(id.to_string()));
            self.last_insert_id.set(Some(id));
        }

        stored_table.rows.push(stored);
        Ok(1)
    }

    fn update(
        &self,
        table: &str,
        row: &Fields,
        key_column: &str,
        key: &Value,
    ) -> Result<u64, MapperError> {
        self.record(format!("UPDATE `{}`", table));
        let mut tables = self.tables.borrow_mut();
        let stored_table = tables.get_mut(table).ok_or_else(|| no_table(table))?;
        check_columns(stored_table, row)?;

        let mut changed = 0;
        for existing in stored_table
            .rows
            .iter_mut()
            .filter(|existing| existing.get(key_column).is_some_and(|v| loose_eq(v, key)))
        {
            for (column, value) in row {
                existing.insert(column.clone(), as_stored(Some(value)));
            }
            changed += 1;
        }
        Ok(changed)
    }
}

fn no_table(table: &str) -> MapperError {
    MapperError::Driver(format!("Table '{}' doesn't exist", table))
}

fn unsupported(sql: &str) -> MapperError {
    MapperError::Driver(format!("Unsupported statement: {}", sql))
}

fn check_columns(table: &MemoryTable, row: &Fields) -> Result<(), MapperError> {
    match row.keys().find(|column| !table.columns.contains(column)) {
        Some(column) => Err(MapperError::Driver(format!(
            "Unknown column '{}' in 'field list'",
            column
        ))),
        None => Ok(()),
    }
}

fn as_stored(value: Option<&Value>) -> Value {
    match value {
        None | Some(Value::Null) => Value::Null,
        Some(value) => Value::Text(value.to_string()),
    }
}

/// `wp_items.galleryid` and `` `galleryid` `` both name column `galleryid`
fn bare_column(name: &str) -> String {
    let name = name.trim().trim_matches('`');
    name.rsplit('.')
        .next()
        .unwrap_or(name)
        .trim_matches('`')
        .to_string()
}

fn literal_value(literal: &str) -> Value {
    let literal = literal.trim();
    if literal.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    for quote in ['\'', '"'] {
        if literal.len() >= 2 && literal.starts_with(quote) && literal.ends_with(quote) {
            return Value::Text(unescape(&literal[1..literal.len() - 1]));
        }
    }
    Value::Text(literal.to_string())
}

fn sort_rows(rows: &mut [Fields], order: &str) {
    let mut keys = Vec::new();
    for term in order.split(',') {
        let term = term.trim();
        if term.eq_ignore_ascii_case("rand()") {
            rows.shuffle(&mut rand::rng());
            return;
        }
        let mut parts = term.split_whitespace();
        let column = bare_column(parts.next().unwrap_or_default());
        let descending = parts
            .next()
            .is_some_and(|direction| direction.eq_ignore_ascii_case("desc"));
        keys.push((column, descending));
    }

    rows.sort_by(|left, right| {
        for (column, descending) in &keys {
            let left = left.get(column).unwrap_or(&Value::Null);
            let right = right.get(column).unwrap_or(&Value::Null);
            let ordering = compare_values(left, right);
            let ordering = if *descending { ordering.reverse() } else { ordering };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

// ========================================
// WHERE expressions
// ========================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Literal(Value),
    And,
    Or,
    Not,
    In,
    Like,
    Between,
    LParen,
    RParen,
    Comma,
    Op(String),
}

#[derive(Debug, Clone)]
enum Expr {
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Compare {
        column: String,
        op: String,
        value: Value,
    },
    InList {
        column: String,
        negated: bool,
        values: Vec<Value>,
    },
    Between {
        column: String,
        negated: bool,
        low: Value,
        high: Value,
    },
    Like {
        column: String,
        negated: bool,
        pattern: String,
    },
}

impl Expr {
    fn eval(&self, row: &Fields) -> bool {
        let actual = |column: &str| row.get(column).cloned().unwrap_or(Value::Null);
        match self {
            Expr::And(left, right) => left.eval(row) && right.eval(row),
            Expr::Or(left, right) => left.eval(row) || right.eval(row),
            Expr::Compare { column, op, value } => {
                let actual = actual(column);
                if actual.is_null() || value.is_null() {
                    return false;
                }
                let ordering = compare_values(&actual, value);
                match op.as_str() {
                    "=" | "==" => loose_eq(&actual, value),
                    "!=" | "<>" => !loose_eq(&actual, value),
                    "<" => ordering == Ordering::Less,
                    "<=" => ordering != Ordering::Greater,
                    ">" => ordering == Ordering::Greater,
                    ">=" => ordering != Ordering::Less,
                    _ => false,
                }
            }
            Expr::InList {
                column,
                negated,
                values,
            } => {
                let actual = actual(column);
                if actual.is_null() {
                    return false;
                }
                let found = values.iter().any(|value| loose_eq(&actual, value));
                found != *negated
            }
            Expr::Between {
                column,
                negated,
                low,
                high,
            } => {
                let actual = actual(column);
                if actual.is_null() {
                    return false;
                }
                let inside = compare_values(&actual, low) != Ordering::Less
                    && compare_values(&actual, high) != Ordering::Greater;
                inside != *negated
            }
            Expr::Like {
                column,
                negated,
                pattern,
            } => {
                let actual = actual(column);
                if actual.is_null() {
                    return false;
                }
                like_match(&actual.to_string(), pattern) != *negated
            }
        }
    }
}

fn parse_where(clause: &str) -> Result<Expr, MapperError> {
    let tokens = tokenize(clause)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    if parser.pos != parser.tokens.len() {
        return Err(MapperError::Driver(format!(
            "Unexpected trailing input in WHERE clause: {}",
            clause
        )));
    }
    Ok(expr)
}

fn tokenize(input: &str) -> Result<Vec<Token>, MapperError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            _ if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '`' => {
                let end = chars[i + 1..]
                    .iter()
                    .position(|&ch| ch == '`')
                    .map(|offset| i + 1 + offset)
                    .ok_or_else(|| syntax_error(input))?;
                tokens.push(Token::Ident(chars[i + 1..end].iter().collect()));
                i = end + 1;
            }
            '\'' | '"' => {
                let mut raw = String::new();
                let mut j = i + 1;
                let mut closed = false;
                while j < chars.len() {
                    match chars[j] {
                        '\\' if j + 1 < chars.len() => {
                            raw.push('\\');
                            raw.push(chars[j + 1]);
                            j += 2;
                        }
                        ch if ch == c => {
                            closed = true;
                            j += 1;
                            break;
                        }
                        ch => {
                            raw.push(ch);
                            j += 1;
                        }
                    }
                }
                if !closed {
                    return Err(syntax_error(input));
                }
                tokens.push(Token::Literal(Value::Text(unescape(&raw))));
                i = j;
            }
            '=' | '!' | '<' | '>' => {
                let start = i;
                while i < chars.len() && matches!(chars[i], '=' | '!' | '<' | '>') {
                    i += 1;
                }
                tokens.push(Token::Op(chars[start..i].iter().collect()));
            }
            _ if c.is_ascii_digit()
                || (c == '-' && chars.get(i + 1).is_some_and(|next| next.is_ascii_digit())) =>
            {
                let start = i;
                i += 1;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                tokens.push(Token::Literal(Value::Text(chars[start..i].iter().collect())));
            }
            _ if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || matches!(chars[i], '_' | '.' | '`'))
                {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(match word.to_ascii_uppercase().as_str() {
                    "AND" => Token::And,
                    "OR" => Token::Or,
                    "NOT" => Token::Not,
                    "IN" => Token::In,
                    "LIKE" => Token::Like,
                    "BETWEEN" => Token::Between,
                    "NULL" => Token::Literal(Value::Null),
                    _ => Token::Ident(bare_column(&word)),
                });
            }
            _ => return Err(syntax_error(input)),
        }
    }

    Ok(tokens)
}

fn syntax_error(input: &str) -> MapperError {
    MapperError::Driver(format!("Could not parse WHERE clause: {}", input))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.tokens.get(self.pos) == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), MapperError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(MapperError::Driver(format!(
                "Expected {:?} at token {}",
                expected, self.pos
            )))
        }
    }

    fn literal(&mut self) -> Result<Value, MapperError> {
        match self.next() {
            Some(Token::Literal(value)) => Ok(value),
            other => Err(MapperError::Driver(format!(
                "Expected a literal, found {:?}",
                other
            ))),
        }
    }

    fn parse_or(&mut self) -> Result<Expr, MapperError> {
        let mut left = self.parse_and()?;
        while self.eat(&Token::Or) {
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, MapperError> {
        let mut left = self.parse_atom()?;
        while self.eat(&Token::And) {
            let right = self.parse_atom()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_atom(&mut self) -> Result<Expr, MapperError> {
        if self.eat(&Token::LParen) {
            let expr = self.parse_or()?;
            self.expect(&Token::RParen)?;
            return Ok(expr);
        }

        let column = match self.next() {
            Some(Token::Ident(column)) => column,
            other => {
                return Err(MapperError::Driver(format!(
                    "Expected a column, found {:?}",
                    other
                )))
            }
        };
        let negated = self.eat(&Token::Not);

        match self.next() {
            Some(Token::In) => {
                self.expect(&Token::LParen)?;
                let mut values = vec![self.literal()?];
                while self.eat(&Token::Comma) {
                    values.push(self.literal()?);
                }
                self.expect(&Token::RParen)?;
                Ok(Expr::InList {
                    column,
                    negated,
                    values,
                })
            }
            Some(Token::Like) => {
                let pattern = self.literal()?.to_string();
                Ok(Expr::Like {
                    column,
                    negated,
                    pattern,
                })
            }
            Some(Token::Between) => {
                let low = self.literal()?;
                self.expect(&Token::And)?;
                let high = self.literal()?;
                Ok(Expr::Between {
                    column,
                    negated,
                    low,
                    high,
                })
            }
            Some(Token::Op(op)) if !negated => {
                let value = self.literal()?;
                Ok(Expr::Compare { column, op, value })
            }
            other => Err(MapperError::Driver(format!(
                "Expected an operator after {}, found {:?}",
                column, other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver() -> MemoryDriver {
        let driver = MemoryDriver::new();
        driver.create_table("wp_items", &["id", "status", "views"], Some("id"));
        for (status, views) in [("published", "150"), ("draft", "20"), ("published", "90")] {
            let mut row = Fields::new();
            row.insert("status".to_string(), Value::from(status));
            row.insert("views".to_string(), Value::from(views));
            driver.insert("wp_items", &row).unwrap();
        }
        driver
    }

    fn select(driver: &MemoryDriver, sql: &str) -> Vec<Fields> {
        match driver.execute(sql).unwrap() {
            QueryOutcome::Rows(rows) => rows,
            QueryOutcome::Affected(_) => panic!("expected rows"),
        }
    }

    #[test]
    fn test_insert_assigns_ids() {
        let driver = driver();
        assert_eq!(driver.last_insert_id(), Some(3));
        let ids: Vec<String> = driver
            .rows("wp_items")
            .iter()
            .map(|row| row["id"].to_string())
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_select_with_where_order_and_limit() {
        let driver = driver();
        let rows = select(
            &driver,
            "SELECT wp_items.* FROM `wp_items` WHERE (`status` = 'published') AND (`views` > 100)",
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], Value::from("1"));

        let rows = select(
            &driver,
            "SELECT wp_items.* FROM `wp_items` WHERE ((`status` = 'draft') OR (`views` < 100)) ORDER BY `views` DESC LIMIT 1, 1",
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["views"], Value::from("20"));
    }

    #[test]
    fn test_in_between_like_and_count() {
        let driver = driver();
        assert_eq!(
            select(&driver, "SELECT id FROM `wp_items` WHERE (`id` IN (1, 3))").len(),
            2
        );
        assert_eq!(
            select(&driver, "SELECT id FROM `wp_items` WHERE (`id` IN (NULL))").len(),
            0
        );
        assert_eq!(
            select(&driver, "SELECT * FROM `wp_items` WHERE (`views` BETWEEN 20 AND 90)").len(),
            2
        );
        assert_eq!(
            select(&driver, "SELECT * FROM `wp_items` WHERE (`status` LIKE 'pub%')").len(),
            2
        );

        let rows = select(&driver, "SELECT COUNT(`id`) AS `id` FROM `wp_items`");
        assert_eq!(rows[0]["id"], Value::from("3"));
    }

    #[test]
    fn test_alter_and_delete() {
        let driver = driver();
        driver
            .execute("ALTER TABLE `wp_items` ADD COLUMN `slug` varchar(20) NOT NULL DEFAULT 'none'")
            .unwrap();
        assert_eq!(
            driver.get_columns("wp_items").unwrap(),
            vec!["id", "status", "views", "slug"]
        );
        assert_eq!(driver.rows("wp_items")[0]["slug"], Value::from("none"));
        assert!(driver
            .execute("ALTER TABLE `wp_items` ADD COLUMN `slug` text")
            .is_err());

        let outcome = driver
            .execute("DELETE FROM `wp_items` WHERE (`status` = 'draft')")
            .unwrap();
        assert_eq!(outcome, QueryOutcome::Affected(1));
        assert_eq!(driver.rows("wp_items").len(), 2);
    }

    #[test]
    fn test_unknown_columns_are_rejected() {
        let driver = driver();
        let mut row = Fields::new();
        row.insert("nope".to_string(), Value::Int(1));
        assert!(matches!(
            driver.insert("wp_items", &row),
            Err(MapperError::Driver(_))
        ));
    }
}
