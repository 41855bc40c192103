//! Query state for the relational backend

use crate::condition::Predicate;
use crate::query_builder::filter::{LogicalOperator, PredicateGroup};
use crate::query_builder::ordering::{OrderTerm, SortOrder};
use crate::query_builder::sql_generation::SqlGenerator;
use crate::traits::mapper::QueryBuilder;
use crate::validation::clean_column;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement {
    Select,
    Delete,
}

/// Accumulated clauses of one SELECT or DELETE against a single table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlQuery {
    statement: Option<Statement>,
    fields: Option<String>,
    groups: Vec<PredicateGroup>,
    order: Vec<OrderTerm>,
    group_by: Vec<String>,
    limit: Option<(i64, i64)>,
}

impl SqlQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[PredicateGroup] {
        &self.groups
    }

    pub fn statement(&self) -> Option<Statement> {
        self.statement
    }

    /// Compile to SQL. A query that was never started selects every column.
    pub fn compile(&self, table: &str, is_column: &dyn Fn(&str) -> bool) -> String {
        let mut sql = Vec::new();

        match self.statement {
            Some(Statement::Delete) => sql.push("DELETE".to_string()),
            _ => {
                let fields = self
                    .fields
                    .clone()
                    .unwrap_or_else(|| format!("{}.*", table));
                sql.push(format!("SELECT {}", fields));
            }
        }
        sql.push(format!("FROM `{}`", table));

        let where_clause = SqlGenerator::build_where_clause(&self.groups, is_column);
        if !where_clause.is_empty() {
            sql.push(where_clause);
        }

        if self.statement != Some(Statement::Delete) {
            for clause in [
                SqlGenerator::build_group_by_clause(&self.group_by, is_column),
                SqlGenerator::build_order_clause(&self.order, is_column),
                SqlGenerator::build_limit_clause(self.limit),
            ] {
                if !clause.is_empty() {
                    sql.push(clause);
                }
            }
        }

        sql.join(" ")
    }
}

impl QueryBuilder for SqlQuery {
    fn select(&mut self, fields: Option<&str>) {
        *self = Self::default();
        self.statement = Some(Statement::Select);
        self.fields = fields
            .map(str::trim)
            .filter(|fields| !fields.is_empty() && *fields != "*")
            .map(str::to_string);
    }

    fn delete(&mut self) {
        *self = Self::default();
        self.statement = Some(Statement::Delete);
    }

    fn add_where_clause(&mut self, predicates: Vec<Predicate>, join: LogicalOperator) {
        if !predicates.is_empty() {
            self.groups.push(PredicateGroup::new(predicates, join));
        }
    }

    fn order_by(&mut self, order_by: &str, direction: SortOrder) {
        self.order
            .push(OrderTerm::new(&clean_column(order_by), direction));
    }

    fn limit(&mut self, max: i64, offset: i64) {
        self.limit = Some((max, offset));
    }

    fn group_by(&mut self, columns: &[String]) {
        self.group_by
            .extend(columns.iter().map(|column| clean_column(column)));
    }

    fn is_select_statement(&self) -> bool {
        self.statement == Some(Statement::Select)
    }

    fn is_delete_statement(&self) -> bool {
        self.statement == Some(Statement::Delete)
    }
}
