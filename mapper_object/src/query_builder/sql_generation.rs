//! SQL text generation for the relational backend

use crate::condition::{Predicate, PredicateValue};
use crate::query_builder::filter::{LogicalOperator, PredicateGroup};
use crate::query_builder::ordering::OrderTerm;

pub struct SqlGenerator;

impl SqlGenerator {
    /// Backtick a name the table is known to have; anything else is emitted as given
    pub fn quote_column(name: &str, is_column: &dyn Fn(&str) -> bool) -> String {
        if is_column(name) {
            format!("`{}`", name)
        } else {
            name.to_string()
        }
    }

    /// Build WHERE clause from predicate groups. Groups are ANDed; each
    /// predicate is parenthesized and joined by its group's operator.
    pub fn build_where_clause(groups: &[PredicateGroup], is_column: &dyn Fn(&str) -> bool) -> String {
        let groups_sql: Vec<String> = groups
            .iter()
            .filter(|group| !group.is_empty())
            .map(|group| Self::build_group_sql(group, is_column))
            .collect();

        if groups_sql.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", groups_sql.join(" AND "))
        }
    }

    fn build_group_sql(group: &PredicateGroup, is_column: &dyn Fn(&str) -> bool) -> String {
        let separator = format!(" {} ", group.join.to_sql());
        let joined = group
            .predicates
            .iter()
            .map(|predicate| format!("({})", Self::build_predicate_sql(predicate, is_column)))
            .collect::<Vec<_>>()
            .join(&separator);

        if group.join == LogicalOperator::Or && group.predicates.len() > 1 {
            format!("({})", joined)
        } else {
            joined
        }
    }

    pub fn build_predicate_sql(predicate: &Predicate, is_column: &dyn Fn(&str) -> bool) -> String {
        let column = Self::quote_column(&predicate.column, is_column);
        let render = |raw: &str| {
            if predicate.is_numeric() {
                raw.to_string()
            } else {
                format!("'{}'", raw)
            }
        };
        let values: Vec<String> = match &predicate.value {
            PredicateValue::Single(raw) => vec![render(raw)],
            PredicateValue::List(raws) => raws.iter().map(|raw| render(raw)).collect(),
        };

        let value = if predicate.compare.is_list() {
            format!("({})", values.join(", "))
        } else if predicate.compare.is_range() {
            values.join(" AND ")
        } else {
            values.join(", ")
        };

        format!("{} {} {}", column, predicate.compare.as_sql(), value)
    }

    pub fn build_order_clause(terms: &[OrderTerm], is_column: &dyn Fn(&str) -> bool) -> String {
        if terms.is_empty() {
            return String::new();
        }

        let order_parts: Vec<String> = terms
            .iter()
            .map(|term| match term {
                OrderTerm::Column { column, direction } => {
                    format!("{} {}", Self::quote_column(column, is_column), direction.to_sql())
                }
                OrderTerm::Random => "RAND()".to_string(),
            })
            .collect();

        format!("ORDER BY {}", order_parts.join(", "))
    }

    pub fn build_group_by_clause(columns: &[String], is_column: &dyn Fn(&str) -> bool) -> String {
        if columns.is_empty() {
            return String::new();
        }

        let quoted: Vec<String> = columns
            .iter()
            .map(|column| Self::quote_column(column, is_column))
            .collect();
        format!("GROUP BY {}", quoted.join(", "))
    }

    /// `LIMIT offset, max` when an offset is set, otherwise `LIMIT max`
    pub fn build_limit_clause(limit: Option<(i64, i64)>) -> String {
        match limit {
            None => String::new(),
            Some((max, offset)) => {
                let max = max.max(0);
                let offset = offset.max(0);
                if offset > 0 {
                    format!("LIMIT {}, {}", offset, max)
                } else {
                    format!("LIMIT {}", max)
                }
            }
        }
    }
}
