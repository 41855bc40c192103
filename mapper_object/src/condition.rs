//! Where-condition parsing
//!
//! Callers filter with small SQL-ish strings such as `"gid IN (%d)"` plus
//! positional binds. The parser substitutes the binds and breaks the result
//! into a [`Predicate`]: column, operator, value(s) and whether the values are
//! numeric. Both backends compile their filters from predicates.

use crate::query_builder::prepare::{escape, prepare_args, unescape, BindArg};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use type_mapping::{is_numeric_str, parse_leading_float, Value};

static OPERATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bNOT\s+IN\b|\bNOT\s+LIKE\b|\bNOT\s+BETWEEN\b|\bIN\b|\bLIKE\b|\bBETWEEN\b|[=!<>]+")
        .unwrap()
});
static RANGE_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+AND\s+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    NotLike,
    In,
    NotIn,
    Between,
    NotBetween,
}

impl CompareOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Like => "LIKE",
            CompareOp::NotLike => "NOT LIKE",
            CompareOp::In => "IN",
            CompareOp::NotIn => "NOT IN",
            CompareOp::Between => "BETWEEN",
            CompareOp::NotBetween => "NOT BETWEEN",
        }
    }

    /// Map an operator token as written by the caller. Unknown symbol runs
    /// fall back to equality.
    pub fn from_token(token: &str) -> Self {
        let normalized = token
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();
        match normalized.as_str() {
            "!=" | "<>" | "!==" => CompareOp::Ne,
            "<" => CompareOp::Lt,
            "<=" | "=<" => CompareOp::Lte,
            ">" => CompareOp::Gt,
            ">=" | "=>" => CompareOp::Gte,
            "LIKE" => CompareOp::Like,
            "NOT LIKE" => CompareOp::NotLike,
            "IN" => CompareOp::In,
            "NOT IN" => CompareOp::NotIn,
            "BETWEEN" => CompareOp::Between,
            "NOT BETWEEN" => CompareOp::NotBetween,
            _ => CompareOp::Eq,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, CompareOp::In | CompareOp::NotIn)
    }

    pub fn is_range(&self) -> bool {
        matches!(self, CompareOp::Between | CompareOp::NotBetween)
    }

    pub fn is_negated(&self) -> bool {
        matches!(
            self,
            CompareOp::Ne | CompareOp::NotLike | CompareOp::NotIn | CompareOp::NotBetween
        )
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl Serialize for CompareOp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_sql())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Numeric,
    String,
}

/// Raw value text as it appeared in the condition, SQL escaping intact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PredicateValue {
    Single(String),
    List(Vec<String>),
}

impl PredicateValue {
    pub fn values(&self) -> Vec<&str> {
        match self {
            PredicateValue::Single(value) => vec![value.as_str()],
            PredicateValue::List(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Predicate {
    pub column: String,
    pub value: PredicateValue,
    pub compare: CompareOp,
    #[serde(rename = "type")]
    pub kind: ValueKind,
}

impl Predicate {
    pub fn is_numeric(&self) -> bool {
        self.kind == ValueKind::Numeric
    }

    /// Values as typed scalars, with SQL escaping undone
    pub fn typed_values(&self) -> Vec<Value> {
        self.value
            .values()
            .into_iter()
            .map(|raw| typed_value(raw, self.kind))
            .collect()
    }

    /// A single scalar for one value, a list otherwise
    pub fn typed_value(&self) -> Value {
        match &self.value {
            PredicateValue::Single(raw) => typed_value(raw, self.kind),
            PredicateValue::List(_) => Value::List(self.typed_values()),
        }
    }
}

fn typed_value(raw: &str, kind: ValueKind) -> Value {
    match kind {
        ValueKind::Numeric if raw.eq_ignore_ascii_case("null") => Value::Null,
        ValueKind::Numeric if is_numeric_str(raw) => match raw.trim().parse::<i64>() {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Float(parse_leading_float(raw)),
        },
        _ => Value::Text(unescape(raw)),
    }
}

/// One filter condition: a clause with `%s`/`%d`/`%f` placeholders and its binds
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Condition {
    pub clause: String,
    pub binds: Vec<Value>,
}

impl Condition {
    pub fn new(clause: impl Into<String>) -> Self {
        Self {
            clause: clause.into(),
            binds: Vec::new(),
        }
    }

    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.binds.push(value.into());
        self
    }

    pub fn is_blank(&self) -> bool {
        self.clause.trim().is_empty()
    }

    pub fn parse(&self) -> Predicate {
        parse_condition(&self.clause, &self.binds)
    }
}

impl From<&str> for Condition {
    fn from(clause: &str) -> Self {
        Condition::new(clause)
    }
}

impl From<String> for Condition {
    fn from(clause: String) -> Self {
        Condition::new(clause)
    }
}

impl<V: Into<Value>> From<(&str, V)> for Condition {
    fn from((clause, bind): (&str, V)) -> Self {
        Condition::new(clause).bind(bind)
    }
}

impl<A: Into<Value>, B: Into<Value>> From<(&str, A, B)> for Condition {
    fn from((clause, first, second): (&str, A, B)) -> Self {
        Condition::new(clause).bind(first).bind(second)
    }
}

impl<A: Into<Value>, B: Into<Value>, C: Into<Value>> From<(&str, A, B, C)> for Condition {
    fn from((clause, first, second, third): (&str, A, B, C)) -> Self {
        Condition::new(clause).bind(first).bind(second).bind(third)
    }
}

/// The argument of a where call: zero or more conditions
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Conditions(Vec<Condition>);

impl Conditions {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn and(mut self, condition: impl Into<Condition>) -> Self {
        self.0.push(condition.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Condition::is_blank)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.0.iter()
    }

    /// Parse every non-blank condition
    pub fn predicates(&self) -> Vec<Predicate> {
        self.0
            .iter()
            .filter(|condition| !condition.is_blank())
            .map(Condition::parse)
            .collect()
    }
}

impl From<Condition> for Conditions {
    fn from(condition: Condition) -> Self {
        Conditions(vec![condition])
    }
}

impl From<&str> for Conditions {
    fn from(clause: &str) -> Self {
        Conditions(vec![clause.into()])
    }
}

impl From<String> for Conditions {
    fn from(clause: String) -> Self {
        Conditions(vec![clause.into()])
    }
}

impl<V: Into<Value>> From<(&str, V)> for Conditions {
    fn from(condition: (&str, V)) -> Self {
        Conditions(vec![condition.into()])
    }
}

impl<A: Into<Value>, B: Into<Value>> From<(&str, A, B)> for Conditions {
    fn from(condition: (&str, A, B)) -> Self {
        Conditions(vec![condition.into()])
    }
}

impl<T: Into<Condition>> From<Vec<T>> for Conditions {
    fn from(conditions: Vec<T>) -> Self {
        Conditions(conditions.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Condition>, const N: usize> From<[T; N]> for Conditions {
    fn from(conditions: [T; N]) -> Self {
        Conditions(conditions.into_iter().map(Into::into).collect())
    }
}

/// Parse a condition with its binds into a predicate.
///
/// List binds are flattened: non-numeric items are quoted individually and an
/// empty list becomes `NULL`. The predicate is numeric when every bind is
/// numeric; with no binds it is numeric only when every value is an unquoted
/// number.
pub fn parse_condition(clause: &str, binds: &[Value]) -> Predicate {
    let mut numeric = true;
    let mut args = Vec::with_capacity(binds.len());

    for bind in binds {
        match bind_items(bind) {
            Some(items) if items.is_empty() => args.push(BindArg::Raw("NULL".to_string())),
            Some(items) => {
                let mut rendered = Vec::with_capacity(items.len());
                for item in items {
                    if item.is_numeric() {
                        rendered.push(item.to_string());
                    } else {
                        numeric = false;
                        rendered.push(format!("'{}'", escape(&item.to_string())));
                    }
                }
                args.push(BindArg::Raw(rendered.join(",")));
            }
            None => {
                if !bind.is_numeric() {
                    numeric = false;
                }
                args.push(BindArg::Value(bind.clone()));
            }
        }
    }

    let condition = if binds.is_empty() {
        clause.trim().to_string()
    } else {
        prepare_args(clause, &args).trim().to_string()
    };

    let (column, rest) = split_column(&condition);
    let (compare, value_text) = match OPERATOR.find(rest) {
        Some(found) => (CompareOp::from_token(found.as_str()), rest[found.end()..].trim()),
        None => (CompareOp::Eq, rest.trim()),
    };

    let values = split_values(compare, value_text);
    let kind = if !binds.is_empty() {
        if numeric {
            ValueKind::Numeric
        } else {
            ValueKind::String
        }
    } else if values
        .iter()
        .all(|(value, quoted)| !quoted && is_numeric_str(value))
    {
        ValueKind::Numeric
    } else {
        ValueKind::String
    };

    let mut values: Vec<String> = values.into_iter().map(|(value, _)| value).collect();
    let value = if values.len() > 1 {
        PredicateValue::List(values)
    } else {
        PredicateValue::Single(values.pop().unwrap_or_default())
    };

    Predicate {
        column: column.trim_matches('`').to_string(),
        value,
        compare,
        kind,
    }
}

fn bind_items(bind: &Value) -> Option<Vec<&Value>> {
    match bind {
        Value::List(items) => Some(items.iter().collect()),
        Value::Map(fields) => Some(fields.values().collect()),
        _ => None,
    }
}

/// The column is the leading token, cut at whitespace or the first operator symbol
fn split_column(condition: &str) -> (&str, &str) {
    let end = condition
        .find(|c: char| c.is_whitespace() || matches!(c, '=' | '!' | '<' | '>'))
        .unwrap_or(condition.len());
    condition.split_at(end)
}

fn split_values(compare: CompareOp, text: &str) -> Vec<(String, bool)> {
    let pieces: Vec<&str> = if compare.is_list() {
        split_outside_quotes(strip_parens(text), ',')
    } else if compare.is_range() {
        RANGE_SEPARATOR.split(text).collect()
    } else {
        vec![text]
    };
    pieces.into_iter().map(strip_quotes).collect()
}

fn strip_parens(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(trimmed)
}

fn split_outside_quotes(text: &str, separator: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (idx, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '\'' | '"' => match quote {
                Some(open) if open == c => quote = None,
                None => quote = Some(c),
                _ => {}
            },
            _ if c == separator && quote.is_none() => {
                pieces.push(&text[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push(&text[start..]);
    pieces
}

fn strip_quotes(piece: &str) -> (String, bool) {
    let trimmed = piece.trim();
    for quote in ['\'', '"'] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return (trimmed[1..trimmed.len() - 1].to_string(), true);
        }
    }
    (trimmed.to_string(), false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn single(value: &str) -> PredicateValue {
        PredicateValue::Single(value.to_string())
    }

    fn list(values: &[&str]) -> PredicateValue {
        PredicateValue::List(values.iter().map(|v| v.to_string()).collect())
    }

    #[test]
    fn test_in_with_list_bind() {
        let predicate = parse_condition("gid IN (%d)", &[Value::from(vec![1, 2, 3])]);
        assert_eq!(
            predicate,
            Predicate {
                column: "gid".to_string(),
                value: list(&["1", "2", "3"]),
                compare: CompareOp::In,
                kind: ValueKind::Numeric,
            }
        );
    }

    #[test]
    fn test_string_bind() {
        let predicate = parse_condition("status = %s", &[Value::from("published")]);
        assert_eq!(predicate.column, "status");
        assert_eq!(predicate.compare, CompareOp::Eq);
        assert_eq!(predicate.value, single("published"));
        assert_eq!(predicate.kind, ValueKind::String);
    }

    #[test]
    fn test_string_list_bind_is_quoted_per_item() {
        let predicate = parse_condition("slug NOT IN (%s)", &[Value::from(vec!["a,b", "c"])]);
        assert_eq!(predicate.compare, CompareOp::NotIn);
        assert_eq!(predicate.value, list(&["a,b", "c"]));
        assert_eq!(predicate.kind, ValueKind::String);
    }

    #[test]
    fn test_empty_list_bind_becomes_null() {
        let predicate = parse_condition("gid IN (%d)", &[Value::List(vec![])]);
        assert_eq!(predicate.value, single("NULL"));
        assert_eq!(predicate.kind, ValueKind::Numeric);
        assert_eq!(predicate.typed_value(), Value::Null);
    }

    #[test]
    fn test_between() {
        let predicate = parse_condition("views BETWEEN %d AND %d", &[Value::from(10), Value::from(20)]);
        assert_eq!(predicate.compare, CompareOp::Between);
        assert_eq!(predicate.value, list(&["10", "20"]));
        assert_eq!(predicate.typed_values(), vec![Value::Int(10), Value::Int(20)]);
    }

    #[test]
    fn test_operator_aliases_and_case() {
        assert_eq!(parse_condition("a <> 1", &[]).compare, CompareOp::Ne);
        assert_eq!(parse_condition("a == 1", &[]).compare, CompareOp::Eq);
        assert_eq!(parse_condition("a not like '%x%'", &[]).compare, CompareOp::NotLike);
        assert_eq!(parse_condition("a >= 1", &[]).compare, CompareOp::Gte);
    }

    #[test]
    fn test_no_spaces_around_operator() {
        let predicate = parse_condition("views>100", &[]);
        assert_eq!(predicate.column, "views");
        assert_eq!(predicate.compare, CompareOp::Gt);
        assert_eq!(predicate.value, single("100"));
        assert_eq!(predicate.kind, ValueKind::Numeric);
    }

    #[test]
    fn test_missing_operator_is_best_effort() {
        let predicate = parse_condition("featured", &[]);
        assert_eq!(predicate.column, "featured");
        assert_eq!(predicate.compare, CompareOp::Eq);
        assert_eq!(predicate.value, single(""));
    }

    #[test]
    fn test_quoted_literal_without_binds_is_string() {
        let predicate = parse_condition("code = '007'", &[]);
        assert_eq!(predicate.value, single("007"));
        assert_eq!(predicate.kind, ValueKind::String);
    }

    #[test]
    fn test_escaped_text_round_trips_through_typed_value() {
        let predicate = parse_condition("title = %s", &[Value::from("O'Brien")]);
        assert_eq!(predicate.value, single(r"O\'Brien"));
        assert_eq!(predicate.typed_value(), Value::from("O'Brien"));
    }

    #[test]
    fn test_backticked_column() {
        assert_eq!(parse_condition("`sortorder` < 5", &[]).column, "sortorder");
    }

    #[test]
    fn test_conditions_conversions() {
        let conditions: Conditions = vec![
            Condition::from(("status = %s", "published")),
            Condition::from(("views > %d", 100)),
        ]
        .into();
        let predicates = conditions.predicates();
        assert_eq!(predicates.len(), 2);
        assert_eq!(predicates[1].kind, ValueKind::Numeric);

        assert!(Conditions::none().is_empty());
        assert!(Conditions::from("  ").is_empty());
        assert_eq!(Conditions::from(["a = 1", "b = 2"]).predicates().len(), 2);
    }
}
