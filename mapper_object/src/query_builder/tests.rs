use crate::condition::{parse_condition, CompareOp, Conditions, Condition, ValueKind};
use crate::query_builder::{
    DocumentQuery, LogicalOperator, MetaClause, MetaGroup, QueryBuilder, SortOrder, SqlQuery,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use type_mapping::Value;

const TABLE: &str = "wp_items";

fn is_column(name: &str) -> bool {
    matches!(name, "id" | "status" | "views" | "title" | "sortorder")
}

fn predicates(conditions: impl Into<Conditions>) -> Vec<crate::condition::Predicate> {
    conditions.into().predicates()
}

// ========================================
// Relational compilation
// ========================================

#[test]
fn test_where_and_scenario() {
    let mut query = SqlQuery::new();
    query.select(None);
    query.add_where_clause(
        predicates([
            Condition::from(("status = %s", "published")),
            Condition::from(("views > %d", 100)),
        ]),
        LogicalOperator::And,
    );

    let sql = query.compile(TABLE, &is_column);
    assert_eq!(
        sql,
        "SELECT wp_items.* FROM `wp_items` WHERE (`status` = 'published') AND (`views` > 100)"
    );
}

#[test]
fn test_or_group_is_parenthesized() {
    let mut query = SqlQuery::new();
    query.select(Some("*"));
    query.add_where_clause(
        predicates(["status = 'draft'", "status = 'pending'"]),
        LogicalOperator::Or,
    );
    query.add_where_clause(predicates("views >= 10"), LogicalOperator::And);

    assert_eq!(
        query.compile(TABLE, &is_column),
        "SELECT wp_items.* FROM `wp_items` WHERE ((`status` = 'draft') OR (`status` = 'pending')) AND (`views` >= 10)"
    );
}

#[test]
fn test_in_between_and_unknown_columns() {
    let mut query = SqlQuery::new();
    query.select(Some("id, title"));
    query.add_where_clause(
        predicates([
            Condition::from(("id IN (%d)", vec![1, 2, 3])),
            Condition::from(("views BETWEEN %d AND %d", 5, 50)),
            Condition::from(("wp_items.galleryid = %d", 9)),
        ]),
        LogicalOperator::And,
    );

    assert_eq!(
        query.compile(TABLE, &is_column),
        "SELECT id, title FROM `wp_items` WHERE (`id` IN (1, 2, 3)) AND (`views` BETWEEN 5 AND 50) AND (wp_items.galleryid = 9)"
    );
}

#[test]
fn test_empty_list_bind_compiles_to_null() {
    let mut query = SqlQuery::new();
    query.select(None);
    query.add_where_clause(
        predicates(("id IN (%d)", Value::List(vec![]))),
        LogicalOperator::And,
    );
    assert!(query.compile(TABLE, &is_column).ends_with("WHERE (`id` IN (NULL))"));
}

#[test]
fn test_group_by_accumulates_until_next_select() {
    let mut query = SqlQuery::new();
    query.select(None);
    query.group_by(&["status".to_string()]);
    query.group_by(&["views".to_string()]);
    assert_eq!(
        query.compile(TABLE, &is_column),
        "SELECT wp_items.* FROM `wp_items` GROUP BY `status`, `views`"
    );

    query.select(None);
    assert_eq!(query.compile(TABLE, &is_column), "SELECT wp_items.* FROM `wp_items`");
}

#[test]
fn test_order_group_and_limit() {
    let mut query = SqlQuery::new();
    query.select(None);
    query.group_by(&["status".to_string()]);
    query.order_by("sortorder", SortOrder::Asc);
    query.order_by("`id`; DROP TABLE x", SortOrder::Desc);
    query.limit(10, 20);

    assert_eq!(
        query.compile(TABLE, &is_column),
        "SELECT wp_items.* FROM `wp_items` GROUP BY `status` ORDER BY `sortorder` ASC, id DROP TABLE x DESC LIMIT 20, 10"
    );
}

#[test]
fn test_limit_without_offset_and_clamping() {
    let mut query = SqlQuery::new();
    query.select(None);
    query.limit(5, 0);
    assert!(query.compile(TABLE, &is_column).ends_with("LIMIT 5"));

    query.limit(-3, -1);
    assert!(query.compile(TABLE, &is_column).ends_with("LIMIT 0"));
}

#[test]
fn test_random_order() {
    let mut query = SqlQuery::new();
    query.select(None);
    query.order_by("rand()", SortOrder::Asc);
    assert!(query.compile(TABLE, &is_column).ends_with("ORDER BY RAND()"));
}

#[test]
fn test_delete_ignores_select_only_clauses() {
    let mut query = SqlQuery::new();
    query.delete();
    query.add_where_clause(predicates(("status = %s", "trash")), LogicalOperator::And);
    query.order_by("id", SortOrder::Asc);
    query.limit(1, 0);

    assert!(query.is_delete_statement());
    assert!(!query.is_select_statement());
    assert_eq!(
        query.compile(TABLE, &is_column),
        "DELETE FROM `wp_items` WHERE (`status` = 'trash')"
    );
}

#[test]
fn test_select_resets_state() {
    let mut query = SqlQuery::new();
    query.select(None);
    query.add_where_clause(predicates("views > 1"), LogicalOperator::And);
    query.limit(1, 0);
    query.select(None);
    assert_eq!(query.compile(TABLE, &is_column), "SELECT wp_items.* FROM `wp_items`");
}

#[test]
fn test_escaped_strings_stay_escaped() {
    let mut query = SqlQuery::new();
    query.select(None);
    query.add_where_clause(predicates(("title = %s", "O'Brien")), LogicalOperator::And);
    assert!(query
        .compile(TABLE, &is_column)
        .ends_with(r"WHERE (`title` = 'O\'Brien')"));
}

// ========================================
// Document query arguments
// ========================================

fn document_query() -> DocumentQuery {
    let mut query = DocumentQuery::new("ngg_album", "ID");
    query.select(None);
    query
}

#[test]
fn test_category_in_with_list_bind() {
    let mut query = document_query();
    query.add_where_clause(
        predicates(("category_id IN (%d)", vec![1, 2])),
        LogicalOperator::And,
    );
    assert_eq!(query.args().category_in, vec![Value::Int(1), Value::Int(2)]);

    query.add_where_clause(predicates("cat != 7"), LogicalOperator::And);
    assert_eq!(query.args().category_not_in, vec![Value::Int(7)]);
}

#[test]
fn test_primary_key_and_name_mappings() {
    let mut query = document_query();
    query.add_where_clause(
        predicates([
            Condition::from(("ID = %d", 5)),
            Condition::from(("post_id NOT IN (%d)", vec![8, 9])),
            Condition::from(("post_name LIKE %s", "%summer%")),
            Condition::from(("post_title = %s", "Summer")),
            Condition::from(("author = %d", 3)),
        ]),
        LogicalOperator::And,
    );

    let args = query.args();
    assert_eq!(args.post_in, vec![Value::Int(5)]);
    assert_eq!(args.post_not_in, vec![Value::Int(8), Value::Int(9)]);
    assert_eq!(args.page_name_like, Some(Value::from("%summer%")));
    assert_eq!(args.post_title, Some(Value::from("Summer")));
    assert_eq!(args.author, Some(Value::Int(3)));
    assert!(args.meta_query.is_empty());
}

#[test]
fn test_other_columns_become_metadata_with_call_relation() {
    let mut query = document_query();
    query.add_where_clause(
        predicates([
            Condition::from(("previewpic = %d", 4)),
            Condition::from(("slug = %s", "it's")),
        ]),
        LogicalOperator::Or,
    );
    query.add_where_clause(
        predicates(("sortorder IN (%d)", vec![1, 2])),
        LogicalOperator::And,
    );

    assert_eq!(
        query.args().meta_query,
        vec![
            MetaGroup {
                relation: LogicalOperator::Or,
                clauses: vec![
                    MetaClause {
                        key: "previewpic".to_string(),
                        value: Value::Int(4),
                        compare: CompareOp::Eq,
                        kind: ValueKind::Numeric,
                    },
                    MetaClause {
                        key: "slug".to_string(),
                        value: Value::from("it's"),
                        compare: CompareOp::Eq,
                        kind: ValueKind::String,
                    },
                ],
            },
            MetaGroup {
                relation: LogicalOperator::And,
                clauses: vec![MetaClause {
                    key: "sortorder".to_string(),
                    value: Value::List(vec![Value::Int(1), Value::Int(2)]),
                    compare: CompareOp::In,
                    kind: ValueKind::Numeric,
                }],
            },
        ]
    );
}

#[test]
fn test_document_order_by() {
    let mut query = document_query();
    query.order_by("title", SortOrder::Desc);
    assert_eq!(query.args().orderby.as_deref(), Some("title"));
    assert_eq!(query.args().order, Some(SortOrder::Desc));
    assert_eq!(query.args().meta_key, None);

    query.order_by("sortorder", SortOrder::Asc);
    assert_eq!(query.args().orderby.as_deref(), Some("meta_value"));
    assert_eq!(query.args().meta_key.as_deref(), Some("sortorder"));

    query.order_by("RAND()", SortOrder::Asc);
    assert_eq!(query.args().orderby.as_deref(), Some("rand"));
}

#[test]
fn test_document_limit() {
    let mut query = document_query();
    query.limit(0, 5);
    assert!(!query.args().paged);
    assert_eq!(query.args().posts_per_page, -1);

    query.limit(10, 20);
    assert!(query.args().paged);
    assert_eq!(query.args().posts_per_page, 10);
    assert_eq!(query.args().offset, Some(20));

    query.limit(10, 0);
    assert_eq!(query.args().offset, None);
}

#[test]
fn test_document_delete_and_serialization() {
    let mut query = DocumentQuery::new("ngg_album", "ID");
    query.delete();
    assert!(query.is_delete_statement());
    assert!(!query.is_select_statement());

    query.add_where_clause(
        vec![parse_condition("category_id IN (%d)", &[Value::from(vec![1, 2])])],
        LogicalOperator::And,
    );
    let json: serde_json::Value = serde_json::from_str(&query.args().to_json()).unwrap();
    assert_eq!(json["post_type"], json!("ngg_album"));
    assert_eq!(json["category__in"], json!([1, 2]));
    assert_eq!(json["post_status"], json!("any"));
    assert_eq!(json["is_delete"], json!(true));
    assert!(json.get("meta_query").is_none());
}
