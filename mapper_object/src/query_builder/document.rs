//! Query state for the document backend
//!
//! Filters are translated into a [`QueryArgs`] structure understood by the
//! document store. Well-known columns map to dedicated arguments; everything
//! else becomes a metadata filter.

use crate::condition::{CompareOp, Predicate, ValueKind};
use crate::query_builder::filter::LogicalOperator;
use crate::query_builder::ordering::{is_random, SortOrder};
use crate::traits::mapper::QueryBuilder;
use crate::validation::clean_column;
use serde::Serialize;
use type_mapping::Value;

/// Native document fields the store can sort on directly
pub const QUERYABLE_COLUMNS: &[&str] = &[
    "name",
    "author",
    "date",
    "title",
    "modified",
    "menu_order",
    "parent",
    "ID",
    "rand",
    "comment_count",
];

/// One metadata comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetaClause {
    pub key: String,
    pub value: Value,
    pub compare: CompareOp,
    #[serde(rename = "type")]
    pub kind: ValueKind,
}

/// Metadata comparisons added by one where call, combined with that call's join
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetaGroup {
    pub relation: LogicalOperator,
    pub clauses: Vec<MetaClause>,
}

/// Arguments of one document-store query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryArgs {
    pub post_type: String,
    pub fields: Option<String>,
    pub post_status: String,
    pub paged: bool,
    pub posts_per_page: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orderby: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<Value>,
    #[serde(rename = "category__in", skip_serializing_if = "Vec::is_empty")]
    pub category_in: Vec<Value>,
    #[serde(rename = "category__not_in", skip_serializing_if = "Vec::is_empty")]
    pub category_not_in: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<Value>,
    #[serde(rename = "post__in", skip_serializing_if = "Vec::is_empty")]
    pub post_in: Vec<Value>,
    #[serde(rename = "post__not_in", skip_serializing_if = "Vec::is_empty")]
    pub post_not_in: Vec<Value>,
    #[serde(rename = "page_name__like", skip_serializing_if = "Option::is_none")]
    pub page_name_like: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagename: Option<Value>,
    #[serde(rename = "page_name__in", skip_serializing_if = "Vec::is_empty")]
    pub page_name_in: Vec<Value>,
    #[serde(rename = "post_title__like", skip_serializing_if = "Option::is_none")]
    pub post_title_like: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_title: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub meta_query: Vec<MetaGroup>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub group_by_columns: Vec<String>,
    pub is_select: bool,
    pub is_delete: bool,
    pub datamapper: bool,
    pub update_post_meta_cache: bool,
    pub no_found_posts: bool,
    pub cache_results: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_sql: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub debug: bool,
}

impl QueryArgs {
    /// Fresh arguments selecting every document of a type
    pub fn for_type(post_type: &str) -> Self {
        Self {
            post_type: post_type.to_string(),
            fields: None,
            post_status: "any".to_string(),
            paged: false,
            posts_per_page: -1,
            offset: None,
            orderby: None,
            order: None,
            meta_key: None,
            author: None,
            author_name: None,
            category_in: Vec::new(),
            category_not_in: Vec::new(),
            category_name: None,
            post_in: Vec::new(),
            post_not_in: Vec::new(),
            page_name_like: None,
            pagename: None,
            page_name_in: Vec::new(),
            post_title_like: None,
            post_title: None,
            meta_query: Vec::new(),
            group_by_columns: Vec::new(),
            is_select: false,
            is_delete: false,
            datamapper: true,
            update_post_meta_cache: true,
            no_found_posts: false,
            cache_results: true,
            custom_sql: None,
            debug: false,
        }
    }

    /// Stable serialized form, used for cache fingerprints and debug output
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Builder state of the document backend
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentQuery {
    post_type: String,
    primary_key: String,
    args: QueryArgs,
}

impl DocumentQuery {
    pub fn new(post_type: &str, primary_key: &str) -> Self {
        Self {
            post_type: post_type.to_string(),
            primary_key: primary_key.to_string(),
            args: QueryArgs::for_type(post_type),
        }
    }

    pub fn args(&self) -> &QueryArgs {
        &self.args
    }

    pub fn args_mut(&mut self) -> &mut QueryArgs {
        &mut self.args
    }

    fn add_predicate(&mut self, predicate: Predicate, meta: &mut Vec<MetaClause>) {
        let args = &mut self.args;
        let column = predicate.column.as_str();

        match column {
            "author" | "author_id" => args.author = Some(predicate.typed_value()),
            "author_name" => args.author_name = Some(predicate.typed_value()),
            "cat" | "cat_id" | "category_id" => match predicate.compare {
                CompareOp::Eq | CompareOp::In | CompareOp::Between => {
                    args.category_in.extend(predicate.typed_values())
                }
                CompareOp::Ne | CompareOp::NotIn | CompareOp::NotBetween => {
                    args.category_not_in.extend(predicate.typed_values())
                }
                _ => {}
            },
            "category_name" => args.category_name = Some(predicate.typed_value()),
            _ if column == "post_id" || column == self.primary_key => match predicate.compare {
                CompareOp::Eq | CompareOp::In | CompareOp::Between => {
                    args.post_in.extend(predicate.typed_values())
                }
                _ => args.post_not_in.extend(predicate.typed_values()),
            },
            "pagename" | "postname" | "page_name" | "post_name" => match predicate.compare {
                CompareOp::Like => args.page_name_like = Some(predicate.typed_value()),
                CompareOp::Eq => args.pagename = Some(predicate.typed_value()),
                CompareOp::In => args.page_name_in = predicate.typed_values(),
                _ => {}
            },
            "post_title" => {
                if predicate.compare == CompareOp::Like {
                    args.post_title_like = Some(predicate.typed_value());
                } else {
                    args.post_title = Some(predicate.typed_value());
                }
            }
            _ => {
                let value = if predicate.compare.is_list() || predicate.compare.is_range() {
                    Value::List(predicate.typed_values())
                } else {
                    predicate.typed_value()
                };
                meta.push(MetaClause {
                    key: column.to_string(),
                    value,
                    compare: predicate.compare,
                    kind: predicate.kind,
                });
            }
        }
    }
}

impl QueryBuilder for DocumentQuery {
    fn select(&mut self, fields: Option<&str>) {
        self.args = QueryArgs::for_type(&self.post_type);
        self.args.fields = Some(fields.unwrap_or("*").to_string());
        self.args.is_select = true;
    }

    fn delete(&mut self) {
        self.select(None);
        self.args.is_select = false;
        self.args.is_delete = true;
    }

    fn add_where_clause(&mut self, predicates: Vec<Predicate>, join: LogicalOperator) {
        let mut meta = Vec::new();
        for predicate in predicates {
            self.add_predicate(predicate, &mut meta);
        }
        if !meta.is_empty() {
            self.args.meta_query.push(MetaGroup {
                relation: join,
                clauses: meta,
            });
        }
    }

    fn order_by(&mut self, order_by: &str, direction: SortOrder) {
        let order_by = clean_column(order_by);
        let order_by = if is_random(&order_by) {
            "rand".to_string()
        } else {
            order_by
        };

        if QUERYABLE_COLUMNS.contains(&order_by.as_str()) {
            self.args.orderby = Some(order_by);
        } else {
            self.args.orderby = Some("meta_value".to_string());
            self.args.meta_key = Some(order_by);
        }
        self.args.order = Some(direction);
    }

    /// A zero max leaves paging untouched
    fn limit(&mut self, max: i64, offset: i64) {
        if max != 0 {
            self.args.paged = true;
            self.args.offset = if offset > 0 { Some(offset) } else { None };
            self.args.posts_per_page = max;
        }
    }

    fn group_by(&mut self, columns: &[String]) {
        self.args
            .group_by_columns
            .extend(columns.iter().map(|column| clean_column(column)));
    }

    fn is_select_statement(&self) -> bool {
        self.args.is_select
    }

    fn is_delete_statement(&self) -> bool {
        self.args.is_delete
    }
}
