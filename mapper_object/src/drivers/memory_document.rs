//! In-memory document store
//!
//! Holds a posts table and a postmeta side table and evaluates [`QueryArgs`]
//! against them. There is no taxonomy or user table, so category and
//! author-name filters are accepted and ignored.

use super::matching::{compare_values, like_match, loose_eq};
use crate::condition::CompareOp;
use crate::errors::MapperError;
use crate::query_builder::document::{MetaClause, MetaGroup, QueryArgs};
use crate::query_builder::filter::LogicalOperator;
use crate::query_builder::ordering::SortOrder;
use crate::traits::driver::{DocumentStore, MetaRow, MetadataStore};
use chrono::{Local, Utc};
use rand::seq::SliceRandom;
use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::fmt;
use type_mapping::{Fields, Value};

/// Columns of the shared posts table
pub const POST_COLUMNS: &[&str] = &[
    "ID",
    "post_author",
    "post_date",
    "post_date_gmt",
    "post_content",
    "post_title",
    "post_excerpt",
    "post_status",
    "comment_status",
    "ping_status",
    "post_password",
    "post_name",
    "to_ping",
    "pinged",
    "post_modified",
    "post_modified_gmt",
    "post_content_filtered",
    "post_parent",
    "guid",
    "menu_order",
    "post_type",
    "post_mime_type",
    "comment_count",
];

const NUMERIC_COLUMNS: &[&str] = &["ID", "post_author", "post_parent", "menu_order", "comment_count"];

type Rewrite = Box<dyn Fn(&mut QueryArgs)>;

/// Document store over in-process posts and postmeta tables
#[derive(Default)]
pub struct MemoryDocumentStore {
    posts: RefCell<Vec<Fields>>,
    meta: RefCell<Vec<MetaRow>>,
    next_id: Cell<i64>,
    queries: RefCell<Vec<QueryArgs>>,
    rewrite: RefCell<Option<Rewrite>>,
}

impl fmt::Debug for MemoryDocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDocumentStore")
            .field("posts", &self.posts.borrow().len())
            .field("meta", &self.meta.borrow().len())
            .finish_non_exhaustive()
    }
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a rewrite applied to every query before the caller's
    /// pre-dispatch hook, the way another plugin might alter arguments
    pub fn set_rewrite(&self, rewrite: impl Fn(&mut QueryArgs) + 'static) {
        *self.rewrite.borrow_mut() = Some(Box::new(rewrite));
    }

    /// Arguments of every executed query, as finally dispatched
    pub fn executed_queries(&self) -> Vec<QueryArgs> {
        self.queries.borrow().clone()
    }

    pub fn posts(&self) -> Vec<Fields> {
        self.posts.borrow().clone()
    }

    pub fn post(&self, id: i64) -> Option<Fields> {
        self.posts
            .borrow()
            .iter()
            .find(|post| post_id(post) == id)
            .cloned()
    }

    pub fn meta_for(&self, owner_id: i64) -> Vec<MetaRow> {
        self.meta
            .borrow()
            .iter()
            .filter(|row| row.owner_id == owner_id)
            .cloned()
            .collect()
    }

    fn meta_values(&self, owner_id: i64, key: &str) -> Vec<Value> {
        self.meta
            .borrow()
            .iter()
            .filter(|row| row.owner_id == owner_id && row.key == key)
            .map(|row| Value::Text(row.value.clone()))
            .collect()
    }

    fn matches(&self, post: &Fields, args: &QueryArgs) -> bool {
        let column = |name: &str| post.get(name).cloned().unwrap_or(Value::Null);
        let id = post_id(post);

        if args.post_type != "any" && column("post_type").to_string() != args.post_type {
            return false;
        }
        if args.post_status != "any" && column("post_status").to_string() != args.post_status {
            return false;
        }
        if !args.post_in.is_empty() && !contains(&args.post_in, &Value::Int(id)) {
            return false;
        }
        if contains(&args.post_not_in, &Value::Int(id)) {
            return false;
        }
        if let Some(author) = &args.author {
            if !loose_eq(&column("post_author"), author) {
                return false;
            }
        }
        if let Some(name) = &args.pagename {
            if column("post_name").to_string() != name.to_string() {
                return false;
            }
        }
        if let Some(pattern) = &args.page_name_like {
            if !like_match(&column("post_name").to_string(), &wrap_like(pattern)) {
                return false;
            }
        }
        if !args.page_name_in.is_empty() && !contains(&args.page_name_in, &column("post_name")) {
            return false;
        }
        if let Some(title) = &args.post_title {
            if column("post_title").to_string() != title.to_string() {
                return false;
            }
        }
        if let Some(pattern) = &args.post_title_like {
            if !like_match(&column("post_title").to_string(), &wrap_like(pattern)) {
                return false;
            }
        }

        args.meta_query
            .iter()
            .all(|group| self.matches_meta_group(id, group))
    }

    fn matches_meta_group(&self, id: i64, group: &MetaGroup) -> bool {
        let mut results = group
            .clauses
            .iter()
            .map(|clause| self.matches_meta_clause(id, clause));
        match group.relation {
            LogicalOperator::And => results.all(|matched| matched),
            LogicalOperator::Or => results.any(|matched| matched),
        }
    }

    fn matches_meta_clause(&self, id: i64, clause: &MetaClause) -> bool {
        let expected: Vec<Value> = match &clause.value {
            Value::List(values) => values.clone(),
            value => vec![value.clone()],
        };
        let first = expected.first().cloned().unwrap_or(Value::Null);

        self.meta_values(id, &clause.key).iter().any(|actual| {
            let ordering = compare_values(actual, &first);
            match clause.compare {
                CompareOp::Eq => loose_eq(actual, &first),
                CompareOp::Ne => !loose_eq(actual, &first),
                CompareOp::Lt => ordering == Ordering::Less,
                CompareOp::Lte => ordering != Ordering::Greater,
                CompareOp::Gt => ordering == Ordering::Greater,
                CompareOp::Gte => ordering != Ordering::Less,
                CompareOp::Like => like_match(&actual.to_string(), &wrap_like(&first)),
                CompareOp::NotLike => !like_match(&actual.to_string(), &wrap_like(&first)),
                CompareOp::In => contains(&expected, actual),
                CompareOp::NotIn => !contains(&expected, actual),
                CompareOp::Between | CompareOp::NotBetween => {
                    let inside = match expected.as_slice() {
                        [low, high, ..] => {
                            compare_values(actual, low) != Ordering::Less
                                && compare_values(actual, high) != Ordering::Greater
                        }
                        _ => false,
                    };
                    inside != (clause.compare == CompareOp::NotBetween)
                }
            }
        })
    }

    fn sort(&self, posts: &mut [Fields], args: &QueryArgs) {
        let Some(orderby) = args.orderby.as_deref() else {
            return;
        };
        if orderby == "rand" {
            posts.shuffle(&mut rand::rng());
            return;
        }

        let direction = args.order.unwrap_or(SortOrder::Desc);
        let column = match orderby {
            "ID" => "ID",
            "name" => "post_name",
            "title" => "post_title",
            "date" => "post_date",
            "modified" => "post_modified",
            "author" => "post_author",
            "parent" => "post_parent",
            "menu_order" => "menu_order",
            "comment_count" => "comment_count",
            _ => "",
        };

        let key = |post: &Fields| -> Value {
            if orderby == "meta_value" {
                let meta_key = args.meta_key.as_deref().unwrap_or_default();
                self.meta_values(post_id(post), meta_key)
                    .into_iter()
                    .next()
                    .unwrap_or(Value::Null)
            } else {
                post.get(column).cloned().unwrap_or(Value::Null)
            }
        };

        posts.sort_by(|left, right| {
            let ordering = compare_values(&key(left), &key(right))
                .then_with(|| post_id(left).cmp(&post_id(right)));
            match direction {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn query(
        &self,
        args: &QueryArgs,
        pre_dispatch: &mut dyn FnMut(&mut QueryArgs),
    ) -> Result<Vec<Fields>, MapperError> {
        let mut working = args.clone();
        if let Some(rewrite) = self.rewrite.borrow().as_ref() {
            rewrite(&mut working);
        }
        pre_dispatch(&mut working);
        self.queries.borrow_mut().push(working.clone());

        if working.custom_sql.is_some() {
            return Err(MapperError::Driver(
                "custom SQL is not supported by the in-memory document store".to_string(),
            ));
        }

        let mut posts: Vec<Fields> = self
            .posts
            .borrow()
            .iter()
            .filter(|post| self.matches(post, &working))
            .cloned()
            .collect();

        self.sort(&mut posts, &working);

        if !working.group_by_columns.is_empty() {
            let mut seen: Vec<Vec<String>> = Vec::new();
            posts.retain(|post| {
                let key: Vec<String> = working
                    .group_by_columns
                    .iter()
                    .map(|column| post.get(column).map(Value::to_string).unwrap_or_default())
                    .collect();
                if seen.contains(&key) {
                    false
                } else {
                    seen.push(key);
                    true
                }
            });
        }

        let offset = working.offset.unwrap_or(0).max(0) as usize;
        let posts = posts.into_iter().skip(offset);
        let posts: Vec<Fields> = if working.posts_per_page >= 0 {
            posts.take(working.posts_per_page as usize).collect()
        } else {
            posts.collect()
        };

        if working.fields.as_deref() == Some("ids") {
            return Ok(posts
                .into_iter()
                .map(|post| {
                    let mut row = Fields::new();
                    row.insert("ID".to_string(), Value::Text(post_id(&post).to_string()));
                    row
                })
                .collect());
        }
        Ok(posts)
    }

    fn save_document(&self, document: &Fields) -> Result<i64, MapperError> {
        let now = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let now_gmt = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let id = document.get("ID").map(Value::to_int).unwrap_or(0);
        let mut posts = self.posts.borrow_mut();

        if id > 0 {
            let post = posts
                .iter_mut()
                .find(|post| post_id(post) == id)
                .ok_or_else(|| MapperError::Driver(format!("Invalid post ID {}", id)))?;
            for (column, value) in document {
                if POST_COLUMNS.contains(&column.as_str()) && column != "ID" {
                    post.insert(column.clone(), stored(value));
                }
            }
            post.insert("post_modified".to_string(), Value::Text(now));
            post.insert("post_modified_gmt".to_string(), Value::Text(now_gmt));
            return Ok(id);
        }

        let id = self.next_id.get() + 1;
        self.next_id.set(id);

        let mut post: Fields = POST_COLUMNS
            .iter()
            .map(|column| {
                let empty = if NUMERIC_COLUMNS.contains(column) { "0" } else { "" };
                (column.to_string(), Value::Text(empty.to_string()))
            })
            .collect();
        for (column, value) in document {
            if POST_COLUMNS.contains(&column.as_str()) {
                post.insert(column.clone(), stored(value));
            }
        }
        post.insert("ID".to_string(), Value::Text(id.to_string()));
        for (column, value) in [
            ("post_date", &now),
            ("post_date_gmt", &now_gmt),
            ("post_modified", &now),
            ("post_modified_gmt", &now_gmt),
        ] {
            post.insert(column.to_string(), Value::Text(value.clone()));
        }
        if post.get("post_status").map_or(true, |status| status.to_string().is_empty()) {
            post.insert("post_status".to_string(), Value::from("draft"));
        }

        posts.push(post);
        Ok(id)
    }

    fn delete_document(&self, id: i64) -> Result<bool, MapperError> {
        let mut posts = self.posts.borrow_mut();
        let before = posts.len();
        posts.retain(|post| post_id(post) != id);
        if posts.len() == before {
            return Ok(false);
        }
        self.meta.borrow_mut().retain(|row| row.owner_id != id);
        Ok(true)
    }

    fn native_columns(&self) -> Result<Vec<String>, MapperError> {
        Ok(POST_COLUMNS.iter().map(|column| column.to_string()).collect())
    }
}

impl MetadataStore for MemoryDocumentStore {
    fn delete_by_owner(&self, owner_id: i64) -> Result<u64, MapperError> {
        let mut meta = self.meta.borrow_mut();
        let before = meta.len();
        meta.retain(|row| row.owner_id != owner_id);
        Ok((before - meta.len()) as u64)
    }

    fn bulk_insert(&self, rows: &[MetaRow]) -> Result<u64, MapperError> {
        self.meta.borrow_mut().extend(rows.iter().cloned());
        Ok(rows.len() as u64)
    }
}

fn post_id(post: &Fields) -> i64 {
    post.get("ID").map(Value::to_int).unwrap_or(0)
}

fn contains(values: &[Value], candidate: &Value) -> bool {
    values.iter().any(|value| loose_eq(value, candidate))
}

fn stored(value: &Value) -> Value {
    match value {
        Value::Null => Value::Text(String::new()),
        value => Value::Text(value.to_string()),
    }
}

/// LIKE filters match anywhere unless the value carries its own wildcard
fn wrap_like(pattern: &Value) -> String {
    let pattern = pattern.to_string();
    if pattern.contains('%') {
        pattern
    } else {
        format!("%{}%", pattern)
    }
}
