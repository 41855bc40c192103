//! Document backend: typed documents in the shared posts table, with every
//! custom property mirrored into postmeta rows

use crate::condition::Predicate;
use crate::entity::Entity;
use crate::errors::MapperError;
use crate::query_builder::document::{DocumentQuery, QueryArgs};
use crate::query_builder::filter::LogicalOperator;
use crate::schema::ColumnRegistry;
use crate::traits::driver::{DocumentStore, MetaRow, MetadataStore};
use crate::traits::mapper::{BackendKind, EntityMapper, MapperContext, QueryBuilder};
use cache_system::fingerprint;
use std::rc::Rc;
use type_mapping::{Fields, Value};

/// Primary key of every document
pub const DOCUMENT_PRIMARY_KEY: &str = "ID";

/// Longest object name the posts table accepts as a post type
pub const MAX_OBJECT_NAME_LENGTH: usize = 20;

const CONTENT_FIELDS: [&str; 2] = ["post_content_filtered", "post_content"];

#[derive(Debug)]
pub struct DocumentMapper {
    store: Rc<dyn DocumentStore>,
    meta: Rc<dyn MetadataStore>,
    table: String,
    object_name: String,
    query: DocumentQuery,
}

impl DocumentMapper {
    pub fn new(
        store: Rc<dyn DocumentStore>,
        meta: Rc<dyn MetadataStore>,
        table: &str,
        object_name: &str,
    ) -> Self {
        Self {
            store,
            meta,
            table: table.to_string(),
            object_name: object_name.to_string(),
            query: DocumentQuery::new(object_name, DOCUMENT_PRIMARY_KEY),
        }
    }

    /// Flatten an entity into a document. Everything that is not a posts
    /// column is encoded into both content fields; composite values never
    /// reach the posts table directly.
    fn convert_entity_to_post(
        &self,
        ctx: &MapperContext<'_>,
        entity: &Entity,
    ) -> Result<Fields, MapperError> {
        let mut content = entity.fields().clone();
        content.retain(|property, _| !ctx.registry.has_table_column(property));
        let encoded = ctx.codec.encode(&Value::Map(content))?;

        let mut post = entity.fields().clone();
        for field in CONTENT_FIELDS {
            post.shift_remove(field);
        }
        post.insert("post_content".to_string(), Value::Text(encoded.clone()));
        post.insert("post_content_filtered".to_string(), Value::Text(encoded));
        post.insert("post_type".to_string(), Value::from(self.object_name.as_str()));
        post.retain(|_, value| !value.is_composite());

        if !post.contains_key("post_title") {
            post.insert(
                "post_title".to_string(),
                Value::Text(format!("Untitled {}", self.object_name)),
            );
        }
        if !post.contains_key("post_excerpt") {
            post.insert("post_excerpt".to_string(), Value::Text(String::new()));
        }
        Ok(post)
    }

    /// Replace every postmeta row of a document with the entity's custom properties
    fn flush_and_update_postmeta(
        &self,
        ctx: &MapperContext<'_>,
        post_id: i64,
        entity: &Entity,
    ) -> Result<(), MapperError> {
        self.meta.delete_by_owner(post_id)?;

        let mut rows = Vec::new();
        for (key, value) in entity.fields() {
            if ctx.registry.has_table_column(key) {
                continue;
            }
            let value = if value.is_composite() {
                ctx.codec.encode(value)?
            } else {
                value.to_text().unwrap_or_default()
            };
            rows.push(MetaRow {
                owner_id: post_id,
                key: key.clone(),
                value,
            });
        }

        if !rows.is_empty() {
            self.meta.bulk_insert(&rows)?;
        }
        Ok(())
    }

    fn write(
        &mut self,
        ctx: &mut MapperContext<'_>,
        entity: &mut Entity,
    ) -> Result<Option<i64>, MapperError> {
        let post = self.convert_entity_to_post(ctx, entity)?;
        let post_id = self.store.save_document(&post)?;

        if let Some(stored) = self.find_by_id(ctx, post_id) {
            entity.merge(stored.into_fields());
        }
        self.flush_and_update_postmeta(ctx, post_id, entity)?;
        entity.set(DOCUMENT_PRIMARY_KEY, post_id);
        Ok(Some(post_id))
    }
}

impl EntityMapper for DocumentMapper {
    fn kind(&self) -> BackendKind {
        BackendKind::Document
    }

    fn table_name(&self) -> &str {
        &self.table
    }

    fn primary_key_column(&self) -> &str {
        DOCUMENT_PRIMARY_KEY
    }

    fn query(&self) -> &dyn QueryBuilder {
        &self.query
    }

    fn query_mut(&mut self) -> &mut dyn QueryBuilder {
        &mut self.query
    }

    fn generated_query(&self, _registry: &ColumnRegistry) -> String {
        self.query.args().to_json()
    }

    fn query_args(&self) -> Option<&QueryArgs> {
        Some(self.query.args())
    }

    fn introspect_columns(&self) -> Result<Vec<String>, MapperError> {
        self.store.native_columns()
    }

    fn fetch_rows(&mut self, ctx: &mut MapperContext<'_>, sql: Option<&str>) -> Vec<Fields> {
        {
            let args = self.query.args_mut();
            args.update_post_meta_cache = false;
            args.no_found_posts = false;
            args.debug = ctx.debug;
            if let Some(sql) = sql {
                args.cache_results = false;
                args.custom_sql = Some(sql.to_string());
            }
        }

        let args = self.query.args().clone();
        let serialized = args.to_json();
        let key = fingerprint(&serialized);
        if ctx.debug {
            tracing::debug!(post_type = %self.object_name, args = %serialized, "datamapper query");
        }
        debug_log!("Querying {} documents: {}", self.object_name, serialized);

        if args.is_select {
            if let Some(rows) = ctx.cache.get(&key) {
                trace_log!("Result cache hit for {}", key);
                return rows;
            }
        }

        // whatever else rewrites the arguments, the store runs ours
        let forced = args.clone();
        let rows = match self
            .store
            .query(&args, &mut |working: &mut QueryArgs| *working = forced.clone())
        {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(post_type = %self.object_name, error = %e, "document query failed");
                return Vec::new();
            }
        };

        if args.is_delete {
            for row in &rows {
                let id = row.get(DOCUMENT_PRIMARY_KEY).map(Value::to_int).unwrap_or(0);
                if id <= 0 {
                    continue;
                }
                if let Err(e) = self.store.delete_document(id) {
                    tracing::warn!(post_type = %self.object_name, id, error = %e, "delete failed");
                }
            }
            ctx.cache.flush();
            return Vec::new();
        }

        if args.is_select {
            ctx.cache.cache(&key, rows.clone());
        }
        rows
    }

    /// Decoded content wins over the stored columns; the content fields
    /// themselves are dropped before marshaling.
    fn row_to_entity(&self, mut row: Fields, ctx: &MapperContext<'_>) -> Option<Entity> {
        if row.get(DOCUMENT_PRIMARY_KEY).map_or(true, Value::is_null) {
            return None;
        }

        for field in CONTENT_FIELDS {
            let decoded = match row.get(field) {
                Some(Value::Text(text)) => ctx.codec.decode(text).ok(),
                _ => None,
            };
            if let Some(Value::Map(content)) = decoded {
                for (key, value) in content {
                    row.insert(key, value);
                }
            }
        }
        for field in CONTENT_FIELDS {
            row.shift_remove(field);
        }

        let mut entity = Entity::from_fields(row);
        ctx.marshaler.convert_to_entity(&mut entity);
        Some(entity)
    }

    fn count(&mut self, ctx: &mut MapperContext<'_>) -> usize {
        self.query.select(Some(DOCUMENT_PRIMARY_KEY));
        self.fetch_rows(ctx, None).len()
    }

    fn count_where(&mut self, ctx: &mut MapperContext<'_>, predicates: Vec<Predicate>) -> usize {
        self.query.select(Some(DOCUMENT_PRIMARY_KEY));
        self.query.add_where_clause(predicates, LogicalOperator::And);
        self.fetch_rows(ctx, None).len()
    }

    fn find_last(
        &mut self,
        ctx: &mut MapperContext<'_>,
        predicates: Vec<Predicate>,
    ) -> Option<Entity> {
        let count = self.count_where(ctx, predicates.clone());
        if count == 0 {
            return None;
        }

        self.query.select(None);
        self.query.add_where_clause(predicates, LogicalOperator::And);
        let offset = count as i64 - 1;
        if offset > 0 {
            self.query.limit(1, offset);
        }
        self.fetch_entities(ctx, None).into_iter().next()
    }

    fn save_entity(
        &mut self,
        ctx: &mut MapperContext<'_>,
        entity: &mut Entity,
    ) -> Result<Option<i64>, MapperError> {
        let outcome = self.write(ctx, entity);
        entity.set_id_field(DOCUMENT_PRIMARY_KEY);
        ctx.cache.flush();
        outcome
    }

    fn destroy(&mut self, ctx: &mut MapperContext<'_>, id: i64) -> bool {
        let deleted = match self.store.delete_document(id) {
            Ok(deleted) => deleted,
            Err(e) => {
                tracing::warn!(post_type = %self.object_name, id, error = %e, "delete failed");
                false
            }
        };
        ctx.cache.flush();
        deleted
    }
}
