use super::document::{DocumentMapper, DOCUMENT_PRIMARY_KEY, MAX_OBJECT_NAME_LENGTH};
use super::relational::RelationalMapper;
use crate::codec::{Codec, JsonCodec};
use crate::entity::Entity;
use crate::errors::MapperError;
use crate::marshal::EntityMarshaler;
use crate::model::Model;
use crate::schema::{ColumnDefinition, ColumnRegistry};
use crate::traits::defaults::DefaultsHook;
use crate::traits::driver::{DocumentStore, MetadataStore, RelationalDriver};
use crate::traits::mapper::{BackendKind, EntityMapper, MapperContext};
use crate::traits::validation::EntityValidator;
use crate::validation::ValidatedTableName;
use cache_system::{CacheManager, QueryCache};
use config::MapperConfig;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use type_mapping::{Fields, Value};

/// A record to operate on: a bare primary key or something carrying one
#[derive(Debug, Clone)]
pub enum EntityRef {
    Id(i64),
    Entity(Entity),
}

impl EntityRef {
    /// Primary key as an integer; anything unidentifiable resolves to 0
    pub fn resolve(&self, primary_key: &str) -> i64 {
        match self {
            EntityRef::Id(id) => *id,
            EntityRef::Entity(entity) => entity.get(primary_key).map(Value::to_int).unwrap_or(0),
        }
    }
}

impl From<i64> for EntityRef {
    fn from(id: i64) -> Self {
        EntityRef::Id(id)
    }
}

impl From<i32> for EntityRef {
    fn from(id: i32) -> Self {
        EntityRef::Id(i64::from(id))
    }
}

impl From<Entity> for EntityRef {
    fn from(entity: Entity) -> Self {
        EntityRef::Entity(entity)
    }
}

impl From<&Entity> for EntityRef {
    fn from(entity: &Entity) -> Self {
        EntityRef::Entity(entity.clone())
    }
}

impl From<&Model> for EntityRef {
    fn from(model: &Model) -> Self {
        EntityRef::Entity(model.entity().clone())
    }
}

pub(crate) struct MapperInner {
    pub(crate) object_name: String,
    pub(crate) primary_key: String,
    pub(crate) config: MapperConfig,
    pub(crate) backend: RefCell<Box<dyn EntityMapper>>,
    pub(crate) registry: RefCell<ColumnRegistry>,
    pub(crate) cache: RefCell<QueryCache<Vec<Fields>>>,
    pub(crate) transient: CacheManager,
    pub(crate) codec: Rc<dyn Codec>,
    pub(crate) validator: Option<Rc<dyn EntityValidator>>,
    pub(crate) defaults: Option<Rc<dyn DefaultsHook>>,
}

/// Entry point for one table or document type.
///
/// Cloning is cheap and every clone shares the same query state, column
/// registry and result cache. Builder methods return `&Self` so calls chain:
///
/// ```ignore
/// let published = mapper
///     .select(None)
///     .where_and([("status = %s", "published"), ("views > %d", 100)])
///     .order_by("views", SortOrder::Desc)
///     .limit(10, 0)
///     .run_query(None);
/// ```
#[derive(Clone)]
pub struct DataMapper {
    pub(crate) inner: Rc<MapperInner>,
}

impl fmt::Debug for DataMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataMapper")
            .field("object_name", &self.inner.object_name)
            .field("table", &self.table_name())
            .field("primary_key", &self.inner.primary_key)
            .field("use_cache", &self.inner.cache.borrow().is_enabled())
            .finish_non_exhaustive()
    }
}

impl DataMapper {
    /// Start building a mapper over a relational table
    pub fn relational(object_name: &str, driver: Rc<dyn RelationalDriver>) -> MapperBuilder {
        MapperBuilder::new(object_name, Backend::Relational(driver))
    }

    /// Start building a mapper over documents of type `object_name`
    pub fn document(
        object_name: &str,
        store: Rc<dyn DocumentStore>,
        meta: Rc<dyn MetadataStore>,
    ) -> MapperBuilder {
        MapperBuilder::new(object_name, Backend::Document(store, meta))
    }

    pub fn object_name(&self) -> &str {
        &self.inner.object_name
    }

    pub fn table_name(&self) -> String {
        self.inner.backend.borrow().table_name().to_string()
    }

    pub fn primary_key_column(&self) -> &str {
        &self.inner.primary_key
    }

    pub fn kind(&self) -> BackendKind {
        self.inner.backend.borrow().kind()
    }

    pub fn config(&self) -> &MapperConfig {
        &self.inner.config
    }

    pub fn cache_manager(&self) -> &CacheManager {
        &self.inner.transient
    }

    /// Whether two handles point at the same mapper
    pub fn same_mapper(&self, other: &DataMapper) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Run `f` against the backend with everything it borrows from the mapper
    pub(crate) fn with_backend<R>(
        &self,
        f: impl FnOnce(&mut dyn EntityMapper, &mut MapperContext<'_>) -> R,
    ) -> R {
        let inner = &*self.inner;
        let registry = inner.registry.borrow();
        let mut cache = inner.cache.borrow_mut();
        let mut backend = inner.backend.borrow_mut();
        let marshaler = EntityMarshaler {
            registry: &registry,
            codec: inner.codec.as_ref(),
            primary_key: &inner.primary_key,
            defaults: inner.defaults.as_deref(),
        };
        let mut ctx = MapperContext {
            object_name: &inner.object_name,
            registry: &registry,
            codec: inner.codec.as_ref(),
            marshaler: &marshaler,
            cache: &mut cache,
            debug: inner.config.debug,
        };
        f(&mut **backend, &mut ctx)
    }
}

enum Backend {
    Relational(Rc<dyn RelationalDriver>),
    Document(Rc<dyn DocumentStore>, Rc<dyn MetadataStore>),
}

/// Collects a mapper's configuration, columns and hooks
pub struct MapperBuilder {
    object_name: String,
    backend: Backend,
    config: MapperConfig,
    cache_manager: Option<CacheManager>,
    columns: Vec<ColumnDefinition>,
    serialized: Vec<String>,
    primary_key: Option<String>,
    codec: Rc<dyn Codec>,
    validator: Option<Rc<dyn EntityValidator>>,
    defaults: Option<Rc<dyn DefaultsHook>>,
}

impl MapperBuilder {
    fn new(object_name: &str, backend: Backend) -> Self {
        Self {
            object_name: object_name.to_string(),
            backend,
            config: MapperConfig::default(),
            cache_manager: None,
            columns: Vec::new(),
            serialized: Vec::new(),
            primary_key: None,
            codec: Rc::new(JsonCodec),
            validator: None,
            defaults: None,
        }
    }

    pub fn config(mut self, config: MapperConfig) -> Self {
        self.config = config;
        self
    }

    /// Transient cache for column lists; an in-process one is used otherwise
    pub fn cache_manager(mut self, cache_manager: CacheManager) -> Self {
        self.cache_manager = Some(cache_manager);
        self
    }

    pub fn column(mut self, name: &str, sql_type: &str, default_value: impl Into<Value>) -> Self {
        self.columns
            .push(ColumnDefinition::new(name, sql_type, default_value));
        self
    }

    pub fn serialized_column(mut self, name: &str) -> Self {
        self.serialized.push(name.to_string());
        self
    }

    /// Skip primary-key discovery (relational only)
    pub fn primary_key(mut self, column: &str) -> Self {
        self.primary_key = Some(column.to_string());
        self
    }

    pub fn codec(mut self, codec: impl Codec + 'static) -> Self {
        self.codec = Rc::new(codec);
        self
    }

    pub fn validator(mut self, validator: impl EntityValidator + 'static) -> Self {
        self.validator = Some(Rc::new(validator));
        self
    }

    pub fn defaults(mut self, hook: impl DefaultsHook + 'static) -> Self {
        self.defaults = Some(Rc::new(hook));
        self
    }

    pub fn build(self) -> Result<DataMapper, MapperError> {
        let prefix = &self.config.table_prefix;
        let (backend, primary_key): (Box<dyn EntityMapper>, String) = match self.backend {
            Backend::Relational(driver) => {
                let table = ValidatedTableName::new(&format!("{}{}", prefix, self.object_name))?
                    .into_string();
                let primary_key = match self.primary_key {
                    Some(column) => column,
                    None => driver
                        .primary_key_column(&table)
                        .ok()
                        .flatten()
                        .ok_or_else(|| MapperError::PrimaryKeyUndetermined(table.clone()))?,
                };
                let mapper = RelationalMapper::new(driver, &table, &primary_key);
                (Box::new(mapper), primary_key)
            }
            Backend::Document(store, meta) => {
                let length = self.object_name.chars().count();
                if length > MAX_OBJECT_NAME_LENGTH {
                    return Err(MapperError::InvalidObjectName {
                        name: self.object_name,
                        length,
                        max_length: MAX_OBJECT_NAME_LENGTH,
                    });
                }
                let table = format!("{}posts", prefix);
                let mapper = DocumentMapper::new(store, meta, &table, &self.object_name);
                (Box::new(mapper), DOCUMENT_PRIMARY_KEY.to_string())
            }
        };

        let mut registry = ColumnRegistry::new();
        for column in self.columns {
            registry.define_column(column);
        }
        for column in &self.serialized {
            registry.add_serialized_column(column);
        }

        let auto_migrate = self.config.auto_migrate;
        let mapper = DataMapper {
            inner: Rc::new(MapperInner {
                object_name: self.object_name,
                primary_key,
                cache: RefCell::new(QueryCache::new(self.config.use_cache)),
                config: self.config,
                backend: RefCell::new(backend),
                registry: RefCell::new(registry),
                transient: self.cache_manager.unwrap_or_else(CacheManager::in_memory),
                codec: self.codec,
                validator: self.validator,
                defaults: self.defaults,
            }),
        };

        mapper.lookup_columns()?;
        if auto_migrate && mapper.kind() == BackendKind::Relational {
            mapper.migrate()?;
        }
        debug_log!(
            "Built {:?} mapper for {} on {}",
            mapper.kind(),
            mapper.object_name(),
            mapper.table_name()
        );
        Ok(mapper)
    }
}
