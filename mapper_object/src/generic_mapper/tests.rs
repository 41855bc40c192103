use super::*;
use crate::condition::Conditions;
use crate::drivers::{MemoryDocumentStore, MemoryDriver};
use crate::entity::Entity;
use crate::errors::MapperError;
use crate::traits::validation::{RequiredFields, Validation};
use config::MapperConfig;
use pretty_assertions::assert_eq;
use std::cell::Cell;
use std::rc::Rc;
use type_mapping::{Fields, Value};

fn items_driver() -> Rc<MemoryDriver> {
    let driver = Rc::new(MemoryDriver::new());
    driver.create_table("wp_items", &["id", "title"], Some("id"));
    driver
}

fn items_mapper(driver: &Rc<MemoryDriver>) -> DataMapper {
    DataMapper::relational("items", driver.clone())
        .column("id", "BIGINT", Value::Null)
        .column("title", "VARCHAR(255)", "")
        .column("views", "INT(11)", 0)
        .build()
        .unwrap()
}

fn selects(driver: &MemoryDriver) -> usize {
    driver
        .executed()
        .iter()
        .filter(|statement| statement.starts_with("SELECT"))
        .count()
}

fn item(title: &str, views: i64) -> Entity {
    Entity::new().with("title", title).with("views", views)
}

#[test]
fn test_build_names_table_and_discovers_primary_key() {
    let driver = items_driver();
    let mapper = items_mapper(&driver);

    assert_eq!(mapper.table_name(), "wp_items");
    assert_eq!(mapper.primary_key_column(), "id");
    assert!(mapper.has_column("views"));
}

#[test]
fn test_build_without_primary_key_fails() {
    let driver = Rc::new(MemoryDriver::new());
    driver.create_table("wp_logs", &["message"], None);

    let result = DataMapper::relational("logs", driver)
        .column("message", "TEXT", "")
        .build();
    assert!(matches!(result, Err(MapperError::PrimaryKeyUndetermined(table)) if table == "wp_logs"));
}

#[test]
fn test_auto_migrate_requires_columns() {
    let driver = items_driver();
    let result = DataMapper::relational("items", driver).build();
    assert!(matches!(result, Err(MapperError::ColumnsNotDefined(name)) if name == "items"));
}

#[test]
fn test_migrate_adds_missing_columns_once() {
    let driver = items_driver();
    let mapper = items_mapper(&driver);

    let alters: Vec<String> = driver
        .executed()
        .into_iter()
        .filter(|statement| statement.starts_with("ALTER"))
        .collect();
    assert_eq!(alters.len(), 1);
    assert!(alters[0].contains("`views`"));

    driver.clear_log();
    assert_eq!(mapper.migrate().unwrap(), 0);
    assert!(driver.executed().iter().all(|statement| !statement.starts_with("ALTER")));
}

#[test]
fn test_save_assigns_id_and_casts_on_read() {
    let driver = items_driver();
    let mapper = items_mapper(&driver);

    let mut entity = item("First", 0).with("views", "42");
    let id = mapper.save(&mut entity).unwrap();
    assert_eq!(id, Some(1));
    assert_eq!(entity.get("id"), Some(&Value::Int(1)));

    let found = mapper.find(1).unwrap();
    assert_eq!(found.get("views"), Some(&Value::Int(42)));
    assert_eq!(found.get("title"), Some(&Value::from("First")));
}

#[test]
fn test_save_writes_marshaled_row() {
    let driver = items_driver();
    let mapper = items_mapper(&driver);

    let mut entity = Entity::new().with("title", r"No \'views\'");
    mapper.save(&mut entity).unwrap();

    let rows = driver.rows("wp_items");
    assert_eq!(rows.len(), 1);
    let views = rows[0].get("views").unwrap();
    assert!(!views.is_null());
    assert_eq!(views.to_int(), 0);
    assert_eq!(rows[0].get("title"), Some(&Value::from("No 'views'")));

    assert_eq!(mapper.count_where(("views = %d", 0)), 1);
}

#[test]
fn test_save_updates_existing_row() {
    let driver = items_driver();
    let mapper = items_mapper(&driver);

    let mut entity = item("Draft", 1);
    mapper.save(&mut entity).unwrap();
    entity.set("title", "Final");
    assert_eq!(mapper.save(&mut entity).unwrap(), Some(1));

    assert_eq!(driver.rows("wp_items").len(), 1);
    let found = mapper.find(&entity).unwrap();
    assert_eq!(found.get("title"), Some(&Value::from("Final")));
}

#[test]
fn test_invalid_entity_is_not_saved() {
    let driver = items_driver();
    let mapper = DataMapper::relational("items", driver.clone())
        .column("title", "VARCHAR(255)", "")
        .validator(RequiredFields::new(["title"]))
        .build()
        .unwrap();

    let mut entity = Entity::new();
    assert_eq!(mapper.save(&mut entity).unwrap(), None);
    assert!(driver.rows("wp_items").is_empty());

    let errors = mapper.get_errors(&entity);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].to_string().contains("title"));
}

#[test]
fn test_select_results_are_cached_until_a_write() {
    let driver = items_driver();
    let mapper = items_mapper(&driver);
    mapper.save(&mut item("One", 1)).unwrap();

    driver.clear_log();
    assert_eq!(mapper.find_all(("views >= %d", 0)).len(), 1);
    assert_eq!(mapper.find_all(("views >= %d", 0)).len(), 1);
    assert_eq!(selects(&driver), 1);
    assert_eq!(mapper.cached_queries(), 1);

    mapper.save(&mut item("Two", 2)).unwrap();
    driver.clear_log();
    assert_eq!(mapper.find_all(("views >= %d", 0)).len(), 2);
    assert_eq!(selects(&driver), 1);
}

#[test]
fn test_disabled_cache_always_hits_the_driver() {
    let driver = items_driver();
    let mapper = items_mapper(&driver);
    mapper.set_use_cache(false);

    driver.clear_log();
    mapper.find_all(Conditions::none());
    mapper.find_all(Conditions::none());
    assert_eq!(selects(&driver), 2);
    assert_eq!(mapper.cached_queries(), 0);
}

#[test]
fn test_count_ignores_limit() {
    let driver = items_driver();
    let mapper = items_mapper(&driver);
    for (title, views) in [("a", 1), ("b", 5), ("c", 9)] {
        mapper.save(&mut item(title, views)).unwrap();
    }

    mapper.select(None).limit(1, 0);
    assert_eq!(mapper.count(), 3);
    assert_eq!(mapper.count_where(("views > %d", 2)), 2);
}

#[test]
fn test_find_first_and_last() {
    let driver = items_driver();
    let mapper = items_mapper(&driver);
    for (title, views) in [("a", 1), ("b", 5), ("c", 9)] {
        mapper.save(&mut item(title, views)).unwrap();
    }

    let first = mapper.find_first(("views > %d", 2)).unwrap();
    assert_eq!(first.get("title"), Some(&Value::from("b")));

    let last = mapper.find_last(Conditions::none()).unwrap();
    assert_eq!(last.get("title"), Some(&Value::from("c")));
    assert!(mapper.find_first(("views > %d", 100)).is_none());
}

#[test]
fn test_destroy_by_id_and_entity() {
    let driver = items_driver();
    let mapper = items_mapper(&driver);
    let mut first = item("a", 1);
    let mut second = item("b", 2);
    mapper.save(&mut first).unwrap();
    mapper.save(&mut second).unwrap();

    assert!(mapper.destroy(1));
    assert!(mapper.destroy(&second));
    assert!(!mapper.destroy(1));
    assert!(!mapper.destroy(0));
    assert_eq!(mapper.count(), 0);
}

#[test]
fn test_defaults_run_once_per_entity() {
    let driver = items_driver();
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let mapper = DataMapper::relational("items", driver)
        .column("title", "VARCHAR(255)", "")
        .defaults(move |entity: &mut Entity| {
            counter.set(counter.get() + 1);
            crate::marshal::set_default_value(entity, "title", "Untitled");
        })
        .build()
        .unwrap();

    let model = mapper.create(Fields::new());
    assert_eq!(calls.get(), 1);
    assert_eq!(model.get("title"), Some(&Value::from("Untitled")));

    let mut entity = model.into_entity();
    mapper.convert_to_entity(&mut entity);
    mapper.convert_to_model(entity);
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_model_save_and_is_new() {
    let driver = items_driver();
    let mapper = items_mapper(&driver);

    let mut model = mapper.create(Fields::new());
    assert!(model.is_new());

    let mut updates = Fields::new();
    updates.insert("title".to_string(), Value::from("Saved"));
    assert_eq!(model.save(updates).unwrap(), Some(1));
    assert!(!model.is_new());
    assert_eq!(model.id(), Some(&Value::Int(1)));
    assert!(model.is_valid());

    assert!(model.destroy());
    assert!(mapper.find(1).is_none());
}

#[test]
fn test_save_json_rejects_non_objects() {
    let driver = items_driver();
    let mapper = items_mapper(&driver);

    let result = mapper.save_json(serde_json::json!([1, 2, 3]));
    assert!(matches!(result, Err(MapperError::InvalidEntity(_))));

    let id = mapper
        .save_json(serde_json::json!({"title": "From JSON", "views": 3}))
        .unwrap();
    assert_eq!(id, Some(1));
}

#[test]
fn test_remove_column_refreshes_column_cache() {
    let driver = items_driver();
    let mapper = items_mapper(&driver);

    assert!(mapper.remove_column("views").unwrap());
    assert!(!mapper.has_column("views"));
    assert_eq!(mapper.lookup_columns().unwrap(), vec!["id", "title"]);
}

#[test]
fn test_document_object_name_length() {
    let store = Rc::new(MemoryDocumentStore::new());
    let result = DataMapper::document("a_very_long_object_name", store.clone(), store.clone()).build();
    assert!(matches!(
        result,
        Err(MapperError::InvalidObjectName { length: 23, .. })
    ));

    let mapper = DataMapper::document("gallery", store.clone(), store)
        .config(MapperConfig::default().with_table_prefix("ngg_"))
        .build()
        .unwrap();
    assert_eq!(mapper.table_name(), "ngg_posts");
    assert_eq!(mapper.primary_key_column(), DOCUMENT_PRIMARY_KEY);
    assert_eq!(mapper.migrate().unwrap(), 0);
}
