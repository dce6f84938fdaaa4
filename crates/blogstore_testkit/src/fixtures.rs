//! Test fixtures and store helpers.
//!
//! Provides temporary SQLite stores with tables already created.

use crate::recording::{RecordingSource, StatementLog};
use blogstore_core::{Record, SchemaRegistry, Store, StoreConfig};
use blogstore_storage::SqliteSource;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// A two-table schema: tags and their article links.
pub const TAG_SCHEMA: &str = r#"{"tables":[
    {"name":"tag","keys":[
        {"name":"oId","type":"String","nullable":false,"iskey":true},
        {"name":"tag_title","type":"String","nullable":false},
        {"name":"tag_reference_count","type":"int","nullable":true}]},
    {"name":"tag_article","keys":[
        {"name":"oId","type":"String","iskey":true},
        {"name":"tag_oId","type":"String"},
        {"name":"article_oId","type":"String"}]}]}"#;

/// Parses [`TAG_SCHEMA`].
pub fn tag_schema() -> SchemaRegistry {
    SchemaRegistry::from_json(TAG_SCHEMA, None).expect("Invalid tag schema")
}

/// A one-table schema with a nullable column of every logical type.
pub const TYPED_SCHEMA: &str = r#"{"tables":[
    {"name":"sample","keys":[
        {"name":"oId","type":"String","iskey":true},
        {"name":"sample_title","type":"String","length":255},
        {"name":"sample_int","type":"int","nullable":true},
        {"name":"sample_long","type":"long","nullable":true},
        {"name":"sample_double","type":"double","nullable":true},
        {"name":"sample_decimal","type":"Decimal","length":12,"precision":2,"nullable":true},
        {"name":"sample_flag","type":"boolean","nullable":true},
        {"name":"sample_day","type":"Date","nullable":true},
        {"name":"sample_at","type":"Datetime","nullable":true},
        {"name":"sample_body","type":"large-text","nullable":true},
        {"name":"sample_blob","type":"large-binary","nullable":true}]}]}"#;

/// Parses [`TYPED_SCHEMA`].
pub fn typed_schema() -> SchemaRegistry {
    SchemaRegistry::from_json(TYPED_SCHEMA, None).expect("Invalid typed schema")
}

/// A test store with automatic cleanup.
pub struct TestStore {
    /// The store instance.
    pub store: Store,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestStore {
    /// Creates a private store and its tables.
    pub fn temporary(schema: SchemaRegistry) -> Self {
        Self::temporary_with(StoreConfig::new(), schema)
    }

    /// Creates a private store from a configuration.
    pub fn temporary_with(config: StoreConfig, schema: SchemaRegistry) -> Self {
        let store = Store::open_temporary(config, schema).expect("Failed to open temporary store");
        Self::initialized(store, None)
    }

    /// Creates a store backed by a file in a temporary directory.
    pub fn file(schema: SchemaRegistry) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = StoreConfig::new().database(temp_dir.path().join("blog.db"));
        let store = Store::open_with_schema(config, schema).expect("Failed to open file store");
        Self::initialized(store, Some(temp_dir))
    }

    /// Creates a private store whose statements are recorded.
    pub fn recording(schema: SchemaRegistry) -> (Self, StatementLog) {
        Self::recording_with(StoreConfig::new(), schema)
    }

    /// Creates a recorded private store from a configuration.
    pub fn recording_with(config: StoreConfig, schema: SchemaRegistry) -> (Self, StatementLog) {
        let inner = SqliteSource::temporary().expect("Failed to open temporary database");
        let source = RecordingSource::new(inner);
        let log = source.log();
        let store = Store::open_with_source(config, Arc::new(source), schema);
        let test_store = Self::initialized(store, None);
        log.clear();
        (test_store, log)
    }

    fn initialized(store: Store, temp_dir: Option<TempDir>) -> Self {
        for result in store.init_tables() {
            assert!(result.success, "Failed to create table {}", result.name);
        }
        Self {
            store,
            _temp_dir: temp_dir,
        }
    }

    /// Returns the database path if file-based, None if temporary.
    pub fn path(&self) -> Option<PathBuf> {
        self.store.config().database.clone()
    }
}

impl std::ops::Deref for TestStore {
    type Target = Store;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Runs a test with a private temporary store over `schema`.
///
/// # Example
///
/// ```rust
/// use blogstore_core::Record;
/// use blogstore_testkit::{tag_schema, with_temp_store};
///
/// with_temp_store(tag_schema(), |store| {
///     let tags = store.repository("tag").unwrap();
///     tags.add(Record::new().with("tag_title", "rust")).unwrap();
///     assert_eq!(tags.count().unwrap(), 1);
/// });
/// ```
pub fn with_temp_store<F, R>(schema: SchemaRegistry, f: F) -> R
where
    F: FnOnce(&Store) -> R,
{
    let test_store = TestStore::temporary(schema);
    f(&test_store.store)
}

/// Runs a test with a temporary file-backed store.
pub fn with_file_store<F, R>(schema: SchemaRegistry, f: F) -> R
where
    F: FnOnce(&Store, &std::path::Path) -> R,
{
    let test_store = TestStore::file(schema);
    let path = test_store.path().expect("File store should have a path");
    f(&test_store.store, &path)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// A tag store holding `count` tags titled `t0`, `t1`, ...
    ///
    /// Returns the store and the generated ids in insertion order.
    pub fn tagged_store(count: usize) -> (TestStore, Vec<String>) {
        let test_store = TestStore::temporary(tag_schema());
        let tags = test_store.repository("tag").expect("Missing tag table");
        let ids = (0..count)
            .map(|i| {
                tags.add(Record::new().with("tag_title", format!("t{i}")))
                    .expect("Failed to add tag")
            })
            .collect();
        (test_store, ids)
    }
}
