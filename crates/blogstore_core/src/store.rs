//! The store: one database, one schema, many repositories.

use crate::config::StoreConfig;
use crate::dialect::{Dialect, DialectId};
use crate::engine::SqlEngine;
use crate::error::{CoreError, CoreResult};
use crate::keygen::KeyGenerator;
use crate::repository::{ReadFallback, Repository, SchemaCheck, WriteGate};
use crate::schema::SchemaRegistry;
use crate::transaction::{Transaction, TransactionManager};
use crate::types::CreateTableResult;
use crate::writability::WritabilityService;
use blogstore_storage::{ConnectionSource, SqliteSource};
use std::sync::Arc;
use std::time::Duration;

/// Entry point of the engine.
///
/// A store ties together the connection source, the schema registry, the
/// dialect, the transaction manager, and the writability service, and hands
/// out [`Repository`] handles that share them.
///
/// # Example
///
/// ```rust
/// use blogstore_core::{Record, SchemaRegistry, Store, StoreConfig};
///
/// let schema = SchemaRegistry::from_json(
///     r#"{"tables":[{"name":"tag","keys":[
///         {"name":"oId","type":"String","iskey":true},
///         {"name":"tag_title","type":"String"}]}]}"#,
///     None,
/// ).unwrap();
/// let store = Store::open_temporary(StoreConfig::new(), schema).unwrap();
/// store.init_tables();
///
/// let tags = store.repository("tag").unwrap();
/// let id = tags.add(Record::new().with("tag_title", "rust")).unwrap();
/// assert!(tags.has(&id).unwrap());
/// ```
pub struct Store {
    config: StoreConfig,
    schema: Arc<SchemaRegistry>,
    dialect: Arc<dyn Dialect>,
    transactions: Arc<TransactionManager>,
    writability: Arc<WritabilityService>,
    keygen: Arc<dyn KeyGenerator>,
}

impl Store {
    /// Opens the store described by `config`.
    ///
    /// The schema is read from `schema_path`; without one the store is
    /// permissive.
    ///
    /// # Errors
    ///
    /// Returns an error if the dialect has no driver, the database cannot be
    /// opened, or the schema cannot be loaded.
    pub fn open(config: StoreConfig) -> CoreResult<Self> {
        let prefix = config.table_prefix.as_deref();
        let schema = match &config.schema_path {
            Some(path) => SchemaRegistry::load(path, prefix)?,
            None => SchemaRegistry::permissive().with_prefix(prefix),
        };
        Self::open_with_schema(config, schema)
    }

    /// Opens the database described by `config` with a prepared schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the dialect has no driver or the database cannot
    /// be opened.
    pub fn open_with_schema(config: StoreConfig, schema: SchemaRegistry) -> CoreResult<Self> {
        if config.dialect != DialectId::Sqlite {
            return Err(CoreError::configuration(format!(
                "no bundled driver for dialect {}, supply a connection source",
                config.dialect
            )));
        }
        let source = match &config.database {
            Some(path) => SqliteSource::file(path)?
                .with_busy_timeout(Duration::from_millis(config.busy_timeout_ms)),
            None => SqliteSource::temporary()?,
        };
        Ok(Self::open_with_source(config, Arc::new(source), schema))
    }

    /// Opens a private temporary database, ignoring `config.database`.
    ///
    /// The database file is removed when the store drops.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary database cannot be created.
    pub fn open_temporary(config: StoreConfig, schema: SchemaRegistry) -> CoreResult<Self> {
        let source = SqliteSource::temporary()?;
        Ok(Self::open_with_source(config, Arc::new(source), schema))
    }

    /// Assembles a store over any connection source.
    pub fn open_with_source(
        config: StoreConfig,
        source: Arc<dyn ConnectionSource>,
        schema: SchemaRegistry,
    ) -> Self {
        tracing::info!(
            source = %source.describe(),
            dialect = %config.dialect,
            permissive = schema.is_permissive(),
            "opening store"
        );
        Self {
            dialect: config.dialect.create(),
            keygen: config.key_generator.create(),
            transactions: Arc::new(TransactionManager::new(source)),
            writability: Arc::new(WritabilityService::new()),
            schema: Arc::new(schema),
            config,
        }
    }

    /// Returns the repository of a logical table.
    ///
    /// Repositories are cheap handles; asking twice yields two handles over
    /// the same table and writability flag.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a schema is loaded and does not
    /// describe the table.
    pub fn repository(&self, name: &str) -> CoreResult<Repository> {
        let descriptor = self.schema.descriptor(name)?.cloned();
        let table = self.physical_name(name, descriptor.as_ref().map(|d| d.name.as_str()));
        self.writability.register(&table);

        let engine = SqlEngine::new(
            table,
            descriptor,
            Arc::clone(&self.dialect),
            Arc::clone(&self.transactions),
            Arc::clone(&self.keygen),
        );
        let stack = ReadFallback::new(WriteGate::new(
            SchemaCheck::new(engine, Arc::clone(&self.schema)),
            Arc::clone(&self.writability),
        ));
        Ok(Repository::new(
            name,
            Arc::new(stack),
            Arc::clone(&self.writability),
        ))
    }

    fn physical_name(&self, requested: &str, described: Option<&str>) -> String {
        match described {
            Some(bare) => self.schema.physical_name(bare),
            None => self.schema.physical_name(requested),
        }
    }

    /// Begins a transaction on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread already has an open transaction.
    pub fn begin(&self) -> CoreResult<Transaction> {
        self.transactions.begin()
    }

    /// Runs `f` in a transaction, committing on `Ok` and rolling back on
    /// `Err`.
    ///
    /// # Errors
    ///
    /// Returns the error of `f`, or of beginning or committing.
    pub fn transaction<T>(&self, f: impl FnOnce() -> CoreResult<T>) -> CoreResult<T> {
        self.transactions.run(f)
    }

    /// Returns true if the calling thread has an open transaction.
    pub fn has_transaction(&self) -> bool {
        self.transactions.has_transaction()
    }

    /// `create table` statements for every described table.
    pub fn ddl(&self) -> Vec<String> {
        self.schema
            .tables()
            .map(|t| {
                self.dialect
                    .create_table_sql(&self.schema.physical_name(&t.name), t)
            })
            .collect()
    }

    /// Creates every described table that does not exist yet.
    ///
    /// Failures are logged and reported per table, never propagated.
    pub fn init_tables(&self) -> Vec<CreateTableResult> {
        self.schema
            .tables()
            .map(|descriptor| {
                let name = self.schema.physical_name(&descriptor.name);
                let sql = self.dialect.create_table_sql(&name, descriptor);
                tracing::trace!(sql = %sql, "create table");
                let outcome = self
                    .transactions
                    .with_connection(|conn| Ok(conn.execute_batch(&sql)?));
                let success = match outcome {
                    Ok(()) => {
                        tracing::info!(table = %name, "created table");
                        true
                    }
                    Err(e) => {
                        tracing::error!(table = %name, error = %e, "failed to create table");
                        false
                    }
                };
                CreateTableResult { name, success }
            })
            .collect()
    }

    /// Empties a table, or drops it when `drop` is set.
    ///
    /// # Errors
    ///
    /// Returns an error for undescribed tables or if the statement fails.
    pub fn clear_table(&self, name: &str, drop: bool) -> CoreResult<()> {
        let described = self.schema.descriptor(name)?.map(|d| d.name.clone());
        let table = self.physical_name(name, described.as_deref());
        let sql = self.dialect.clear_table_sql(&table, drop);
        tracing::info!(table = %table, drop, "clearing table");
        self.transactions
            .with_connection(|conn| Ok(conn.execute_batch(&sql)?))
    }

    /// Names of the tables that exist in the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read.
    pub fn table_names(&self) -> CoreResult<Vec<String>> {
        self.transactions
            .with_connection(|conn| Ok(conn.table_names()?))
    }

    /// The configuration the store was opened with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The schema registry.
    pub fn schema(&self) -> &Arc<SchemaRegistry> {
        &self.schema
    }

    /// The active dialect.
    pub fn dialect(&self) -> &Arc<dyn Dialect> {
        &self.dialect
    }

    /// The writability service.
    pub fn writability(&self) -> &Arc<WritabilityService> {
        &self.writability
    }

    /// The transaction manager.
    pub fn transactions(&self) -> &Arc<TransactionManager> {
        &self.transactions
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("dialect", &self.dialect.id())
            .field("source", &self.transactions.source().describe())
            .field("tables", &self.schema.table_names())
            .finish_non_exhaustive()
    }
}
