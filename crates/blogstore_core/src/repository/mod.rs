//! Repositories: the CRUD contract and its middleware stack.
//!
//! Every table is served by a stack of [`TableStore`] layers:
//!
//! ```text
//! Repository
//!   -> ReadFallback   (read failures are logged and degrade)
//!   -> WriteGate      (frozen tables reject ordinary writes)
//!   -> SchemaCheck    (records must match the table descriptor)
//!   -> SqlEngine      (SQL execution and mapping)
//! ```

mod middleware;

pub use middleware::{ReadFallback, SchemaCheck, WriteGate};

use crate::error::CoreResult;
use crate::query::{Query, QueryResult};
use crate::writability::{CallContext, WritabilityService};
use blogstore_codec::{Record, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// The CRUD and query contract of one table.
///
/// Writes carry a [`CallContext`]; reads do not.
pub trait TableStore: Send + Sync {
    /// Physical name of the table.
    fn table_name(&self) -> &str;

    /// Inserts a record, generating `oId` when absent, and returns the id.
    fn add(&self, ctx: &CallContext, record: Record) -> CoreResult<String>;

    /// Updates the columns of `id` that differ from `record`.
    ///
    /// A blank id is a no-op.
    fn update(&self, ctx: &CallContext, id: &str, record: &Record) -> CoreResult<()>;

    /// Deletes `id`. A blank id is a no-op.
    fn remove(&self, ctx: &CallContext, id: &str) -> CoreResult<()>;

    /// Fetches one record.
    fn get(&self, id: &str) -> CoreResult<Option<Record>>;

    /// Fetches several records, keyed by id. Missing ids are left out.
    fn get_many(&self, ids: &[String]) -> CoreResult<HashMap<String, Record>>;

    /// Returns true if `id` exists.
    fn has(&self, id: &str) -> CoreResult<bool> {
        Ok(self.get(id)?.is_some())
    }

    /// Runs a query.
    fn query(&self, query: &Query) -> CoreResult<QueryResult>;

    /// Runs a raw select with positional parameters.
    fn select(&self, sql: &str, params: &[Value]) -> CoreResult<Vec<Record>>;

    /// Fetches up to `fetch_size` random records.
    fn get_randomly(&self, fetch_size: usize) -> CoreResult<Vec<Record>>;

    /// Counts every record.
    fn count(&self) -> CoreResult<u64>;

    /// Counts records matching the query's filter.
    fn count_query(&self, query: &Query) -> CoreResult<u64>;
}

/// A per-table repository handle.
///
/// Cheap to clone. Plain write methods run as an ordinary caller; the
/// `_with` variants take an explicit [`CallContext`].
#[derive(Clone)]
pub struct Repository {
    name: String,
    store: Arc<dyn TableStore>,
    writability: Arc<WritabilityService>,
}

impl Repository {
    /// Wraps a store stack.
    pub fn new(
        name: impl Into<String>,
        store: Arc<dyn TableStore>,
        writability: Arc<WritabilityService>,
    ) -> Self {
        Self {
            name: name.into(),
            store,
            writability,
        }
    }

    /// Logical table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Physical table name.
    pub fn table_name(&self) -> &str {
        self.store.table_name()
    }

    /// See [`TableStore::add`].
    pub fn add(&self, record: Record) -> CoreResult<String> {
        self.store.add(&CallContext::standard(), record)
    }

    /// [`add`](Self::add) under an explicit context.
    pub fn add_with(&self, ctx: &CallContext, record: Record) -> CoreResult<String> {
        self.store.add(ctx, record)
    }

    /// See [`TableStore::update`].
    pub fn update(&self, id: &str, record: &Record) -> CoreResult<()> {
        self.store.update(&CallContext::standard(), id, record)
    }

    /// [`update`](Self::update) under an explicit context.
    pub fn update_with(&self, ctx: &CallContext, id: &str, record: &Record) -> CoreResult<()> {
        self.store.update(ctx, id, record)
    }

    /// See [`TableStore::remove`].
    pub fn remove(&self, id: &str) -> CoreResult<()> {
        self.store.remove(&CallContext::standard(), id)
    }

    /// [`remove`](Self::remove) under an explicit context.
    pub fn remove_with(&self, ctx: &CallContext, id: &str) -> CoreResult<()> {
        self.store.remove(ctx, id)
    }

    /// See [`TableStore::get`].
    pub fn get(&self, id: &str) -> CoreResult<Option<Record>> {
        self.store.get(id)
    }

    /// See [`TableStore::get_many`].
    pub fn get_many(&self, ids: &[String]) -> CoreResult<HashMap<String, Record>> {
        self.store.get_many(ids)
    }

    /// See [`TableStore::has`].
    pub fn has(&self, id: &str) -> CoreResult<bool> {
        self.store.has(id)
    }

    /// See [`TableStore::query`].
    pub fn query(&self, query: &Query) -> CoreResult<QueryResult> {
        self.store.query(query)
    }

    /// See [`TableStore::select`].
    pub fn select(&self, sql: &str, params: &[Value]) -> CoreResult<Vec<Record>> {
        self.store.select(sql, params)
    }

    /// See [`TableStore::get_randomly`].
    pub fn get_randomly(&self, fetch_size: usize) -> CoreResult<Vec<Record>> {
        self.store.get_randomly(fetch_size)
    }

    /// See [`TableStore::count`].
    pub fn count(&self) -> CoreResult<u64> {
        self.store.count()
    }

    /// See [`TableStore::count_query`].
    pub fn count_query(&self, query: &Query) -> CoreResult<u64> {
        self.store.count_query(query)
    }

    /// Returns true if ordinary callers may write.
    pub fn is_writable(&self) -> bool {
        self.writability.is_writable(self.table_name())
    }

    /// Freezes or unfreezes the table.
    pub fn set_writable(&self, writable: bool) {
        self.writability.set_writable(self.table_name(), writable);
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("name", &self.name)
            .field("table", &self.store.table_name())
            .finish_non_exhaustive()
    }
}
