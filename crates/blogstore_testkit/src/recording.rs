//! A connection source that records every statement it runs.
//!
//! Used to assert on the SQL a store issues, for example that a listing
//! query with a known page count never counts rows.

use blogstore_codec::Value;
use blogstore_storage::{Connection, ConnectionSource, RawRows, StorageResult};
use parking_lot::Mutex;
use std::sync::Arc;

/// Shared, cloneable view of recorded statements.
#[derive(Debug, Clone, Default)]
pub struct StatementLog {
    statements: Arc<Mutex<Vec<String>>>,
}

impl StatementLog {
    fn push(&self, sql: &str) {
        self.statements.lock().push(sql.to_string());
    }

    /// Every statement recorded so far, oldest first.
    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().clone()
    }

    /// Number of recorded statements containing `fragment`, ignoring case.
    pub fn count_matching(&self, fragment: &str) -> usize {
        let fragment = fragment.to_lowercase();
        self.statements
            .lock()
            .iter()
            .filter(|sql| sql.to_lowercase().contains(&fragment))
            .count()
    }

    /// The most recent statement.
    pub fn last(&self) -> Option<String> {
        self.statements.lock().last().cloned()
    }

    /// Forgets every recorded statement.
    pub fn clear(&self) {
        self.statements.lock().clear();
    }
}

/// Wraps a source, logging statements from every connection it hands out.
///
/// Transaction control (`begin`, `commit`, `rollback`) is logged as the
/// upper-case keyword.
pub struct RecordingSource<S> {
    inner: S,
    log: StatementLog,
}

impl<S: ConnectionSource> RecordingSource<S> {
    /// Wraps `inner`.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            log: StatementLog::default(),
        }
    }

    /// The log shared by every connection of this source.
    pub fn log(&self) -> StatementLog {
        self.log.clone()
    }
}

impl<S: ConnectionSource> ConnectionSource for RecordingSource<S> {
    fn acquire(&self) -> StorageResult<Box<dyn Connection>> {
        Ok(Box::new(RecordingConnection {
            inner: self.inner.acquire()?,
            log: self.log.clone(),
        }))
    }

    fn describe(&self) -> String {
        format!("recording({})", self.inner.describe())
    }
}

/// A connection that logs before delegating.
pub struct RecordingConnection {
    inner: Box<dyn Connection>,
    log: StatementLog,
}

impl Connection for RecordingConnection {
    fn execute(&mut self, sql: &str, params: &[Value]) -> StorageResult<usize> {
        self.log.push(sql);
        self.inner.execute(sql, params)
    }

    fn execute_batch(&mut self, sql: &str) -> StorageResult<()> {
        self.log.push(sql);
        self.inner.execute_batch(sql)
    }

    fn query(&mut self, sql: &str, params: &[Value]) -> StorageResult<RawRows> {
        self.log.push(sql);
        self.inner.query(sql, params)
    }

    fn begin(&mut self) -> StorageResult<()> {
        self.log.push("BEGIN");
        self.inner.begin()
    }

    fn commit(&mut self) -> StorageResult<()> {
        self.log.push("COMMIT");
        self.inner.commit()
    }

    fn rollback(&mut self) -> StorageResult<()> {
        self.log.push("ROLLBACK");
        self.inner.rollback()
    }

    fn table_names(&mut self) -> StorageResult<Vec<String>> {
        self.inner.table_names()
    }
}
