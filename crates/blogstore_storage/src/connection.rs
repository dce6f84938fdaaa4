//! Connection and connection source traits.

use crate::cell::RawRows;
use crate::error::StorageResult;
use blogstore_codec::Value;

/// A single SQL session.
///
/// Connections are the only thing in Blogstore that talks to a database.
/// Statements use positional `?` placeholders bound from `params` in order.
///
/// # Invariants
///
/// - `begin` starts a transaction that lasts until `commit` or `rollback`
/// - statements issued between `begin` and `commit` see each other's writes
/// - a connection is used by one thread at a time
///
/// # Implementors
///
/// - [`super::SqliteConnection`] - Backed by `rusqlite`
pub trait Connection: Send {
    /// Executes a statement and returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails to prepare or run.
    fn execute(&mut self, sql: &str, params: &[Value]) -> StorageResult<usize>;

    /// Executes one or more statements with no parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails.
    fn execute_batch(&mut self, sql: &str) -> StorageResult<()>;

    /// Runs a query and materializes every row.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails to prepare or step.
    fn query(&mut self, sql: &str, params: &[Value]) -> StorageResult<RawRows>;

    /// Starts a transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if a transaction is already open on this session.
    fn begin(&mut self) -> StorageResult<()>;

    /// Commits the open transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    fn commit(&mut self) -> StorageResult<()>;

    /// Rolls back the open transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback fails.
    fn rollback(&mut self) -> StorageResult<()>;

    /// Lists the user tables in the database, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read.
    fn table_names(&mut self) -> StorageResult<Vec<String>>;
}

/// A factory for connections to one database.
///
/// Every connection acquired from a source sees the same data.
pub trait ConnectionSource: Send + Sync {
    /// Opens a new connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    fn acquire(&self) -> StorageResult<Box<dyn Connection>>;

    /// Short human-readable description of the target database.
    fn describe(&self) -> String;
}
