//! SQLite connections via `rusqlite`.

use crate::cell::{Cell, RawRows};
use crate::connection::{Connection, ConnectionSource};
use crate::error::StorageResult;
use blogstore_codec::Value;
use rusqlite::types::{ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::{OpenFlags, ToSql};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// Default time a connection waits on a locked database file.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// A connection source for a SQLite database.
///
/// Every connection opens the same database file in WAL mode, so readers on
/// other connections keep seeing the last committed state while a writer
/// holds an open transaction. A second writer waits up to the busy timeout.
/// Temporary sources keep their file in a private directory that is removed
/// when the source drops.
pub struct SqliteSource {
    path: PathBuf,
    busy_timeout: Duration,
    temp_dir: Option<TempDir>,
}

impl SqliteSource {
    /// Creates a source for a fresh private database in a temporary
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or the database cannot be created.
    pub fn temporary() -> StorageResult<Self> {
        let temp_dir = tempfile::Builder::new().prefix("blogstore-").tempdir()?;
        let path = temp_dir.path().join("blog.db");
        open(&path, DEFAULT_BUSY_TIMEOUT)?;
        tracing::debug!(path = %path.display(), "opened temporary sqlite database");
        Ok(Self {
            path,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            temp_dir: Some(temp_dir),
        })
    }

    /// Creates a source for a database file, creating parent directories.
    ///
    /// The file itself is created on first connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    pub fn file(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self {
            path,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            temp_dir: None,
        })
    }

    /// Sets how long connections wait on a locked database.
    #[must_use]
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Returns true if the database is removed when the source drops.
    pub fn is_temporary(&self) -> bool {
        self.temp_dir.is_some()
    }

    /// The database file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConnectionSource for SqliteSource {
    fn acquire(&self) -> StorageResult<Box<dyn Connection>> {
        let conn = open(&self.path, self.busy_timeout)?;
        Ok(Box::new(SqliteConnection { conn }))
    }

    fn describe(&self) -> String {
        if self.is_temporary() {
            format!("sqlite temporary ({})", self.path.display())
        } else {
            format!("sqlite file ({})", self.path.display())
        }
    }
}

impl std::fmt::Debug for SqliteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteSource")
            .field("path", &self.path)
            .field("temporary", &self.is_temporary())
            .field("busy_timeout", &self.busy_timeout)
            .finish()
    }
}

fn open(path: &Path, busy_timeout: Duration) -> StorageResult<rusqlite::Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = rusqlite::Connection::open_with_flags(path, flags)?;
    conn.busy_timeout(busy_timeout)?;
    // Persistent per file; a no-op once the file is in WAL mode.
    let mode: String = conn.query_row("pragma journal_mode = wal", [], |row| row.get(0))?;
    if !mode.eq_ignore_ascii_case("wal") {
        tracing::warn!(path = %path.display(), mode = %mode, "sqlite refused WAL journal mode");
    }
    Ok(conn)
}

/// A [`Connection`] over one `rusqlite` session.
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl Connection for SqliteConnection {
    fn execute(&mut self, sql: &str, params: &[Value]) -> StorageResult<usize> {
        let mut stmt = self.conn.prepare(sql)?;
        let changed = stmt.execute(rusqlite::params_from_iter(params.iter().map(SqlParam)))?;
        Ok(changed)
    }

    fn execute_batch(&mut self, sql: &str) -> StorageResult<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn query(&mut self, sql: &str, params: &[Value]) -> StorageResult<RawRows> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let width = columns.len();

        let mut rows = stmt.query(rusqlite::params_from_iter(params.iter().map(SqlParam)))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(width);
            for i in 0..width {
                cells.push(cell_from(row.get_ref(i)?));
            }
            out.push(cells);
        }

        Ok(RawRows { columns, rows: out })
    }

    fn begin(&mut self) -> StorageResult<()> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn commit(&mut self) -> StorageResult<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> StorageResult<()> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn table_names(&mut self) -> StorageResult<Vec<String>> {
        let rows = self.query(
            "select name from sqlite_master \
             where type = 'table' and name not like 'sqlite_%' order by name",
            &[],
        )?;
        Ok(rows
            .rows
            .into_iter()
            .filter_map(|row| match row.into_iter().next() {
                Some(Cell::Text(name)) => Some(name),
                _ => None,
            })
            .collect())
    }
}

fn cell_from(value: ValueRef<'_>) -> Cell {
    match value {
        ValueRef::Null => Cell::Null,
        ValueRef::Integer(n) => Cell::Integer(n),
        ValueRef::Real(n) => Cell::Real(n),
        ValueRef::Text(bytes) => Cell::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Cell::Blob(bytes.to_vec()),
    }
}

/// Binds a record value as a SQLite parameter.
///
/// Booleans bind as 0/1 integers; dates bind as their formatted text.
struct SqlParam<'a>(&'a Value);

impl ToSql for SqlParam<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self.0 {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Bool(b) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*b))),
            Value::Integer(n) => ToSqlOutput::Owned(SqlValue::Integer(*n)),
            Value::Double(n) => ToSqlOutput::Owned(SqlValue::Real(*n)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Bytes(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
            Value::Date(_) | Value::DateTime(_) => {
                ToSqlOutput::Owned(SqlValue::Text(self.0.to_text().unwrap_or_default()))
            }
        })
    }
}
