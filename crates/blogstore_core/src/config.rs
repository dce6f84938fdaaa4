//! Store configuration.

use crate::dialect::DialectId;
use crate::error::CoreResult;
use crate::keygen::KeyGeneratorKind;
use crate::schema::physical_name;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for opening a store.
///
/// Also readable from a JSON file; absent fields take their defaults:
///
/// ```json
/// {"dialect": "sqlite", "database": "blog.db", "table_prefix": "b3",
///  "schema_path": "repository.json", "key_generator": "time_millis"}
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQL dialect.
    pub dialect: DialectId,

    /// Database file; `None` opens a private temporary database.
    pub database: Option<PathBuf>,

    /// Prefix prepended to every logical table name.
    pub table_prefix: Option<String>,

    /// Schema document; `None` means the caller supplies the registry.
    pub schema_path: Option<PathBuf>,

    /// Key generator for new records.
    pub key_generator: KeyGeneratorKind,

    /// How long a connection waits on a locked database, in milliseconds.
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dialect: DialectId::Sqlite,
            database: None,
            table_prefix: None,
            schema_path: None,
            key_generator: KeyGeneratorKind::TimeMillis,
            busy_timeout_ms: 5000,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_json_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Sets the dialect.
    #[must_use]
    pub fn dialect(mut self, dialect: DialectId) -> Self {
        self.dialect = dialect;
        self
    }

    /// Sets the database file.
    #[must_use]
    pub fn database(mut self, path: impl Into<PathBuf>) -> Self {
        self.database = Some(path.into());
        self
    }

    /// Sets the table prefix.
    #[must_use]
    pub fn table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = Some(prefix.into());
        self
    }

    /// Sets the schema document path.
    #[must_use]
    pub fn schema_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_path = Some(path.into());
        self
    }

    /// Sets the key generator.
    #[must_use]
    pub fn key_generator(mut self, kind: KeyGeneratorKind) -> Self {
        self.key_generator = kind;
        self
    }

    /// Sets the busy timeout.
    #[must_use]
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Returns the physical name of a logical table.
    pub fn physical_table_name(&self, name: &str) -> String {
        physical_name(self.table_prefix.as_deref(), name)
    }
}
