//! CLI command implementations.

pub mod clear;
pub mod ddl;
pub mod init;
pub mod inspect;
pub mod transfer;

use blogstore_core::{CoreResult, SchemaRegistry, Store, StoreConfig};
use std::path::PathBuf;

/// Where the store lives and how it is described, from global flags.
#[derive(Debug, Default, Clone)]
pub struct StoreOptions {
    /// Database file.
    pub path: Option<PathBuf>,
    /// Configuration file.
    pub config: Option<PathBuf>,
    /// Table prefix.
    pub prefix: Option<String>,
    /// Schema document.
    pub schema: Option<PathBuf>,
}

impl StoreOptions {
    /// Resolves the configuration: the file first, then flag overrides.
    pub fn config(&self) -> CoreResult<StoreConfig> {
        let mut config = match &self.config {
            Some(path) => StoreConfig::from_json_file(path)?,
            None => StoreConfig::new(),
        };
        if let Some(path) = &self.path {
            config = config.database(path);
        }
        if let Some(prefix) = &self.prefix {
            config = config.table_prefix(prefix.as_str());
        }
        if let Some(schema) = &self.schema {
            config = config.schema_path(schema);
        }
        Ok(config)
    }

    /// The schema the store would use, without opening it.
    pub fn schema(&self) -> CoreResult<SchemaRegistry> {
        let config = self.config()?;
        let prefix = config.table_prefix.as_deref();
        match &config.schema_path {
            Some(path) => SchemaRegistry::load(path, prefix),
            None => blogstore_blog::bundled_schema(prefix),
        }
    }

    /// Opens the store. A database file is required.
    pub fn open(&self) -> Result<Store, Box<dyn std::error::Error>> {
        let config = self.config()?;
        if config.database.is_none() {
            return Err("Database path required (--path or a config file)".into());
        }
        Ok(blogstore_blog::open_store(config)?)
    }
}
