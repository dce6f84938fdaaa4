//! Schema registry: descriptor lookup and record validation.

use super::descriptor::{SchemaDocument, TableDescriptor};
use crate::error::{CoreError, CoreResult};
use blogstore_codec::Record;
use std::collections::BTreeMap;
use std::path::Path;

/// Joins a table prefix and a logical table name.
///
/// An absent or empty prefix leaves the name unchanged.
pub fn physical_name(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(p) if !p.is_empty() => format!("{p}_{name}"),
        _ => name.to_string(),
    }
}

/// The set of table descriptors, loaded once and immutable afterwards.
///
/// A registry is either *loaded* (it knows every table and rejects lookups
/// of unknown ones) or *permissive* (no schema was found, so validation is
/// disabled and every lookup yields no descriptor).
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    tables: Option<BTreeMap<String, TableDescriptor>>,
    prefix: Option<String>,
}

impl SchemaRegistry {
    /// Creates a registry that validates nothing.
    pub fn permissive() -> Self {
        Self::default()
    }

    /// Replaces the table prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: Option<&str>) -> Self {
        self.prefix = prefix.filter(|p| !p.is_empty()).map(String::from);
        self
    }

    /// Parses a schema document.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the document is malformed, names an
    /// unknown type, declares a table twice, or a table does not have
    /// exactly one key column.
    pub fn from_json(json: &str, prefix: Option<&str>) -> CoreResult<Self> {
        let document: SchemaDocument = serde_json::from_str(json)
            .map_err(|e| CoreError::configuration(format!("malformed schema: {e}")))?;

        let mut tables = BTreeMap::new();
        for raw in document.tables {
            let table = raw.into_descriptor()?;
            if tables.contains_key(&table.name) {
                return Err(CoreError::configuration(format!(
                    "table {} is declared twice",
                    table.name
                )));
            }
            tables.insert(table.name.clone(), table);
        }

        tracing::info!(tables = tables.len(), prefix = ?prefix, "loaded schema");
        Ok(Self {
            tables: Some(tables),
            prefix: prefix.filter(|p| !p.is_empty()).map(String::from),
        })
    }

    /// Loads a schema file. A missing file yields a permissive registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>, prefix: Option<&str>) -> CoreResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "schema file not found, record validation is disabled"
            );
            return Ok(Self {
                tables: None,
                prefix: prefix.filter(|p| !p.is_empty()).map(String::from),
            });
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json, prefix)
    }

    /// Returns true if validation is disabled.
    pub fn is_permissive(&self) -> bool {
        self.tables.is_none()
    }

    /// The table name prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Returns the physical name for a logical table name.
    pub fn physical_name(&self, name: &str) -> String {
        physical_name(self.prefix(), name)
    }

    /// Resolves a table name, bare or prefixed, to its descriptor.
    ///
    /// Permissive registries return `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a schema is loaded and no table
    /// matches.
    pub fn descriptor(&self, table: &str) -> CoreResult<Option<&TableDescriptor>> {
        let Some(tables) = &self.tables else {
            return Ok(None);
        };
        if let Some(found) = tables.get(table) {
            return Ok(Some(found));
        }
        let stripped = self
            .prefix
            .as_deref()
            .and_then(|p| table.strip_prefix(p))
            .and_then(|rest| rest.strip_prefix('_'));
        stripped
            .and_then(|bare| tables.get(bare))
            .map(Some)
            .ok_or_else(|| CoreError::configuration(format!("no schema for table {table}")))
    }

    /// Iterates over every descriptor in name order.
    pub fn tables(&self) -> impl Iterator<Item = &TableDescriptor> {
        self.tables.iter().flat_map(BTreeMap::values)
    }

    /// Logical names of every described table.
    pub fn table_names(&self) -> Vec<String> {
        self.tables().map(|t| t.name.clone()).collect()
    }

    /// Column names of a table in declaration order.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unknown tables.
    pub fn key_names(&self, table: &str) -> CoreResult<Vec<String>> {
        Ok(self
            .descriptor(table)?
            .map(|t| t.columns.iter().map(|c| c.name.clone()).collect())
            .unwrap_or_default())
    }

    /// Validates a record against its table descriptor.
    ///
    /// Columns whose name contains any of `ignored` (ignoring case) are not
    /// required. Record keys not declared by the table are always rejected.
    ///
    /// # Errors
    ///
    /// Returns a schema violation for a missing non-nullable column or a
    /// redundant key, and a configuration error for unknown tables.
    pub fn check(&self, table: &str, record: &Record, ignored: &[&str]) -> CoreResult<()> {
        let Some(descriptor) = self.descriptor(table)? else {
            return Ok(());
        };

        let ignored: Vec<String> = ignored.iter().map(|k| k.to_lowercase()).collect();
        for column in &descriptor.columns {
            let lowered = column.name.to_lowercase();
            if ignored.iter().any(|k| lowered.contains(k.as_str())) {
                continue;
            }
            if !column.nullable && !record.contains_key(&column.name) {
                return Err(CoreError::schema_violation(
                    table,
                    format!("missing non-nullable column {}", column.name),
                ));
            }
        }

        if let Some(redundant) = record.keys().find(|k| !descriptor.has_column(k)) {
            return Err(CoreError::schema_violation(
                table,
                format!("redundant key {redundant}"),
            ));
        }
        Ok(())
    }
}
