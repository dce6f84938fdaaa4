//! Table and column descriptors.

use crate::error::{CoreError, CoreResult};
use serde::Deserialize;
use std::fmt;

/// Logical column type.
///
/// Dialects map each logical type to a native column type; the mapping
/// layer uses it to coerce raw cells back into record values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Bounded string.
    String,
    /// 32-bit integer.
    Int,
    /// 64-bit integer.
    Long,
    /// Double precision float.
    Double,
    /// Boolean, stored natively or as a small integer.
    Boolean,
    /// Calendar date.
    Date,
    /// Date and time.
    DateTime,
    /// Decimal number with optional length and precision.
    Decimal,
    /// Fixed precision numeric.
    FixedPrecision,
    /// Unbounded text.
    LargeText,
    /// Unbounded binary.
    LargeBinary,
}

impl ColumnType {
    /// Parses a schema type name, ignoring case.
    pub fn parse(name: &str) -> Option<Self> {
        let ty = match name.trim().to_ascii_lowercase().as_str() {
            "string" => Self::String,
            "int" => Self::Int,
            "long" => Self::Long,
            "double" => Self::Double,
            "boolean" | "bit" => Self::Boolean,
            "date" => Self::Date,
            "datetime" => Self::DateTime,
            "decimal" => Self::Decimal,
            "fixed-precision" | "numeric" => Self::FixedPrecision,
            "large-text" | "clob" | "text" => Self::LargeText,
            "large-binary" | "blob" => Self::LargeBinary,
            _ => return None,
        };
        Some(ty)
    }

    /// Returns the canonical schema name of the type.
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Int => "int",
            Self::Long => "long",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::Date => "Date",
            Self::DateTime => "Datetime",
            Self::Decimal => "Decimal",
            Self::FixedPrecision => "fixed-precision",
            Self::LargeText => "large-text",
            Self::LargeBinary => "large-binary",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Describes one column of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    /// Column name.
    pub name: String,
    /// Logical type.
    pub column_type: ColumnType,
    /// Whether the column may be absent or `NULL`.
    pub nullable: bool,
    /// Declared length, meaning depends on the type.
    pub length: Option<u32>,
    /// Declared precision for decimal types.
    pub precision: Option<u32>,
    /// Whether this is the table's key column.
    pub is_key: bool,
    /// Free-form description.
    pub description: Option<String>,
}

impl ColumnDescriptor {
    /// Creates a nullable, non-key column.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
            length: None,
            precision: None,
            is_key: false,
            description: None,
        }
    }

    /// Sets the nullable flag.
    #[must_use]
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Sets the declared length.
    #[must_use]
    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Sets the declared precision.
    #[must_use]
    pub fn precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Marks the column as the key.
    #[must_use]
    pub fn key(mut self) -> Self {
        self.is_key = true;
        self.nullable = false;
        self
    }
}

/// Describes one table: its name and ordered columns.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDescriptor {
    /// Logical table name, without any prefix.
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    /// Finds a column by name, ignoring ASCII case.
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Returns true if a column with exactly this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Returns the key column.
    pub fn key_column(&self) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.is_key)
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Raw document form of a schema, before validation.
#[derive(Debug, Deserialize)]
pub(crate) struct SchemaDocument {
    #[serde(alias = "repositories")]
    pub tables: Vec<TableDocument>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TableDocument {
    pub name: String,
    #[serde(default)]
    pub keys: Vec<ColumnDocument>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ColumnDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default)]
    pub precision: Option<u32>,
    #[serde(default, alias = "isKey")]
    pub iskey: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl TableDocument {
    /// Validates the raw table into a descriptor.
    ///
    /// The column named `oId` is always a key. Exactly one key is required.
    pub(crate) fn into_descriptor(self) -> CoreResult<TableDescriptor> {
        let mut columns = Vec::with_capacity(self.keys.len());
        for raw in self.keys {
            let column_type = ColumnType::parse(&raw.type_name).ok_or_else(|| {
                CoreError::configuration(format!(
                    "table {}: unknown type {} for column {}",
                    self.name, raw.type_name, raw.name
                ))
            })?;
            if columns.iter().any(|c: &ColumnDescriptor| c.name == raw.name) {
                return Err(CoreError::configuration(format!(
                    "table {}: duplicate column {}",
                    self.name, raw.name
                )));
            }
            let is_key = raw.iskey || raw.name == blogstore_codec::OBJECT_ID;
            columns.push(ColumnDescriptor {
                name: raw.name,
                column_type,
                nullable: raw.nullable && !is_key,
                length: raw.length,
                precision: raw.precision,
                is_key,
                description: raw.description,
            });
        }

        let keys = columns.iter().filter(|c| c.is_key).count();
        if keys != 1 {
            return Err(CoreError::configuration(format!(
                "table {} must have exactly one key column, found {keys}",
                self.name
            )));
        }

        Ok(TableDescriptor {
            name: self.name,
            columns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_ignore_case() {
        assert_eq!(ColumnType::parse("STRING"), Some(ColumnType::String));
        assert_eq!(ColumnType::parse("Bit"), Some(ColumnType::Boolean));
        assert_eq!(ColumnType::parse("Clob"), Some(ColumnType::LargeText));
        assert_eq!(ColumnType::parse("numeric"), Some(ColumnType::FixedPrecision));
        assert_eq!(ColumnType::parse("Datetime"), Some(ColumnType::DateTime));
        assert_eq!(ColumnType::parse("varchar2"), None);
    }

    #[test]
    fn canonical_names_parse_back() {
        for ty in [
            ColumnType::String,
            ColumnType::Int,
            ColumnType::Long,
            ColumnType::Double,
            ColumnType::Boolean,
            ColumnType::Date,
            ColumnType::DateTime,
            ColumnType::Decimal,
            ColumnType::FixedPrecision,
            ColumnType::LargeText,
            ColumnType::LargeBinary,
        ] {
            assert_eq!(ColumnType::parse(ty.name()), Some(ty));
        }
    }

    #[test]
    fn column_lookup_ignores_case() {
        let table = TableDescriptor {
            name: "tag".into(),
            columns: vec![
                ColumnDescriptor::new("oId", ColumnType::String).key(),
                ColumnDescriptor::new("tag_title", ColumnType::String),
            ],
        };
        assert_eq!(table.column("OID").map(|c| c.is_key), Some(true));
        assert!(table.has_column("tag_title"));
        assert!(!table.has_column("TAG_TITLE"));
        assert_eq!(table.column_names(), vec!["oId", "tag_title"]);
    }
}
