//! Error types for Blogstore core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in Blogstore core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Missing or invalid schema reference, bad configuration.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the problem.
        message: String,
    },

    /// A record does not match its table descriptor.
    #[error("schema violation on table {table}: {message}")]
    SchemaViolation {
        /// Table the record was checked against.
        table: String,
        /// Description of the mismatch.
        message: String,
    },

    /// Writes to the table are frozen.
    #[error("repository {table} is not writable")]
    NotWritable {
        /// The frozen table.
        table: String,
    },

    /// The underlying statement or connection failed.
    #[error("execution failure: {0}")]
    Execution(#[from] blogstore_storage::StorageError),

    /// A query cannot be compiled.
    #[error("invalid query: {message}")]
    InvalidQuery {
        /// Description of why the query is invalid.
        message: String,
    },

    /// Operation not permitted in current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why operation is invalid.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Record codec error.
    #[error("codec error: {0}")]
    Codec(#[from] blogstore_codec::CodecError),
}

impl CoreError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a schema violation error.
    pub fn schema_violation(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaViolation {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Creates a not-writable error.
    pub fn not_writable(table: impl Into<String>) -> Self {
        Self::NotWritable {
            table: table.into(),
        }
    }

    /// Creates an invalid query error.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true if a read path may swallow this error.
    ///
    /// Schema, configuration, and gate errors always reach the caller.
    pub fn is_degradable(&self) -> bool {
        matches!(self, Self::Execution(_) | Self::InvalidQuery { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_execution_failures_degrade() {
        let storage = storage_error();
        assert!(CoreError::Execution(storage).is_degradable());
        assert!(CoreError::invalid_query("x").is_degradable());
        assert!(!CoreError::configuration("x").is_degradable());
        assert!(!CoreError::schema_violation("t", "x").is_degradable());
        assert!(!CoreError::not_writable("t").is_degradable());
    }

    fn storage_error() -> blogstore_storage::StorageError {
        io::Error::new(io::ErrorKind::Other, "disk gone").into()
    }

    #[test]
    fn messages_name_the_table() {
        let err = CoreError::not_writable("b3_article");
        assert_eq!(err.to_string(), "repository b3_article is not writable");
    }
}
