//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while converting records to and from documents.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The document is not a JSON object.
    #[error("expected a JSON object, found {found}")]
    NotAnObject {
        /// Kind of JSON value that was found instead.
        found: &'static str,
    },

    /// A JSON value has no record value counterpart.
    #[error("unsupported JSON value for key {key}: {message}")]
    Unsupported {
        /// Key holding the value.
        key: String,
        /// Description of the problem.
        message: String,
    },

    /// Malformed JSON text.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    /// Creates an unsupported value error.
    pub fn unsupported(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unsupported {
            key: key.into(),
            message: message.into(),
        }
    }
}
