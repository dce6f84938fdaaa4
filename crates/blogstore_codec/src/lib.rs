//! # Blogstore Codec
//!
//! Dynamic values and records for Blogstore.
//!
//! A [`Record`] is the single unit of input and output of every repository
//! operation: a mapping from column name to [`Value`]. Records carry no
//! static shape; the schema registry in `blogstore_core` decides what a valid
//! record looks like for a given table.
//!
//! ## Usage
//!
//! ```
//! use blogstore_codec::{Record, Value, OBJECT_ID};
//!
//! let tag = Record::new()
//!     .with(OBJECT_ID, "1")
//!     .with("tag_title", "rust");
//!
//! assert_eq!(tag.id(), Some("1".to_string()));
//! assert_eq!(tag.get("tag_title"), Some(&Value::Text("rust".into())));
//!
//! let json = tag.to_json_string().unwrap();
//! assert_eq!(Record::from_json_str(&json).unwrap(), tag);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod record;
mod value;

pub use error::{CodecError, CodecResult};
pub use record::Record;
pub use value::Value;

/// Name of the well-known key column carrying a record's identifier.
pub const OBJECT_ID: &str = "oId";

/// `chrono` format used to render and parse [`Value::Date`].
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// `chrono` format used to render and parse [`Value::DateTime`].
///
/// The fraction is written with 0, 3, 6 or 9 digits, whichever keeps every
/// nanosecond, and is optional when parsing.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
