//! # Blogstore Storage
//!
//! The SQL connection seam for Blogstore.
//!
//! This crate is the only place that talks to a database driver. Everything
//! above it builds SQL text and parameter lists and receives raw [`Cell`]s
//! back; typing those cells is left to the schema-aware layers.
//!
//! ## Available Sources
//!
//! - [`SqliteSource`] - Temporary or file-backed SQLite through `rusqlite`
//!
//! ## Example
//!
//! ```rust
//! use blogstore_storage::{Cell, ConnectionSource, SqliteSource};
//!
//! let source = SqliteSource::temporary().unwrap();
//! let mut conn = source.acquire().unwrap();
//! conn.execute_batch("create table t (n integer)").unwrap();
//! conn.execute("insert into t (n) values (?)", &[7_i64.into()]).unwrap();
//! let rows = conn.query("select n from t", &[]).unwrap();
//! assert_eq!(rows.scalar(), Some(&Cell::Integer(7)));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cell;
mod connection;
mod error;
mod sqlite;

pub use cell::{Cell, RawRows};
pub use connection::{Connection, ConnectionSource};
pub use error::{StorageError, StorageResult};
pub use sqlite::{SqliteConnection, SqliteSource, DEFAULT_BUSY_TIMEOUT};
