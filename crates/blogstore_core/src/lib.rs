//! # Blogstore Core
//!
//! Schema-validated repository engine for Blogstore.
//!
//! This crate provides:
//! - Schema registry loaded from a JSON table description
//! - Query model with filters, sorting, projection, and pagination
//! - SQL dialects (SQLite executed, MySQL rendered)
//! - Thread-bound transactions over a connection source
//! - Repositories with schema checks, write freezing, and read fallback
//!
//! ## Quick Start
//!
//! ```rust
//! use blogstore_core::{Filter, Query, Record, SchemaRegistry, Store, StoreConfig};
//!
//! let schema = SchemaRegistry::from_json(
//!     r#"{"tables":[{"name":"tag","keys":[
//!         {"name":"oId","type":"String","iskey":true},
//!         {"name":"tag_title","type":"String"}]}]}"#,
//!     None,
//! ).unwrap();
//! let store = Store::open_temporary(StoreConfig::new(), schema).unwrap();
//! store.init_tables();
//!
//! let tags = store.repository("tag").unwrap();
//! tags.add(Record::new().with("tag_title", "rust")).unwrap();
//!
//! let found = tags.query(&Query::new().filter(Filter::eq("tag_title", "rust"))).unwrap();
//! assert_eq!(found.records.len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
pub mod dialect;
mod engine;
mod error;
mod keygen;
pub mod query;
pub mod repository;
pub mod schema;
mod store;
mod transaction;
mod types;
mod writability;

pub use config::StoreConfig;
pub use dialect::{Dialect, DialectId, MySqlDialect, RowWindow, SqliteDialect};
pub use engine::SqlEngine;
pub use error::{CoreError, CoreResult};
pub use keygen::{KeyGenerator, KeyGeneratorKind, TimeMillisKeyGenerator, UuidKeyGenerator};
pub use query::{
    CompositeFilter, CompositeOperator, Filter, FilterOperator, Operand, PageCount, Pagination,
    PropertyFilter, Query, QueryResult, Sort, SortDirection, UNBOUNDED_PAGE_SIZE,
};
pub use repository::{Repository, TableStore};
pub use schema::{ColumnDescriptor, ColumnType, SchemaRegistry, TableDescriptor};
pub use store::Store;
pub use transaction::{Transaction, TransactionManager, TransactionState};
pub use types::{CreateTableResult, TransactionId};
pub use writability::{CallContext, InternalAccess, WritabilityService};

pub use blogstore_codec::{Record, Value, OBJECT_ID};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
