//! Declarative table schemas.
//!
//! A schema document lists every table and its columns:
//!
//! ```json
//! {"tables": [{"name": "tag", "keys": [
//!     {"name": "oId", "type": "String", "nullable": false, "iskey": true},
//!     {"name": "tag_title", "type": "String", "nullable": false, "length": 64}
//! ]}]}
//! ```
//!
//! `repositories` is accepted in place of `tables`.

mod descriptor;
mod registry;

pub use descriptor::{ColumnDescriptor, ColumnType, TableDescriptor};
pub use registry::{physical_name, SchemaRegistry};
