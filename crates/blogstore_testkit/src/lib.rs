//! # Blogstore Testkit
//!
//! Test utilities for Blogstore.
//!
//! This crate provides:
//! - Temporary stores, private or at a known file path
//! - A statement-recording connection source
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust
//! use blogstore_core::Record;
//! use blogstore_testkit::prelude::*;
//!
//! let (store, log) = TestStore::recording(tag_schema());
//! let tags = store.repository("tag").unwrap();
//! tags.add(Record::new().with("tag_title", "rust")).unwrap();
//! assert_eq!(log.count_matching("insert into tag"), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod recording;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::recording::*;
}

pub use fixtures::*;
pub use generators::*;
pub use recording::*;
