//! Transaction management.
//!
//! Blogstore transactions are plain SQL transactions scoped to a thread:
//! - **Lazy**: the connection is acquired by the first statement
//! - **Thread-bound**: each thread has at most one open transaction per store
//! - **Always disposed**: commit and rollback both release the connection

mod manager;
mod state;

pub use manager::TransactionManager;
pub use state::{Transaction, TransactionState};
