//! Core type definitions for Blogstore.

use std::fmt;

/// Unique identifier for a transaction.
///
/// Transaction IDs increase monotonically per store and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionId(pub u64);

impl TransactionId {
    /// Creates a new transaction ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn:{}", self.0)
    }
}

/// Outcome of creating one table during schema bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CreateTableResult {
    /// Physical table name.
    pub name: String,
    /// Whether the `create table` statement succeeded.
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_id_display() {
        assert_eq!(TransactionId::new(7).to_string(), "txn:7");
        assert_eq!(TransactionId(7).as_u64(), 7);
    }
}
