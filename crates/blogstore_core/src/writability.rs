//! Per-table write freeze.
//!
//! The [`WritabilityService`] holds one flag per table. A frozen table
//! rejects writes unless the call carries an [`InternalAccess`] token, which
//! only the service itself mints. Maintenance tooling takes a token, freezes
//! the table for everyone else, and keeps writing through the token.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SERVICE_ID: AtomicU64 = AtomicU64::new(1);

/// Proof of privileged access, minted by one [`WritabilityService`].
///
/// A token is only honored by the service that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InternalAccess {
    issuer: u64,
}

/// Per-call context carried by every write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallContext {
    access: Option<InternalAccess>,
}

impl CallContext {
    /// An ordinary caller.
    pub fn standard() -> Self {
        Self::default()
    }

    /// A privileged caller holding `access`.
    pub fn internal(access: InternalAccess) -> Self {
        Self {
            access: Some(access),
        }
    }

    /// Returns true if the context carries a token.
    pub fn is_internal(&self) -> bool {
        self.access.is_some()
    }
}

/// Table writability states.
#[derive(Debug)]
pub struct WritabilityService {
    id: u64,
    states: RwLock<BTreeMap<String, bool>>,
}

impl Default for WritabilityService {
    fn default() -> Self {
        Self::new()
    }
}

impl WritabilityService {
    /// Creates a service with no registered tables.
    pub fn new() -> Self {
        Self {
            id: NEXT_SERVICE_ID.fetch_add(1, Ordering::Relaxed),
            states: RwLock::new(BTreeMap::new()),
        }
    }

    /// Registers a table as writable unless it is already known.
    pub fn register(&self, table: &str) {
        let mut states = self.states.write();
        states.entry(table.to_string()).or_insert(true);
    }

    /// Returns true if ordinary callers may write to `table`.
    ///
    /// Unknown tables are writable.
    pub fn is_writable(&self, table: &str) -> bool {
        self.states.read().get(table).copied().unwrap_or(true)
    }

    /// Freezes or unfreezes one table.
    pub fn set_writable(&self, table: &str, writable: bool) {
        self.states.write().insert(table.to_string(), writable);
        tracing::info!(table, writable, "repository writability changed");
    }

    /// Freezes or unfreezes every registered table.
    pub fn set_all_writable(&self, writable: bool) {
        let mut states = self.states.write();
        for state in states.values_mut() {
            *state = writable;
        }
        tracing::info!(tables = states.len(), writable, "all repositories writability changed");
    }

    /// Snapshot of every registered table and its state.
    pub fn states(&self) -> BTreeMap<String, bool> {
        self.states.read().clone()
    }

    /// Mints a token honored by this service.
    pub fn internal_access(&self) -> InternalAccess {
        InternalAccess { issuer: self.id }
    }

    /// Returns true if a write to `table` under `ctx` may proceed.
    pub fn permits(&self, table: &str, ctx: &CallContext) -> bool {
        let privileged = ctx.access.is_some_and(|a| a.issuer == self.id);
        privileged || self.is_writable(table)
    }
}
