//! Transaction state and handle.

use super::manager::{Outcome, TransactionManager};
use crate::error::{CoreError, CoreResult};
use crate::types::TransactionId;
use std::marker::PhantomData;
use std::sync::Arc;

/// State of a transaction.
///
/// `Created` moves to `Active` when the first statement acquires a
/// connection. `Committed` and `RolledBack` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Registered for the thread, no connection yet.
    Created,
    /// A connection is held and `BEGIN` has been issued.
    Active,
    /// Transaction has been committed.
    Committed,
    /// Transaction has been rolled back.
    RolledBack,
}

impl TransactionState {
    /// Returns true for `Committed` and `RolledBack`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::RolledBack)
    }
}

/// A transaction bound to the thread that began it.
///
/// Every repository call made on this thread while the handle is open runs
/// on the transaction's connection. Both [`commit`](Self::commit) and
/// [`rollback`](Self::rollback) dispose the transaction; dropping an open
/// handle rolls it back.
///
/// The handle is `!Send`: the transaction lives in thread-local storage.
#[derive(Debug)]
pub struct Transaction {
    manager: Arc<TransactionManager>,
    id: TransactionId,
    outcome: Option<TransactionState>,
    _not_send: PhantomData<*const ()>,
}

impl Transaction {
    pub(crate) fn new(manager: Arc<TransactionManager>, id: TransactionId) -> Self {
        Self {
            manager,
            id,
            outcome: None,
            _not_send: PhantomData,
        }
    }

    /// Returns the transaction ID.
    #[must_use]
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> TransactionState {
        self.outcome
            .or_else(|| self.manager.slot_state(self.id))
            .unwrap_or(TransactionState::RolledBack)
    }

    /// Checks if the transaction is still open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.outcome.is_none()
    }

    /// Commits and disposes the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction was already disposed or the
    /// commit fails. The transaction is disposed either way.
    pub fn commit(&mut self) -> CoreResult<()> {
        self.finish(Outcome::Commit)
    }

    /// Rolls back and disposes the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction was already disposed or the
    /// rollback fails. The transaction is disposed either way.
    pub fn rollback(&mut self) -> CoreResult<()> {
        self.finish(Outcome::Rollback)
    }

    fn finish(&mut self, outcome: Outcome) -> CoreResult<()> {
        if self.outcome.is_some() {
            return Err(CoreError::invalid_operation("transaction already disposed"));
        }
        self.outcome = Some(outcome.state());
        self.manager.finish(self.id, outcome)
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.outcome.is_none() {
            tracing::warn!(txid = %self.id, "transaction dropped while open, rolling back");
            if let Err(e) = self.finish(Outcome::Rollback) {
                tracing::error!(txid = %self.id, error = %e, "rollback on drop failed");
            }
        }
    }
}
