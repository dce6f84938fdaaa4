//! Per-thread transaction manager.

use super::state::{Transaction, TransactionState};
use crate::error::{CoreError, CoreResult};
use crate::types::TransactionId;
use blogstore_storage::{Connection, ConnectionSource};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_MANAGER_ID: AtomicU64 = AtomicU64::new(1);

struct Slot {
    id: TransactionId,
    state: TransactionState,
    connection: Option<Box<dyn Connection>>,
}

thread_local! {
    /// Open transactions of this thread, keyed by manager.
    static SLOTS: RefCell<HashMap<u64, Slot>> = RefCell::new(HashMap::new());
}

/// How a transaction ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Commit,
    Rollback,
}

impl Outcome {
    pub(crate) fn state(self) -> TransactionState {
        match self {
            Outcome::Commit => TransactionState::Committed,
            Outcome::Rollback => TransactionState::RolledBack,
        }
    }
}

/// Hands out connections, one transaction per thread.
///
/// A thread with an open [`Transaction`] runs every statement on that
/// transaction's connection, acquired lazily on first use. A thread without
/// one runs each statement batch on an ad-hoc connection that is released
/// right after.
pub struct TransactionManager {
    id: u64,
    source: Arc<dyn ConnectionSource>,
    next_txid: AtomicU64,
}

impl TransactionManager {
    /// Creates a manager over a connection source.
    pub fn new(source: Arc<dyn ConnectionSource>) -> Self {
        Self {
            id: NEXT_MANAGER_ID.fetch_add(1, Ordering::Relaxed),
            source,
            next_txid: AtomicU64::new(1),
        }
    }

    /// The connection source.
    pub fn source(&self) -> &Arc<dyn ConnectionSource> {
        &self.source
    }

    /// Begins a transaction for the calling thread.
    ///
    /// No connection is acquired until the first statement.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread already has an open transaction.
    pub fn begin(self: &Arc<Self>) -> CoreResult<Transaction> {
        let id = TransactionId::new(self.next_txid.fetch_add(1, Ordering::SeqCst));
        SLOTS.with(|slots| {
            let mut slots = slots.borrow_mut();
            if let Some(open) = slots.get(&self.id) {
                return Err(CoreError::invalid_operation(format!(
                    "thread already has open transaction {}",
                    open.id
                )));
            }
            slots.insert(
                self.id,
                Slot {
                    id,
                    state: TransactionState::Created,
                    connection: None,
                },
            );
            Ok(())
        })?;
        tracing::debug!(txid = %id, "transaction created");
        Ok(Transaction::new(Arc::clone(self), id))
    }

    /// Returns true if the calling thread has an open transaction.
    pub fn has_transaction(&self) -> bool {
        SLOTS.with(|slots| slots.borrow().contains_key(&self.id))
    }

    /// Runs `f` in a transaction, committing on `Ok` and rolling back on
    /// `Err`.
    ///
    /// # Errors
    ///
    /// Returns the error of `f`, of `begin`, or of the commit.
    pub fn run<T>(self: &Arc<Self>, f: impl FnOnce() -> CoreResult<T>) -> CoreResult<T> {
        let mut txn = self.begin()?;
        match f() {
            Ok(value) => {
                txn.commit()?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = txn.rollback() {
                    tracing::warn!(txid = %txn.id(), error = %rollback, "rollback failed");
                }
                Err(e)
            }
        }
    }

    /// Runs `f` on the thread's transaction connection, or on an ad-hoc
    /// connection when there is no transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if a connection cannot be acquired or begun, or the
    /// error of `f`.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&mut dyn Connection) -> CoreResult<T>,
    ) -> CoreResult<T> {
        let taken = SLOTS.with(|slots| {
            slots
                .borrow_mut()
                .get_mut(&self.id)
                .map(|slot| (slot.id, slot.connection.take()))
        });

        let Some((id, held)) = taken else {
            let mut conn = self.source.acquire()?;
            return f(conn.as_mut());
        };

        let conn = match held {
            Some(conn) => conn,
            None => {
                let mut conn = self.source.acquire()?;
                conn.begin()?;
                self.set_state(TransactionState::Active);
                tracing::debug!(txid = %id, "transaction active");
                conn
            }
        };

        let mut lease = Lease {
            manager: self,
            conn: Some(conn),
        };
        let conn = lease
            .conn
            .as_deref_mut()
            .ok_or_else(|| CoreError::invalid_operation("transaction connection missing"))?;
        f(conn)
    }

    pub(crate) fn slot_state(&self, id: TransactionId) -> Option<TransactionState> {
        SLOTS.with(|slots| {
            slots
                .borrow()
                .get(&self.id)
                .filter(|slot| slot.id == id)
                .map(|slot| slot.state)
        })
    }

    fn set_state(&self, state: TransactionState) {
        SLOTS.with(|slots| {
            if let Some(slot) = slots.borrow_mut().get_mut(&self.id) {
                slot.state = state;
            }
        });
    }

    /// Ends a transaction and disposes it whatever the outcome.
    pub(crate) fn finish(&self, id: TransactionId, outcome: Outcome) -> CoreResult<()> {
        let slot = SLOTS.with(|slots| {
            let mut slots = slots.borrow_mut();
            let owned = slots.get(&self.id).is_some_and(|slot| slot.id == id);
            if owned {
                slots.remove(&self.id)
            } else {
                None
            }
        });
        let Some(slot) = slot else {
            return Err(CoreError::invalid_operation("transaction already disposed"));
        };

        let result = match slot.connection {
            Some(mut conn) => match outcome {
                Outcome::Commit => conn.commit(),
                Outcome::Rollback => conn.rollback(),
            },
            None => Ok(()),
        };
        tracing::debug!(
            txid = %id,
            outcome = ?outcome,
            ok = result.is_ok(),
            "transaction disposed"
        );
        result.map_err(CoreError::from)
    }
}

/// A transaction connection taken out of its slot.
///
/// Dropping the lease puts the connection back, also when the statement
/// closure unwinds, so later statements keep running on it.
struct Lease<'a> {
    manager: &'a TransactionManager,
    conn: Option<Box<dyn Connection>>,
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };
        let _ = SLOTS.try_with(|slots| {
            if let Some(slot) = slots.borrow_mut().get_mut(&self.manager.id) {
                slot.connection = Some(conn);
            }
        });
    }
}

impl std::fmt::Debug for TransactionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionManager")
            .field("id", &self.id)
            .field("source", &self.source.describe())
            .field("has_transaction", &self.has_transaction())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogstore_codec::Value;
    use blogstore_storage::{Cell, SqliteSource};

    fn create_manager() -> Arc<TransactionManager> {
        let source = SqliteSource::temporary().unwrap();
        let manager = Arc::new(TransactionManager::new(Arc::new(source)));
        manager
            .with_connection(|conn| Ok(conn.execute_batch("create table t (n integer)")?))
            .unwrap();
        manager
    }

    fn insert(manager: &TransactionManager, n: i64) {
        manager
            .with_connection(|conn| {
                conn.execute("insert into t (n) values (?)", &[Value::Integer(n)])?;
                Ok(())
            })
            .unwrap();
    }

    fn count(manager: &TransactionManager) -> i64 {
        manager
            .with_connection(|conn| {
                let rows = conn.query("select count(*) from t", &[])?;
                Ok(match rows.scalar() {
                    Some(Cell::Integer(n)) => *n,
                    _ => -1,
                })
            })
            .unwrap()
    }

    #[test]
    fn begin_is_lazy() {
        let manager = create_manager();
        let mut txn = manager.begin().unwrap();
        assert_eq!(txn.state(), TransactionState::Created);
        assert!(manager.has_transaction());

        insert(&manager, 1);
        assert_eq!(txn.state(), TransactionState::Active);

        txn.commit().unwrap();
        assert_eq!(txn.state(), TransactionState::Committed);
        assert!(!manager.has_transaction());
    }

    #[test]
    fn committed_data_visible_to_new_transaction() {
        let manager = create_manager();
        let mut txn = manager.begin().unwrap();
        insert(&manager, 1);
        txn.commit().unwrap();

        let mut reader = manager.begin().unwrap();
        assert_eq!(count(&manager), 1);
        reader.rollback().unwrap();
    }

    #[test]
    fn rolled_back_data_not_visible() {
        let manager = create_manager();
        let mut txn = manager.begin().unwrap();
        insert(&manager, 1);
        assert_eq!(count(&manager), 1);
        txn.rollback().unwrap();

        assert_eq!(count(&manager), 0);
    }

    #[test]
    fn cannot_commit_twice() {
        let manager = create_manager();
        let mut txn = manager.begin().unwrap();
        txn.commit().unwrap();
        assert!(matches!(
            txn.commit(),
            Err(CoreError::InvalidOperation { .. })
        ));
        assert!(matches!(
            txn.rollback(),
            Err(CoreError::InvalidOperation { .. })
        ));
    }

    #[test]
    fn one_transaction_per_thread() {
        let manager = create_manager();
        let _txn = manager.begin().unwrap();
        assert!(manager.begin().is_err());
    }

    #[test]
    fn panicking_statement_keeps_the_transaction_connection() {
        let manager = create_manager();
        let mut txn = manager.begin().unwrap();
        insert(&manager, 1);

        let unwound = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            manager.with_connection(|conn| -> CoreResult<()> {
                conn.execute("insert into t (n) values (?)", &[Value::Integer(2)])?;
                panic!("statement callback failed");
            })
        }));
        assert!(unwound.is_err());
        assert_eq!(txn.state(), TransactionState::Active);

        insert(&manager, 3);
        assert_eq!(count(&manager), 3);
        txn.rollback().unwrap();
        assert_eq!(count(&manager), 0);
    }

    #[test]
    fn drop_rolls_back() {
        let manager = create_manager();
        {
            let _txn = manager.begin().unwrap();
            insert(&manager, 1);
        }
        assert!(!manager.has_transaction());
        assert_eq!(count(&manager), 0);
    }

    #[test]
    fn run_commits_or_rolls_back() {
        let manager = create_manager();
        manager
            .run(|| {
                insert(&manager, 1);
                Ok(())
            })
            .unwrap();
        assert_eq!(count(&manager), 1);

        let result: CoreResult<()> = manager.run(|| {
            insert(&manager, 2);
            Err(CoreError::invalid_operation("abort"))
        });
        assert!(result.is_err());
        assert_eq!(count(&manager), 1);
        assert!(!manager.has_transaction());
    }

    #[test]
    fn transactions_are_per_thread() {
        let manager = create_manager();
        let _txn = manager.begin().unwrap();

        let other = Arc::clone(&manager);
        let seen = std::thread::spawn(move || other.has_transaction())
            .join()
            .unwrap();
        assert!(!seen);
    }

    #[test]
    fn managers_do_not_share_slots() {
        let first = create_manager();
        let second = create_manager();
        let _txn = first.begin().unwrap();
        assert!(!second.has_transaction());
        let _other = second.begin().unwrap();
    }
}
