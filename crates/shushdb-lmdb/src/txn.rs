use lmdb::{RoTransaction, RwTransaction, Transaction};
use shushdb_core::{observe, Result, ShushError};
use std::time::Instant;
use tracing::debug;

use crate::collection::{Collection, CollectionMut};
use crate::engine::engine_err;
use crate::store::Store;

/// Lifecycle of a transaction
///
/// `Open → Committed | Aborted` for write transactions, `Open → Closed` for
/// read transactions. There is no way back to `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnState {
    Open,
    Committed,
    Aborted,
    Closed,
}

/// Read-only transaction
///
/// Holds one snapshot of every sub-store. The snapshot is released by
/// [`close`](Self::close) or on drop.
pub struct ReadTxn<'s> {
    store: &'s Store,
    txn: Option<RoTransaction<'s>>,
}

impl<'s> ReadTxn<'s> {
    pub(crate) fn new(store: &'s Store, txn: RoTransaction<'s>) -> Self {
        Self {
            store,
            txn: Some(txn),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> TxnState {
        if self.txn.is_some() {
            TxnState::Open
        } else {
            TxnState::Closed
        }
    }

    /// True until the snapshot is closed
    pub fn is_open(&self) -> bool {
        self.txn.is_some()
    }

    /// Sub-store names, in schema declaration order
    pub fn names(&self) -> impl Iterator<Item = &'s str> + 's {
        self.store.schema().names()
    }

    /// Number of sub-stores (the schema size)
    pub fn len(&self) -> usize {
        self.store.schema().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.schema().is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.store.schema().contains(name)
    }

    /// Get a read-only view over the named sub-store
    pub fn lookup(&self, name: &str) -> Result<Collection<'_, RoTransaction<'s>>> {
        let txn = self.txn.as_ref().ok_or(ShushError::TransactionClosed)?;
        let (entry, db) = self.store.handle(name)?;
        Ok(Collection::new(txn, db, entry))
    }

    /// Release the snapshot. Closing twice is a no-op.
    pub fn close(&mut self) {
        if let Some(txn) = self.txn.take() {
            txn.abort();
            debug!("read transaction closed");
        }
    }
}

impl<'s> Drop for ReadTxn<'s> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Read-write transaction
///
/// Only one can be open per environment at a time; the engine blocks
/// [`Store::begin_write`] until the current writer finalizes. Dropping an
/// open write transaction aborts it.
pub struct WriteTxn<'s> {
    store: &'s Store,
    txn: Option<RwTransaction<'s>>,
    state: TxnState,
}

impl<'s> WriteTxn<'s> {
    pub(crate) fn new(store: &'s Store, txn: RwTransaction<'s>) -> Self {
        Self {
            store,
            txn: Some(txn),
            state: TxnState::Open,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> TxnState {
        self.state
    }

    /// True until committed or aborted
    pub fn is_open(&self) -> bool {
        self.state == TxnState::Open
    }

    pub fn names(&self) -> impl Iterator<Item = &'s str> + 's {
        self.store.schema().names()
    }

    pub fn len(&self) -> usize {
        self.store.schema().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.schema().is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.store.schema().contains(name)
    }

    /// Get a read-write view over the named sub-store
    ///
    /// The view borrows the transaction mutably, so views are used one at a
    /// time.
    pub fn lookup(&mut self, name: &str) -> Result<CollectionMut<'_, 's>> {
        let txn = self.txn.as_mut().ok_or(ShushError::TransactionClosed)?;
        let (entry, db) = self.store.handle(name)?;
        Ok(CollectionMut::new(txn, db, entry))
    }

    /// Get a read-only view inside this write transaction
    ///
    /// Sees this transaction's uncommitted writes.
    pub fn view(&self, name: &str) -> Result<Collection<'_, RwTransaction<'s>>> {
        let txn = self.txn.as_ref().ok_or(ShushError::TransactionClosed)?;
        let (entry, db) = self.store.handle(name)?;
        Ok(Collection::new(txn, db, entry))
    }

    /// Commit all writes atomically
    ///
    /// Fails with `TransactionClosed` if already committed or aborted. If the
    /// engine rejects the commit, the transaction ends up aborted.
    pub fn commit(&mut self) -> Result<()> {
        let txn = self.txn.take().ok_or(ShushError::TransactionClosed)?;
        let start = Instant::now();
        match txn.commit() {
            Ok(()) => {
                self.state = TxnState::Committed;
                observe::record_commit(start.elapsed());
                debug!(elapsed = ?start.elapsed(), "write transaction committed");
                Ok(())
            }
            Err(e) => {
                self.state = TxnState::Aborted;
                observe::record_abort("commit_failed");
                Err(engine_err("commit")(e))
            }
        }
    }

    /// Discard all writes. Safe to call on any path; a finalized transaction
    /// is left as is.
    pub fn abort(&mut self) {
        self.abort_with_reason("explicit");
    }

    pub(crate) fn abort_with_reason(&mut self, reason: &'static str) {
        if let Some(txn) = self.txn.take() {
            txn.abort();
            self.state = TxnState::Aborted;
            observe::record_abort(reason);
            debug!(reason, "write transaction aborted");
        }
    }
}

impl<'s> Drop for WriteTxn<'s> {
    fn drop(&mut self) {
        self.abort_with_reason("drop");
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{open_store, User};
    use shushdb_core::{ReadCollection, ShushError, WriteCollection};

    use super::TxnState;

    #[test]
    fn test_read_txn_enumerates_schema() {
        let (store, _dir) = open_store();
        let txn = store.begin_read().unwrap();
        assert_eq!(txn.len(), 2);
        assert_eq!(txn.names().collect::<Vec<_>>(), vec!["users", "counters"]);
        assert!(txn.contains("users"));
        assert!(!txn.contains("orders"));
    }

    #[test]
    fn test_unknown_sub_store() {
        let (store, _dir) = open_store();
        let txn = store.begin_read().unwrap();
        assert!(matches!(
            txn.lookup("orders"),
            Err(ShushError::UnknownSubStore(name)) if name == "orders"
        ));
    }

    #[test]
    fn test_write_state_machine() {
        let (store, _dir) = open_store();
        let mut txn = store.begin_write().unwrap();
        assert_eq!(txn.state(), TxnState::Open);

        txn.commit().unwrap();
        assert_eq!(txn.state(), TxnState::Committed);

        // Finalized: no second commit, abort is a no-op, lookups refused
        assert!(matches!(txn.commit(), Err(ShushError::TransactionClosed)));
        txn.abort();
        assert_eq!(txn.state(), TxnState::Committed);
        assert!(matches!(
            txn.lookup("users"),
            Err(ShushError::TransactionClosed)
        ));
        assert!(matches!(
            txn.view("users"),
            Err(ShushError::TransactionClosed)
        ));
    }

    #[test]
    fn test_abort_is_idempotent() {
        let (store, _dir) = open_store();
        let mut txn = store.begin_write().unwrap();
        txn.abort();
        txn.abort();
        assert_eq!(txn.state(), TxnState::Aborted);
        assert!(matches!(txn.commit(), Err(ShushError::TransactionClosed)));
    }

    #[test]
    fn test_read_close() {
        let (store, _dir) = open_store();
        let mut txn = store.begin_read().unwrap();
        txn.close();
        txn.close();
        assert_eq!(txn.state(), TxnState::Closed);
        assert!(matches!(
            txn.lookup("users"),
            Err(ShushError::TransactionClosed)
        ));
    }

    #[test]
    fn test_drop_aborts_write() {
        let (store, _dir) = open_store();
        {
            let mut txn = store.begin_write().unwrap();
            let mut users = txn.lookup("users").unwrap();
            users.set(b"alice", &User::new("Alice")).unwrap();
            // dropped without commit
        }

        let txn = store.begin_read().unwrap();
        let users = txn.lookup("users").unwrap();
        assert!(!users.contains_key(b"alice").unwrap());
    }

    #[test]
    fn test_view_sees_uncommitted_writes() {
        let (store, _dir) = open_store();
        let mut txn = store.begin_write().unwrap();
        txn.lookup("users")
            .unwrap()
            .set(b"alice", &User::new("Alice"))
            .unwrap();

        let users = txn.view("users").unwrap();
        assert_eq!(users.get::<User>(b"alice").unwrap(), User::new("Alice"));
        assert_eq!(users.len().unwrap(), 1);
    }
}
