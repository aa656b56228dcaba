//! LMDB-backed implementation of the shushdb object store
//!
//! One LMDB environment is split into the named sub-databases declared by a
//! [`Schema`](shushdb_core::Schema). Values pass through each sub-store's
//! codec at the byte boundary.
//!
//! Key features:
//! - Eager sub-database creation at open; a fixed handle table afterwards
//! - Read and write transactions as distinct types, with distinct views
//! - Scoped transactions that commit on success and abort on error or drop
//! - Single-writer semantics (enforced by LMDB's own writer lock)
//! - Live entry counts via `mdb_stat`, zero-copy key iteration via cursors

pub mod collection;
mod engine;
pub mod iter;
pub mod store;
pub mod txn;

#[cfg(test)]
mod test_utils;

pub use collection::{Collection, CollectionMut};
pub use iter::{Entries, Keys};
pub use store::Store;
pub use txn::{ReadTxn, TxnState, WriteTxn};
