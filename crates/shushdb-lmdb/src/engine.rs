//! Thin helpers over the engine calls the safe `lmdb` bindings don't cover

use lmdb::{Database, Environment, Transaction};
use shushdb_core::{Result, ShushError};
use std::mem::MaybeUninit;
use std::os::raw::c_int;

/// Map an engine error to `ShushError::Engine`, keeping its raw code
pub(crate) fn engine_err(op: &'static str) -> impl FnOnce(lmdb::Error) -> ShushError {
    move |e| ShushError::Engine {
        op,
        code: e.to_err_code(),
        message: e.to_string(),
    }
}

fn check(op: &'static str, rc: c_int) -> Result<()> {
    if rc == lmdb_sys::MDB_SUCCESS {
        Ok(())
    } else {
        Err(engine_err(op)(lmdb::Error::from_err_code(rc)))
    }
}

/// Entry count of `db` as seen by `txn`
pub(crate) fn entry_count<T: Transaction>(txn: &T, db: Database) -> Result<usize> {
    let mut stat = MaybeUninit::<lmdb_sys::MDB_stat>::uninit();
    // SAFETY: the transaction is live for the borrow and `db` was opened in
    // this environment; mdb_stat fully initializes `stat` on success.
    let rc = unsafe { lmdb_sys::mdb_stat(txn.txn(), db.dbi(), stat.as_mut_ptr()) };
    check("stat", rc)?;
    let stat = unsafe { stat.assume_init() };
    Ok(stat.ms_entries as usize)
}

/// Clear reader slots left behind by dead processes/threads
///
/// Returns the number of slots cleared.
pub(crate) fn reader_check(env: &Environment) -> Result<usize> {
    let mut dead: c_int = 0;
    // SAFETY: `env` is an open environment for the duration of the call.
    let rc = unsafe { lmdb_sys::mdb_reader_check(env.env(), &mut dead) };
    check("reader check", rc)?;
    Ok(dead.max(0) as usize)
}
