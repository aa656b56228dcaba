//! Application errors inside transaction scopes
//!
//! Any error type that converts from `ShushError` can be returned from a
//! scope. Returning it aborts the write transaction.
//!
//! Run with: cargo run --example custom_errors

use shushdb::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BankError {
    #[error("Insufficient funds: account has {balance}, need {amount}")]
    InsufficientFunds { balance: i64, amount: i64 },

    #[error("Account {0} not found")]
    AccountNotFound(String),

    #[error(transparent)]
    Store(#[from] ShushError),
}

fn withdraw(store: &Store, account: &str, amount: i64) -> std::result::Result<i64, BankError> {
    store.for_writing(|txn| {
        let mut balances = txn.lookup("balances")?;
        let balance: i64 = balances
            .try_get(account.as_bytes())?
            .ok_or_else(|| BankError::AccountNotFound(account.to_string()))?;
        if balance < amount {
            return Err(BankError::InsufficientFunds { balance, amount });
        }
        balances.set(account.as_bytes(), &(balance - amount))?;
        Ok(balance - amount)
    })
}

fn main() -> std::result::Result<(), BankError> {
    tracing_subscriber::fmt()
        .with_env_filter("shushdb_lmdb=info")
        .init();

    let temp_dir = tempfile::tempdir().map_err(ShushError::from)?;
    let schema = Schema::builder()
        .sub_store::<i64, _>("balances", BincodeCodec)
        .build()?;
    let store = Store::open(temp_dir.path(), schema)?;

    store.for_writing(|txn| txn.lookup("balances")?.set(b"alice", &1_000i64))?;

    println!("withdraw 300: {:?}", withdraw(&store, "alice", 300));
    println!("withdraw 5000: {:?}", withdraw(&store, "alice", 5_000));
    println!("withdraw from bob: {:?}", withdraw(&store, "bob", 1));

    // The failed withdrawals left no trace
    let balance: i64 = store.for_reading(|txn| txn.lookup("balances")?.get(b"alice"))?;
    println!("final balance: {}", balance);
    assert_eq!(balance, 700);

    store.close()?;
    Ok(())
}
