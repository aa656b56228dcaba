//! Basic shushdb usage
//!
//! Opens a store with two typed sub-stores, writes in one transaction, reads
//! back in another, and walks a sub-store in key order.
//!
//! Run with: cargo run --example basic_usage

use shushdb::prelude::*;

#[derive(Debug, Serialize, Deserialize)]
struct Account {
    owner: String,
    balance: i64,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("shushdb_lmdb=debug")
        .init();

    let temp_dir = tempfile::tempdir()?;
    let db_path = temp_dir.path().join("shushdb-example");

    let schema = Schema::builder()
        .sub_store::<Account, _>("accounts", JsonCodec)
        .sub_store::<u64, _>("visits", BincodeCodec)
        .build()?;
    let store = Store::open(&db_path, schema)?;

    println!("Opened {} with sub-stores:", store.path().display());
    store.for_reading(|txn| {
        for name in txn.names() {
            println!("  {} ({} records)", name, txn.lookup(name)?.len()?);
        }
        Ok::<_, ShushError>(())
    })?;

    store.for_writing(|txn| {
        let mut accounts = txn.lookup("accounts")?;
        accounts.set(
            b"acc-1",
            &Account {
                owner: "alice".into(),
                balance: 10_000,
            },
        )?;
        accounts.set(
            b"acc-2",
            &Account {
                owner: "bob".into(),
                balance: 250,
            },
        )?;
        txn.lookup("visits")?.set(b"alice", &3u64)
    })?;

    // Move funds between accounts atomically
    store.for_writing(|txn| {
        let mut accounts = txn.lookup("accounts")?;
        let mut from: Account = accounts.get(b"acc-1")?;
        let mut to: Account = accounts.get(b"acc-2")?;
        from.balance -= 500;
        to.balance += 500;
        accounts.set(b"acc-1", &from)?;
        accounts.set(b"acc-2", &to)
    })?;

    store.for_reading(|txn| {
        let accounts = txn.lookup("accounts")?;
        for (key, account) in accounts.entries::<Account>()? {
            let account = account?;
            println!(
                "{} -> {} has {}",
                String::from_utf8_lossy(key),
                account.owner,
                account.balance
            );
        }

        match txn.lookup("visits")?.get::<u64>(b"carol") {
            Err(e) if e.is_not_found() => println!("no visits for carol"),
            other => println!("unexpected: {:?}", other),
        }
        Ok::<_, ShushError>(())
    })?;

    store.close()?;
    Ok(())
}
