//! shushdb: a schema-typed, transactional object store over LMDB
//!
//! One LMDB environment is divided into named sub-stores. A [`Schema`]
//! declares each sub-store's record type and codec; transactions hand out
//! typed views that translate records to bytes and back.
//!
//! - **Snapshot reads**: any number of concurrent read transactions
//! - **Single writer**: write transactions are serialized by LMDB itself
//! - **Scoped transactions**: commit on success, abort on error or drop
//! - **Typed views**: read-only and read-write capabilities are distinct types
//!
//! # Quick Start
//!
//! ```no_run
//! use shushdb::prelude::*;
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct User {
//!     name: String,
//! }
//!
//! # fn main() -> Result<()> {
//! let schema = Schema::builder()
//!     .sub_store::<User, _>("users", JsonCodec)
//!     .build()?;
//! let store = Store::open("./data", schema)?;
//!
//! // Commits when the closure returns Ok, aborts otherwise
//! store.for_writing(|txn| {
//!     txn.lookup("users")?
//!         .set(b"alice", &User { name: "Alice".into() })
//! })?;
//!
//! let alice: User = store.for_reading(|txn| txn.lookup("users")?.get(b"alice"))?;
//! assert_eq!(alice.name, "Alice");
//!
//! store.close()?;
//! # Ok(())
//! # }
//! ```

pub mod prelude;

// Re-export core types
pub use shushdb_core::{
    codec::{BincodeCodec, Codec, CodecError, CodecResult, JsonCodec, RawCodec},
    config::{StoreConfig, SyncMode},
    error::{Result, ShushError},
    observe,
    schema::{Schema, SchemaBuilder, SchemaEntry},
    traits::{ReadCollection, WriteCollection},
};

// Re-export implementations
pub use shushdb_lmdb::{
    Collection, CollectionMut, Entries, Keys, ReadTxn, Store, TxnState, WriteTxn,
};
