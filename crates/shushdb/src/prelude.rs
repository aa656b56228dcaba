//! shushdb Prelude
//!
//! Import this to get all commonly used types and traits:
//!
//! ```
//! use shushdb::prelude::*;
//! ```

// Core types
pub use crate::{Result, ShushError, Store, StoreConfig, SyncMode};

// Schema and codecs
pub use crate::{BincodeCodec, Codec, CodecError, JsonCodec, RawCodec, Schema, SchemaEntry};

// Transactions and views
pub use crate::{Collection, CollectionMut, ReadTxn, TxnState, WriteTxn};

// Traits
pub use crate::{ReadCollection, WriteCollection};

// Re-export common external deps
pub use serde::{Deserialize, Serialize};
