//! shushdb core: traits and types for the shushdb object store
//!
//! This crate defines the backend-agnostic pieces of a schema-typed,
//! transactional object store:
//! - Schema: the fixed set of named sub-stores and their record types
//! - Codecs: the byte boundary between records and the engine
//! - Collection traits: read and read-write capabilities over one sub-store
//! - Configuration and the error taxonomy shared by every backend

pub mod codec;
pub mod config;
pub mod error;
pub mod observe;
pub mod schema;
pub mod traits;

pub use codec::{BincodeCodec, Codec, CodecError, CodecResult, JsonCodec, RawCodec};
pub use config::{StoreConfig, SyncMode};
pub use error::{Result, ShushError};
pub use schema::{Schema, SchemaBuilder, SchemaEntry};
pub use traits::{ReadCollection, WriteCollection};
