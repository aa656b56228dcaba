//! Record codecs
//!
//! A codec converts between a structured record and the opaque bytes stored
//! in the engine. Each sub-store in a [`Schema`](crate::Schema) declares one
//! codec for one record type.
//!
//! # Example
//!
//! ```
//! use shushdb_core::codec::{Codec, JsonCodec};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct User {
//!     name: String,
//! }
//!
//! let user = User { name: "Alice".into() };
//! let bytes = Codec::<User>::encode(&JsonCodec, &user).unwrap();
//! let decoded: User = JsonCodec.decode(&bytes).unwrap();
//! assert_eq!(decoded, user);
//! ```

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("encode failed: {0}")]
    Encode(String),

    #[error("decode failed: {0}")]
    Decode(String),
}

pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Codec trait for encoding/decoding records of type `R`
pub trait Codec<R>: Send + Sync + 'static {
    /// Encode a record to bytes
    fn encode(&self, record: &R) -> CodecResult<Vec<u8>>;

    /// Decode a record from bytes
    fn decode(&self, bytes: &[u8]) -> CodecResult<R>;

    /// Get the codec name (reported by the schema)
    fn name(&self) -> &str;
}

/// JSON codec (human-readable, larger size)
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<R> Codec<R> for JsonCodec
where
    R: Serialize + DeserializeOwned,
{
    fn encode(&self, record: &R) -> CodecResult<Vec<u8>> {
        serde_json::to_vec(record).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<R> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }

    fn name(&self) -> &str {
        "json"
    }
}

/// Bincode codec (binary, compact)
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl<R> Codec<R> for BincodeCodec
where
    R: Serialize + DeserializeOwned,
{
    fn encode(&self, record: &R) -> CodecResult<Vec<u8>> {
        bincode::serialize(record).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<R> {
        bincode::deserialize(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }

    fn name(&self) -> &str {
        "bincode"
    }
}

/// Identity codec for sub-stores that hold raw bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCodec;

impl Codec<Vec<u8>> for RawCodec {
    fn encode(&self, record: &Vec<u8>) -> CodecResult<Vec<u8>> {
        Ok(record.clone())
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<Vec<u8>> {
        Ok(bytes.to_vec())
    }

    fn name(&self) -> &str {
        "raw"
    }
}
