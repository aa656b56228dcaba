use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShushError {
    #[error("Failed to open environment at {path:?}: {reason}")]
    EngineOpen { path: PathBuf, reason: String },

    #[error("Unknown sub-store: {0:?}")]
    UnknownSubStore(String),

    #[error("Key {shown:?} not found in sub-store {sub_store:?}", shown = String::from_utf8_lossy(.key))]
    KeyNotFound { sub_store: String, key: Vec<u8> },

    #[error("Failed to decode key {shown:?} in sub-store {sub_store:?}: {reason}", shown = String::from_utf8_lossy(.key))]
    Decode {
        sub_store: String,
        key: Vec<u8>,
        reason: String,
    },

    #[error("Failed to encode key {shown:?} in sub-store {sub_store:?}: {reason}", shown = String::from_utf8_lossy(.key))]
    Encode {
        sub_store: String,
        key: Vec<u8>,
        reason: String,
    },

    #[error("Type mismatch in sub-store {sub_store:?}: declared {expected}, got {found}")]
    TypeMismatch {
        sub_store: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Transaction already finalized")]
    TransactionClosed,

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Engine error during {op}: {message} (code {code})")]
    Engine {
        op: &'static str,
        code: i32,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ShushError {
    /// Raw engine error code, when this error came from the storage engine.
    pub fn engine_code(&self) -> Option<i32> {
        match self {
            ShushError::Engine { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ShushError::KeyNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, ShushError>;

// Application errors:
//
// `Store::for_writing` and `Store::for_reading` accept closures returning any
// error type `E: From<ShushError>`, so application code can keep its own
// error enum and still use `?` on store operations:
//
// #[derive(Error, Debug)]
// pub enum AppError {
//     #[error("Insufficient balance")]
//     InsufficientBalance,
//
//     #[error(transparent)]
//     Store(#[from] ShushError),
// }
