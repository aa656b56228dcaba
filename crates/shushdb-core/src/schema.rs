//! Schema: the fixed set of sub-stores and their record types
//!
//! A schema maps each sub-store name to the record type it holds and the
//! codec that gives those records their byte form. It is built once, handed
//! to the store at open, and never changes afterwards.
//!
//! # Example
//!
//! ```
//! use shushdb_core::{BincodeCodec, JsonCodec, Schema};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct User {
//!     name: String,
//! }
//!
//! #[derive(Serialize, Deserialize)]
//! struct Session {
//!     user: String,
//!     expires_at: u64,
//! }
//!
//! let schema = Schema::builder()
//!     .sub_store::<User, _>("users", JsonCodec)
//!     .sub_store::<Session, _>("sessions", BincodeCodec)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schema.names().collect::<Vec<_>>(), vec!["users", "sessions"]);
//! ```

use crate::codec::Codec;
use crate::error::{Result, ShushError};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// One declared sub-store
pub struct SchemaEntry {
    name: String,
    record_type: TypeId,
    record_type_name: &'static str,
    codec_name: String,
    // Holds a `Box<dyn Codec<R>>` for the declared `R`
    codec: Box<dyn Any + Send + Sync>,
}

impl SchemaEntry {
    fn new<R, C>(name: String, codec: C) -> Self
    where
        R: 'static,
        C: Codec<R>,
    {
        let codec_name = codec.name().to_string();
        let boxed: Box<dyn Codec<R>> = Box::new(codec);
        Self {
            name,
            record_type: TypeId::of::<R>(),
            record_type_name: type_name::<R>(),
            codec_name,
            codec: Box::new(boxed),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully qualified name of the declared record type
    pub fn record_type_name(&self) -> &'static str {
        self.record_type_name
    }

    pub fn codec_name(&self) -> &str {
        &self.codec_name
    }

    /// Whether `R` is the declared record type
    pub fn accepts<R: 'static>(&self) -> bool {
        self.record_type == TypeId::of::<R>()
    }

    /// Get the codec for `R`
    ///
    /// Fails with `TypeMismatch` if `R` is not the declared record type.
    pub fn codec<R: 'static>(&self) -> Result<&dyn Codec<R>> {
        self.codec
            .downcast_ref::<Box<dyn Codec<R>>>()
            .map(|codec| &**codec)
            .ok_or_else(|| ShushError::TypeMismatch {
                sub_store: self.name.clone(),
                expected: self.record_type_name,
                found: type_name::<R>(),
            })
    }
}

impl fmt::Debug for SchemaEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaEntry")
            .field("name", &self.name)
            .field("record_type", &self.record_type_name)
            .field("codec", &self.codec_name)
            .finish()
    }
}

/// Ordered, immutable mapping from sub-store name to [`SchemaEntry`]
#[derive(Debug)]
pub struct Schema {
    entries: Vec<SchemaEntry>,
    index: HashMap<String, usize>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sub-store names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn entries(&self) -> &[SchemaEntry] {
        &self.entries
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Declaration index of a sub-store
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&SchemaEntry> {
        self.position(name).map(|i| &self.entries[i])
    }

    /// Like [`get`](Self::get), but fails with `UnknownSubStore`
    pub fn entry(&self, name: &str) -> Result<&SchemaEntry> {
        self.get(name)
            .ok_or_else(|| ShushError::UnknownSubStore(name.to_string()))
    }
}

/// Builder for [`Schema`]
///
/// Declaration order is preserved. Duplicate or empty names are reported by
/// [`build`](Self::build).
#[derive(Default)]
pub struct SchemaBuilder {
    entries: Vec<SchemaEntry>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a sub-store holding records of type `R`, encoded with `codec`
    pub fn sub_store<R, C>(mut self, name: impl Into<String>, codec: C) -> Self
    where
        R: 'static,
        C: Codec<R>,
    {
        self.entries.push(SchemaEntry::new::<R, C>(name.into(), codec));
        self
    }

    pub fn build(self) -> Result<Schema> {
        let mut index = HashMap::with_capacity(self.entries.len());
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.name.is_empty() {
                return Err(ShushError::Schema(format!(
                    "sub-store #{} has an empty name",
                    i
                )));
            }
            if index.insert(entry.name.clone(), i).is_some() {
                return Err(ShushError::Schema(format!(
                    "sub-store {:?} declared more than once",
                    entry.name
                )));
            }
        }

        Ok(Schema {
            entries: self.entries,
            index,
        })
    }
}
