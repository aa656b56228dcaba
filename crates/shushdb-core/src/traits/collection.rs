use crate::error::{Result, ShushError};

/// Read capability over one named sub-store within one transaction
///
/// Records are typed per call: `R` must be the record type the schema
/// declares for this sub-store, otherwise the call fails with
/// `TypeMismatch` before any bytes are decoded.
pub trait ReadCollection {
    /// Lazy key iterator, ascending byte order
    type Keys<'a>: Iterator<Item = &'a [u8]>
    where
        Self: 'a;

    /// Name of the bound sub-store
    fn name(&self) -> &str;

    /// Get a record, returning None if the key doesn't exist
    fn try_get<R: 'static>(&self, key: &[u8]) -> Result<Option<R>>;

    /// Get a record
    ///
    /// An absent key is `KeyNotFound`, distinct from `Decode` (malformed
    /// bytes) and `TypeMismatch` (wrong `R`). The engine rejects an empty
    /// key with an `Engine` error.
    fn get<R: 'static>(&self, key: &[u8]) -> Result<R> {
        self.try_get(key)?.ok_or_else(|| ShushError::KeyNotFound {
            sub_store: self.name().to_string(),
            key: key.to_vec(),
        })
    }

    /// Check if a key exists
    fn contains_key(&self, key: &[u8]) -> Result<bool>;

    /// Iterate keys from the first entry
    ///
    /// Each call opens a fresh cursor, released when the iterator drops.
    /// The sub-store must not be mutated while the iterator is alive.
    fn keys(&self) -> Result<Self::Keys<'_>>;

    /// Live entry count as of this transaction's view
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Write capability, only reachable through a write transaction
pub trait WriteCollection: ReadCollection {
    /// Insert or replace a record
    ///
    /// Fails with `TypeMismatch` if `R` is not the declared record type;
    /// nothing is written in that case.
    fn set<R: 'static>(&mut self, key: &[u8], record: &R) -> Result<()>;

    /// Delete a key
    ///
    /// Deleting an absent key succeeds. Returns whether a key was removed.
    /// An empty key is rejected by the engine with an `Engine` error.
    fn delete(&mut self, key: &[u8]) -> Result<bool>;

    /// Remove every entry, keeping the sub-store itself
    fn clear(&mut self) -> Result<()>;
}
