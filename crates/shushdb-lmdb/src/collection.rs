//! Typed collection views over one sub-store within one transaction
//!
//! [`Collection`] is the read capability and is available from both
//! transaction kinds. [`CollectionMut`] adds mutation and is only handed out by
//! a write transaction. Both borrow their transaction, so a view can never
//! outlive it.

use lmdb::{Database, RwTransaction, Transaction, WriteFlags};
use shushdb_core::{
    CodecError, ReadCollection, Result, SchemaEntry, ShushError, WriteCollection,
};
use tracing::trace;

use crate::engine::{engine_err, entry_count};
use crate::iter::{Entries, Keys};

pub(crate) fn decode_failed(entry: &SchemaEntry, key: &[u8], err: CodecError) -> ShushError {
    ShushError::Decode {
        sub_store: entry.name().to_string(),
        key: key.to_vec(),
        reason: err.to_string(),
    }
}

fn get_bytes<'txn, T: Transaction>(
    txn: &'txn T,
    db: Database,
    key: &[u8],
) -> Result<Option<&'txn [u8]>> {
    match txn.get(db, &key) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(lmdb::Error::NotFound) => Ok(None),
        Err(e) => Err(engine_err("get")(e)),
    }
}

fn try_get<R: 'static, T: Transaction>(
    txn: &T,
    db: Database,
    entry: &SchemaEntry,
    key: &[u8],
) -> Result<Option<R>> {
    // Type check comes first so a wrong `R` fails even for absent keys
    let codec = entry.codec::<R>()?;
    match get_bytes(txn, db, key)? {
        Some(bytes) => codec
            .decode(bytes)
            .map(Some)
            .map_err(|e| decode_failed(entry, key, e)),
        None => Ok(None),
    }
}

/// Read-only view over one sub-store
pub struct Collection<'t, T: Transaction> {
    txn: &'t T,
    db: Database,
    entry: &'t SchemaEntry,
}

impl<'t, T: Transaction> Collection<'t, T> {
    pub(crate) fn new(txn: &'t T, db: Database, entry: &'t SchemaEntry) -> Self {
        Self { txn, db, entry }
    }

    /// Schema entry of the bound sub-store
    pub fn entry(&self) -> &SchemaEntry {
        self.entry
    }

    /// Raw stored bytes for a key, borrowed from the transaction
    pub fn get_bytes(&self, key: &[u8]) -> Result<Option<&'t [u8]>> {
        get_bytes(self.txn, self.db, key)
    }

    /// Iterate `(key, record)` pairs in key order
    pub fn entries<R: 'static>(&self) -> Result<Entries<'_, R>> {
        Entries::open(self.txn, self.db, self.entry)
    }
}

impl<'t, T: Transaction> ReadCollection for Collection<'t, T> {
    type Keys<'a>
        = Keys<'a>
    where
        Self: 'a;

    fn name(&self) -> &str {
        self.entry.name()
    }

    fn try_get<R: 'static>(&self, key: &[u8]) -> Result<Option<R>> {
        try_get(self.txn, self.db, self.entry, key)
    }

    fn contains_key(&self, key: &[u8]) -> Result<bool> {
        Ok(get_bytes(self.txn, self.db, key)?.is_some())
    }

    fn keys(&self) -> Result<Keys<'_>> {
        Keys::open(self.txn, self.db)
    }

    fn len(&self) -> Result<usize> {
        entry_count(self.txn, self.db)
    }
}

/// Read-write view over one sub-store
///
/// Mutating methods take `&mut self` while [`keys`](ReadCollection::keys)
/// and [`entries`](Self::entries) borrow `&self`, so the sub-store cannot be
/// changed while a cursor is open over it.
pub struct CollectionMut<'t, 's> {
    txn: &'t mut RwTransaction<'s>,
    db: Database,
    entry: &'t SchemaEntry,
}

impl<'t, 's> CollectionMut<'t, 's> {
    pub(crate) fn new(txn: &'t mut RwTransaction<'s>, db: Database, entry: &'t SchemaEntry) -> Self {
        Self { txn, db, entry }
    }

    /// Schema entry of the bound sub-store
    pub fn entry(&self) -> &SchemaEntry {
        self.entry
    }

    /// Raw stored bytes for a key, including this transaction's writes
    pub fn get_bytes(&self, key: &[u8]) -> Result<Option<&[u8]>> {
        get_bytes(&*self.txn, self.db, key)
    }

    /// Iterate `(key, record)` pairs in key order
    pub fn entries<R: 'static>(&self) -> Result<Entries<'_, R>> {
        Entries::open(&*self.txn, self.db, self.entry)
    }
}

impl<'t, 's> ReadCollection for CollectionMut<'t, 's> {
    type Keys<'a>
        = Keys<'a>
    where
        Self: 'a;

    fn name(&self) -> &str {
        self.entry.name()
    }

    fn try_get<R: 'static>(&self, key: &[u8]) -> Result<Option<R>> {
        try_get(&*self.txn, self.db, self.entry, key)
    }

    fn contains_key(&self, key: &[u8]) -> Result<bool> {
        Ok(get_bytes(&*self.txn, self.db, key)?.is_some())
    }

    fn keys(&self) -> Result<Keys<'_>> {
        Keys::open(&*self.txn, self.db)
    }

    fn len(&self) -> Result<usize> {
        entry_count(&*self.txn, self.db)
    }
}

impl<'t, 's> WriteCollection for CollectionMut<'t, 's> {
    fn set<R: 'static>(&mut self, key: &[u8], record: &R) -> Result<()> {
        let codec = self.entry.codec::<R>()?;
        let bytes = codec.encode(record).map_err(|e| ShushError::Encode {
            sub_store: self.entry.name().to_string(),
            key: key.to_vec(),
            reason: e.to_string(),
        })?;

        trace!(sub_store = self.entry.name(), len = bytes.len(), "put");
        self.txn
            .put(self.db, &key, &bytes, WriteFlags::empty())
            .map_err(engine_err("put"))
    }

    fn delete(&mut self, key: &[u8]) -> Result<bool> {
        match self.txn.del(self.db, &key, None) {
            Ok(()) => Ok(true),
            Err(lmdb::Error::NotFound) => Ok(false), // Idempotent
            Err(e) => Err(engine_err("delete")(e)),
        }
    }

    fn clear(&mut self) -> Result<()> {
        trace!(sub_store = self.entry.name(), "clear");
        self.txn.clear_db(self.db).map_err(engine_err("clear"))
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{open_store, test_config, User};
    use crate::Store;
    use shushdb_core::{
        BincodeCodec, JsonCodec, RawCodec, ReadCollection, Schema, ShushError, WriteCollection,
    };
    use std::collections::HashMap;

    #[test]
    fn test_set_then_get() {
        let (store, _dir) = open_store();
        let mut txn = store.begin_write().unwrap();
        let mut users = txn.lookup("users").unwrap();
        users.set(b"alice", &User::new("Alice")).unwrap();
        assert_eq!(users.get::<User>(b"alice").unwrap(), User::new("Alice"));
        drop(users);
        txn.commit().unwrap();

        let txn = store.begin_read().unwrap();
        let users = txn.lookup("users").unwrap();
        assert_eq!(users.get::<User>(b"alice").unwrap(), User::new("Alice"));
        assert_eq!(users.try_get::<User>(b"bob").unwrap(), None);
    }

    #[test]
    fn test_get_absent_key_names_store_and_key() {
        let (store, _dir) = open_store();
        let txn = store.begin_read().unwrap();
        let users = txn.lookup("users").unwrap();
        match users.get::<User>(b"bob") {
            Err(ShushError::KeyNotFound { sub_store, key }) => {
                assert_eq!(sub_store, "users");
                assert_eq!(key, b"bob");
            }
            other => panic!("expected KeyNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_set_overwrites() {
        let (store, _dir) = open_store();
        let mut txn = store.begin_write().unwrap();
        let mut counters = txn.lookup("counters").unwrap();
        counters.set(b"hits", &1u64).unwrap();
        counters.set(b"hits", &2u64).unwrap();
        assert_eq!(counters.get::<u64>(b"hits").unwrap(), 2);
        assert_eq!(counters.len().unwrap(), 1);
    }

    #[test]
    fn test_wrong_record_type_is_rejected_before_writing() {
        let (store, _dir) = open_store();
        let mut txn = store.begin_write().unwrap();
        let mut users = txn.lookup("users").unwrap();

        let err = users.set(b"alice", &42u64).unwrap_err();
        assert!(matches!(
            err,
            ShushError::TypeMismatch { ref sub_store, .. } if sub_store == "users"
        ));
        assert!(!users.contains_key(b"alice").unwrap());

        users.set(b"alice", &User::new("Alice")).unwrap();
        assert!(matches!(
            users.get::<u64>(b"alice"),
            Err(ShushError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_malformed_bytes_are_decode_errors() {
        let temp_dir = tempfile::tempdir().unwrap();

        // Write raw bytes, then reopen with the sub-store declared as u64
        let raw_schema = Schema::builder()
            .sub_store::<Vec<u8>, _>("counters", RawCodec)
            .build()
            .unwrap();
        let store = Store::open_with_config(raw_schema, test_config(temp_dir.path())).unwrap();
        store
            .for_writing(|txn| {
                let mut counters = txn.lookup("counters")?;
                counters.set(b"bad", &vec![0x01u8])?;
                counters.set(b"ok", &7u64.to_le_bytes().to_vec())
            })
            .unwrap();
        store.close().unwrap();

        let typed_schema = Schema::builder()
            .sub_store::<u64, _>("counters", BincodeCodec)
            .build()
            .unwrap();
        let store = Store::open_with_config(typed_schema, test_config(temp_dir.path())).unwrap();
        let txn = store.begin_read().unwrap();
        let counters = txn.lookup("counters").unwrap();
        match counters.get::<u64>(b"bad") {
            Err(ShushError::Decode { sub_store, key, .. }) => {
                assert_eq!(sub_store, "counters");
                assert_eq!(key, b"bad");
            }
            other => panic!("expected Decode, got {:?}", other),
        }
        assert_eq!(counters.get::<u64>(b"ok").unwrap(), 7);
        assert_eq!(counters.get_bytes(b"bad").unwrap(), Some(&[0x01u8][..]));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (store, _dir) = open_store();
        let mut txn = store.begin_write().unwrap();
        let mut counters = txn.lookup("counters").unwrap();
        counters.set(b"a", &1u64).unwrap();

        assert!(counters.delete(b"a").unwrap());
        assert!(!counters.delete(b"a").unwrap());
        assert!(!counters.delete(b"never").unwrap());
        assert!(counters.is_empty().unwrap());
    }

    #[test]
    fn test_keys_are_ordered_and_restartable() {
        let (store, _dir) = open_store();
        let mut txn = store.begin_write().unwrap();
        let mut counters = txn.lookup("counters").unwrap();
        let inserted: [&[u8]; 4] = [b"b", b"a", b"c", b"aa"];
        for key in inserted {
            counters.set(key, &0u64).unwrap();
        }

        let keys: Vec<Vec<u8>> = counters.keys().unwrap().map(|k| k.to_vec()).collect();
        assert_eq!(
            keys,
            vec![b"a".to_vec(), b"aa".to_vec(), b"b".to_vec(), b"c".to_vec()]
        );

        let mut partial = counters.keys().unwrap();
        assert_eq!(partial.next(), Some(&b"a"[..]));
        drop(partial);
        assert_eq!(counters.keys().unwrap().next(), Some(&b"a"[..]));
    }

    #[test]
    fn test_keys_on_empty_sub_store() {
        let (store, _dir) = open_store();
        let txn = store.begin_read().unwrap();
        let users = txn.lookup("users").unwrap();
        assert_eq!(users.keys().unwrap().count(), 0);
        assert_eq!(users.len().unwrap(), 0);
    }

    #[test]
    fn test_entries_decode_in_key_order() {
        let (store, _dir) = open_store();
        let mut txn = store.begin_write().unwrap();
        let mut counters = txn.lookup("counters").unwrap();
        counters.set(b"y", &2u64).unwrap();
        counters.set(b"x", &1u64).unwrap();

        let entries: Vec<(Vec<u8>, u64)> = counters
            .entries::<u64>()
            .unwrap()
            .map(|(k, v)| (k.to_vec(), v.unwrap()))
            .collect();
        assert_eq!(entries, vec![(b"x".to_vec(), 1), (b"y".to_vec(), 2)]);

        assert!(matches!(
            counters.entries::<User>(),
            Err(ShushError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_clear_keeps_handle_usable() {
        let (store, _dir) = open_store();
        let mut txn = store.begin_write().unwrap();
        let mut counters = txn.lookup("counters").unwrap();
        counters.set(b"a", &1u64).unwrap();
        counters.set(b"b", &2u64).unwrap();

        counters.clear().unwrap();
        assert_eq!(counters.len().unwrap(), 0);

        counters.set(b"c", &3u64).unwrap();
        assert_eq!(counters.len().unwrap(), 1);
        assert_eq!(counters.get::<u64>(b"c").unwrap(), 3);
    }

    #[test]
    fn test_clear_only_touches_its_sub_store() {
        let (store, _dir) = open_store();
        let mut txn = store.begin_write().unwrap();
        txn.lookup("users")
            .unwrap()
            .set(b"alice", &User::new("Alice"))
            .unwrap();
        txn.lookup("counters").unwrap().set(b"a", &1u64).unwrap();

        txn.lookup("counters").unwrap().clear().unwrap();
        assert_eq!(txn.view("users").unwrap().len().unwrap(), 1);
        assert_eq!(txn.view("counters").unwrap().len().unwrap(), 0);
    }

    #[test]
    fn test_unencodable_record_is_encode_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        // JSON object keys must be strings, so byte-vector keys cannot encode
        let schema = Schema::builder()
            .sub_store::<HashMap<Vec<u8>, u8>, _>("maps", JsonCodec)
            .build()
            .unwrap();
        let store = Store::open_with_config(schema, test_config(temp_dir.path())).unwrap();
        let mut txn = store.begin_write().unwrap();
        let mut maps = txn.lookup("maps").unwrap();

        let mut record = HashMap::new();
        record.insert(b"inner".to_vec(), 1u8);
        match maps.set(b"k", &record) {
            Err(ShushError::Encode { sub_store, key, .. }) => {
                assert_eq!(sub_store, "maps");
                assert_eq!(key, b"k");
            }
            other => panic!("expected Encode, got {:?}", other),
        }
        assert_eq!(maps.len().unwrap(), 0);
    }

    #[test]
    fn test_empty_key_is_rejected_by_engine() {
        let (store, _dir) = open_store();
        let mut txn = store.begin_write().unwrap();
        let mut counters = txn.lookup("counters").unwrap();
        counters.set(b"a", &1u64).unwrap();

        let err = counters.get::<u64>(b"").unwrap_err();
        assert_eq!(err.engine_code(), Some(lmdb_sys::MDB_BAD_VALSIZE));
        let err = counters.delete(b"").unwrap_err();
        assert!(err.engine_code().is_some());
        assert_eq!(counters.len().unwrap(), 1);
    }
}
