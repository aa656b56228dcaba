use lmdb::{Cursor, Database, Iter, RoCursor, Transaction};
use shushdb_core::{Codec, Result, SchemaEntry};

use crate::collection::decode_failed;
use crate::engine::engine_err;

/// Cursor plus its iterator
///
/// The cursor is closed when this drops. Keys and values borrow the
/// transaction's memory map, so they stay valid for `'txn` and are not copied.
struct CursorIter<'txn> {
    // Declared first so it drops before the cursor it reads from
    iter: Iter<'txn>,
    _cursor: RoCursor<'txn>,
}

impl<'txn> CursorIter<'txn> {
    fn open<T: Transaction>(txn: &'txn T, db: Database) -> Result<Self> {
        let mut cursor = txn
            .open_ro_cursor(db)
            .map_err(engine_err("open cursor"))?;
        // A fresh cursor steps onto the first entry
        let iter = cursor.iter();
        Ok(Self {
            iter,
            _cursor: cursor,
        })
    }
}

/// Lazy iterator over the keys of one sub-store, in ascending byte order
///
/// Not restartable: ask the collection for a new one to start again.
pub struct Keys<'txn> {
    inner: CursorIter<'txn>,
}

impl<'txn> Keys<'txn> {
    pub(crate) fn open<T: Transaction>(txn: &'txn T, db: Database) -> Result<Self> {
        Ok(Self {
            inner: CursorIter::open(txn, db)?,
        })
    }
}

impl<'txn> Iterator for Keys<'txn> {
    type Item = &'txn [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.iter.next().map(|(key, _)| key)
    }
}

/// Lazy iterator over `(key, record)` pairs of one sub-store
///
/// Decoding happens per item, so a malformed value surfaces as an `Err` for
/// that key without ending the iteration.
pub struct Entries<'txn, R> {
    inner: CursorIter<'txn>,
    entry: &'txn SchemaEntry,
    codec: &'txn dyn Codec<R>,
}

impl<'txn, R: 'static> Entries<'txn, R> {
    pub(crate) fn open<T: Transaction>(
        txn: &'txn T,
        db: Database,
        entry: &'txn SchemaEntry,
    ) -> Result<Self> {
        let codec = entry.codec::<R>()?;
        Ok(Self {
            inner: CursorIter::open(txn, db)?,
            entry,
            codec,
        })
    }
}

impl<'txn, R: 'static> Iterator for Entries<'txn, R> {
    type Item = (&'txn [u8], Result<R>);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, bytes) = self.inner.iter.next()?;
        let record = self
            .codec
            .decode(bytes)
            .map_err(|e| decode_failed(self.entry, key, e));
        Some((key, record))
    }
}
