//! In-memory store
//!
//! Volatile key-value backend: a `HashMap` behind a single
//! reader/writer lock. Used standalone for scratch data, and as the
//! cache tier of [`FileBackedMemStore`](crate::FileBackedMemStore).

use std::collections::HashMap;
use std::io::{Read, Write};

use bytes::Bytes;
use parking_lot::RwLock;

use crate::codec;
use crate::error::{Result, StrataError};
use crate::store::Store;

/// Volatile in-memory key-value store.
///
/// ## Concurrency
///
/// One `RwLock` guards the whole map: unlimited concurrent readers,
/// one exclusive writer, no upgrade or downgrade. The lock is not
/// reentrant — no method may call another method of this type while
/// holding it, and none does. Batched variants exist precisely so
/// callers touching many keys pay for one lock acquisition instead of
/// one per key.
///
/// Values are [`Bytes`], so reads clone a refcount and stream to the
/// destination after the lock is released.
pub struct MemStore {
    data: RwLock<HashMap<String, Bytes>>,
}

impl MemStore {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Stream the value for `key` into `dest`
    pub fn get(&self, key: &str, dest: &mut dyn Write) -> Result<()> {
        let value = self.fetch(key).ok_or(StrataError::UnknownKey)?;
        dest.write_all(&value)?;
        Ok(())
    }

    /// Retrieve values for several keys under a single lock acquisition.
    ///
    /// Keys not present in the store are skipped; their destinations
    /// are left untouched.
    pub fn get_many(&self, batch: &mut [(&str, &mut dyn Write)]) -> Result<()> {
        let data = self.data.read();
        for (key, dest) in batch {
            if let Some(value) = data.get(*key) {
                dest.write_all(value)?;
            }
        }
        Ok(())
    }

    /// Read `src` to end and store the bytes under `key`
    pub fn set(&self, key: &str, src: &mut dyn Read) -> Result<()> {
        let mut buf = Vec::new();
        src.read_to_end(&mut buf)?;
        self.insert(key.to_owned(), Bytes::from(buf));
        Ok(())
    }

    /// Store values for several keys under a single lock acquisition.
    ///
    /// All sources are buffered before the lock is taken; an error
    /// reading any source aborts the call with the store unchanged.
    pub fn set_many(&self, batch: &mut [(&str, &mut dyn Read)]) -> Result<()> {
        let mut staged = Vec::with_capacity(batch.len());
        for (key, src) in batch {
            let mut buf = Vec::new();
            src.read_to_end(&mut buf)?;
            staged.push(((*key).to_owned(), Bytes::from(buf)));
        }
        let mut data = self.data.write();
        for (key, value) in staged {
            data.insert(key, value);
        }
        Ok(())
    }

    /// Delete the value stored under `key`
    pub fn remove(&self, key: &str) -> Result<()> {
        match self.data.write().remove(key) {
            Some(_) => Ok(()),
            None => Err(StrataError::UnknownKey),
        }
    }

    /// Delete several keys under a single lock acquisition, ignoring
    /// keys that are absent
    pub fn remove_many(&self, keys: &[&str]) {
        let mut data = self.data.write();
        for key in keys {
            data.remove(*key);
        }
    }

    /// Drop every entry in the store
    pub fn clear(&self) {
        self.data.write().clear();
    }

    /// True when `key` has a value in the store
    pub fn exists(&self, key: &str) -> bool {
        self.data.read().contains_key(key)
    }

    /// All keys currently stored, sorted lexicographically
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.data.read().keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    /// Move the value under `old_key` to `new_key`.
    ///
    /// Fails with [`UnknownKey`](StrataError::UnknownKey) when
    /// `old_key` is absent and [`KeyExists`](StrataError::KeyExists)
    /// when `new_key` is occupied.
    pub fn rename(&self, old_key: &str, new_key: &str) -> Result<()> {
        let mut data = self.data.write();
        if !data.contains_key(old_key) {
            return Err(StrataError::UnknownKey);
        }
        if data.contains_key(new_key) {
            return Err(StrataError::KeyExists);
        }
        let value = data.remove(old_key).unwrap();
        data.insert(new_key.to_owned(), value);
        Ok(())
    }

    // =========================================================================
    // Snapshot persistence
    // =========================================================================

    /// Encode the entire store as one snapshot stream.
    ///
    /// The output can itself be stored as a single value in any other
    /// store, and restored later with [`read_snapshot`](Self::read_snapshot).
    /// The read lock is held while the destination is written.
    pub fn write_snapshot(&self, dest: &mut dyn Write) -> Result<()> {
        let data = self.data.read();
        for (key, value) in data.iter() {
            codec::write_record(dest, key, value)?;
        }
        Ok(())
    }

    /// Decode a snapshot stream into the store, replacing the values of
    /// any keys the snapshot also carries.
    ///
    /// Decoding stops cleanly at end-of-stream; an end-of-stream inside
    /// a record surfaces as
    /// [`CorruptStream`](StrataError::CorruptStream) with the records
    /// decoded so far already installed.
    pub fn read_snapshot(&self, src: &mut dyn Read) -> Result<()> {
        let mut data = self.data.write();
        while let Some((key, value)) = codec::try_read_record(src)? {
            data.insert(key, Bytes::from(value));
        }
        Ok(())
    }

    // =========================================================================
    // Crate-internal helpers (used by the tiered store)
    // =========================================================================

    /// Look up a value, cloning it out of the lock
    pub(crate) fn fetch(&self, key: &str) -> Option<Bytes> {
        self.data.read().get(key).cloned()
    }

    /// Install an already-buffered value
    pub(crate) fn insert(&self, key: String, value: Bytes) {
        self.data.write().insert(key, value);
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemStore {
    fn get(&self, key: &str, dest: &mut dyn Write) -> Result<()> {
        MemStore::get(self, key, dest)
    }

    fn set(&self, key: &str, src: &mut dyn Read) -> Result<()> {
        MemStore::set(self, key, src)
    }

    fn remove(&self, key: &str) -> Result<()> {
        MemStore::remove(self, key)
    }

    fn rename(&self, old_key: &str, new_key: &str) -> Result<()> {
        MemStore::rename(self, old_key, new_key)
    }

    fn keys(&self) -> Vec<String> {
        MemStore::keys(self)
    }
}
