//! Two-tier store
//!
//! Composes a [`FileStore`] (durable tier, the source of truth) and a
//! [`MemStore`] (volatile tier, a read cache). Reads are served from
//! the cache when possible and fall back to disk, warming the cache on
//! the way; writes land on disk first and only then in the cache.
//!
//! ## Tier invariant
//!
//! A key present in the cache always carries byte-identical content to
//! what the durable tier holds for it, or the cache entry is absent
//! and the next read re-fetches it. The cache is never the sole holder
//! of a value, so dropping any or all cache entries is always safe.

use std::io::{Read, Write};
use std::path::PathBuf;

use bytes::Bytes;
use tracing::trace;

use crate::error::Result;
use crate::filestore::{FileStore, FileStoreBuilder};
use crate::memstore::MemStore;
use crate::store::Store;

/// Two-tier store: durable files behind an in-memory cache.
///
/// Both tiers are held as plain fields; neither tier's type leaks into
/// this store's surface, and nothing here exposes a way to mutate one
/// tier without the other staying consistent.
pub struct FileBackedMemStore {
    file: FileStore,
    mem: MemStore,
}

impl FileBackedMemStore {
    /// Open a store over `base_dir` with default settings, as
    /// [`FileStore::open`] would
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::from_file_store(FileStore::open(base_dir)?))
    }

    /// Start building the durable tier; wrap the result with
    /// [`from_file_store`](Self::from_file_store)
    pub fn builder(base_dir: impl Into<PathBuf>) -> FileStoreBuilder {
        FileStore::builder(base_dir)
    }

    /// Wrap an existing durable store with a fresh, empty cache
    pub fn from_file_store(file: FileStore) -> Self {
        Self {
            file,
            mem: MemStore::new(),
        }
    }

    /// Stream the value for `key` into `dest`.
    ///
    /// Cache hits never touch the disk. On a cache miss the value is
    /// fetched from the durable tier, installed in the cache, and then
    /// streamed to `dest`. A durable-tier error propagates unchanged
    /// with no cache mutation.
    pub fn get(&self, key: &str, dest: &mut dyn Write) -> Result<()> {
        if let Some(value) = self.mem.fetch(key) {
            dest.write_all(&value)?;
            return Ok(());
        }
        let mut buf = Vec::new();
        self.file.get(key, &mut buf)?;
        trace!(key, len = buf.len(), "cache miss, populated from file store");
        let value = Bytes::from(buf);
        self.mem.insert(key.to_owned(), value.clone());
        dest.write_all(&value)?;
        Ok(())
    }

    /// Read `src` to end and store the bytes in both tiers.
    ///
    /// The source is buffered once and the durable tier is written
    /// first; if that write fails the cache is left untouched, so the
    /// cache can never hold a value the disk does not.
    pub fn set(&self, key: &str, src: &mut dyn Read) -> Result<()> {
        let mut buf = Vec::new();
        src.read_to_end(&mut buf)?;
        let value = Bytes::from(buf);
        self.file.set(key, &mut value.as_ref())?;
        self.mem.insert(key.to_owned(), value);
        Ok(())
    }

    /// Delete `key` from both tiers.
    ///
    /// The durable tier goes first and its errors (including
    /// [`UnknownKey`](crate::StrataError::UnknownKey)) propagate untouched;
    /// on success the cache entry is dropped, whether or not one
    /// existed.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.file.remove(key)?;
        self.mem.remove_many(&[key]);
        Ok(())
    }

    /// Drop entries from the cache only — the durable tier is never
    /// touched.
    ///
    /// An empty `keys` list clears the entire cache. Use this for
    /// memory-pressure relief; subsequent reads repopulate from disk.
    pub fn clear(&self, keys: &[&str]) {
        if keys.is_empty() {
            self.mem.clear();
        } else {
            self.mem.remove_many(keys);
        }
    }

    /// Move the value under `old_key` to `new_key` in the durable tier.
    ///
    /// On success the stale cache entry under `old_key` is dropped; the
    /// cache entry for `new_key` is not created here — the next `get`
    /// repopulates it from disk. Overwrite semantics for an occupied
    /// `new_key` are [`FileStore::rename`]'s.
    pub fn rename(&self, old_key: &str, new_key: &str) -> Result<()> {
        self.file.rename(old_key, new_key)?;
        self.mem.remove_many(&[old_key]);
        Ok(())
    }

    /// All keys currently stored, sorted lexicographically.
    ///
    /// Enumeration delegates entirely to the durable tier; the cache is
    /// not authoritative.
    pub fn keys(&self) -> Vec<String> {
        self.file.keys()
    }

    /// True when `key` exists in the durable tier
    pub fn exists(&self, key: &str) -> bool {
        self.file.exists(key)
    }

    /// Filesystem metadata for the file backing `key`
    pub fn stat(&self, key: &str) -> Result<std::fs::Metadata> {
        self.file.stat(key)
    }
}

impl Store for FileBackedMemStore {
    fn get(&self, key: &str, dest: &mut dyn Write) -> Result<()> {
        FileBackedMemStore::get(self, key, dest)
    }

    fn set(&self, key: &str, src: &mut dyn Read) -> Result<()> {
        FileBackedMemStore::set(self, key, src)
    }

    fn remove(&self, key: &str) -> Result<()> {
        FileBackedMemStore::remove(self, key)
    }

    fn rename(&self, old_key: &str, new_key: &str) -> Result<()> {
        FileBackedMemStore::rename(self, old_key, new_key)
    }

    fn keys(&self) -> Vec<String> {
        FileBackedMemStore::keys(self)
    }
}
