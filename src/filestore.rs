//! File-backed store
//!
//! Durable key-value backend: one file per key under a base directory,
//! file contents being the exact raw payload. The filename alone
//! encodes the key, via a pluggable [`Mangler`].
//!
//! ## Write discipline
//!
//! With a staging directory configured, every `set` writes the full
//! payload to a temp file there, syncs it, and atomically renames it
//! into place — a reader can never observe a partially written value,
//! because the rename is the single commit point. Without a staging
//! directory, writes go directly to the final path: simpler to deploy,
//! but a crash mid-write leaves a truncated file indistinguishable
//! from a corrupt value. The weaker mode is a deliberate, documented
//! trade-off, selected by simply not configuring a staging directory.

use std::fs::{self, File, Metadata};
use std::io::{self, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Result, StrataError};
use crate::mangle::{Base64Mangler, Mangler};
use crate::store::Store;

/// Durable filesystem-backed key-value store.
///
/// Performs no in-process locking: concurrent writers to different
/// keys never conflict, and writers to the same key from any number of
/// processes are serialized only as strongly as the filesystem's
/// rename atomicity. All operations run synchronously on the caller's
/// thread and may block on disk I/O.
pub struct FileStore {
    base_dir: PathBuf,
    staging_dir: Option<PathBuf>,
    mangler: Box<dyn Mangler>,
}

impl FileStore {
    /// Open a store over `base_dir` with default settings: no staging
    /// directory (direct writes) and the [`Base64Mangler`]
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::builder(base_dir).open()
    }

    /// Start building a store over `base_dir`
    pub fn builder(base_dir: impl Into<PathBuf>) -> FileStoreBuilder {
        FileStoreBuilder {
            base_dir: base_dir.into(),
            staging_dir: None,
            mangler: None,
        }
    }

    /// Stream the value for `key` into `dest`.
    ///
    /// Returns [`UnknownKey`](StrataError::UnknownKey) when no file
    /// backs the key, leaving `dest` untouched.
    pub fn get(&self, key: &str, dest: &mut dyn Write) -> Result<()> {
        let path = self.key_path(key, false)?;
        let mut file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StrataError::UnknownKey),
            Err(e) => return Err(StrataError::Storage(format!("error opening key file: {e}"))),
        };
        io::copy(&mut file, dest)?;
        Ok(())
    }

    /// Read `src` to end and persist the bytes under `key`, replacing
    /// any previous value.
    ///
    /// Staged mode commits via atomic rename; the temp file is removed
    /// if the rename fails. Direct mode writes in place.
    pub fn set(&self, key: &str, src: &mut dyn Read) -> Result<()> {
        let path = self.key_path(key, true)?;
        match &self.staging_dir {
            Some(staging) => {
                let mut tmp = NamedTempFile::new_in(staging).map_err(|e| {
                    StrataError::Storage(format!("error creating staging file: {e}"))
                })?;
                io::copy(src, &mut tmp)?;
                tmp.as_file().sync_all().map_err(|e| {
                    StrataError::Storage(format!("error syncing staging file: {e}"))
                })?;
                // Dropping the PersistError deletes the staged file
                tmp.persist(&path).map_err(|e| {
                    StrataError::Storage(format!("error committing staged file: {}", e.error))
                })?;
            }
            None => {
                let mut file = File::create(&path).map_err(|e| {
                    StrataError::Storage(format!("error creating key file: {e}"))
                })?;
                io::copy(src, &mut file)?;
                file.sync_all()
                    .map_err(|e| StrataError::Storage(format!("error syncing key file: {e}")))?;
            }
        }
        Ok(())
    }

    /// Delete the file backing `key`
    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key, false)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StrataError::UnknownKey),
            Err(e) => Err(StrataError::Storage(format!("error removing key file: {e}"))),
        }
    }

    /// Move the value under `old_key` to `new_key` with a single
    /// filesystem rename.
    ///
    /// Atomic where the filesystem supports it. An existing value under
    /// `new_key` is overwritten — POSIX `rename(2)` semantics. Returns
    /// [`UnknownKey`](StrataError::UnknownKey) when `old_key` has no
    /// backing file.
    pub fn rename(&self, old_key: &str, new_key: &str) -> Result<()> {
        let old_path = self.key_path(old_key, false)?;
        let new_path = self.key_path(new_key, true)?;
        match fs::rename(&old_path, &new_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StrataError::UnknownKey),
            Err(e) => Err(StrataError::Storage(format!("error renaming key file: {e}"))),
        }
    }

    /// All keys currently stored, sorted lexicographically.
    ///
    /// Recursively enumerates the base directory and reverse-mangles
    /// each file path. Entries that fail to decode are foreign data —
    /// skipped, not an error.
    pub fn keys(&self) -> Vec<String> {
        let mut segments = Vec::new();
        let mut keys = Vec::new();
        self.collect_keys(&self.base_dir, &mut segments, &mut keys);
        keys.sort_unstable();
        keys
    }

    /// True when `key` has a backing file
    pub fn exists(&self, key: &str) -> bool {
        self.key_path(key, false)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    /// Filesystem metadata for the file backing `key`
    pub fn stat(&self, key: &str) -> Result<Metadata> {
        let path = self.key_path(key, false)?;
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StrataError::UnknownKey),
            Err(e) => Err(StrataError::Storage(format!("error reading key metadata: {e}"))),
        }
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Resolve a key to its backing path.
    ///
    /// `prepare` creates the intermediate directories a multi-segment
    /// mangling needs before a write. Segments that would escape or
    /// garble the layout (empty, `.`, `..`, embedded separators) are
    /// rejected as [`InvalidKey`](StrataError::InvalidKey).
    fn key_path(&self, key: &str, prepare: bool) -> Result<PathBuf> {
        let segments = self.mangler.encode(key);
        if segments.is_empty() {
            return Err(StrataError::InvalidKey);
        }
        let mut path = self.base_dir.clone();
        for segment in &segments {
            if segment.is_empty()
                || segment == "."
                || segment == ".."
                || segment.contains(std::path::MAIN_SEPARATOR)
            {
                return Err(StrataError::InvalidKey);
            }
            path.push(segment);
        }
        if prepare && segments.len() > 1 {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| {
                    StrataError::Storage(format!("error creating key directories: {e}"))
                })?;
            }
        }
        Ok(path)
    }

    /// Depth-first walk accumulating decodable keys
    fn collect_keys(&self, dir: &Path, segments: &mut Vec<String>, keys: &mut Vec<String>) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(_) => return,
        };
        for entry in entries.flatten() {
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(_) => {
                    debug!(path = %entry.path().display(), "skipping non-UTF-8 entry");
                    continue;
                }
            };
            let path = entry.path();
            segments.push(name);
            if path.is_dir() {
                self.collect_keys(&path, segments, keys);
            } else {
                let refs: Vec<&str> = segments.iter().map(String::as_str).collect();
                match self.mangler.decode(&refs) {
                    Ok(key) => keys.push(key),
                    Err(_) => debug!(path = %path.display(), "skipping undecodable entry"),
                }
            }
            segments.pop();
        }
    }
}

impl Store for FileStore {
    fn get(&self, key: &str, dest: &mut dyn Write) -> Result<()> {
        FileStore::get(self, key, dest)
    }

    fn set(&self, key: &str, src: &mut dyn Read) -> Result<()> {
        FileStore::set(self, key, src)
    }

    fn remove(&self, key: &str) -> Result<()> {
        FileStore::remove(self, key)
    }

    fn rename(&self, old_key: &str, new_key: &str) -> Result<()> {
        FileStore::rename(self, old_key, new_key)
    }

    fn keys(&self) -> Vec<String> {
        FileStore::keys(self)
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`FileStore`]
pub struct FileStoreBuilder {
    base_dir: PathBuf,
    staging_dir: Option<PathBuf>,
    mangler: Option<Box<dyn Mangler>>,
}

impl FileStoreBuilder {
    /// Enable staged atomic writes, committing values into place with a
    /// rename out of `dir`.
    ///
    /// The directory should live on the same filesystem as the base
    /// directory so the commit rename stays atomic. Without this, `set`
    /// writes directly in place and accepts the crash-window risk.
    pub fn staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    /// Use a custom key mangler (defaults to [`Base64Mangler`])
    pub fn mangler(mut self, mangler: impl Mangler + 'static) -> Self {
        self.mangler = Some(Box::new(mangler));
        self
    }

    /// Create the directories and open the store.
    ///
    /// The base and staging directories are created if absent and
    /// reused otherwise.
    pub fn open(self) -> Result<FileStore> {
        fs::create_dir_all(&self.base_dir)
            .map_err(|e| StrataError::Storage(format!("error creating data dir: {e}")))?;
        if let Some(staging) = &self.staging_dir {
            fs::create_dir_all(staging)
                .map_err(|e| StrataError::Storage(format!("error creating staging dir: {e}")))?;
        }
        Ok(FileStore {
            base_dir: self.base_dir,
            staging_dir: self.staging_dir,
            mangler: self.mangler.unwrap_or_else(|| Box::new(Base64Mangler)),
        })
    }
}
