//! # StrataKV
//!
//! A pluggable key-value storage library with three interchangeable
//! backends:
//! - In-memory map behind a reader/writer lock
//! - Filesystem-backed store with atomic staged writes
//! - Two-tier cache composing the two
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Store trait                             │
//! │              (get / set / remove / rename / keys)            │
//! └─────────┬──────────────────┬──────────────────┬─────────────┘
//!           │                  │                  │
//!           ▼                  ▼                  ▼
//!    ┌─────────────┐   ┌──────────────┐   ┌──────────────────┐
//!    │  MemStore   │   │  FileStore   │   │ FileBackedMem-   │
//!    │  (RwLock +  │   │ (mangled     │   │ Store            │
//!    │   HashMap)  │   │  paths, temp │   │  cache: MemStore │
//!    └─────────────┘   │  + rename)   │   │  truth: File-    │
//!                      └──────────────┘   │  Store           │
//!                                         └──────────────────┘
//! ```
//!
//! The two-tier store reads through its cache and writes through to
//! disk first; the durable tier is always authoritative. Keys are
//! arbitrary strings — a [`Mangler`] maps them reversibly onto
//! filesystem-safe paths, URL-safe base64 by default.
//!
//! ```no_run
//! use stratakv::{FileBackedMemStore, Store};
//!
//! fn main() -> stratakv::Result<()> {
//!     let store = FileBackedMemStore::builder("./data")
//!         .staging_dir("./data-staging")
//!         .open()
//!         .map(FileBackedMemStore::from_file_store)?;
//!
//!     store.set("greeting", &mut "Hello, World!".as_bytes())?;
//!
//!     let mut out = Vec::new();
//!     store.get("greeting", &mut out)?; // served from cache from now on
//!     assert_eq!(out, b"Hello, World!");
//!     Ok(())
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;

pub mod codec;
pub mod filememstore;
pub mod filestore;
pub mod mangle;
pub mod memstore;
pub mod store;
pub mod types;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, StrataError};
pub use filememstore::FileBackedMemStore;
pub use filestore::{FileStore, FileStoreBuilder};
pub use mangle::{Base64Mangler, Mangler, PassthroughMangler};
pub use memstore::MemStore;
pub use store::Store;
pub use types::StoredValue;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of StrataKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
