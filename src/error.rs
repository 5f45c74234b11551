//! Error types for StrataKV
//!
//! Provides a unified error type for all store operations.

use thiserror::Error;

/// Result type alias using StrataError
pub type Result<T> = std::result::Result<T, StrataError>;

/// Unified error type for StrataKV operations
#[derive(Debug, Error)]
pub enum StrataError {
    // -------------------------------------------------------------------------
    // Key Errors (expected, recoverable by the caller)
    // -------------------------------------------------------------------------
    #[error("key not found")]
    UnknownKey,

    #[error("key already exists")]
    KeyExists,

    #[error("invalid key")]
    InvalidKey,

    // -------------------------------------------------------------------------
    // Storage Errors (environment problems)
    // -------------------------------------------------------------------------
    #[error("storage error: {0}")]
    Storage(String),

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("unexpected end of stream")]
    CorruptStream,

    // -------------------------------------------------------------------------
    // I/O Errors (propagated from caller-supplied sources/destinations)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StrataError {
    /// True for the "key absent" outcome, which callers routinely branch on
    pub fn is_unknown_key(&self) -> bool {
        matches!(self, StrataError::UnknownKey)
    }
}
