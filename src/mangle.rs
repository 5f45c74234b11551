//! Key mangling
//!
//! Bidirectional mapping between a logical key and the path segments
//! that represent it on disk. Manglers must be injective:
//! `decode(encode(key)) == Ok(key)` for every key.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;

use crate::error::{Result, StrataError};

/// Converts keys to filesystem path segments and back.
///
/// `encode` returns the ordered path segments for a key; a one-element
/// result maps the key to a single file in the store's base directory,
/// more elements build a directory tree. `decode` reverses the mapping
/// and fails with [`InvalidKey`](StrataError::InvalidKey) when the
/// segments cannot represent a key under this scheme.
pub trait Mangler: Send + Sync {
    /// Encode a key into one or more path segments
    fn encode(&self, key: &str) -> Vec<String>;

    /// Decode path segments back into the original key
    fn decode(&self, segments: &[&str]) -> Result<String>;
}

// =============================================================================
// Base64Mangler (default)
// =============================================================================

/// The default mangler: the whole key becomes exactly one URL-safe
/// base64 path segment.
///
/// Any key is safe as a filename under this scheme — path separators,
/// `..` sequences and control characters all disappear into the
/// encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Mangler;

impl Mangler for Base64Mangler {
    fn encode(&self, key: &str) -> Vec<String> {
        vec![URL_SAFE.encode(key.as_bytes())]
    }

    fn decode(&self, segments: &[&str]) -> Result<String> {
        // Single-segment scheme: anything else is foreign data
        let [segment] = segments else {
            return Err(StrataError::InvalidKey);
        };
        let raw = URL_SAFE
            .decode(segment.as_bytes())
            .map_err(|_| StrataError::InvalidKey)?;
        String::from_utf8(raw).map_err(|_| StrataError::InvalidKey)
    }
}

// =============================================================================
// PassthroughMangler
// =============================================================================

/// A mangler that performs no encoding: the key is split on `/` into
/// path segments, giving human-readable layouts and directory trees.
///
/// Only use this when the key alphabet is known to be free of
/// filesystem special characters; nothing here guards against `..` or
/// empty segments.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughMangler;

impl Mangler for PassthroughMangler {
    fn encode(&self, key: &str) -> Vec<String> {
        key.split('/').map(str::to_owned).collect()
    }

    fn decode(&self, segments: &[&str]) -> Result<String> {
        Ok(segments.join("/"))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(mangler: &dyn Mangler, key: &str) {
        let segments = mangler.encode(key);
        let refs: Vec<&str> = segments.iter().map(String::as_str).collect();
        assert_eq!(mangler.decode(&refs).unwrap(), key);
    }

    #[test]
    fn test_base64_round_trip() {
        for key in ["", "key1", "with/slashes", "../../etc/passwd", "nul\0byte"] {
            round_trip(&Base64Mangler, key);
        }
    }

    #[test]
    fn test_base64_single_segment() {
        for key in ["plain", "a/b/c", ".."] {
            assert_eq!(Base64Mangler.encode(key).len(), 1);
        }
    }

    #[test]
    fn test_base64_decode_rejects_wrong_segment_count() {
        assert!(matches!(
            Base64Mangler.decode(&[]),
            Err(StrataError::InvalidKey)
        ));
        assert!(matches!(
            Base64Mangler.decode(&["a2V5", "a2V5"]),
            Err(StrataError::InvalidKey)
        ));
    }

    #[test]
    fn test_base64_decode_rejects_bad_encoding() {
        assert!(matches!(
            Base64Mangler.decode(&["not base64!"]),
            Err(StrataError::InvalidKey)
        ));
    }

    #[test]
    fn test_passthrough_builds_directory_tree() {
        assert_eq!(
            PassthroughMangler.encode("users/42/profile"),
            vec!["users", "42", "profile"]
        );
        round_trip(&PassthroughMangler, "users/42/profile");
    }
}
