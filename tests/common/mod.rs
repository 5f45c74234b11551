//! Shared conformance checks
//!
//! Every backend must pass the same basic contract; each backend's
//! test file runs this against its own construction.

use std::io;

use stratakv::{Store, StrataError};

/// Exercise the store contract: miss behavior, round-trips, sorted
/// enumeration, rename of a live key.
pub fn exercise_store(store: &dyn Store) {
    let test_data = b"Hello, World!";

    // Miss contract: get and remove on a key never set
    let mut buf = Vec::new();
    assert!(matches!(
        store.get("none", &mut buf),
        Err(StrataError::UnknownKey)
    ));
    assert!(buf.is_empty(), "destination modified on miss");
    assert!(store.remove("none").unwrap_err().is_unknown_key());

    // Empty payload round-trip
    store.set("key1", &mut io::empty()).unwrap();
    assert_eq!(store.keys(), vec!["key1"]);
    store.get("key1", &mut buf).unwrap();
    assert!(buf.is_empty(), "expected empty value for key1");

    // Non-empty payload round-trip, sorted enumeration
    store.set("key2", &mut test_data.as_slice()).unwrap();
    assert_eq!(store.keys(), vec!["key1", "key2"]);
    store.get("key2", &mut buf).unwrap();
    assert_eq!(buf, test_data);

    // Removal
    store.remove("key2").unwrap();
    assert!(matches!(
        store.get("key2", &mut Vec::new()),
        Err(StrataError::UnknownKey)
    ));
    assert_eq!(store.keys(), vec!["key1"]);

    // Rename onto a free key
    store.rename("key1", "key3").unwrap();
    assert_eq!(store.keys(), vec!["key3"]);
    assert!(matches!(
        store.get("key1", &mut Vec::new()),
        Err(StrataError::UnknownKey)
    ));
    assert!(matches!(
        store.rename("key1", "key4"),
        Err(StrataError::UnknownKey)
    ));

    store.remove("key3").unwrap();
    assert!(store.keys().is_empty());
}
