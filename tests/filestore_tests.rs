//! FileStore Tests
//!
//! Contract conformance in both write modes, key mangling on disk,
//! foreign-data handling, and persistence across re-open.

mod common;

use std::fs;

use stratakv::{Base64Mangler, FileStore, Mangler, PassthroughMangler, StrataError};

// =============================================================================
// Contract Conformance
// =============================================================================

#[test]
fn test_filestore_conformance_direct_writes() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    common::exercise_store(&store);
}

#[test]
fn test_filestore_conformance_staged_writes() {
    let dir = tempfile::tempdir().unwrap();
    let staging = tempfile::tempdir().unwrap();
    let store = FileStore::builder(dir.path())
        .staging_dir(staging.path())
        .open()
        .unwrap();
    common::exercise_store(&store);

    // A completed run leaves nothing behind in the staging directory
    assert_eq!(fs::read_dir(staging.path()).unwrap().count(), 0);
}

// =============================================================================
// On-disk Layout
// =============================================================================

#[test]
fn test_keys_are_base64_mangled_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    store.set("key1", &mut b"v".as_slice()).unwrap();

    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec!["a2V5MQ=="]);
}

#[test]
fn test_file_contents_are_raw_payload() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    store.set("key1", &mut b"raw bytes, no framing".as_slice()).unwrap();

    let path = dir.path().join(Base64Mangler.encode("key1").remove(0));
    assert_eq!(fs::read(path).unwrap(), b"raw bytes, no framing");
}

#[test]
fn test_hostile_keys_become_single_safe_components() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();

    let keys = ["with/separator", "../../escape", "trailing.", "nul\0byte"];
    for key in keys {
        store.set(key, &mut key.as_bytes()).unwrap();
    }

    // Everything landed flat in the base directory, nothing escaped
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), keys.len());

    let mut listed = store.keys();
    listed.sort_unstable();
    let mut expected: Vec<&str> = keys.to_vec();
    expected.sort_unstable();
    assert_eq!(listed, expected);

    for key in keys {
        let mut buf = Vec::new();
        store.get(key, &mut buf).unwrap();
        assert_eq!(buf, key.as_bytes());
    }
}

#[test]
fn test_empty_key_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    assert!(matches!(
        store.set("", &mut b"v".as_slice()),
        Err(StrataError::InvalidKey)
    ));
    assert!(matches!(
        store.get("", &mut Vec::new()),
        Err(StrataError::InvalidKey)
    ));
}

#[test]
fn test_passthrough_mangler_builds_directory_tree() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::builder(dir.path())
        .mangler(PassthroughMangler)
        .open()
        .unwrap();

    store.set("users/42/profile", &mut b"p".as_slice()).unwrap();
    assert!(dir.path().join("users").join("42").join("profile").is_file());
    assert_eq!(store.keys(), vec!["users/42/profile"]);

    let mut buf = Vec::new();
    store.get("users/42/profile", &mut buf).unwrap();
    assert_eq!(buf, b"p");
}

#[test]
fn test_passthrough_mangler_rejects_traversal() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::builder(dir.path())
        .mangler(PassthroughMangler)
        .open()
        .unwrap();

    assert!(matches!(
        store.set("../outside", &mut b"v".as_slice()),
        Err(StrataError::InvalidKey)
    ));
    assert!(matches!(
        store.set("a//b", &mut b"v".as_slice()),
        Err(StrataError::InvalidKey)
    ));
}

// =============================================================================
// Enumeration
// =============================================================================

#[test]
fn test_keys_skips_foreign_entries() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    store.set("key1", &mut b"v".as_slice()).unwrap();

    // A file nobody mangled — must be silently excluded
    fs::write(dir.path().join("not base64!.tmp"), b"junk").unwrap();

    assert_eq!(store.keys(), vec!["key1"]);
}

#[test]
fn test_keys_sorted_lexicographically() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    for key in ["zebra", "apple", "mango", "banana"] {
        store.set(key, &mut b"v".as_slice()).unwrap();
    }
    assert_eq!(store.keys(), vec!["apple", "banana", "mango", "zebra"]);
}

// =============================================================================
// Rename
// =============================================================================

#[test]
fn test_rename_overwrites_existing_target() {
    // Documented: durable-store rename follows POSIX rename(2) and
    // replaces an occupied target
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    store.set("old", &mut b"from-old".as_slice()).unwrap();
    store.set("new", &mut b"from-new".as_slice()).unwrap();

    store.rename("old", "new").unwrap();

    assert_eq!(store.keys(), vec!["new"]);
    let mut buf = Vec::new();
    store.get("new", &mut buf).unwrap();
    assert_eq!(buf, b"from-old");
}

// =============================================================================
// Probes
// =============================================================================

#[test]
fn test_exists_and_stat() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();

    assert!(!store.exists("k"));
    assert!(matches!(store.stat("k"), Err(StrataError::UnknownKey)));

    store.set("k", &mut b"12345".as_slice()).unwrap();
    assert!(store.exists("k"));
    assert_eq!(store.stat("k").unwrap().len(), 5);
}

// =============================================================================
// Durability
// =============================================================================

#[test]
fn test_values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = FileStore::open(dir.path()).unwrap();
        store.set("persistent", &mut b"still here".as_slice()).unwrap();
    }

    let reopened = FileStore::open(dir.path()).unwrap();
    assert_eq!(reopened.keys(), vec!["persistent"]);
    let mut buf = Vec::new();
    reopened.get("persistent", &mut buf).unwrap();
    assert_eq!(buf, b"still here");
}

#[test]
fn test_base_dir_created_if_absent() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let store = FileStore::open(&nested).unwrap();
    store.set("k", &mut b"v".as_slice()).unwrap();
    assert!(nested.is_dir());
}
