//! Benchmarks for StrataKV store operations

use criterion::{criterion_group, criterion_main, Criterion};
use stratakv::{FileBackedMemStore, FileStore, MemStore};

const VALUE_SIZE: usize = 4 * 1024;

fn store_benchmarks(c: &mut Criterion) {
    let payload = vec![0x5a_u8; VALUE_SIZE];

    // -------------------------------------------------------------------------
    // MemStore
    // -------------------------------------------------------------------------
    let mem = MemStore::new();
    c.bench_function("memstore_set_4k", |b| {
        b.iter(|| mem.set("bench", &mut payload.as_slice()).unwrap())
    });
    c.bench_function("memstore_get_4k", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(VALUE_SIZE);
            mem.get("bench", &mut out).unwrap();
            out
        })
    });

    // -------------------------------------------------------------------------
    // FileStore: direct vs staged writes
    // -------------------------------------------------------------------------
    let dir = tempfile::tempdir().unwrap();
    let staging = tempfile::tempdir().unwrap();

    let direct = FileStore::open(dir.path().join("direct")).unwrap();
    c.bench_function("filestore_set_4k_direct", |b| {
        b.iter(|| direct.set("bench", &mut payload.as_slice()).unwrap())
    });

    let staged = FileStore::builder(dir.path().join("staged"))
        .staging_dir(staging.path())
        .open()
        .unwrap();
    c.bench_function("filestore_set_4k_staged", |b| {
        b.iter(|| staged.set("bench", &mut payload.as_slice()).unwrap())
    });
    c.bench_function("filestore_get_4k", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(VALUE_SIZE);
            staged.get("bench", &mut out).unwrap();
            out
        })
    });

    // -------------------------------------------------------------------------
    // FileBackedMemStore: warm-cache reads
    // -------------------------------------------------------------------------
    let tiered = FileBackedMemStore::open(dir.path().join("tiered")).unwrap();
    tiered.set("bench", &mut payload.as_slice()).unwrap();
    c.bench_function("filememstore_get_4k_cached", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(VALUE_SIZE);
            tiered.get("bench", &mut out).unwrap();
            out
        })
    });
}

criterion_group!(benches, store_benchmarks);
criterion_main!(benches);
