// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for document fingerprinting and pass persistence in
// the greenpass-security crate.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use greenpass_security::{KeyValueStore, SqliteStore, hash_bytes};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Benchmark SHA-256 fingerprinting at typical certificate PDF sizes.
fn bench_integrity_hash(c: &mut Criterion) {
    let sizes: &[(&str, usize)] = &[
        ("10 KiB", 10 * 1024),
        ("100 KiB", 100 * 1024),
        ("1 MiB", 1024 * 1024),
    ];

    let mut group = c.benchmark_group("integrity_hash_sha256");
    for &(label, size) in sizes {
        let data = vec![0xABu8; size];
        group.bench_function(label, |b| {
            b.iter(|| {
                let hex = hash_bytes(black_box(&data));
                black_box(hex);
            });
        });
    }
    group.finish();
}

/// Benchmark overwriting the held pass in an in-memory SQLite store.
fn bench_store_set(c: &mut Criterion) {
    c.bench_function("store_set (in-memory SQLite)", |b| {
        let store = SqliteStore::open_in_memory().expect("open in-memory store");
        let payload = format!("HC1:{}", "A".repeat(600));

        b.iter(|| {
            store
                .set(black_box("@qr"), black_box(&payload))
                .expect("set failed");
        });
    });
}

criterion_group!(benches, bench_integrity_hash, bench_store_set);
criterion_main!(benches);
