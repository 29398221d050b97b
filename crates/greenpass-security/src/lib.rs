// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// greenpass-security — On-device persistence and fingerprinting.
//
// Holds the key-value stores the pass is persisted in (SQLite on device,
// in-memory for tests) and the SHA-256 fingerprint used to identify imported
// documents in logs without recording their content.

pub mod integrity;
pub mod storage;

pub use integrity::hash_bytes;
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
