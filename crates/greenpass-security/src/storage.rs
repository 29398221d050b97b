// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Key-value storage — the persistent store the held pass survives restarts in.
//
// Schema:
//   kv(
//     key        TEXT PRIMARY KEY,
//     value      TEXT NOT NULL,
//     updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
//   )

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use greenpass_core::error::GreenpassError;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, instrument};

// ---------------------------------------------------------------------------
// Local error helpers
// ---------------------------------------------------------------------------

/// Convert a `rusqlite::Error` into a `GreenpassError::Database`.
fn db_err(e: rusqlite::Error) -> GreenpassError {
    GreenpassError::Database(e.to_string())
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);";

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// String-keyed persistent storage.
///
/// Implementations must be shareable with background tasks.
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, GreenpassError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), GreenpassError>;

    /// Remove `key`. Clearing an absent key is not an error.
    fn clear(&self, key: &str) -> Result<(), GreenpassError>;
}

// ---------------------------------------------------------------------------
// SQLite
// ---------------------------------------------------------------------------

/// Key-value store backed by a SQLite database file.
pub struct SqliteStore {
    // rusqlite connections are Send but not Sync.
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store at `path`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GreenpassError> {
        let conn = Connection::open(path).map_err(db_err)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(db_err)?;
        conn.execute_batch(SCHEMA).map_err(db_err)?;

        debug!("key-value store opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory store (useful for tests).
    pub fn open_in_memory() -> Result<Self, GreenpassError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        conn.execute_batch(SCHEMA).map_err(db_err)?;

        debug!("in-memory key-value store opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, GreenpassError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| GreenpassError::Database("store lock poisoned".into()))?;
        f(&conn).map_err(db_err)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, GreenpassError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
        })
    }

    #[instrument(skip(self, value), fields(%key, value_len = value.len()))]
    fn set(&self, key: &str, value: &str) -> Result<(), GreenpassError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                updated_at = excluded.updated_at",
                params![key, value],
            )
        })?;
        debug!("value stored");
        Ok(())
    }

    #[instrument(skip(self), fields(%key))]
    fn clear(&self, key: &str) -> Result<(), GreenpassError> {
        let removed =
            self.with_conn(|conn| conn.execute("DELETE FROM kv WHERE key = ?1", params![key]))?;
        debug!(removed, "value cleared");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Volatile key-value store for tests and platforms without a data directory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, GreenpassError> {
        self.values
            .lock()
            .map_err(|_| GreenpassError::Database("store lock poisoned".into()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, GreenpassError> {
        Ok(self.values()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), GreenpassError> {
        self.values()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), GreenpassError> {
        self.values()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &dyn KeyValueStore) {
        assert_eq!(store.get("@qr").expect("get"), None);

        store.set("@qr", "HC1:FIRST").expect("set");
        assert_eq!(store.get("@qr").expect("get").as_deref(), Some("HC1:FIRST"));

        store.set("@qr", "HC1:SECOND").expect("overwrite");
        assert_eq!(store.get("@qr").expect("get").as_deref(), Some("HC1:SECOND"));

        store.clear("@qr").expect("clear");
        assert_eq!(store.get("@qr").expect("get"), None);

        // Clearing twice is fine.
        store.clear("@qr").expect("clear again");
    }

    #[test]
    fn sqlite_in_memory_semantics() {
        exercise(&SqliteStore::open_in_memory().expect("open"));
    }

    #[test]
    fn memory_store_semantics() {
        exercise(&MemoryStore::new());
    }

    #[test]
    fn keys_are_independent() {
        let store = SqliteStore::open_in_memory().expect("open");
        store.set("a", "1").expect("set a");
        store.set("b", "2").expect("set b");
        store.clear("a").expect("clear a");
        assert_eq!(store.get("a").expect("get a"), None);
        assert_eq!(store.get("b").expect("get b").as_deref(), Some("2"));
    }

    #[test]
    fn sqlite_value_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("greenpass.db");

        {
            let store = SqliteStore::open(&path).expect("open");
            store.set("@qr", "HC1:PERSISTED").expect("set");
        }

        let reopened = SqliteStore::open(&path).expect("reopen");
        assert_eq!(
            reopened.get("@qr").expect("get").as_deref(),
            Some("HC1:PERSISTED")
        );
    }
}
