// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pass store — binds the held pass to one fixed key of a key-value store.

use std::sync::Arc;

use greenpass_core::ValidatedPayload;
use greenpass_core::error::Result;
use greenpass_security::KeyValueStore;
use tracing::debug;

/// The single persisted pass.
///
/// Only the payload text is stored; it is re-validated when loaded.
#[derive(Clone)]
pub struct PassStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl PassStore {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Raw stored text, if any.
    pub fn load(&self) -> Result<Option<String>> {
        self.store.get(&self.key)
    }

    /// Overwrite the stored pass.
    pub fn save(&self, payload: &ValidatedPayload) -> Result<()> {
        self.store.set(&self.key, payload.as_str())?;
        debug!(key = %self.key, payload_len = payload.as_str().len(), "pass persisted");
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.store.clear(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenpass_core::PayloadSource;
    use greenpass_security::MemoryStore;

    #[test]
    fn save_load_clear_use_the_bound_key() {
        let backing = Arc::new(MemoryStore::new());
        let store = PassStore::new(backing.clone(), "@qr");
        let payload = ValidatedPayload::accept("HC1:ABC", PayloadSource::Camera).expect("valid");

        store.save(&payload).expect("save");
        assert_eq!(backing.get("@qr").expect("get").as_deref(), Some("HC1:ABC"));
        assert_eq!(store.load().expect("load").as_deref(), Some("HC1:ABC"));

        store.clear().expect("clear");
        assert_eq!(store.load().expect("load"), None);
    }
}
