//! Session-scoped persistent store.
//!
//! Backs the instances whose contents are cheap to lose (search results,
//! notifications): entries live exactly as long as the process, the Rust
//! analogue of a storage area that vanishes when the user's session ends.
//!
//! The store is cheaply cloneable; clones share the same underlying map, so
//! several cache instances can multiplex one physical session store the same
//! way they multiplex one durable store.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use strata_core::StoreError;

use crate::scoped_key::ScopedKey;
use crate::traits::PersistentStore;

type SharedMap = Arc<RwLock<HashMap<String, Vec<u8>>>>;

/// In-process key/value store with process lifetime.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: SharedMap,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of physical keys currently stored, across all instances
    /// sharing this store.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Vec<u8>>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Vec<u8>>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl PersistentStore for SessionStore {
    fn read_raw(&self, full_key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.read().get(full_key).cloned())
    }

    fn write_raw(&self, full_key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.write().insert(full_key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn remove_raw(&self, full_key: &str) -> Result<(), StoreError> {
        self.write().remove(full_key);
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .read()
            .keys()
            .filter(|k| ScopedKey::belongs_to(k, prefix))
            .cloned()
            .collect())
    }
}
