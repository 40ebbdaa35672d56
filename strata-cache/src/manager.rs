//! The cache manager: two-tier orchestration with TTL expiry.
//!
//! Reads check the in-process map first (fast path, no backend I/O) and fall
//! through to the configured persistent store, promoting valid entries back
//! into the map. Writes land in both tiers in the same call; the in-process
//! write is authoritative, the persistent write best-effort. Expired and
//! corrupt entries are deleted lazily, on the read that finds them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use strata_core::{CacheEntry, CacheResult, CacheStats, Clock, SystemClock};

use crate::scoped_key::ScopedKey;
use crate::traits::PersistentStore;

/// Per-instance configuration, fixed at construction.
#[derive(Debug, Clone)]
pub struct CacheManagerConfig {
    /// Namespace prefix prepended to every logical key.
    pub key_prefix: &'static str,
    /// TTL applied by [`CacheManager::set`] when the caller does not supply
    /// one.
    pub default_ttl: Duration,
}

/// Outcome of probing a single tier for a key.
///
/// `Stale` means the tier held something unusable (expired or undecodable)
/// which has already been deleted as a side effect of the probe; both `Stale`
/// and `Absent` read as a miss for that tier.
enum TierLookup {
    Hit(CacheEntry<Value>),
    Stale,
    Absent,
}

/// A single cache instance: one in-process map, one optional persistent
/// store, one namespace prefix, one default TTL.
///
/// The in-process map is privately owned - instances never share it, so
/// [`CacheManager::clear_all`] can wipe it wholesale. The persistent store
/// may be physically shared across instances; isolation there rests entirely
/// on [`ScopedKey`] prefixing.
pub struct CacheManager {
    config: CacheManagerConfig,
    memory: RwLock<HashMap<String, CacheEntry<Value>>>,
    backend: Option<Arc<dyn PersistentStore>>,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheManager {
    /// Create an instance with no persistent tier.
    pub fn in_process_only(config: CacheManagerConfig) -> Self {
        Self::build(config, None)
    }

    /// Create an instance backed by a persistent store.
    pub fn with_backend(config: CacheManagerConfig, backend: Arc<dyn PersistentStore>) -> Self {
        Self::build(config, Some(backend))
    }

    fn build(config: CacheManagerConfig, backend: Option<Arc<dyn PersistentStore>>) -> Self {
        Self {
            config,
            memory: RwLock::new(HashMap::new()),
            backend,
            clock: Arc::new(SystemClock),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Replace the clock. Test seam; production code keeps [`SystemClock`].
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &CacheManagerConfig {
        &self.config
    }

    /// Get a cached value.
    ///
    /// Semantically a read, but may mutate both tiers: stale or corrupt
    /// entries found along the way are deleted, and a valid persisted entry
    /// is promoted into the in-process map so the next read stays in memory.
    ///
    /// # Errors
    ///
    /// Only [`strata_core::CacheError::InvalidKey`]. Storage and decode
    /// failures degrade to `Ok(None)`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        let key = ScopedKey::new(self.config.key_prefix, key)?;
        let now = self.clock.now();

        if let TierLookup::Hit(entry) = self.memory_lookup(key.full(), now) {
            return match self.decode::<T>(key.full(), &entry) {
                Some(data) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(key = %key, "in-process cache hit");
                    Ok(Some(data))
                }
                // Undecodable under our own key: purge it from both tiers
                // rather than surface an error.
                None => {
                    self.evict_both_tiers(key.full());
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    Ok(None)
                }
            };
        }

        let Some(store) = self.backend.as_deref() else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Ok(None);
        };

        match self.backend_lookup(store, key.full(), now) {
            TierLookup::Hit(entry) => match self.decode::<T>(key.full(), &entry) {
                Some(data) => {
                    self.promote(key.full(), entry);
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(key = %key, "persistent tier hit, promoted");
                    Ok(Some(data))
                }
                None => {
                    self.evict_both_tiers(key.full());
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    Ok(None)
                }
            },
            TierLookup::Stale | TierLookup::Absent => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    /// Cache a value under the instance's default TTL.
    pub fn set<T: Serialize>(&self, key: &str, data: &T) -> CacheResult<()> {
        self.set_with_ttl(key, data, Some(self.config.default_ttl))
    }

    /// Cache a value with an explicit TTL. `None` never expires by time; a
    /// zero TTL expires as soon as any time has elapsed (write-then-miss,
    /// useful for force-invalidating by overwrite).
    ///
    /// The in-process write always succeeds; the persistent write happens in
    /// the same call but is best-effort - a rejected write is logged and the
    /// in-process tier stays authoritative for the rest of the process
    /// lifetime.
    pub fn set_with_ttl<T: Serialize>(
        &self,
        key: &str,
        data: &T,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let key = ScopedKey::new(self.config.key_prefix, key)?;

        let value = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(error) => {
                warn!(key = %key, %error, "payload does not serialize; skipping cache write");
                return Ok(());
            }
        };
        let entry = CacheEntry::new(value, self.clock.now(), ttl);

        self.memory_mut().insert(key.full().to_string(), entry.clone());

        if let Some(store) = self.backend.as_deref() {
            match serde_json::to_vec(&entry) {
                Ok(bytes) => {
                    if let Err(error) = store.write_raw(key.full(), &bytes) {
                        warn!(
                            key = %key, %error,
                            "persistent cache write failed; in-process tier remains authoritative"
                        );
                    }
                }
                Err(error) => {
                    warn!(key = %key, %error, "entry does not serialize; persistent tier skipped");
                }
            }
        }

        Ok(())
    }

    /// Remove a single key from both tiers. Idempotent.
    pub fn clear(&self, key: &str) -> CacheResult<()> {
        let key = ScopedKey::new(self.config.key_prefix, key)?;
        self.evict_both_tiers(key.full());
        Ok(())
    }

    /// Remove every key owned by this instance.
    ///
    /// The in-process map is wiped wholesale (it is never shared); the
    /// persistent store is scanned and only keys carrying this instance's
    /// prefix are removed, so co-resident instances are untouched.
    pub fn clear_all(&self) {
        self.memory_mut().clear();

        let Some(store) = self.backend.as_deref() else {
            return;
        };
        match store.keys_with_prefix(self.config.key_prefix) {
            Ok(keys) => {
                for full_key in keys {
                    if let Err(error) = store.remove_raw(&full_key) {
                        warn!(key = %full_key, %error, "failed to remove persisted entry");
                    }
                }
            }
            Err(error) => {
                warn!(prefix = self.config.key_prefix, %error, "prefix scan failed during clear_all");
            }
        }
    }

    /// Read-only snapshot of this instance. Never fails; an unreadable
    /// backend contributes zero bytes.
    pub fn stats(&self) -> CacheStats {
        let entry_count = self.memory_read().len() as u64;

        let mut approximate_bytes = 0u64;
        if let Some(store) = self.backend.as_deref() {
            if let Ok(keys) = store.keys_with_prefix(self.config.key_prefix) {
                for full_key in keys {
                    if let Ok(Some(bytes)) = store.read_raw(&full_key) {
                        approximate_bytes += bytes.len() as u64;
                    }
                }
            }
        }

        CacheStats {
            entry_count,
            approximate_bytes,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Read-through convenience: return the cached value, or compute it,
    /// cache it under the default TTL, and return it.
    pub fn get_or_insert_with<T, F>(&self, key: &str, f: F) -> CacheResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        if let Some(cached) = self.get(key)? {
            return Ok(cached);
        }
        let value = f();
        self.set(key, &value)?;
        Ok(value)
    }

    /// Proactively remove expired entries from both tiers.
    ///
    /// Expiry is otherwise lazy (entries are removed on the read that finds
    /// them stale); this is an explicit opt-in for hosts that want lower
    /// steady-state memory. Returns the number of removals across both
    /// tiers.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0usize;

        {
            let mut memory = self.memory_mut();
            let before = memory.len();
            memory.retain(|_, entry| !entry.is_expired(now));
            removed += before - memory.len();
        }

        let Some(store) = self.backend.as_deref() else {
            return removed;
        };
        match store.keys_with_prefix(self.config.key_prefix) {
            Ok(keys) => {
                for full_key in keys {
                    let stale = match store.read_raw(&full_key) {
                        Ok(Some(bytes)) => {
                            match serde_json::from_slice::<CacheEntry<Value>>(&bytes) {
                                Ok(entry) => entry.is_expired(now),
                                // Undecodable persisted bytes are swept too.
                                Err(_) => true,
                            }
                        }
                        Ok(None) => false,
                        Err(_) => false,
                    };
                    if stale && store.remove_raw(&full_key).is_ok() {
                        removed += 1;
                    }
                }
            }
            Err(error) => {
                warn!(prefix = self.config.key_prefix, %error, "prefix scan failed during sweep");
            }
        }

        removed
    }

    // ------------------------------------------------------------------
    // Tier probes
    // ------------------------------------------------------------------

    /// Probe the in-process map. Deletes an expired entry as a side effect.
    ///
    /// Reads are the common case, so the probe holds only the read lock;
    /// it upgrades to the write lock solely to delete an expired entry.
    fn memory_lookup(&self, full_key: &str, now: chrono::DateTime<chrono::Utc>) -> TierLookup {
        {
            let memory = self.memory_read();
            match memory.get(full_key) {
                Some(entry) if !entry.is_expired(now) => return TierLookup::Hit(entry.clone()),
                Some(_) => {}
                None => return TierLookup::Absent,
            }
        }

        // Expired: re-check under the write lock, since the entry may have
        // been replaced between the two locks.
        let mut memory = self.memory_mut();
        match memory.get(full_key) {
            Some(entry) if entry.is_expired(now) => {
                memory.remove(full_key);
                TierLookup::Stale
            }
            Some(entry) => TierLookup::Hit(entry.clone()),
            None => TierLookup::Absent,
        }
    }

    /// Probe the persistent store. Deletes expired or corrupt entries as a
    /// side effect; store failures degrade to a miss.
    fn backend_lookup(
        &self,
        store: &dyn PersistentStore,
        full_key: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> TierLookup {
        let bytes = match store.read_raw(full_key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return TierLookup::Absent,
            Err(error) => {
                warn!(key = full_key, %error, "persistent tier unreadable; treating as miss");
                return TierLookup::Absent;
            }
        };

        match serde_json::from_slice::<CacheEntry<Value>>(&bytes) {
            Ok(entry) if entry.is_expired(now) => {
                self.remove_persisted(store, full_key);
                TierLookup::Stale
            }
            Ok(entry) => TierLookup::Hit(entry),
            Err(error) => {
                warn!(key = full_key, %error, "corrupt persisted entry; removing");
                self.remove_persisted(store, full_key);
                TierLookup::Stale
            }
        }
    }

    /// Warm the in-process map with an entry found in the persistent tier.
    fn promote(&self, full_key: &str, entry: CacheEntry<Value>) {
        self.memory_mut().insert(full_key.to_string(), entry);
    }

    fn decode<T: DeserializeOwned>(&self, full_key: &str, entry: &CacheEntry<Value>) -> Option<T> {
        match serde_json::from_value(entry.data.clone()) {
            Ok(data) => Some(data),
            Err(error) => {
                warn!(key = full_key, %error, "cached payload does not decode; treating as miss");
                None
            }
        }
    }

    fn evict_both_tiers(&self, full_key: &str) {
        self.memory_mut().remove(full_key);
        if let Some(store) = self.backend.as_deref() {
            self.remove_persisted(store, full_key);
        }
    }

    fn remove_persisted(&self, store: &dyn PersistentStore, full_key: &str) {
        if let Err(error) = store.remove_raw(full_key) {
            warn!(key = full_key, %error, "failed to remove persisted entry");
        }
    }

    fn memory_read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, CacheEntry<Value>>> {
        self.memory.read().unwrap_or_else(|e| e.into_inner())
    }

    fn memory_mut(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, CacheEntry<Value>>> {
        self.memory.write().unwrap_or_else(|e| e.into_inner())
    }
}
