//! Persistent store trait for pluggable cache tiers.

use strata_core::StoreError;

/// Byte-level key/value store backing a cache instance's persistent tier.
///
/// This trait abstracts over where serialized entries live: a session-scoped
/// in-process store, a durable LMDB store, or a test double. Implementations
/// are responsible only for raw byte storage; serialization, expiration, and
/// namespacing are the cache manager's job.
///
/// # Lifetime Scope
///
/// Implementations differ in how long their contents survive: a session
/// store vanishes with the process, a durable store survives restarts. The
/// cache manager treats both identically.
///
/// # Sharing
///
/// One physical store may be multiplexed by several cache instances. The
/// store itself enforces nothing about that: logical isolation comes entirely
/// from the prefixed keys the manager hands in, and `keys_with_prefix` is the
/// only enumeration the manager ever performs (bulk invalidation).
pub trait PersistentStore: Send + Sync {
    /// Read the serialized entry under a physical key, if present.
    fn read_raw(&self, full_key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write a serialized entry under a physical key, replacing any previous
    /// value. A rejected write (quota, disabled store) surfaces as an error;
    /// the manager logs it and carries on with the in-process tier.
    fn write_raw(&self, full_key: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Remove a physical key. Removing a missing key is not an error.
    fn remove_raw(&self, full_key: &str) -> Result<(), StoreError>;

    /// Enumerate every physical key starting with `prefix`.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}
