//! The unit of cached data.
//!
//! A [`CacheEntry`] pairs an opaque payload with the timestamp it was created
//! at and an optional time-to-live. Entries are immutable after construction:
//! "updating" a cached value always means constructing a new entry and
//! replacing the old one under the same key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A cached payload plus the metadata needed to decide staleness.
///
/// The cache never interprets `T`; it only needs it to cross the
/// serialization boundary when an entry moves to or from a persistent tier.
/// The persisted representation is the JSON encoding of the whole entry, so
/// `created_at` and `ttl` travel with the payload and both tiers apply the
/// same expiration rule to the same timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The application payload. Opaque to the cache.
    pub data: T,
    /// When this entry was constructed. Never mutated.
    pub created_at: DateTime<Utc>,
    /// Maximum age before the entry is treated as a miss. `None` means the
    /// entry never expires by time.
    pub ttl: Option<Duration>,
}

impl<T> CacheEntry<T> {
    /// Create an entry stamped with the given creation time.
    pub fn new(data: T, created_at: DateTime<Utc>, ttl: Option<Duration>) -> Self {
        Self {
            data,
            created_at,
            ttl,
        }
    }

    /// The single source of truth for staleness.
    ///
    /// Returns `false` for entries without a TTL; otherwise true exactly when
    /// `now - created_at > ttl`. Applied identically whether the entry came
    /// from the in-process map or a persistent store - trusting the
    /// in-process copy longer than the persisted copy is the bug class this
    /// guards against.
    ///
    /// A TTL of zero expires as soon as any time has elapsed, which makes
    /// `set` with zero TTL a write-then-miss (useful for force-invalidating
    /// a key by overwrite).
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let Some(ttl) = self.ttl else {
            return false;
        };
        let age = now.signed_duration_since(self.created_at);
        match age.to_std() {
            Ok(age) => age > ttl,
            // created_at in the future (clock skew): not expired.
            Err(_) => false,
        }
    }

}
