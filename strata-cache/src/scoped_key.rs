//! Namespace-scoped cache keys.
//!
//! The key insight is that [`ScopedKey`]'s constructor makes un-prefixed
//! store access unrepresentable: you cannot produce a physical key without
//! naming the namespace it belongs to. Instances that share a physical store
//! therefore cannot collide, and bulk invalidation can scan by prefix knowing
//! every key it matches belongs to exactly one instance.

use strata_core::{CacheError, CacheResult};

/// A physical cache key, namespaced to one cache instance.
///
/// # Format
///
/// The physical key is simply `prefix + logical_key`. Prefixes end with an
/// underscore by convention (`profile_`, `posts_`, ...) which keeps them
/// disjoint: no instance prefix is a prefix of another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopedKey {
    full: String,
    prefix_len: usize,
}

impl ScopedKey {
    /// Create a key scoped to the given namespace prefix.
    ///
    /// This is the ONLY way to construct a `ScopedKey`; every store access
    /// goes through it, so namespacing cannot be forgotten.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidKey`] if the logical key is empty - an
    /// empty logical key would make the bare prefix a physical key and break
    /// prefix-scoped invalidation.
    pub fn new(prefix: &str, logical: &str) -> CacheResult<Self> {
        if logical.is_empty() {
            return Err(CacheError::InvalidKey);
        }
        let mut full = String::with_capacity(prefix.len() + logical.len());
        full.push_str(prefix);
        full.push_str(logical);
        Ok(Self {
            full,
            prefix_len: prefix.len(),
        })
    }

    /// The physical key as stored in any backend.
    pub fn full(&self) -> &str {
        &self.full
    }

    /// The caller-supplied logical key, without the namespace prefix.
    pub fn logical(&self) -> &str {
        &self.full[self.prefix_len..]
    }

    /// The namespace prefix this key is scoped to.
    pub fn prefix(&self) -> &str {
        &self.full[..self.prefix_len]
    }

    /// Whether a physical key read back from a store belongs to `prefix`.
    ///
    /// Used by prefix scans; kept next to the key type so the matching rule
    /// and the construction rule cannot drift apart.
    pub fn belongs_to(full_key: &str, prefix: &str) -> bool {
        full_key.starts_with(prefix)
    }
}

impl std::fmt::Display for ScopedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_getters() {
        let key = ScopedKey::new("profile_", "user:42").expect("key should build");

        assert_eq!(key.full(), "profile_user:42");
        assert_eq!(key.logical(), "user:42");
        assert_eq!(key.prefix(), "profile_");
    }

    #[test]
    fn test_empty_logical_key_rejected() {
        assert_eq!(
            ScopedKey::new("profile_", "").unwrap_err(),
            CacheError::InvalidKey
        );
    }

    #[test]
    fn test_different_prefixes_different_physical_keys() {
        let a = ScopedKey::new("profile_", "k").expect("key should build");
        let b = ScopedKey::new("posts_", "k").expect("key should build");

        assert_ne!(a.full(), b.full());
    }

    #[test]
    fn test_belongs_to() {
        let key = ScopedKey::new("search_", "rust jobs").expect("key should build");

        assert!(ScopedKey::belongs_to(key.full(), "search_"));
        assert!(!ScopedKey::belongs_to(key.full(), "jobs_"));
    }
}
