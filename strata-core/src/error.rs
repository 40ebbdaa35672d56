//! Error types for Strata cache operations.
//!
//! The cache is an optimization layer: environmental failures (an unreadable
//! store, bytes that no longer decode) are recovered inside the cache and
//! degrade to a miss or an in-process-only write. The only error a caller
//! should ever observe is [`CacheError::InvalidKey`], which indicates misuse
//! rather than a failure of the environment.

use thiserror::Error;

/// Result alias used throughout the cache.
pub type CacheResult<T> = Result<T, CacheError>;

/// Persistent store errors.
///
/// Raised by `PersistentStore` implementations and always handled inside the
/// cache manager; they never propagate to domain code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Write rejected: {reason}")]
    WriteRejected { reason: String },

    #[error("Corrupt data under key {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Cache layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    /// The caller supplied an empty logical key. This is a programming error
    /// by the caller and the one condition that legitimately propagates.
    #[error("Invalid cache key: logical key must be non-empty")]
    InvalidKey,

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("Deserialization failed: {reason}")]
    Deserialization { reason: String },
}

impl CacheError {
    /// Whether this error indicates caller misuse (as opposed to an
    /// environmental failure the cache absorbs).
    pub fn is_caller_error(&self) -> bool {
        matches!(self, CacheError::InvalidKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_converts_to_cache_error() {
        let err: CacheError = StoreError::Unavailable {
            reason: "quota exceeded".to_string(),
        }
        .into();
        assert!(!err.is_caller_error());
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn test_invalid_key_is_caller_error() {
        assert!(CacheError::InvalidKey.is_caller_error());
    }
}
