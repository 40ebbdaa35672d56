//! Cache usage statistics.

use serde::Serialize;

/// Read-only snapshot of a single cache instance.
///
/// `entry_count` reflects the in-process map; `approximate_bytes` sums the
/// serialized lengths of the instance's persisted entries. Taking a snapshot
/// never fails: an unreadable backend simply contributes zeros.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of entries currently in the in-process map.
    pub entry_count: u64,
    /// Approximate serialized size of this instance's persisted entries.
    pub approximate_bytes: u64,
    /// Number of reads answered from either tier.
    pub hits: u64,
    /// Number of reads that found nothing usable.
    pub misses: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);

        let empty = CacheStats::default();
        assert!((empty.hit_rate() - 0.0).abs() < 0.001);
    }
}
