//! Strata Core - value types for the tiered cache.
//!
//! Defines the cache entry, the expiration predicate, the clock abstraction,
//! and the error taxonomy shared by every cache tier. The orchestration layer
//! lives in `strata-cache`.

pub mod clock;
pub mod entry;
pub mod error;
pub mod stats;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use error::{CacheError, CacheResult, StoreError};
pub use stats::CacheStats;
