//! Strata Cache - tiered, TTL-aware caching between application logic and
//! two tiers of storage.
//!
//! # Design
//!
//! Every cache instance wraps a fast in-process map plus, optionally, one
//! persistent key/value store. Reads check the in-process tier first and fall
//! through to the persistent tier, promoting valid entries back into the map;
//! writes land in both tiers in the same call, with the in-process write
//! authoritative and the persistent write best-effort.
//!
//! # Namespace Isolation
//!
//! The [`ScopedKey`] type ensures that a physical key CANNOT be constructed
//! without a namespace prefix, so independently configured instances can
//! multiplex one physical store and still never observe each other's entries.
//!
//! # Example
//!
//! ```ignore
//! let registry = CacheRegistry::open("/var/lib/app/cache")?;
//!
//! registry.profile().set("user:42", &profile)?;
//! let cached: Option<Profile> = registry.profile().get("user:42")?;
//!
//! // Logout wipes every instance, each scoped to its own prefix.
//! registry.clear_everything();
//! ```

pub mod lmdb_store;
pub mod manager;
pub mod registry;
pub mod scoped_key;
pub mod session_store;
pub mod traits;

pub use lmdb_store::LmdbStore;
pub use manager::{CacheManager, CacheManagerConfig};
pub use registry::{BackendKind, CacheRegistry, InstanceConfig, INSTANCES};
pub use scoped_key::ScopedKey;
pub use session_store::SessionStore;
pub use traits::PersistentStore;

pub use strata_core::{CacheEntry, CacheError, CacheResult, CacheStats, Clock, StoreError};
