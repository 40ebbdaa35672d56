//! The application's cache instances.
//!
//! Seven independently configured [`CacheManager`] values, one per data
//! domain, constructed once at startup and handed to whatever needs them.
//! They are explicit values rather than module-level globals so
//! initialization order and test wiring stay visible.
//!
//! The TTL/backend table encodes a freshness/cost trade-off: data that
//! changes rarely (companies, profiles) gets long TTLs and durable storage;
//! data that must track near-real-time state (notifications) gets a short
//! TTL and session-only storage so stale state never survives a session
//! boundary.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use strata_core::{CacheStats, StoreError};

use crate::lmdb_store::LmdbStore;
use crate::manager::{CacheManager, CacheManagerConfig};
use crate::session_store::SessionStore;
use crate::traits::PersistentStore;

/// Which persistent tier, if any, an instance writes through to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// No persistent tier; entries live only in the in-process map.
    InProcessOnly,
    /// Persistent within the process lifetime, lost on exit.
    Session,
    /// Survives process restarts.
    Durable,
}

/// One row of the instance configuration table.
#[derive(Debug, Clone, Copy)]
pub struct InstanceConfig {
    pub name: &'static str,
    pub prefix: &'static str,
    pub backend: BackendKind,
    pub default_ttl: Duration,
}

pub const PROFILE: InstanceConfig = InstanceConfig {
    name: "profile",
    prefix: "profile_",
    backend: BackendKind::Durable,
    default_ttl: Duration::from_secs(60 * 60),
};

pub const POSTS: InstanceConfig = InstanceConfig {
    name: "posts",
    prefix: "posts_",
    backend: BackendKind::Durable,
    default_ttl: Duration::from_secs(10 * 60),
};

pub const FOLLOW: InstanceConfig = InstanceConfig {
    name: "follow",
    prefix: "follow_",
    backend: BackendKind::Durable,
    default_ttl: Duration::from_secs(30 * 60),
};

pub const SEARCH: InstanceConfig = InstanceConfig {
    name: "search",
    prefix: "search_",
    backend: BackendKind::Session,
    default_ttl: Duration::from_secs(15 * 60),
};

pub const JOBS: InstanceConfig = InstanceConfig {
    name: "jobs",
    prefix: "jobs_",
    backend: BackendKind::Durable,
    default_ttl: Duration::from_secs(30 * 60),
};

pub const COMPANIES: InstanceConfig = InstanceConfig {
    name: "companies",
    prefix: "companies_",
    backend: BackendKind::Durable,
    default_ttl: Duration::from_secs(60 * 60),
};

pub const NOTIFICATIONS: InstanceConfig = InstanceConfig {
    name: "notifications",
    prefix: "notifications_",
    backend: BackendKind::Session,
    default_ttl: Duration::from_secs(5 * 60),
};

/// The full instance table, in a fixed order.
pub const INSTANCES: [InstanceConfig; 7] =
    [PROFILE, POSTS, FOLLOW, SEARCH, JOBS, COMPANIES, NOTIFICATIONS];

/// Size cap for the durable LMDB environment.
const DURABLE_MAP_SIZE_MB: usize = 64;

/// All cache instances, constructed once and shared by handle.
///
/// Durable instances multiplex one physical LMDB store and session instances
/// one physical session store; prefixes keep them logically disjoint.
pub struct CacheRegistry {
    profile: CacheManager,
    posts: CacheManager,
    follow: CacheManager,
    search: CacheManager,
    jobs: CacheManager,
    companies: CacheManager,
    notifications: CacheManager,
}

impl CacheRegistry {
    /// Open the registry with a durable store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the durable store cannot be opened; once
    /// constructed, no cache operation surfaces storage errors.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let durable: Arc<dyn PersistentStore> =
            Arc::new(LmdbStore::open(dir, DURABLE_MAP_SIZE_MB)?);
        let session: Arc<dyn PersistentStore> = Arc::new(SessionStore::new());
        Ok(Self::assemble(&durable, &session))
    }

    /// Build a registry with no on-disk footprint, for hosts without a
    /// writable data directory. The durable scope collapses onto a second
    /// session-lifetime store; TTLs and prefixes are unchanged.
    pub fn ephemeral() -> Self {
        let durable: Arc<dyn PersistentStore> = Arc::new(SessionStore::new());
        let session: Arc<dyn PersistentStore> = Arc::new(SessionStore::new());
        Self::assemble(&durable, &session)
    }

    fn assemble(
        durable: &Arc<dyn PersistentStore>,
        session: &Arc<dyn PersistentStore>,
    ) -> Self {
        let build = |cfg: InstanceConfig| {
            let manager_config = CacheManagerConfig {
                key_prefix: cfg.prefix,
                default_ttl: cfg.default_ttl,
            };
            match cfg.backend {
                BackendKind::InProcessOnly => CacheManager::in_process_only(manager_config),
                BackendKind::Session => {
                    CacheManager::with_backend(manager_config, Arc::clone(session))
                }
                BackendKind::Durable => {
                    CacheManager::with_backend(manager_config, Arc::clone(durable))
                }
            }
        };

        Self {
            profile: build(PROFILE),
            posts: build(POSTS),
            follow: build(FOLLOW),
            search: build(SEARCH),
            jobs: build(JOBS),
            companies: build(COMPANIES),
            notifications: build(NOTIFICATIONS),
        }
    }

    pub fn profile(&self) -> &CacheManager {
        &self.profile
    }

    pub fn posts(&self) -> &CacheManager {
        &self.posts
    }

    pub fn follow(&self) -> &CacheManager {
        &self.follow
    }

    pub fn search(&self) -> &CacheManager {
        &self.search
    }

    pub fn jobs(&self) -> &CacheManager {
        &self.jobs
    }

    pub fn companies(&self) -> &CacheManager {
        &self.companies
    }

    pub fn notifications(&self) -> &CacheManager {
        &self.notifications
    }

    /// Every instance, paired with its table name.
    pub fn all(&self) -> [(&'static str, &CacheManager); 7] {
        [
            (PROFILE.name, &self.profile),
            (POSTS.name, &self.posts),
            (FOLLOW.name, &self.follow),
            (SEARCH.name, &self.search),
            (JOBS.name, &self.jobs),
            (COMPANIES.name, &self.companies),
            (NOTIFICATIONS.name, &self.notifications),
        ]
    }

    /// Wipe every instance. The logout path.
    pub fn clear_everything(&self) {
        for (_, manager) in self.all() {
            manager.clear_all();
        }
    }

    /// Per-instance statistics snapshot, for debugging surfaces.
    pub fn stats_snapshot(&self) -> Vec<(&'static str, CacheStats)> {
        self.all()
            .into_iter()
            .map(|(name, manager)| (name, manager.stats()))
            .collect()
    }
}
