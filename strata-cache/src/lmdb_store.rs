//! Durable persistent store backed by LMDB.
//!
//! Uses the heed crate (Rust bindings for LMDB) to provide a memory-mapped
//! key/value store whose contents survive process restarts. Backs the
//! instances worth keeping across a reload (profiles, posts, follow status,
//! jobs, companies).
//!
//! # Thread Safety
//!
//! LMDB provides ACID transactions. This store uses read transactions for
//! `read_raw`/`keys_with_prefix` and write transactions for `write_raw` and
//! `remove_raw`. The environment handle is internally reference-counted, so
//! the store is cheap to clone and share across cache instances.

use std::path::Path;

use heed::types::{Bytes, Str};
use heed::{Database, Env, EnvOpenOptions};

use strata_core::StoreError;

use crate::scoped_key::ScopedKey;
use crate::traits::PersistentStore;

fn txn_err(e: heed::Error) -> StoreError {
    StoreError::Unavailable {
        reason: e.to_string(),
    }
}

fn write_err(e: heed::Error) -> StoreError {
    match e {
        heed::Error::Mdb(heed::MdbError::MapFull) => StoreError::WriteRejected {
            reason: "LMDB map full".to_string(),
        },
        other => StoreError::Unavailable {
            reason: other.to_string(),
        },
    }
}

/// Durable key/value store over a single unnamed LMDB database.
#[derive(Clone)]
pub struct LmdbStore {
    env: Env,
    db: Database<Str, Bytes>,
}

impl LmdbStore {
    /// Open (or create) a durable store rooted at `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where LMDB files live; created if absent
    /// * `max_size_mb` - Maximum size of the database in megabytes
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the LMDB
    /// environment cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&path).map_err(|e| StoreError::Unavailable {
            reason: format!("cannot create cache directory: {e}"),
        })?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(max_size_mb * 1024 * 1024)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(txn_err)?;

        let mut wtxn = env.write_txn().map_err(txn_err)?;
        let db: Database<Str, Bytes> = env.create_database(&mut wtxn, None).map_err(txn_err)?;
        wtxn.commit().map_err(txn_err)?;

        Ok(Self { env, db })
    }
}

impl PersistentStore for LmdbStore {
    fn read_raw(&self, full_key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(txn_err)?;
        let bytes = self.db.get(&rtxn, full_key).map_err(txn_err)?;
        Ok(bytes.map(|b| b.to_vec()))
    }

    fn write_raw(&self, full_key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(txn_err)?;
        self.db.put(&mut wtxn, full_key, bytes).map_err(write_err)?;
        wtxn.commit().map_err(write_err)
    }

    fn remove_raw(&self, full_key: &str) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(txn_err)?;
        self.db.delete(&mut wtxn, full_key).map_err(txn_err)?;
        wtxn.commit().map_err(txn_err)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let rtxn = self.env.read_txn().map_err(txn_err)?;

        let mut keys = Vec::new();
        let iter = self.db.iter(&rtxn).map_err(txn_err)?;
        for result in iter {
            let (key, _) = result.map_err(txn_err)?;
            if ScopedKey::belongs_to(key, prefix) {
                keys.push(key.to_string());
            }
        }

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (LmdbStore, TempDir) {
        let temp_dir = TempDir::new().expect("TempDir creation should succeed");
        let store = LmdbStore::open(temp_dir.path(), 10).expect("store should open");
        (store, temp_dir)
    }

    #[test]
    fn test_roundtrip_and_remove() {
        let (store, _temp_dir) = create_test_store();

        assert_eq!(
            store.read_raw("profile_u1").expect("read should succeed"),
            None
        );

        store
            .write_raw("profile_u1", b"payload")
            .expect("write should succeed");
        assert_eq!(
            store.read_raw("profile_u1").expect("read should succeed"),
            Some(b"payload".to_vec())
        );

        store
            .remove_raw("profile_u1")
            .expect("remove should succeed");
        assert_eq!(
            store.read_raw("profile_u1").expect("read should succeed"),
            None
        );

        // Removing a missing key is not an error.
        store
            .remove_raw("profile_u1")
            .expect("remove should succeed");
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let (store, _temp_dir) = create_test_store();

        store
            .write_raw("jobs_list", b"old")
            .expect("write should succeed");
        store
            .write_raw("jobs_list", b"new")
            .expect("write should succeed");

        assert_eq!(
            store.read_raw("jobs_list").expect("read should succeed"),
            Some(b"new".to_vec())
        );
    }

    #[test]
    fn test_keys_with_prefix_filters() {
        let (store, _temp_dir) = create_test_store();

        store
            .write_raw("jobs_1", b"a")
            .expect("write should succeed");
        store
            .write_raw("jobs_2", b"b")
            .expect("write should succeed");
        store
            .write_raw("companies_1", b"c")
            .expect("write should succeed");

        let mut keys = store.keys_with_prefix("jobs_").expect("scan should succeed");
        keys.sort();

        assert_eq!(keys, vec!["jobs_1".to_string(), "jobs_2".to_string()]);
    }

    #[test]
    fn test_contents_survive_reopen() {
        let temp_dir = TempDir::new().expect("TempDir creation should succeed");

        {
            let store = LmdbStore::open(temp_dir.path(), 10).expect("store should open");
            store
                .write_raw("profile_u1", b"durable")
                .expect("write should succeed");
        }

        let reopened = LmdbStore::open(temp_dir.path(), 10).expect("store should reopen");
        assert_eq!(
            reopened
                .read_raw("profile_u1")
                .expect("read should succeed"),
            Some(b"durable".to_vec())
        );
    }
}
