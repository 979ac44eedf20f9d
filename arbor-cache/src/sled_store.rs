// SPDX-License-Identifier: AGPL-3.0-or-later
//! Sled database backend for snapshot storage

use arbor_core::Tree;
use async_trait::async_trait;
use sled::Db;
use tracing::debug;

use crate::{CacheError, CacheResult, Snapshot, SnapshotStore, SnapshotStoreConfig};

const SNAPSHOT_KEY: &[u8] = b"snapshot:current";

/// Sled-based snapshot store
pub struct SledStore {
    db: Db,
}

impl SledStore {
    /// Open or create a sled database at the configured path
    pub fn open(config: &SnapshotStoreConfig) -> CacheResult<Self> {
        let db = sled::open(&config.path).map_err(|e| CacheError::Database(e.to_string()))?;
        debug!(path = %config.path.display(), "opened snapshot database");
        Ok(Self { db })
    }

    /// Get database size on disk
    pub fn size_on_disk(&self) -> CacheResult<u64> {
        self.db
            .size_on_disk()
            .map_err(|e| CacheError::Database(e.to_string()))
    }

    fn flush(&self) -> CacheResult<()> {
        self.db
            .flush()
            .map_err(|e| CacheError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for SledStore {
    async fn load(&self) -> CacheResult<Option<Snapshot>> {
        match self
            .db
            .get(SNAPSHOT_KEY)
            .map_err(|e| CacheError::Database(e.to_string()))?
        {
            Some(data) => Snapshot::from_bytes(&data).map(Some),
            None => Ok(None),
        }
    }

    async fn save(&self, tree: Option<&Tree>) -> CacheResult<Snapshot> {
        let snapshot = Snapshot::new(tree.cloned());
        self.db
            .insert(SNAPSHOT_KEY, snapshot.to_bytes()?)
            .map_err(|e| CacheError::Database(e.to_string()))?;
        self.flush()?;
        debug!(nodes = tree.map_or(0, Tree::len), "saved snapshot");
        Ok(snapshot)
    }

    async fn clear(&self) -> CacheResult<()> {
        self.db
            .remove(SNAPSHOT_KEY)
            .map_err(|e| CacheError::Database(e.to_string()))?;
        self.flush()
    }
}
