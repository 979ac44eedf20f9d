// SPDX-License-Identifier: AGPL-3.0-or-later
//! Tree snapshot persistence for Arbor
//!
//! Stores:
//! - sled: embedded KV database (default)
//! - JSON file: single human-readable document
//! - memory: for tests and throwaway sessions

mod error;
mod file_store;
pub mod snapshot;

#[cfg(feature = "sled")]
mod sled_store;

pub use error::{CacheError, CacheResult};
pub use file_store::JsonFileStore;
pub use snapshot::{Snapshot, SNAPSHOT_VERSION};

#[cfg(feature = "sled")]
pub use sled_store::SledStore;

use arbor_core::Tree;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::info;

/// Snapshot store configuration
#[derive(Debug, Clone)]
pub struct SnapshotStoreConfig {
    /// Database (or file) path
    pub path: PathBuf,
}

impl Default for SnapshotStoreConfig {
    fn default() -> Self {
        let data_dir = directories::ProjectDirs::from("com", "arbor", "arbor")
            .map(|d| d.data_dir().to_path_buf())
            .unwrap_or_else(|| std::env::temp_dir().join("arbor"));

        Self { path: data_dir.join("workspace.db") }
    }
}

/// Durable home for the workspace tree between sessions
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Last saved snapshot, `None` if nothing was saved yet
    async fn load(&self) -> CacheResult<Option<Snapshot>>;

    /// Save the workspace; `None` records that the root was deleted
    async fn save(&self, tree: Option<&Tree>) -> CacheResult<Snapshot>;

    /// Forget the saved snapshot
    async fn clear(&self) -> CacheResult<()>;

    /// Replace the saved snapshot with a fresh initial tree
    async fn reset(&self) -> CacheResult<Tree> {
        let tree = Tree::reset();
        self.save(Some(&tree)).await?;
        info!(root = %tree.root_id(), "workspace reset");
        Ok(tree)
    }
}

/// In-memory store. Snapshots are still encoded, so a round trip through
/// this store behaves like one through disk.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<Option<Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self) -> CacheResult<Option<Snapshot>> {
        self.data
            .read()
            .await
            .as_deref()
            .map(Snapshot::from_bytes)
            .transpose()
    }

    async fn save(&self, tree: Option<&Tree>) -> CacheResult<Snapshot> {
        let snapshot = Snapshot::new(tree.cloned());
        *self.data.write().await = Some(snapshot.to_bytes()?);
        Ok(snapshot)
    }

    async fn clear(&self) -> CacheResult<()> {
        *self.data.write().await = None;
        Ok(())
    }
}
