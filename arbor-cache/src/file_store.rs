// SPDX-License-Identifier: AGPL-3.0-or-later
//! Single JSON document store

use arbor_core::Tree;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::{CacheError, CacheResult, Snapshot, SnapshotStore};

/// Keeps the snapshot in one JSON file, replaced atomically on save
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn load(&self) -> CacheResult<Option<Snapshot>> {
        match fs::read(&self.path).await {
            Ok(data) => Snapshot::from_bytes(&data).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::Io(e)),
        }
    }

    async fn save(&self, tree: Option<&Tree>) -> CacheResult<Snapshot> {
        let snapshot = Snapshot::new(tree.cloned());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write to a sibling first so a crash never leaves half a snapshot
        let temp = self.temp_path();
        fs::write(&temp, snapshot.to_bytes()?).await?;
        fs::rename(&temp, &self.path).await?;
        Ok(snapshot)
    }

    async fn clear(&self) -> CacheResult<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::Io(e)),
        }
    }
}
