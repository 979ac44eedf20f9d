// SPDX-License-Identifier: AGPL-3.0-or-later
//! Snapshot encoding
//!
//! A snapshot records the whole workspace: either a tree or the fact that
//! the root was deleted. Both states survive a round trip, as does the
//! difference between folders that are loaded-empty and not loaded yet.
//! The tree is stored as a flat node list, so depth does not bound what
//! can be restored.

use arbor_core::{FlatTree, Tree};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CacheError, CacheResult};

/// Current on-disk format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Saved workspace state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub saved_at: DateTime<Utc>,
    /// `None` when the root was deleted
    pub tree: Option<Tree>,
}

#[derive(Serialize, Deserialize)]
struct StoredSnapshot {
    version: u32,
    saved_at: DateTime<Utc>,
    tree: Option<FlatTree>,
}

impl Snapshot {
    pub fn new(tree: Option<Tree>) -> Self {
        Self { saved_at: Utc::now(), tree }
    }

    pub fn to_bytes(&self) -> CacheResult<Vec<u8>> {
        let stored = StoredSnapshot {
            version: SNAPSHOT_VERSION,
            saved_at: self.saved_at,
            tree: self.tree.as_ref().map(FlatTree::from),
        };
        serde_json::to_vec(&stored).map_err(|e| CacheError::Serialization(e.to_string()))
    }

    /// Decode and validate a snapshot. A tree breaking any invariant is
    /// rejected rather than handed to the workspace.
    pub fn from_bytes(data: &[u8]) -> CacheResult<Self> {
        let stored: StoredSnapshot =
            serde_json::from_slice(data).map_err(|e| CacheError::Serialization(e.to_string()))?;
        if stored.version != SNAPSHOT_VERSION {
            return Err(CacheError::UnsupportedVersion {
                found: stored.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        let tree = stored.tree.map(Tree::try_from).transpose()?;
        Ok(Self { saved_at: stored.saved_at, tree })
    }
}
