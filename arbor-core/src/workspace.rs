// SPDX-License-Identifier: AGPL-3.0-or-later
//! Workspace: the mutable reference to the current tree
//!
//! Tree values are immutable; the workspace owns the one the user is looking
//! at, serialises reads and writes to it, and drives the lazy loader. At most
//! one load per folder is in flight, and a response that arrives after the
//! folder was deleted, loaded by other means or replaced is dropped.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{TreeError, TreeResult};
use crate::loader::LazyLoader;
use crate::node::{Children, Node, NodeId};
use crate::tree::Tree;

/// Workspace configuration
#[derive(Debug, Clone, Default)]
pub struct WorkspaceConfig {
    /// Give up on a lazy load after this long. No limit when unset.
    pub load_timeout: Option<Duration>,
}

/// Result of expanding a folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    /// Children were already loaded; the loader was not called
    Cached(Vec<Arc<Node>>),
    /// Children were fetched and grafted
    Loaded(Vec<Arc<Node>>),
    /// Children were fetched but the folder no longer wanted them
    Stale,
}

impl Expansion {
    pub fn children(&self) -> &[Arc<Node>] {
        match self {
            Expansion::Cached(items) | Expansion::Loaded(items) => items,
            Expansion::Stale => &[],
        }
    }
}

/// Marks a folder as loading for as long as it lives
struct LoadingFlag<'a> {
    loading: &'a Mutex<HashSet<NodeId>>,
    id: NodeId,
}

impl<'a> LoadingFlag<'a> {
    fn acquire(loading: &'a Mutex<HashSet<NodeId>>, id: &NodeId) -> TreeResult<Self> {
        let mut set = loading.lock().unwrap_or_else(PoisonError::into_inner);
        if !set.insert(id.clone()) {
            return Err(TreeError::AlreadyLoading(id.to_string()));
        }
        Ok(Self { loading, id: id.clone() })
    }
}

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        self.loading
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

/// Owner of the current tree
pub struct Workspace {
    tree: RwLock<Option<Tree>>,
    loading: Mutex<HashSet<NodeId>>,
    loader: Arc<dyn LazyLoader>,
    config: WorkspaceConfig,
}

impl Workspace {
    pub fn new(tree: Option<Tree>, loader: Arc<dyn LazyLoader>) -> Self {
        Self {
            tree: RwLock::new(tree),
            loading: Mutex::new(HashSet::new()),
            loader,
            config: WorkspaceConfig::default(),
        }
    }

    pub fn with_config(mut self, config: WorkspaceConfig) -> Self {
        self.config = config;
        self
    }

    /// Current tree value; `None` once the root has been deleted
    pub async fn snapshot(&self) -> Option<Tree> {
        self.tree.read().await.clone()
    }

    /// Swap in another tree (e.g. a restored or reset one), returning the old one
    pub async fn replace(&self, tree: Option<Tree>) -> Option<Tree> {
        std::mem::replace(&mut *self.tree.write().await, tree)
    }

    pub fn is_loading(&self, id: &str) -> bool {
        self.loading
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&NodeId::from(id))
    }

    pub async fn find(&self, id: &str) -> Option<Node> {
        self.tree.read().await.as_ref()?.find_by_id(id).cloned()
    }

    pub async fn is_descendant(&self, ancestor_id: &str, id: &str) -> bool {
        self.tree
            .read()
            .await
            .as_ref()
            .is_some_and(|tree| tree.is_descendant(ancestor_id, id))
    }

    pub async fn insert(&self, folder_id: &str, label: &str, is_folder: bool) -> TreeResult<NodeId> {
        self.apply(|tree| {
            let (tree, id) = tree.insert(folder_id, label, is_folder)?;
            Ok((Some(tree), id))
        })
        .await
    }

    pub async fn delete(&self, id: &str) -> TreeResult<()> {
        self.apply(|tree| Ok((tree.delete(id), ()))).await
    }

    pub async fn rename(&self, id: &str, new_label: &str) -> TreeResult<()> {
        self.apply(|tree| Ok((Some(tree.rename(id, new_label)?), ()))).await
    }

    pub async fn move_node(&self, source_id: &str, target_id: &str) -> TreeResult<()> {
        self.apply(|tree| Ok((Some(tree.move_node(source_id, target_id)?), ())))
            .await
    }

    /// Expand folder `id`, fetching its children from the lazy loader the
    /// first time.
    ///
    /// A second request for a folder whose load is still in flight fails
    /// with [`TreeError::AlreadyLoading`]. When the loader fails the folder
    /// stays unloaded and may be expanded again.
    pub async fn expand(&self, id: &str) -> TreeResult<Expansion> {
        let folder_id = match self.children_of(id).await? {
            Some(items) => return Ok(Expansion::Cached(items)),
            None => NodeId::from(id),
        };

        let _flag = LoadingFlag::acquire(&self.loading, &folder_id)?;
        // A load that finished before the flag was taken has already grafted
        if let Some(items) = self.children_of(id).await? {
            return Ok(Expansion::Cached(items));
        }
        let children = self.fetch(&folder_id).await?;

        let mut guard = self.tree.write().await;
        let Some(tree) = guard.as_ref().filter(|tree| tree.find_by_id(id).is_some_and(Node::needs_load))
        else {
            warn!(folder = id, "dropping stale lazy load");
            return Ok(Expansion::Stale);
        };

        let updated = tree.graft_lazy_children(id, children);
        let items = updated
            .find_by_id(id)
            .and_then(Node::children)
            .map(<[_]>::to_vec)
            .unwrap_or_default();
        *guard = Some(updated);
        Ok(Expansion::Loaded(items))
    }

    /// Loaded children of folder `id`, `None` while it is not loaded
    async fn children_of(&self, id: &str) -> TreeResult<Option<Vec<Arc<Node>>>> {
        let guard = self.tree.read().await;
        let tree = guard.as_ref().ok_or(TreeError::NoTree)?;
        let node = tree
            .find_by_id(id)
            .ok_or_else(|| TreeError::NotFound(id.to_string()))?;
        match node.children_state() {
            None => Err(TreeError::NotAFolder(id.to_string())),
            Some(Children::Loaded(items)) => Ok(Some(items.clone())),
            Some(Children::NotLoaded) => Ok(None),
        }
    }

    async fn fetch(&self, folder_id: &NodeId) -> TreeResult<Vec<Node>> {
        debug!(loader = self.loader.id(), folder = %folder_id, "loading children");
        let load = self.loader.load_children(folder_id);
        let result = match self.config.load_timeout {
            Some(limit) => tokio::time::timeout(limit, load).await.unwrap_or_else(|_| {
                Err(TreeError::load_failed(folder_id.as_str(), format!("timed out after {limit:?}")))
            }),
            None => load.await,
        };

        result.map_err(|err| {
            warn!(folder = %folder_id, error = %err, "lazy load failed");
            match err {
                TreeError::LoadFailed { .. } => err,
                other => TreeError::load_failed(folder_id.as_str(), other.to_string()),
            }
        })
    }

    /// Run a pure operation against the current tree and store its result.
    /// On error the stored tree is left as it was.
    async fn apply<R, F>(&self, op: F) -> TreeResult<R>
    where
        F: FnOnce(&Tree) -> TreeResult<(Option<Tree>, R)>,
    {
        let mut guard = self.tree.write().await;
        let tree = guard.as_ref().ok_or(TreeError::NoTree)?;
        let (updated, result) = op(tree)?;
        *guard = updated;
        Ok(result)
    }
}
