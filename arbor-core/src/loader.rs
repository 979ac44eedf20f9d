// SPDX-License-Identifier: AGPL-3.0-or-later
//! Lazy loader trait

use async_trait::async_trait;

use crate::{error::TreeResult, node::Node, NodeId};

/// Source of children for folders that have not been loaded yet.
///
/// Returned nodes may carry any parent id; they are re-pointed at
/// `folder_id` when grafted. Their ids must not collide with ids already in
/// the tree: that is not checked.
#[async_trait]
pub trait LazyLoader: Send + Sync {
    fn id(&self) -> &str;

    /// Fetch the children of `folder_id`. Failures should be reported as
    /// [`TreeError::LoadFailed`](crate::TreeError::LoadFailed).
    async fn load_children(&self, folder_id: &NodeId) -> TreeResult<Vec<Node>>;
}
