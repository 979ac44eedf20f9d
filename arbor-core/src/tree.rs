// SPDX-License-Identifier: AGPL-3.0-or-later
//! Immutable tree value and read-only queries

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{TreeError, TreeResult};
use crate::flat::FlatTree;
use crate::node::{Node, NodeId};

/// Label of the root created by [`Tree::reset`]
pub const DEFAULT_ROOT_LABEL: &str = "root";

/// A rooted tree of nodes.
///
/// Cloning is cheap: subtrees are reference counted and shared between a
/// tree and every tree derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "FlatTree", try_from = "FlatTree")]
pub struct Tree {
    pub(crate) root: Arc<Node>,
}

impl Tree {
    /// Tree holding a single, loaded and empty, root folder
    pub fn new(root_label: impl Into<String>) -> Self {
        Self { root: Arc::new(Node::folder(NodeId::generate(), root_label)) }
    }

    /// Fresh initial tree used when a workspace is reset. Its root has not
    /// been loaded, so the first expansion goes through the lazy loader.
    pub fn reset() -> Self {
        Self { root: Arc::new(Node::unloaded_folder(NodeId::generate(), DEFAULT_ROOT_LABEL)) }
    }

    /// Build a tree from a root node, checking every invariant
    pub fn from_root(root: Node) -> TreeResult<Self> {
        let tree = Self { root: Arc::new(root.reparented(None)) };
        tree.validate()?;
        Ok(tree)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_id(&self) -> &NodeId {
        self.root.id()
    }

    /// Number of reachable nodes
    pub fn len(&self) -> usize {
        self.root.subtree_len()
    }

    /// A tree always holds its root
    pub fn is_empty(&self) -> bool {
        false
    }

    /// First node with `id`, depth-first pre-order
    pub fn find_by_id(&self, id: &str) -> Option<&Node> {
        self.root.find(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find_by_id(id).is_some()
    }

    /// True iff `id` lies strictly below `ancestor_id`
    pub fn is_descendant(&self, ancestor_id: &str, id: &str) -> bool {
        self.find_by_id(ancestor_id)
            .and_then(Node::children)
            .map(|items| items.iter().any(|child| child.find(id).is_some()))
            .unwrap_or(false)
    }

    pub fn parent_of(&self, id: &str) -> Option<&Node> {
        let parent_id = self.find_by_id(id)?.parent_id()?;
        self.find_by_id(parent_id.as_str())
    }

    /// Nodes from the root down to `id` (both included), empty if absent
    pub fn path_to(&self, id: &str) -> Vec<&Node> {
        fn descend<'a>(node: &'a Node, id: &str, path: &mut Vec<&'a Node>) -> bool {
            path.push(node);
            if node.id() == id {
                return true;
            }
            let found = node
                .children()
                .map(|items| items.iter().any(|child| descend(child, id, path)))
                .unwrap_or(false);
            if !found {
                path.pop();
            }
            found
        }

        let mut path = Vec::new();
        descend(&self.root, id, &mut path);
        path
    }

    /// Depth-first pre-order walk yielding each node with its depth
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(&self.root)
    }

    /// Walk of the subtree under `id`, depths counted from that node
    pub fn walk_from(&self, id: &str) -> Option<Walk<'_>> {
        self.find_by_id(id).map(Walk::new)
    }

    /// Check every structural invariant: the root has no parent, ids are
    /// unique and each node's parent id names the folder holding it.
    pub fn validate(&self) -> TreeResult<()> {
        if let Some(parent) = self.root.parent_id() {
            return Err(TreeError::Corrupt(format!("root has parent {parent}")));
        }

        let mut seen = HashSet::new();
        let mut stack = vec![self.root.as_ref()];
        while let Some(node) = stack.pop() {
            if !seen.insert(node.id()) {
                return Err(TreeError::Corrupt(format!("duplicate id {}", node.id())));
            }
            for child in node.children().unwrap_or_default() {
                if child.parent_id() != Some(node.id()) {
                    return Err(TreeError::Corrupt(format!(
                        "{} is held by {} but points at {:?}",
                        child.id(),
                        node.id(),
                        child.parent_id().map(NodeId::as_str)
                    )));
                }
                stack.push(child.as_ref());
            }
        }
        Ok(())
    }
}

/// Iterator returned by [`Tree::walk`]
pub struct Walk<'a> {
    stack: Vec<(&'a Node, usize)>,
}

impl<'a> Walk<'a> {
    /// Pre-order walk starting at `node`, which is yielded at depth 0
    pub fn new(node: &'a Node) -> Self {
        Self { stack: vec![(node, 0)] }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = (&'a Node, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, depth) = self.stack.pop()?;
        if let Some(items) = node.children() {
            self.stack.extend(items.iter().rev().map(|child| (child.as_ref(), depth + 1)));
        }
        Some((node, depth))
    }
}
