// SPDX-License-Identifier: AGPL-3.0-or-later
//! Tree nodes
//!
//! A node is either a leaf or a folder. A folder's children are either not
//! loaded yet or a loaded (possibly empty) ordered sequence. Leaves carry no
//! children slot at all, so "loaded but empty" and "not loaded yet" can never
//! be confused.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Opaque node identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh identifier for a newly created node. Never collides with ids
    /// handed out earlier, including those of deleted nodes.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Children of a folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "items", rename_all = "snake_case")]
pub enum Children {
    /// Not fetched from the lazy loader yet
    NotLoaded,
    /// Loaded; an empty sequence means the folder has no children
    Loaded(Vec<Arc<Node>>),
}

/// Node kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Leaf,
    Folder { children: Children },
}

/// A node of the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    label: String,
    parent_id: Option<NodeId>,
    kind: NodeKind,
}

impl Node {
    pub fn leaf(id: impl Into<NodeId>, label: impl Into<String>) -> Self {
        Self { id: id.into(), label: label.into(), parent_id: None, kind: NodeKind::Leaf }
    }

    /// Folder whose (empty) children are already known
    pub fn folder(id: impl Into<NodeId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            parent_id: None,
            kind: NodeKind::Folder { children: Children::Loaded(Vec::new()) },
        }
    }

    /// Folder whose children must be fetched by the lazy loader
    pub fn unloaded_folder(id: impl Into<NodeId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            parent_id: None,
            kind: NodeKind::Folder { children: Children::NotLoaded },
        }
    }

    /// Turn this node into a loaded folder holding `children`.
    ///
    /// Each child's parent is set to this node's id.
    pub fn with_children(self, children: impl IntoIterator<Item = Node>) -> Self {
        let items = children
            .into_iter()
            .map(|child| Arc::new(child.reparented(Some(self.id.clone()))))
            .collect();
        Self { kind: NodeKind::Folder { children: Children::Loaded(items) }, ..self }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parent_id(&self) -> Option<&NodeId> {
        self.parent_id.as_ref()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder { .. })
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf)
    }

    /// Children state, `None` for leaves
    pub fn children_state(&self) -> Option<&Children> {
        match &self.kind {
            NodeKind::Folder { children } => Some(children),
            NodeKind::Leaf => None,
        }
    }

    /// Loaded children, `None` for leaves and folders that are not loaded
    pub fn children(&self) -> Option<&[Arc<Node>]> {
        match &self.kind {
            NodeKind::Folder { children: Children::Loaded(items) } => Some(items),
            _ => None,
        }
    }

    /// True for a folder still waiting on the lazy loader
    pub fn needs_load(&self) -> bool {
        matches!(self.kind, NodeKind::Folder { children: Children::NotLoaded })
    }

    /// First node with `id` in this subtree, depth-first pre-order
    pub fn find(&self, id: &str) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children()?.iter().find_map(|child| child.find(id))
    }

    /// Number of nodes in this subtree, this one included
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children()
            .map(|items| items.iter().map(|child| child.subtree_len()).sum())
            .unwrap_or(0)
    }

    pub(crate) fn relabeled(&self, label: &str) -> Node {
        Node { label: label.to_string(), ..self.clone() }
    }

    pub(crate) fn reparented(self, parent_id: Option<NodeId>) -> Node {
        Node { parent_id, ..self }
    }

    /// Same node with its children replaced by a loaded sequence
    pub(crate) fn with_items(&self, items: Vec<Arc<Node>>) -> Node {
        Node {
            kind: NodeKind::Folder { children: Children::Loaded(items) },
            ..self.clone()
        }
    }

    /// Same folder with `child` appended. A folder that was not loaded yet
    /// becomes loaded with `child` as its only item.
    pub(crate) fn with_appended(&self, child: Arc<Node>) -> Node {
        let mut items = self.children().map(<[_]>::to_vec).unwrap_or_default();
        items.push(child);
        self.with_items(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_generate_is_unique() {
        let a = NodeId::generate();
        let b = NodeId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_node_id_compares_with_str() {
        let id = NodeId::from("42");
        assert_eq!(id, "42");
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_children_states() {
        let leaf = Node::leaf("1", "a.txt");
        assert!(leaf.is_leaf());
        assert!(leaf.children_state().is_none());
        assert!(leaf.children().is_none());

        let empty = Node::folder("2", "docs");
        assert_eq!(empty.children_state(), Some(&Children::Loaded(Vec::new())));
        assert_eq!(empty.children().map(<[_]>::len), Some(0));
        assert!(!empty.needs_load());

        let lazy = Node::unloaded_folder("3", "remote");
        assert_eq!(lazy.children_state(), Some(&Children::NotLoaded));
        assert!(lazy.children().is_none());
        assert!(lazy.needs_load());
    }

    #[test]
    fn test_with_children_sets_parent() {
        let folder = Node::folder("1", "root")
            .with_children([Node::leaf("2", "a"), Node::folder("3", "b")]);

        let items = folder.children().unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|c| c.parent_id() == Some(&NodeId::from("1"))));
    }

    #[test]
    fn test_find_and_subtree_len() {
        let folder = Node::folder("1", "root").with_children([
            Node::folder("2", "src").with_children([Node::leaf("4", "main.rs")]),
            Node::leaf("3", "README"),
        ]);

        assert_eq!(folder.find("4").map(Node::label), Some("main.rs"));
        assert!(folder.find("9").is_none());
        assert_eq!(folder.subtree_len(), 4);
    }

    #[test]
    fn test_with_appended_materializes_unloaded_folder() {
        let lazy = Node::unloaded_folder("3", "remote");
        let child = Arc::new(Node::leaf("4", "x").reparented(Some("3".into())));

        let loaded = lazy.with_appended(child);
        assert_eq!(loaded.children().map(<[_]>::len), Some(1));
        assert!(!loaded.needs_load());
    }

    #[test]
    fn test_serde_keeps_not_loaded_distinct_from_empty() {
        let lazy = serde_json::to_value(Node::unloaded_folder("3", "remote")).unwrap();
        let empty = serde_json::to_value(Node::folder("3", "remote")).unwrap();

        assert_eq!(lazy["kind"]["children"]["state"], "not_loaded");
        assert_eq!(empty["kind"]["children"]["state"], "loaded");
        assert_ne!(lazy, empty);
    }
}
