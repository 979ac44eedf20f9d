// SPDX-License-Identifier: AGPL-3.0-or-later
//! Flat tree encoding
//!
//! A tree is stored as a pre-order list of nodes, each naming its parent.
//! Document nesting stays constant however deep the tree grows, and the
//! nesting is rebuilt with an explicit stack on decode.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{TreeError, TreeResult};
use crate::node::{Children, Node, NodeId, NodeKind};
use crate::tree::Tree;

/// Shape of a stored node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlatKind {
    Leaf,
    Folder,
    UnloadedFolder,
}

/// One node of a [`FlatTree`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatNode {
    pub id: NodeId,
    pub label: String,
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    pub kind: FlatKind,
}

/// Serialized form of a [`Tree`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlatTree {
    pub nodes: Vec<FlatNode>,
}

impl From<&Tree> for FlatTree {
    fn from(tree: &Tree) -> Self {
        let nodes = tree
            .walk()
            .map(|(node, _)| FlatNode {
                id: node.id().clone(),
                label: node.label().to_string(),
                parent_id: node.parent_id().cloned(),
                kind: match node.kind() {
                    NodeKind::Leaf => FlatKind::Leaf,
                    NodeKind::Folder { children: Children::Loaded(_) } => FlatKind::Folder,
                    NodeKind::Folder { children: Children::NotLoaded } => FlatKind::UnloadedFolder,
                },
            })
            .collect();
        Self { nodes }
    }
}

impl From<Tree> for FlatTree {
    fn from(tree: Tree) -> Self {
        Self::from(&tree)
    }
}

impl TryFrom<FlatTree> for Tree {
    type Error = TreeError;

    /// Rebuild the tree. Exactly one node may lack a parent, every other
    /// node must be reachable from it, and only loaded folders may hold
    /// children. The result is then checked like any other tree.
    fn try_from(flat: FlatTree) -> TreeResult<Self> {
        let nodes = flat.nodes;

        let mut roots = nodes.iter().enumerate().filter(|(_, n)| n.parent_id.is_none());
        let (root, _) = roots.next().ok_or_else(|| TreeError::Corrupt("no root node".into()))?;
        if let Some((_, extra)) = roots.next() {
            return Err(TreeError::Corrupt(format!("second root {}", extra.id)));
        }

        let mut children: HashMap<&NodeId, Vec<usize>> = HashMap::new();
        for (index, node) in nodes.iter().enumerate() {
            if let Some(parent) = &node.parent_id {
                children.entry(parent).or_default().push(index);
            }
        }

        // Post-order over indices: a node is built once all its children are
        let mut built: Vec<Option<Arc<Node>>> = vec![None; nodes.len()];
        let mut visited = vec![false; nodes.len()];
        let mut stack = vec![(root, false)];
        while let Some((index, ready)) = stack.pop() {
            let flat = &nodes[index];
            let kids = children.get(&flat.id).map(Vec::as_slice).unwrap_or_default();

            if !ready {
                if std::mem::replace(&mut visited[index], true) {
                    return Err(TreeError::Corrupt(format!("{} is reachable twice", flat.id)));
                }
                stack.push((index, true));
                stack.extend(kids.iter().rev().map(|&kid| (kid, false)));
                continue;
            }

            let node = match flat.kind {
                FlatKind::Folder => {
                    let items = kids
                        .iter()
                        .map(|&kid| {
                            built[kid]
                                .take()
                                .ok_or_else(|| TreeError::Corrupt(format!("{} is reachable twice", nodes[kid].id)))
                        })
                        .collect::<TreeResult<Vec<_>>>()?;
                    Node::folder(flat.id.clone(), flat.label.clone()).with_items(items)
                }
                _ if !kids.is_empty() => {
                    return Err(TreeError::Corrupt(format!("{} cannot hold children", flat.id)));
                }
                FlatKind::Leaf => Node::leaf(flat.id.clone(), flat.label.clone()),
                FlatKind::UnloadedFolder => Node::unloaded_folder(flat.id.clone(), flat.label.clone()),
            };
            built[index] = Some(Arc::new(node.reparented(flat.parent_id.clone())));
        }

        if let Some(orphan) = visited.iter().position(|seen| !seen) {
            return Err(TreeError::Corrupt(format!("{} is not reachable from the root", nodes[orphan].id)));
        }

        let root = built[root]
            .take()
            .ok_or_else(|| TreeError::Corrupt("root was not rebuilt".into()))?;
        let tree = Tree { root };
        tree.validate()?;
        Ok(tree)
    }
}
