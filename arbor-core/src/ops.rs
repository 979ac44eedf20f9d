// SPDX-License-Identifier: AGPL-3.0-or-later
//! Structural operations
//!
//! Every operation takes `&self` and returns a new tree. Only the nodes on
//! the paths from the root to the changed nodes are rebuilt; every other
//! subtree is shared with the input. Failing operations leave nothing behind.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{TreeError, TreeResult};
use crate::node::{Node, NodeId};
use crate::tree::Tree;

/// Rebuild the path down to `id`, replacing that node with `edit(node)`.
/// Returns `None` when `id` is not in the subtree.
fn rewrite<F>(node: &Arc<Node>, id: &str, edit: F) -> Option<Arc<Node>>
where
    F: FnOnce(&Node) -> Node,
{
    fn walk<F: FnOnce(&Node) -> Node>(
        node: &Arc<Node>,
        id: &str,
        edit: &mut Option<F>,
    ) -> Option<Arc<Node>> {
        if node.id() == id {
            return edit.take().map(|f| Arc::new(f(node.as_ref())));
        }
        let items = node.children()?;
        for (index, child) in items.iter().enumerate() {
            if let Some(updated) = walk(child, id, edit) {
                let mut items = items.to_vec();
                items[index] = updated;
                return Some(Arc::new(node.with_items(items)));
            }
        }
        None
    }

    walk(node, id, &mut Some(edit))
}

/// Remove `id` from the subtree under `node` (never `node` itself).
/// Returns the rebuilt subtree together with the detached node.
fn detach(node: &Arc<Node>, id: &str) -> Option<(Arc<Node>, Arc<Node>)> {
    let items = node.children()?;
    for (index, child) in items.iter().enumerate() {
        if child.id() == id {
            let mut items = items.to_vec();
            let removed = items.remove(index);
            return Some((Arc::new(node.with_items(items)), removed));
        }
        if let Some((updated, removed)) = detach(child, id) {
            let mut items = items.to_vec();
            items[index] = updated;
            return Some((Arc::new(node.with_items(items)), removed));
        }
    }
    None
}

fn checked_label(label: &str) -> TreeResult<&str> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(TreeError::InvalidLabel(label.to_string()));
    }
    Ok(trimmed)
}

impl Tree {
    /// Append a new leaf or folder to the folder `folder_id`.
    ///
    /// Returns the new tree and the id given to the new node. A new folder
    /// starts loaded and empty.
    pub fn insert(&self, folder_id: &str, label: &str, is_folder: bool) -> TreeResult<(Tree, NodeId)> {
        let folder = self
            .find_by_id(folder_id)
            .ok_or_else(|| TreeError::NotFound(folder_id.to_string()))?;
        if !folder.is_folder() {
            return Err(TreeError::NotAFolder(folder_id.to_string()));
        }
        let label = checked_label(label)?;

        let id = NodeId::generate();
        let node = if is_folder {
            Node::folder(id.clone(), label)
        } else {
            Node::leaf(id.clone(), label)
        };
        let node = Arc::new(node.reparented(Some(folder.id().clone())));

        let root = rewrite(&self.root, folder_id, |folder| folder.with_appended(node))
            .ok_or_else(|| TreeError::NotFound(folder_id.to_string()))?;
        debug!(folder = folder_id, id = %id, label, is_folder, "inserted node");
        Ok((Tree { root }, id))
    }

    /// Remove `id` and its whole subtree.
    ///
    /// Deleting the root yields `None`: the workspace is left without a tree.
    /// Deleting an id that is not present returns the tree unchanged.
    pub fn delete(&self, id: &str) -> Option<Tree> {
        if self.root_id() == id {
            debug!(id, "deleted root");
            return None;
        }
        match detach(&self.root, id) {
            Some((root, removed)) => {
                debug!(id, removed = removed.subtree_len(), "deleted subtree");
                Some(Tree { root })
            }
            None => Some(self.clone()),
        }
    }

    /// Give `id` a new label.
    ///
    /// A label equal to the current one after trimming, or an unknown id,
    /// returns the tree unchanged.
    pub fn rename(&self, id: &str, new_label: &str) -> TreeResult<Tree> {
        let label = checked_label(new_label)?;
        match self.find_by_id(id) {
            Some(node) if node.label() != label => {
                let root = rewrite(&self.root, id, |node| node.relabeled(label))
                    .ok_or_else(|| TreeError::NotFound(id.to_string()))?;
                debug!(id, label, "renamed node");
                Ok(Tree { root })
            }
            _ => Ok(self.clone()),
        }
    }

    /// Relocate `source_id` with its subtree to the end of folder `target_id`.
    ///
    /// Only the moved node's parent id changes; its descendants are carried
    /// over untouched. Moving a node onto itself or an unknown source is a
    /// no-op.
    pub fn move_node(&self, source_id: &str, target_id: &str) -> TreeResult<Tree> {
        if source_id == target_id {
            return Ok(self.clone());
        }
        let target = self
            .find_by_id(target_id)
            .filter(|node| node.is_folder())
            .ok_or_else(|| TreeError::InvalidTarget(target_id.to_string()))?;
        if !self.contains(source_id) {
            return Ok(self.clone());
        }
        if self.is_descendant(source_id, target_id) {
            return Err(TreeError::CycleDetected {
                node: source_id.to_string(),
                target: target_id.to_string(),
            });
        }

        // The root is an ancestor of every other node, so it was rejected above
        let Some((root, moved)) = detach(&self.root, source_id) else {
            return Ok(self.clone());
        };
        let moved = Arc::new(Node::clone(&moved).reparented(Some(target.id().clone())));
        let root = rewrite(&root, target_id, |folder| folder.with_appended(moved))
            .ok_or_else(|| TreeError::InvalidTarget(target_id.to_string()))?;
        debug!(source = source_id, target = target_id, "moved node");
        Ok(Tree { root })
    }

    /// Install lazily loaded `children` under folder `id`, marking it loaded.
    ///
    /// Each child's parent id is pointed at `id`. Children ids are trusted:
    /// they are not checked against the rest of the tree.
    pub fn graft_lazy_children(&self, id: &str, children: Vec<Node>) -> Tree {
        let Some(node) = self.find_by_id(id) else {
            return self.clone();
        };
        if node.is_leaf() {
            warn!(id, "ignoring lazily loaded children for a leaf");
            return self.clone();
        }

        let parent = node.id().clone();
        let count = children.len();
        let items: Vec<Arc<Node>> = children
            .into_iter()
            .map(|child| {
                if child.parent_id() == Some(&parent) {
                    Arc::new(child)
                } else {
                    Arc::new(child.reparented(Some(parent.clone())))
                }
            })
            .collect();

        match rewrite(&self.root, id, |folder| folder.with_items(items)) {
            Some(root) => {
                debug!(id, count, "grafted lazy children");
                Tree { root }
            }
            None => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Children;
    use crate::testing::sample;

    fn child_ids(tree: &Tree, id: &str) -> Vec<String> {
        tree.find_by_id(id)
            .and_then(Node::children)
            .map(|items| items.iter().map(|c| c.id().to_string()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_insert_appends_under_folder() {
        let tree = sample();
        let (updated, id) = tree.insert("3", "report.txt", false).unwrap();

        let children = updated.find_by_id("3").and_then(Node::children).unwrap();
        assert_eq!(children.len(), 3);
        let new_node = children.last().unwrap();
        assert_eq!(new_node.id(), &id);
        assert_eq!(new_node.label(), "report.txt");
        assert!(new_node.is_leaf());
        assert_eq!(new_node.parent_id().map(NodeId::as_str), Some("3"));

        // Untouched subtrees are shared, not copied
        assert!(Arc::ptr_eq(&tree.root.children().unwrap()[1], &updated.root.children().unwrap()[1]));
        assert_eq!(updated.len(), tree.len() + 1);
        updated.validate().unwrap();
    }

    #[test]
    fn test_insert_folder_starts_loaded_and_empty() {
        let (updated, id) = sample().insert("1", "  docs  ", true).unwrap();
        let node = updated.find_by_id(id.as_str()).unwrap();
        assert_eq!(node.label(), "docs");
        assert_eq!(node.children_state(), Some(&Children::Loaded(Vec::new())));
    }

    #[test]
    fn test_insert_failures_leave_tree_alone() {
        let tree = sample();
        assert_eq!(tree.insert("42", "x", false), Err(TreeError::NotFound("42".into())));
        assert_eq!(tree.insert("8", "x", false), Err(TreeError::NotAFolder("8".into())));
        assert_eq!(tree.insert("3", "   ", false), Err(TreeError::InvalidLabel("   ".into())));
        assert_eq!(tree, sample());
    }

    #[test]
    fn test_insert_into_unloaded_folder_marks_it_loaded() {
        let (updated, id) = sample().insert("9", "notes.md", false).unwrap();
        assert_eq!(child_ids(&updated, "9"), vec![id.to_string()]);
    }

    #[test]
    fn test_delete_removes_subtree() {
        let tree = sample();
        let updated = tree.delete("4").unwrap();
        assert!(updated.find_by_id("4").is_none());
        assert!(updated.find_by_id("7").is_none());
        assert_eq!(updated.len(), tree.len() - 2);
        assert_eq!(child_ids(&updated, "1"), vec!["3", "9", "2"]);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let tree = sample();
        let once = tree.delete("5").unwrap();
        let twice = once.delete("5").unwrap();
        assert_eq!(once, twice);
        assert_eq!(tree.delete("42"), Some(tree.clone()));
    }

    #[test]
    fn test_delete_root_empties_workspace() {
        assert!(sample().delete("1").is_none());
    }

    #[test]
    fn test_rename() {
        let updated = sample().rename("8", " lib.rs ").unwrap();
        assert_eq!(updated.find_by_id("8").map(Node::label), Some("lib.rs"));
        assert_eq!(updated.find_by_id("8").and_then(Node::parent_id).map(NodeId::as_str), Some("3"));
    }

    #[test]
    fn test_rename_noop_cases() {
        let tree = sample();
        assert_eq!(tree.rename("8", "  main.rs\t").unwrap(), tree);
        assert_eq!(tree.rename("42", "other").unwrap(), tree);
        assert_eq!(tree.rename("8", "\n"), Err(TreeError::InvalidLabel("\n".into())));
    }

    #[test]
    fn test_move_relocates_subtree() {
        let tree = sample();
        let updated = tree.move_node("5", "4").unwrap();

        assert_eq!(child_ids(&updated, "3"), vec!["8"]);
        assert_eq!(child_ids(&updated, "4"), vec!["7", "5"]);
        let moved = updated.find_by_id("5").unwrap();
        assert_eq!(moved.parent_id().map(NodeId::as_str), Some("4"));
        // The moved node's own subtree is carried over as is
        assert!(Arc::ptr_eq(
            &tree.find_by_id("5").unwrap().children().unwrap()[0],
            &moved.children().unwrap()[0],
        ));
        updated.validate().unwrap();
    }

    #[test]
    fn test_move_within_same_parent_appends() {
        let updated = sample().move_node("3", "1").unwrap();
        assert_eq!(child_ids(&updated, "1"), vec!["4", "9", "2", "3"]);
    }

    #[test]
    fn test_move_rejects_cycle() {
        let tree = sample();
        let err = tree.move_node("4", "7").unwrap_err();
        assert_eq!(err, TreeError::CycleDetected { node: "4".into(), target: "7".into() });
        assert!(matches!(tree.move_node("1", "3"), Err(TreeError::CycleDetected { .. })));
        assert_eq!(tree, sample());
    }

    #[test]
    fn test_move_invalid_target() {
        let tree = sample();
        assert_eq!(tree.move_node("5", "8"), Err(TreeError::InvalidTarget("8".into())));
        assert_eq!(tree.move_node("5", "42"), Err(TreeError::InvalidTarget("42".into())));
    }

    #[test]
    fn test_move_noops() {
        let tree = sample();
        assert_eq!(tree.move_node("4", "4").unwrap(), tree);
        assert_eq!(tree.move_node("42", "4").unwrap(), tree);
    }

    #[test]
    fn test_graft_lazy_children() {
        let tree = sample();
        let updated = tree.graft_lazy_children(
            "9",
            vec![Node::leaf("c1", "a.txt"), Node::unloaded_folder("c2", "deeper")],
        );

        let node = updated.find_by_id("9").unwrap();
        assert!(!node.needs_load());
        assert_eq!(child_ids(&updated, "9"), vec!["c1", "c2"]);
        assert!(node
            .children()
            .unwrap()
            .iter()
            .all(|c| c.parent_id().map(NodeId::as_str) == Some("9")));
        assert!(updated.find_by_id("c2").unwrap().needs_load());
        updated.validate().unwrap();
    }

    #[test]
    fn test_graft_empty_listing_marks_loaded() {
        let updated = sample().graft_lazy_children("9", Vec::new());
        assert_eq!(
            updated.find_by_id("9").unwrap().children_state(),
            Some(&Children::Loaded(Vec::new()))
        );
    }

    #[test]
    fn test_graft_ignores_unknown_ids_and_leaves() {
        let tree = sample();
        assert_eq!(tree.graft_lazy_children("42", vec![Node::leaf("x", "x")]), tree);
        assert_eq!(tree.graft_lazy_children("8", vec![Node::leaf("x", "x")]), tree);
    }

    #[test]
    fn test_operations_do_not_touch_input() {
        let tree = sample();
        let before = serde_json::to_string(&tree).unwrap();

        let _ = tree.insert("3", "new", true);
        let _ = tree.delete("3");
        let _ = tree.rename("3", "lib");
        let _ = tree.move_node("5", "4");
        let _ = tree.graft_lazy_children("9", vec![Node::leaf("c1", "a")]);

        assert_eq!(serde_json::to_string(&tree).unwrap(), before);
    }
}
