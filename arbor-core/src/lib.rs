// SPDX-License-Identifier: AGPL-3.0-or-later
//! Arbor Core
//!
//! Immutable folder/file tree with pure structural operations, the lazy
//! loader abstraction, and the workspace that holds the current tree.

pub mod error;
pub mod flat;
pub mod loader;
pub mod node;
mod ops;
pub mod tree;
pub mod workspace;

#[cfg(test)]
mod testing;

pub use error::{TreeError, TreeResult};
pub use flat::{FlatKind, FlatNode, FlatTree};
pub use loader::LazyLoader;
pub use node::{Children, Node, NodeId, NodeKind};
pub use tree::{Tree, Walk, DEFAULT_ROOT_LABEL};
pub use workspace::{Expansion, Workspace, WorkspaceConfig};
