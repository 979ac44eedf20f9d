// SPDX-License-Identifier: AGPL-3.0-or-later
//! Shared fixtures for unit tests

use crate::{Node, Tree};

/// ```text
/// 1 root
/// ├── 3 src
/// │   ├── 5 utils
/// │   │   └── 6 fmt.rs
/// │   └── 8 main.rs
/// ├── 4 components
/// │   └── 7 widgets
/// ├── 9 remote (not loaded)
/// └── 2 Cargo.toml
/// ```
pub(crate) fn sample() -> Tree {
    Tree::from_root(Node::folder("1", "root").with_children([
        Node::folder("3", "src").with_children([
            Node::folder("5", "utils").with_children([Node::leaf("6", "fmt.rs")]),
            Node::leaf("8", "main.rs"),
        ]),
        Node::folder("4", "components").with_children([Node::folder("7", "widgets")]),
        Node::unloaded_folder("9", "remote"),
        Node::leaf("2", "Cargo.toml"),
    ]))
    .unwrap()
}
