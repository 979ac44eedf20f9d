// SPDX-License-Identifier: AGPL-3.0-or-later
//! Demo data: a small project tree and a loader that invents folder
//! contents after a delay, the way a slow remote listing would.

use arbor_core::{LazyLoader, Node, NodeId, Tree, TreeResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Demo loader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Simulated round-trip time per listing
    pub latency_ms: u64,
    /// Entries generated per folder
    pub fanout: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self { latency_ms: 300, fanout: 3 }
    }
}

/// Generates listings for any folder.
///
/// Children of folder `F` get ids `F.1`, `F.2`, ... The first child is
/// itself an unloaded folder so the tree can be expanded indefinitely.
#[derive(Debug, Clone, Default)]
pub struct DemoLoader {
    config: DemoConfig,
}

impl DemoLoader {
    pub fn new(config: DemoConfig) -> Self {
        Self { config }
    }

    fn listing(&self, folder_id: &NodeId) -> Vec<Node> {
        (1..=self.config.fanout)
            .map(|n| {
                let id = format!("{folder_id}.{n}");
                if n == 1 {
                    Node::unloaded_folder(id, format!("folder-{n}"))
                } else {
                    Node::leaf(id, format!("file-{n}.txt"))
                }
            })
            .collect()
    }
}

#[async_trait]
impl LazyLoader for DemoLoader {
    fn id(&self) -> &str {
        "demo"
    }

    async fn load_children(&self, folder_id: &NodeId) -> TreeResult<Vec<Node>> {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }
        let listing = self.listing(folder_id);
        debug!(folder = %folder_id, count = listing.len(), "generated demo listing");
        Ok(listing)
    }
}

/// Tree shown on first run
pub fn sample_tree() -> TreeResult<Tree> {
    let root = Node::folder("1", "root").with_children([
        Node::folder("2", "public").with_children([Node::leaf("6", "index.html")]),
        Node::folder("3", "src").with_children([
            Node::folder("5", "utils").with_children([Node::leaf("10", "format.ts")]),
            Node::leaf("11", "App.tsx"),
            Node::leaf("12", "main.tsx"),
        ]),
        Node::folder("4", "components").with_children([Node::unloaded_folder("7", "widgets")]),
        Node::unloaded_folder("8", "assets"),
        Node::leaf("9", "package.json"),
    ]);
    Tree::from_root(root)
}
