// SPDX-License-Identifier: AGPL-3.0-or-later
//! Fixed listings keyed by folder id

use arbor_core::{LazyLoader, Node, NodeId, TreeError, TreeResult};
use async_trait::async_trait;
use std::collections::HashMap;

/// Serves pre-recorded listings. Folders without a listing fail to load.
#[derive(Debug, Clone, Default)]
pub struct StaticLoader {
    listings: HashMap<NodeId, Vec<Node>>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing(mut self, folder_id: impl Into<NodeId>, children: Vec<Node>) -> Self {
        self.listings.insert(folder_id.into(), children);
        self
    }

    /// Read listings from a JSON object mapping folder ids to node arrays
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let listings = serde_json::from_str(json)?;
        Ok(Self { listings })
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

#[async_trait]
impl LazyLoader for StaticLoader {
    fn id(&self) -> &str {
        "static"
    }

    async fn load_children(&self, folder_id: &NodeId) -> TreeResult<Vec<Node>> {
        self.listings
            .get(folder_id)
            .cloned()
            .ok_or_else(|| TreeError::load_failed(folder_id.as_str(), "no listing recorded"))
    }
}
