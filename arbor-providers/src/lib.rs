// SPDX-License-Identifier: AGPL-3.0-or-later
//! Lazy loaders for Arbor
//!
//! - `DemoLoader`: generated listings behind a simulated network delay
//! - `StaticLoader`: fixed listings, optionally read from a JSON document

mod demo;
mod static_loader;

pub use demo::{sample_tree, DemoConfig, DemoLoader};
pub use static_loader::StaticLoader;

use arbor_core::{LazyLoader, TreeError, TreeResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of lazy loaders, keyed by loader id
pub struct LoaderRegistry {
    loaders: HashMap<String, Arc<dyn LazyLoader>>,
}

impl LoaderRegistry {
    pub fn new() -> Self {
        Self { loaders: HashMap::new() }
    }

    pub fn register(&mut self, loader: Arc<dyn LazyLoader>) {
        self.loaders.insert(loader.id().to_string(), loader);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn LazyLoader>> {
        self.loaders.get(id).cloned()
    }

    pub fn get_or_err(&self, id: &str) -> TreeResult<Arc<dyn LazyLoader>> {
        self.get(id)
            .ok_or_else(|| TreeError::load_failed(id, "no such loader registered"))
    }

    pub fn list(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.loaders.keys().map(|s| s.as_str()).collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
