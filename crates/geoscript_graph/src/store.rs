// SPDX-License-Identifier: MIT OR Apache-2.0
//! Named graph storage.

use crate::graph::Graph;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current store file format version
pub const STORE_FORMAT_VERSION: u32 = 1;

/// All graphs of a document, by name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStore {
    /// Store format version
    pub version: u32,
    graphs: IndexMap<String, Graph>,
}

impl GraphStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            version: STORE_FORMAT_VERSION,
            graphs: IndexMap::new(),
        }
    }

    /// Locate a graph, creating it when missing
    pub fn get_or_create(&mut self, name: &str) -> &mut Graph {
        self.graphs.entry(name.to_string()).or_insert_with(|| {
            tracing::debug!("Creating graph '{name}'");
            Graph::new(name)
        })
    }

    /// Get a graph by name
    pub fn get(&self, name: &str) -> Option<&Graph> {
        self.graphs.get(name)
    }

    /// Get a mutable graph by name
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Graph> {
        self.graphs.get_mut(name)
    }

    /// Whether a graph exists
    pub fn contains(&self, name: &str) -> bool {
        self.graphs.contains_key(name)
    }

    /// Remove a graph
    pub fn remove(&mut self, name: &str) -> Option<Graph> {
        self.graphs.shift_remove(name)
    }

    /// All graphs
    pub fn graphs(&self) -> impl Iterator<Item = &Graph> {
        self.graphs.values()
    }

    /// Serialize to RON format
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Deserialize from RON format
    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }

    /// Save the store to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let ron_str = self.to_ron().map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, ron_str)
    }

    /// Load a store from a file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let store = Self::from_ron(&contents).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        if store.version > STORE_FORMAT_VERSION {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "Store version {} is newer than supported version {}",
                    store.version, STORE_FORMAT_VERSION
                ),
            ));
        }
        Ok(store)
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}
