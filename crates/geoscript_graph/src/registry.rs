// SPDX-License-Identifier: MIT OR Apache-2.0
//! Registry of available node kinds.
//!
//! The registry is the descriptor table exported from the host: it is built
//! once (from the built-in catalog or a RON file) and only read afterwards.

use crate::node::{Node, NodeCategory, NodeKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current descriptor table format version
pub const REGISTRY_FORMAT_VERSION: u32 = 1;

/// Registry of available node kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeKindRegistry {
    /// Descriptor table format version
    pub version: u32,
    /// Registered kinds by host ID
    kinds: IndexMap<String, NodeKind>,
}

impl NodeKindRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            version: REGISTRY_FORMAT_VERSION,
            kinds: IndexMap::new(),
        }
    }

    /// Register a node kind
    pub fn register(&mut self, kind: NodeKind) {
        if self.kinds.contains_key(&kind.id) {
            tracing::debug!("Replacing node kind {}", kind.id);
        }
        self.kinds.insert(kind.id.clone(), kind);
    }

    /// Get a node kind by ID
    pub fn get(&self, id: &str) -> Option<&NodeKind> {
        self.kinds.get(id)
    }

    /// Get all registered kinds
    pub fn kinds(&self) -> impl Iterator<Item = &NodeKind> {
        self.kinds.values()
    }

    /// Get kinds by category
    pub fn kinds_in_category(&self, category: NodeCategory) -> impl Iterator<Item = &NodeKind> {
        self.kinds.values().filter(move |k| k.category == category)
    }

    /// Number of registered kinds
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Create a node from a kind ID
    pub fn create_node(&self, kind_id: &str) -> Option<Node> {
        self.get(kind_id).map(Node::new)
    }

    /// Serialize to RON format
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Deserialize from RON format
    pub fn from_ron(s: &str) -> Result<Self, RegistryError> {
        let registry: Self = ron::from_str(s)?;
        if registry.version > REGISTRY_FORMAT_VERSION {
            return Err(RegistryError::UnsupportedVersion(registry.version));
        }
        Ok(registry)
    }

    /// Load a descriptor table from a file
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let contents = std::fs::read_to_string(path)?;
        let registry = Self::from_ron(&contents)?;
        tracing::info!("Loaded {} node kinds from {}", registry.len(), path.display());
        Ok(registry)
    }
}

impl Default for NodeKindRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Error when loading a descriptor table
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// File could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not a valid descriptor table
    #[error("Invalid descriptor table: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Table was written by a newer exporter
    #[error("Descriptor table version {0} is newer than supported version {REGISTRY_FORMAT_VERSION}")]
    UnsupportedVersion(u32),
}
