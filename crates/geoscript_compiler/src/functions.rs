// SPDX-License-Identifier: MIT OR Apache-2.0
//! Snake-cased node functions.
//!
//! Every registered node kind is callable from scripts under the snake-cased
//! form of its display name (`Join Geometry` -> `join_geometry`).

use crate::naming::snake_case;
use geoscript_graph::{NodeKind, NodeKindRegistry, NodeRole};
use indexmap::IndexMap;
use serde::Serialize;

/// A callable node function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Function {
    /// Script name
    pub name: String,
    /// Host node kind
    pub kind: String,
    /// Category path (`mesh/primitives`)
    pub category_path: String,
}

impl Function {
    fn from_kind(kind: &NodeKind) -> Self {
        let category_path = match &kind.menu_path {
            Some(menu) => format!("{}/{}", kind.category.slug(), menu),
            None => kind.category.slug().to_string(),
        };
        Self {
            name: snake_case(&kind.name),
            kind: kind.id.clone(),
            category_path,
        }
    }
}

/// Function names of every node kind in a descriptor table
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    functions: IndexMap<String, Function>,
}

impl FunctionTable {
    /// Install one function per node kind, first registration wins
    pub fn from_registry(registry: &NodeKindRegistry) -> Self {
        let mut functions: IndexMap<String, Function> = IndexMap::new();
        for kind in registry.kinds() {
            // Boundary nodes are synthesized by the builder, never called
            if matches!(kind.role, NodeRole::GroupInput | NodeRole::GroupOutput) {
                continue;
            }
            let function = Function::from_kind(kind);
            if let Some(existing) = functions.get(&function.name) {
                tracing::debug!(
                    "Function '{}' already bound to {}, skipping {}",
                    function.name,
                    existing.kind,
                    kind.id
                );
                continue;
            }
            functions.insert(function.name.clone(), function);
        }
        Self { functions }
    }

    /// Look up a function
    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    /// All functions, in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Function> {
        self.functions.values()
    }

    /// Functions whose category path starts with `path`
    pub fn in_category<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Function> {
        self.functions
            .values()
            .filter(move |f| f.category_path.starts_with(path))
    }

    /// Number of functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoscript_graph::catalog;

    #[test]
    fn test_functions_are_snake_cased() {
        let table = FunctionTable::from_registry(&catalog::standard_registry());
        assert_eq!(table.get("join_geometry").unwrap().kind, "GeometryNodeJoinGeometry");
        assert_eq!(table.get("cube").unwrap().category_path, "mesh/primitives");
        assert!(table.get("group_input").is_none());
    }

    #[test]
    fn test_category_filter() {
        let table = FunctionTable::from_registry(&catalog::standard_registry());
        assert!(table.in_category("mesh").all(|f| f.category_path.starts_with("mesh")));
        assert!(table.in_category("mesh/primitives").any(|f| f.name == "uv_sphere"));
    }
}
