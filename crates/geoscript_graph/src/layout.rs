// SPDX-License-Identifier: MIT OR Apache-2.0
//! Column layout of a graph's nodes.
//!
//! Node sizes are estimated from port and property counts so the layout can
//! be computed without any UI.

use crate::graph::Graph;
use crate::node::{Node, NodeId};
use serde::{Deserialize, Serialize};

/// Size constants and spacing of the column layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Height of the node header
    pub header_height: f32,
    /// Height of one socket row
    pub link_height: f32,
    /// Height of one property row
    pub property_height: f32,
    /// Extra height of an unlinked vector input (three value fields)
    pub vector_height: f32,
    /// Host UI scale factor
    pub ui_scale: f32,
    /// Horizontal and vertical padding between nodes
    pub padding: [f32; 2],
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            header_height: 20.0,
            link_height: 28.0,
            property_height: 28.0,
            vector_height: 84.0,
            ui_scale: 1.0,
            padding: [50.0, 25.0],
        }
    }
}

/// Error when arranging a graph
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// Scale is zero, negative or not finite
    #[error("Invalid UI scale {0}")]
    InvalidScale(f32),

    /// A scanned node vanished from the graph
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),
}

/// Estimated height of a node
pub fn node_height(graph: &Graph, node: &Node, options: &LayoutOptions) -> f32 {
    let inputs = node.enabled_inputs().count() as f32;
    let outputs = node.enabled_outputs().count() as f32;
    let properties = node.properties.len() as f32;
    let unset_vectors = node
        .enabled_inputs()
        .filter(|p| p.socket_type.is_vector() && !graph.is_linked(p.id))
        .count() as f32;

    (options.header_height
        + outputs * options.link_height
        + properties * options.property_height
        + inputs * options.link_height
        + unset_vectors * options.vector_height)
        * options.ui_scale
}

/// Group nodes into columns, producers left of their consumers
pub fn columns(graph: &Graph) -> Vec<Vec<NodeId>> {
    // Consumers first, so every node finds its dependents already placed
    let scan: Vec<NodeId> = match graph.topological_order() {
        Ok(order) => order.into_iter().rev().collect(),
        Err(_) => {
            tracing::debug!("Graph '{}' has a cycle, scanning in insertion order", graph.name);
            graph.node_ids().collect::<Vec<_>>().into_iter().rev().collect()
        }
    };

    let mut columns: Vec<Vec<NodeId>> = Vec::new();
    for node_id in scan {
        let feeds = |column: &Vec<NodeId>| {
            graph
                .links()
                .any(|l| l.from_node == node_id && column.contains(&l.to_node))
        };
        match columns.iter().position(feeds) {
            Some(0) => columns.insert(0, vec![node_id]),
            Some(index) => columns[index - 1].push(node_id),
            None => match columns.last_mut() {
                Some(last) => last.push(node_id),
                None => columns.push(vec![node_id]),
            },
        }
    }
    columns
}

/// Assign positions to every node of the graph
pub fn arrange(graph: &mut Graph, options: &LayoutOptions) -> Result<(), LayoutError> {
    if !options.ui_scale.is_finite() || options.ui_scale <= 0.0 {
        return Err(LayoutError::InvalidScale(options.ui_scale));
    }

    let columns = columns(graph);
    let mut placements = Vec::with_capacity(graph.node_count());
    let mut x = 0.0;
    for column in &columns {
        let mut widest: f32 = 0.0;
        let mut y = 0.0;
        for node_id in column {
            let node = graph.node(*node_id).ok_or(LayoutError::NodeNotFound(*node_id))?;
            let height = node_height(graph, node, options);
            widest = widest.max(node.width);
            placements.push((*node_id, [x, y]));
            y -= height + options.padding[1];
        }
        x += widest + options.padding[0];
    }

    for (node_id, position) in placements {
        if let Some(node) = graph.node_mut(node_id) {
            node.position = position;
        }
    }
    tracing::debug!("Arranged '{}' into {} columns", graph.name, columns.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    fn chain(graph: &mut Graph, kinds: &[&str]) -> Vec<NodeId> {
        let registry = catalog::standard_registry();
        kinds
            .iter()
            .map(|kind| graph.add_node(registry.create_node(kind).unwrap()))
            .collect()
    }

    fn link(graph: &mut Graph, from: NodeId, to: NodeId, input: usize) {
        let from_port = graph.node(from).unwrap().outputs[0].id;
        let to_port = graph.node(to).unwrap().inputs[input].id;
        graph.connect(from, from_port, to, to_port).unwrap();
    }

    #[test]
    fn test_producers_left_of_consumers() {
        let mut graph = Graph::new("test");
        // Declared consumer first to make sure order does not matter
        let ids = chain(&mut graph, &["GeometryNodeSetPosition", "GeometryNodeTransform", "GeometryNodeMeshCube"]);
        let (set_position, transform, cube) = (ids[0], ids[1], ids[2]);
        link(&mut graph, cube, transform, 0);
        link(&mut graph, transform, set_position, 0);

        arrange(&mut graph, &LayoutOptions::default()).unwrap();
        let x = |id| graph.node(id).unwrap().position[0];
        assert!(x(cube) < x(transform));
        assert!(x(transform) < x(set_position));
    }

    #[test]
    fn test_siblings_stack_downward() {
        let mut graph = Graph::new("test");
        let ids = chain(&mut graph, &["GeometryNodeMeshCube", "GeometryNodeMeshCube", "GeometryNodeJoinGeometry"]);
        link(&mut graph, ids[0], ids[2], 0);
        link(&mut graph, ids[1], ids[2], 0);

        arrange(&mut graph, &LayoutOptions::default()).unwrap();
        let a = graph.node(ids[0]).unwrap().position;
        let b = graph.node(ids[1]).unwrap().position;
        assert_eq!(a[0], b[0]);
        assert_ne!(a[1], b[1]);
        assert!(a[1].min(b[1]) < 0.0);
    }

    #[test]
    fn test_node_height_counts_unlinked_vectors() {
        let graph = Graph::new("test");
        let registry = catalog::standard_registry();
        let cube = registry.create_node("GeometryNodeMeshCube").unwrap();
        let options = LayoutOptions::default();
        // Header, one output, four inputs, one unlinked vector
        let expected = 20.0 + 28.0 + 4.0 * 28.0 + 84.0;
        assert_eq!(node_height(&graph, &cube, &options), expected);
    }

    #[test]
    fn test_rejects_invalid_scale() {
        let mut graph = Graph::new("test");
        let options = LayoutOptions {
            ui_scale: 0.0,
            ..LayoutOptions::default()
        };
        assert!(matches!(arrange(&mut graph, &options), Err(LayoutError::InvalidScale(_))));
    }
}
