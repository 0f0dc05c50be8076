// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes, links and the interface.

use crate::interface::{Interface, InterfaceSocket};
use crate::link::{Link, LinkId};
use crate::node::{Node, NodeId, NodeRole};
use crate::port::{Port, PortDirection, PortId, SocketType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A node graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Graph name
    pub name: String,
    /// Nodes in the graph, in creation order
    nodes: IndexMap<NodeId, Node>,
    /// Links between nodes, in creation order
    links: IndexMap<LinkId, Link>,
    /// Declared inputs and outputs
    interface: Interface,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            links: IndexMap::new(),
            interface: Interface::default(),
        }
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        if matches!(self.nodes[&id].role, NodeRole::GroupInput | NodeRole::GroupOutput) {
            self.sync_boundary_nodes();
        }
        id
    }

    /// Remove every node and link, keeping the interface
    pub fn clear(&mut self) {
        self.links.clear();
        self.nodes.clear();
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The interface input source node
    pub fn source_node(&self) -> Option<&Node> {
        self.nodes().find(|n| n.role == NodeRole::GroupInput)
    }

    /// Every interface output sink node
    pub fn sink_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes().filter(|n| n.role == NodeRole::GroupOutput)
    }

    /// Add a link from an output port to an input port
    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_port: PortId,
        to_node: NodeId,
        to_port: PortId,
    ) -> Result<LinkId, LinkError> {
        // Validate nodes exist
        let source_node = self.nodes.get(&from_node)
            .ok_or(LinkError::NodeNotFound(from_node))?;
        let target_node = self.nodes.get(&to_node)
            .ok_or(LinkError::NodeNotFound(to_node))?;

        // Validate ports exist
        let source_port = source_node.port(&from_port)
            .ok_or(LinkError::PortNotFound(from_port))?;
        let target_port = target_node.port(&to_port)
            .ok_or(LinkError::PortNotFound(to_port))?;

        if source_port.direction != PortDirection::Output
            || target_port.direction != PortDirection::Input
        {
            return Err(LinkError::WrongDirection);
        }

        // Validate socket types are compatible
        if !source_port.can_connect(target_port) {
            return Err(LinkError::IncompatiblePorts {
                from: source_port.socket_type.clone(),
                to: target_port.socket_type.clone(),
            });
        }

        // Single inputs take one link
        if !target_port.multi_input && self.links.values().any(|l| l.to_port == to_port) {
            return Err(LinkError::PortAlreadyConnected(target_port.name.clone()));
        }

        // Prevent self-loops
        if from_node == to_node {
            return Err(LinkError::SelfLoop);
        }

        let link = Link::new(from_node, from_port, to_node, to_port);
        let id = link.id;
        self.links.insert(id, link);
        Ok(id)
    }

    /// Get a link by ID
    pub fn link(&self, link_id: LinkId) -> Option<&Link> {
        self.links.get(&link_id)
    }

    /// Get all links, in creation order
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    /// Get links from a specific port
    pub fn links_from(&self, port_id: PortId) -> impl Iterator<Item = &Link> {
        self.links.values().filter(move |l| l.from_port == port_id)
    }

    /// Get links to a specific port, in append order
    pub fn links_to(&self, port_id: PortId) -> impl Iterator<Item = &Link> {
        self.links.values().filter(move |l| l.to_port == port_id)
    }

    /// Get links involving a node
    pub fn links_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Link> {
        self.links.values().filter(move |l| l.involves_node(node_id))
    }

    /// Whether an input port has any incoming link
    pub fn is_linked(&self, port_id: PortId) -> bool {
        self.links.values().any(|l| l.to_port == port_id)
    }

    /// Get the number of links
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// The declared interface
    pub fn interface(&self) -> &Interface {
        &self.interface
    }

    /// Append an input parameter
    pub fn add_input(&mut self, entry: InterfaceSocket) -> usize {
        self.interface.inputs.push(entry);
        self.sync_boundary_nodes();
        self.interface.inputs.len() - 1
    }

    /// Replace the input parameter at `index` with a fresh entry
    pub fn replace_input(&mut self, index: usize, entry: InterfaceSocket) {
        if let Some(slot) = self.interface.inputs.get_mut(index) {
            *slot = entry;
            self.sync_boundary_nodes();
        }
    }

    /// Mutable access to an input parameter
    pub fn input_mut(&mut self, index: usize) -> Option<&mut InterfaceSocket> {
        self.interface.inputs.get_mut(index)
    }

    /// Drop input parameters beyond `len`
    pub fn truncate_inputs(&mut self, len: usize) {
        self.interface.inputs.truncate(len);
        self.sync_boundary_nodes();
    }

    /// Append an output result
    pub fn add_output(&mut self, entry: InterfaceSocket) -> usize {
        self.interface.outputs.push(entry);
        self.sync_boundary_nodes();
        self.interface.outputs.len() - 1
    }

    /// Remove every output result
    pub fn clear_outputs(&mut self) {
        self.interface.outputs.clear();
        self.sync_boundary_nodes();
    }

    /// Rebuild boundary node ports from the interface.
    ///
    /// Ports keep their identity by position so existing links stay valid;
    /// links into dropped ports are removed.
    pub fn sync_boundary_nodes(&mut self) {
        let mut dropped = Vec::new();
        for node in self.nodes.values_mut() {
            let (ports, entries, direction) = match node.role {
                NodeRole::GroupInput => (&mut node.outputs, &self.interface.inputs, PortDirection::Output),
                NodeRole::GroupOutput => (&mut node.inputs, &self.interface.outputs, PortDirection::Input),
                _ => continue,
            };
            dropped.extend(ports.iter().skip(entries.len()).map(|p| p.id));
            ports.truncate(entries.len());
            for (index, entry) in entries.iter().enumerate() {
                let id = ports.get(index).map(|p| p.id).unwrap_or_default();
                let port = entry.to_port(Port::new(id, &entry.name, entry.socket_type.clone(), direction));
                match ports.get_mut(index) {
                    Some(slot) => *slot = port,
                    None => ports.push(port),
                }
            }
        }
        if !dropped.is_empty() {
            self.links.retain(|_, l| !dropped.iter().any(|p| l.involves_port(*p)));
        }
    }

    /// Pair a zone entry node with its exit node
    pub fn pair_zone(&mut self, entry: NodeId, exit: NodeId) -> Result<(), ZoneError> {
        let exit_role = self.nodes.get(&exit).ok_or(ZoneError::NodeNotFound(exit))?.role;
        let entry_node = self.nodes.get_mut(&entry).ok_or(ZoneError::NodeNotFound(entry))?;
        let paired = matches!(
            (entry_node.role, exit_role),
            (NodeRole::RepeatInput, NodeRole::RepeatOutput)
                | (NodeRole::SimulationInput, NodeRole::SimulationOutput)
        );
        if !paired {
            return Err(ZoneError::NotAZone(entry));
        }
        entry_node.paired_output = Some(exit);
        Ok(())
    }

    /// Remove every state item of a zone, with the links touching them
    pub fn clear_zone_items(&mut self, entry: NodeId) -> Result<(), ZoneError> {
        let exit = self.zone_exit(entry)?;
        let mut dropped = Vec::new();
        for id in [entry, exit] {
            if let Some(node) = self.nodes.get_mut(&id) {
                dropped.extend(node.ports().filter(|p| p.zone_item).map(|p| p.id));
                node.inputs.retain(|p| !p.zone_item);
                node.outputs.retain(|p| !p.zone_item);
            }
        }
        self.links.retain(|_, l| !dropped.iter().any(|p| l.involves_port(*p)));
        Ok(())
    }

    /// Append a state item to a zone.
    ///
    /// Adds one input and one output port on both the entry and the exit node.
    pub fn add_zone_item(
        &mut self,
        entry: NodeId,
        name: &str,
        socket_type: SocketType,
    ) -> Result<(), ZoneError> {
        let exit = self.zone_exit(entry)?;
        for id in [entry, exit] {
            let node = self.nodes.get_mut(&id).ok_or(ZoneError::NodeNotFound(id))?;
            let mut input = Port::input(name, socket_type.clone());
            input.zone_item = true;
            let mut output = Port::output(name, socket_type.clone());
            output.zone_item = true;
            node.inputs.push(input);
            node.outputs.push(output);
        }
        Ok(())
    }

    /// Exit node paired with a zone entry node
    pub fn zone_exit(&self, entry: NodeId) -> Result<NodeId, ZoneError> {
        self.nodes
            .get(&entry)
            .ok_or(ZoneError::NodeNotFound(entry))?
            .paired_output
            .ok_or(ZoneError::NotAZone(entry))
    }

    /// Get nodes in dependency order (producers before consumers)
    pub fn topological_order(&self) -> Result<Vec<NodeId>, CycleError> {
        let mut visited = HashSet::new();
        let mut temp_mark = HashSet::new();
        let mut order = Vec::new();

        for node_id in self.nodes.keys() {
            if !visited.contains(node_id) {
                self.visit(*node_id, &mut visited, &mut temp_mark, &mut order)?;
            }
        }

        Ok(order)
    }

    fn visit(
        &self,
        node_id: NodeId,
        visited: &mut HashSet<NodeId>,
        temp_mark: &mut HashSet<NodeId>,
        order: &mut Vec<NodeId>,
    ) -> Result<(), CycleError> {
        if temp_mark.contains(&node_id) {
            return Err(CycleError);
        }
        if visited.contains(&node_id) {
            return Ok(());
        }

        temp_mark.insert(node_id);

        // Visit all nodes that this node depends on
        for link in self.links_for_node(node_id) {
            if link.to_node == node_id {
                self.visit(link.from_node, visited, temp_mark, order)?;
            }
        }

        temp_mark.remove(&node_id);
        visited.insert(node_id);
        order.push(node_id);

        Ok(())
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Error when creating a link
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Port not found
    #[error("Port not found: {0:?}")]
    PortNotFound(PortId),

    /// Link must run from an output to an input
    #[error("Links must run from an output port to an input port")]
    WrongDirection,

    /// Incompatible socket types
    #[error("Incompatible socket types: {from} -> {to}")]
    IncompatiblePorts {
        /// Source socket type
        from: SocketType,
        /// Target socket type
        to: SocketType,
    },

    /// Single input is already linked
    #[error("Input '{0}' is already connected")]
    PortAlreadyConnected(String),

    /// Self-loop not allowed
    #[error("Self-loop not allowed")]
    SelfLoop,
}

/// Error when editing a zone
#[derive(Debug, thiserror::Error)]
pub enum ZoneError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Node is not a paired zone entry
    #[error("Node {0:?} is not a paired zone entry")]
    NotAZone(NodeId),
}

/// Error when graph contains a cycle
#[derive(Debug, thiserror::Error)]
#[error("Graph contains a cycle")]
pub struct CycleError;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::node::Node;

    fn node(kind: &str) -> Node {
        catalog::standard_registry().create_node(kind).unwrap()
    }

    #[test]
    fn test_connect_validates_types() {
        let mut graph = Graph::new("test");
        let value = graph.add_node(node("ShaderNodeValue"));
        let join = graph.add_node(node("GeometryNodeJoinGeometry"));

        let from = graph.node(value).unwrap().outputs[0].id;
        let to = graph.node(join).unwrap().inputs[0].id;
        assert!(matches!(
            graph.connect(value, from, join, to),
            Err(LinkError::IncompatiblePorts { .. })
        ));
    }

    #[test]
    fn test_multi_input_accepts_many_links() {
        let mut graph = Graph::new("test");
        let cubes: Vec<_> = (0..3).map(|_| graph.add_node(node("GeometryNodeMeshCube"))).collect();
        let join = graph.add_node(node("GeometryNodeJoinGeometry"));
        let to = graph.node(join).unwrap().inputs[0].id;

        for cube in &cubes {
            let from = graph.node(*cube).unwrap().outputs[0].id;
            graph.connect(*cube, from, join, to).unwrap();
        }
        let sources: Vec<_> = graph.links_to(to).map(|l| l.from_node).collect();
        assert_eq!(sources, cubes);
    }

    #[test]
    fn test_single_input_rejects_second_link() {
        let mut graph = Graph::new("test");
        let a = graph.add_node(node("ShaderNodeValue"));
        let b = graph.add_node(node("ShaderNodeValue"));
        let math = graph.add_node(node("ShaderNodeMath"));
        let to = graph.node(math).unwrap().inputs[0].id;

        let from_a = graph.node(a).unwrap().outputs[0].id;
        let from_b = graph.node(b).unwrap().outputs[0].id;
        graph.connect(a, from_a, math, to).unwrap();
        assert!(matches!(
            graph.connect(b, from_b, math, to),
            Err(LinkError::PortAlreadyConnected(_))
        ));
    }

    #[test]
    fn test_boundary_nodes_follow_interface() {
        let mut graph = Graph::new("test");
        let input = graph.add_node(node(crate::node::GROUP_INPUT_KIND));
        graph.add_input(InterfaceSocket::new("Size", SocketType::Float));
        graph.add_input(InterfaceSocket::new("Count", SocketType::Int));
        assert_eq!(graph.node(input).unwrap().outputs.len(), 2);

        let kept = graph.node(input).unwrap().outputs[0].id;
        graph.truncate_inputs(1);
        let outputs = &graph.node(input).unwrap().outputs;
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].id, kept);
    }

    #[test]
    fn test_zone_items_rebuild() {
        let mut graph = Graph::new("test");
        let entry = graph.add_node(node("GeometryNodeRepeatInput"));
        let exit = graph.add_node(node("GeometryNodeRepeatOutput"));
        graph.pair_zone(entry, exit).unwrap();

        graph.add_zone_item(entry, "Geometry", SocketType::Geometry).unwrap();
        graph.add_zone_item(entry, "Value", SocketType::Float).unwrap();
        // Iterations plus two items
        assert_eq!(graph.node(entry).unwrap().inputs.len(), 3);
        assert_eq!(graph.node(exit).unwrap().outputs.len(), 2);

        graph.clear_zone_items(entry).unwrap();
        assert_eq!(graph.node(entry).unwrap().inputs.len(), 1);
        assert!(graph.node(exit).unwrap().outputs.is_empty());
    }

    #[test]
    fn test_topological_order_is_dependency_first() {
        let mut graph = Graph::new("test");
        let math = graph.add_node(node("ShaderNodeMath"));
        let value = graph.add_node(node("ShaderNodeValue"));
        let from = graph.node(value).unwrap().outputs[0].id;
        let to = graph.node(math).unwrap().inputs[0].id;
        graph.connect(value, from, math, to).unwrap();

        assert_eq!(graph.topological_order().unwrap(), vec![value, math]);
    }
}
