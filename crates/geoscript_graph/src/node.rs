// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node kinds and node instances.

use crate::port::{Port, PortId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Host identifier of the synthesized interface input node
pub const GROUP_INPUT_KIND: &str = "NodeGroupInput";
/// Host identifier of the synthesized interface output node
pub const GROUP_OUTPUT_KIND: &str = "NodeGroupOutput";
/// Host identifier of a node referencing another graph
pub const GROUP_KIND: &str = "GeometryNodeGroup";
/// Property holding the referenced graph of a group node
pub const NODE_TREE_PROPERTY: &str = "node_tree";

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Node kind category (the host's add-menu sections)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Constants and scene inputs
    Input,
    /// Interface boundary nodes
    Output,
    /// Generic geometry operations
    Geometry,
    /// Mesh primitives and operations
    Mesh,
    /// Curve primitives and operations
    Curve,
    /// Point operations
    Point,
    /// Instancing
    Instances,
    /// Named attributes
    Attribute,
    /// Scalar and vector math
    Math,
    /// Field utilities (compare, boolean math, random values)
    Utilities,
    /// Repeat and simulation zones
    Zone,
    /// Graph references
    Group,
    /// Custom/user-defined
    Custom,
}

impl NodeCategory {
    /// Lowercase slug used in menu paths and generated names
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
            Self::Geometry => "geometry",
            Self::Mesh => "mesh",
            Self::Curve => "curve",
            Self::Point => "point",
            Self::Instances => "instances",
            Self::Attribute => "attribute",
            Self::Math => "math",
            Self::Utilities => "utilities",
            Self::Zone => "zone",
            Self::Group => "group",
            Self::Custom => "custom",
        }
    }
}

/// Structural role of a node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NodeRole {
    /// Ordinary computation node
    #[default]
    Regular,
    /// Interface input source
    GroupInput,
    /// Interface output sink
    GroupOutput,
    /// Reference to another graph
    Group,
    /// Entry node of a repeat zone
    RepeatInput,
    /// Exit node of a repeat zone
    RepeatOutput,
    /// Entry node of a simulation zone
    SimulationInput,
    /// Exit node of a simulation zone
    SimulationOutput,
}

impl NodeRole {
    /// Whether this role is a zone entry node
    pub fn is_zone_input(&self) -> bool {
        matches!(self, Self::RepeatInput | Self::SimulationInput)
    }

    /// Whether this role is a zone exit node
    pub fn is_zone_output(&self) -> bool {
        matches!(self, Self::RepeatOutput | Self::SimulationOutput)
    }
}

/// Declared value type of a node property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyKind {
    /// Boolean flag
    Bool,
    /// Integer
    Int,
    /// Float
    Float,
    /// Free text
    String,
    /// 3D vector
    Vector,
    /// One of a closed set of identifiers
    Enum(Vec<String>),
    /// Name of another graph
    GraphRef,
}

impl PropertyKind {
    /// Enum from string slices
    pub fn enumeration(cases: &[&str]) -> Self {
        Self::Enum(cases.iter().map(|c| (*c).to_string()).collect())
    }

    /// Short type name used in listings
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::String => "String",
            Self::Vector => "Vector",
            Self::Enum(_) => "Enum",
            Self::GraphRef => "Graph",
        }
    }
}

/// Value of a node property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i32),
    /// Float
    Float(f32),
    /// Text
    String(String),
    /// 3D vector
    Vector([f32; 3]),
    /// Enum case identifier
    Enum(String),
    /// Graph name
    GraphRef(String),
}

impl PropertyValue {
    /// Enum case identifier, if this is an enum value
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            Self::Enum(case) => Some(case),
            _ => None,
        }
    }
}

/// Custom property declaration of a node kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDecl {
    /// Property identifier
    pub name: String,
    /// Declared type
    pub kind: PropertyKind,
    /// Initial value
    pub default: PropertyValue,
}

impl PropertyDecl {
    /// Enum property defaulting to the first case
    pub fn enumeration(name: &str, cases: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            kind: PropertyKind::enumeration(cases),
            default: PropertyValue::Enum(cases.first().copied().unwrap_or_default().to_string()),
        }
    }

    /// Property of a plain value type
    pub fn value(name: &str, kind: PropertyKind, default: PropertyValue) -> Self {
        Self {
            name: name.to_string(),
            kind,
            default,
        }
    }

    /// Check that a value fits this declaration
    pub fn accepts(&self, value: &PropertyValue) -> bool {
        match (&self.kind, value) {
            (PropertyKind::Enum(cases), PropertyValue::Enum(case)) => cases.contains(case),
            (PropertyKind::Bool, PropertyValue::Bool(_))
            | (PropertyKind::Int, PropertyValue::Int(_))
            | (PropertyKind::Float, PropertyValue::Float(_))
            | (PropertyKind::String, PropertyValue::String(_))
            | (PropertyKind::Vector, PropertyValue::Vector(_))
            | (PropertyKind::GraphRef, PropertyValue::GraphRef(_)) => true,
            _ => false,
        }
    }
}

/// Node kind descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeKind {
    /// Host identifier (`GeometryNodeMeshCube`, ...)
    pub id: String,
    /// Display name
    pub name: String,
    /// Category
    pub category: NodeCategory,
    /// Add-menu path below the category, if any
    #[serde(default)]
    pub menu_path: Option<String>,
    /// Structural role
    #[serde(default)]
    pub role: NodeRole,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Default input ports
    pub inputs: Vec<Port>,
    /// Default output ports
    pub outputs: Vec<Port>,
    /// Custom properties
    #[serde(default)]
    pub properties: Vec<PropertyDecl>,
}

impl NodeKind {
    /// Start a kind descriptor with no ports or properties
    pub fn new(id: &str, name: &str, category: NodeCategory) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category,
            menu_path: None,
            role: NodeRole::Regular,
            description: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Set the structural role
    pub fn with_role(mut self, role: NodeRole) -> Self {
        self.role = role;
        self
    }

    /// Set the add-menu path
    pub fn with_menu(mut self, path: &str) -> Self {
        self.menu_path = Some(path.to_string());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Append input ports
    pub fn with_inputs(mut self, ports: impl IntoIterator<Item = Port>) -> Self {
        self.inputs.extend(ports);
        self
    }

    /// Append output ports
    pub fn with_outputs(mut self, ports: impl IntoIterator<Item = Port>) -> Self {
        self.outputs.extend(ports);
        self
    }

    /// Append a custom property
    pub fn with_property(mut self, decl: PropertyDecl) -> Self {
        self.properties.push(decl);
        self
    }
}

/// Error when assigning a node property
#[derive(Debug, thiserror::Error)]
pub enum PropertyError {
    /// Node kind has no such property
    #[error("Node '{node}' has no property '{property}'")]
    Unknown {
        /// Node display name
        node: String,
        /// Property name
        property: String,
    },

    /// Value does not fit the declared type or enum cases
    #[error("Invalid value {value:?} for property '{property}'")]
    InvalidValue {
        /// Property name
        property: String,
        /// Rejected value
        value: PropertyValue,
    },
}

/// A custom property on a node instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    /// Declaration copied from the kind
    pub decl: PropertyDecl,
    /// Current value
    pub value: PropertyValue,
}

/// Default node width in graph units
pub const DEFAULT_NODE_WIDTH: f32 = 140.0;

/// A node instance in the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Node kind ID
    pub kind: String,
    /// Display name
    pub name: String,
    /// Structural role
    pub role: NodeRole,
    /// Position in the graph editor
    pub position: [f32; 2],
    /// Width in graph units
    pub width: f32,
    /// Input ports
    pub inputs: Vec<Port>,
    /// Output ports
    pub outputs: Vec<Port>,
    /// Custom properties
    pub properties: Vec<Property>,
    /// Paired exit node, for zone entry nodes
    #[serde(default)]
    pub paired_output: Option<NodeId>,
}

impl Node {
    /// Create a new node from a kind descriptor
    pub fn new(kind: &NodeKind) -> Self {
        let mut node = Self {
            id: NodeId::new(),
            kind: kind.id.clone(),
            name: kind.name.clone(),
            role: kind.role,
            position: [0.0, 0.0],
            width: DEFAULT_NODE_WIDTH,
            inputs: kind.inputs.iter().map(Port::instantiate).collect(),
            outputs: kind.outputs.iter().map(Port::instantiate).collect(),
            properties: kind
                .properties
                .iter()
                .map(|decl| Property {
                    decl: decl.clone(),
                    value: decl.default.clone(),
                })
                .collect(),
            paired_output: None,
        };
        node.refresh_ports();
        node
    }

    /// Get an input port by index
    pub fn input(&self, index: usize) -> Option<&Port> {
        self.inputs.get(index)
    }

    /// Get an output port by index
    pub fn output(&self, index: usize) -> Option<&Port> {
        self.outputs.get(index)
    }

    /// Get a port by ID
    pub fn port(&self, port_id: &PortId) -> Option<&Port> {
        self.inputs
            .iter()
            .find(|p| p.id == *port_id)
            .or_else(|| self.outputs.iter().find(|p| p.id == *port_id))
    }

    /// Get a mutable port by ID
    pub fn port_mut(&mut self, port_id: &PortId) -> Option<&mut Port> {
        if let Some(index) = self.inputs.iter().position(|p| p.id == *port_id) {
            return self.inputs.get_mut(index);
        }
        self.outputs.iter_mut().find(|p| p.id == *port_id)
    }

    /// Get all ports
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    /// Enabled input ports
    pub fn enabled_inputs(&self) -> impl Iterator<Item = &Port> {
        self.inputs.iter().filter(|p| p.enabled)
    }

    /// Enabled output ports
    pub fn enabled_outputs(&self) -> impl Iterator<Item = &Port> {
        self.outputs.iter().filter(|p| p.enabled)
    }

    /// Look up a property by name
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|p| p.decl.name == name)
            .map(|p| &p.value)
    }

    /// Assign a property and re-evaluate port visibility
    pub fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
        let node = self.name.clone();
        let property = self
            .properties
            .iter_mut()
            .find(|p| p.decl.name == name)
            .ok_or_else(|| PropertyError::Unknown {
                node,
                property: name.to_string(),
            })?;

        if !property.decl.accepts(&value) {
            return Err(PropertyError::InvalidValue {
                property: name.to_string(),
                value,
            });
        }
        property.value = value;
        self.refresh_ports();
        Ok(())
    }

    /// Referenced graph of a group node
    pub fn node_tree(&self) -> Option<&str> {
        match self.property(NODE_TREE_PROPERTY) {
            Some(PropertyValue::GraphRef(name)) => Some(name),
            _ => None,
        }
    }

    /// Re-evaluate every port's enabling condition
    pub fn refresh_ports(&mut self) {
        let properties = &self.properties;
        let case_of = |name: &str| {
            properties
                .iter()
                .find(|p| p.decl.name == name)
                .and_then(|p| p.value.as_enum())
        };
        for port in self.inputs.iter_mut().chain(self.outputs.iter_mut()) {
            if let Some(condition) = &port.enabled_when {
                port.enabled = condition.holds(case_of(condition.property()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::{PortCondition, SocketType};

    fn compare_kind() -> NodeKind {
        NodeKind {
            id: "FunctionNodeCompare".to_string(),
            name: "Compare".to_string(),
            category: NodeCategory::Utilities,
            menu_path: None,
            role: NodeRole::Regular,
            description: String::new(),
            inputs: vec![
                Port::input("A", SocketType::Float).when(PortCondition::one_of("data_type", &["FLOAT"])),
                Port::input("A", SocketType::Int).when(PortCondition::one_of("data_type", &["INT"])),
            ],
            outputs: vec![Port::output("Result", SocketType::Bool)],
            properties: vec![PropertyDecl::enumeration("data_type", &["FLOAT", "INT"])],
        }
    }

    #[test]
    fn test_instances_get_fresh_port_ids() {
        let kind = compare_kind();
        let a = Node::new(&kind);
        let b = Node::new(&kind);
        assert_ne!(a.inputs[0].id, b.inputs[0].id);
        assert_ne!(a.inputs[0].id, kind.inputs[0].id);
    }

    #[test]
    fn test_property_drives_port_visibility() {
        let mut node = Node::new(&compare_kind());
        assert!(node.inputs[0].enabled);
        assert!(!node.inputs[1].enabled);

        node.set_property("data_type", PropertyValue::Enum("INT".to_string()))
            .unwrap();
        assert!(!node.inputs[0].enabled);
        assert!(node.inputs[1].enabled);
    }

    #[test]
    fn test_invalid_property_values() {
        let mut node = Node::new(&compare_kind());
        assert!(matches!(
            node.set_property("data_type", PropertyValue::Enum("STRING".to_string())),
            Err(PropertyError::InvalidValue { .. })
        ));
        assert!(matches!(
            node.set_property("mode", PropertyValue::Bool(true)),
            Err(PropertyError::Unknown { .. })
        ));
    }
}
