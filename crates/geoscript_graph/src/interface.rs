// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph interface: the ordered, typed inputs and outputs of a graph.

use crate::port::{Port, PortValue, SocketType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an interface entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterfaceId(pub Uuid);

impl InterfaceId {
    /// Create a new random interface ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InterfaceId {
    fn default() -> Self {
        Self::new()
    }
}

/// A named, typed interface entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceSocket {
    /// Stable identity, kept while the entry is renamed in place
    pub id: InterfaceId,
    /// Display name
    pub name: String,
    /// Data type
    pub socket_type: SocketType,
    /// Default value
    #[serde(default)]
    pub default_value: Option<PortValue>,
    /// Lower bound
    #[serde(default)]
    pub min_value: Option<f32>,
    /// Upper bound
    #[serde(default)]
    pub max_value: Option<f32>,
    /// Socket subtype label (`DISTANCE`, `FACTOR`, ...)
    #[serde(default)]
    pub subtype: Option<String>,
    /// Tooltip
    #[serde(default)]
    pub description: String,
    /// Whether the input is hidden from modifier panels
    #[serde(default)]
    pub hide_in_modifier: bool,
}

impl InterfaceSocket {
    /// Create an entry without default or bounds
    pub fn new(name: impl Into<String>, socket_type: SocketType) -> Self {
        Self {
            id: InterfaceId::new(),
            name: name.into(),
            socket_type,
            default_value: None,
            min_value: None,
            max_value: None,
            subtype: None,
            description: String::new(),
            hide_in_modifier: false,
        }
    }

    /// Build the boundary port this entry contributes
    pub fn to_port(&self, port: Port) -> Port {
        let mut port = port;
        port.name = self.name.clone();
        port.socket_type = self.socket_type.clone();
        port.default_value = self.default_value.clone();
        port
    }
}

/// Ordered inputs and outputs of a graph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Interface {
    /// Input parameters
    pub inputs: Vec<InterfaceSocket>,
    /// Output results
    pub outputs: Vec<InterfaceSocket>,
}

impl Interface {
    /// Input ports for a node instantiating this interface
    pub fn input_ports(&self) -> Vec<Port> {
        self.inputs
            .iter()
            .map(|entry| entry.to_port(Port::input(&entry.name, entry.socket_type.clone())))
            .collect()
    }

    /// Output ports for a node instantiating this interface
    pub fn output_ports(&self) -> Vec<Port> {
        self.outputs
            .iter()
            .map(|entry| entry.to_port(Port::output(&entry.name, entry.socket_type.clone())))
            .collect()
    }
}
