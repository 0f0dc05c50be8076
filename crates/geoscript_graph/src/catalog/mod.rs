// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in descriptor table of standard geometry node kinds.
//!
//! Used when no descriptor table exported from the host is supplied. Port
//! names, defaults and enum cases follow the host's geometry nodes so that
//! scripts written against the host behave the same against this table.

pub mod curve;
pub mod geometry;
pub mod interface;
pub mod math;
pub mod mesh;

use crate::port::{Port, PortCondition, PortValue, SocketType};
use crate::registry::NodeKindRegistry;

/// Data types accepted by typed field nodes (sample, attribute)
pub const FIELD_DATA_TYPES: &[&str] = &["FLOAT", "INT", "FLOAT_VECTOR", "FLOAT_COLOR", "BOOLEAN"];

/// Attribute domains
pub const DOMAINS: &[&str] = &["POINT", "EDGE", "FACE", "CORNER", "CURVE", "INSTANCE"];

/// Create the registry with every built-in node kind
pub fn standard_registry() -> NodeKindRegistry {
    let mut registry = NodeKindRegistry::new();
    interface::register(&mut registry);
    math::register(&mut registry);
    geometry::register(&mut registry);
    mesh::register(&mut registry);
    curve::register(&mut registry);
    registry
}

/// One port per field data type, each enabled by `data_type`.
///
/// Used for the typed `Value`/`Attribute` sockets of sample and attribute
/// nodes, which the host declares once per data type under one name.
pub(crate) fn typed_ports(name: &str, input: bool) -> Vec<Port> {
    let types = [
        ("FLOAT", SocketType::Float, PortValue::Float(0.0)),
        ("INT", SocketType::Int, PortValue::Int(0)),
        ("FLOAT_VECTOR", SocketType::Vector, PortValue::Vector([0.0; 3])),
        ("FLOAT_COLOR", SocketType::Color, PortValue::Color([0.0, 0.0, 0.0, 1.0])),
        ("BOOLEAN", SocketType::Bool, PortValue::Bool(false)),
    ];
    types
        .into_iter()
        .map(|(data_type, socket_type, default)| {
            let port = if input {
                Port::input(name, socket_type).with_default(default)
            } else {
                Port::output(name, socket_type)
            };
            port.when(PortCondition::one_of("data_type", &[data_type]))
        })
        .collect()
}

/// Boolean selection input, hidden and defaulting to true
pub(crate) fn selection() -> Port {
    Port::input("Selection", SocketType::Bool)
        .with_default(PortValue::Bool(true))
        .hidden_value()
}

/// Float input with a default
pub(crate) fn float(name: &str, value: f32) -> Port {
    Port::input(name, SocketType::Float).with_default(PortValue::Float(value))
}

/// Integer input with a default
pub(crate) fn int(name: &str, value: i32) -> Port {
    Port::input(name, SocketType::Int).with_default(PortValue::Int(value))
}

/// Boolean input with a default
pub(crate) fn boolean(name: &str, value: bool) -> Port {
    Port::input(name, SocketType::Bool).with_default(PortValue::Bool(value))
}

/// Vector input with a default
pub(crate) fn vector(name: &str, value: [f32; 3]) -> Port {
    Port::input(name, SocketType::Vector).with_default(PortValue::Vector(value))
}

/// Geometry input
pub(crate) fn geometry(name: &str) -> Port {
    Port::input(name, SocketType::Geometry)
}
