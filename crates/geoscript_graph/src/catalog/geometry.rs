// SPDX-License-Identifier: MIT OR Apache-2.0
//! Generic geometry, point, instance and attribute node kinds.

use super::{float, geometry, int, selection, typed_ports, vector, DOMAINS, FIELD_DATA_TYPES};
use crate::node::{NodeCategory, NodeKind, PropertyDecl, PropertyKind, PropertyValue};
use crate::port::{Port, PortValue, SocketType};
use crate::registry::NodeKindRegistry;

/// Register geometry, point, instance and attribute kinds
pub fn register(registry: &mut NodeKindRegistry) {
    // ========================================================================
    // Geometry
    // ========================================================================

    registry.register(
        NodeKind::new("GeometryNodeJoinGeometry", "Join Geometry", NodeCategory::Geometry)
            .with_description("Merge separately generated geometries into a single one")
            .with_inputs([geometry("Geometry").multi()])
            .with_outputs([Port::output("Geometry", SocketType::Geometry)]),
    );

    registry.register(
        NodeKind::new("GeometryNodeTransform", "Transform Geometry", NodeCategory::Geometry)
            .with_inputs([
                geometry("Geometry"),
                vector("Translation", [0.0; 3]),
                Port::input("Rotation", SocketType::Rotation).with_default(PortValue::Vector([0.0; 3])),
                vector("Scale", [1.0; 3]),
            ])
            .with_outputs([Port::output("Geometry", SocketType::Geometry)]),
    );

    registry.register(
        NodeKind::new("GeometryNodeBoundBox", "Bounding Box", NodeCategory::Geometry)
            .with_inputs([geometry("Geometry")])
            .with_outputs([
                Port::output("Bounding Box", SocketType::Geometry),
                Port::output("Min", SocketType::Vector),
                Port::output("Max", SocketType::Vector),
            ]),
    );

    registry.register(
        NodeKind::new("GeometryNodeSetPosition", "Set Position", NodeCategory::Geometry)
            .with_inputs([
                geometry("Geometry"),
                selection(),
                Port::input("Position", SocketType::Vector).hidden_value(),
                vector("Offset", [0.0; 3]),
            ])
            .with_outputs([Port::output("Geometry", SocketType::Geometry)]),
    );

    registry.register(
        NodeKind::new("GeometryNodeDeleteGeometry", "Delete Geometry", NodeCategory::Geometry)
            .with_property(PropertyDecl::enumeration("domain", DOMAINS))
            .with_property(PropertyDecl::enumeration("mode", &["ALL", "EDGE_FACE", "ONLY_FACE"]))
            .with_inputs([geometry("Geometry"), selection()])
            .with_outputs([Port::output("Geometry", SocketType::Geometry)]),
    );

    registry.register(
        NodeKind::new("GeometryNodeMergeByDistance", "Merge by Distance", NodeCategory::Geometry)
            .with_property(PropertyDecl::enumeration("mode", &["ALL", "CONNECTED"]))
            .with_inputs([geometry("Geometry"), selection(), float("Distance", 0.001)])
            .with_outputs([Port::output("Geometry", SocketType::Geometry)]),
    );

    registry.register(
        NodeKind::new("GeometryNodeProximity", "Geometry Proximity", NodeCategory::Geometry)
            .with_property(PropertyDecl::enumeration("target_element", &["FACES", "EDGES", "POINTS"]))
            .with_inputs([
                geometry("Target"),
                Port::input("Source Position", SocketType::Vector).hidden_value(),
            ])
            .with_outputs([
                Port::output("Position", SocketType::Vector),
                Port::output("Distance", SocketType::Float),
            ]),
    );

    // ========================================================================
    // Fields
    // ========================================================================

    registry.register(
        NodeKind::new("GeometryNodeInputPosition", "Position", NodeCategory::Input)
            .with_outputs([Port::output("Position", SocketType::Vector)]),
    );
    registry.register(
        NodeKind::new("GeometryNodeInputIndex", "Index", NodeCategory::Input)
            .with_outputs([Port::output("Index", SocketType::Int)]),
    );
    registry.register(
        NodeKind::new("GeometryNodeInputID", "ID", NodeCategory::Input)
            .with_outputs([Port::output("ID", SocketType::Int)]),
    );

    registry.register(
        NodeKind::new("GeometryNodeSampleIndex", "Sample Index", NodeCategory::Geometry)
            .with_property(PropertyDecl::enumeration("data_type", FIELD_DATA_TYPES))
            .with_property(PropertyDecl::enumeration("domain", DOMAINS))
            .with_property(PropertyDecl::value("clamp", PropertyKind::Bool, PropertyValue::Bool(false)))
            .with_inputs(
                std::iter::once(geometry("Geometry"))
                    .chain(hidden(typed_ports("Value", true)))
                    .chain([int("Index", 0).hidden_value()]),
            )
            .with_outputs(typed_ports("Value", false)),
    );

    registry.register(
        NodeKind::new("GeometryNodeSampleNearest", "Sample Nearest", NodeCategory::Geometry)
            .with_property(PropertyDecl::enumeration("domain", DOMAINS))
            .with_inputs([
                geometry("Geometry"),
                Port::input("Sample Position", SocketType::Vector).hidden_value(),
            ])
            .with_outputs([Port::output("Index", SocketType::Int)]),
    );

    registry.register(
        NodeKind::new(
            "GeometryNodeSampleNearestSurface",
            "Sample Nearest Surface",
            NodeCategory::Geometry,
        )
        .with_property(PropertyDecl::enumeration("data_type", FIELD_DATA_TYPES))
        .with_inputs(
            std::iter::once(geometry("Mesh"))
                .chain(hidden(typed_ports("Value", true)))
                .chain([Port::input("Sample Position", SocketType::Vector).hidden_value()]),
        )
        .with_outputs(typed_ports("Value", false)),
    );

    // ========================================================================
    // Points and instances
    // ========================================================================

    registry.register(
        NodeKind::new("GeometryNodePoints", "Points", NodeCategory::Point)
            .with_inputs([
                int("Count", 1),
                Port::input("Position", SocketType::Vector).with_default(PortValue::Vector([0.0; 3])),
                float("Radius", 0.1),
            ])
            .with_outputs([Port::output("Geometry", SocketType::Geometry)]),
    );

    registry.register(
        NodeKind::new("GeometryNodeInstanceOnPoints", "Instance on Points", NodeCategory::Instances)
            .with_inputs([
                geometry("Points"),
                selection(),
                geometry("Instance"),
                Port::input("Pick Instance", SocketType::Bool).with_default(PortValue::Bool(false)),
                Port::input("Instance Index", SocketType::Int).hidden_value(),
                Port::input("Rotation", SocketType::Rotation).with_default(PortValue::Vector([0.0; 3])),
                vector("Scale", [1.0; 3]),
            ])
            .with_outputs([Port::output("Instances", SocketType::Geometry)]),
    );

    registry.register(
        NodeKind::new("GeometryNodeRealizeInstances", "Realize Instances", NodeCategory::Instances)
            .with_inputs([geometry("Geometry")])
            .with_outputs([Port::output("Geometry", SocketType::Geometry)]),
    );

    // ========================================================================
    // Attributes
    // ========================================================================

    registry.register(
        NodeKind::new("GeometryNodeInputNamedAttribute", "Named Attribute", NodeCategory::Attribute)
            .with_property(PropertyDecl::enumeration("data_type", FIELD_DATA_TYPES))
            .with_inputs([Port::input("Name", SocketType::String)
                .with_default(PortValue::String(String::new()))])
            .with_outputs(typed_ports("Attribute", false).into_iter().chain([
                Port::output("Exists", SocketType::Bool),
            ])),
    );

    registry.register(
        NodeKind::new(
            "GeometryNodeStoreNamedAttribute",
            "Store Named Attribute",
            NodeCategory::Attribute,
        )
        .with_property(PropertyDecl::enumeration("data_type", FIELD_DATA_TYPES))
        .with_property(PropertyDecl::enumeration("domain", DOMAINS))
        .with_inputs(
            [
                geometry("Geometry"),
                selection(),
                Port::input("Name", SocketType::String).with_default(PortValue::String(String::new())),
            ]
            .into_iter()
            .chain(typed_ports("Value", true)),
        )
        .with_outputs([Port::output("Geometry", SocketType::Geometry)]),
    );
}

/// Field inputs that read an implicit field when left unlinked
fn hidden(ports: Vec<Port>) -> impl Iterator<Item = Port> {
    ports.into_iter().map(Port::hidden_value)
}
