// SPDX-License-Identifier: MIT OR Apache-2.0
//! Curve node kinds.

use super::{boolean, float, geometry, int, vector};
use crate::node::{NodeCategory, NodeKind, PropertyDecl};
use crate::port::{Port, SocketType};
use crate::registry::NodeKindRegistry;

/// Register curve primitives and conversions
pub fn register(registry: &mut NodeKindRegistry) {
    registry.register(
        NodeKind::new("GeometryNodeCurvePrimitiveLine", "Curve Line", NodeCategory::Curve)
            .with_menu("primitives")
            .with_property(PropertyDecl::enumeration("mode", &["POINTS", "DIRECTION"]))
            .with_inputs([vector("Start", [0.0; 3]), vector("End", [0.0, 0.0, 1.0])])
            .with_outputs([Port::output("Curve", SocketType::Geometry)]),
    );

    registry.register(
        NodeKind::new("GeometryNodeCurveToMesh", "Curve to Mesh", NodeCategory::Curve)
            .with_inputs([geometry("Curve"), geometry("Profile Curve"), boolean("Fill Caps", false)])
            .with_outputs([Port::output("Mesh", SocketType::Geometry)]),
    );

    registry.register(
        NodeKind::new("GeometryNodeCurveToPoints", "Curve to Points", NodeCategory::Curve)
            .with_property(PropertyDecl::enumeration("mode", &["COUNT", "EVALUATED", "LENGTH"]))
            .with_inputs([geometry("Curve"), int("Count", 10), float("Length", 0.1)])
            .with_outputs([
                Port::output("Points", SocketType::Geometry),
                Port::output("Tangent", SocketType::Vector),
                Port::output("Normal", SocketType::Vector),
                Port::output("Rotation", SocketType::Rotation),
            ]),
    );
}
