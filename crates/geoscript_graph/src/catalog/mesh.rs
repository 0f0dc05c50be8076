// SPDX-License-Identifier: MIT OR Apache-2.0
//! Mesh primitive and mesh operation node kinds.

use super::{boolean, float, geometry, int, selection, vector};
use crate::node::{NodeCategory, NodeKind, PropertyDecl};
use crate::port::{Port, PortValue, SocketType};
use crate::registry::NodeKindRegistry;

fn mesh_output() -> Port {
    Port::output("Mesh", SocketType::Geometry)
}

/// Register mesh primitives and operations
pub fn register(registry: &mut NodeKindRegistry) {
    // ========================================================================
    // Primitives
    // ========================================================================

    registry.register(
        NodeKind::new("GeometryNodeMeshCube", "Cube", NodeCategory::Mesh)
            .with_menu("primitives")
            .with_inputs([
                vector("Size", [1.0; 3]),
                int("Vertices X", 2),
                int("Vertices Y", 2),
                int("Vertices Z", 2),
            ])
            .with_outputs([mesh_output()]),
    );

    registry.register(
        NodeKind::new("GeometryNodeMeshGrid", "Grid", NodeCategory::Mesh)
            .with_menu("primitives")
            .with_inputs([
                float("Size X", 1.0),
                float("Size Y", 1.0),
                int("Vertices X", 3),
                int("Vertices Y", 3),
            ])
            .with_outputs([mesh_output()]),
    );

    registry.register(
        NodeKind::new("GeometryNodeMeshUVSphere", "UV Sphere", NodeCategory::Mesh)
            .with_menu("primitives")
            .with_inputs([int("Segments", 32), int("Rings", 16), float("Radius", 1.0)])
            .with_outputs([mesh_output()]),
    );

    registry.register(
        NodeKind::new("GeometryNodeMeshIcoSphere", "Ico Sphere", NodeCategory::Mesh)
            .with_menu("primitives")
            .with_inputs([float("Radius", 1.0), int("Subdivisions", 1)])
            .with_outputs([mesh_output()]),
    );

    registry.register(
        NodeKind::new("GeometryNodeMeshCylinder", "Cylinder", NodeCategory::Mesh)
            .with_menu("primitives")
            .with_property(PropertyDecl::enumeration("fill_type", &["NGON", "TRIANGLE_FAN", "NONE"]))
            .with_inputs([
                int("Vertices", 32),
                int("Side Segments", 1),
                int("Fill Segments", 1),
                float("Radius", 1.0),
                float("Depth", 2.0),
            ])
            .with_outputs([
                mesh_output(),
                Port::output("Top", SocketType::Bool),
                Port::output("Side", SocketType::Bool),
                Port::output("Bottom", SocketType::Bool),
            ]),
    );

    registry.register(
        NodeKind::new("GeometryNodeMeshLine", "Mesh Line", NodeCategory::Mesh)
            .with_menu("primitives")
            .with_property(PropertyDecl::enumeration("mode", &["OFFSET", "END_POINTS"]))
            .with_inputs([
                int("Count", 10),
                Port::input("Start Location", SocketType::Vector)
                    .with_default(PortValue::Vector([0.0; 3])),
                Port::input("Offset", SocketType::Vector).with_default(PortValue::Vector([0.0, 0.0, 1.0])),
            ])
            .with_outputs([mesh_output()]),
    );

    // ========================================================================
    // Operations
    // ========================================================================

    registry.register(
        NodeKind::new("GeometryNodeMeshToPoints", "Mesh to Points", NodeCategory::Mesh)
            .with_property(PropertyDecl::enumeration("mode", &["VERTICES", "EDGES", "FACES", "CORNERS"]))
            .with_inputs([
                geometry("Mesh"),
                selection(),
                Port::input("Position", SocketType::Vector).hidden_value(),
                float("Radius", 0.05),
            ])
            .with_outputs([Port::output("Points", SocketType::Geometry)]),
    );

    registry.register(
        NodeKind::new(
            "GeometryNodeDistributePointsOnFaces",
            "Distribute Points on Faces",
            NodeCategory::Point,
        )
        .with_property(PropertyDecl::enumeration("distribute_method", &["RANDOM", "POISSON"]))
        .with_inputs([
            geometry("Mesh"),
            selection(),
            float("Density", 10.0),
            int("Seed", 0),
        ])
        .with_outputs([
            Port::output("Points", SocketType::Geometry),
            Port::output("Normal", SocketType::Vector),
            Port::output("Rotation", SocketType::Rotation),
        ]),
    );

    registry.register(
        NodeKind::new("GeometryNodeMeshBoolean", "Mesh Boolean", NodeCategory::Mesh)
            .with_property(PropertyDecl::enumeration("operation", &["DIFFERENCE", "UNION", "INTERSECT"]))
            .with_inputs([
                geometry("Mesh 1"),
                geometry("Mesh 2").multi(),
                boolean("Self Intersection", false),
                boolean("Hole Tolerant", false),
            ])
            .with_outputs([mesh_output()]),
    );
}
