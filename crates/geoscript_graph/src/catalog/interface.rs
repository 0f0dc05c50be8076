// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interface boundary, group reference and zone node kinds.

use super::{boolean, int};
use crate::node::{
    NodeCategory, NodeKind, NodeRole, PropertyDecl, PropertyKind, PropertyValue, GROUP_INPUT_KIND,
    GROUP_KIND, GROUP_OUTPUT_KIND, NODE_TREE_PROPERTY,
};
use crate::port::{Port, SocketType};
use crate::registry::NodeKindRegistry;

/// Register boundary, group and zone kinds
pub fn register(registry: &mut NodeKindRegistry) {
    // Ports of boundary and group nodes come from the graph interface
    registry.register(
        NodeKind::new(GROUP_INPUT_KIND, "Group Input", NodeCategory::Input)
            .with_role(NodeRole::GroupInput)
            .with_description("Exposes the graph's input parameters"),
    );
    registry.register(
        NodeKind::new(GROUP_OUTPUT_KIND, "Group Output", NodeCategory::Output)
            .with_role(NodeRole::GroupOutput)
            .with_description("Collects the graph's results"),
    );
    registry.register(
        NodeKind::new(GROUP_KIND, "Group", NodeCategory::Group)
            .with_role(NodeRole::Group)
            .with_description("Evaluates another graph")
            .with_property(PropertyDecl::value(
                NODE_TREE_PROPERTY,
                PropertyKind::GraphRef,
                PropertyValue::GraphRef(String::new()),
            )),
    );

    // Zone items are appended to both nodes of a pair at build time
    registry.register(
        NodeKind::new("GeometryNodeRepeatInput", "Repeat Input", NodeCategory::Zone)
            .with_role(NodeRole::RepeatInput)
            .with_inputs([int("Iterations", 1)]),
    );
    registry.register(
        NodeKind::new("GeometryNodeRepeatOutput", "Repeat Output", NodeCategory::Zone)
            .with_role(NodeRole::RepeatOutput),
    );
    registry.register(
        NodeKind::new("GeometryNodeSimulationInput", "Simulation Input", NodeCategory::Zone)
            .with_role(NodeRole::SimulationInput)
            .with_outputs([Port::output("Delta Time", SocketType::Float)]),
    );
    registry.register(
        NodeKind::new("GeometryNodeSimulationOutput", "Simulation Output", NodeCategory::Zone)
            .with_role(NodeRole::SimulationOutput)
            .with_inputs([boolean("Skip", false)]),
    );
}
