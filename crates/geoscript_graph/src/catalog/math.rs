// SPDX-License-Identifier: MIT OR Apache-2.0
//! Constants, scalar/vector math and field utility node kinds.

use super::{float, int, typed_ports, vector};
use crate::node::{NodeCategory, NodeKind, PropertyDecl, PropertyKind, PropertyValue};
use crate::port::{Port, PortCondition, PortValue, SocketType};
use crate::registry::NodeKindRegistry;

/// Scalar math operations
pub const MATH_OPERATIONS: &[&str] = &[
    "ADD", "SUBTRACT", "MULTIPLY", "DIVIDE", "MULTIPLY_ADD", "POWER", "LOGARITHM", "SQRT",
    "INVERSE_SQRT", "ABSOLUTE", "EXPONENT", "MINIMUM", "MAXIMUM", "LESS_THAN", "GREATER_THAN",
    "SIGN", "COMPARE", "SMOOTH_MIN", "SMOOTH_MAX", "ROUND", "FLOOR", "CEIL", "TRUNC", "FRACT",
    "MODULO", "FLOORED_MODULO", "WRAP", "SNAP", "PINGPONG", "SINE", "COSINE", "TANGENT",
    "ARCSINE", "ARCCOSINE", "ARCTANGENT", "ARCTAN2", "RADIANS", "DEGREES",
];

const MATH_UNARY: &[&str] = &[
    "SQRT", "INVERSE_SQRT", "ABSOLUTE", "EXPONENT", "SIGN", "ROUND", "FLOOR", "CEIL", "TRUNC",
    "FRACT", "SINE", "COSINE", "TANGENT", "ARCSINE", "ARCCOSINE", "ARCTANGENT", "RADIANS",
    "DEGREES",
];

const MATH_TERNARY: &[&str] = &["MULTIPLY_ADD", "COMPARE", "SMOOTH_MIN", "SMOOTH_MAX", "WRAP"];

/// Vector math operations
pub const VECTOR_MATH_OPERATIONS: &[&str] = &[
    "ADD", "SUBTRACT", "MULTIPLY", "DIVIDE", "MULTIPLY_ADD", "CROSS_PRODUCT", "PROJECT",
    "REFLECT", "FACEFORWARD", "DOT_PRODUCT", "DISTANCE", "LENGTH", "SCALE", "NORMALIZE",
    "ABSOLUTE", "MINIMUM", "MAXIMUM", "FLOOR", "CEIL", "FRACTION", "MODULO", "WRAP", "SNAP",
    "SINE", "COSINE", "TANGENT",
];

const VECTOR_UNARY: &[&str] = &[
    "LENGTH", "SCALE", "NORMALIZE", "ABSOLUTE", "FLOOR", "CEIL", "FRACTION", "SINE", "COSINE",
    "TANGENT",
];

const VECTOR_SCALAR_RESULT: &[&str] = &["DOT_PRODUCT", "DISTANCE", "LENGTH"];

/// Comparison operations
pub const COMPARE_OPERATIONS: &[&str] = &[
    "LESS_THAN", "LESS_EQUAL", "GREATER_THAN", "GREATER_EQUAL", "EQUAL", "NOT_EQUAL", "BRIGHTER",
    "DARKER",
];

/// Boolean math operations
pub const BOOLEAN_OPERATIONS: &[&str] =
    &["AND", "OR", "NOT", "NAND", "NOR", "XNOR", "XOR", "IMPLY", "NIMPLY"];

/// Register constant, math and utility kinds
pub fn register(registry: &mut NodeKindRegistry) {
    // ========================================================================
    // Constants
    // ========================================================================

    registry.register(
        NodeKind::new("FunctionNodeInputInt", "Integer", NodeCategory::Input)
            .with_menu("constant")
            .with_outputs([Port::output("Integer", SocketType::Int)])
            .with_property(PropertyDecl::value("integer", PropertyKind::Int, PropertyValue::Int(0))),
    );
    registry.register(
        NodeKind::new("FunctionNodeInputBool", "Boolean", NodeCategory::Input)
            .with_menu("constant")
            .with_outputs([Port::output("Boolean", SocketType::Bool)])
            .with_property(PropertyDecl::value("boolean", PropertyKind::Bool, PropertyValue::Bool(false))),
    );
    registry.register(
        NodeKind::new("FunctionNodeInputString", "String", NodeCategory::Input)
            .with_menu("constant")
            .with_outputs([Port::output("String", SocketType::String)])
            .with_property(PropertyDecl::value(
                "string",
                PropertyKind::String,
                PropertyValue::String(String::new()),
            )),
    );
    registry.register(
        NodeKind::new("FunctionNodeInputVector", "Vector", NodeCategory::Input)
            .with_menu("constant")
            .with_outputs([Port::output("Vector", SocketType::Vector)])
            .with_property(PropertyDecl::value(
                "vector",
                PropertyKind::Vector,
                PropertyValue::Vector([0.0; 3]),
            )),
    );
    // The scalar constant keeps its value on the output socket
    registry.register(
        NodeKind::new("ShaderNodeValue", "Value", NodeCategory::Input)
            .with_menu("constant")
            .with_outputs([Port::output("Value", SocketType::Float).with_default(PortValue::Float(0.0))]),
    );

    // ========================================================================
    // Math
    // ========================================================================

    registry.register(
        NodeKind::new("ShaderNodeMath", "Math", NodeCategory::Math)
            .with_description("Scalar math operation")
            .with_property(PropertyDecl::enumeration("operation", MATH_OPERATIONS))
            .with_property(PropertyDecl::value("use_clamp", PropertyKind::Bool, PropertyValue::Bool(false)))
            .with_inputs([
                float("Value", 0.5),
                float("Value", 0.5).when(PortCondition::none_of("operation", MATH_UNARY)),
                float("Value", 0.5).when(PortCondition::one_of("operation", MATH_TERNARY)),
            ])
            .with_outputs([Port::output("Value", SocketType::Float)]),
    );

    registry.register(
        NodeKind::new("ShaderNodeVectorMath", "Vector Math", NodeCategory::Math)
            .with_description("Vector math operation")
            .with_property(PropertyDecl::enumeration("operation", VECTOR_MATH_OPERATIONS))
            .with_inputs([
                vector("Vector", [0.0; 3]),
                vector("Vector", [0.0; 3]).when(PortCondition::none_of("operation", VECTOR_UNARY)),
                vector("Vector", [0.0; 3])
                    .when(PortCondition::one_of("operation", &["MULTIPLY_ADD", "FACEFORWARD", "WRAP"])),
                float("Scale", 1.0).when(PortCondition::one_of("operation", &["SCALE"])),
            ])
            .with_outputs([
                Port::output("Vector", SocketType::Vector)
                    .when(PortCondition::none_of("operation", VECTOR_SCALAR_RESULT)),
                Port::output("Value", SocketType::Float)
                    .when(PortCondition::one_of("operation", VECTOR_SCALAR_RESULT)),
            ]),
    );

    registry.register(
        NodeKind::new("ShaderNodeSeparateXYZ", "Separate XYZ", NodeCategory::Math)
            .with_inputs([vector("Vector", [0.0; 3])])
            .with_outputs([
                Port::output("X", SocketType::Float),
                Port::output("Y", SocketType::Float),
                Port::output("Z", SocketType::Float),
            ]),
    );

    registry.register(
        NodeKind::new("ShaderNodeCombineXYZ", "Combine XYZ", NodeCategory::Math)
            .with_inputs([float("X", 0.0), float("Y", 0.0), float("Z", 0.0)])
            .with_outputs([Port::output("Vector", SocketType::Vector)]),
    );

    // ========================================================================
    // Utilities
    // ========================================================================

    registry.register(
        NodeKind::new("FunctionNodeCompare", "Compare", NodeCategory::Utilities)
            .with_property(PropertyDecl::enumeration(
                "data_type",
                &["FLOAT", "INT", "VECTOR", "STRING", "RGBA"],
            ))
            .with_property(PropertyDecl::enumeration("operation", COMPARE_OPERATIONS))
            .with_inputs(compare_inputs())
            .with_outputs([Port::output("Result", SocketType::Bool)]),
    );

    registry.register(
        NodeKind::new("FunctionNodeBooleanMath", "Boolean Math", NodeCategory::Utilities)
            .with_property(PropertyDecl::enumeration("operation", BOOLEAN_OPERATIONS))
            .with_inputs([
                Port::input("Boolean", SocketType::Bool).with_default(PortValue::Bool(false)),
                Port::input("Boolean", SocketType::Bool)
                    .with_default(PortValue::Bool(false))
                    .when(PortCondition::none_of("operation", &["NOT"])),
            ])
            .with_outputs([Port::output("Boolean", SocketType::Bool)]),
    );

    let mut random_inputs = Vec::new();
    for (data_type, min, max) in [
        ("FLOAT_VECTOR", vector("Min", [0.0; 3]), vector("Max", [1.0; 3])),
        ("FLOAT", float("Min", 0.0), float("Max", 1.0)),
        ("INT", int("Min", 0), int("Max", 100)),
    ] {
        random_inputs.push(min.when(PortCondition::one_of("data_type", &[data_type])));
        random_inputs.push(max.when(PortCondition::one_of("data_type", &[data_type])));
    }
    random_inputs.push(float("Probability", 0.5).when(PortCondition::one_of("data_type", &["BOOLEAN"])));
    random_inputs.push(Port::input("ID", SocketType::Int).hidden_value());
    random_inputs.push(int("Seed", 0));

    registry.register(
        NodeKind::new("FunctionNodeRandomValue", "Random Value", NodeCategory::Utilities)
            .with_property(PropertyDecl::enumeration(
                "data_type",
                &["FLOAT", "INT", "FLOAT_VECTOR", "BOOLEAN"],
            ))
            .with_inputs(random_inputs)
            .with_outputs(
                typed_ports("Value", false)
                    .into_iter()
                    .filter(|p| p.socket_type != SocketType::Color),
            ),
    );
}

fn compare_inputs() -> Vec<Port> {
    let mut inputs = Vec::new();
    for (data_type, socket_type, default) in [
        ("FLOAT", SocketType::Float, PortValue::Float(0.0)),
        ("INT", SocketType::Int, PortValue::Int(0)),
        ("VECTOR", SocketType::Vector, PortValue::Vector([0.0; 3])),
        ("STRING", SocketType::String, PortValue::String(String::new())),
        ("RGBA", SocketType::Color, PortValue::Color([0.8, 0.8, 0.8, 1.0])),
    ] {
        for name in ["A", "B"] {
            inputs.push(
                Port::input(name, socket_type.clone())
                    .with_default(default.clone())
                    .when(PortCondition::one_of("data_type", &[data_type])),
            );
        }
    }
    inputs.push(float("Epsilon", 0.001).when(PortCondition::one_of("operation", &["EQUAL", "NOT_EQUAL"])));
    inputs
}
