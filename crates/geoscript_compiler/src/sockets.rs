// SPDX-License-Identifier: MIT OR Apache-2.0
//! Socket type registry.
//!
//! Maps host socket class names, including subtype variants such as
//! `NodeSocketFloatDistance`, onto the closed set of [`SocketType`]
//! categories, and maps literal values onto the constant node kinds that
//! carry them.

use crate::error::{CompileError, Result};
use geoscript_graph::{PortValue, SocketType};
use indexmap::IndexMap;

/// How a constant node holds its literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantBinding {
    /// Stored in a custom property
    Property(&'static str),
    /// Stored as the default of the first output
    OutputDefault,
}

/// Constant node kind for one literal category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantNode {
    /// Host node kind
    pub kind: &'static str,
    /// Where the literal goes
    pub binding: ConstantBinding,
}

const INT_SUBTYPES: &[&str] = &["NONE", "PERCENTAGE", "FACTOR"];
const FLOAT_SUBTYPES: &[&str] = &[
    "NONE",
    "PERCENTAGE",
    "FACTOR",
    "ANGLE",
    "TIME",
    "TIME_ABSOLUTE",
    "DISTANCE",
];
const VECTOR_SUBTYPES: &[&str] = &["NONE", "TRANSLATION", "VELOCITY", "ACCELERATION", "EULER", "XYZ"];

/// Registry of socket classes known to the compiler
#[derive(Debug, Clone)]
pub struct SocketTypeRegistry {
    classes: IndexMap<String, SocketType>,
}

impl SocketTypeRegistry {
    /// Registry with the host's standard socket classes
    pub fn standard() -> Self {
        let mut classes = IndexMap::new();
        for socket_type in [
            SocketType::Float,
            SocketType::Int,
            SocketType::Bool,
            SocketType::Vector,
            SocketType::Color,
            SocketType::Rotation,
            SocketType::String,
            SocketType::Geometry,
            SocketType::Menu,
            SocketType::Material,
            SocketType::Object,
            SocketType::Collection,
            SocketType::Image,
            SocketType::Texture,
        ] {
            classes.insert(socket_type.idname(), socket_type);
        }

        // Subtype variants share the category of their base class
        let variants: [(&str, SocketType); 17] = [
            ("NodeSocketFloatUnsigned", SocketType::Float),
            ("NodeSocketFloatPercentage", SocketType::Float),
            ("NodeSocketFloatFactor", SocketType::Float),
            ("NodeSocketFloatAngle", SocketType::Float),
            ("NodeSocketFloatTime", SocketType::Float),
            ("NodeSocketFloatTimeAbsolute", SocketType::Float),
            ("NodeSocketFloatDistance", SocketType::Float),
            ("NodeSocketIntUnsigned", SocketType::Int),
            ("NodeSocketIntPercentage", SocketType::Int),
            ("NodeSocketIntFactor", SocketType::Int),
            ("NodeSocketVectorTranslation", SocketType::Vector),
            ("NodeSocketVectorDirection", SocketType::Vector),
            ("NodeSocketVectorVelocity", SocketType::Vector),
            ("NodeSocketVectorAcceleration", SocketType::Vector),
            ("NodeSocketVectorEuler", SocketType::Vector),
            ("NodeSocketVectorXYZ", SocketType::Vector),
            ("NodeSocketColorGamma", SocketType::Color),
        ];
        for (idname, socket_type) in variants {
            classes.insert(idname.to_string(), socket_type);
        }
        Self { classes }
    }

    /// Register an additional socket class
    pub fn register(&mut self, idname: &str, socket_type: SocketType) {
        self.classes.insert(idname.to_string(), socket_type);
    }

    /// Category of a socket class name or script wrapper name
    pub fn resolve(&self, name: &str) -> Option<SocketType> {
        if let Some(socket_type) = self.classes.get(name) {
            return Some(socket_type.clone());
        }
        self.classes
            .get(&format!("NodeSocket{name}"))
            .cloned()
    }

    /// Subtype labels accepted for interface entries of a type
    pub fn subtypes(&self, socket_type: &SocketType) -> &'static [&'static str] {
        match socket_type {
            SocketType::Int => INT_SUBTYPES,
            SocketType::Float => FLOAT_SUBTYPES,
            SocketType::Vector => VECTOR_SUBTYPES,
            _ => &[],
        }
    }

    /// Constant node kind that materializes a literal
    pub fn constant_node(&self, value: &PortValue) -> Result<ConstantNode> {
        let (kind, binding) = match value {
            PortValue::Int(_) => ("FunctionNodeInputInt", ConstantBinding::Property("integer")),
            PortValue::Bool(_) => ("FunctionNodeInputBool", ConstantBinding::Property("boolean")),
            PortValue::String(_) => ("FunctionNodeInputString", ConstantBinding::Property("string")),
            PortValue::Vector(_) => ("FunctionNodeInputVector", ConstantBinding::Property("vector")),
            PortValue::Float(_) => ("ShaderNodeValue", ConstantBinding::OutputDefault),
            PortValue::Color(_) => return Err(CompileError::UnrepresentableLiteral(format!("{value:?}"))),
        };
        Ok(ConstantNode { kind, binding })
    }
}

impl Default for SocketTypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
