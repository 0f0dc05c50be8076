// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port (socket) definitions for node inputs/outputs.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortId(pub Uuid);

impl PortId {
    /// Create a new random port ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PortId {
    fn default() -> Self {
        Self::new()
    }
}

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
}

/// Data type carried by a socket.
///
/// Mirrors the host's standard socket classes. Subtype variants of a socket
/// class (distance floats, translation vectors, ...) share one `SocketType`;
/// the subtype lives on the interface entry instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocketType {
    /// Floating point scalar
    Float,
    /// Integer
    Int,
    /// Boolean
    Bool,
    /// 3D vector
    Vector,
    /// RGBA color
    Color,
    /// Euler/quaternion rotation
    Rotation,
    /// String value
    String,
    /// Geometry set
    Geometry,
    /// Menu/enum selection
    Menu,
    /// Material reference
    Material,
    /// Object reference
    Object,
    /// Collection reference
    Collection,
    /// Image reference
    Image,
    /// Texture reference
    Texture,
    /// Host socket class without a dedicated variant
    Custom(String),
}

impl SocketType {
    /// Host socket class identifier (`NodeSocketFloat`, ...)
    pub fn idname(&self) -> String {
        match self {
            Self::Custom(name) => name.clone(),
            other => format!("NodeSocket{}", other.wrapper_name()),
        }
    }

    /// Name of the script-level wrapper type (`Float`, `Vector`, ...)
    pub fn wrapper_name(&self) -> &str {
        match self {
            Self::Float => "Float",
            Self::Int => "Int",
            Self::Bool => "Bool",
            Self::Vector => "Vector",
            Self::Color => "Color",
            Self::Rotation => "Rotation",
            Self::String => "String",
            Self::Geometry => "Geometry",
            Self::Menu => "Menu",
            Self::Material => "Material",
            Self::Object => "Object",
            Self::Collection => "Collection",
            Self::Image => "Image",
            Self::Texture => "Texture",
            Self::Custom(name) => name.strip_prefix("NodeSocket").unwrap_or(name),
        }
    }

    /// Uppercase data type identifier used by zone items and typed nodes
    pub fn data_type(&self) -> &'static str {
        match self {
            Self::Float => "FLOAT",
            Self::Int => "INT",
            Self::Bool => "BOOLEAN",
            Self::Vector => "VECTOR",
            Self::Color => "RGBA",
            Self::Rotation => "ROTATION",
            Self::String => "STRING",
            Self::Geometry => "GEOMETRY",
            Self::Menu => "MENU",
            Self::Material => "MATERIAL",
            Self::Object => "OBJECT",
            Self::Collection => "COLLECTION",
            Self::Image => "IMAGE",
            Self::Texture => "TEXTURE",
            Self::Custom(_) => "CUSTOM",
        }
    }

    /// Whether this is a vector-valued socket
    pub fn is_vector(&self) -> bool {
        matches!(self, Self::Vector)
    }

    /// Whether interface entries of this type carry min/max bounds
    pub fn supports_bounds(&self) -> bool {
        matches!(self, Self::Float | Self::Int | Self::Vector)
    }

    /// Check if this type can connect to another type
    pub fn can_connect_to(&self, other: &SocketType) -> bool {
        // Same types can always connect
        if self == other {
            return true;
        }

        // Implicit conversions
        match (self, other) {
            // Numeric conversions
            (Self::Int | Self::Bool, Self::Float) | (Self::Float | Self::Bool, Self::Int) => true,
            (Self::Float | Self::Int, Self::Bool) => true,
            // Scalars broadcast into vectors and colors
            (Self::Float | Self::Int | Self::Bool, Self::Vector | Self::Color) => true,
            (Self::Vector | Self::Color, Self::Float) => true,
            // Vector/color conversions
            (Self::Vector, Self::Color | Self::Rotation) | (Self::Color, Self::Vector) => true,
            (Self::Rotation, Self::Vector) => true,
            // No other implicit conversions
            _ => false,
        }
    }

    /// Coerce a literal into a default value this socket accepts.
    ///
    /// Returns `None` when the socket rejects a raw default of that kind.
    pub fn coerce(&self, value: &PortValue) -> Option<PortValue> {
        match (self, value) {
            (Self::Float, PortValue::Float(v)) => Some(PortValue::Float(*v)),
            (Self::Float, PortValue::Int(v)) => Some(PortValue::Float(*v as f32)),
            (Self::Int, PortValue::Int(v)) => Some(PortValue::Int(*v)),
            (Self::Bool, PortValue::Bool(v)) => Some(PortValue::Bool(*v)),
            (Self::Vector | Self::Rotation, PortValue::Vector(v)) => Some(PortValue::Vector(*v)),
            (Self::Color, PortValue::Color(v)) => Some(PortValue::Color(*v)),
            (Self::String | Self::Menu, PortValue::String(v)) => Some(PortValue::String(v.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for SocketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wrapper_name())
    }
}

/// Condition on a node property that enables a port.
///
/// Host nodes show and hide sockets depending on their mode properties, e.g.
/// the compare node only enables the `A`/`B` pair matching its `data_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PortCondition {
    /// Enabled when the property's enum value is one of the listed cases
    OneOf {
        /// Property name
        property: String,
        /// Enabling cases
        values: Vec<String>,
    },
    /// Enabled when the property's enum value is none of the listed cases
    NoneOf {
        /// Property name
        property: String,
        /// Disabling cases
        values: Vec<String>,
    },
}

impl PortCondition {
    /// Enabled when `property` is one of `values`
    pub fn one_of(property: &str, values: &[&str]) -> Self {
        Self::OneOf {
            property: property.to_string(),
            values: values.iter().map(|v| (*v).to_string()).collect(),
        }
    }

    /// Enabled when `property` is none of `values`
    pub fn none_of(property: &str, values: &[&str]) -> Self {
        Self::NoneOf {
            property: property.to_string(),
            values: values.iter().map(|v| (*v).to_string()).collect(),
        }
    }

    /// Name of the controlling property
    pub fn property(&self) -> &str {
        match self {
            Self::OneOf { property, .. } | Self::NoneOf { property, .. } => property,
        }
    }

    /// Evaluate against the current enum case of the controlling property
    pub fn holds(&self, case: Option<&str>) -> bool {
        match self {
            Self::OneOf { values, .. } => case.is_some_and(|c| values.iter().any(|v| v == c)),
            Self::NoneOf { values, .. } => !case.is_some_and(|c| values.iter().any(|v| v == c)),
        }
    }
}

/// A port on a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    /// Unique port ID
    pub id: PortId,
    /// Port name
    pub name: String,
    /// Port direction
    pub direction: PortDirection,
    /// Data type
    pub socket_type: SocketType,
    /// Default value (for inputs)
    pub default_value: Option<PortValue>,
    /// Whether the default value is hidden from the user
    #[serde(default)]
    pub hide_value: bool,
    /// Whether the port is currently shown on the node
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Whether multiple incoming links are accepted (inputs only)
    #[serde(default)]
    pub multi_input: bool,
    /// Property condition driving `enabled`
    #[serde(default)]
    pub enabled_when: Option<PortCondition>,
    /// Whether the port belongs to a zone state item
    #[serde(default)]
    pub zone_item: bool,
}

fn default_enabled() -> bool {
    true
}

impl Port {
    /// Create a new port
    pub fn new(
        id: PortId,
        name: impl Into<String>,
        socket_type: SocketType,
        direction: PortDirection,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            direction,
            socket_type,
            default_value: None,
            hide_value: false,
            enabled: true,
            multi_input: false,
            enabled_when: None,
            zone_item: false,
        }
    }

    /// Create a new input port
    pub fn input(name: impl Into<String>, socket_type: SocketType) -> Self {
        Self::new(PortId::new(), name, socket_type, PortDirection::Input)
    }

    /// Create a new output port
    pub fn output(name: impl Into<String>, socket_type: SocketType) -> Self {
        Self::new(PortId::new(), name, socket_type, PortDirection::Output)
    }

    /// Set the default value
    pub fn with_default(mut self, value: PortValue) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Mark as accepting many incoming links
    pub fn multi(mut self) -> Self {
        self.multi_input = true;
        self
    }

    /// Hide the default value
    pub fn hidden_value(mut self) -> Self {
        self.hide_value = true;
        self
    }

    /// Enable only while a property condition holds
    pub fn when(mut self, condition: PortCondition) -> Self {
        self.enabled_when = Some(condition);
        self
    }

    /// Copy of this port with a fresh identity
    pub fn instantiate(&self) -> Self {
        Self {
            id: PortId::new(),
            ..self.clone()
        }
    }

    /// Check if a connection to another port is valid
    pub fn can_connect(&self, other: &Port) -> bool {
        // Must be opposite directions
        if self.direction == other.direction {
            return false;
        }

        let (from, to) = match self.direction {
            PortDirection::Output => (self, other),
            PortDirection::Input => (other, self),
        };
        from.socket_type.can_connect_to(&to.socket_type)
    }
}

/// Value that can be stored in a port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PortValue {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i32),
    /// Float
    Float(f32),
    /// 3D vector
    Vector([f32; 3]),
    /// Color
    Color([f32; 4]),
    /// String
    String(String),
}

impl PortValue {
    /// Get the socket type for this value
    pub fn socket_type(&self) -> SocketType {
        match self {
            Self::Bool(_) => SocketType::Bool,
            Self::Int(_) => SocketType::Int,
            Self::Float(_) => SocketType::Float,
            Self::Vector(_) => SocketType::Vector,
            Self::Color(_) => SocketType::Color,
            Self::String(_) => SocketType::String,
        }
    }
}
