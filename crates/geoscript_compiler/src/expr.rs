// SPDX-License-Identifier: MIT OR Apache-2.0
//! Expression values.
//!
//! An [`Expr`] is a typed handle to one output port of a node in the graph
//! being built. Its capability methods insert the node that computes the
//! derived value and return a handle to that node's output.

use crate::args::{Args, CallResult, Operand};
use crate::context::BuildContext;
use crate::error::{CompileError, Result};
use geoscript_graph::{NodeId, PortId, PortValue, PropertyValue, SocketType};

/// Typed handle to a node output
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    graph: String,
    node: NodeId,
    port: PortId,
    socket_type: SocketType,
}

/// Arithmetic operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    /// `a + b`
    Add,
    /// `a - b`
    Subtract,
    /// `a * b`
    Multiply,
    /// `a / b`
    Divide,
    /// `a % b`
    Modulo,
}

impl MathOp {
    /// Enum case of the `operation` property
    pub fn case(&self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Subtract => "SUBTRACT",
            Self::Multiply => "MULTIPLY",
            Self::Divide => "DIVIDE",
            Self::Modulo => "MODULO",
        }
    }
}

/// Comparison operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `a < b`
    LessThan,
    /// `a <= b`
    LessEqual,
    /// `a > b`
    GreaterThan,
    /// `a >= b`
    GreaterEqual,
    /// `a == b`
    Equal,
    /// `a != b`
    NotEqual,
}

impl CompareOp {
    /// Enum case of the `operation` property
    pub fn case(&self) -> &'static str {
        match self {
            Self::LessThan => "LESS_THAN",
            Self::LessEqual => "LESS_EQUAL",
            Self::GreaterThan => "GREATER_THAN",
            Self::GreaterEqual => "GREATER_EQUAL",
            Self::Equal => "EQUAL",
            Self::NotEqual => "NOT_EQUAL",
        }
    }
}

/// Boolean logic operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    /// Both
    And,
    /// Either
    Or,
    /// Negation, unary
    Not,
    /// Not both
    Nand,
    /// Neither
    Nor,
    /// Equal
    Xnor,
    /// Not equal
    Xor,
    /// `!a | b`
    Imply,
    /// `a & !b`
    Nimply,
}

impl BooleanOp {
    /// Enum case of the `operation` property
    pub fn case(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::Nand => "NAND",
            Self::Nor => "NOR",
            Self::Xnor => "XNOR",
            Self::Xor => "XOR",
            Self::Imply => "IMPLY",
            Self::Nimply => "NIMPLY",
        }
    }
}

/// Vector component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// First component
    X,
    /// Second component
    Y,
    /// Third component
    Z,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }
}

/// How a sample key selects the source element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleMode {
    /// Key is an element index
    #[default]
    ByIndex,
    /// Key is a position, sampled at the nearest point
    NearestPoint,
    /// Key is a position, interpolated on the nearest surface
    NearestSurface,
}

const GEOMETRY_KIND_INDEX: &str = "GeometryNodeInputIndex";
const GEOMETRY_KIND_POSITION: &str = "GeometryNodeInputPosition";

impl Expr {
    /// Handle for an output port
    pub fn new(graph: &str, node: NodeId, port: PortId, socket_type: SocketType) -> Self {
        Self {
            graph: graph.to_string(),
            node,
            port,
            socket_type,
        }
    }

    /// Graph the value lives in
    pub fn graph(&self) -> &str {
        &self.graph
    }

    /// Producing node
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Producing output port
    pub fn port(&self) -> PortId {
        self.port
    }

    /// Socket type of the output
    pub fn socket_type(&self) -> &SocketType {
        &self.socket_type
    }

    fn invalid(&self, operation: &str) -> CompileError {
        CompileError::InvalidAccessor {
            operation: operation.to_string(),
            socket_type: self.socket_type.clone(),
        }
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    /// `self <op> rhs` on a new math node.
    ///
    /// A vector on either side selects the vector math node.
    pub fn arithmetic(&self, cx: &mut BuildContext, op: MathOp, rhs: impl Into<Operand>) -> Result<Expr> {
        let rhs = rhs.into();
        let node = self.math_node(cx, op, &rhs)?;
        let first = cx.input_port(node, 0)?;
        let second = cx.input_port(node, 1)?;
        cx.link(self, node, first)?;
        cx.bind_operand(&rhs, node, second)?;
        cx.first_output(node)
    }

    /// `lhs <op> self` on a new math node.
    ///
    /// A literal left operand is always carried by a constant node.
    pub fn reflected(&self, cx: &mut BuildContext, op: MathOp, lhs: impl Into<Operand>) -> Result<Expr> {
        let lhs = lhs.into();
        let node = self.math_node(cx, op, &lhs)?;
        let first = cx.input_port(node, 0)?;
        let second = cx.input_port(node, 1)?;
        let lhs = match lhs {
            Operand::Expr(expr) => expr,
            Operand::Literal(value) => cx.constant(&value)?,
        };
        cx.link(&lhs, node, first)?;
        cx.link(self, node, second)?;
        cx.first_output(node)
    }

    fn math_node(&self, cx: &mut BuildContext, op: MathOp, other: &Operand) -> Result<NodeId> {
        let other_is_vector = match other {
            Operand::Expr(expr) => expr.socket_type.is_vector(),
            Operand::Literal(value) => matches!(value, PortValue::Vector(_)),
        };
        let kind = if self.socket_type.is_vector() || other_is_vector {
            "ShaderNodeVectorMath"
        } else {
            "ShaderNodeMath"
        };
        let node = cx.add_node(kind)?;
        cx.set_property(node, "operation", PropertyValue::Enum(op.case().to_string()))?;
        Ok(node)
    }

    /// `self + rhs`
    pub fn add(&self, cx: &mut BuildContext, rhs: impl Into<Operand>) -> Result<Expr> {
        self.arithmetic(cx, MathOp::Add, rhs)
    }

    /// `self - rhs`
    pub fn sub(&self, cx: &mut BuildContext, rhs: impl Into<Operand>) -> Result<Expr> {
        self.arithmetic(cx, MathOp::Subtract, rhs)
    }

    /// `self * rhs`
    pub fn mul(&self, cx: &mut BuildContext, rhs: impl Into<Operand>) -> Result<Expr> {
        self.arithmetic(cx, MathOp::Multiply, rhs)
    }

    /// `self / rhs`
    pub fn div(&self, cx: &mut BuildContext, rhs: impl Into<Operand>) -> Result<Expr> {
        self.arithmetic(cx, MathOp::Divide, rhs)
    }

    /// `self % rhs`
    pub fn rem(&self, cx: &mut BuildContext, rhs: impl Into<Operand>) -> Result<Expr> {
        self.arithmetic(cx, MathOp::Modulo, rhs)
    }

    /// `lhs + self`
    pub fn radd(&self, cx: &mut BuildContext, lhs: impl Into<Operand>) -> Result<Expr> {
        self.reflected(cx, MathOp::Add, lhs)
    }

    /// `lhs - self`
    pub fn rsub(&self, cx: &mut BuildContext, lhs: impl Into<Operand>) -> Result<Expr> {
        self.reflected(cx, MathOp::Subtract, lhs)
    }

    /// `lhs * self`
    pub fn rmul(&self, cx: &mut BuildContext, lhs: impl Into<Operand>) -> Result<Expr> {
        self.reflected(cx, MathOp::Multiply, lhs)
    }

    /// `lhs / self`
    pub fn rdiv(&self, cx: &mut BuildContext, lhs: impl Into<Operand>) -> Result<Expr> {
        self.reflected(cx, MathOp::Divide, lhs)
    }

    /// `lhs % self`
    pub fn rrem(&self, cx: &mut BuildContext, lhs: impl Into<Operand>) -> Result<Expr> {
        self.reflected(cx, MathOp::Modulo, lhs)
    }

    // ========================================================================
    // Comparison and logic
    // ========================================================================

    /// Compare against `rhs`.
    ///
    /// Equality of booleans lowers to boolean math XNOR, inequality to XOR.
    pub fn compare(&self, cx: &mut BuildContext, op: CompareOp, rhs: impl Into<Operand>) -> Result<Expr> {
        let rhs = rhs.into();
        match (&self.socket_type, op) {
            (SocketType::Bool, CompareOp::Equal) => return self.boolean(cx, BooleanOp::Xnor, Some(rhs)),
            (SocketType::Bool, CompareOp::NotEqual) => return self.boolean(cx, BooleanOp::Xor, Some(rhs)),
            _ => {}
        }

        let data_type = match self.socket_type {
            SocketType::Bool => "FLOAT",
            SocketType::Float | SocketType::Int | SocketType::Vector | SocketType::String | SocketType::Color => {
                self.socket_type.data_type()
            }
            _ => return Err(self.invalid(op.case())),
        };
        let node = cx.add_node("FunctionNodeCompare")?;
        cx.set_property(node, "data_type", PropertyValue::Enum(data_type.to_string()))?;
        cx.set_property(node, "operation", PropertyValue::Enum(op.case().to_string()))?;

        let inputs = cx.enabled_inputs(node)?;
        let (a, b) = match inputs.as_slice() {
            [a, b, ..] => (*a, *b),
            _ => return Err(self.invalid(op.case())),
        };
        cx.link(self, node, a)?;
        cx.bind_operand(&rhs, node, b)?;
        cx.first_output(node)
    }

    /// `self == rhs`
    pub fn equal(&self, cx: &mut BuildContext, rhs: impl Into<Operand>) -> Result<Expr> {
        self.compare(cx, CompareOp::Equal, rhs)
    }

    /// `self != rhs`
    pub fn not_equal(&self, cx: &mut BuildContext, rhs: impl Into<Operand>) -> Result<Expr> {
        self.compare(cx, CompareOp::NotEqual, rhs)
    }

    /// `self < rhs`
    pub fn less_than(&self, cx: &mut BuildContext, rhs: impl Into<Operand>) -> Result<Expr> {
        self.compare(cx, CompareOp::LessThan, rhs)
    }

    /// `self <= rhs`
    pub fn less_equal(&self, cx: &mut BuildContext, rhs: impl Into<Operand>) -> Result<Expr> {
        self.compare(cx, CompareOp::LessEqual, rhs)
    }

    /// `self > rhs`
    pub fn greater_than(&self, cx: &mut BuildContext, rhs: impl Into<Operand>) -> Result<Expr> {
        self.compare(cx, CompareOp::GreaterThan, rhs)
    }

    /// `self >= rhs`
    pub fn greater_equal(&self, cx: &mut BuildContext, rhs: impl Into<Operand>) -> Result<Expr> {
        self.compare(cx, CompareOp::GreaterEqual, rhs)
    }

    /// Boolean math with an optional second operand
    pub fn boolean(&self, cx: &mut BuildContext, op: BooleanOp, rhs: Option<Operand>) -> Result<Expr> {
        let node = cx.add_node("FunctionNodeBooleanMath")?;
        cx.set_property(node, "operation", PropertyValue::Enum(op.case().to_string()))?;
        let inputs = cx.enabled_inputs(node)?;
        let first = *inputs.first().ok_or_else(|| self.invalid(op.case()))?;
        cx.link(self, node, first)?;
        if let Some(rhs) = rhs {
            let second = *inputs.get(1).ok_or_else(|| self.invalid(op.case()))?;
            cx.bind_operand(&rhs, node, second)?;
        }
        cx.first_output(node)
    }

    /// `self & rhs`
    pub fn and(&self, cx: &mut BuildContext, rhs: impl Into<Operand>) -> Result<Expr> {
        self.boolean(cx, BooleanOp::And, Some(rhs.into()))
    }

    /// `self | rhs`
    pub fn or(&self, cx: &mut BuildContext, rhs: impl Into<Operand>) -> Result<Expr> {
        self.boolean(cx, BooleanOp::Or, Some(rhs.into()))
    }

    /// `~self`
    pub fn not(&self, cx: &mut BuildContext) -> Result<Expr> {
        self.boolean(cx, BooleanOp::Not, None)
    }

    // ========================================================================
    // Components
    // ========================================================================

    /// One component of a vector, through a new separate node
    pub fn component(&self, cx: &mut BuildContext, axis: Axis) -> Result<Expr> {
        if !self.socket_type.is_vector() {
            return Err(self.invalid(axis.name()));
        }
        let node = cx.add_node("ShaderNodeSeparateXYZ")?;
        let input = cx.input_port(node, 0)?;
        cx.link(self, node, input)?;
        cx.output(node, axis.index())
    }

    /// `self.x`
    pub fn x(&self, cx: &mut BuildContext) -> Result<Expr> {
        self.component(cx, Axis::X)
    }

    /// `self.y`
    pub fn y(&self, cx: &mut BuildContext) -> Result<Expr> {
        self.component(cx, Axis::Y)
    }

    /// `self.z`
    pub fn z(&self, cx: &mut BuildContext) -> Result<Expr> {
        self.component(cx, Axis::Z)
    }

    // ========================================================================
    // Sampling
    // ========================================================================

    /// Evaluate this field on another geometry, `self[key, mode, domain]`.
    ///
    /// Without a key, by-index sampling reads the index field and positional
    /// modes read the position field.
    pub fn sample(
        &self,
        cx: &mut BuildContext,
        geometry: &Expr,
        mode: SampleMode,
        at: Option<Operand>,
        domain: Option<&str>,
    ) -> Result<Expr> {
        let data_type = match self.socket_type {
            SocketType::Float => "FLOAT",
            SocketType::Int => "INT",
            SocketType::Vector => "FLOAT_VECTOR",
            SocketType::Color => "FLOAT_COLOR",
            SocketType::Bool => "BOOLEAN",
            _ => return Err(self.invalid("sample")),
        };

        match mode {
            SampleMode::ByIndex => {
                let index = match at {
                    Some(index) => index,
                    None => Operand::Expr(field(cx, GEOMETRY_KIND_INDEX)?),
                };
                self.sample_index(cx, geometry, data_type, &index, domain)
            }
            SampleMode::NearestPoint => {
                let position = match at {
                    Some(position) => position,
                    None => Operand::Expr(field(cx, GEOMETRY_KIND_POSITION)?),
                };
                let nearest = cx.add_node("GeometryNodeSampleNearest")?;
                if let Some(domain) = domain {
                    cx.set_property(nearest, "domain", PropertyValue::Enum(domain.to_string()))?;
                }
                let input = cx.input_named(nearest, "Geometry")?;
                cx.link(geometry, nearest, input)?;
                let input = cx.input_named(nearest, "Sample Position")?;
                cx.bind_operand(&position, nearest, input)?;
                let index = Operand::Expr(cx.first_output(nearest)?);
                self.sample_index(cx, geometry, data_type, &index, domain)
            }
            SampleMode::NearestSurface => {
                let position = match at {
                    Some(position) => position,
                    None => Operand::Expr(field(cx, GEOMETRY_KIND_POSITION)?),
                };
                if domain.is_some() {
                    tracing::debug!("Nearest surface sampling ignores the domain");
                }
                let node = cx.add_node("GeometryNodeSampleNearestSurface")?;
                cx.set_property(node, "data_type", PropertyValue::Enum(data_type.to_string()))?;
                let input = cx.input_named(node, "Mesh")?;
                cx.link(geometry, node, input)?;
                let input = cx.input_named(node, "Value")?;
                cx.link(self, node, input)?;
                let input = cx.input_named(node, "Sample Position")?;
                cx.bind_operand(&position, node, input)?;
                cx.first_output(node)
            }
        }
    }

    fn sample_index(
        &self,
        cx: &mut BuildContext,
        geometry: &Expr,
        data_type: &str,
        index: &Operand,
        domain: Option<&str>,
    ) -> Result<Expr> {
        let node = cx.add_node("GeometryNodeSampleIndex")?;
        cx.set_property(node, "data_type", PropertyValue::Enum(data_type.to_string()))?;
        if let Some(domain) = domain {
            cx.set_property(node, "domain", PropertyValue::Enum(domain.to_string()))?;
        }
        let input = cx.input_named(node, "Geometry")?;
        cx.link(geometry, node, input)?;
        let input = cx.input_named(node, "Value")?;
        cx.link(self, node, input)?;
        let input = cx.input_named(node, "Index")?;
        cx.bind_operand(index, node, input)?;
        cx.first_output(node)
    }

    // ========================================================================
    // Calls
    // ========================================================================

    /// Call a function with this value as the primary argument
    pub fn chain(&self, cx: &mut BuildContext, function: &str, args: Args) -> Result<CallResult> {
        cx.call(function, Some(self), args)
    }

    /// Expand an integer into `(index, points)`.
    ///
    /// Creates a points node with this value as the count, plus an index
    /// field to address them.
    pub fn iterate_points(&self, cx: &mut BuildContext) -> Result<(Expr, Expr)> {
        if self.socket_type != SocketType::Int {
            return Err(self.invalid("iterate"));
        }
        let points = cx.lower("GeometryNodePoints", Some(self), Args::new())?.single()?;
        let index = field(cx, GEOMETRY_KIND_INDEX)?;
        Ok((index, points))
    }
}

/// Output of a new input field node
fn field(cx: &mut BuildContext, kind: &str) -> Result<Expr> {
    let node = cx.add_node(kind)?;
    cx.first_output(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Session;
    use geoscript_graph::GraphStore;

    fn with_context<T>(test: impl FnOnce(&mut BuildContext) -> T) -> T {
        let session = Session::standard();
        let mut store = GraphStore::new();
        store.get_or_create("Test");
        let mut cx = session.context(&mut store);
        cx.push_scope("Test");
        test(&mut cx)
    }

    fn operation(cx: &BuildContext, expr: &Expr) -> String {
        cx.node(expr.node())
            .unwrap()
            .property("operation")
            .and_then(PropertyValue::as_enum)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_scalar_and_vector_arithmetic() {
        with_context(|cx| {
            let value = cx.constant(&PortValue::Float(2.0)).unwrap();
            let sum = value.add(cx, 3.0).unwrap();
            assert_eq!(cx.node(sum.node()).unwrap().kind, "ShaderNodeMath");
            assert_eq!(operation(cx, &sum), "ADD");

            let scaled = value.mul(cx, [1.0, 2.0, 3.0]).unwrap();
            assert_eq!(cx.node(scaled.node()).unwrap().kind, "ShaderNodeVectorMath");
            assert_eq!(scaled.socket_type(), &SocketType::Vector);
        });
    }

    #[test]
    fn test_literal_operand_becomes_default() {
        with_context(|cx| {
            let value = cx.constant(&PortValue::Float(2.0)).unwrap();
            let sum = value.add(cx, 3.0).unwrap();
            let node = cx.node(sum.node()).unwrap();
            assert_eq!(node.inputs[1].default_value, Some(PortValue::Float(3.0)));
            assert_eq!(cx.graph().unwrap().link_count(), 1);
        });
    }

    #[test]
    fn test_reflected_subtraction_keeps_order() {
        with_context(|cx| {
            let value = cx.constant(&PortValue::Float(2.0)).unwrap();
            let diff = value.rsub(cx, 5.0).unwrap();
            assert_eq!(operation(cx, &diff), "SUBTRACT");

            let graph = cx.graph().unwrap();
            let node = graph.node(diff.node()).unwrap();
            let first = graph.links_to(node.inputs[0].id).next().unwrap();
            let second = graph.links_to(node.inputs[1].id).next().unwrap();
            assert_eq!(second.from_node, value.node());
            let constant = graph.node(first.from_node).unwrap();
            assert_eq!(constant.kind, "ShaderNodeValue");
            assert_eq!(constant.outputs[0].default_value, Some(PortValue::Float(5.0)));
        });
    }

    #[test]
    fn test_boolean_equality_uses_boolean_math() {
        with_context(|cx| {
            let flag = cx.constant(&PortValue::Bool(true)).unwrap();
            let eq = flag.equal(cx, false).unwrap();
            assert_eq!(cx.node(eq.node()).unwrap().kind, "FunctionNodeBooleanMath");
            assert_eq!(operation(cx, &eq), "XNOR");

            let ne = flag.not_equal(cx, false).unwrap();
            assert_eq!(operation(cx, &ne), "XOR");
        });
    }

    #[test]
    fn test_operator_methods_pick_operations() {
        with_context(|cx| {
            let value = cx.constant(&PortValue::Float(2.0)).unwrap();
            let results = [
                (value.sub(cx, 1.0).unwrap(), "SUBTRACT"),
                (value.div(cx, 4.0).unwrap(), "DIVIDE"),
                (value.rem(cx, 3.0).unwrap(), "MODULO"),
                (value.radd(cx, 1.0).unwrap(), "ADD"),
                (value.rmul(cx, 2.0).unwrap(), "MULTIPLY"),
                (value.rdiv(cx, 8.0).unwrap(), "DIVIDE"),
                (value.rrem(cx, 5.0).unwrap(), "MODULO"),
                (value.less_equal(cx, 1.0).unwrap(), "LESS_EQUAL"),
                (value.greater_than(cx, 1.0).unwrap(), "GREATER_THAN"),
                (value.greater_equal(cx, 1.0).unwrap(), "GREATER_EQUAL"),
            ];
            for (expr, case) in &results {
                assert_eq!(operation(cx, expr), *case);
            }
            let compare = cx.node(results[9].0.node()).unwrap();
            assert_eq!(compare.property("data_type").and_then(PropertyValue::as_enum), Some("FLOAT"));
        });
    }

    #[test]
    fn test_compare_uses_typed_inputs() {
        with_context(|cx| {
            let count = cx.constant(&PortValue::Int(3)).unwrap();
            let lt = count.less_than(cx, 10).unwrap();
            let node = cx.node(lt.node()).unwrap();
            assert_eq!(node.property("data_type").and_then(PropertyValue::as_enum), Some("INT"));
            let b = node.enabled_inputs().nth(1).unwrap();
            assert_eq!(b.socket_type, SocketType::Int);
            assert_eq!(b.default_value, Some(PortValue::Int(10)));
            assert_eq!(lt.socket_type(), &SocketType::Bool);
        });
    }

    #[test]
    fn test_components_require_vectors() {
        with_context(|cx| {
            let vector = cx.constant(&PortValue::Vector([1.0, 2.0, 3.0])).unwrap();
            let x = vector.x(cx).unwrap();
            let y = vector.y(cx).unwrap();
            assert_ne!(x.node(), y.node());
            assert_eq!(y.socket_type(), &SocketType::Float);

            let scalar = cx.constant(&PortValue::Float(1.0)).unwrap();
            assert!(matches!(scalar.x(cx), Err(CompileError::InvalidAccessor { .. })));
        });
    }

    #[test]
    fn test_sample_nearest_feeds_sample_index() {
        with_context(|cx| {
            let cube = cx.call("cube", None, Args::new()).unwrap().single().unwrap();
            let position = field(cx, GEOMETRY_KIND_POSITION).unwrap();
            let sampled = position
                .sample(cx, &cube, SampleMode::NearestPoint, None, None)
                .unwrap();

            let graph = cx.graph().unwrap();
            let node = graph.node(sampled.node()).unwrap();
            assert_eq!(node.kind, "GeometryNodeSampleIndex");
            assert_eq!(sampled.socket_type(), &SocketType::Vector);
            let kinds: Vec<_> = graph.nodes().map(|n| n.kind.as_str()).collect();
            assert!(kinds.contains(&"GeometryNodeSampleNearest"));
        });
    }

    #[test]
    fn test_iterate_points() {
        with_context(|cx| {
            let count = cx.constant(&PortValue::Int(8)).unwrap();
            let (index, points) = count.iterate_points(cx).unwrap();
            assert_eq!(index.socket_type(), &SocketType::Int);
            assert_eq!(points.socket_type(), &SocketType::Geometry);
            let graph = cx.graph().unwrap();
            let count_port = graph.node(points.node()).unwrap().inputs[0].id;
            assert!(graph.is_linked(count_port));
        });
    }
}
