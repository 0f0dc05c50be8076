// SPDX-License-Identifier: MIT OR Apache-2.0
//! Call programs.
//!
//! A [`Program`] is the linear form of a graph: a signature, one call
//! statement per node (zones nest their step statements) and a return
//! mapping. The decompiler produces it, [`Program::render`] prints it as a
//! script, the parser reads it back and [`lower_program`] builds it into a
//! graph again.

use crate::args::{Arg, Args, CallResult, Operand};
use crate::context::BuildContext;
use crate::error::{CompileError, Result};
use crate::scope::{build, Returns, Subroutine};
use crate::signature::{Input, Inputs, Param, Signature};
use crate::zone::{repeat, simulation};
use geoscript_graph::PortValue;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// A script value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    /// Integer literal
    Int(i32),
    /// Float literal
    Float(f32),
    /// `True` / `False`
    Bool(bool),
    /// Quoted string
    String(String),
    /// `(x, y, z)`
    Vector([f32; 3]),
    /// `(r, g, b, a)`
    Color([f32; 4]),
    /// `[a, b, ...]`
    List(Vec<Value>),
    /// Parameter or statement
    Name(String),
    /// `statement.output`
    Attr(String, String),
}

impl Value {
    /// Literal carried by the value, if any
    pub fn literal(&self) -> Option<PortValue> {
        match self {
            Self::Int(v) => Some(PortValue::Int(*v)),
            Self::Float(v) => Some(PortValue::Float(*v)),
            Self::Bool(v) => Some(PortValue::Bool(*v)),
            Self::String(v) => Some(PortValue::String(v.clone())),
            Self::Vector(v) => Some(PortValue::Vector(*v)),
            Self::Color(v) => Some(PortValue::Color(*v)),
            Self::List(_) | Self::Name(_) | Self::Attr(..) => None,
        }
    }
}

impl From<&PortValue> for Value {
    fn from(value: &PortValue) -> Self {
        match value {
            PortValue::Bool(v) => Self::Bool(*v),
            PortValue::Int(v) => Self::Int(*v),
            PortValue::Float(v) => Self::Float(*v),
            PortValue::Vector(v) => Self::Vector(*v),
            PortValue::Color(v) => Self::Color(*v),
            PortValue::String(v) => Self::String(v.clone()),
        }
    }
}

fn write_float(f: &mut fmt::Formatter<'_>, value: f32) -> fmt::Result {
    write!(f, "{value:?}")
}

fn write_floats(f: &mut fmt::Formatter<'_>, values: &[f32]) -> fmt::Result {
    f.write_str("(")?;
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_float(f, *v)?;
    }
    f.write_str(")")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write_float(f, *v),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::String(v) => {
                let escaped = v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n");
                write!(f, "\"{escaped}\"")
            }
            Self::Vector(v) => write_floats(f, v),
            Self::Color(v) => write_floats(f, v),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Name(name) => f.write_str(name),
            Self::Attr(name, output) => write!(f, "{name}.{output}"),
        }
    }
}

/// A signature parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    /// Script name
    pub name: String,
    /// Wrapper type name (`Float`, `Geometry`, ...)
    pub type_name: String,
    /// Default value
    pub default: Option<Value>,
}

/// `target = function(args)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Call {
    /// Bound name
    pub target: String,
    /// Called function
    pub function: String,
    /// Named arguments, in order
    pub args: Vec<(String, Value)>,
}

/// Zone flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ZoneKind {
    /// Runs the step a fixed number of times
    Repeat,
    /// Advances the state once per frame
    Simulation,
}

impl ZoneKind {
    /// Decorator naming the zone in script text
    pub fn decorator(&self) -> &'static str {
        match self {
            Self::Repeat => "repeat_zone",
            Self::Simulation => "simulation_zone",
        }
    }
}

/// Argument carrying the iteration count of a repeat zone
pub const ITERATIONS_ARG: &str = "iterations";

/// Step parameter a simulation zone passes before its state items
pub const DELTA_TIME_ARG: &str = "delta_time";

/// A repeat or simulation zone.
///
/// Renders as a decorated step function followed by the call that binds
/// the zone's outputs to `target`:
///
/// ```text
/// @repeat_zone
/// def zone1_step(geometry: Geometry):
///     geometry1 = transform_geometry(geometry=geometry)
///     return (geometry1)
/// zone1 = zone1_step(iterations=3, geometry=mesh1)
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Zone {
    /// Bound name of the zone outputs
    pub target: String,
    /// Repeat or simulation
    pub kind: ZoneKind,
    /// State items, in order
    pub items: Vec<Parameter>,
    /// Iteration count and initial item values
    pub args: Vec<(String, Value)>,
    /// Statements of the step
    pub body: Vec<Statement>,
    /// Next value of each item, in item order
    pub next: Vec<Value>,
}

impl Zone {
    /// Name of the rendered step function
    pub fn step_name(&self) -> String {
        format!("{}_step", self.target)
    }
}

/// One statement of a program body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    /// Node call
    Call(Call),
    /// Zone with its step statements
    Zone(Zone),
}

impl Statement {
    /// Name the statement binds
    pub fn target(&self) -> &str {
        match self {
            Self::Call(call) => &call.target,
            Self::Zone(zone) => &zone.target,
        }
    }

    /// The call, unless this is a zone
    pub fn as_call(&self) -> Option<&Call> {
        match self {
            Self::Call(call) => Some(call),
            Self::Zone(_) => None,
        }
    }

    /// The zone, unless this is a call
    pub fn as_zone(&self) -> Option<&Zone> {
        match self {
            Self::Call(_) => None,
            Self::Zone(zone) => Some(zone),
        }
    }
}

/// A linear call program
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    /// Graph name
    pub name: String,
    /// Inputs
    pub params: Vec<Parameter>,
    /// Calls, dependencies first
    pub statements: Vec<Statement>,
    /// Outputs by name
    pub returns: Vec<(String, Value)>,
}

impl Program {
    /// Script text of the program
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Function name the program is declared under
    pub fn function_name(&self) -> String {
        crate::naming::snake_case(&self.name)
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[(String, Value)]) -> fmt::Result {
    for (i, (name, value)) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{name}={value}")?;
    }
    Ok(())
}

fn write_params<'p>(f: &mut fmt::Formatter<'_>, params: impl Iterator<Item = &'p Parameter>) -> fmt::Result {
    for (i, param) in params.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}: {}", param.name, param.type_name)?;
        if let Some(default) = &param.default {
            write!(f, " = {default}")?;
        }
    }
    Ok(())
}

fn write_statements(f: &mut fmt::Formatter<'_>, statements: &[Statement], depth: usize) -> fmt::Result {
    let pad = "    ".repeat(depth);
    for statement in statements {
        match statement {
            Statement::Call(call) => {
                write!(f, "{pad}{} = {}(", call.target, call.function)?;
                write_args(f, &call.args)?;
                writeln!(f, ")")?;
            }
            Statement::Zone(zone) => {
                writeln!(f, "{pad}@{}", zone.kind.decorator())?;
                write!(f, "{pad}def {}(", zone.step_name())?;
                let delta_time = Parameter {
                    name: DELTA_TIME_ARG.to_string(),
                    type_name: "Float".to_string(),
                    default: None,
                };
                let leading = (zone.kind == ZoneKind::Simulation).then_some(&delta_time);
                write_params(f, leading.into_iter().chain(&zone.items))?;
                writeln!(f, "):")?;
                write_statements(f, &zone.body, depth + 1)?;
                write!(f, "{pad}    return (")?;
                for (i, value) in zone.next.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                writeln!(f, ")")?;
                write!(f, "{pad}{} = {}(", zone.target, zone.step_name())?;
                write_args(f, &zone.args)?;
                writeln!(f, ")")?;
            }
        }
    }
    Ok(())
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "from geometry_script import *")?;
        writeln!(f)?;
        writeln!(f, "@tree({})", Value::String(self.name.clone()))?;
        write!(f, "def {}(", self.function_name())?;
        write_params(f, self.params.iter())?;
        writeln!(f, "):")?;
        write_statements(f, &self.statements, 1)?;

        if self.returns.is_empty() {
            return writeln!(f, "    return {{}}");
        }
        f.write_str("    return { ")?;
        for (i, (key, value)) in self.returns.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {value}", Value::String(key.clone()))?;
        }
        writeln!(f, " }}")
    }
}

/// Values bound while lowering a program
#[derive(Clone, Default)]
struct Environment {
    bindings: HashMap<String, CallResult>,
}

impl Environment {
    fn lookup(&self, name: &str) -> Result<&CallResult> {
        self.bindings
            .get(name)
            .ok_or_else(|| CompileError::UnknownName(name.to_string()))
    }

    fn arg(&self, value: &Value) -> Result<Arg> {
        Ok(match value {
            Value::List(items) => Arg::List(items.iter().map(|v| self.arg(v)).collect::<Result<_>>()?),
            Value::Name(name) => Arg::Expr(self.lookup(name)?.clone().single()?),
            Value::Attr(name, output) => Arg::Expr(self.lookup(name)?.output(output)?),
            literal => Arg::Literal(literal.literal().ok_or_else(|| CompileError::ArgumentShape {
                argument: literal.to_string(),
                reason: "not a literal".to_string(),
            })?),
        })
    }

    fn operand(&self, value: &Value) -> Result<Operand> {
        match self.arg(value)? {
            Arg::Expr(expr) => Ok(Operand::Expr(expr)),
            Arg::Literal(literal) => Ok(Operand::Literal(literal)),
            _ => Err(CompileError::ArgumentShape {
                argument: value.to_string(),
                reason: "expected a single value".to_string(),
            }),
        }
    }
}

/// Build a program into the graph it is named after
pub fn lower_program(cx: &mut BuildContext, program: &Program) -> Result<Subroutine> {
    let mut signature = Signature::new();
    for param in &program.params {
        let mut declared = Param::new(&param.name, &param.type_name);
        if let Some(default) = &param.default {
            let literal = default.literal().ok_or_else(|| CompileError::Configuration {
                param: param.name.clone(),
                reason: format!("default {default} is not a literal"),
            })?;
            declared = declared.with_default(literal);
        }
        signature = signature.param(declared);
    }

    build(cx, &program.name, &signature, |cx, inputs| {
        let mut env = Environment::default();
        for param in &program.params {
            let value = inputs.get(&param.name)?.clone();
            env.bindings.insert(param.name.clone(), CallResult::Single(value));
        }
        lower_statements(cx, &mut env, &program.statements)?;

        let returns = program
            .returns
            .iter()
            .map(|(key, value)| Ok((key.clone(), env.operand(value)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Returns::Named(returns))
    })
}

fn lower_statements(cx: &mut BuildContext, env: &mut Environment, statements: &[Statement]) -> Result<()> {
    for statement in statements {
        let result = match statement {
            Statement::Call(call) => {
                let mut args = Args::new();
                for (name, value) in &call.args {
                    args.insert(name, env.arg(value)?);
                }
                cx.call(&call.function, None, args)?
            }
            Statement::Zone(zone) => lower_zone(cx, env, zone)?,
        };
        env.bindings.insert(statement.target().to_string(), result);
    }
    Ok(())
}

fn lower_zone(cx: &mut BuildContext, env: &Environment, zone: &Zone) -> Result<CallResult> {
    let items: Vec<Param> = zone
        .items
        .iter()
        .map(|item| Param::new(&item.name, &item.type_name))
        .collect();

    let mut iterations = Operand::Literal(PortValue::Int(1));
    let mut initial = Args::new();
    for (name, value) in &zone.args {
        if zone.kind == ZoneKind::Repeat && name == ITERATIONS_ARG {
            iterations = env.operand(value)?;
        } else {
            initial.insert(name, env.arg(value)?);
        }
    }

    match zone.kind {
        ZoneKind::Repeat => repeat(cx, iterations, &items, initial, |cx, state| run_step(cx, state, env, zone)),
        ZoneKind::Simulation => simulation(cx, &items, initial, |cx, state| run_step(cx, state, env, zone)),
    }
}

/// Lower a zone body with the state values in scope
fn run_step(cx: &mut BuildContext, state: &Inputs, env: &Environment, zone: &Zone) -> Result<Vec<Operand>> {
    let mut scope = env.clone();
    for (name, input) in state.iter() {
        if let Input::Value(expr) = input {
            scope.bindings.insert(name.to_string(), CallResult::Single(expr.clone()));
        }
    }
    lower_statements(cx, &mut scope, &zone.body)?;
    zone.next.iter().map(|value| scope.operand(value)).collect()
}
