// SPDX-License-Identifier: MIT OR Apache-2.0
//! Call arguments and call results.

use crate::error::{CompileError, Result};
use crate::expr::Expr;
use crate::signature::GroupValue;
use geoscript_graph::PortValue;
use indexmap::IndexMap;

/// A value usable where a single socket value is expected
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Output of another node
    Expr(Expr),
    /// Raw literal
    Literal(PortValue),
}

impl From<Expr> for Operand {
    fn from(expr: Expr) -> Self {
        Self::Expr(expr)
    }
}

impl From<&Expr> for Operand {
    fn from(expr: &Expr) -> Self {
        Self::Expr(expr.clone())
    }
}

impl From<PortValue> for Operand {
    fn from(value: PortValue) -> Self {
        Self::Literal(value)
    }
}

impl From<f32> for Operand {
    fn from(value: f32) -> Self {
        Self::Literal(PortValue::Float(value))
    }
}

impl From<i32> for Operand {
    fn from(value: i32) -> Self {
        Self::Literal(PortValue::Int(value))
    }
}

impl From<bool> for Operand {
    fn from(value: bool) -> Self {
        Self::Literal(PortValue::Bool(value))
    }
}

impl From<[f32; 3]> for Operand {
    fn from(value: [f32; 3]) -> Self {
        Self::Literal(PortValue::Vector(value))
    }
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Self::Literal(PortValue::String(value.to_string()))
    }
}

/// A call argument
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// Output of another node
    Expr(Expr),
    /// Raw literal
    Literal(PortValue),
    /// Ordered values for multi-input or same-named ports
    List(Vec<Arg>),
    /// Enum case identifier for a property
    Enum(String),
    /// Populated input group, spread into its fields
    Group(GroupValue),
}

impl Arg {
    /// Whether every element of a non-empty list is a node output
    pub fn is_expr_list(&self) -> bool {
        match self {
            Self::List(items) => !items.is_empty() && items.iter().all(|a| matches!(a, Self::Expr(_))),
            _ => false,
        }
    }

    /// Literal carried by the argument, folding numeric triples into vectors
    pub fn literal(&self) -> Option<PortValue> {
        match self {
            Self::Literal(value) => Some(value.clone()),
            Self::Enum(case) => Some(PortValue::String(case.clone())),
            Self::List(items) => {
                let numbers: Option<Vec<f32>> = items
                    .iter()
                    .map(|item| match item {
                        Self::Literal(PortValue::Float(v)) => Some(*v),
                        Self::Literal(PortValue::Int(v)) => Some(*v as f32),
                        _ => None,
                    })
                    .collect();
                match numbers?.as_slice() {
                    [x, y, z] => Some(PortValue::Vector([*x, *y, *z])),
                    [r, g, b, a] => Some(PortValue::Color([*r, *g, *b, *a])),
                    _ => None,
                }
            }
            Self::Expr(_) | Self::Group(_) => None,
        }
    }
}

impl From<Operand> for Arg {
    fn from(operand: Operand) -> Self {
        match operand {
            Operand::Expr(expr) => Self::Expr(expr),
            Operand::Literal(value) => Self::Literal(value),
        }
    }
}

impl From<Expr> for Arg {
    fn from(expr: Expr) -> Self {
        Self::Expr(expr)
    }
}

impl From<&Expr> for Arg {
    fn from(expr: &Expr) -> Self {
        Self::Expr(expr.clone())
    }
}

impl From<PortValue> for Arg {
    fn from(value: PortValue) -> Self {
        Self::Literal(value)
    }
}

impl From<f32> for Arg {
    fn from(value: f32) -> Self {
        Self::Literal(PortValue::Float(value))
    }
}

impl From<i32> for Arg {
    fn from(value: i32) -> Self {
        Self::Literal(PortValue::Int(value))
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Self::Literal(PortValue::Bool(value))
    }
}

impl From<[f32; 3]> for Arg {
    fn from(value: [f32; 3]) -> Self {
        Self::Literal(PortValue::Vector(value))
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::Literal(PortValue::String(value.to_string()))
    }
}

impl From<Vec<Expr>> for Arg {
    fn from(values: Vec<Expr>) -> Self {
        Self::List(values.into_iter().map(Self::Expr).collect())
    }
}

impl From<Vec<Arg>> for Arg {
    fn from(values: Vec<Arg>) -> Self {
        Self::List(values)
    }
}

impl From<GroupValue> for Arg {
    fn from(group: GroupValue) -> Self {
        Self::Group(group)
    }
}

/// Named call arguments, in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    values: IndexMap<String, Arg>,
}

impl Args {
    /// No arguments
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an argument
    pub fn with(mut self, name: &str, value: impl Into<Arg>) -> Self {
        self.insert(name, value);
        self
    }

    /// Add an enum case argument
    pub fn with_enum(mut self, name: &str, case: &str) -> Self {
        self.insert(name, Arg::Enum(case.to_string()));
        self
    }

    /// Add or replace an argument
    pub fn insert(&mut self, name: &str, value: impl Into<Arg>) {
        self.values.insert(name.to_string(), value.into());
    }

    /// Look up an argument
    pub fn get(&self, name: &str) -> Option<&Arg> {
        self.values.get(name)
    }

    /// Take an argument out
    pub fn remove(&mut self, name: &str) -> Option<Arg> {
        self.values.shift_remove(name)
    }

    /// Whether an argument is present
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// All arguments
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arg)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Argument names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of arguments
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no arguments
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replace every group argument by its fields
    pub fn spread_groups(self) -> Self {
        let mut values = IndexMap::with_capacity(self.values.len());
        for (name, value) in self.values {
            match value {
                Arg::Group(group) => {
                    for (field, expr) in group.fields() {
                        values.insert(field.to_string(), Arg::Expr(expr.clone()));
                    }
                }
                other => {
                    values.insert(name, other);
                }
            }
        }
        Self { values }
    }
}

/// Outputs of a lowered call
#[derive(Debug, Clone, PartialEq)]
pub enum CallResult {
    /// The node has exactly one enabled output
    Single(Expr),
    /// Enabled outputs by snake-cased name
    Named(IndexMap<String, Expr>),
}

impl CallResult {
    /// The only output
    pub fn single(self) -> Result<Expr> {
        match self {
            Self::Single(expr) => Ok(expr),
            Self::Named(outputs) => Err(CompileError::ArgumentShape {
                argument: outputs.keys().cloned().collect::<Vec<_>>().join(", "),
                reason: "call has several outputs, select one by name".to_string(),
            }),
        }
    }

    /// Output by snake-cased name
    pub fn output(&self, name: &str) -> Result<Expr> {
        match self {
            Self::Named(outputs) => outputs.get(name).cloned(),
            Self::Single(_) => None,
        }
        .ok_or_else(|| CompileError::UnknownOutput {
            node: "call".to_string(),
            output: name.to_string(),
        })
    }

    /// All outputs in declaration order
    pub fn exprs(&self) -> Vec<Expr> {
        match self {
            Self::Single(expr) => vec![expr.clone()],
            Self::Named(outputs) => outputs.values().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_lists_fold_into_vectors() {
        let arg = Arg::List(vec![Arg::from(1.0), Arg::from(2), Arg::from(3.0)]);
        assert_eq!(arg.literal(), Some(PortValue::Vector([1.0, 2.0, 3.0])));

        let arg = Arg::List(vec![Arg::from(1.0), Arg::from(2.0)]);
        assert_eq!(arg.literal(), None);
    }

    #[test]
    fn test_args_keep_insertion_order() {
        let args = Args::new().with("size", 2.0).with_enum("operation", "ADD").with("count", 3);
        let names: Vec<_> = args.names().collect();
        assert_eq!(names, vec!["size", "operation", "count"]);
        assert_eq!(args.get("operation"), Some(&Arg::Enum("ADD".to_string())));
    }
}
