// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph builder.
//!
//! [`build`] runs one lowering pass for a named graph: it reconciles the
//! interface with the signature, recreates the boundary nodes, runs the body
//! inside a new scope and wires the returned values to the outputs.

use crate::args::{Args, CallResult, Operand};
use crate::context::BuildContext;
use crate::error::{CompileError, Result};
use crate::expr::Expr;
use crate::signature::{Inputs, ResolvedParam, Signature};
use geoscript_graph::node::{GROUP_INPUT_KIND, GROUP_KIND, GROUP_OUTPUT_KIND, NODE_TREE_PROPERTY};
use geoscript_graph::{arrange, Graph, InterfaceSocket, LinkError, NodeId, PropertyValue, SocketType};

/// Values returned by a graph body
#[derive(Debug, Clone, PartialEq)]
pub enum Returns {
    /// One unnamed result
    Single(Operand),
    /// Several unnamed results
    Tuple(Vec<Operand>),
    /// Named results, in order
    Named(Vec<(String, Operand)>),
    /// Results produced one at a time; geometry is joined into one result
    Staged(Vec<Operand>),
}

impl From<Expr> for Returns {
    fn from(expr: Expr) -> Self {
        Self::Single(Operand::Expr(expr))
    }
}

impl From<CallResult> for Returns {
    fn from(result: CallResult) -> Self {
        match result {
            CallResult::Single(expr) => Self::Single(Operand::Expr(expr)),
            CallResult::Named(outputs) => Self::Named(
                outputs
                    .into_iter()
                    .map(|(name, expr)| (name, Operand::Expr(expr)))
                    .collect(),
            ),
        }
    }
}

/// A built graph, callable from other graphs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subroutine {
    graph: String,
}

impl Subroutine {
    /// Reference an existing graph by name
    pub fn new(graph: &str) -> Self {
        Self {
            graph: graph.to_string(),
        }
    }

    /// Name of the referenced graph
    pub fn graph(&self) -> &str {
        &self.graph
    }

    /// Insert a group node referencing the graph into the active graph
    pub fn call(&self, cx: &mut BuildContext, primary: Option<&Expr>, args: Args) -> Result<CallResult> {
        if cx.active_graph()? == self.graph {
            return Err(CompileError::RecursiveGroup(self.graph.clone()));
        }
        let interface = cx
            .store()
            .get(&self.graph)
            .ok_or_else(|| CompileError::UnknownGraph(self.graph.clone()))?
            .interface()
            .clone();

        let node = cx.add_node(GROUP_KIND)?;
        cx.set_property(node, NODE_TREE_PROPERTY, PropertyValue::GraphRef(self.graph.clone()))?;
        {
            let node = cx
                .graph_mut()?
                .node_mut(node)
                .ok_or(CompileError::Link(LinkError::NodeNotFound(node)))?;
            node.name = self.graph.clone();
            node.inputs = interface.input_ports();
            node.outputs = interface.output_ports();
        }
        cx.bind_arguments(node, primary, args)
    }
}

/// Build the graph `name` from a signature and a body.
///
/// The signature is validated before anything is touched. The previous
/// contents of the graph are discarded, but interface entries whose type is
/// unchanged keep their identity.
pub fn build<F, R>(cx: &mut BuildContext, name: &str, signature: &Signature, body: F) -> Result<Subroutine>
where
    F: FnOnce(&mut BuildContext, &Inputs) -> Result<R>,
    R: Into<Returns>,
{
    let session = cx.session();
    let params = signature.validate(session.sockets())?;

    let graph = cx.store_mut().get_or_create(name);
    graph.clear();
    reconcile_inputs(graph, &params);
    graph.clear_outputs();
    tracing::debug!("Building '{name}' with {} inputs", params.len());

    cx.push_scope(name);
    let result = run_body(cx, &params, body);
    cx.pop_scope();
    result?;

    if session.settings().auto_layout {
        if let Some(graph) = cx.store_mut().get_mut(name) {
            if let Err(e) = arrange(graph, &session.settings().layout) {
                tracing::warn!("Layout of '{name}' failed: {e}");
            }
        }
    }
    Ok(Subroutine::new(name))
}

/// Trim, update in place or recreate interface inputs
fn reconcile_inputs(graph: &mut Graph, params: &[ResolvedParam]) {
    graph.truncate_inputs(params.len());
    for (index, param) in params.iter().enumerate() {
        let existing = graph.interface().inputs.get(index).map(|e| e.socket_type.clone());
        match existing {
            Some(socket_type) if socket_type == param.entry.socket_type => {
                if let Some(entry) = graph.input_mut(index) {
                    let id = entry.id;
                    *entry = InterfaceSocket {
                        id,
                        ..param.entry.clone()
                    };
                }
            }
            Some(_) => graph.replace_input(index, param.entry.clone()),
            None => {
                graph.add_input(param.entry.clone());
            }
        }
    }
}

fn run_body<F, R>(cx: &mut BuildContext, params: &[ResolvedParam], body: F) -> Result<()>
where
    F: FnOnce(&mut BuildContext, &Inputs) -> Result<R>,
    R: Into<Returns>,
{
    // Boundary nodes pick up the reconciled interface when added
    let source = cx.add_node(GROUP_INPUT_KIND)?;
    let sink = cx.add_node(GROUP_OUTPUT_KIND)?;

    let mut inputs = Inputs::new();
    for (index, param) in params.iter().enumerate() {
        let value = cx.output(source, index)?;
        match &param.group {
            Some(group) => inputs.push_field(group, &param.key, value),
            None => inputs.push_value(&param.key, value),
        }
    }

    let returns = body(cx, &inputs)?.into();
    let outputs = collect_returns(cx, returns)?;
    bind_outputs(cx, sink, outputs)
}

fn collect_returns(cx: &mut BuildContext, returns: Returns) -> Result<Vec<(Option<String>, Operand)>> {
    let unnamed = |values: Vec<Operand>| -> Vec<(Option<String>, Operand)> {
        values.into_iter().map(|v| (None, v)).collect()
    };
    Ok(match returns {
        Returns::Single(value) => vec![(None, value)],
        Returns::Tuple(values) => unnamed(values),
        Returns::Named(values) => values.into_iter().map(|(k, v)| (Some(k), v)).collect(),
        Returns::Staged(values) => {
            let all_geometry = !values.is_empty()
                && values.iter().all(|v| {
                    matches!(v, Operand::Expr(expr) if *expr.socket_type() == SocketType::Geometry)
                });
            if all_geometry {
                let geometry: Vec<Expr> = values
                    .into_iter()
                    .filter_map(|v| match v {
                        Operand::Expr(expr) => Some(expr),
                        Operand::Literal(_) => None,
                    })
                    .collect();
                let joined = cx
                    .call("join_geometry", None, Args::new().with("geometry", geometry))?
                    .single()?;
                vec![(None, Operand::Expr(joined))]
            } else {
                unnamed(values)
            }
        }
    })
}

fn bind_outputs(cx: &mut BuildContext, sink: NodeId, outputs: Vec<(Option<String>, Operand)>) -> Result<()> {
    let settings = cx.session().settings();
    for (index, (name, value)) in outputs.into_iter().enumerate() {
        let value = match value {
            Operand::Expr(expr) => expr,
            // Literal results are carried by a constant node
            Operand::Literal(literal) => cx.constant(&literal)?,
        };
        let name = name.unwrap_or_else(|| settings.output_name(index));
        cx.graph_mut()?
            .add_output(InterfaceSocket::new(name, value.socket_type().clone()));
        let port = cx.input_port(sink, index)?;
        cx.link(&value, sink, port)?;
    }
    Ok(())
}
