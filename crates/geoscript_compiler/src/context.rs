// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compiler session and build context.
//!
//! A [`Session`] owns the immutable inputs of a compilation: the descriptor
//! table, socket registry, function table and settings. A [`BuildContext`]
//! borrows a session and a graph store for the duration of one pass and
//! tracks which graph new nodes go into.

use crate::args::{Args, CallResult, Operand};
use crate::error::{CompileError, Result};
use crate::expr::Expr;
use crate::functions::FunctionTable;
use crate::naming::snake_case;
use crate::scope::Subroutine;
use crate::settings::CompilerSettings;
use crate::sockets::{ConstantBinding, SocketTypeRegistry};
use geoscript_graph::{
    catalog, Graph, GraphStore, LinkError, Node, NodeId, NodeKindRegistry, PortId, PortValue,
    PropertyValue,
};
use indexmap::IndexMap;

/// Immutable inputs shared by every pass
#[derive(Debug, Clone)]
pub struct Session {
    registry: NodeKindRegistry,
    sockets: SocketTypeRegistry,
    functions: FunctionTable,
    settings: CompilerSettings,
}

impl Session {
    /// Create a session over a descriptor table
    pub fn new(registry: NodeKindRegistry, settings: CompilerSettings) -> Self {
        let functions = FunctionTable::from_registry(&registry);
        tracing::debug!(
            "Session with {} node kinds, {} functions",
            registry.len(),
            functions.len()
        );
        Self {
            registry,
            sockets: SocketTypeRegistry::standard(),
            functions,
            settings,
        }
    }

    /// Session over the built-in catalog with default settings
    pub fn standard() -> Self {
        Self::new(catalog::standard_registry(), CompilerSettings::default())
    }

    /// Descriptor table
    pub fn registry(&self) -> &NodeKindRegistry {
        &self.registry
    }

    /// Socket registry
    pub fn sockets(&self) -> &SocketTypeRegistry {
        &self.sockets
    }

    /// Function table
    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    /// Settings
    pub fn settings(&self) -> &CompilerSettings {
        &self.settings
    }

    /// Start a pass over a store
    pub fn context<'a>(&'a self, store: &'a mut GraphStore) -> BuildContext<'a> {
        BuildContext::new(self, store)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::standard()
    }
}

/// Mutable state of one lowering pass
pub struct BuildContext<'a> {
    session: &'a Session,
    store: &'a mut GraphStore,
    /// Graphs being built, innermost last
    scopes: Vec<String>,
}

impl<'a> BuildContext<'a> {
    /// Create a context with no active graph
    pub fn new(session: &'a Session, store: &'a mut GraphStore) -> Self {
        Self {
            session,
            store,
            scopes: Vec::new(),
        }
    }

    /// The session
    pub fn session(&self) -> &'a Session {
        self.session
    }

    /// The graph store
    pub fn store(&self) -> &GraphStore {
        self.store
    }

    /// The graph store, mutably
    pub fn store_mut(&mut self) -> &mut GraphStore {
        self.store
    }

    /// Number of nested scopes
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Name of the graph new nodes go into
    pub fn active_graph(&self) -> Result<&str> {
        self.scopes
            .last()
            .map(String::as_str)
            .ok_or(CompileError::NoActiveGraph)
    }

    pub(crate) fn push_scope(&mut self, name: &str) {
        tracing::debug!("Entering scope '{name}' at depth {}", self.scopes.len());
        self.scopes.push(name.to_string());
    }

    pub(crate) fn pop_scope(&mut self) {
        if let Some(name) = self.scopes.pop() {
            tracing::debug!("Leaving scope '{name}'");
        }
    }

    /// The active graph
    pub fn graph(&self) -> Result<&Graph> {
        let name = self.active_graph()?;
        self.store
            .get(name)
            .ok_or_else(|| CompileError::UnknownGraph(name.to_string()))
    }

    /// The active graph, mutably
    pub fn graph_mut(&mut self) -> Result<&mut Graph> {
        let name = self
            .scopes
            .last()
            .ok_or(CompileError::NoActiveGraph)?;
        self.store
            .get_mut(name)
            .ok_or_else(|| CompileError::UnknownGraph(name.clone()))
    }

    /// A node of the active graph
    pub fn node(&self, node_id: NodeId) -> Result<&Node> {
        self.graph()?
            .node(node_id)
            .ok_or(CompileError::Link(LinkError::NodeNotFound(node_id)))
    }

    fn node_mut(&mut self, node_id: NodeId) -> Result<&mut Node> {
        self.graph_mut()?
            .node_mut(node_id)
            .ok_or(CompileError::Link(LinkError::NodeNotFound(node_id)))
    }

    /// Instantiate a node kind in the active graph
    pub fn add_node(&mut self, kind: &str) -> Result<NodeId> {
        let node = self
            .session
            .registry
            .create_node(kind)
            .ok_or_else(|| CompileError::UnknownNodeKind(kind.to_string()))?;
        let graph = self.graph_mut()?;
        let id = graph.add_node(node);
        tracing::debug!("Added {kind} to '{}'", graph.name);
        Ok(id)
    }

    /// Assign a node property
    pub fn set_property(&mut self, node_id: NodeId, name: &str, value: PropertyValue) -> Result<()> {
        self.node_mut(node_id)?.set_property(name, value)?;
        Ok(())
    }

    /// Set the literal default of a port
    pub fn set_default(&mut self, node_id: NodeId, port_id: PortId, value: PortValue) -> Result<()> {
        let port = self
            .node_mut(node_id)?
            .port_mut(&port_id)
            .ok_or(CompileError::Link(LinkError::PortNotFound(port_id)))?;
        port.default_value = Some(value);
        Ok(())
    }

    /// ID of the input port at `index`, counting disabled ports
    pub fn input_port(&self, node_id: NodeId, index: usize) -> Result<PortId> {
        let node = self.node(node_id)?;
        node.input(index)
            .map(|p| p.id)
            .ok_or_else(|| CompileError::ArgumentShape {
                argument: format!("input {index}"),
                reason: format!("'{}' has only {} inputs", node.name, node.inputs.len()),
            })
    }

    /// IDs of the currently enabled input ports
    pub fn enabled_inputs(&self, node_id: NodeId) -> Result<Vec<PortId>> {
        Ok(self.node(node_id)?.enabled_inputs().map(|p| p.id).collect())
    }

    /// ID of the first enabled input port with a display name
    pub fn input_named(&self, node_id: NodeId, name: &str) -> Result<PortId> {
        let node = self.node(node_id)?;
        node.enabled_inputs()
            .find(|p| p.name == name)
            .map(|p| p.id)
            .ok_or_else(|| CompileError::ArgumentShape {
                argument: snake_case(name),
                reason: format!("'{}' has no enabled input '{name}'", node.name),
            })
    }

    /// Value handle for an output port of the active graph
    pub fn expr(&self, node_id: NodeId, port_id: PortId) -> Result<Expr> {
        let graph = self.active_graph()?;
        let port = self
            .node(node_id)?
            .port(&port_id)
            .ok_or(CompileError::Link(LinkError::PortNotFound(port_id)))?;
        Ok(Expr::new(graph, node_id, port_id, port.socket_type.clone()))
    }

    /// Value handle for the output at `index`, counting disabled ports
    pub fn output(&self, node_id: NodeId, index: usize) -> Result<Expr> {
        let node = self.node(node_id)?;
        let port = node.output(index).ok_or_else(|| CompileError::UnknownOutput {
            node: node.name.clone(),
            output: index.to_string(),
        })?;
        self.expr(node_id, port.id)
    }

    /// Value handle for the first enabled output
    pub fn first_output(&self, node_id: NodeId) -> Result<Expr> {
        let node = self.node(node_id)?;
        let port = node
            .enabled_outputs()
            .next()
            .ok_or_else(|| CompileError::UnknownOutput {
                node: node.name.clone(),
                output: "0".to_string(),
            })?;
        self.expr(node_id, port.id)
    }

    /// Enabled outputs as a call result
    pub fn call_result(&self, node_id: NodeId) -> Result<CallResult> {
        let node = self.node(node_id)?;
        let outputs: Vec<(String, PortId)> = node
            .enabled_outputs()
            .map(|p| (snake_case(&p.name), p.id))
            .collect();
        if let [(_, port)] = outputs.as_slice() {
            return Ok(CallResult::Single(self.expr(node_id, *port)?));
        }
        let mut named = IndexMap::new();
        for (name, port) in outputs {
            if !named.contains_key(&name) {
                let expr = self.expr(node_id, port)?;
                named.insert(name, expr);
            }
        }
        Ok(CallResult::Named(named))
    }

    /// Link a value into an input port
    pub fn link(&mut self, from: &Expr, node_id: NodeId, port_id: PortId) -> Result<()> {
        let active = self.active_graph()?;
        if from.graph() != active {
            return Err(CompileError::ForeignValue {
                expected: active.to_string(),
                found: from.graph().to_string(),
            });
        }
        self.graph_mut()?
            .connect(from.node(), from.port(), node_id, port_id)?;
        Ok(())
    }

    /// Materialize a literal as a constant node
    pub fn constant(&mut self, value: &PortValue) -> Result<Expr> {
        let session = self.session;
        let constant = session.sockets.constant_node(value)?;
        let node_id = self.add_node(constant.kind)?;
        match constant.binding {
            ConstantBinding::Property(name) => {
                let property = match value {
                    PortValue::Bool(v) => PropertyValue::Bool(*v),
                    PortValue::Int(v) => PropertyValue::Int(*v),
                    PortValue::Float(v) => PropertyValue::Float(*v),
                    PortValue::Vector(v) => PropertyValue::Vector(*v),
                    PortValue::String(v) => PropertyValue::String(v.clone()),
                    PortValue::Color(_) => {
                        return Err(CompileError::UnrepresentableLiteral(format!("{value:?}")))
                    }
                };
                self.set_property(node_id, name, property)?;
            }
            ConstantBinding::OutputDefault => {
                let port = self.output(node_id, 0)?.port();
                self.set_default(node_id, port, value.clone())?;
            }
        }
        self.output(node_id, 0)
    }

    /// Bind a single value to an input port.
    ///
    /// Node outputs are linked. Literals become the port default when the
    /// socket accepts them, else they are carried by a constant node.
    pub fn bind_operand(&mut self, operand: &Operand, node_id: NodeId, port_id: PortId) -> Result<()> {
        match operand {
            Operand::Expr(expr) => self.link(expr, node_id, port_id),
            Operand::Literal(value) => self.bind_literal(value, node_id, port_id),
        }
    }

    pub(crate) fn bind_literal(&mut self, value: &PortValue, node_id: NodeId, port_id: PortId) -> Result<()> {
        let socket_type = self
            .node(node_id)?
            .port(&port_id)
            .map(|p| p.socket_type.clone())
            .ok_or(CompileError::Link(LinkError::PortNotFound(port_id)))?;
        match socket_type.coerce(value) {
            Some(default) => self.set_default(node_id, port_id, default),
            None => {
                let constant = self.constant(value)?;
                self.link(&constant, node_id, port_id)
            }
        }
    }

    /// Call a node function or a graph by its snake-cased name
    pub fn call(&mut self, function: &str, primary: Option<&Expr>, args: Args) -> Result<CallResult> {
        let session = self.session;
        if let Some(entry) = session.functions.get(function) {
            return self.lower(&entry.kind, primary, args);
        }
        let graph = self
            .store
            .graphs()
            .find(|g| snake_case(&g.name) == function)
            .map(|g| g.name.clone())
            .ok_or_else(|| CompileError::UnknownFunction(function.to_string()))?;
        Subroutine::new(&graph).call(self, primary, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_active_graph() {
        let session = Session::standard();
        let mut store = GraphStore::new();
        let mut cx = session.context(&mut store);
        assert!(matches!(cx.add_node("ShaderNodeMath"), Err(CompileError::NoActiveGraph)));
    }

    #[test]
    fn test_scopes_nest() {
        let session = Session::standard();
        let mut store = GraphStore::new();
        store.get_or_create("Outer");
        store.get_or_create("Inner");
        let mut cx = session.context(&mut store);

        cx.push_scope("Outer");
        cx.push_scope("Inner");
        assert_eq!(cx.active_graph().unwrap(), "Inner");
        cx.pop_scope();
        assert_eq!(cx.active_graph().unwrap(), "Outer");
        cx.pop_scope();
        assert_eq!(cx.depth(), 0);
    }

    #[test]
    fn test_constant_nodes_carry_literals() {
        let session = Session::standard();
        let mut store = GraphStore::new();
        store.get_or_create("Tree");
        let mut cx = session.context(&mut store);
        cx.push_scope("Tree");

        let int = cx.constant(&PortValue::Int(4)).unwrap();
        assert_eq!(cx.node(int.node()).unwrap().property("integer"), Some(&PropertyValue::Int(4)));

        let float = cx.constant(&PortValue::Float(0.25)).unwrap();
        let port = cx.node(float.node()).unwrap().outputs[0].default_value.clone();
        assert_eq!(port, Some(PortValue::Float(0.25)));

        assert!(matches!(
            cx.constant(&PortValue::Color([0.0; 4])),
            Err(CompileError::UnrepresentableLiteral(_))
        ));
    }

    #[test]
    fn test_values_cannot_cross_graphs() {
        let session = Session::standard();
        let mut store = GraphStore::new();
        store.get_or_create("A");
        store.get_or_create("B");
        let mut cx = session.context(&mut store);

        cx.push_scope("A");
        let value = cx.constant(&PortValue::Float(1.0)).unwrap();
        cx.pop_scope();

        cx.push_scope("B");
        let math = cx.add_node("ShaderNodeMath").unwrap();
        let port = cx.input_port(math, 0).unwrap();
        assert!(matches!(cx.link(&value, math, port), Err(CompileError::ForeignValue { .. })));
    }
}
