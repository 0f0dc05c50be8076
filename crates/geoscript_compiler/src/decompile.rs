// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph to program conversion.
//!
//! Every node reachable from the output sink becomes one call statement,
//! ordered so that each statement only references parameters and earlier
//! statements. Statement names are the node's category slug followed by a
//! per-category counter (`mesh1`, `math2`, ...). Paired zone nodes become
//! one zone statement whose body holds the nodes between entry and exit.

use crate::error::DecompileError;
use crate::naming::snake_case;
use crate::program::{Call, Parameter, Program, Statement, Value, Zone, ZoneKind};
use geoscript_graph::node::NODE_TREE_PROPERTY;
use geoscript_graph::{Graph, Link, Node, NodeId, NodeKindRegistry, NodeRole, Port, PropertyValue};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Convert a graph into the call program that rebuilds it
pub fn decompile(graph: &Graph, registry: &NodeKindRegistry) -> Result<Program, DecompileError> {
    let sink = graph
        .sink_nodes()
        .next()
        .ok_or_else(|| DecompileError::MissingSinkNode(graph.name.clone()))?;
    let source = graph
        .source_node()
        .ok_or_else(|| DecompileError::MissingSourceNode(graph.name.clone()))?;

    let spans = zone_spans(graph);
    let order = statement_order(graph, &spans, source.id, sink.id);
    let mut counters: HashMap<&str, usize> = HashMap::new();
    let mut names = HashMap::with_capacity(order.len());
    for node_id in &order {
        let Some(node) = graph.node(*node_id) else {
            continue;
        };
        let slug = registry
            .get(&node.kind)
            .map_or("custom", |kind| kind.category.slug());
        let counter = counters.entry(slug).or_default();
        *counter += 1;
        names.insert(*node_id, format!("{slug}{counter}"));
    }

    let refs = References {
        graph,
        source: source.id,
        names: &names,
    };
    let statements = refs.statements(nest(&order, &spans), &spans);

    let params = graph
        .interface()
        .inputs
        .iter()
        .map(|socket| Parameter {
            name: snake_case(&socket.name),
            type_name: socket.socket_type.wrapper_name().to_string(),
            default: socket.default_value.as_ref().map(Value::from),
        })
        .collect();

    let returns = sink
        .enabled_inputs()
        .filter_map(|port| {
            let value = refs.port_value(port, false)?;
            Some((port.name.clone(), value))
        })
        .collect();

    tracing::debug!("Decompiled '{}' into {} statements", graph.name, statements.len());
    Ok(Program {
        name: graph.name.clone(),
        params,
        statements,
        returns,
    })
}

/// A paired zone and the nodes of its step
struct ZoneSpan {
    entry: NodeId,
    exit: NodeId,
    /// Nodes downstream of the entry that the exit depends on
    body: HashSet<NodeId>,
}

fn zone_spans(graph: &Graph) -> Vec<ZoneSpan> {
    graph
        .nodes()
        .filter(|node| node.role.is_zone_input())
        .filter_map(|entry| {
            let exit = entry.paired_output?;
            if !graph.node(exit)?.role.is_zone_output() {
                tracing::warn!("Zone entry '{}' is paired with a non-exit node", entry.name);
                return None;
            }
            let downstream = reachable(graph, entry.id, exit, true);
            let upstream = reachable(graph, exit, entry.id, false);
            Some(ZoneSpan {
                entry: entry.id,
                exit,
                body: downstream.intersection(&upstream).copied().collect(),
            })
        })
        .collect()
}

/// Nodes reachable from `start` along links, without passing `stop`
fn reachable(graph: &Graph, start: NodeId, stop: NodeId, downstream: bool) -> HashSet<NodeId> {
    let mut seen = HashSet::new();
    let mut pending = vec![start];
    while let Some(node_id) = pending.pop() {
        let Some(node) = graph.node(node_id) else {
            continue;
        };
        let next: Vec<NodeId> = if downstream {
            node.outputs
                .iter()
                .flat_map(|port| graph.links_from(port.id))
                .map(|link| link.to_node)
                .collect()
        } else {
            node.inputs
                .iter()
                .flat_map(|port| graph.links_to(port.id))
                .map(|link| link.from_node)
                .collect()
        };
        for id in next {
            if id != start && id != stop && seen.insert(id) {
                pending.push(id);
            }
        }
    }
    seen
}

/// Dependency-first order of the nodes the sink depends on.
///
/// Zone entry nodes are left out; a zone exit comes after its entry's
/// inputs and after every node of its step.
fn statement_order(graph: &Graph, spans: &[ZoneSpan], source: NodeId, sink: NodeId) -> Vec<NodeId> {
    struct Walk<'a> {
        graph: &'a Graph,
        entries: HashMap<NodeId, NodeId>,
        visited: HashSet<NodeId>,
        order: Vec<NodeId>,
    }

    impl Walk<'_> {
        fn visit(&mut self, node_id: NodeId) {
            let graph = self.graph;
            if !self.visited.insert(node_id) {
                return;
            }
            let Some(node) = graph.node(node_id) else {
                return;
            };
            if let Some(entry) = self.entries.get(&node_id).copied() {
                self.visit(entry);
            }
            for port in &node.inputs {
                for link in graph.links_to(port.id) {
                    self.visit(link.from_node);
                }
            }
            if !node.role.is_zone_input() {
                self.order.push(node_id);
            }
        }
    }

    let mut walk = Walk {
        graph,
        entries: spans.iter().map(|span| (span.exit, span.entry)).collect(),
        visited: HashSet::new(),
        order: Vec::new(),
    };
    walk.visit(sink);
    let mut order = walk.order;
    order.retain(|id| *id != source && *id != sink);
    order
}

/// A statement before naming
enum Unit {
    Call(NodeId),
    Zone(usize, Vec<Unit>),
}

/// Group the statement order into zone bodies
fn nest(order: &[NodeId], spans: &[ZoneSpan]) -> Vec<Unit> {
    let owner = |node_id: NodeId| {
        spans
            .iter()
            .enumerate()
            .filter(|(_, span)| span.body.contains(&node_id))
            .min_by_key(|(_, span)| span.body.len())
            .map(|(index, _)| index)
    };

    let mut bodies: Vec<Vec<Unit>> = spans.iter().map(|_| Vec::new()).collect();
    let mut top = Vec::new();
    for &node_id in order {
        let unit = match spans.iter().position(|span| span.exit == node_id) {
            Some(zone) => Unit::Zone(zone, std::mem::take(&mut bodies[zone])),
            None => Unit::Call(node_id),
        };
        match owner(node_id) {
            Some(zone) => bodies[zone].push(unit),
            None => top.push(unit),
        }
    }
    top
}

fn function_name(node: &Node) -> String {
    snake_case(node.node_tree().unwrap_or(&node.name))
}

fn property_argument(value: &PropertyValue) -> Option<Value> {
    match value {
        PropertyValue::Bool(v) => Some(Value::Bool(*v)),
        PropertyValue::Int(v) => Some(Value::Int(*v)),
        PropertyValue::Float(v) => Some(Value::Float(*v)),
        PropertyValue::String(v) | PropertyValue::Enum(v) => Some(Value::String(v.clone())),
        PropertyValue::Vector(v) => Some(Value::Vector(*v)),
        PropertyValue::GraphRef(_) => None,
    }
}

struct References<'a> {
    graph: &'a Graph,
    source: NodeId,
    names: &'a HashMap<NodeId, String>,
}

impl References<'_> {
    /// Script reference to the output a link starts from
    fn link_source(&self, link: &Link) -> Option<Value> {
        let node = self.graph.node(link.from_node)?;
        let port = node.port(&link.from_port)?;
        if link.from_node == self.source || node.role.is_zone_input() {
            return Some(Value::Name(snake_case(&port.name)));
        }
        let Some(name) = self.names.get(&link.from_node) else {
            tracing::warn!("Link from unreachable node '{}' ignored", node.name);
            return None;
        };
        if node.enabled_outputs().count() == 1 {
            Some(Value::Name(name.clone()))
        } else {
            Some(Value::Attr(name.clone(), snake_case(&port.name)))
        }
    }

    /// Links to the port as one value, else its default
    fn port_value(&self, port: &Port, include_hidden: bool) -> Option<Value> {
        let mut sources: Vec<Value> = self
            .graph
            .links_to(port.id)
            .filter_map(|link| self.link_source(link))
            .collect();
        match sources.len() {
            0 if include_hidden || !port.hide_value => port.default_value.as_ref().map(Value::from),
            0 => None,
            1 => sources.pop(),
            _ => Some(Value::List(sources)),
        }
    }

    fn statements(&self, units: Vec<Unit>, spans: &[ZoneSpan]) -> Vec<Statement> {
        units
            .into_iter()
            .filter_map(|unit| match unit {
                Unit::Call(node_id) => {
                    let node = self.graph.node(node_id)?;
                    Some(Statement::Call(Call {
                        target: self.names.get(&node_id).cloned().unwrap_or_default(),
                        function: function_name(node),
                        args: self.arguments(node),
                    }))
                }
                Unit::Zone(index, body) => {
                    let span = spans.get(index)?;
                    let zone = self.zone(span, self.statements(body, spans))?;
                    Some(Statement::Zone(zone))
                }
            })
            .collect()
    }

    fn zone(&self, span: &ZoneSpan, body: Vec<Statement>) -> Option<Zone> {
        let entry = self.graph.node(span.entry)?;
        let exit = self.graph.node(span.exit)?;
        let kind = match entry.role {
            NodeRole::SimulationInput => ZoneKind::Simulation,
            _ => ZoneKind::Repeat,
        };

        let items = entry
            .inputs
            .iter()
            .filter(|port| port.zone_item)
            .map(|port| Parameter {
                name: snake_case(&port.name),
                type_name: port.socket_type.wrapper_name().to_string(),
                default: None,
            })
            .collect();

        let mut args = Vec::new();
        for port in entry.enabled_inputs() {
            if let Some(value) = self.port_value(port, !port.zone_item) {
                args.push((snake_case(&port.name), value));
            }
        }

        let next = exit
            .inputs
            .iter()
            .filter(|port| port.zone_item)
            .map_while(|port| self.port_value(port, false))
            .collect();

        Some(Zone {
            target: self.names.get(&span.exit).cloned().unwrap_or_default(),
            kind,
            items,
            args,
            body,
            next,
        })
    }

    fn arguments(&self, node: &Node) -> Vec<(String, Value)> {
        let mut args = Vec::new();

        for property in &node.properties {
            if property.decl.name == NODE_TREE_PROPERTY {
                continue;
            }
            if let Some(value) = property_argument(&property.value) {
                args.push((property.decl.name.clone(), value));
            }
        }

        for port in node.enabled_outputs() {
            if let Some(default) = &port.default_value {
                args.push((snake_case(&port.name), Value::from(default)));
            }
        }

        let mut groups: IndexMap<String, Vec<&Port>> = IndexMap::new();
        for port in node.enabled_inputs() {
            groups.entry(snake_case(&port.name)).or_default().push(port);
        }
        for (name, ports) in groups {
            if let [port] = ports.as_slice() {
                if let Some(value) = self.port_value(port, false) {
                    args.push((name, value));
                }
                continue;
            }

            let slots: Vec<Value> = ports
                .iter()
                .map_while(|port| self.port_value(port, true))
                .collect();
            if !slots.is_empty() {
                args.push((name, Value::List(slots)));
            }
        }
        args
    }
}
