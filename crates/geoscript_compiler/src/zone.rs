// SPDX-License-Identifier: MIT OR Apache-2.0
//! Repeat and simulation zones.
//!
//! A zone is a paired entry/exit node pair whose state items are rebuilt on
//! every pass. The step closure sees one value per item on the entry node
//! and returns the next value of every item, which is linked into the exit
//! node.

use crate::args::{Arg, Args, CallResult, Operand};
use crate::context::BuildContext;
use crate::error::{CompileError, Result};
use crate::naming::{snake_case, title_case};
use crate::signature::{Inputs, Param};
use geoscript_graph::{NodeId, PortId};
use indexmap::IndexMap;

struct ZoneKinds {
    entry: &'static str,
    exit: &'static str,
}

const REPEAT: ZoneKinds = ZoneKinds {
    entry: "GeometryNodeRepeatInput",
    exit: "GeometryNodeRepeatOutput",
};

const SIMULATION: ZoneKinds = ZoneKinds {
    entry: "GeometryNodeSimulationInput",
    exit: "GeometryNodeSimulationOutput",
};

/// Run `step` `iterations` times over the declared state items
pub fn repeat<F>(
    cx: &mut BuildContext,
    iterations: impl Into<Operand>,
    items: &[Param],
    initial: Args,
    step: F,
) -> Result<CallResult>
where
    F: FnOnce(&mut BuildContext, &Inputs) -> Result<Vec<Operand>>,
{
    let (entry, exit) = create_zone(cx, &REPEAT, items)?;
    let port = cx.input_named(entry, "Iterations")?;
    cx.bind_operand(&iterations.into(), entry, port)?;
    run_zone(cx, entry, exit, items, initial, step)
}

/// Advance the declared state items once per frame.
///
/// The step receives `delta_time` before the state items.
pub fn simulation<F>(cx: &mut BuildContext, items: &[Param], initial: Args, step: F) -> Result<CallResult>
where
    F: FnOnce(&mut BuildContext, &Inputs) -> Result<Vec<Operand>>,
{
    let (entry, exit) = create_zone(cx, &SIMULATION, items)?;
    run_zone(cx, entry, exit, items, initial, step)
}

fn create_zone(cx: &mut BuildContext, kinds: &ZoneKinds, items: &[Param]) -> Result<(NodeId, NodeId)> {
    let sockets = cx.session().sockets();
    let mut resolved = Vec::with_capacity(items.len());
    for item in items {
        let socket_type = sockets
            .resolve(&item.socket_type)
            .ok_or_else(|| CompileError::Configuration {
                param: item.name.clone(),
                reason: format!("unknown type '{}'", item.socket_type),
            })?;
        resolved.push((title_case(&item.name), socket_type));
    }

    let entry = cx.add_node(kinds.entry)?;
    let exit = cx.add_node(kinds.exit)?;
    let graph = cx.graph_mut()?;
    graph.pair_zone(entry, exit)?;
    graph.clear_zone_items(entry)?;
    for (name, socket_type) in resolved {
        graph.add_zone_item(entry, &name, socket_type)?;
    }
    tracing::debug!("Created {} with {} items", kinds.entry, items.len());
    Ok((entry, exit))
}

fn zone_ports(cx: &BuildContext, node: NodeId, inputs: bool) -> Result<Vec<PortId>> {
    let node = cx.node(node)?;
    let ports = if inputs { &node.inputs } else { &node.outputs };
    Ok(ports.iter().filter(|p| p.zone_item).map(|p| p.id).collect())
}

fn run_zone<F>(
    cx: &mut BuildContext,
    entry: NodeId,
    exit: NodeId,
    items: &[Param],
    mut initial: Args,
    step: F,
) -> Result<CallResult>
where
    F: FnOnce(&mut BuildContext, &Inputs) -> Result<Vec<Operand>>,
{
    let entry_inputs = zone_ports(cx, entry, true)?;
    for (item, port) in items.iter().zip(&entry_inputs) {
        if let Some(arg) = initial.remove(&item.name) {
            let operand = match arg {
                Arg::Expr(expr) => Operand::Expr(expr),
                other => Operand::Literal(other.literal().ok_or_else(|| CompileError::ArgumentShape {
                    argument: item.name.clone(),
                    reason: "expected a node output or a literal".to_string(),
                })?),
            };
            cx.bind_operand(&operand, entry, *port)?;
        }
    }
    for name in initial.names() {
        tracing::warn!("Ignoring initial value for undeclared item '{name}'");
    }

    let mut values = Inputs::new();
    let entry_node = cx.node(entry)?;
    let delta_time = entry_node
        .outputs
        .iter()
        .find(|p| !p.zone_item && p.name == "Delta Time")
        .map(|p| p.id);
    if let Some(port) = delta_time {
        values.push_value("delta_time", cx.expr(entry, port)?);
    }
    for (item, port) in items.iter().zip(zone_ports(cx, entry, false)?) {
        values.push_value(&item.name, cx.expr(entry, port)?);
    }

    let next = step(cx, &values)?;
    let exit_inputs = zone_ports(cx, exit, true)?;
    if next.len() > exit_inputs.len() {
        return Err(CompileError::ArgumentArity {
            argument: "zone step".to_string(),
            expected: exit_inputs.len(),
            found: next.len(),
        });
    }
    for (value, port) in next.iter().zip(&exit_inputs) {
        cx.bind_operand(value, exit, *port)?;
    }

    let outputs = zone_ports(cx, exit, false)?;
    if let [port] = outputs.as_slice() {
        return Ok(CallResult::Single(cx.expr(exit, *port)?));
    }
    let mut named = IndexMap::new();
    for (item, port) in items.iter().zip(outputs) {
        named.insert(snake_case(&item.name), cx.expr(exit, port)?);
    }
    Ok(CallResult::Named(named))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Session;
    use crate::scope::build;
    use crate::signature::Signature;
    use geoscript_graph::{GraphStore, PortValue, SocketType};

    fn items() -> Vec<Param> {
        vec![Param::new("geometry", "Geometry"), Param::new("offset", "Float")]
    }

    #[test]
    fn test_repeat_zone_items() {
        let session = Session::standard();
        let mut store = GraphStore::new();
        let mut cx = session.context(&mut store);

        build(&mut cx, "Repeat", &Signature::new(), |cx, _| {
            let cube = cx.call("cube", None, Args::new())?.single()?;
            let initial = Args::new().with("geometry", &cube).with("offset", 0.5);
            let result = repeat(cx, 4, &items(), initial, |cx, state| {
                let geometry = state.get("geometry")?;
                let offset = state.get("offset")?;
                let moved = cx
                    .call("set_position", Some(geometry), Args::new())?
                    .single()?;
                let next = offset.add(cx, 1.0)?;
                Ok(vec![moved.into(), next.into()])
            })?;
            result.output("geometry")
        })
        .unwrap();

        let graph = store.get("Repeat").unwrap();
        let entry = graph.nodes().find(|n| n.kind == "GeometryNodeRepeatInput").unwrap();
        let exit = graph.nodes().find(|n| n.kind == "GeometryNodeRepeatOutput").unwrap();
        assert_eq!(entry.paired_output, Some(exit.id));
        assert_eq!(entry.inputs[0].default_value, Some(PortValue::Int(4)));

        let items: Vec<_> = exit.outputs.iter().map(|p| (p.name.as_str(), &p.socket_type)).collect();
        assert_eq!(items, vec![("Geometry", &SocketType::Geometry), ("Offset", &SocketType::Float)]);
        assert_eq!(entry.inputs[2].default_value, Some(PortValue::Float(0.5)));
        assert!(exit.inputs.iter().all(|p| graph.is_linked(p.id)));
    }

    #[test]
    fn test_simulation_passes_delta_time() {
        let session = Session::standard();
        let mut store = GraphStore::new();
        let mut cx = session.context(&mut store);

        build(&mut cx, "Sim", &Signature::new(), |cx, _| {
            let items = [Param::new("time", "Float")];
            simulation(cx, &items, Args::new(), |cx, state| {
                let names: Vec<_> = state.iter().map(|(name, _)| name.to_string()).collect();
                assert_eq!(names, vec!["delta_time", "time"]);
                let dt = state.get("delta_time")?;
                let next = state.get("time")?.add(cx, dt)?;
                Ok(vec![next.into()])
            })
        })
        .unwrap();

        let graph = store.get("Sim").unwrap();
        assert_eq!(graph.interface().outputs[0].socket_type, SocketType::Float);
    }

    #[test]
    fn test_too_many_step_values() {
        let session = Session::standard();
        let mut store = GraphStore::new();
        store.get_or_create("Tree");
        let mut cx = session.context(&mut store);
        cx.push_scope("Tree");

        let items = [Param::new("value", "Float")];
        let result = repeat(&mut cx, 2, &items, Args::new(), |_, state| {
            let value = state.get("value")?.clone();
            Ok(vec![value.clone().into(), value.into()])
        });
        assert!(matches!(result, Err(CompileError::ArgumentArity { expected: 1, found: 2, .. })));
    }
}
