// SPDX-License-Identifier: MIT OR Apache-2.0
//! Call lowering.
//!
//! Turns a node kind plus arguments into a node of the active graph:
//! properties are assigned first, then the remaining arguments are bound to
//! the enabled input ports by snake-cased name, either as links or as
//! literal defaults.

use crate::args::{Arg, Args, CallResult};
use crate::context::BuildContext;
use crate::error::{CompileError, Result};
use crate::expr::Expr;
use crate::naming::snake_case;
use geoscript_graph::{NodeId, PortId, PortValue, PropertyDecl, PropertyKind, PropertyValue, SocketType};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Same-named enabled inputs of one socket type, in declaration order
struct PortGroup {
    name: String,
    ports: Vec<PortId>,
    multi_input: bool,
}

impl BuildContext<'_> {
    /// Instantiate `kind` and bind the arguments to it
    pub fn lower(&mut self, kind: &str, primary: Option<&Expr>, args: Args) -> Result<CallResult> {
        let node = self.add_node(kind)?;
        self.bind_arguments(node, primary, args)
    }

    /// Bind arguments to an existing node and collect its outputs
    pub fn bind_arguments(&mut self, node: NodeId, primary: Option<&Expr>, args: Args) -> Result<CallResult> {
        let mut args = args.spread_groups();

        let mut primary_port = None;
        if let Some(primary) = primary {
            let port = self.input_port(node, 0)?;
            self.link(primary, node, port)?;
            primary_port = Some(port);
        }

        // Properties first, so they win a name collision with a port
        let decls: Vec<PropertyDecl> = self
            .node(node)?
            .properties
            .iter()
            .map(|p| p.decl.clone())
            .collect();
        for decl in &decls {
            if let Some(arg) = args.remove(&decl.name) {
                let value = property_value(decl, &arg)?;
                self.set_property(node, &decl.name, value)?;
            }
        }

        let groups = self.port_groups(node, primary_port)?;
        let mut consumed = HashSet::new();
        for group in &groups {
            let Some(arg) = args.get(&group.name) else {
                continue;
            };
            consumed.insert(group.name.clone());
            self.bind_group(node, group, arg)?;
        }
        for name in &consumed {
            args.remove(name);
        }

        for (name, arg) in args.iter() {
            if !self.bind_output_default(node, name, arg)? {
                let kind = &self.node(node)?.kind;
                tracing::warn!("Ignoring unknown argument '{name}' for {kind}");
            }
        }

        self.call_result(node)
    }

    fn port_groups(&self, node: NodeId, skip: Option<PortId>) -> Result<Vec<PortGroup>> {
        let mut groups: IndexMap<(String, SocketType), PortGroup> = IndexMap::new();
        for port in self.node(node)?.enabled_inputs() {
            if Some(port.id) == skip {
                continue;
            }
            let name = snake_case(&port.name);
            let group = groups
                .entry((name.clone(), port.socket_type.clone()))
                .or_insert_with(|| PortGroup {
                    name,
                    ports: Vec::new(),
                    multi_input: false,
                });
            group.ports.push(port.id);
            group.multi_input |= port.multi_input;
        }
        Ok(groups.into_values().collect())
    }

    fn bind_group(&mut self, node: NodeId, group: &PortGroup, arg: &Arg) -> Result<()> {
        if group.multi_input && arg.is_expr_list() {
            if let Arg::List(items) = arg {
                for port in &group.ports {
                    for item in items {
                        self.bind_arg(&group.name, item, node, *port)?;
                    }
                }
            }
            return Ok(());
        }

        if group.ports.len() > 1 {
            if let Arg::List(items) = arg {
                if items.len() > group.ports.len() {
                    return Err(CompileError::ArgumentArity {
                        argument: group.name.clone(),
                        expected: group.ports.len(),
                        found: items.len(),
                    });
                }
                if !items.is_empty() {
                    for (item, port) in items.iter().zip(&group.ports) {
                        self.bind_arg(&group.name, item, node, *port)?;
                    }
                    return Ok(());
                }
            }
        }

        for port in &group.ports {
            self.bind_arg(&group.name, arg, node, *port)?;
        }
        Ok(())
    }

    /// Link or assign one argument to one input port
    fn bind_arg(&mut self, name: &str, arg: &Arg, node: NodeId, port: PortId) -> Result<()> {
        match arg {
            Arg::Expr(expr) => self.link(expr, node, port),
            Arg::List(items) if arg.is_expr_list() => {
                for item in items {
                    self.bind_arg(name, item, node, port)?;
                }
                Ok(())
            }
            Arg::Group(group) => Err(CompileError::ArgumentShape {
                argument: name.to_string(),
                reason: format!("group '{}' cannot be bound to a single input", group.name),
            }),
            _ => {
                let value = arg.literal().ok_or_else(|| CompileError::ArgumentShape {
                    argument: name.to_string(),
                    reason: "expected a node output or a literal".to_string(),
                })?;
                self.bind_literal(&value, node, port)
            }
        }
    }

    /// Assign a literal to a same-named output that carries a default.
    ///
    /// Returns whether the argument was used.
    fn bind_output_default(&mut self, node: NodeId, name: &str, arg: &Arg) -> Result<bool> {
        let target = self
            .node(node)?
            .enabled_outputs()
            .find(|p| p.default_value.is_some() && snake_case(&p.name) == name)
            .map(|p| (p.id, p.socket_type.clone()));
        let Some((port, socket_type)) = target else {
            return Ok(false);
        };
        let value = arg
            .literal()
            .and_then(|value| socket_type.coerce(&value))
            .ok_or_else(|| CompileError::ArgumentShape {
                argument: name.to_string(),
                reason: format!("expected a {socket_type} literal"),
            })?;
        self.set_default(node, port, value)?;
        Ok(true)
    }
}

/// Convert an argument into a value of a declared property
fn property_value(decl: &PropertyDecl, arg: &Arg) -> Result<PropertyValue> {
    let value = match (&decl.kind, arg) {
        (PropertyKind::Enum(_), Arg::Enum(case) | Arg::Literal(PortValue::String(case))) => {
            Some(PropertyValue::Enum(case.clone()))
        }
        (PropertyKind::Int, Arg::Literal(PortValue::Int(v))) => Some(PropertyValue::Int(*v)),
        (PropertyKind::Float, Arg::Literal(PortValue::Float(v))) => Some(PropertyValue::Float(*v)),
        (PropertyKind::Float, Arg::Literal(PortValue::Int(v))) => Some(PropertyValue::Float(*v as f32)),
        (PropertyKind::Bool, Arg::Literal(PortValue::Bool(v))) => Some(PropertyValue::Bool(*v)),
        (PropertyKind::String, Arg::Enum(text) | Arg::Literal(PortValue::String(text))) => {
            Some(PropertyValue::String(text.clone()))
        }
        (PropertyKind::GraphRef, Arg::Enum(name) | Arg::Literal(PortValue::String(name))) => {
            Some(PropertyValue::GraphRef(name.clone()))
        }
        (PropertyKind::Vector, _) => match arg.literal() {
            Some(PortValue::Vector(v)) => Some(PropertyValue::Vector(v)),
            _ => None,
        },
        _ => None,
    };
    value.ok_or_else(|| CompileError::ArgumentShape {
        argument: decl.name.clone(),
        reason: format!("expected a {} value", decl.kind.type_name()),
    })
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

    #[test]
    fn test_unknown_kind_fails_before_mutation() {
        with_context(|cx| {
            assert!(matches!(
                cx.lower("GeometryNodeBanana", None, Args::new()),
                Err(CompileError::UnknownNodeKind(_))
            ));
            assert_eq!(cx.graph().unwrap().node_count(), 0);
        });
    }

    #[test]
    fn test_literals_become_defaults() {
        with_context(|cx| {
            let args = Args::new().with("size", [2.0, 2.0, 2.0]).with("vertices_x", 4);
            let cube = cx.call("cube", None, args).unwrap().single().unwrap();
            let node = cx.node(cube.node()).unwrap();
            assert_eq!(node.inputs[0].default_value, Some(PortValue::Vector([2.0; 3])));
            assert_eq!(node.inputs[1].default_value, Some(PortValue::Int(4)));
        });
    }

    #[test]
    fn test_incompatible_literal_uses_constant_node() {
        with_context(|cx| {
            // A vector literal on a float socket needs a constant node
            let points = cx
                .call("points", None, Args::new().with("radius", [1.0, 2.0, 3.0]))
                .unwrap()
                .single()
                .unwrap();
            let graph = cx.graph().unwrap();
            let radius = graph.node(points.node()).unwrap().inputs[2].id;
            let link = graph.links_to(radius).next().unwrap();
            assert_eq!(graph.node(link.from_node).unwrap().kind, "FunctionNodeInputVector");
        });
    }

    #[test]
    fn test_properties_apply_before_ports() {
        with_context(|cx| {
            let args = Args::new().with_enum("data_type", "INT").with("a", 1).with("b", 2);
            let result = cx.call("compare", None, args).unwrap().single().unwrap();
            let node = cx.node(result.node()).unwrap();
            let enabled: Vec<_> = node.enabled_inputs().map(|p| &p.socket_type).collect();
            assert_eq!(enabled, vec![&SocketType::Int, &SocketType::Int]);
            assert_eq!(node.enabled_inputs().nth(1).unwrap().default_value, Some(PortValue::Int(2)));
        });
    }

    #[test]
    fn test_invalid_enum_case_is_rejected() {
        with_context(|cx| {
            let args = Args::new().with_enum("operation", "BANANA");
            assert!(matches!(cx.call("math", None, args), Err(CompileError::Property(_))));
        });
    }

    #[test]
    fn test_multi_input_links_every_element() {
        with_context(|cx| {
            let cubes: Vec<Expr> = (0..3)
                .map(|_| cx.call("cube", None, Args::new()).unwrap().single().unwrap())
                .collect();
            let joined = cx
                .call("join_geometry", None, Args::new().with("geometry", cubes.clone()))
                .unwrap()
                .single()
                .unwrap();
            let graph = cx.graph().unwrap();
            let input = graph.node(joined.node()).unwrap().inputs[0].id;
            let sources: Vec<_> = graph.links_to(input).map(|l| l.from_node).collect();
            let expected: Vec<_> = cubes.iter().map(Expr::node).collect();
            assert_eq!(sources, expected);
        });
    }

    #[test]
    fn test_same_named_ports_take_list_elements() {
        with_context(|cx| {
            let value = cx.constant(&PortValue::Float(1.0)).unwrap();
            let args = Args::new()
                .with_enum("operation", "MULTIPLY_ADD")
                .with("value", vec![Arg::from(&value), Arg::from(2.0), Arg::from(3.0)]);
            let result = cx.call("math", None, args).unwrap().single().unwrap();
            let graph = cx.graph().unwrap();
            let node = graph.node(result.node()).unwrap();
            assert!(graph.is_linked(node.inputs[0].id));
            assert_eq!(node.inputs[1].default_value, Some(PortValue::Float(2.0)));
            assert_eq!(node.inputs[2].default_value, Some(PortValue::Float(3.0)));

            let args = Args::new().with("value", vec![Arg::from(1.0), Arg::from(2.0), Arg::from(3.0)]);
            assert!(matches!(
                cx.call("math", None, args),
                Err(CompileError::ArgumentArity { expected: 2, found: 3, .. })
            ));
        });
    }

    #[test]
    fn test_primary_argument_takes_first_input() {
        with_context(|cx| {
            let cube = cx.call("cube", None, Args::new()).unwrap().single().unwrap();
            let moved = cube
                .chain(cx, "transform_geometry", Args::new().with("translation", [0.0, 0.0, 1.0]))
                .unwrap()
                .single()
                .unwrap();
            let graph = cx.graph().unwrap();
            let node = graph.node(moved.node()).unwrap();
            assert!(graph.is_linked(node.inputs[0].id));
        });
    }

    #[test]
    fn test_multiple_outputs_are_named() {
        with_context(|cx| {
            let result = cx.call("cylinder", None, Args::new()).unwrap();
            assert!(result.output("mesh").is_ok());
            assert!(result.output("top").is_ok());
            assert!(result.clone().single().is_err());
        });
    }

    #[test]
    fn test_value_node_output_default() {
        with_context(|cx| {
            let value = cx.call("value", None, Args::new().with("value", 0.25)).unwrap().single().unwrap();
            let node = cx.node(value.node()).unwrap();
            assert_eq!(node.outputs[0].default_value, Some(PortValue::Float(0.25)));
        });
    }
}
