// SPDX-License-Identifier: MIT OR Apache-2.0
//! Build, decompile and rebuild graphs end to end.

use geoscript_compiler::{
    build, decompile, lower_program, parse_program, repeat, simulation, Args, BuildContext, CallResult,
    CompileError, InputGroup, Inputs, Param, Program, Returns, Session, Signature, Statement, Value, ZoneKind,
};
use geoscript_graph::{Graph, GraphStore, PortValue, PropertyValue};

fn link_signatures(graph: &Graph) -> Vec<(String, String, String, String)> {
    let mut links: Vec<_> = graph
        .links()
        .map(|link| {
            let from = graph.node(link.from_node).unwrap();
            let to = graph.node(link.to_node).unwrap();
            (
                from.kind.clone(),
                from.port(&link.from_port).unwrap().name.clone(),
                to.kind.clone(),
                to.port(&link.to_port).unwrap().name.clone(),
            )
        })
        .collect();
    links.sort();
    links
}

fn node_kinds(graph: &Graph) -> Vec<String> {
    let mut kinds: Vec<_> = graph.nodes().map(|n| n.kind.clone()).collect();
    kinds.sort();
    kinds
}

fn rebuild(session: &Session, program: &Program) -> GraphStore {
    let mut store = GraphStore::new();
    {
        let mut cx = session.context(&mut store);
        lower_program(&mut cx, program).unwrap();
    }
    store
}

fn cube_body(cx: &mut BuildContext, _: &Inputs) -> geoscript_compiler::Result<CallResult> {
    cx.call("cube", None, Args::new())
}

fn tower(session: &Session, store: &mut GraphStore) {
    let mut cx = session.context(store);
    let signature = Signature::new().param(Param::new("size", "Float").with_default(PortValue::Float(1.5)));
    build(&mut cx, "Tower", &signature, |cx, inputs| {
        let size = inputs.get("size")?;
        let base = cx.call("cube", None, Args::new().with("size", size))?.single()?;
        let lift = size.mul(cx, 2.0)?;
        let top = cx
            .call("transform_geometry", Some(&base), Args::new().with("translation", &lift))?
            .single()?;
        let cap = cx.call("cylinder", None, Args::new().with("radius", 0.25))?.output("top")?;
        let joined = cx
            .call("join_geometry", None, Args::new().with("geometry", vec![base, top]))?
            .single()?;
        Ok(Returns::Named(vec![
            ("Geometry".to_string(), joined.into()),
            ("Cap".to_string(), cap.into()),
        ]))
    })
    .unwrap();
}

#[test]
fn test_rebuild_is_idempotent() {
    let session = Session::standard();
    let mut store = GraphStore::new();
    tower(&session, &mut store);
    let first = store.get("Tower").unwrap().clone();
    tower(&session, &mut store);
    let second = store.get("Tower").unwrap();

    assert_eq!(first.node_count(), second.node_count());
    assert_eq!(first.link_count(), second.link_count());
    assert_eq!(node_kinds(&first), node_kinds(second));
    assert_eq!(link_signatures(&first), link_signatures(second));
    assert_eq!(first.interface().inputs[0].id, second.interface().inputs[0].id);
}

#[test]
fn test_decompiled_program_rebuilds_the_graph() {
    let session = Session::standard();
    let mut store = GraphStore::new();
    tower(&session, &mut store);
    let original = store.get("Tower").unwrap();

    let program = decompile(original, session.registry()).unwrap();
    let rebuilt_store = rebuild(&session, &program);
    let rebuilt = rebuilt_store.get("Tower").unwrap();

    assert_eq!(node_kinds(original), node_kinds(rebuilt));
    assert_eq!(link_signatures(original), link_signatures(rebuilt));
    let names = |graph: &Graph| -> Vec<String> { graph.interface().outputs.iter().map(|o| o.name.clone()).collect() };
    assert_eq!(names(original), names(rebuilt));
    assert_eq!(
        rebuilt.interface().inputs[0].default_value,
        Some(PortValue::Float(1.5))
    );
    assert_eq!(decompile(rebuilt, session.registry()).unwrap(), program);
}

#[test]
fn test_multi_input_order_survives() {
    let session = Session::standard();
    let mut store = GraphStore::new();
    {
        let mut cx = session.context(&mut store);
        build(&mut cx, "Row", &Signature::new(), |cx, _| {
            let mut parts = Vec::new();
            for size in [1.0_f32, 2.0, 3.0] {
                parts.push(cx.call("cube", None, Args::new().with("size", [size, size, size]))?.single()?);
            }
            cx.call("join_geometry", None, Args::new().with("geometry", parts))
        })
        .unwrap();
    }

    let program = decompile(store.get("Row").unwrap(), session.registry()).unwrap();
    let join = program.statements.last().and_then(Statement::as_call).unwrap();
    let expected: Vec<Value> = program.statements[..3]
        .iter()
        .map(|s| Value::Name(s.target().to_string()))
        .collect();
    assert_eq!(join.args, vec![("geometry".to_string(), Value::List(expected))]);

    let rebuilt_store = rebuild(&session, &program);
    let rebuilt = rebuilt_store.get("Row").unwrap();
    let join = rebuilt.nodes().find(|n| n.kind == "GeometryNodeJoinGeometry").unwrap();
    let sizes: Vec<_> = rebuilt
        .links_to(join.inputs[0].id)
        .map(|link| rebuilt.node(link.from_node).unwrap().inputs[0].default_value.clone())
        .collect();
    assert_eq!(
        sizes,
        vec![
            Some(PortValue::Vector([1.0, 1.0, 1.0])),
            Some(PortValue::Vector([2.0, 2.0, 2.0])),
            Some(PortValue::Vector([3.0, 3.0, 3.0])),
        ]
    );
}

#[test]
fn test_reflected_subtraction_keeps_operand_order() {
    let session = Session::standard();
    let mut store = GraphStore::new();
    {
        let mut cx = session.context(&mut store);
        let signature = Signature::new().param(Param::new("x", "Float"));
        build(&mut cx, "Reflected", &signature, |cx, inputs| inputs.get("x")?.rsub(cx, 10.0)).unwrap();
    }

    let graph = store.get("Reflected").unwrap();
    let math = graph.nodes().find(|n| n.kind == "ShaderNodeMath").unwrap();
    assert_eq!(math.property("operation"), Some(&PropertyValue::Enum("SUBTRACT".to_string())));

    let first = graph.links_to(math.inputs[0].id).next().unwrap();
    let constant = graph.node(first.from_node).unwrap();
    assert_eq!(constant.kind, "ShaderNodeValue");
    assert_eq!(constant.outputs[0].default_value, Some(PortValue::Float(10.0)));

    let second = graph.links_to(math.inputs[1].id).next().unwrap();
    assert_eq!(Some(second.from_node), graph.source_node().map(|n| n.id));
}

#[test]
fn test_boolean_equality_uses_boolean_math() {
    let session = Session::standard();
    let mut store = GraphStore::new();
    {
        let mut cx = session.context(&mut store);
        let signature = Signature::new().param(Param::new("flag", "Bool"));
        build(&mut cx, "Flags", &signature, |cx, inputs| {
            let flag = inputs.get("flag")?;
            let same = flag.equal(cx, true)?;
            let different = flag.not_equal(cx, false)?;
            Ok(Returns::Tuple(vec![same.into(), different.into()]))
        })
        .unwrap();
    }

    let graph = store.get("Flags").unwrap();
    assert!(graph.nodes().all(|n| n.kind != "FunctionNodeCompare"));
    let mut operations: Vec<_> = graph
        .nodes()
        .filter(|n| n.kind == "FunctionNodeBooleanMath")
        .filter_map(|n| n.property("operation").and_then(PropertyValue::as_enum))
        .collect();
    operations.sort_unstable();
    assert_eq!(operations, vec!["XNOR", "XOR"]);
}

#[test]
fn test_layout_places_producers_left_of_consumers() {
    let session = Session::standard();
    let mut store = GraphStore::new();
    tower(&session, &mut store);
    let graph = store.get("Tower").unwrap();

    for link in graph.links() {
        let from = graph.node(link.from_node).unwrap();
        let to = graph.node(link.to_node).unwrap();
        assert!(
            from.position[0] < to.position[0],
            "{} should be left of {}",
            from.name,
            to.name
        );
    }
}

#[test]
fn test_input_groups_expand_with_prefix() {
    let session = Session::standard();
    let mut store = GraphStore::new();
    let mut fields = Vec::new();
    {
        let mut cx = session.context(&mut store);
        let signature = Signature::new().group(
            InputGroup::new("cyl")
                .with_prefix("cyl")
                .field(Param::new("radius", "Float").with_default(PortValue::Float(0.5)))
                .field(Param::new("height", "Float").with_default(PortValue::Float(2.0))),
        );
        build(&mut cx, "Tube", &signature, |cx, inputs| {
            let cyl = inputs.group("cyl")?;
            let radius = cyl.get("radius").unwrap().clone();
            let height = cyl.get("height").unwrap().clone();
            fields.push(radius.clone());
            fields.push(height.clone());
            let args = Args::new().with("radius", &radius).with("depth", &height);
            cx.call("cylinder", None, args)?.output("mesh")
        })
        .unwrap();
    }

    let graph = store.get("Tube").unwrap();
    let names: Vec<_> = graph.interface().inputs.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Cyl Radius", "Cyl Height"]);

    let source = graph.source_node().unwrap();
    let bound: Vec<_> = fields
        .iter()
        .map(|expr| {
            assert_eq!(expr.node(), source.id);
            source.port(&expr.port()).unwrap().name.as_str()
        })
        .collect();
    assert_eq!(bound, names);

    let program = decompile(graph, session.registry()).unwrap();
    let params: Vec<_> = program.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(params, vec!["cyl_radius", "cyl_height"]);
    let cylinder = program.statements[0].as_call().unwrap();
    assert!(cylinder
        .args
        .contains(&("radius".to_string(), Value::Name("cyl_radius".to_string()))));
    assert!(cylinder
        .args
        .contains(&("depth".to_string(), Value::Name("cyl_height".to_string()))));

    let rebuilt_store = rebuild(&session, &program);
    let rebuilt = rebuilt_store.get("Tube").unwrap();
    assert_eq!(link_signatures(graph), link_signatures(rebuilt));
}

#[test]
fn test_interface_identity_follows_types() {
    let session = Session::standard();
    let mut store = GraphStore::new();
    let mut cx = session.context(&mut store);

    build(&mut cx, "Box", &Signature::new().param(Param::new("size", "Float")), cube_body).unwrap();
    let first = cx.store().get("Box").unwrap().interface().inputs[0].id;

    build(&mut cx, "Box", &Signature::new().param(Param::new("size", "Float")), cube_body).unwrap();
    let same = cx.store().get("Box").unwrap().interface().inputs[0].id;
    assert_eq!(first, same);

    build(&mut cx, "Box", &Signature::new().param(Param::new("size", "Int")), cube_body).unwrap();
    let changed = cx.store().get("Box").unwrap().interface().inputs[0].id;
    assert_ne!(first, changed);
}

#[test]
fn test_zone_items_are_rebuilt() {
    let session = Session::standard();
    let mut store = GraphStore::new();
    let mut cx = session.context(&mut store);

    for items in [
        vec![Param::new("geometry", "Geometry"), Param::new("count", "Int")],
        vec![Param::new("geometry", "Geometry")],
    ] {
        build(&mut cx, "Loop", &Signature::new(), |cx, _| {
            let cube = cx.call("cube", None, Args::new())?.single()?;
            let result = repeat(cx, 3, &items, Args::new().with("geometry", &cube), |_, state| {
                Ok(vec![state.get("geometry")?.clone().into()])
            })?;
            Ok(result.exprs()[0].clone())
        })
        .unwrap();

        let graph = cx.store().get("Loop").unwrap();
        let exit = graph.nodes().find(|n| n.kind == "GeometryNodeRepeatOutput").unwrap();
        assert_eq!(exit.outputs.iter().filter(|p| p.zone_item).count(), items.len());
        assert_eq!(
            graph.nodes().filter(|n| n.kind == "GeometryNodeRepeatInput").count(),
            1
        );
    }
}

fn looped(session: &Session, store: &mut GraphStore) {
    let mut cx = session.context(store);
    let signature = Signature::new().param(Param::new("count", "Int").with_default(PortValue::Int(3)));
    build(&mut cx, "Loop", &signature, |cx, inputs| {
        let count = inputs.get("count")?;
        let cube = cx.call("cube", None, Args::new())?.single()?;
        let items = [Param::new("geometry", "Geometry"), Param::new("offset", "Float")];
        let initial = Args::new().with("geometry", &cube).with("offset", 0.5);
        let result = repeat(cx, count, &items, initial, |cx, state| {
            let offset = state.get("offset")?;
            let moved = cx
                .call(
                    "transform_geometry",
                    Some(state.get("geometry")?),
                    Args::new().with("translation", offset),
                )?
                .single()?;
            let next = offset.add(cx, 1.0)?;
            Ok(vec![moved.into(), next.into()])
        })?;
        let drifted = simulation(cx, &[Param::new("time", "Float")], Args::new(), |cx, state| {
            let time = state.get("time")?.add(cx, state.get("delta_time")?)?;
            Ok(vec![time.into()])
        })?;
        Ok(Returns::Named(vec![
            ("Geometry".to_string(), result.output("geometry")?.into()),
            ("Time".to_string(), drifted.single()?.into()),
        ]))
    })
    .unwrap();
}

#[test]
fn test_zones_survive_decompile_and_rebuild() {
    let session = Session::standard();
    let mut store = GraphStore::new();
    looped(&session, &mut store);
    let original = store.get("Loop").unwrap();

    let program = decompile(original, session.registry()).unwrap();
    let kinds: Vec<_> = program
        .statements
        .iter()
        .filter_map(Statement::as_zone)
        .map(|zone| zone.kind)
        .collect();
    assert_eq!(kinds.len(), 2);
    assert!(kinds.contains(&ZoneKind::Repeat));
    assert!(kinds.contains(&ZoneKind::Simulation));

    let rebuilt_store = rebuild(&session, &program);
    let rebuilt = rebuilt_store.get("Loop").unwrap();
    assert_eq!(node_kinds(original), node_kinds(rebuilt));
    assert_eq!(link_signatures(original), link_signatures(rebuilt));

    let entry = rebuilt.nodes().find(|n| n.kind == "GeometryNodeRepeatInput").unwrap();
    let exit = rebuilt.nodes().find(|n| n.kind == "GeometryNodeRepeatOutput").unwrap();
    assert_eq!(entry.paired_output, Some(exit.id));
    let items: Vec<_> = exit.outputs.iter().filter(|p| p.zone_item).map(|p| p.name.as_str()).collect();
    assert_eq!(items, vec!["Geometry", "Offset"]);
    let offset = entry.inputs.iter().find(|p| p.name == "Offset").unwrap();
    assert_eq!(offset.default_value, Some(PortValue::Float(0.5)));

    assert_eq!(decompile(rebuilt, session.registry()).unwrap(), program);
}

#[test]
fn test_zone_text_parses_back() {
    let session = Session::standard();
    let mut store = GraphStore::new();
    looped(&session, &mut store);

    let program = decompile(store.get("Loop").unwrap(), session.registry()).unwrap();
    let text = program.render();
    assert!(text.contains("    @repeat_zone\n"));
    assert!(text.contains("    @simulation_zone\n"));
    assert!(text.contains("(delta_time: Float, time: Float):\n"));
    assert_eq!(parse_program(&text).unwrap(), program);

    let reparsed = rebuild(&session, &parse_program(&text).unwrap());
    assert_eq!(
        link_signatures(store.get("Loop").unwrap()),
        link_signatures(reparsed.get("Loop").unwrap())
    );
}

#[test]
fn test_color_literal_without_socket_fails() {
    let session = Session::standard();
    let mut store = GraphStore::new();
    let mut cx = session.context(&mut store);

    let result = build(&mut cx, "Tint", &Signature::new(), |cx, _| {
        cx.call(
            "math",
            None,
            Args::new().with("value", PortValue::Color([1.0, 0.0, 0.0, 1.0])),
        )
    });
    assert!(matches!(result, Err(CompileError::UnrepresentableLiteral(_))));
}

#[test]
fn test_rendered_text_parses_back() {
    let session = Session::standard();
    let mut store = GraphStore::new();
    tower(&session, &mut store);

    let program = decompile(store.get("Tower").unwrap(), session.registry()).unwrap();
    let text = program.render();
    assert!(text.starts_with("from geometry_script import *\n\n@tree(\"Tower\")\ndef tower(size: Float = 1.5):\n"));
    assert_eq!(parse_program(&text).unwrap(), program);

    let reparsed = rebuild(&session, &parse_program(&text).unwrap());
    assert_eq!(
        link_signatures(store.get("Tower").unwrap()),
        link_signatures(reparsed.get("Tower").unwrap())
    );
}
