// SPDX-License-Identifier: MIT OR Apache-2.0
//! Nom parser for rendered programs.
//!
//! Reads the script text produced by [`Program::render`] back into a
//! [`Program`]. Whitespace (including newlines) and `#` comments are allowed
//! between any two tokens, so indentation carries no meaning.

use crate::program::{Call, Parameter, Program, Statement, Value, Zone, ZoneKind, DELTA_TIME_ARG};
use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace1, none_of, not_line_ending, one_of},
    combinator::{all_consuming, map, map_opt, map_res, opt, recognize, value, verify},
    multi::{fold_many0, many0, many0_count, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, separated_pair, terminated, tuple},
    IResult,
};

/// Script text could not be parsed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Syntax error at line {line} near '{near}'")]
pub struct ParseError {
    /// 1-based line of the offending input
    pub line: usize,
    /// Text at the error position, up to the end of its line
    pub near: String,
}

// =============================================================================
// MAIN PARSER ENTRY POINT
// =============================================================================

/// Parse script text into a program
pub fn parse_program(text: &str) -> Result<Program, ParseError> {
    match all_consuming(terminated(program, ws))(text) {
        Ok((_, program)) => Ok(program),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(error_at(text, e.input)),
        Err(nom::Err::Incomplete(_)) => Err(error_at(text, "")),
    }
}

fn error_at(text: &str, rest: &str) -> ParseError {
    let rest = rest.trim_start();
    let consumed = &text[..text.len().saturating_sub(rest.len())];
    ParseError {
        line: consumed.matches('\n').count() + 1,
        near: rest.lines().next().unwrap_or_default().trim().to_string(),
    }
}

fn program(input: &str) -> IResult<&str, Program> {
    let (input, _) = header(input)?;
    let (input, name) = tree_decorator(input)?;
    let (input, params) = signature(input)?;
    let (input, statements) = many0(statement)(input)?;
    let (input, returns) = return_statement(input)?;
    Ok((
        input,
        Program {
            name,
            params,
            statements,
            returns,
        },
    ))
}

// =============================================================================
// LEXICAL HELPERS
// =============================================================================

/// Whitespace and comments
fn ws(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0_count(alt((multispace1, recognize(pair(char('#'), not_line_ending))))),
    )(input)
}

/// Token preceded by optional whitespace
fn token<'a, O>(
    parser: impl FnMut(&'a str) -> IResult<&'a str, O>,
) -> impl FnMut(&'a str) -> IResult<&'a str, O> {
    preceded(ws, parser)
}

fn symbol<'a>(c: char) -> impl FnMut(&'a str) -> IResult<&'a str, char> {
    token(char(c))
}

fn identifier(input: &str) -> IResult<&str, &str> {
    token(recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    )))(input)
}

fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    map_opt(identifier, move |ident| (ident == word).then_some(ident))
}

fn comma(input: &str) -> IResult<&str, char> {
    symbol(',')(input)
}

// =============================================================================
// PROGRAM STRUCTURE
// =============================================================================

/// `from geometry_script import *`
fn header(input: &str) -> IResult<&str, ()> {
    value(
        (),
        tuple((keyword("from"), keyword("geometry_script"), keyword("import"), symbol('*'))),
    )(input)
}

/// `@tree("Name")`
fn tree_decorator(input: &str) -> IResult<&str, String> {
    delimited(
        pair(symbol('@'), keyword("tree")),
        delimited(symbol('('), token(string), symbol(')')),
        ws,
    )(input)
}

/// `def name(param: Type = default, ...):`
fn signature(input: &str) -> IResult<&str, Vec<Parameter>> {
    delimited(
        pair(keyword("def"), identifier),
        delimited(
            symbol('('),
            terminated(separated_list0(comma, parameter), opt(comma)),
            symbol(')'),
        ),
        symbol(':'),
    )(input)
}

fn parameter(input: &str) -> IResult<&str, Parameter> {
    map(
        tuple((
            identifier,
            preceded(symbol(':'), identifier),
            opt(preceded(symbol('='), script_value)),
        )),
        |(name, type_name, default)| Parameter {
            name: name.to_string(),
            type_name: type_name.to_string(),
            default,
        },
    )(input)
}

fn statement(input: &str) -> IResult<&str, Statement> {
    alt((map(call, Statement::Call), map(zone, Statement::Zone)))(input)
}

/// `target = function(name=value, ...)`
fn call(input: &str) -> IResult<&str, Call> {
    map(
        tuple((terminated(identifier, symbol('=')), identifier, arguments)),
        |(target, function, args)| Call {
            target: target.to_string(),
            function: function.to_string(),
            args,
        },
    )(input)
}

fn arguments(input: &str) -> IResult<&str, Vec<(String, Value)>> {
    delimited(
        symbol('('),
        terminated(separated_list0(comma, argument), opt(comma)),
        symbol(')'),
    )(input)
}

/// Decorated step function followed by the call binding its outputs
fn zone(input: &str) -> IResult<&str, Zone> {
    let (input, kind) = preceded(
        symbol('@'),
        alt((
            value(ZoneKind::Repeat, keyword(ZoneKind::Repeat.decorator())),
            value(ZoneKind::Simulation, keyword(ZoneKind::Simulation.decorator())),
        )),
    )(input)?;
    let (input, step) = preceded(keyword("def"), identifier)(input)?;
    let (input, mut items) = terminated(
        delimited(
            symbol('('),
            terminated(separated_list0(comma, parameter), opt(comma)),
            symbol(')'),
        ),
        symbol(':'),
    )(input)?;
    let (input, body) = many0(statement)(input)?;
    let (input, next) = preceded(
        keyword("return"),
        delimited(
            symbol('('),
            terminated(separated_list0(comma, script_value), opt(comma)),
            symbol(')'),
        ),
    )(input)?;
    let (input, (target, args)) = pair(
        terminated(identifier, symbol('=')),
        preceded(verify(identifier, |name: &str| name == step), arguments),
    )(input)?;

    if kind == ZoneKind::Simulation && items.first().is_some_and(|p| p.name == DELTA_TIME_ARG) {
        items.remove(0);
    }
    Ok((
        input,
        Zone {
            target: target.to_string(),
            kind,
            items,
            args,
            body,
            next,
        },
    ))
}

fn argument(input: &str) -> IResult<&str, (String, Value)> {
    map(
        separated_pair(identifier, symbol('='), script_value),
        |(name, value)| (name.to_string(), value),
    )(input)
}

/// `return { "key": value, ... }`
fn return_statement(input: &str) -> IResult<&str, Vec<(String, Value)>> {
    preceded(
        keyword("return"),
        delimited(
            symbol('{'),
            terminated(separated_list0(comma, return_entry), opt(comma)),
            symbol('}'),
        ),
    )(input)
}

fn return_entry(input: &str) -> IResult<&str, (String, Value)> {
    separated_pair(token(string), symbol(':'), script_value)(input)
}

// =============================================================================
// VALUES
// =============================================================================

fn script_value(input: &str) -> IResult<&str, Value> {
    token(alt((
        map(string, Value::String),
        tuple_literal,
        list,
        number,
        name,
    )))(input)
}

/// Double-quoted string with `\\`, `\"`, `\n` and `\t` escapes
fn string(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        fold_many0(
            alt((
                none_of("\\\""),
                preceded(
                    char('\\'),
                    alt((
                        value('\n', char('n')),
                        value('\t', char('t')),
                        value('\\', char('\\')),
                        value('"', char('"')),
                    )),
                ),
            )),
            String::new,
            |mut text, c| {
                text.push(c);
                text
            },
        ),
        char('"'),
    )(input)
}

/// Integer or float; floats contain a `.` or an exponent
fn number(input: &str) -> IResult<&str, Value> {
    map_res(
        recognize(tuple((
            opt(char('-')),
            digit1,
            opt(pair(char('.'), digit0)),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        |text: &str| {
            if text.contains(|c| matches!(c, '.' | 'e' | 'E')) {
                text.parse().map(Value::Float).map_err(|e| e.to_string())
            } else {
                text.parse().map(Value::Int).map_err(|e| e.to_string())
            }
        },
    )(input)
}

fn component(input: &str) -> IResult<&str, f32> {
    map_opt(token(number), |value| match value {
        Value::Float(v) => Some(v),
        Value::Int(v) => Some(v as f32),
        _ => None,
    })(input)
}

/// `(x, y, z)` vector or `(r, g, b, a)` color
fn tuple_literal(input: &str) -> IResult<&str, Value> {
    map_opt(
        delimited(
            char('('),
            terminated(separated_list1(comma, component), opt(comma)),
            symbol(')'),
        ),
        |components| match components.as_slice() {
            [x, y, z] => Some(Value::Vector([*x, *y, *z])),
            [r, g, b, a] => Some(Value::Color([*r, *g, *b, *a])),
            _ => None,
        },
    )(input)
}

fn list(input: &str) -> IResult<&str, Value> {
    map(
        delimited(
            char('['),
            terminated(separated_list0(comma, script_value), opt(comma)),
            symbol(']'),
        ),
        Value::List,
    )(input)
}

/// `True`, `False`, `name` or `name.output`
fn name(input: &str) -> IResult<&str, Value> {
    map(
        pair(identifier, opt(preceded(char('.'), identifier))),
        |(base, output)| match (base, output) {
            ("True", None) => Value::Bool(true),
            ("False", None) => Value::Bool(false),
            (base, None) => Value::Name(base.to_string()),
            (base, Some(output)) => Value::Attr(base.to_string(), output.to_string()),
        },
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"from geometry_script import *

@tree("Rounded Box")
def rounded_box(size: Float = 2.0, geometry: Geometry):
    mesh1 = cube(size=size, vertices_x=3)
    # scale up
    math1 = math(operation="MULTIPLY", value=[size, 1.5e1])
    geometry1 = join_geometry(geometry=[mesh1, geometry])
    return { "Result": geometry1, "Top": mesh1.top }
"#;

    #[test]
    fn test_parse_program() {
        let program = parse_program(SCRIPT).unwrap();
        assert_eq!(program.name, "Rounded Box");
        assert_eq!(
            program.params[0],
            Parameter {
                name: "size".to_string(),
                type_name: "Float".to_string(),
                default: Some(Value::Float(2.0)),
            }
        );
        assert_eq!(program.params[1].default, None);
        assert_eq!(program.statements.len(), 3);
        let calls: Vec<_> = program.statements.iter().filter_map(Statement::as_call).collect();
        assert_eq!(calls[0].args[1], ("vertices_x".to_string(), Value::Int(3)));
        assert_eq!(
            calls[1].args[1].1,
            Value::List(vec![Value::Name("size".to_string()), Value::Float(15.0)])
        );
        assert_eq!(
            program.returns[1],
            ("Top".to_string(), Value::Attr("mesh1".to_string(), "top".to_string()))
        );
    }

    const ZONE_SCRIPT: &str = r#"from geometry_script import *

@tree("Loop")
def loop(count: Int = 3):
    mesh1 = cube()
    @repeat_zone
    def zone1_step(geometry: Geometry, scale: Float):
        @simulation_zone
        def zone2_step(delta_time: Float, time: Float):
            math1 = math(operation="ADD", value=[time, delta_time])
            return (math1)
        zone2 = zone2_step(time=scale)
        geometry1 = transform_geometry(geometry=geometry, scale=zone2)
        return (geometry1, scale)
    zone1 = zone1_step(iterations=count, geometry=mesh1, scale=1.0)
    return { "Geometry": zone1.geometry }
"#;

    #[test]
    fn test_parse_zones() {
        let program = parse_program(ZONE_SCRIPT).unwrap();
        assert_eq!(program.statements.len(), 2);
        let zone = program.statements[1].as_zone().unwrap();
        assert_eq!(zone.kind, ZoneKind::Repeat);
        assert_eq!(zone.target, "zone1");
        assert_eq!(zone.items.len(), 2);
        assert_eq!(zone.args[0], ("iterations".to_string(), Value::Name("count".to_string())));
        assert_eq!(
            zone.next,
            vec![Value::Name("geometry1".to_string()), Value::Name("scale".to_string())]
        );

        let inner = zone.body[0].as_zone().unwrap();
        assert_eq!(inner.kind, ZoneKind::Simulation);
        let items: Vec<_> = inner.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(items, vec!["time"]);
        assert_eq!(zone.body[1].target(), "geometry1");

        assert_eq!(parse_program(&program.render()).unwrap(), program);
    }

    #[test]
    fn test_zone_call_names_its_step() {
        let text = ZONE_SCRIPT.replace("zone1 = zone1_step(", "zone1 = other_step(");
        let error = parse_program(&text).unwrap_err();
        assert_eq!(error.line, 6);
    }

    #[test]
    fn test_literals() {
        let (_, value) = script_value(" (1.0, -2, 3.5)").unwrap();
        assert_eq!(value, Value::Vector([1.0, -2.0, 3.5]));
        let (_, value) = script_value("(1.0, 0.5, 0.25, 1.0)").unwrap();
        assert_eq!(value, Value::Color([1.0, 0.5, 0.25, 1.0]));
        let (_, value) = script_value("\"a \\\"b\\\"\\n\"").unwrap();
        assert_eq!(value, Value::String("a \"b\"\n".to_string()));
        let (_, value) = script_value("False").unwrap();
        assert_eq!(value, Value::Bool(false));
        assert!(script_value("(1.0, 2.0)").is_err());
    }

    #[test]
    fn test_empty_return() {
        let program = parse_program("from geometry_script import *\n@tree(\"Empty\")\ndef empty():\n    return {}\n").unwrap();
        assert!(program.params.is_empty());
        assert!(program.statements.is_empty());
        assert!(program.returns.is_empty());
    }

    #[test]
    fn test_error_position() {
        let text = "from geometry_script import *\n@tree(\"Broken\")\ndef broken():\n    mesh1 = cube(size=)\n    return {}\n";
        let error = parse_program(text).unwrap_err();
        assert_eq!(error.line, 4);
        assert_eq!(error.near, "mesh1 = cube(size=)");
    }

    #[test]
    fn test_render_parses_back() {
        let program = parse_program(SCRIPT).unwrap();
        assert_eq!(parse_program(&program.render()).unwrap(), program);
    }
}
