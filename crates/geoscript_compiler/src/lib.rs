// SPDX-License-Identifier: MIT OR Apache-2.0
//! Bidirectional compiler between call-style geometry scripts and node graphs.
//!
//! Lowering turns calls into nodes: every node kind in the host's descriptor
//! table is exposed as a snake-cased function, arguments become properties,
//! socket defaults or links, and [`scope::build`] turns a signature plus a
//! body into a whole graph with its interface. Decompiling goes the other
//! way and produces a [`Program`] that renders to script text and rebuilds
//! the same graph.
//!
//! ## Architecture
//!
//! A [`Session`] holds the immutable tables (node kinds, socket types,
//! functions, settings). Lowering always goes through an explicit
//! [`BuildContext`] whose scope stack names the graph being built, so nested
//! builds restore their caller's target on exit.
//!
//! ```ignore
//! let session = Session::standard();
//! let mut store = GraphStore::new();
//! let mut cx = session.context(&mut store);
//! build(&mut cx, "Tower", &Signature::new(), |cx, _| {
//!     cx.call("cube", None, Args::new().with("size", [1.0, 1.0, 4.0]))
//! })?;
//! ```

pub mod args;
pub mod attribute;
pub mod context;
pub mod decompile;
pub mod error;
pub mod expr;
pub mod functions;
mod lower;
pub mod naming;
pub mod parser;
pub mod program;
pub mod scope;
pub mod settings;
pub mod signature;
pub mod sockets;
pub mod zone;

pub use args::{Arg, Args, CallResult, Operand};
pub use attribute::Attribute;
pub use context::{BuildContext, Session};
pub use decompile::decompile;
pub use error::{CompileError, DecompileError, Result};
pub use expr::{Axis, BooleanOp, CompareOp, Expr, MathOp, SampleMode};
pub use functions::{Function, FunctionTable};
pub use parser::{parse_program, ParseError};
pub use program::{lower_program, Call, Parameter, Program, Statement, Value, Zone, ZoneKind};
pub use scope::{build, Returns, Subroutine};
pub use settings::{CompilerSettings, SettingsError};
pub use signature::{GroupValue, Input, InputGroup, Inputs, Param, Signature};
pub use sockets::SocketTypeRegistry;
pub use zone::{repeat, simulation};
