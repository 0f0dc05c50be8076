// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for lowering and decompiling.

use geoscript_graph::{LinkError, PropertyError, SocketType, ZoneError};

/// Result alias for lowering operations
pub type Result<T> = std::result::Result<T, CompileError>;

/// Error raised while lowering calls into a graph
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// A signature parameter is missing a type or uses an unknown one
    #[error("Invalid parameter '{param}': {reason}")]
    Configuration {
        /// Parameter name
        param: String,
        /// What is wrong with it
        reason: String,
    },

    /// A literal has no constant node to carry it
    #[error("'{0}' cannot be expressed as a node")]
    UnrepresentableLiteral(String),

    /// Operation not available on the value's type
    #[error("'{operation}' is not available on {socket_type} values")]
    InvalidAccessor {
        /// Attempted operation
        operation: String,
        /// Type of the value
        socket_type: SocketType,
    },

    /// Node kind is not in the descriptor table
    #[error("Unknown node kind: {0}")]
    UnknownNodeKind(String),

    /// No node function or graph with this name
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Referenced graph does not exist in the store
    #[error("Unknown graph: {0}")]
    UnknownGraph(String),

    /// Program references a name that was never bound
    #[error("Unknown name: {0}")]
    UnknownName(String),

    /// Call result has no output with this name
    #[error("'{node}' has no output '{output}'")]
    UnknownOutput {
        /// Node or statement name
        node: String,
        /// Requested output
        output: String,
    },

    /// A graph tried to reference itself
    #[error("Graph '{0}' cannot contain a reference to itself")]
    RecursiveGroup(String),

    /// Argument value has the wrong shape for its target
    #[error("Invalid argument '{argument}': {reason}")]
    ArgumentShape {
        /// Argument name
        argument: String,
        /// What is wrong with it
        reason: String,
    },

    /// List argument has more elements than target ports
    #[error("Argument '{argument}' takes at most {expected} values, got {found}")]
    ArgumentArity {
        /// Argument name
        argument: String,
        /// Number of target ports
        expected: usize,
        /// Number of supplied values
        found: usize,
    },

    /// Value belongs to a different graph than the active one
    #[error("Value from graph '{found}' used while building '{expected}'")]
    ForeignValue {
        /// Active graph
        expected: String,
        /// Graph the value belongs to
        found: String,
    },

    /// Lowering was attempted outside of any scope
    #[error("No active graph")]
    NoActiveGraph,

    /// Link could not be created
    #[error(transparent)]
    Link(#[from] LinkError),

    /// Property assignment was rejected
    #[error(transparent)]
    Property(#[from] PropertyError),

    /// Zone could not be edited
    #[error(transparent)]
    Zone(#[from] ZoneError),
}

/// Error raised while decompiling a graph
#[derive(Debug, thiserror::Error)]
pub enum DecompileError {
    /// Graph has no output sink node
    #[error("Graph '{0}' has no group output node")]
    MissingSinkNode(String),

    /// Graph has no input source node
    #[error("Graph '{0}' has no group input node")]
    MissingSourceNode(String),
}
