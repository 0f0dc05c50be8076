// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory model of a host application's geometry node graphs.
//!
//! This crate provides the graph database the script compiler writes into
//! and the decompiler reads from:
//! - Node kind descriptors and the built-in standard catalog
//! - Typed ports with property-driven visibility
//! - Validated links and multi-input sockets
//! - Graph interfaces, repeat/simulation zones
//! - Column layout
//!
//! ## Architecture
//!
//! Kind descriptors live in an immutable [`NodeKindRegistry`]. Graphs are
//! owned by a [`GraphStore`] keyed by name, and everything serializes to RON
//! so a host integration can exchange descriptor tables and graphs as files.

pub mod catalog;
pub mod graph;
pub mod interface;
pub mod layout;
pub mod link;
pub mod node;
pub mod port;
pub mod registry;
pub mod store;

pub use graph::{CycleError, Graph, LinkError, ZoneError};
pub use interface::{Interface, InterfaceId, InterfaceSocket};
pub use layout::{arrange, LayoutError, LayoutOptions};
pub use link::{Link, LinkId};
pub use node::{
    Node, NodeCategory, NodeId, NodeKind, NodeRole, Property, PropertyDecl, PropertyError,
    PropertyKind, PropertyValue,
};
pub use port::{Port, PortCondition, PortDirection, PortId, PortValue, SocketType};
pub use registry::{NodeKindRegistry, RegistryError};
pub use store::GraphStore;
