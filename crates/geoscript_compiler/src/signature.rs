// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph signatures.
//!
//! A [`Signature`] declares the inputs of a built graph: plain parameters and
//! [`InputGroup`]s, which expand to one interface entry per field while the
//! body receives them bundled as a [`GroupValue`].

use crate::error::{CompileError, Result};
use crate::expr::Expr;
use crate::naming::title_case;
use crate::sockets::SocketTypeRegistry;
use geoscript_graph::{InterfaceSocket, PortValue};
use indexmap::IndexMap;
use std::collections::HashSet;

/// A typed graph input
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Script name
    pub name: String,
    /// Socket class or wrapper name (`Float`, `NodeSocketFloatDistance`, ...)
    pub socket_type: String,
    /// Default value
    pub default: Option<PortValue>,
    /// Lower bound
    pub min: Option<f32>,
    /// Upper bound
    pub max: Option<f32>,
    /// Subtype label
    pub subtype: Option<String>,
    /// Tooltip
    pub tooltip: String,
    /// Hidden from modifier panels
    pub hide_in_modifier: bool,
    /// Interface name overriding the title-cased script name
    pub display_name: Option<String>,
}

impl Param {
    /// Parameter without options
    pub fn new(name: &str, socket_type: &str) -> Self {
        Self {
            name: name.to_string(),
            socket_type: socket_type.to_string(),
            default: None,
            min: None,
            max: None,
            subtype: None,
            tooltip: String::new(),
            hide_in_modifier: false,
            display_name: None,
        }
    }

    /// Set the default value
    pub fn with_default(mut self, value: PortValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Set the bounds
    pub fn with_bounds(mut self, min: f32, max: f32) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Set the subtype label
    pub fn with_subtype(mut self, subtype: &str) -> Self {
        self.subtype = Some(subtype.to_string());
        self
    }

    /// Set the tooltip
    pub fn with_tooltip(mut self, tooltip: &str) -> Self {
        self.tooltip = tooltip.to_string();
        self
    }

    /// Hide from modifier panels
    pub fn hidden_in_modifier(mut self) -> Self {
        self.hide_in_modifier = true;
        self
    }

    /// Override the interface name
    pub fn with_display_name(mut self, name: &str) -> Self {
        self.display_name = Some(name.to_string());
        self
    }
}

/// A named bundle of parameters passed to the body as one value
#[derive(Debug, Clone, PartialEq)]
pub struct InputGroup {
    /// Script name of the bundle
    pub name: String,
    /// Prefix of the generated interface names
    pub prefix: Option<String>,
    /// Fields, in declaration order
    pub fields: Vec<Param>,
}

impl InputGroup {
    /// Empty group
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            prefix: None,
            fields: Vec::new(),
        }
    }

    /// Set the prefix
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    /// Append a field
    pub fn field(mut self, param: Param) -> Self {
        self.fields.push(param);
        self
    }
}

/// One declared signature entry
#[derive(Debug, Clone, PartialEq)]
pub enum SignatureEntry {
    /// Plain parameter
    Param(Param),
    /// Grouped parameters
    Group(InputGroup),
}

/// Ordered inputs of a built graph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    /// Entries in declaration order
    pub entries: Vec<SignatureEntry>,
}

/// A validated interface input
#[derive(Debug, Clone)]
pub struct ResolvedParam {
    /// Owning group, for grouped fields
    pub group: Option<String>,
    /// Script name (field name for grouped fields)
    pub key: String,
    /// Interface entry to create or update
    pub entry: InterfaceSocket,
}

impl Signature {
    /// Empty signature
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter
    pub fn param(mut self, param: Param) -> Self {
        self.entries.push(SignatureEntry::Param(param));
        self
    }

    /// Append an input group
    pub fn group(mut self, group: InputGroup) -> Self {
        self.entries.push(SignatureEntry::Group(group));
        self
    }

    /// Resolve every entry into interface inputs.
    ///
    /// Fails on the first parameter with an unknown type, an unsupported
    /// subtype or a default its socket cannot hold.
    pub fn validate(&self, sockets: &SocketTypeRegistry) -> Result<Vec<ResolvedParam>> {
        let mut resolved = Vec::new();
        let mut names = HashSet::new();
        for entry in &self.entries {
            match entry {
                SignatureEntry::Param(param) => {
                    let entry = resolve(param, &title_case(&param.name), sockets)?;
                    resolved.push(ResolvedParam {
                        group: None,
                        key: param.name.clone(),
                        entry,
                    });
                    claim(&mut names, &param.name)?;
                }
                SignatureEntry::Group(group) => {
                    claim(&mut names, &group.name)?;
                    let mut fields = HashSet::new();
                    for field in &group.fields {
                        claim(&mut fields, &field.name)?;
                        let interface_name = match &group.prefix {
                            Some(prefix) => title_case(&format!("{prefix}_{}", field.name)),
                            None => title_case(&field.name),
                        };
                        let entry = resolve(field, &interface_name, sockets)?;
                        resolved.push(ResolvedParam {
                            group: Some(group.name.clone()),
                            key: field.name.clone(),
                            entry,
                        });
                    }
                }
            }
        }
        Ok(resolved)
    }
}

fn claim(names: &mut HashSet<String>, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(CompileError::Configuration {
            param: name.to_string(),
            reason: "parameter has no name".to_string(),
        });
    }
    if !names.insert(name.to_string()) {
        return Err(CompileError::Configuration {
            param: name.to_string(),
            reason: "declared twice".to_string(),
        });
    }
    Ok(())
}

fn resolve(param: &Param, interface_name: &str, sockets: &SocketTypeRegistry) -> Result<InterfaceSocket> {
    let configuration = |reason: String| CompileError::Configuration {
        param: param.name.clone(),
        reason,
    };

    if param.socket_type.is_empty() {
        return Err(configuration("no type specified".to_string()));
    }
    let socket_type = sockets
        .resolve(&param.socket_type)
        .ok_or_else(|| configuration(format!("unknown type '{}'", param.socket_type)))?;

    let mut entry = InterfaceSocket::new(
        param.display_name.as_deref().unwrap_or(interface_name),
        socket_type.clone(),
    );
    if let Some(default) = &param.default {
        let value = socket_type
            .coerce(default)
            .ok_or_else(|| configuration(format!("default {default:?} does not fit {socket_type}")))?;
        entry.default_value = Some(value);
    }
    if let Some(subtype) = &param.subtype {
        if !sockets.subtypes(&socket_type).contains(&subtype.as_str()) {
            return Err(configuration(format!("subtype '{subtype}' is not available on {socket_type}")));
        }
        entry.subtype = Some(subtype.clone());
    }
    if socket_type.supports_bounds() {
        entry.min_value = param.min;
        entry.max_value = param.max;
    }
    entry.description = param.tooltip.clone();
    entry.hide_in_modifier = param.hide_in_modifier;
    Ok(entry)
}

/// A populated input group
#[derive(Debug, Clone, PartialEq)]
pub struct GroupValue {
    /// Script name of the bundle
    pub name: String,
    fields: IndexMap<String, Expr>,
}

impl GroupValue {
    /// Empty group value
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: IndexMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, field: &str, value: Expr) {
        self.fields.insert(field.to_string(), value);
    }

    /// Value of one field
    pub fn get(&self, field: &str) -> Option<&Expr> {
        self.fields.get(field)
    }

    /// Fields by name, in declaration order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Expr)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// A value passed to a graph body
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Plain parameter
    Value(Expr),
    /// Populated group
    Group(GroupValue),
}

/// Body arguments by script name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inputs {
    values: IndexMap<String, Input>,
}

impl Inputs {
    /// No inputs
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_value(&mut self, name: &str, value: Expr) {
        self.values.insert(name.to_string(), Input::Value(value));
    }

    pub(crate) fn push_field(&mut self, group: &str, field: &str, value: Expr) {
        let entry = self
            .values
            .entry(group.to_string())
            .or_insert_with(|| Input::Group(GroupValue::new(group)));
        if let Input::Group(bundle) = entry {
            bundle.insert(field, value);
        }
    }

    /// Plain parameter by name
    pub fn get(&self, name: &str) -> Result<&Expr> {
        match self.values.get(name) {
            Some(Input::Value(expr)) => Ok(expr),
            _ => Err(CompileError::UnknownName(name.to_string())),
        }
    }

    /// Input group by name
    pub fn group(&self, name: &str) -> Result<&GroupValue> {
        match self.values.get(name) {
            Some(Input::Group(group)) => Ok(group),
            _ => Err(CompileError::UnknownName(name.to_string())),
        }
    }

    /// All inputs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Input)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of inputs
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no inputs
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
