// SPDX-License-Identifier: MIT OR Apache-2.0
//! Named attributes.

use crate::args::{Args, Operand};
use crate::context::BuildContext;
use crate::error::Result;
use crate::expr::Expr;

/// A named attribute of a fixed data type and domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name
    pub name: String,
    /// Field data type (`FLOAT`, `INT`, `FLOAT_VECTOR`, ...)
    pub data_type: String,
    /// Attribute domain
    pub domain: String,
}

impl Attribute {
    /// Point-domain attribute
    pub fn new(name: &str, data_type: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: data_type.to_string(),
            domain: "POINT".to_string(),
        }
    }

    /// Set the domain
    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domain = domain.to_string();
        self
    }

    fn lookup(&self, cx: &mut BuildContext, output: &str) -> Result<Expr> {
        let args = Args::new()
            .with_enum("data_type", &self.data_type)
            .with("name", self.name.as_str());
        cx.call("named_attribute", None, args)?.output(output)
    }

    /// Field reading the attribute
    pub fn read(&self, cx: &mut BuildContext) -> Result<Expr> {
        self.lookup(cx, "attribute")
    }

    /// Field telling whether the attribute exists
    pub fn exists(&self, cx: &mut BuildContext) -> Result<Expr> {
        self.lookup(cx, "exists")
    }

    /// Write `value` into the attribute of `geometry`
    pub fn store(&self, cx: &mut BuildContext, geometry: &Expr, value: impl Into<Operand>) -> Result<Expr> {
        let value: Operand = value.into();
        let args = Args::new()
            .with_enum("data_type", &self.data_type)
            .with_enum("domain", &self.domain)
            .with("name", self.name.as_str())
            .with("value", value);
        cx.call("store_named_attribute", Some(geometry), args)?.single()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Session;
    use geoscript_graph::{GraphStore, PortValue, PropertyValue, SocketType};

    #[test]
    fn test_store_then_read() {
        let session = Session::standard();
        let mut store = GraphStore::new();
        store.get_or_create("Tree");
        let mut cx = session.context(&mut store);
        cx.push_scope("Tree");

        let heat = Attribute::new("heat", "FLOAT").with_domain("FACE");
        let cube = cx.call("cube", None, Args::new()).unwrap().single().unwrap();
        let stored = heat.store(&mut cx, &cube, 0.5).unwrap();
        assert_eq!(stored.socket_type(), &SocketType::Geometry);

        let node = cx.node(stored.node()).unwrap();
        assert_eq!(node.property("domain"), Some(&PropertyValue::Enum("FACE".to_string())));
        let value = node.enabled_inputs().find(|p| p.name == "Value").unwrap();
        assert_eq!(value.default_value, Some(PortValue::Float(0.5)));

        let read = heat.read(&mut cx).unwrap();
        assert_eq!(read.socket_type(), &SocketType::Float);
        let exists = heat.exists(&mut cx).unwrap();
        assert_eq!(exists.socket_type(), &SocketType::Bool);
    }
}
