//! Borrowed views over ADF JSON nodes.
//!
//! ADF arrives as parsed JSON. Deserializing it into an owned tree would reject the
//! whole document on the first malformed child, so the converter walks the
//! [`serde_json::Value`] directly through [`NodeRef`] and [`MarkRef`] and reports
//! shape problems per node instead.

use serde_json::{Map, Value};

use crate::{AdfError, Result};

/// A reference to one node of an ADF tree.
///
/// Absent `attrs`, `content` and `marks` behave as empty. Accessors never panic.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    value: &'a Value,
}

impl<'a> NodeRef<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    /// The underlying JSON value
    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// The `type` tag, if present and a string
    pub fn node_type(&self) -> Option<&'a str> {
        self.value.get("type").and_then(Value::as_str)
    }

    /// The `type` tag, or an empty string when it is missing
    pub fn type_name(&self) -> &'a str {
        self.node_type().unwrap_or("")
    }

    pub fn attrs(&self) -> Option<&'a Map<String, Value>> {
        self.value.get("attrs").and_then(Value::as_object)
    }

    /// Get an attribute value by name. `null` counts as absent.
    pub fn attr(&self, name: &str) -> Option<&'a Value> {
        self.attrs()?.get(name).filter(|v| !v.is_null())
    }

    /// Get a string attribute by name
    pub fn attr_str(&self, name: &str) -> Option<&'a str> {
        self.attr(name)?.as_str()
    }

    /// Get a string attribute, or `default` when it is absent or not a string
    pub fn attr_or(&self, name: &str, default: &'a str) -> &'a str {
        self.attr_str(name).unwrap_or(default)
    }

    /// The literal payload of a `text` node
    pub fn text(&self) -> Option<&'a str> {
        self.value.get("text").and_then(Value::as_str)
    }

    /// Whether this value is a JSON object, the only shape a node can take
    pub fn is_node(&self) -> bool {
        self.value.is_object()
    }

    /// Describe the JSON kind of this value for error messages
    pub fn kind(&self) -> &'static str {
        kind_of(self.value)
    }

    /// Child entries in document order, one per element of `content`.
    ///
    /// A missing or `null` `content` yields no children. Any other non-array
    /// `content` is an [`AdfError::MalformedContent`] for this node. Elements
    /// that are not JSON objects are still returned; check [`NodeRef::is_node`]
    /// before treating one as a node.
    pub fn children(&self) -> Result<Vec<NodeRef<'a>>> {
        match self.value.get("content") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items.iter().map(NodeRef::new).collect()),
            Some(other) => Err(AdfError::malformed(
                self.type_name(),
                format!("expected `content` to be an array, found {}", kind_of(other)),
            )),
        }
    }

    /// Marks attached to a text node, in list order.
    ///
    /// Entries that are not JSON objects are skipped, as is a `marks` value that
    /// is not an array.
    pub fn marks(&self) -> impl Iterator<Item = MarkRef<'a>> {
        let value = self.value;
        value
            .get("marks")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter(|mark| mark.is_object())
            .map(MarkRef::new)
    }
}

/// A reference to one mark of a text node
#[derive(Debug, Clone, Copy)]
pub struct MarkRef<'a> {
    value: &'a Value,
}

impl<'a> MarkRef<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    pub fn mark_type(&self) -> Option<&'a str> {
        self.value.get("type").and_then(Value::as_str)
    }

    pub fn attr_str(&self, name: &str) -> Option<&'a str> {
        self.value
            .get("attrs")
            .and_then(Value::as_object)?
            .get(name)
            .and_then(Value::as_str)
    }

    pub fn attr_or(&self, name: &str, default: &'a str) -> &'a str {
        self.attr_str(name).unwrap_or(default)
    }
}

/// Describe a JSON value's kind for error messages
fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
