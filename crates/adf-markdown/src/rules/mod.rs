//! Rule system for ADF to Markdown conversion.

mod builtin;
mod rule;

pub use builtin::NodeKind;
pub(crate) use builtin::render_builtin;
pub use rule::{RenderFn, Rule};

use indexmap::IndexMap;

/// Caller-registered rules, keyed by node type.
///
/// A registered rule takes precedence over the built-in rule for its type.
#[derive(Debug, Default)]
pub struct Rules {
    custom_rules: IndexMap<String, Rule>,
}

impl Rules {
    /// Create an empty rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule, replacing any earlier rule for the same type
    pub fn add(&mut self, node_type: &str, rule: Rule) -> Option<Rule> {
        self.custom_rules.insert(node_type.to_string(), rule)
    }

    /// Unregister the rule for a type, restoring the built-in behavior
    pub fn remove(&mut self, node_type: &str) -> Option<Rule> {
        self.custom_rules.shift_remove(node_type)
    }

    /// Find the registered rule for a node type
    pub fn for_type(&self, node_type: &str) -> Option<&Rule> {
        self.custom_rules.get(node_type)
    }

    /// Node types with a registered rule, in registration order
    pub fn node_types(&self) -> impl Iterator<Item = &str> {
        self.custom_rules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.custom_rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.custom_rules.is_empty()
    }
}
