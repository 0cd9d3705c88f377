//! # adf-markdown
//!
//! Convert Atlassian Document Format (ADF) trees to Markdown.
//!
//! ADF is the JSON document model Jira and Confluence use for rich text fields.
//! This crate walks an already-parsed ADF tree and renders it as Markdown, falling
//! back to inline HTML for constructs Markdown has no syntax for (collapsible
//! sections, colored and underlined spans, sized layout columns).
//!
//! ## Design
//!
//! - **Borrowed input**: the converter reads a [`serde_json::Value`] through
//!   [`NodeRef`] and never copies or edits the tree
//! - **Contained failures**: a malformed node becomes an inline
//!   `<!-- Error rendering ... -->` comment; its siblings and ancestors render
//!   normally. Only a root that is not a `doc` aborts the conversion
//! - **Overridable rules**: rules registered with [`AdfConverter::add_rule`]
//!   replace the built-in rule for their node type
//!
//! ## Example
//!
//! ```rust
//! use adf_markdown::AdfConverter;
//! use serde_json::json;
//!
//! let doc = json!({
//!     "type": "doc",
//!     "content": [{
//!         "type": "heading",
//!         "attrs": { "level": 2 },
//!         "content": [{ "type": "text", "text": "Hello World" }]
//!     }]
//! });
//!
//! let converter = AdfConverter::new();
//! let markdown = converter.convert(&doc).unwrap();
//! assert_eq!(markdown, "## Hello World\n");
//! ```
//!
//! ## Custom rules
//!
//! ```rust
//! use adf_markdown::{AdfConverter, Rule};
//! use serde_json::json;
//!
//! let mut converter = AdfConverter::new();
//! converter.add_rule(
//!     "mention",
//!     Rule::infallible(|node, _| format!("<@{}>", node.attr_or("id", "unknown"))),
//! );
//!
//! let doc = json!({
//!     "type": "doc",
//!     "content": [{
//!         "type": "paragraph",
//!         "content": [{ "type": "mention", "attrs": { "id": "42", "text": "Ann" } }]
//!     }]
//! });
//! assert_eq!(converter.convert(&doc).unwrap(), "<@42>\n");
//! ```

mod converter;
mod marks;
pub mod node;
mod rules;
mod table;
mod utilities;

pub use converter::{AdfConverter, Conversion, ConverterOptions, RenderIssue, Renderer};
pub use marks::{apply_mark, apply_marks};
pub use node::{MarkRef, NodeRef};
pub use rules::{NodeKind, RenderFn, Rule, Rules};
pub use table::format_table;
pub use utilities::*;

/// Error type for ADF conversion
#[derive(Debug, thiserror::Error)]
pub enum AdfError {
    /// The document root is not a `doc` node. This is the only fatal error.
    #[error("Invalid ADF document: root node must be of type 'doc', found '{found}'")]
    InvalidRoot { found: String },

    #[error("{node_type} node is missing `{field}`")]
    MissingField {
        node_type: String,
        field: &'static str,
    },

    #[error("{node_type} node has invalid attribute `{attr}`: {reason}")]
    InvalidAttribute {
        node_type: String,
        attr: &'static str,
        reason: String,
    },

    #[error("{node_type} node has malformed content: {reason}")]
    MalformedContent { node_type: String, reason: String },

    /// A `content` element that is not a JSON object
    #[error("expected a node, found {found}")]
    NotANode { found: &'static str },

    /// Raised by caller-registered rules
    #[error("{0}")]
    Custom(String),
}

impl AdfError {
    pub fn missing_field(node_type: &str, field: &'static str) -> Self {
        AdfError::MissingField {
            node_type: node_type.to_string(),
            field,
        }
    }

    pub fn invalid_attribute(node_type: &str, attr: &'static str, reason: impl Into<String>) -> Self {
        AdfError::InvalidAttribute {
            node_type: node_type.to_string(),
            attr,
            reason: reason.into(),
        }
    }

    pub fn malformed(node_type: &str, reason: impl Into<String>) -> Self {
        AdfError::MalformedContent {
            node_type: node_type.to_string(),
            reason: reason.into(),
        }
    }

    pub fn custom(message: impl Into<String>) -> Self {
        AdfError::Custom(message.into())
    }

    /// Whether this error aborts a whole conversion
    pub fn is_fatal(&self) -> bool {
        matches!(self, AdfError::InvalidRoot { .. })
    }
}

pub type Result<T> = std::result::Result<T, AdfError>;
