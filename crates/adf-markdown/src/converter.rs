//! AdfConverter - the main entry point for ADF to Markdown conversion.

use std::cell::RefCell;

use serde_json::Value;

use crate::node::NodeRef;
use crate::rules::{render_builtin, NodeKind, Rule, Rules};
use crate::utilities::{error_comment, tidy, unsupported_node, EMPTY_FALLBACK};
use crate::{AdfError, Result};

/// Options for AdfConverter
#[derive(Debug, Clone)]
pub struct ConverterOptions {
    /// `log` target used when reporting contained node failures
    pub log_target: String,

    /// Output for a document that renders to nothing
    pub empty_fallback: String,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            log_target: "adf_markdown".to_string(),
            empty_fallback: EMPTY_FALLBACK.to_string(),
        }
    }
}

/// A node failure that was replaced by a placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderIssue {
    /// Type of the node whose rule failed (empty when the node had no type)
    pub node_type: String,
    pub message: String,
}

/// Result of [`AdfConverter::convert_with_report`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub markdown: String,
    /// Contained failures, in the order they occurred
    pub issues: Vec<RenderIssue>,
}

/// The main service for converting ADF documents to Markdown.
///
/// A converter holds only its options and registered rules, so a single instance
/// can serve any number of conversions, including from several threads.
#[derive(Debug, Default)]
pub struct AdfConverter {
    options: ConverterOptions,
    rules: Rules,
}

impl AdfConverter {
    /// Create a new AdfConverter with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an AdfConverter with custom options
    pub fn with_options(options: ConverterOptions) -> Self {
        Self {
            options,
            rules: Rules::new(),
        }
    }

    /// Create an AdfConverter with a prepared rule set
    pub fn with_rules(rules: Rules) -> Self {
        Self {
            options: ConverterOptions::default(),
            rules,
        }
    }

    /// Add a custom rule. It replaces the built-in rule for `node_type`.
    pub fn add_rule(&mut self, node_type: &str, rule: Rule) -> &mut Self {
        self.rules.add(node_type, rule);
        self
    }

    /// Apply a plugin
    pub fn use_plugin<F>(&mut self, plugin: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        plugin(self);
        self
    }

    /// Get the current options
    pub fn options(&self) -> &ConverterOptions {
        &self.options
    }

    /// Get mutable access to options
    pub fn options_mut(&mut self) -> &mut ConverterOptions {
        &mut self.options
    }

    /// Get the registered rules
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Convert an ADF document to Markdown.
    ///
    /// Fails only when the root is not a `doc` node; every other problem is
    /// rendered as a placeholder comment in place of the offending node.
    pub fn convert(&self, doc: &Value) -> Result<String> {
        self.convert_with_report(doc)
            .map(|conversion| conversion.markdown)
    }

    /// Convert an ADF document, also returning the contained failures
    pub fn convert_with_report(&self, doc: &Value) -> Result<Conversion> {
        let root = NodeRef::new(doc);
        if root.node_type() != Some("doc") {
            return Err(AdfError::InvalidRoot {
                found: root.node_type().unwrap_or("<missing>").to_string(),
            });
        }

        let renderer = Renderer::new(self);
        let body = match root.children() {
            Ok(blocks) => blocks
                .into_iter()
                .map(|block| renderer.render(block))
                .collect::<Vec<_>>()
                .join("\n\n"),
            Err(err) => renderer.contain(root, err),
        };

        let mut markdown = tidy(&body);
        if markdown.is_empty() {
            markdown = self.options.empty_fallback.clone();
        }

        Ok(Conversion {
            markdown,
            issues: renderer.into_issues(),
        })
    }

    /// Render a single node (and its descendants) without post-processing.
    ///
    /// Never fails: errors become placeholder comments.
    pub fn render(&self, node: &Value) -> String {
        Renderer::new(self).render(NodeRef::new(node))
    }
}

/// Per-conversion rendering state, handed to rules so they can recurse.
pub struct Renderer<'c> {
    converter: &'c AdfConverter,
    issues: RefCell<Vec<RenderIssue>>,
}

impl<'c> Renderer<'c> {
    fn new(converter: &'c AdfConverter) -> Self {
        Self {
            converter,
            issues: RefCell::new(Vec::new()),
        }
    }

    /// Render one node.
    ///
    /// A registered rule for the node's type wins over the built-in rule; a type
    /// with neither gets an "Unsupported node type" comment. If the rule fails the
    /// failure is logged and recorded and a placeholder comment stands in for this
    /// node only.
    pub fn render(&self, node: NodeRef<'_>) -> String {
        match self.try_render(node) {
            Ok(output) => output,
            Err(err) => self.contain(node, err),
        }
    }

    /// Render every child of `node` and concatenate the results
    pub fn render_children(&self, node: NodeRef<'_>) -> Result<String> {
        Ok(self.render_each(node)?.concat())
    }

    /// Render every child of `node` separately, in document order
    pub fn render_each(&self, node: NodeRef<'_>) -> Result<Vec<String>> {
        Ok(node
            .children()?
            .into_iter()
            .map(|child| self.render(child))
            .collect())
    }

    /// The converter this renderer belongs to
    pub fn converter(&self) -> &'c AdfConverter {
        self.converter
    }

    fn try_render(&self, node: NodeRef<'_>) -> Result<String> {
        if !node.is_node() {
            return Err(AdfError::NotANode { found: node.kind() });
        }
        let node_type = node.type_name();

        if let Some(rule) = self.converter.rules.for_type(node_type) {
            return rule.render(node, self);
        }

        match NodeKind::from_tag(node_type) {
            Some(kind) => render_builtin(kind, node, self),
            None => {
                log::debug!(
                    target: self.converter.options.log_target.as_str(),
                    "no rule for node type {node_type:?}"
                );
                Ok(unsupported_node(node_type))
            }
        }
    }

    /// Log and record a failure, returning the placeholder for `node`
    pub(crate) fn contain(&self, node: NodeRef<'_>, err: AdfError) -> String {
        let node_type = node.type_name();
        log::warn!(
            target: self.converter.options.log_target.as_str(),
            "failed to render {node_type:?} node: {err}"
        );
        self.issues.borrow_mut().push(RenderIssue {
            node_type: node_type.to_string(),
            message: err.to_string(),
        });
        let label = if node.is_node() { node_type } else { "content" };
        error_comment(label, &err)
    }

    fn into_issues(self) -> Vec<RenderIssue> {
        self.issues.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(text: &str) -> Value {
        json!({"type": "text", "text": text})
    }

    fn paragraph(children: Vec<Value>) -> Value {
        json!({"type": "paragraph", "content": children})
    }

    fn doc(blocks: Vec<Value>) -> Value {
        json!({"type": "doc", "version": 1, "content": blocks})
    }

    #[test]
    fn test_simple_document() {
        let converter = AdfConverter::new();
        let result = converter
            .convert(&doc(vec![
                json!({"type": "heading", "attrs": {"level": 1}, "content": [text("Title")]}),
                paragraph(vec![text("Hello World")]),
            ]))
            .unwrap();
        assert_eq!(result, "# Title\n\nHello World\n");
    }

    #[test]
    fn test_blocks_keep_document_order() {
        let converter = AdfConverter::new();
        let result = converter
            .convert(&doc(vec![
                paragraph(vec![text("one")]),
                json!({"type": "rule"}),
                paragraph(vec![text("two")]),
            ]))
            .unwrap();
        assert_eq!(result, "one\n\n---\n\ntwo\n");
    }

    #[test]
    fn test_invalid_root_is_fatal() {
        let converter = AdfConverter::new();
        let err = converter
            .convert(&json!({"type": "notdoc", "content": [paragraph(vec![text("x")])]}))
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, AdfError::InvalidRoot { ref found } if found == "notdoc"));

        let err = converter.convert(&json!({"content": []})).unwrap_err();
        assert!(err.to_string().contains("<missing>"));
    }

    #[test]
    fn test_empty_document_falls_back() {
        let converter = AdfConverter::new();
        assert_eq!(converter.convert(&doc(vec![])).unwrap(), "N/A");
        assert_eq!(converter.convert(&json!({"type": "doc"})).unwrap(), "N/A");
        assert_eq!(
            converter
                .convert(&doc(vec![paragraph(vec![text("   ")])]))
                .unwrap(),
            "N/A"
        );
    }

    #[test]
    fn test_custom_fallback() {
        let converter = AdfConverter::with_options(ConverterOptions {
            empty_fallback: "(empty)".to_string(),
            ..Default::default()
        });
        assert_eq!(converter.convert(&doc(vec![])).unwrap(), "(empty)");
    }

    #[test]
    fn test_blank_line_runs_collapse() {
        let converter = AdfConverter::new();
        let result = converter
            .convert(&doc(vec![
                paragraph(vec![text("a\n\n\n\n")]),
                paragraph(vec![text("b")]),
            ]))
            .unwrap();
        assert_eq!(result, "a\n\nb\n");
    }

    #[test]
    fn test_unknown_node_type() {
        let converter = AdfConverter::new();
        let result = converter
            .convert(&doc(vec![json!({"type": "blockCard", "attrs": {"url": "x"}})]))
            .unwrap();
        assert_eq!(result, "<!-- Unsupported node type: blockCard -->\n");
    }

    #[test]
    fn test_malformed_node_is_contained() {
        // doc > bulletList > listItem > paragraph > text without `text`
        let converter = AdfConverter::new();
        let document = doc(vec![
            json!({
                "type": "bulletList",
                "content": [{
                    "type": "listItem",
                    "content": [paragraph(vec![text("before "), json!({"type": "text"}), text(" after")])]
                }]
            }),
            paragraph(vec![text("sibling")]),
        ]);

        let conversion = converter.convert_with_report(&document).unwrap();
        assert_eq!(
            conversion.markdown,
            "- before <!-- Error rendering text: text node is missing `text` --> after\n\nsibling\n"
        );
        assert_eq!(
            conversion.issues,
            vec![RenderIssue {
                node_type: "text".to_string(),
                message: "text node is missing `text`".to_string(),
            }]
        );
    }

    #[test]
    fn test_malformed_content_is_contained_at_parent() {
        let converter = AdfConverter::new();
        let result = converter
            .convert(&doc(vec![
                json!({"type": "paragraph", "content": "not a list"}),
                paragraph(vec![text("ok")]),
            ]))
            .unwrap();
        assert!(result.starts_with("<!-- Error rendering paragraph:"));
        assert!(result.ends_with("\n\nok\n"));
    }

    #[test]
    fn test_non_object_child_is_contained_alone() {
        let converter = AdfConverter::new();
        let conversion = converter
            .convert_with_report(&doc(vec![paragraph(vec![text("a"), json!(7), text("b")])]))
            .unwrap();
        assert_eq!(
            conversion.markdown,
            "a<!-- Error rendering content: expected a node, found a number -->b\n"
        );
        assert_eq!(
            conversion.issues,
            vec![RenderIssue {
                node_type: String::new(),
                message: "expected a node, found a number".to_string(),
            }]
        );
    }

    #[test]
    fn test_non_object_block_keeps_siblings() {
        let converter = AdfConverter::new();
        let result = converter
            .convert(&doc(vec![
                paragraph(vec![text("first")]),
                json!("stray"),
                paragraph(vec![text("last")]),
            ]))
            .unwrap();
        assert_eq!(
            result,
            "first\n\n<!-- Error rendering content: expected a node, found a string -->\n\nlast\n"
        );
    }

    #[test]
    fn test_malformed_root_content() {
        let converter = AdfConverter::new();
        let conversion = converter
            .convert_with_report(&json!({"type": "doc", "content": 3}))
            .unwrap();
        assert!(conversion.markdown.starts_with("<!-- Error rendering doc:"));
        assert_eq!(conversion.issues.len(), 1);
    }

    #[test]
    fn test_custom_rule_overrides_builtin() {
        let mut converter = AdfConverter::new();
        converter.add_rule("paragraph", Rule::constant("[para]"));

        let result = converter
            .convert(&doc(vec![
                paragraph(vec![text("ignored")]),
                json!({"type": "blockquote", "content": [paragraph(vec![text("also ignored")])]}),
            ]))
            .unwrap();
        assert_eq!(result, "[para]\n\n> [para]\n");
    }

    #[test]
    fn test_custom_rule_can_recurse() {
        let mut converter = AdfConverter::new();
        converter.add_rule(
            "panel",
            Rule::new(|node, renderer| {
                let kind = node.attr_or("panelType", "info").to_uppercase();
                Ok(format!("> [!{kind}]\n> {}", renderer.render_children(node)?))
            }),
        );

        let result = converter
            .convert(&doc(vec![json!({
                "type": "panel",
                "attrs": {"panelType": "warning"},
                "content": [paragraph(vec![text("careful")])]
            })]))
            .unwrap();
        assert_eq!(result, "> [!WARNING]\n> careful\n");
    }

    #[test]
    fn test_custom_rule_for_unknown_type() {
        let mut converter = AdfConverter::new();
        converter.add_rule(
            "date",
            Rule::infallible(|node, _| node.attr_or("timestamp", "").to_string()),
        );
        let result = converter
            .convert(&doc(vec![paragraph(vec![
                text("due "),
                json!({"type": "date", "attrs": {"timestamp": "1700000000000"}}),
            ])]))
            .unwrap();
        assert_eq!(result, "due 1700000000000\n");
    }

    #[test]
    fn test_failing_custom_rule_is_contained() {
        let mut converter = AdfConverter::new();
        converter.add_rule(
            "status",
            Rule::new(|_, _| Err(AdfError::custom("status service unavailable"))),
        );

        let conversion = converter
            .convert_with_report(&doc(vec![paragraph(vec![
                text("state: "),
                json!({"type": "status", "attrs": {"text": "DONE"}}),
            ])]))
            .unwrap();
        assert_eq!(
            conversion.markdown,
            "state: <!-- Error rendering status: status service unavailable -->\n"
        );
        assert_eq!(conversion.issues[0].node_type, "status");
    }

    #[test]
    fn test_use_plugin() {
        let mut converter = AdfConverter::new();
        converter.use_plugin(|c| {
            c.add_rule("rule", Rule::constant("***"));
            c.add_rule("hardBreak", Rule::constant("  \n"));
        });
        assert_eq!(converter.rules().len(), 2);
        assert_eq!(converter.render(&json!({"type": "rule"})), "***");
    }

    #[test]
    fn test_options_are_per_instance() {
        let custom = AdfConverter::with_options(ConverterOptions {
            log_target: "export::adf".to_string(),
            ..ConverterOptions::default()
        });
        assert_eq!(custom.options().log_target, "export::adf");
        assert_eq!(AdfConverter::new().options().log_target, "adf_markdown");
    }

    #[test]
    fn test_converter_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AdfConverter>();
    }
}
