//! Formatting helpers shared by the rules and the converter.

use std::fmt::Display;

use once_cell::sync::Lazy;
use regex::Regex;

/// Output used when a document renders to nothing
pub const EMPTY_FALLBACK: &str = "N/A";

static BLANK_LINE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("blank line pattern is valid"));

/// Wrap text in an HTML comment
pub fn comment(text: &str) -> String {
    format!("<!-- {text} -->")
}

/// Placeholder for a node type without a rule
pub fn unsupported_node(node_type: &str) -> String {
    comment(&format!("Unsupported node type: {node_type}"))
}

/// Placeholder for a node whose rule failed
pub fn error_comment(node_type: &str, error: &impl Display) -> String {
    comment(&format!("Error rendering {node_type}: {error}"))
}

/// Markdown image reference
pub fn image(alt: &str, url: &str) -> String {
    format!("![{alt}]({url})")
}

/// Normalize converted Markdown.
///
/// Trims surrounding whitespace, collapses runs of three or more newlines to a
/// single blank line and ends the text with exactly one newline. Returns an
/// empty string when nothing but whitespace remains.
pub fn tidy(markdown: &str) -> String {
    let trimmed = markdown.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut result = BLANK_LINE_RUNS.replace_all(trimmed, "\n\n").into_owned();
    result.push('\n');
    result
}
