//! Inline mark composition for text nodes.

use crate::node::MarkRef;

/// Apply marks in list order.
///
/// Each mark wraps the result of the previous one, so the last mark in the list
/// becomes the outermost wrapper. Mark application cannot fail.
pub fn apply_marks<'a, I>(text: &str, marks: I) -> String
where
    I: IntoIterator<Item = MarkRef<'a>>,
{
    marks
        .into_iter()
        .fold(text.to_string(), |wrapped, mark| apply_mark(&wrapped, mark))
}

/// Wrap text in a single mark. Unknown mark types leave the text unchanged.
pub fn apply_mark(text: &str, mark: MarkRef<'_>) -> String {
    match mark.mark_type() {
        Some("strong") => format!("**{text}**"),
        Some("em") => format!("*{text}*"),
        Some("underline") => format!("<u>{text}</u>"),
        Some("strike") => format!("~~{text}~~"),
        Some("code") => format!("`{text}`"),
        Some("textColor") => format!(
            "<span style='color:{}'>{text}</span>",
            mark.attr_or("color", "inherit")
        ),
        Some("alignment") => format!(
            "<div style='text-align:{}'>{text}</div>",
            mark.attr_or("align", "left")
        ),
        _ => text.to_string(),
    }
}
