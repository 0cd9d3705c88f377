//! Table rendering.
//!
//! ADF tables carry no reliable header marker at the row level, so the first
//! `tableRow` is always laid out as the Markdown header row.

use crate::converter::Renderer;
use crate::node::NodeRef;
use crate::utilities::comment;
use crate::Result;

/// Render a `table` node.
///
/// Children that are not `tableRow` nodes are skipped. A row whose cells cannot
/// be read becomes a single placeholder cell.
pub(crate) fn render_table(table: NodeRef<'_>, renderer: &Renderer<'_>) -> Result<String> {
    let mut rows = Vec::new();
    for row in table.children()? {
        if row.node_type() != Some("tableRow") {
            continue;
        }
        let cells = match renderer.render_each(row) {
            Ok(cells) => cells,
            Err(err) => vec![renderer.contain(row, err)],
        };
        rows.push(cells);
    }
    Ok(format_table(&rows))
}

/// Lay out rendered cells as a Markdown table.
///
/// The first row becomes the header and is followed by a `---` separator with one
/// column per header cell, and at least one. No rows at all yields an
/// "Empty table" comment.
pub fn format_table(rows: &[Vec<String>]) -> String {
    let Some((header, body)) = rows.split_first() else {
        return comment("Empty table");
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(header.join(" | "));
    lines.push(vec!["---"; header.len().max(1)].join(" | "));
    lines.extend(body.iter().map(|row| row.join(" | ")));
    lines.join("\n")
}
