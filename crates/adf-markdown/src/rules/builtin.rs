//! Built-in rules for ADF node types.

use serde_json::Value;

use crate::converter::Renderer;
use crate::marks::apply_marks;
use crate::node::NodeRef;
use crate::table::render_table;
use crate::utilities::{comment, image};
use crate::{AdfError, Result};

/// Node types with a built-in rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Paragraph,
    ListItem,
    Heading,
    OrderedList,
    BulletList,
    DecisionList,
    Text,
    HardBreak,
    MediaSingle,
    MediaInline,
    Media,
    MediaGroup,
    InlineCard,
    Blockquote,
    HorizontalRule,
    Emoji,
    Mention,
    Status,
    CodeBlock,
    Panel,
    Expand,
    NestedExpand,
    Table,
    TableCell,
    TableHeader,
    TaskList,
    TaskItem,
    DecisionItem,
    LayoutSection,
    LayoutColumn,
    Extension,
    InlineExtension,
    UnsupportedBlock,
    UnsupportedInline,
}

impl NodeKind {
    /// Every kind, in declaration order
    pub const ALL: &'static [NodeKind] = &[
        NodeKind::Paragraph,
        NodeKind::ListItem,
        NodeKind::Heading,
        NodeKind::OrderedList,
        NodeKind::BulletList,
        NodeKind::DecisionList,
        NodeKind::Text,
        NodeKind::HardBreak,
        NodeKind::MediaSingle,
        NodeKind::MediaInline,
        NodeKind::Media,
        NodeKind::MediaGroup,
        NodeKind::InlineCard,
        NodeKind::Blockquote,
        NodeKind::HorizontalRule,
        NodeKind::Emoji,
        NodeKind::Mention,
        NodeKind::Status,
        NodeKind::CodeBlock,
        NodeKind::Panel,
        NodeKind::Expand,
        NodeKind::NestedExpand,
        NodeKind::Table,
        NodeKind::TableCell,
        NodeKind::TableHeader,
        NodeKind::TaskList,
        NodeKind::TaskItem,
        NodeKind::DecisionItem,
        NodeKind::LayoutSection,
        NodeKind::LayoutColumn,
        NodeKind::Extension,
        NodeKind::InlineExtension,
        NodeKind::UnsupportedBlock,
        NodeKind::UnsupportedInline,
    ];

    /// Look up the kind for an ADF `type` tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "paragraph" => NodeKind::Paragraph,
            "listItem" => NodeKind::ListItem,
            "heading" => NodeKind::Heading,
            "orderedList" => NodeKind::OrderedList,
            "bulletList" => NodeKind::BulletList,
            "decisionList" => NodeKind::DecisionList,
            "text" => NodeKind::Text,
            "hardBreak" => NodeKind::HardBreak,
            "mediaSingle" => NodeKind::MediaSingle,
            "mediaInline" => NodeKind::MediaInline,
            "media" => NodeKind::Media,
            "mediaGroup" => NodeKind::MediaGroup,
            "inlineCard" => NodeKind::InlineCard,
            "blockquote" => NodeKind::Blockquote,
            "rule" => NodeKind::HorizontalRule,
            "emoji" => NodeKind::Emoji,
            "mention" => NodeKind::Mention,
            "status" => NodeKind::Status,
            "codeBlock" => NodeKind::CodeBlock,
            "panel" => NodeKind::Panel,
            "expand" => NodeKind::Expand,
            "nestedExpand" => NodeKind::NestedExpand,
            "table" => NodeKind::Table,
            "tableCell" => NodeKind::TableCell,
            "tableHeader" => NodeKind::TableHeader,
            "taskList" => NodeKind::TaskList,
            "taskItem" => NodeKind::TaskItem,
            "decisionItem" => NodeKind::DecisionItem,
            "layoutSection" => NodeKind::LayoutSection,
            "layoutColumn" => NodeKind::LayoutColumn,
            "extension" => NodeKind::Extension,
            "inlineExtension" => NodeKind::InlineExtension,
            "unsupportedBlock" => NodeKind::UnsupportedBlock,
            "unsupportedInline" => NodeKind::UnsupportedInline,
            _ => return None,
        };
        Some(kind)
    }

    /// The ADF `type` tag for this kind
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Paragraph => "paragraph",
            NodeKind::ListItem => "listItem",
            NodeKind::Heading => "heading",
            NodeKind::OrderedList => "orderedList",
            NodeKind::BulletList => "bulletList",
            NodeKind::DecisionList => "decisionList",
            NodeKind::Text => "text",
            NodeKind::HardBreak => "hardBreak",
            NodeKind::MediaSingle => "mediaSingle",
            NodeKind::MediaInline => "mediaInline",
            NodeKind::Media => "media",
            NodeKind::MediaGroup => "mediaGroup",
            NodeKind::InlineCard => "inlineCard",
            NodeKind::Blockquote => "blockquote",
            NodeKind::HorizontalRule => "rule",
            NodeKind::Emoji => "emoji",
            NodeKind::Mention => "mention",
            NodeKind::Status => "status",
            NodeKind::CodeBlock => "codeBlock",
            NodeKind::Panel => "panel",
            NodeKind::Expand => "expand",
            NodeKind::NestedExpand => "nestedExpand",
            NodeKind::Table => "table",
            NodeKind::TableCell => "tableCell",
            NodeKind::TableHeader => "tableHeader",
            NodeKind::TaskList => "taskList",
            NodeKind::TaskItem => "taskItem",
            NodeKind::DecisionItem => "decisionItem",
            NodeKind::LayoutSection => "layoutSection",
            NodeKind::LayoutColumn => "layoutColumn",
            NodeKind::Extension => "extension",
            NodeKind::InlineExtension => "inlineExtension",
            NodeKind::UnsupportedBlock => "unsupportedBlock",
            NodeKind::UnsupportedInline => "unsupportedInline",
        }
    }
}

/// Render a node with the built-in rule for its kind
pub(crate) fn render_builtin(
    kind: NodeKind,
    node: NodeRef<'_>,
    renderer: &Renderer<'_>,
) -> Result<String> {
    match kind {
        NodeKind::Paragraph | NodeKind::ListItem | NodeKind::TableCell | NodeKind::TableHeader => {
            renderer.render_children(node)
        }
        NodeKind::Heading => heading(node, renderer),
        NodeKind::OrderedList => list(node, renderer, true),
        NodeKind::BulletList | NodeKind::DecisionList => list(node, renderer, false),
        NodeKind::Text => text(node),
        NodeKind::HardBreak => Ok("\n".to_string()),
        NodeKind::MediaSingle => {
            let media = node.children()?.into_iter().next();
            Ok(media_image(media))
        }
        NodeKind::MediaInline | NodeKind::Media => Ok(media_image(Some(node))),
        NodeKind::MediaGroup => {
            let images: Vec<String> = node
                .children()?
                .into_iter()
                .map(|media| media_image(Some(media)))
                .collect();
            Ok(images.join("\n"))
        }
        NodeKind::InlineCard => {
            let url = node.attr_or("url", "");
            Ok(format!("[{url}]({url})"))
        }
        NodeKind::Blockquote => Ok(format!("> {}", renderer.render_children(node)?)),
        NodeKind::HorizontalRule => Ok("---".to_string()),
        NodeKind::Emoji => {
            let emoji = node
                .attr_str("text")
                .or_else(|| node.attr_str("shortName"))
                .unwrap_or("");
            Ok(emoji.to_string())
        }
        NodeKind::Mention => Ok(format!("@{}", node.attr_or("text", ""))),
        NodeKind::Status => Ok(format!("[{}]", node.attr_or("text", ""))),
        NodeKind::CodeBlock => {
            let language = node.attr_or("language", "");
            let code = renderer.render_children(node)?;
            Ok(format!("```{language}\n{code}\n```"))
        }
        NodeKind::Panel => Ok(format!("> **Panel:** {}", renderer.render_children(node)?)),
        NodeKind::Expand | NodeKind::NestedExpand => {
            let title = node.attr_or("title", "Expand");
            let body = renderer.render_children(node)?;
            Ok(format!("<details><summary>{title}</summary>{body}</details>"))
        }
        NodeKind::Table => render_table(node, renderer),
        NodeKind::TaskList | NodeKind::LayoutSection => {
            Ok(renderer.render_each(node)?.join("\n"))
        }
        NodeKind::TaskItem => {
            let checked = if node.attr_str("state") == Some("DONE") {
                'x'
            } else {
                ' '
            };
            Ok(format!("- [{checked}] {}", renderer.render_children(node)?))
        }
        NodeKind::DecisionItem => Ok(format!("- [Decision] {}", renderer.render_children(node)?)),
        NodeKind::LayoutColumn => layout_column(node, renderer),
        NodeKind::Extension => Ok(extension(node, "Extension")),
        NodeKind::InlineExtension => Ok(extension(node, "Inline Extension")),
        NodeKind::UnsupportedBlock => Ok(comment("Unsupported block content")),
        NodeKind::UnsupportedInline => Ok(comment("Unsupported inline content")),
    }
}

fn heading(node: NodeRef<'_>, renderer: &Renderer<'_>) -> Result<String> {
    let level = match node.attr("level") {
        None => 1,
        Some(value) => heading_level(value).ok_or_else(|| {
            AdfError::invalid_attribute(
                "heading",
                "level",
                format!("expected a non-negative integer, found {value}"),
            )
        })?,
    };

    let content = renderer.render_children(node)?;
    Ok(format!("{} {content}", "#".repeat(level)))
}

/// Accepts integers and integral floats such as `2.0`
fn heading_level(value: &Value) -> Option<usize> {
    if let Some(level) = value.as_u64() {
        return usize::try_from(level).ok();
    }
    value
        .as_f64()
        .filter(|level| *level >= 0.0 && level.fract() == 0.0 && *level <= u32::MAX as f64)
        .map(|level| level as usize)
}

fn list(node: NodeRef<'_>, renderer: &Renderer<'_>, ordered: bool) -> Result<String> {
    let items: Vec<String> = renderer
        .render_each(node)?
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if ordered {
                format!("{}. {item}", index + 1)
            } else {
                format!("- {item}")
            }
        })
        .collect();
    Ok(items.join("\n"))
}

fn text(node: NodeRef<'_>) -> Result<String> {
    let text = node
        .text()
        .ok_or_else(|| AdfError::missing_field("text", "text"))?;
    Ok(apply_marks(text, node.marks()))
}

/// Image reference from a media node's attributes; `None` uses the defaults
fn media_image(media: Option<NodeRef<'_>>) -> String {
    match media {
        Some(media) => image(media.attr_or("alt", "image"), media.attr_or("url", "")),
        None => image("image", ""),
    }
}

fn layout_column(node: NodeRef<'_>, renderer: &Renderer<'_>) -> Result<String> {
    // ADF stores the width as a percentage number
    let width = match node.attr("width") {
        Some(Value::Number(width)) => format!("{width}%"),
        Some(Value::String(width)) => width.clone(),
        _ => "100%".to_string(),
    };
    let content = renderer.render_children(node)?;
    Ok(format!("<div style='width:{width}'>{content}</div>"))
}

fn extension(node: NodeRef<'_>, label: &str) -> String {
    let extension_type = node.attr_or("extensionType", "generic");
    let parameters = node
        .attr("parameters")
        .map(Value::to_string)
        .unwrap_or_else(|| "{}".to_string());
    comment(&format!(
        "{label}: {extension_type}, Parameters: {parameters}"
    ))
}
