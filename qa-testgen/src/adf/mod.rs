//! Atlassian Document Format (ADF) handling.
//!
//! Jira and Confluence store rich text as a JSON tree of typed nodes. This
//! module parses that tree into a closed [`Node`] sum type, extracts plain
//! text from it and builds new documents from the markdown produced by the
//! generation service.

mod extract;
mod markdown;

pub use extract::{extract_text, NO_CONTENT};
pub use markdown::markdown_to_document;

use serde_json::{json, Map, Value};

/// A single node of a rich document.
///
/// Node kinds outside the closed set are kept as [`Node::Other`] together with
/// their children so that nested text is not lost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Document root.
    Doc { content: Vec<Node> },
    /// Paragraph block.
    Paragraph { content: Vec<Node> },
    /// Heading block, level 1-6.
    Heading { level: u8, content: Vec<Node> },
    /// Code block with an optional language tag.
    CodeBlock {
        language: Option<String>,
        content: Vec<Node>,
    },
    /// Unordered list of [`Node::ListItem`].
    BulletList { content: Vec<Node> },
    /// Item of a list.
    ListItem { content: Vec<Node> },
    /// Horizontal rule.
    Rule,
    /// Inline text leaf.
    Text { text: String, strong: bool },
    /// Any other node kind.
    Other { kind: String, content: Vec<Node> },
}

impl Node {
    /// Creates a plain text leaf.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            strong: false,
        }
    }

    /// Creates a paragraph holding a single text leaf.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph {
            content: vec![Self::text(text)],
        }
    }

    /// Parses a JSON value into a node tree.
    ///
    /// Returns `None` when the value is not an object carrying a `type` tag.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let kind = object.get("type")?.as_str()?;
        let content = children(object);

        let node = match kind {
            "doc" => Self::Doc { content },
            "paragraph" => Self::Paragraph { content },
            "heading" => Self::Heading {
                level: attr(object, "level")
                    .and_then(Value::as_u64)
                    .and_then(|level| u8::try_from(level).ok())
                    .unwrap_or(1),
                content,
            },
            "codeBlock" => Self::CodeBlock {
                language: attr(object, "language")
                    .and_then(Value::as_str)
                    .map(str::to_owned),
                content,
            },
            "bulletList" => Self::BulletList { content },
            "listItem" => Self::ListItem { content },
            "rule" => Self::Rule,
            "text" => Self::Text {
                text: object
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_owned(),
                strong: object
                    .get("marks")
                    .and_then(Value::as_array)
                    .is_some_and(|marks| {
                        marks
                            .iter()
                            .any(|mark| mark.get("type").and_then(Value::as_str) == Some("strong"))
                    }),
            },
            other => Self::Other {
                kind: other.to_owned(),
                content,
            },
        };
        Some(node)
    }

    /// Serializes the node tree into the tracker's JSON representation.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Doc { content } => json!({
                "type": "doc",
                "version": 1,
                "content": to_values(content),
            }),
            Self::Paragraph { content } => json!({
                "type": "paragraph",
                "content": to_values(content),
            }),
            Self::Heading { level, content } => json!({
                "type": "heading",
                "attrs": { "level": level },
                "content": to_values(content),
            }),
            Self::CodeBlock { language, content } => {
                let mut value = json!({
                    "type": "codeBlock",
                    "content": to_values(content),
                });
                if let Some(language) = language {
                    value["attrs"] = json!({ "language": language });
                }
                value
            }
            Self::BulletList { content } => json!({
                "type": "bulletList",
                "content": to_values(content),
            }),
            Self::ListItem { content } => json!({
                "type": "listItem",
                "content": to_values(content),
            }),
            Self::Rule => json!({ "type": "rule" }),
            Self::Text { text, strong } => {
                let mut value = json!({ "type": "text", "text": text });
                if *strong {
                    value["marks"] = json!([{ "type": "strong" }]);
                }
                value
            }
            Self::Other { kind, content } => json!({
                "type": kind,
                "content": to_values(content),
            }),
        }
    }

    /// Returns the child nodes, empty for leaves.
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Doc { content }
            | Self::Paragraph { content }
            | Self::Heading { content, .. }
            | Self::CodeBlock { content, .. }
            | Self::BulletList { content }
            | Self::ListItem { content }
            | Self::Other { content, .. } => content,
            Self::Rule | Self::Text { .. } => &[],
        }
    }
}

fn children(object: &Map<String, Value>) -> Vec<Node> {
    object
        .get("content")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Node::from_value).collect())
        .unwrap_or_default()
}

fn attr<'a>(object: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    object.get("attrs")?.get(name)
}

fn to_values(nodes: &[Node]) -> Vec<Value> {
    nodes.iter().map(Node::to_value).collect()
}
