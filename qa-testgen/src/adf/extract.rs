//! Plain-text extraction from rich documents.

use super::Node;
use serde_json::Value;
use tracing::warn;

/// Returned when a field holds no usable text.
pub const NO_CONTENT: &str = "No content provided";

/// Extracts plain text from a tracker field value.
///
/// Strings are returned as-is. Rich documents are walked in document order,
/// concatenating text leaves and breaking lines after paragraphs; blank lines
/// are dropped. Anything else is rendered as JSON with a warning. Empty input
/// yields [`NO_CONTENT`].
pub fn extract_text(value: Option<&Value>) -> String {
    let text = match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(value @ Value::Object(object)) if object.contains_key("content") => {
            let root = Node::from_value(value).unwrap_or_else(|| Node::Doc {
                content: super::children(object),
            });
            let mut buffer = String::new();
            walk(&root, &mut buffer);
            collapse_blank_lines(&buffer)
        }
        Some(other) => {
            warn!(
                kind = json_kind(other),
                "Unrecognized rich text shape, falling back to raw JSON"
            );
            other.to_string()
        }
    };

    if text.trim().is_empty() {
        NO_CONTENT.to_string()
    } else {
        text
    }
}

fn walk(node: &Node, out: &mut String) {
    match node {
        Node::Text { text, .. } => out.push_str(text),
        Node::Paragraph { content } => {
            content.iter().for_each(|child| walk(child, out));
            out.push('\n');
        }
        Node::Doc { content }
        | Node::Heading { content, .. }
        | Node::CodeBlock { content, .. }
        | Node::BulletList { content }
        | Node::ListItem { content }
        | Node::Other { content, .. } => content.iter().for_each(|child| walk(child, out)),
        Node::Rule => {}
    }
}

fn collapse_blank_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_every_text_fragment_in_order() {
        let doc = json!({
            "type": "doc",
            "version": 1,
            "content": [
                { "type": "paragraph", "content": [
                    { "type": "text", "text": "alpha" },
                    { "type": "text", "text": "beta" }
                ]},
                { "type": "bulletList", "content": [
                    { "type": "listItem", "content": [
                        { "type": "paragraph", "content": [{ "type": "text", "text": "gamma" }] }
                    ]}
                ]},
                { "type": "panel", "content": [
                    { "type": "paragraph", "content": [{ "type": "text", "text": "delta" }] }
                ]}
            ]
        });

        assert_eq!(extract_text(Some(&doc)), "alphabeta\ngamma\ndelta");
    }

    #[test]
    fn returns_strings_unchanged() {
        let value = json!("WHAT: short text");
        assert_eq!(extract_text(Some(&value)), "WHAT: short text");
    }

    #[test]
    fn empty_inputs_yield_sentinel() {
        assert_eq!(extract_text(None), NO_CONTENT);
        assert_eq!(extract_text(Some(&Value::Null)), NO_CONTENT);
        assert_eq!(extract_text(Some(&json!(""))), NO_CONTENT);
        assert_eq!(
            extract_text(Some(&json!({ "type": "doc", "content": [] }))),
            NO_CONTENT
        );
    }

    #[test]
    fn untagged_tree_is_still_walked() {
        let value = json!({ "content": [{ "type": "paragraph", "content": [{ "type": "text", "text": "x" }] }] });
        assert_eq!(extract_text(Some(&value)), "x");
    }

    #[test]
    fn unknown_shapes_fall_back_to_json() {
        let value = json!({ "value": "Option A" });
        assert_eq!(extract_text(Some(&value)), r#"{"value":"Option A"}"#);
        assert_eq!(extract_text(Some(&json!(42))), "42");
    }
}
