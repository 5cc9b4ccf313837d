//! Conversion of generated markdown into rich documents.
//!
//! Only the subset emitted by the test case prompt is understood: headings
//! up to level 3, whole-line bold paragraphs, fenced code blocks, bullet runs,
//! horizontal rules and plain paragraphs.

use super::Node;

const CODE_LANGUAGE: &str = "bash";

/// Converts markdown text into a rich document root.
///
/// Never fails: input that produces no blocks becomes a single paragraph
/// wrapping the raw text.
pub fn markdown_to_document(markdown: &str) -> Node {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut blocks = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index].trim();
        index += 1;

        if line.is_empty() {
            continue;
        }

        if let Some((level, text)) = heading(line) {
            blocks.push(Node::Heading {
                level,
                content: vec![Node::text(text)],
            });
        } else if line.starts_with("```") {
            let start = index;
            while index < lines.len() && !lines[index].trim().starts_with("```") {
                index += 1;
            }
            let code = lines[start..index].join("\n");
            // Skip the closing fence if there was one.
            index = (index + 1).min(lines.len());
            if !code.is_empty() {
                blocks.push(Node::CodeBlock {
                    language: Some(CODE_LANGUAGE.to_string()),
                    content: vec![Node::text(code)],
                });
            }
        } else if bullet(line).is_some() {
            let mut items = Vec::new();
            let mut cursor = index - 1;
            while let Some(text) = lines.get(cursor).and_then(|l| bullet(l.trim())) {
                items.push(Node::ListItem {
                    content: vec![Node::paragraph(text)],
                });
                cursor += 1;
            }
            index = cursor;
            blocks.push(Node::BulletList { content: items });
        } else if line.starts_with("---") {
            blocks.push(Node::Rule);
        } else if let Some(text) = bold_line(line) {
            blocks.push(Node::Paragraph {
                content: vec![Node::Text {
                    text: text.to_string(),
                    strong: true,
                }],
            });
        } else {
            blocks.push(Node::paragraph(line));
        }
    }

    if blocks.is_empty() {
        blocks.push(Node::paragraph(markdown));
    }

    Node::Doc { content: blocks }
}

fn heading(line: &str) -> Option<(u8, &str)> {
    [("### ", 3), ("## ", 2), ("# ", 1)]
        .into_iter()
        .find_map(|(prefix, level)| line.strip_prefix(prefix).map(|text| (level, text)))
}

fn bullet(line: &str) -> Option<&str> {
    line.strip_prefix("- ").or_else(|| line.strip_prefix("* "))
}

/// Returns the inner text of a `**bold**` line. Empty bold text is not a
/// valid text node, so `****` stays a plain paragraph.
fn bold_line(line: &str) -> Option<&str> {
    line.strip_prefix("**")?
        .strip_suffix("**")
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(markdown: &str) -> Vec<Node> {
        match markdown_to_document(markdown) {
            Node::Doc { content } => content,
            other => panic!("expected doc, got {other:?}"),
        }
    }

    #[test]
    fn converts_bash_fence_verbatim() {
        let content = blocks("```bash\necho hi\n```");
        assert_eq!(
            content,
            vec![Node::CodeBlock {
                language: Some("bash".to_string()),
                content: vec![Node::text("echo hi")],
            }]
        );
    }

    #[test]
    fn empty_input_wraps_empty_paragraph() {
        assert_eq!(blocks(""), vec![Node::paragraph("")]);
    }

    #[test]
    fn whitespace_only_input_is_kept_verbatim() {
        assert_eq!(blocks("  \n "), vec![Node::paragraph("  \n ")]);
    }

    #[test]
    fn converts_test_case_layout() {
        let markdown = "### Test Case 1 - Login\n\n**Steps:**\n\n1. Open the page.\n- first\n* second\n\n---\n## Next";
        let content = blocks(markdown);

        assert_eq!(
            content,
            vec![
                Node::Heading {
                    level: 3,
                    content: vec![Node::text("Test Case 1 - Login")]
                },
                Node::Paragraph {
                    content: vec![Node::Text {
                        text: "Steps:".to_string(),
                        strong: true
                    }]
                },
                Node::paragraph("1. Open the page."),
                Node::BulletList {
                    content: vec![
                        Node::ListItem {
                            content: vec![Node::paragraph("first")]
                        },
                        Node::ListItem {
                            content: vec![Node::paragraph("second")]
                        },
                    ]
                },
                Node::Rule,
                Node::Heading {
                    level: 2,
                    content: vec![Node::text("Next")]
                },
            ]
        );
    }

    #[test]
    fn unterminated_fence_runs_to_end() {
        let content = blocks("```\nline one\nline two");
        assert_eq!(
            content,
            vec![Node::CodeBlock {
                language: Some("bash".to_string()),
                content: vec![Node::text("line one\nline two")],
            }]
        );
    }

    #[test]
    fn lone_bold_markers_stay_plain() {
        assert_eq!(blocks("**"), vec![Node::paragraph("**")]);
    }

    #[test]
    fn empty_bold_line_stays_plain() {
        assert_eq!(blocks("****"), vec![Node::paragraph("****")]);
    }
}
