//! Ticket data parsed from tracker responses.

use crate::adf::{extract_text, NO_CONTENT};
use crate::fields::ResolvedFields;
use serde::Serialize;
use serde_json::Value;

/// A ticket fetched from the tracker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticket {
    /// Project-prefixed key, e.g. "ABC-1".
    pub key: String,
    pub summary: String,
    /// Plain-text description.
    pub description: String,
    pub status: String,
    pub assignee: Option<String>,
    /// Plain-text acceptance criteria, when the field is set.
    pub acceptance_criteria: Option<String>,
    pub created: String,
    pub updated: String,
    /// Parent ticket (epic or story) reference.
    pub parent: Option<ParentRef>,
}

/// Reference to a ticket's parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParentRef {
    pub key: String,
    pub summary: String,
}

/// A ticket comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub author: String,
    pub created: String,
    pub body: String,
}

/// Attachment metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub filename: String,
    pub size: u64,
    pub mime_type: String,
    pub author: String,
    pub created: String,
}

/// An entry of the tracker's field catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldInfo {
    pub id: String,
    pub name: String,
    pub custom: bool,
}

impl Ticket {
    /// Builds a ticket from an issue object of a search or read response.
    ///
    /// Returns `None` when the issue has no key.
    pub fn from_issue(issue: &Value, fields: &ResolvedFields) -> Option<Self> {
        let key = issue.get("key")?.as_str()?.to_owned();
        let data = issue.get("fields").unwrap_or(&Value::Null);

        let acceptance_criteria = fields
            .acceptance_criteria
            .as_deref()
            .and_then(|id| data.get(id))
            .filter(|value| !value.is_null())
            .map(|value| extract_text(Some(value)))
            .filter(|text| text != NO_CONTENT);

        let parent = data.get("parent").and_then(|parent| {
            Some(ParentRef {
                key: parent.get("key")?.as_str()?.to_owned(),
                summary: string_at(parent, &["fields", "summary"]).unwrap_or_default(),
            })
        });

        Some(Self {
            key,
            summary: string_at(data, &["summary"]).unwrap_or_else(|| "No summary".to_string()),
            description: extract_text(data.get(fields.description_field())),
            status: string_at(data, &["status", "name"]).unwrap_or_else(|| "Unknown".to_string()),
            assignee: string_at(data, &["assignee", "displayName"]),
            acceptance_criteria,
            created: string_at(data, &["created"]).unwrap_or_default(),
            updated: string_at(data, &["updated"]).unwrap_or_default(),
            parent,
        })
    }
}

impl Comment {
    /// Builds a comment from a comment listing entry.
    pub fn from_value(value: &Value) -> Self {
        Self {
            author: string_at(value, &["author", "displayName"])
                .unwrap_or_else(|| "Unknown".to_string()),
            created: string_at(value, &["created"]).unwrap_or_default(),
            body: extract_text(value.get("body")),
        }
    }
}

impl Attachment {
    /// Builds attachment metadata from an `attachment` field entry.
    pub fn from_value(value: &Value) -> Option<Self> {
        Some(Self {
            filename: string_at(value, &["filename"])?,
            size: value.get("size").and_then(Value::as_u64).unwrap_or(0),
            mime_type: string_at(value, &["mimeType"])
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            author: string_at(value, &["author", "displayName"])
                .unwrap_or_else(|| "Unknown".to_string()),
            created: string_at(value, &["created"]).unwrap_or_default(),
        })
    }
}

impl FieldInfo {
    /// Builds a field entry from the field catalog response.
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = string_at(value, &["id"])?;
        Some(Self {
            name: string_at(value, &["name"]).unwrap_or_default(),
            custom: value
                .get("custom")
                .and_then(Value::as_bool)
                .unwrap_or_else(|| id.starts_with("customfield_")),
            id,
        })
    }
}

fn string_at(value: &Value, path: &[&str]) -> Option<String> {
    path.iter()
        .try_fold(value, |current, segment| current.get(*segment))?
        .as_str()
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields() -> ResolvedFields {
        ResolvedFields {
            acceptance_criteria: Some("customfield_10010".to_string()),
            ..ResolvedFields::default()
        }
    }

    #[test]
    fn parses_issue_with_rich_fields() {
        let issue = json!({
            "key": "ABC-1",
            "fields": {
                "summary": "Add login",
                "description": {
                    "type": "doc",
                    "content": [{ "type": "paragraph", "content": [{ "type": "text", "text": "WHAT: short text" }] }]
                },
                "status": { "name": "In Progress" },
                "assignee": { "displayName": "Sam" },
                "created": "2024-01-01T00:00:00.000+0000",
                "updated": "2024-01-02T00:00:00.000+0000",
                "parent": { "key": "ABC-0", "fields": { "summary": "Auth epic" } },
                "customfield_10010": "must do X"
            }
        });

        let ticket = Ticket::from_issue(&issue, &fields()).unwrap();

        assert_eq!(ticket.key, "ABC-1");
        assert_eq!(ticket.description, "WHAT: short text");
        assert_eq!(ticket.status, "In Progress");
        assert_eq!(ticket.assignee.as_deref(), Some("Sam"));
        assert_eq!(ticket.acceptance_criteria.as_deref(), Some("must do X"));
        assert_eq!(
            ticket.parent,
            Some(ParentRef {
                key: "ABC-0".to_string(),
                summary: "Auth epic".to_string()
            })
        );
    }

    #[test]
    fn missing_fields_use_defaults() {
        let issue = json!({ "key": "ABC-2", "fields": { "customfield_10010": null } });
        let ticket = Ticket::from_issue(&issue, &fields()).unwrap();

        assert_eq!(ticket.summary, "No summary");
        assert_eq!(ticket.description, NO_CONTENT);
        assert_eq!(ticket.status, "Unknown");
        assert_eq!(ticket.assignee, None);
        assert_eq!(ticket.acceptance_criteria, None);
        assert_eq!(ticket.parent, None);
    }

    #[test]
    fn description_override_field_is_used() {
        let issue = json!({
            "key": "ABC-3",
            "fields": { "description": "standard", "customfield_2": "override" }
        });
        let fields = ResolvedFields {
            description: Some("customfield_2".to_string()),
            ..ResolvedFields::default()
        };

        let ticket = Ticket::from_issue(&issue, &fields).unwrap();
        assert_eq!(ticket.description, "override");
    }

    #[test]
    fn parses_attachment_metadata() {
        let value = json!({
            "filename": "screen.png",
            "size": 2048,
            "mimeType": "image/png",
            "author": { "displayName": "Kim" },
            "created": "2024-02-01"
        });
        let attachment = Attachment::from_value(&value).unwrap();
        assert_eq!(attachment.size, 2048);
        assert_eq!(attachment.mime_type, "image/png");
    }

    #[test]
    fn field_catalog_entry_infers_custom_flag() {
        let field = FieldInfo::from_value(&json!({ "id": "customfield_1", "name": "AC" })).unwrap();
        assert!(field.custom);
    }
}
