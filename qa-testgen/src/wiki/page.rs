//! Wiki page types.

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::LazyLock;
use url::Url;

static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag regex should be valid"));

/// A Confluence page with its body rendered to plain text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WikiPage {
    pub id: String,
    pub title: String,
    /// Space key, empty when the response omitted it.
    pub space: String,
    pub url: String,
    pub body: String,
    /// Storage-format markup, kept for reference scanning.
    #[serde(skip)]
    pub raw: String,
}

impl WikiPage {
    /// Parses a content object returned with `expand=body.storage,space`.
    ///
    /// Relative `_links.webui` paths are resolved against `base_url`.
    #[must_use]
    pub fn from_content(value: &Value, base_url: &Url) -> Option<Self> {
        let id = value.get("id").and_then(Value::as_str)?.to_string();
        let title = value
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("Untitled")
            .to_string();
        let space = value
            .pointer("/space/key")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let raw = value
            .pointer("/body/storage/value")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let url = value
            .pointer("/_links/webui")
            .and_then(Value::as_str)
            .and_then(|path| base_url.join(path.trim_start_matches('/')).ok())
            .map(String::from)
            .unwrap_or_default();

        Some(Self {
            id,
            title,
            space,
            url,
            body: storage_to_text(&raw),
            raw,
        })
    }
}

/// A page found by search that references a ticket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WikiMention {
    pub page_id: String,
    pub title: String,
    pub space: String,
    pub url: String,
    pub excerpt: String,
    /// Ticket key the page was matched against.
    pub ticket_key: String,
}

/// Strips storage-format tags and decodes the common entities.
#[must_use]
pub fn storage_to_text(storage: &str) -> String {
    let stripped = TAG_REGEX.replace_all(storage, " ");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
