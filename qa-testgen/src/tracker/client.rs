//! Jira Cloud REST v3 client.

use super::{Attachment, Comment, FieldInfo, Ticket, TicketSource, TrackerError};
use crate::adf::Node;
use crate::fields::ResolvedFields;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, info};
use url::Url;

/// Maximum issues returned by a single search.
const MAX_SEARCH_RESULTS: u32 = 100;

/// Longest error body kept in [`TrackerError::Status`].
const ERROR_BODY_LIMIT: usize = 200;

/// Authenticated Jira client.
#[derive(Debug, Clone)]
pub struct JiraClient {
    http: Client,
    base_url: Url,
    email: String,
    api_token: String,
}

impl JiraClient {
    /// Creates a client for the Jira site at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: Url, email: String, api_token: String) -> Result<Self, TrackerError> {
        let http = Client::builder()
            .user_agent(concat!("qa-testgen/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: crate::config::with_trailing_slash(base_url),
            email,
            api_token,
        })
    }

    /// Returns the site base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> Result<RequestBuilder, TrackerError> {
        let url = self.base_url.join(path)?;
        Ok(self
            .http
            .request(method, url)
            .basic_auth(&self.email, Some(&self.api_token))
            .header(reqwest::header::ACCEPT, "application/json"))
    }

    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, &str)],
        operation: &'static str,
    ) -> Result<Value, TrackerError> {
        let response = self
            .request(reqwest::Method::GET, path)?
            .query(query)
            .send()
            .await?;
        Ok(ensure_success(response, operation).await?.json().await?)
    }
}

#[async_trait]
impl TicketSource for JiraClient {
    async fn field_catalog(&self) -> Result<Vec<FieldInfo>, TrackerError> {
        let value = self.get_json("rest/api/3/field", &[], "field listing").await?;
        Ok(value
            .as_array()
            .map(|fields| fields.iter().filter_map(FieldInfo::from_value).collect())
            .unwrap_or_default())
    }

    async fn search_tickets(
        &self,
        jql: &str,
        fields: &ResolvedFields,
    ) -> Result<Vec<Ticket>, TrackerError> {
        debug!(jql = %jql, "Searching issues");
        let payload = json!({
            "jql": jql,
            "fields": fields.search_fields(),
            "maxResults": MAX_SEARCH_RESULTS,
        });
        let response = self
            .request(reqwest::Method::POST, "rest/api/3/search/jql")?
            .json(&payload)
            .send()
            .await?;
        let value: Value = ensure_success(response, "issue search").await?.json().await?;

        let tickets: Vec<Ticket> = value
            .get("issues")
            .and_then(Value::as_array)
            .map(|issues| {
                issues
                    .iter()
                    .filter_map(|issue| Ticket::from_issue(issue, fields))
                    .collect()
            })
            .unwrap_or_default();
        info!(count = tickets.len(), "Issue search complete");
        Ok(tickets)
    }

    async fn get_ticket(&self, key: &str, fields: &ResolvedFields) -> Result<Ticket, TrackerError> {
        let field_list = fields.search_fields().join(",");
        let value = self
            .get_json(
                &format!("rest/api/3/issue/{key}"),
                &[("fields", field_list.as_str())],
                "issue read",
            )
            .await?;
        Ticket::from_issue(&value, fields).ok_or_else(|| TrackerError::NotFound {
            key: key.to_string(),
        })
    }

    async fn recent_comments(&self, key: &str, limit: usize) -> Result<Vec<Comment>, TrackerError> {
        let limit = limit.to_string();
        let value = self
            .get_json(
                &format!("rest/api/3/issue/{key}/comment"),
                &[("orderBy", "-created"), ("maxResults", limit.as_str())],
                "comment listing",
            )
            .await?;

        // Newest first on the wire; keep them chronological.
        let mut comments: Vec<Comment> = value
            .get("comments")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(Comment::from_value).collect())
            .unwrap_or_default();
        comments.reverse();
        Ok(comments)
    }

    async fn attachments(&self, key: &str) -> Result<Vec<Attachment>, TrackerError> {
        let value = self
            .get_json(
                &format!("rest/api/3/issue/{key}"),
                &[("fields", "attachment")],
                "attachment listing",
            )
            .await?;
        Ok(value
            .pointer("/fields/attachment")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Attachment::from_value).collect())
            .unwrap_or_default())
    }

    async fn update_rich_field(
        &self,
        key: &str,
        field_id: &str,
        document: &Node,
    ) -> Result<(), TrackerError> {
        let payload = json!({ "fields": { field_id: document.to_value() } });
        let response = self
            .request(reqwest::Method::PUT, &format!("rest/api/3/issue/{key}"))?
            .json(&payload)
            .send()
            .await?;

        // Jira answers a successful edit with an empty 204.
        if response.status() == StatusCode::NO_CONTENT {
            info!(key = %key, field = %field_id, "Field updated");
            return Ok(());
        }
        Err(status_error(response, "issue update").await)
    }
}

async fn ensure_success(response: Response, operation: &'static str) -> Result<Response, TrackerError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(status_error(response, operation).await)
    }
}

async fn status_error(response: Response, operation: &'static str) -> TrackerError {
    let status = response.status().as_u16();
    let body: String = response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(ERROR_BODY_LIMIT)
        .collect();
    TrackerError::Status {
        operation,
        status,
        body,
    }
}
