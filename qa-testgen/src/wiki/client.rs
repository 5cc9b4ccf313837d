//! Confluence REST client.

use super::{WikiError, WikiPage, WikiSource};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::debug;
use url::Url;

/// Longest error body kept in [`WikiError::Status`].
const ERROR_BODY_LIMIT: usize = 200;

/// Authenticated Confluence client.
///
/// Atlassian Cloud shares credentials between Jira and Confluence, so this
/// takes the same email and API token as the tracker client.
#[derive(Debug, Clone)]
pub struct ConfluenceClient {
    http: Client,
    base_url: Url,
    email: String,
    api_token: String,
}

impl ConfluenceClient {
    /// Creates a client for the wiki rooted at `base_url` (usually `https://{site}/wiki`).
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: Url, email: String, api_token: String) -> Result<Self, WikiError> {
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

    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, &str)],
        operation: &'static str,
    ) -> Result<Value, WikiError> {
        let url = self.base_url.join(path)?;
        let response = self
            .http
            .get(url)
            .basic_auth(&self.email, Some(&self.api_token))
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;
        Ok(ensure_success(response, operation).await?.json().await?)
    }
}

#[async_trait]
impl WikiSource for ConfluenceClient {
    async fn get_page(&self, id: &str) -> Result<WikiPage, WikiError> {
        let value = self
            .get_json(
                &format!("rest/api/content/{id}"),
                &[("expand", "body.storage,space")],
                "page read",
            )
            .await?;
        WikiPage::from_content(&value, &self.base_url)
            .ok_or_else(|| WikiError::MalformedPage { id: id.to_string() })
    }

    async fn search_pages(&self, cql: &str, limit: usize) -> Result<Vec<WikiPage>, WikiError> {
        debug!(cql = %cql, "Searching wiki");
        let limit = limit.to_string();
        let value = self
            .get_json(
                "rest/api/content/search",
                &[
                    ("cql", cql),
                    ("limit", limit.as_str()),
                    ("expand", "body.storage,space"),
                ],
                "page search",
            )
            .await?;

        Ok(value
            .get("results")
            .and_then(Value::as_array)
            .map(|results| {
                results
                    .iter()
                    .filter_map(|item| WikiPage::from_content(item, &self.base_url))
                    .collect()
            })
            .unwrap_or_default())
    }
}

async fn ensure_success(response: Response, operation: &'static str) -> Result<Response, WikiError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body: String = response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(ERROR_BODY_LIMIT)
        .collect();
    Err(WikiError::Status {
        operation,
        status,
        body,
    })
}
