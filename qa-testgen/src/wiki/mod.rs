//! Wiki context: pages linked from tickets and pages that mention them.

mod client;
mod error;
mod mention;
mod page;

pub use client::ConfluenceClient;
pub use error::WikiError;
pub use mention::{extract_page_links, is_genuine_mention, mention_excerpt, references_in_storage};
pub use page::{storage_to_text, WikiMention, WikiPage};

use async_trait::async_trait;
use tracing::{debug, warn};

/// Maximum pages inspected by one mention search.
pub const SEARCH_LIMIT: usize = 25;

/// Read access to the wiki.
#[async_trait]
pub trait WikiSource: Send + Sync {
    /// Reads one page by id.
    async fn get_page(&self, id: &str) -> Result<WikiPage, WikiError>;

    /// Runs a CQL search, returning at most `limit` pages.
    async fn search_pages(&self, cql: &str, limit: usize) -> Result<Vec<WikiPage>, WikiError>;
}

/// Builds the CQL query for pages whose title or text contains `ticket_key`.
#[must_use]
pub fn mention_query(ticket_key: &str) -> String {
    format!("type = page AND (text ~ \"{ticket_key}\" OR title ~ \"{ticket_key}\")")
}

/// Fetches each linked page. Pages that fail to load are logged and skipped.
pub async fn fetch_linked_pages(source: &dyn WikiSource, ids: &[String]) -> Vec<WikiPage> {
    let mut pages = Vec::with_capacity(ids.len());
    for id in ids {
        match source.get_page(id).await {
            Ok(page) => pages.push(page),
            Err(e) => warn!(page_id = %id, error = %e, "Failed to fetch linked wiki page"),
        }
    }
    pages
}

/// Searches for pages mentioning `ticket_key`.
///
/// Pages whose id is in `known_ids` are skipped, as are pages that fail the
/// false-positive filter. Each mention carries an excerpt of at most
/// `excerpt_limit` chars.
///
/// # Errors
///
/// Returns [`WikiError`] if the search request fails.
pub async fn find_mentions(
    source: &dyn WikiSource,
    ticket_key: &str,
    known_ids: &[String],
    excerpt_limit: usize,
) -> Result<Vec<WikiMention>, WikiError> {
    let candidates = source
        .search_pages(&mention_query(ticket_key), SEARCH_LIMIT)
        .await?;

    let mut mentions: Vec<WikiMention> = Vec::new();
    for page in candidates {
        if known_ids.contains(&page.id) || mentions.iter().any(|m| m.page_id == page.id) {
            continue;
        }
        if !is_genuine_mention(ticket_key, &page.title, &page.body)
            && !references_in_storage(ticket_key, &page.raw)
        {
            debug!(page_id = %page.id, title = %page.title, "Rejected wiki false positive");
            continue;
        }

        mentions.push(WikiMention {
            excerpt: mention_excerpt(&page.body, ticket_key, excerpt_limit),
            page_id: page.id,
            title: page.title,
            space: page.space,
            url: page.url,
            ticket_key: ticket_key.to_string(),
        });
    }
    Ok(mentions)
}
