//! Enrichment fetches for one ticket.

use super::{ContextLimits, EnrichmentOptions};
use crate::fields::ResolvedFields;
use crate::scm::{select_pull_requests, PullRequestRef, PullRequestSource};
use crate::tracker::{children_query, Attachment, Comment, Ticket, TicketSource};
use crate::wiki::{self, WikiMention, WikiPage, WikiSource};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Clients used while gathering. Optional sources disable their stage.
#[derive(Clone, Copy)]
pub struct Sources<'a> {
    pub tickets: &'a dyn TicketSource,
    pub pull_requests: Option<&'a dyn PullRequestSource>,
    pub wiki: Option<&'a dyn WikiSource>,
}

/// Auxiliary data attached to a ticket. Fields stay empty when their stage
/// was disabled or failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TicketEnrichment {
    pub pull_requests: Vec<PullRequestRef>,
    pub parent: Option<Ticket>,
    pub siblings: Vec<Ticket>,
    pub wiki_pages: Vec<WikiPage>,
    pub wiki_mentions: Vec<WikiMention>,
    pub comments: Vec<Comment>,
    pub attachments: Vec<Attachment>,
}

/// Runs every enabled enrichment stage for `ticket`, one request at a time.
///
/// Failures are logged and leave the matching field empty; this never fails.
pub async fn gather(
    sources: Sources<'_>,
    ticket: &Ticket,
    fields: &ResolvedFields,
    options: EnrichmentOptions,
    limits: &ContextLimits,
) -> TicketEnrichment {
    let mut enrichment = TicketEnrichment::default();

    if let Some(pulls) = sources.pull_requests {
        enrichment.pull_requests = gather_pull_requests(pulls, &ticket.key).await;
    }

    if options.parent_context {
        if let Some(parent) = &ticket.parent {
            match sources.tickets.get_ticket(&parent.key, fields).await {
                Ok(found) => enrichment.parent = Some(found),
                Err(e) => warn!(parent = %parent.key, error = %e, "Failed to fetch parent ticket"),
            }

            match sources
                .tickets
                .search_tickets(&children_query(&parent.key), fields)
                .await
            {
                Ok(children) => {
                    enrichment.siblings = children
                        .into_iter()
                        .filter(|child| child.key != ticket.key)
                        .collect();
                }
                Err(e) => warn!(parent = %parent.key, error = %e, "Failed to fetch sibling tickets"),
            }
        }
    }

    if options.wiki {
        if let Some(wiki_source) = sources.wiki {
            let ids = wiki::extract_page_links(&link_search_text(ticket, &enrichment));
            enrichment.wiki_pages = wiki::fetch_linked_pages(wiki_source, &ids).await;

            let known: Vec<String> = enrichment.wiki_pages.iter().map(|p| p.id.clone()).collect();
            match wiki::find_mentions(wiki_source, &ticket.key, &known, limits.wiki_excerpt).await {
                Ok(mentions) => enrichment.wiki_mentions = mentions,
                Err(e) => warn!(error = %e, "Wiki mention search failed"),
            }
        }
    }

    if options.comments {
        match sources.tickets.recent_comments(&ticket.key, limits.comments).await {
            Ok(comments) => enrichment.comments = comments,
            Err(e) => warn!(error = %e, "Failed to fetch comments"),
        }
    }

    if options.attachments {
        match sources.tickets.attachments(&ticket.key).await {
            Ok(attachments) => enrichment.attachments = attachments,
            Err(e) => warn!(error = %e, "Failed to fetch attachments"),
        }
    }

    info!(
        pull_requests = enrichment.pull_requests.len(),
        parent = enrichment.parent.is_some(),
        siblings = enrichment.siblings.len(),
        wiki_pages = enrichment.wiki_pages.len(),
        wiki_mentions = enrichment.wiki_mentions.len(),
        comments = enrichment.comments.len(),
        attachments = enrichment.attachments.len(),
        "Enrichment gathered"
    );
    enrichment
}

async fn gather_pull_requests(source: &dyn PullRequestSource, key: &str) -> Vec<PullRequestRef> {
    let candidates = match source.search_pull_requests(key).await {
        Ok(found) => found,
        Err(e) => {
            warn!(error = %e, "Pull request search failed");
            return Vec::new();
        }
    };
    if candidates.is_empty() {
        debug!("No pull requests reference this ticket");
        return Vec::new();
    }

    let mut selected = select_pull_requests(source, candidates).await;
    for pr in &mut selected {
        match source.code_changes(&pr.repository, pr.number).await {
            Ok(changes) => pr.code_changes = Some(changes),
            Err(e) => warn!(
                repo = %pr.repository,
                number = pr.number,
                error = %e,
                "Failed to fetch code changes"
            ),
        }
    }
    selected
}

/// Text scanned for wiki links: the ticket, its parent and its siblings.
fn link_search_text(ticket: &Ticket, enrichment: &TicketEnrichment) -> String {
    let mut text = String::new();
    let tickets = std::iter::once(ticket)
        .chain(enrichment.parent.as_ref())
        .chain(enrichment.siblings.iter());
    for item in tickets {
        text.push_str(&item.description);
        text.push('\n');
        if let Some(criteria) = &item.acceptance_criteria {
            text.push_str(criteria);
            text.push('\n');
        }
    }
    text
}
