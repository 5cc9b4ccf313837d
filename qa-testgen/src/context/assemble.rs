//! Prompt context assembly.

use super::format::{format_code_changes, truncate_chars, SectionWriter};
use super::{ContextLimits, TicketEnrichment};
use crate::tracker::Ticket;

/// Placeholder used when a ticket has no acceptance criteria.
pub const NO_ACCEPTANCE_CRITERIA: &str = "No acceptance criteria provided";

/// Kinds of context sections, in the order they appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Base,
    PullRequest,
    Parent,
    Siblings,
    Wiki,
    Comments,
    Attachments,
}

/// One rendered section of the context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub text: String,
}

/// The ordered, bounded context handed to the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedContext {
    sections: Vec<Section>,
}

impl AggregatedContext {
    /// Returns all sections in order.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Returns the first section of `kind`, if present.
    #[must_use]
    pub fn section(&self, kind: SectionKind) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.kind == kind)
            .map(|s| s.text.as_str())
    }

    /// Concatenates every section.
    #[must_use]
    pub fn text(&self) -> String {
        self.sections.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Builds the context for `ticket` from its gathered enrichment.
#[must_use]
pub fn assemble(
    ticket: &Ticket,
    enrichment: &TicketEnrichment,
    limits: &ContextLimits,
) -> AggregatedContext {
    let mut sections = vec![Section {
        kind: SectionKind::Base,
        text: base_section(ticket),
    }];

    for pr in &enrichment.pull_requests {
        if pr.body.is_empty() && pr.code_changes.is_none() {
            continue;
        }
        let code = pr
            .code_changes
            .as_ref()
            .map(|changes| format_code_changes(changes, limits.code_changes, limits.patch))
            .unwrap_or_default();

        let mut text = format!(
            "\n\nPULL REQUEST CONTEXT FROM {} - PR #{}:\nTitle: {}\nState: {}\nAuthor: {}",
            pr.repository,
            pr.number,
            pr.title,
            pr.state.as_str(),
            pr.author
        );
        if !pr.body.is_empty() {
            text.push_str("\nDescription:\n");
            text.push_str(&pr.body);
        }
        if !code.is_empty() {
            text.push('\n');
            text.push_str(&code);
        }
        sections.push(Section {
            kind: SectionKind::PullRequest,
            text,
        });
    }

    let bounded = [
        (SectionKind::Parent, parent_section(enrichment, limits)),
        (SectionKind::Siblings, sibling_section(ticket, enrichment, limits)),
        (SectionKind::Wiki, wiki_section(ticket, enrichment, limits)),
        (SectionKind::Comments, comment_section(enrichment, limits)),
        (SectionKind::Attachments, attachment_section(enrichment, limits)),
    ];
    sections.extend(
        bounded
            .into_iter()
            .filter_map(|(kind, text)| text.map(|text| Section { kind, text })),
    );

    AggregatedContext { sections }
}

fn base_section(ticket: &Ticket) -> String {
    format!(
        "TICKET: {}\nSUMMARY: {}\n\nDESCRIPTION:\n{}\n\nACCEPTANCE CRITERIA:\n{}",
        ticket.key,
        ticket.summary,
        ticket.description,
        ticket
            .acceptance_criteria
            .as_deref()
            .unwrap_or(NO_ACCEPTANCE_CRITERIA)
    )
}

fn parent_section(enrichment: &TicketEnrichment, limits: &ContextLimits) -> Option<String> {
    let parent = enrichment.parent.as_ref()?;
    let mut writer = SectionWriter::new(limits.section);
    writer.push(&format!(
        "\n\nPARENT TICKET CONTEXT ({}):\nSummary: {}",
        parent.key, parent.summary
    ));
    writer.push(&format!("\nDescription:\n{}", parent.description));
    writer.push(&format!(
        "\nAcceptance Criteria:\n{}",
        parent
            .acceptance_criteria
            .as_deref()
            .unwrap_or(NO_ACCEPTANCE_CRITERIA)
    ));
    Some(writer.finish())
}

fn sibling_section(
    ticket: &Ticket,
    enrichment: &TicketEnrichment,
    limits: &ContextLimits,
) -> Option<String> {
    if enrichment.siblings.is_empty() {
        return None;
    }

    let parent_key = ticket.parent.as_ref().map_or("the same parent", |p| p.key.as_str());
    let mut writer = SectionWriter::new(limits.section);
    writer.push(&format!(
        "\n\nRELATED TICKETS UNDER {parent_key} (context only, do not write test cases for these):"
    ));
    for sibling in &enrichment.siblings {
        let mut entry = format!(
            "\n- {}: {} [{}]\n  Description: {}",
            sibling.key,
            sibling.summary,
            sibling.status,
            truncate_chars(&sibling.description, limits.sibling_description)
        );
        if let Some(criteria) = &sibling.acceptance_criteria {
            entry.push_str("\n  Acceptance Criteria: ");
            entry.push_str(&truncate_chars(criteria, limits.sibling_acceptance_criteria));
        }
        if !writer.push(&entry) {
            break;
        }
    }
    Some(writer.finish())
}

fn wiki_section(
    ticket: &Ticket,
    enrichment: &TicketEnrichment,
    limits: &ContextLimits,
) -> Option<String> {
    if enrichment.wiki_pages.is_empty() && enrichment.wiki_mentions.is_empty() {
        return None;
    }

    let mut writer = SectionWriter::new(limits.section);
    let mut seen: Vec<&str> = Vec::new();

    if !enrichment.wiki_pages.is_empty() {
        writer.push("\n\nLINKED WIKI PAGES:");
        for page in &enrichment.wiki_pages {
            if seen.contains(&page.id.as_str()) {
                continue;
            }
            seen.push(&page.id);
            let entry = format!(
                "\n\n[{}] {} ({})\n{}",
                page.space,
                page.title,
                page.url,
                truncate_chars(&page.body, limits.wiki_page)
            );
            if !writer.push(&entry) {
                return Some(writer.finish());
            }
        }
    }

    let mentions: Vec<_> = enrichment
        .wiki_mentions
        .iter()
        .filter(|m| !seen.contains(&m.page_id.as_str()))
        .collect();
    if !mentions.is_empty() {
        writer.push(&format!("\n\nWIKI PAGES MENTIONING {}:", ticket.key));
        for mention in mentions {
            if seen.contains(&mention.page_id.as_str()) {
                continue;
            }
            seen.push(&mention.page_id);
            let entry = format!(
                "\n- [{}] {} ({})\n  {}",
                mention.space,
                mention.title,
                mention.url,
                truncate_chars(&mention.excerpt, limits.wiki_excerpt)
            );
            if !writer.push(&entry) {
                break;
            }
        }
    }

    Some(writer.finish())
}

fn comment_section(enrichment: &TicketEnrichment, limits: &ContextLimits) -> Option<String> {
    if enrichment.comments.is_empty() {
        return None;
    }

    let mut writer = SectionWriter::new(limits.section);
    writer.push("\n\nRECENT COMMENTS:");
    for comment in &enrichment.comments {
        let entry = format!("\n- {} ({}): {}", comment.author, comment.created, comment.body);
        if !writer.push(&entry) {
            break;
        }
    }
    Some(writer.finish())
}

fn attachment_section(enrichment: &TicketEnrichment, limits: &ContextLimits) -> Option<String> {
    if enrichment.attachments.is_empty() {
        return None;
    }

    let mut writer = SectionWriter::new(limits.section);
    writer.push("\n\nATTACHMENTS:");
    for attachment in &enrichment.attachments {
        let entry = format!(
            "\n- {} ({}, {} bytes) uploaded by {} at {}",
            attachment.filename,
            attachment.mime_type,
            attachment.size,
            attachment.author,
            attachment.created
        );
        if !writer.push(&entry) {
            break;
        }
    }
    Some(writer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{Attachment, Comment, ParentRef};
    use crate::wiki::{WikiMention, WikiPage};

    fn ticket(key: &str, description: &str, criteria: Option<&str>) -> Ticket {
        Ticket {
            key: key.to_string(),
            summary: format!("Summary of {key}"),
            description: description.to_string(),
            status: "In Progress".to_string(),
            assignee: None,
            acceptance_criteria: criteria.map(str::to_string),
            created: "2024-01-01T00:00:00.000+0000".to_string(),
            updated: "2024-01-02T00:00:00.000+0000".to_string(),
            parent: None,
        }
    }

    fn wiki_page(id: &str, body: &str) -> WikiPage {
        WikiPage {
            id: id.to_string(),
            title: format!("Page {id}"),
            space: "ENG".to_string(),
            url: format!("https://acme.atlassian.net/wiki/spaces/ENG/pages/{id}"),
            body: body.to_string(),
            raw: String::new(),
        }
    }

    #[test]
    fn base_section_uses_placeholder_without_criteria() {
        let context = assemble(
            &ticket("ABC-2", "Some work", None),
            &TicketEnrichment::default(),
            &ContextLimits::default(),
        );

        assert_eq!(
            context.text(),
            "TICKET: ABC-2\nSUMMARY: Summary of ABC-2\n\nDESCRIPTION:\nSome work\n\n\
             ACCEPTANCE CRITERIA:\nNo acceptance criteria provided"
        );
        assert_eq!(context.sections().len(), 1);
    }

    #[test]
    fn wiki_page_found_twice_appears_once() {
        let enrichment = TicketEnrichment {
            wiki_pages: vec![wiki_page("77", "UNIQUE-BODY-TEXT")],
            wiki_mentions: vec![WikiMention {
                page_id: "77".to_string(),
                title: "Page 77".to_string(),
                space: "ENG".to_string(),
                url: String::new(),
                excerpt: "UNIQUE-BODY-TEXT".to_string(),
                ticket_key: "ABC-1".to_string(),
            }],
            ..TicketEnrichment::default()
        };

        let context = assemble(
            &ticket("ABC-1", "desc", None),
            &enrichment,
            &ContextLimits::default(),
        );
        let text = context.text();

        assert_eq!(text.matches("UNIQUE-BODY-TEXT").count(), 1);
        assert!(!text.contains("WIKI PAGES MENTIONING"));
    }

    #[test]
    fn siblings_are_cut_to_short_excerpts() {
        let mut primary = ticket("ABC-1", "desc", None);
        primary.parent = Some(ParentRef {
            key: "ABC-0".to_string(),
            summary: "Epic".to_string(),
        });
        let sibling = ticket("ABC-3", &"d".repeat(1000), Some(&"c".repeat(1000)));
        let enrichment = TicketEnrichment {
            siblings: vec![sibling],
            ..TicketEnrichment::default()
        };

        let context = assemble(&primary, &enrichment, &ContextLimits::default());
        let section = context.section(SectionKind::Siblings).unwrap();

        assert!(section.contains("RELATED TICKETS UNDER ABC-0 (context only"));
        assert!(section.contains(&format!("Description: {}...", "d".repeat(300))));
        assert!(section.contains(&format!("Acceptance Criteria: {}...", "c".repeat(200))));
        assert!(!section.contains(&"d".repeat(301)));
    }

    #[test]
    fn oversized_section_is_truncated_without_aborting() {
        let limits = ContextLimits {
            section: 120,
            ..ContextLimits::default()
        };
        let enrichment = TicketEnrichment {
            comments: (0..20)
                .map(|i| Comment {
                    author: "qa".to_string(),
                    created: "2024-01-01".to_string(),
                    body: format!("comment number {i}"),
                })
                .collect(),
            attachments: Vec::new(),
            ..TicketEnrichment::default()
        };

        let context = assemble(&ticket("ABC-1", "desc", None), &enrichment, &limits);
        let comments = context.section(SectionKind::Comments).unwrap();

        assert!(comments.chars().count() <= 120);
        assert!(comments.ends_with("... (truncated)"));
        assert!(comments.contains("comment number 0"));
    }

    #[test]
    fn attachment_entries_carry_upload_time() {
        let enrichment = TicketEnrichment {
            attachments: vec![Attachment {
                filename: "screen.png".to_string(),
                size: 10,
                mime_type: "image/png".to_string(),
                author: "Kim".to_string(),
                created: "2024-02-01T10:00:00".to_string(),
            }],
            ..TicketEnrichment::default()
        };

        let context = assemble(
            &ticket("ABC-1", "desc", None),
            &enrichment,
            &ContextLimits::default(),
        );
        let section = context.section(SectionKind::Attachments).unwrap();

        assert_eq!(
            section,
            "\n\nATTACHMENTS:\n- screen.png (image/png, 10 bytes) uploaded by Kim at 2024-02-01T10:00:00"
        );
    }
}
