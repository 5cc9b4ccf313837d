//! Ticket reference detection in wiki text.
//!
//! A bare ticket number is a weak signal: it only counts on pages using
//! tracker vocabulary, and never when it sits next to address or order words.

use regex::Regex;
use std::sync::LazyLock;

static PAGE_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:/spaces/[^/\s]+/pages/|pageId=)(\d+)").expect("page link regex should be valid")
});

static JIRA_MACRO_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<ac:structured-macro[^>]*ac:name="jira"[^>]*>(.*?)</ac:structured-macro>"#)
        .expect("jira macro regex should be valid")
});

/// Max chars between a bare number and a noise word for the number to count
/// as part of an address or order.
const NOISE_WINDOW: usize = 20;

static DOMAIN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(tickets?|jira|epics?|story|stories|projects?|development|sprints?|issues?)\b")
        .expect("domain keyword regex should be valid")
});

static NOISE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(invoice|account number|zip|street|address|order|phone|suite)\b")
        .expect("noise keyword regex should be valid")
});

/// Returns the page ids linked from `text`, first occurrence order.
#[must_use]
pub fn extract_page_links(text: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for captures in PAGE_LINK_REGEX.captures_iter(text) {
        let id = &captures[1];
        if !ids.iter().any(|known| known == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

/// Decides whether a page's title and body genuinely reference `ticket_key`.
#[must_use]
pub fn is_genuine_mention(ticket_key: &str, title: &str, body: &str) -> bool {
    let text = format!("{title}\n{body}");
    if contains_key(&text, ticket_key) || contains_browse_link(&text, ticket_key) {
        return true;
    }

    let Some(number) = ticket_number(ticket_key) else {
        return false;
    };
    let Ok(number_regex) = Regex::new(&format!(r"\b{}\b", regex::escape(number))) else {
        return false;
    };
    let has_clean_number = number_regex
        .find_iter(&text)
        .any(|found| !near_noise(&text, found.start(), found.end()));
    has_clean_number && DOMAIN_REGEX.is_match(&text)
}

/// Scans storage markup for Jira macros and smart links pointing at `ticket_key`.
#[must_use]
pub fn references_in_storage(ticket_key: &str, raw: &str) -> bool {
    let parameter = format!(">{ticket_key}<");
    let in_macro = JIRA_MACRO_REGEX
        .captures_iter(raw)
        .any(|captures| captures[1].contains(&parameter));
    in_macro || contains_browse_link(raw, ticket_key)
}

/// Cuts a window of at most `limit` chars from `body`, placed around the
/// first occurrence of `ticket_key` when there is one.
#[must_use]
pub fn mention_excerpt(body: &str, ticket_key: &str, limit: usize) -> String {
    let chars: Vec<char> = body.chars().collect();
    if chars.len() <= limit {
        return body.to_string();
    }

    let anchor = body
        .find(ticket_key)
        .map(|byte| body[..byte].chars().count())
        .unwrap_or(0);
    let start = anchor.saturating_sub(limit / 4).min(chars.len() - limit);
    chars[start..start + limit].iter().collect()
}

fn ticket_number(ticket_key: &str) -> Option<&str> {
    ticket_key
        .rsplit_once('-')
        .map(|(_, number)| number)
        .filter(|number| !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()))
}

fn contains_key(text: &str, ticket_key: &str) -> bool {
    matches_pattern(&format!(r"(?i)\b{}\b", regex::escape(ticket_key)), text)
}

fn contains_browse_link(text: &str, ticket_key: &str) -> bool {
    matches_pattern(&format!(r"/browse/{}\b", regex::escape(ticket_key)), text)
}

/// Whether a noise word lies within [`NOISE_WINDOW`] chars of `start..end`.
fn near_noise(text: &str, start: usize, end: usize) -> bool {
    NOISE_REGEX.find_iter(text).any(|noise| {
        let gap = if noise.end() <= start {
            text[noise.end()..start].chars().count()
        } else if noise.start() >= end {
            text[end..noise.start()].chars().count()
        } else {
            0
        };
        gap <= NOISE_WINDOW
    })
}

fn matches_pattern(pattern: &str, text: &str) -> bool {
    Regex::new(pattern).map(|re| re.is_match(text)).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_both_link_shapes_once() {
        let text = "See https://acme.atlassian.net/wiki/spaces/ENG/pages/123/Design \
                    and /pages/viewpage.action?pageId=456, also pageId=123.";
        assert_eq!(extract_page_links(text), vec!["123", "456"]);
    }

    #[test]
    fn no_links_yields_empty() {
        assert!(extract_page_links("nothing to see").is_empty());
    }

    #[test]
    fn street_address_number_is_excluded() {
        assert!(!is_genuine_mention(
            "ABC-1",
            "Office locations",
            "Visit us at 1 Main Street, Suite 200"
        ));
    }

    #[test]
    fn address_noise_beats_domain_keyword() {
        assert!(!is_genuine_mention(
            "ABC-1",
            "Project office",
            "The project team moved to 1 Main Street"
        ));
    }

    #[test]
    fn noise_word_away_from_number_is_ignored() {
        assert!(is_genuine_mention(
            "ABC-42",
            "Sprint 7 planning",
            "Story 42 is the jira ticket we must address first"
        ));
    }

    #[test]
    fn noise_words_need_whole_word_match() {
        assert!(is_genuine_mention(
            "ABC-42",
            "Sprint notes",
            "Item 42 covers the orders export and zipped reports"
        ));
    }

    #[test]
    fn number_next_to_order_word_is_excluded() {
        assert!(!is_genuine_mention(
            "ABC-42",
            "Sprint invoices",
            "Order 42 was refunded"
        ));
    }

    #[test]
    fn literal_key_with_jira_is_included() {
        assert!(is_genuine_mention(
            "ABC-1",
            "Release notes",
            "Tracked in jira as ABC-1"
        ));
    }

    #[test]
    fn bare_number_needs_domain_keyword() {
        assert!(is_genuine_mention("ABC-1", "Sprint review", "Item 1 shipped"));
        assert!(!is_genuine_mention("ABC-7", "Recipes", "Step 7: bake"));
    }

    #[test]
    fn longer_key_does_not_match() {
        assert!(!is_genuine_mention("ABC-1", "Notes", "Fixed in ABC-12"));
    }

    #[test]
    fn browse_link_counts_as_mention() {
        assert!(is_genuine_mention(
            "ABC-1",
            "Links",
            "https://acme.atlassian.net/browse/ABC-1"
        ));
    }

    #[test]
    fn storage_scan_finds_macro_and_smart_link() {
        let macro_markup = r#"<ac:structured-macro ac:name="jira" ac:schema-version="1"><ac:parameter ac:name="key">ABC-1</ac:parameter></ac:structured-macro>"#;
        assert!(references_in_storage("ABC-1", macro_markup));
        assert!(!references_in_storage("ABC-2", macro_markup));

        let link = r#"<a href="https://acme.atlassian.net/browse/ABC-1">ticket</a>"#;
        assert!(references_in_storage("ABC-1", link));
        assert!(!references_in_storage(
            "ABC-1",
            r#"<a href="https://acme.atlassian.net/browse/ABC-10">x</a>"#
        ));
    }

    #[test]
    fn excerpt_is_bounded_and_centered_on_key() {
        let body = format!("{} ABC-1 {}", "x".repeat(1000), "y".repeat(1000));
        let excerpt = mention_excerpt(&body, "ABC-1", 100);

        assert_eq!(excerpt.chars().count(), 100);
        assert!(excerpt.contains("ABC-1"));
    }

    #[test]
    fn short_body_is_kept_whole() {
        assert_eq!(mention_excerpt("tiny ABC-1", "ABC-1", 800), "tiny ABC-1");
    }
}
