//! Context limits and enrichment toggles.

use serde::Deserialize;

/// Char budgets applied while assembling context, read from `[context]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ContextLimits {
    /// Budget for one pull request's code change summary.
    pub code_changes: usize,
    /// Cap for a single file patch.
    pub patch: usize,
    /// Budget for each bounded section (parent, siblings, wiki, comments, attachments).
    pub section: usize,
    pub sibling_description: usize,
    pub sibling_acceptance_criteria: usize,
    /// Cap for each directly linked wiki page body.
    pub wiki_page: usize,
    /// Cap for each wiki mention excerpt.
    pub wiki_excerpt: usize,
    /// Number of recent comments fetched.
    pub comments: usize,
}

impl Default for ContextLimits {
    fn default() -> Self {
        Self {
            code_changes: 8000,
            patch: 2000,
            section: 6000,
            sibling_description: 300,
            sibling_acceptance_criteria: 200,
            wiki_page: 2000,
            wiki_excerpt: 800,
            comments: 10,
        }
    }
}

/// Which optional enrichment stages run.
///
/// Pull request and wiki lookups additionally need their client to be
/// configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichmentOptions {
    pub parent_context: bool,
    pub wiki: bool,
    pub comments: bool,
    pub attachments: bool,
}

impl Default for EnrichmentOptions {
    fn default() -> Self {
        Self {
            parent_context: true,
            wiki: true,
            comments: true,
            attachments: true,
        }
    }
}
