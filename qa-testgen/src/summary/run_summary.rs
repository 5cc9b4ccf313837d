//! Run summary types.

use super::result::ProcessingResult;

/// Summary of a complete run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of tickets returned by the query.
    pub tickets_found: usize,

    /// Number of tickets that went through enrichment.
    pub tickets_processed: usize,

    /// Number of tickets whose test case field was updated.
    pub tickets_updated: usize,

    /// Number of tickets skipped.
    pub tickets_skipped: usize,

    /// Number of tickets that failed generation or write-back.
    pub tickets_failed: usize,

    /// Whether this was a preview run.
    pub preview: bool,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(preview: bool) -> Self {
        Self {
            preview,
            ..Default::default()
        }
    }

    /// Updates the summary with a processing result.
    pub fn record_result(&mut self, result: &ProcessingResult) {
        self.tickets_processed += 1;
        match result {
            ProcessingResult::Updated { .. } => self.tickets_updated += 1,
            ProcessingResult::Enriched { .. } => {}
            ProcessingResult::Skipped { .. } => self.tickets_skipped += 1,
            ProcessingResult::Failed { .. } => self.tickets_failed += 1,
        }
    }

    /// Returns true if any ticket failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.tickets_failed > 0
    }

    /// Returns true if tickets were found and none failed.
    #[must_use]
    pub fn all_success(&self) -> bool {
        self.tickets_found > 0 && !self.has_failures()
    }
}
