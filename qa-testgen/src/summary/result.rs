//! Processing result types.

use serde::Serialize;

/// Result of processing a single ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProcessingResult {
    /// Test cases were generated and written to the tracker.
    Updated {
        /// Ticket key.
        key: String,
    },

    /// Context was gathered; generation is disabled for this run.
    Enriched {
        /// Ticket key.
        key: String,
    },

    /// Processing was skipped.
    Skipped {
        /// Ticket key.
        key: String,
        /// Reason for skipping.
        reason: String,
    },

    /// Generation or write-back failed.
    Failed {
        /// Ticket key.
        key: String,
        /// Error message.
        error: String,
    },
}

impl ProcessingResult {
    /// Returns the ticket key.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Updated { key }
            | Self::Enriched { key }
            | Self::Skipped { key, .. }
            | Self::Failed { key, .. } => key,
        }
    }
}
