//! Tracker error types.

use thiserror::Error;

/// Errors that can occur while talking to the issue tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Transport or decoding error.
    #[error("Jira HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The tracker answered with an unexpected status.
    #[error("Jira {operation} failed with status {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// Invalid endpoint URL.
    #[error("Invalid Jira URL: {0}")]
    Url(#[from] url::ParseError),

    /// The requested issue does not exist or could not be parsed.
    #[error("Issue {key} not found")]
    NotFound { key: String },
}
