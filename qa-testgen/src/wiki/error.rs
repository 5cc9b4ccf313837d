//! Wiki error types.

use thiserror::Error;

/// Errors that can occur while talking to Confluence.
#[derive(Debug, Error)]
pub enum WikiError {
    /// Transport or decoding failure.
    #[error("Confluence request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response.
    #[error("Confluence {operation} failed with status {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// Endpoint could not be joined onto the base URL.
    #[error("Invalid Confluence URL: {0}")]
    Url(#[from] url::ParseError),

    /// Response did not describe a page.
    #[error("Confluence page {id} has no usable content")]
    MalformedPage { id: String },
}
