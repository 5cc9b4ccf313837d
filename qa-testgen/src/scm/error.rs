//! Source-control error types.

use thiserror::Error;

/// Errors that can occur during pull request lookups.
#[derive(Debug, Error)]
pub enum ScmError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHubError(#[from] octocrab::Error),

    /// Repository name not in "owner/name" form.
    #[error("Invalid repository name: {name}")]
    InvalidRepository { name: String },
}
