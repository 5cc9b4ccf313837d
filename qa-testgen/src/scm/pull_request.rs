//! Pull request types.

use serde::Serialize;

/// Lifecycle state of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestState {
    Open,
    /// Closed; merge status unknown or not merged.
    Closed,
    Merged,
}

impl PullRequestState {
    /// Returns the state as a lowercase string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Merged => "merged",
        }
    }
}

/// A pull request referencing a ticket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PullRequestRef {
    /// Repository in "owner/name" form.
    pub repository: String,
    pub number: u64,
    pub title: String,
    pub state: PullRequestState,
    pub author: String,
    pub url: String,
    /// Pull request description, empty when none.
    pub body: String,
    /// Diff summary, attached after selection.
    pub code_changes: Option<CodeChangeSummary>,
}

/// Per-file change of a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    pub filename: String,
    /// added, modified, removed, renamed...
    pub status: String,
    pub additions: u64,
    pub deletions: u64,
    pub changes: u64,
    /// Unified diff excerpt, empty for binary files.
    pub patch: String,
}

/// Aggregated diff of a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeChangeSummary {
    pub total_files: usize,
    pub additions: u64,
    pub deletions: u64,
    pub changes: u64,
    /// Files in the order the hosting service returned them.
    pub files: Vec<FileChange>,
}

impl CodeChangeSummary {
    /// Builds a summary with totals computed from `files`.
    #[must_use]
    pub fn from_files(files: Vec<FileChange>) -> Self {
        Self {
            total_files: files.len(),
            additions: files.iter().map(|f| f.additions).sum(),
            deletions: files.iter().map(|f| f.deletions).sum(),
            changes: files.iter().map(|f| f.changes).sum(),
            files,
        }
    }
}
