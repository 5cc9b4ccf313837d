//! Issue tracker access.
//!
//! This module wraps the Jira endpoints the pipeline needs: issue search,
//! field catalog, issue reads, comments, attachments and rich-field updates.

mod client;
mod error;
mod ticket;

pub use client::JiraClient;
pub use error::TrackerError;
pub use ticket::{Attachment, Comment, FieldInfo, ParentRef, Ticket};

use crate::adf::Node;
use crate::fields::ResolvedFields;
use async_trait::async_trait;

/// Read/write access to the issue tracker.
#[async_trait]
pub trait TicketSource: Send + Sync {
    /// Lists every field known to the tracker.
    async fn field_catalog(&self) -> Result<Vec<FieldInfo>, TrackerError>;

    /// Runs a query-language search.
    async fn search_tickets(
        &self,
        jql: &str,
        fields: &ResolvedFields,
    ) -> Result<Vec<Ticket>, TrackerError>;

    /// Reads a single ticket by key.
    async fn get_ticket(&self, key: &str, fields: &ResolvedFields) -> Result<Ticket, TrackerError>;

    /// Returns up to `limit` most recent comments, oldest first.
    async fn recent_comments(&self, key: &str, limit: usize) -> Result<Vec<Comment>, TrackerError>;

    /// Returns attachment metadata.
    async fn attachments(&self, key: &str) -> Result<Vec<Attachment>, TrackerError>;

    /// Replaces a rich-text field with `document`.
    async fn update_rich_field(
        &self,
        key: &str,
        field_id: &str,
        document: &Node,
    ) -> Result<(), TrackerError>;
}

/// Builds the query listing every child of `parent_key`.
#[must_use]
pub fn children_query(parent_key: &str) -> String {
    format!("parent = \"{parent_key}\" ORDER BY key ASC")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_children_query() {
        assert_eq!(
            children_query("ABC-10"),
            "parent = \"ABC-10\" ORDER BY key ASC"
        );
    }
}
