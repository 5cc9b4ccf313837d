//! JSON snapshot of processed tickets.

use super::RunnerError;
use crate::context::TicketEnrichment;
use crate::tracker::Ticket;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// A ticket with everything gathered and generated for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedTicket {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub enrichment: TicketEnrichment,
    /// Generated markdown test cases.
    pub test_cases: Option<String>,
    /// Context the test cases were generated from.
    pub test_case_generation_context: Option<String>,
    /// Whether the test case field was written.
    pub test_cases_updated: bool,
}

impl ProcessedTicket {
    /// Wraps a ticket and its enrichment before generation.
    #[must_use]
    pub fn new(ticket: Ticket, enrichment: TicketEnrichment) -> Self {
        Self {
            ticket,
            enrichment,
            test_cases: None,
            test_case_generation_context: None,
            test_cases_updated: false,
        }
    }
}

/// Writes `tickets` as pretty-printed JSON to `path`.
///
/// # Errors
///
/// Returns [`RunnerError`] if serialization or the file write fails.
pub fn write_snapshot(path: &Path, tickets: &[ProcessedTicket]) -> Result<(), RunnerError> {
    let json = serde_json::to_string_pretty(tickets)?;
    std::fs::write(path, json).map_err(|source| RunnerError::Snapshot {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), count = tickets.len(), "Snapshot written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::TempDir;

    fn ticket() -> Ticket {
        Ticket {
            key: "ABC-1".to_string(),
            summary: "Checkout".to_string(),
            description: "WHAT: short text".to_string(),
            status: "In Progress".to_string(),
            assignee: Some("Dana".to_string()),
            acceptance_criteria: Some("must do X".to_string()),
            created: "2024-01-01".to_string(),
            updated: "2024-01-02".to_string(),
            parent: None,
        }
    }

    #[test]
    fn snapshot_flattens_ticket_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.json");
        let mut processed = ProcessedTicket::new(ticket(), TicketEnrichment::default());
        processed.test_cases = Some("### Test Case 1".to_string());
        processed.test_cases_updated = true;

        write_snapshot(&path, &[processed]).unwrap();

        let value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let entry = &value[0];
        assert_eq!(entry["key"], "ABC-1");
        assert_eq!(entry["acceptance_criteria"], "must do X");
        assert_eq!(entry["test_cases"], "### Test Case 1");
        assert_eq!(entry["test_cases_updated"], true);
        assert!(entry["enrichment"]["pull_requests"].as_array().unwrap().is_empty());
    }

    #[test]
    fn unwritable_path_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing-dir").join("out.json");

        let error = write_snapshot(&path, &[]).unwrap_err();
        assert!(matches!(error, RunnerError::Snapshot { .. }));
    }
}
