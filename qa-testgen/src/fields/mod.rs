//! Custom field discovery.
//!
//! Acceptance criteria and generated test cases live in custom fields whose
//! ids differ per Jira site. They are resolved once at startup into a
//! [`ResolvedFields`] value that is passed by reference to every component
//! that needs it.

mod prompt;

pub use prompt::{FieldPrompt, NoPrompt, StdinPrompt};

use crate::tracker::{FieldInfo, TicketSource};
use serde::Serialize;
use tracing::{info, warn};

/// Base fields requested on every issue read.
const BASE_FIELDS: [&str; 7] = [
    "summary",
    "description",
    "status",
    "assignee",
    "created",
    "updated",
    "parent",
];

/// Synonyms at or below this length must match a whole word.
const WHOLE_WORD_MAX_LEN: usize = 3;

/// Semantic field being looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTarget {
    /// Field holding the ticket's acceptance criteria.
    AcceptanceCriteria,
    /// Field that receives generated test cases.
    TestCases,
}

impl FieldTarget {
    /// Case-insensitive name fragments identifying the field.
    #[must_use]
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            Self::AcceptanceCriteria => &[
                "acceptance criteria",
                "acceptancecriteria",
                "acceptance_criteria",
                "ac",
                "criteria",
                "definition of done",
                "dod",
            ],
            Self::TestCases => &[
                "test cases",
                "testcases",
                "test_cases",
                "qa test",
                "test scenarios",
            ],
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::AcceptanceCriteria => "Acceptance Criteria",
            Self::TestCases => "Test Cases",
        }
    }
}

/// Operator-provided field ids that bypass discovery.
#[derive(Debug, Clone, Default)]
pub struct FieldOverrides {
    pub acceptance_criteria: Option<String>,
    pub test_cases: Option<String>,
    /// Field to read the description from instead of `description`.
    pub description: Option<String>,
}

impl FieldOverrides {
    fn get(&self, target: FieldTarget) -> Option<&str> {
        match target {
            FieldTarget::AcceptanceCriteria => self.acceptance_criteria.as_deref(),
            FieldTarget::TestCases => self.test_cases.as_deref(),
        }
    }
}

/// Field ids resolved for the current run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedFields {
    /// Acceptance criteria field, if found.
    pub acceptance_criteria: Option<String>,
    /// Test case write-back field, if found.
    pub test_cases: Option<String>,
    /// Description override field.
    pub description: Option<String>,
}

impl ResolvedFields {
    /// Returns the field the description is read from.
    #[must_use]
    pub fn description_field(&self) -> &str {
        self.description.as_deref().unwrap_or("description")
    }

    /// Returns the field list requested for issue reads.
    #[must_use]
    pub fn search_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = BASE_FIELDS.iter().map(|f| (*f).to_string()).collect();
        for extra in [self.description.as_ref(), self.acceptance_criteria.as_ref()]
            .into_iter()
            .flatten()
        {
            if !fields.contains(extra) {
                fields.push(extra.clone());
            }
        }
        fields
    }
}

/// Resolves every field the run needs.
///
/// The field catalog is fetched at most once, and only when a target has no
/// override. Never fails: unresolved fields are `None`.
pub async fn resolve_fields(
    source: &dyn TicketSource,
    overrides: &FieldOverrides,
    prompt: &dyn FieldPrompt,
) -> ResolvedFields {
    let targets = [FieldTarget::AcceptanceCriteria, FieldTarget::TestCases];
    let catalog = if targets.iter().all(|t| overrides.get(*t).is_some()) {
        Vec::new()
    } else {
        match source.field_catalog().await {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(error = %e, "Failed to fetch field catalog");
                Vec::new()
            }
        }
    };

    let mut resolved = ResolvedFields {
        description: overrides.description.clone(),
        ..ResolvedFields::default()
    };
    for target in targets {
        let id = resolve_one(target, overrides, &catalog, prompt);
        match target {
            FieldTarget::AcceptanceCriteria => resolved.acceptance_criteria = id,
            FieldTarget::TestCases => resolved.test_cases = id,
        }
    }
    resolved
}

fn resolve_one(
    target: FieldTarget,
    overrides: &FieldOverrides,
    catalog: &[FieldInfo],
    prompt: &dyn FieldPrompt,
) -> Option<String> {
    if let Some(id) = overrides.get(target) {
        info!(field = target.label(), id = %id, "Using configured field");
        return Some(id.to_string());
    }

    if let Some(field) = match_field(catalog, target) {
        info!(field = target.label(), id = %field.id, name = %field.name, "Discovered field");
        return Some(field.id.clone());
    }

    let custom: Vec<FieldInfo> = catalog.iter().filter(|f| f.custom).cloned().collect();
    let chosen = prompt.ask(target, &custom);
    if chosen.is_none() {
        warn!(field = target.label(), "Field not found; dependent stage will be skipped");
    }
    chosen
}

/// Returns the first catalog field whose name matches a synonym of `target`.
#[must_use]
pub fn match_field(catalog: &[FieldInfo], target: FieldTarget) -> Option<&FieldInfo> {
    catalog.iter().find(|field| {
        let name = field.name.to_lowercase();
        target
            .synonyms()
            .iter()
            .any(|synonym| name_matches(&name, synonym))
    })
}

fn name_matches(name: &str, synonym: &str) -> bool {
    if synonym.len() <= WHOLE_WORD_MAX_LEN {
        name.split(|c: char| !c.is_alphanumeric())
            .any(|word| word == synonym)
    } else {
        name.contains(synonym)
    }
}
