//! GitHub pull request lookups.

use super::{CodeChangeSummary, FileChange, PullRequestRef, PullRequestSource, PullRequestState, ScmError};
use async_trait::async_trait;
use octocrab::models::issues::Issue;
use octocrab::models::repos::DiffEntry;
use octocrab::models::IssueState;
use octocrab::Octocrab;
use tracing::{debug, info, info_span, Instrument};

/// Results per page for pull request search.
const RESULTS_PER_PAGE: u8 = 100;

/// GitHub client authenticated with a personal token.
#[derive(Clone)]
pub struct GitHubClient {
    octocrab: Octocrab,
}

impl GitHubClient {
    /// Builds a client from a personal access token.
    ///
    /// # Errors
    ///
    /// Returns [`ScmError::GitHubError`] if the client cannot be built.
    pub fn new(token: String) -> Result<Self, ScmError> {
        let octocrab = Octocrab::builder().personal_token(token).build()?;
        Ok(Self { octocrab })
    }
}

#[async_trait]
impl PullRequestSource for GitHubClient {
    async fn search_pull_requests(&self, ticket_key: &str) -> Result<Vec<PullRequestRef>, ScmError> {
        let span = info_span!("pr_search", key = %ticket_key);

        async {
            let query = build_search_query(ticket_key);
            debug!(query = %query, "Searching pull requests");

            let page = self
                .octocrab
                .search()
                .issues_and_pull_requests(&query)
                .per_page(RESULTS_PER_PAGE)
                .send()
                .await?;

            let results: Vec<PullRequestRef> = page.items.iter().filter_map(to_pull_request).collect();
            info!(count = results.len(), "Pull request search complete");
            Ok(results)
        }
        .instrument(span)
        .await
    }

    async fn merged(&self, repository: &str, number: u64) -> Result<bool, ScmError> {
        let (owner, name) = split_repository(repository)?;
        let pull = self.octocrab.pulls(owner, name).get(number).await?;
        Ok(pull.merged_at.is_some())
    }

    async fn code_changes(&self, repository: &str, number: u64) -> Result<CodeChangeSummary, ScmError> {
        let (owner, name) = split_repository(repository)?;
        let first = self.octocrab.pulls(owner, name).list_files(number).await?;
        let entries = self.octocrab.all_pages::<DiffEntry>(first).await?;

        let summary = CodeChangeSummary::from_files(entries.into_iter().map(to_file_change).collect());
        info!(
            repo = %repository,
            number,
            files = summary.total_files,
            additions = summary.additions,
            deletions = summary.deletions,
            "Fetched code changes"
        );
        Ok(summary)
    }
}

/// Builds the search query for pull requests mentioning `ticket_key` in their title.
fn build_search_query(ticket_key: &str) -> String {
    format!("{ticket_key} in:title type:pr")
}

fn to_pull_request(item: &Issue) -> Option<PullRequestRef> {
    let repository = repository_from_api_url(item.repository_url.as_str())?;
    let state = match item.state {
        IssueState::Open => PullRequestState::Open,
        _ => PullRequestState::Closed,
    };

    Some(PullRequestRef {
        repository,
        number: item.number,
        title: item.title.clone(),
        state,
        author: item.user.login.clone(),
        url: item.html_url.to_string(),
        body: item.body.clone().unwrap_or_default(),
        code_changes: None,
    })
}

fn to_file_change(entry: DiffEntry) -> FileChange {
    let status = serde_json::to_value(&entry.status)
        .ok()
        .and_then(|value| value.as_str().map(str::to_owned))
        .unwrap_or_else(|| "modified".to_string());

    FileChange {
        filename: entry.filename,
        status,
        additions: entry.additions,
        deletions: entry.deletions,
        changes: entry.changes,
        patch: entry.patch.unwrap_or_default(),
    }
}

/// Extracts "owner/name" from `https://api.github.com/repos/{owner}/{name}`.
fn repository_from_api_url(url: &str) -> Option<String> {
    let rest = url.split("/repos/").nth(1)?;
    let mut parts = rest.trim_end_matches('/').split('/');
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let name = parts.next().filter(|s| !s.is_empty())?;
    Some(format!("{owner}/{name}"))
}

fn split_repository(repository: &str) -> Result<(&str, &str), ScmError> {
    repository
        .split_once('/')
        .filter(|(owner, name)| !owner.is_empty() && !name.is_empty())
        .ok_or_else(|| ScmError::InvalidRepository {
            name: repository.to_string(),
        })
}
