//! Source-control context: pull requests that reference a ticket.
//!
//! Search hits are grouped per repository and reduced to a single pull
//! request each: the lowest-numbered one that was not declined.

mod error;
mod github;
mod pull_request;

pub use error::ScmError;
pub use github::GitHubClient;
pub use pull_request::{CodeChangeSummary, FileChange, PullRequestRef, PullRequestState};

use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Read access to the source-control host.
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// Finds pull requests whose title references `ticket_key`.
    async fn search_pull_requests(&self, ticket_key: &str) -> Result<Vec<PullRequestRef>, ScmError>;

    /// Returns whether the pull request was merged.
    async fn merged(&self, repository: &str, number: u64) -> Result<bool, ScmError>;

    /// Fetches the per-file diff of a pull request.
    async fn code_changes(&self, repository: &str, number: u64) -> Result<CodeChangeSummary, ScmError>;
}

/// Selects one pull request per repository.
///
/// Candidates are walked in ascending number order per repository. A closed
/// pull request without a merge is declined and skipped; the first remaining
/// one is kept and later numbers never replace it. When the merge lookup
/// fails the pull request is kept as closed.
pub async fn select_pull_requests(
    source: &dyn PullRequestSource,
    candidates: Vec<PullRequestRef>,
) -> Vec<PullRequestRef> {
    let mut groups: Vec<(String, Vec<PullRequestRef>)> = Vec::new();
    for candidate in candidates {
        match groups.iter_mut().find(|(repo, _)| *repo == candidate.repository) {
            Some((_, prs)) => prs.push(candidate),
            None => groups.push((candidate.repository.clone(), vec![candidate])),
        }
    }

    let mut selected = Vec::with_capacity(groups.len());
    for (repository, mut prs) in groups {
        prs.sort_by_key(|pr| pr.number);

        for mut pr in prs {
            if pr.state == PullRequestState::Closed {
                match source.merged(&repository, pr.number).await {
                    Ok(true) => pr.state = PullRequestState::Merged,
                    Ok(false) => {
                        debug!(repo = %repository, number = pr.number, "Skipping declined PR");
                        continue;
                    }
                    Err(e) => {
                        warn!(
                            repo = %repository,
                            number = pr.number,
                            error = %e,
                            "Failed to check merge status, keeping PR"
                        );
                    }
                }
            }

            info!(repo = %repository, number = pr.number, state = pr.state.as_str(), "Selected PR");
            selected.push(pr);
            break;
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct FakeHost {
        merged: HashSet<(String, u64)>,
        failing: HashSet<(String, u64)>,
        lookups: Mutex<Vec<u64>>,
    }

    impl FakeHost {
        fn new(merged: &[(&str, u64)]) -> Self {
            Self {
                merged: merged.iter().map(|(r, n)| ((*r).to_string(), *n)).collect(),
                failing: HashSet::new(),
                lookups: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PullRequestSource for FakeHost {
        async fn search_pull_requests(&self, _: &str) -> Result<Vec<PullRequestRef>, ScmError> {
            Ok(Vec::new())
        }

        async fn merged(&self, repository: &str, number: u64) -> Result<bool, ScmError> {
            self.lookups.lock().unwrap().push(number);
            let key = (repository.to_string(), number);
            if self.failing.contains(&key) {
                return Err(ScmError::InvalidRepository {
                    name: repository.to_string(),
                });
            }
            Ok(self.merged.contains(&key))
        }

        async fn code_changes(&self, _: &str, _: u64) -> Result<CodeChangeSummary, ScmError> {
            Ok(CodeChangeSummary::from_files(Vec::new()))
        }
    }

    fn pr(repository: &str, number: u64, state: PullRequestState) -> PullRequestRef {
        PullRequestRef {
            repository: repository.to_string(),
            number,
            title: format!("ABC-1 change #{number}"),
            state,
            author: "dev".to_string(),
            url: format!("https://github.com/{repository}/pull/{number}"),
            body: String::new(),
            code_changes: None,
        }
    }

    #[tokio::test]
    async fn selects_lowest_non_declined() {
        let host = FakeHost::new(&[("acme/web", 7)]);
        let candidates = vec![
            pr("acme/web", 12, PullRequestState::Open),
            pr("acme/web", 7, PullRequestState::Closed),
        ];

        let selected = select_pull_requests(&host, candidates).await;

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].number, 7);
        assert_eq!(selected[0].state, PullRequestState::Merged);
    }

    #[tokio::test]
    async fn declined_only_repository_selects_nothing() {
        let host = FakeHost::new(&[]);
        let selected =
            select_pull_requests(&host, vec![pr("acme/api", 3, PullRequestState::Closed)]).await;
        assert!(selected.is_empty());
    }

    #[tokio::test]
    async fn declined_lower_number_falls_through_to_next() {
        let host = FakeHost::new(&[]);
        let candidates = vec![
            pr("acme/web", 4, PullRequestState::Closed),
            pr("acme/web", 9, PullRequestState::Open),
            pr("acme/web", 15, PullRequestState::Open),
        ];

        let selected = select_pull_requests(&host, candidates).await;

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].number, 9);
        assert_eq!(*host.lookups.lock().unwrap(), vec![4]);
    }

    #[tokio::test]
    async fn keeps_one_per_repository_in_first_seen_order() {
        let host = FakeHost::new(&[]);
        let candidates = vec![
            pr("acme/web", 2, PullRequestState::Open),
            pr("acme/api", 5, PullRequestState::Open),
            pr("acme/web", 1, PullRequestState::Open),
        ];

        let selected = select_pull_requests(&host, candidates).await;
        let picked: Vec<(&str, u64)> = selected
            .iter()
            .map(|pr| (pr.repository.as_str(), pr.number))
            .collect();

        assert_eq!(picked, vec![("acme/web", 1), ("acme/api", 5)]);
    }

    #[tokio::test]
    async fn failed_merge_lookup_keeps_pr() {
        let mut host = FakeHost::new(&[]);
        host.failing.insert(("acme/web".to_string(), 3));

        let selected =
            select_pull_requests(&host, vec![pr("acme/web", 3, PullRequestState::Closed)]).await;

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].state, PullRequestState::Closed);
    }
}
