use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, instrument};

use super::{CommitRepository, RepositoryError};
use crate::github::GitHubApi;
use crate::resource::{PullRequest, Range, Repository};

static MERGE_COMMIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Merge pull request #(?P<number>\d+) from").expect("Invalid merge commit regex")
});

static SQUASH_COMMIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(#(?P<number>\d+)\)\s*$").expect("Invalid squash commit regex")
});

/// Number of the pull request a commit was merged from, if its message says so.
///
/// Recognizes GitHub's merge commit subject ("Merge pull request #12 from ...")
/// and squash merges, whose subject line ends in "(#12)".
pub fn pull_request_number(message: &str) -> Option<u64> {
    let subject = message.lines().next().unwrap_or_default();

    MERGE_COMMIT_RE
        .captures(subject)
        .or_else(|| SQUASH_COMMIT_RE.captures(subject))
        .and_then(|captures| captures["number"].parse().ok())
}

/// Looks up pull requests, individually or by the commit range they were merged in.
pub struct PullRequestRepository<'a, A> {
    api: &'a A,
    commits: CommitRepository<'a, A>,
}

impl<'a, A: GitHubApi> PullRequestRepository<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            commits: CommitRepository::new(api),
        }
    }

    #[instrument(skip(self), fields(repository = %repository))]
    pub async fn show(
        &self,
        repository: &Repository,
        number: u64,
    ) -> Result<PullRequest, RepositoryError> {
        self.api
            .pull_request(repository, number)
            .await?
            .ok_or_else(|| RepositoryError::PullRequestNotFound {
                repository: repository.to_string(),
                number,
            })
    }

    /// Pull requests merged after `start_reference`, up to and including
    /// `end_reference` when given. Each pull request appears once, in the
    /// order its commit was walked. Numbers that do not resolve to a pull
    /// request (e.g. an issue referenced as "(#N)") are skipped.
    #[instrument(skip(self), fields(repository = %repository))]
    pub async fn items(
        &self,
        repository: &Repository,
        start_reference: &str,
        end_reference: Option<&str>,
    ) -> Result<Range, RepositoryError> {
        let commits = self
            .commits
            .items(repository, start_reference, end_reference)
            .await?;
        debug!(commits = commits.len(), "resolved commit range");

        let numbers: Vec<u64> = {
            let mut seen = HashSet::new();
            commits
                .iter()
                .filter_map(|commit| pull_request_number(&commit.message))
                .filter(|number| seen.insert(*number))
                .collect()
        };

        let mut range = Range::new(commits);
        for number in numbers {
            let pull_request = match self.show(repository, number).await {
                Ok(pull_request) => pull_request,
                Err(RepositoryError::PullRequestNotFound { .. }) => {
                    debug!(number, "no pull request with this number, skipping");
                    continue;
                }
                Err(err) => return Err(err),
            };
            debug!(number, title = %pull_request.title, "found pull request");
            range = range.with_pull_request(pull_request);
        }

        Ok(range)
    }
}
