use std::collections::VecDeque;
use tracing::{debug, info, instrument};

use super::RepositoryError;
use crate::github::{ApiError, GitHubApi};
use crate::resource::{Commit, Repository};

/// Lazy cursor over commit history, one API page at a time.
///
/// Pages are requested from a marker SHA; the marker itself is skipped and
/// the rest of the page is yielded in order. Once a page is drained the next
/// one is requested from the last yielded commit. The walk ends when a page
/// has nothing past its marker. A failed fetch leaves the cursor where it
/// was, so calling `next()` again retries the same page.
pub struct CommitWalk<'a, A> {
    api: &'a A,
    repository: &'a Repository,
    marker: String,
    last_yielded: Option<String>,
    page: VecDeque<Commit>,
    fetched: bool,
    yielded_since_fetch: bool,
    finished: bool,
}

impl<'a, A: GitHubApi> CommitWalk<'a, A> {
    pub fn new(api: &'a A, repository: &'a Repository, start_sha: &str) -> Self {
        Self {
            api,
            repository,
            marker: start_sha.to_string(),
            last_yielded: None,
            page: VecDeque::new(),
            fetched: false,
            yielded_since_fetch: false,
            finished: false,
        }
    }

    pub async fn next(&mut self) -> Result<Option<Commit>, ApiError> {
        loop {
            while let Some(commit) = self.page.pop_front() {
                if commit.sha == self.marker {
                    continue;
                }
                self.last_yielded = Some(commit.sha.clone());
                self.yielded_since_fetch = true;
                return Ok(Some(commit));
            }

            if self.fetched && !self.yielded_since_fetch {
                self.finished = true;
            }
            if self.finished {
                return Ok(None);
            }

            let marker = self
                .last_yielded
                .clone()
                .unwrap_or_else(|| self.marker.clone());
            debug!(marker = %marker, "requesting commit page");
            let page = self.api.commits(self.repository, &marker).await?;

            self.marker = marker;
            self.page = page.into();
            self.fetched = true;
            self.yielded_since_fetch = false;
        }
    }
}

/// Resolves references and commit ranges.
pub struct CommitRepository<'a, A> {
    api: &'a A,
}

impl<'a, A: GitHubApi> CommitRepository<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Resolve a reference (SHA, tag or branch) to its commit.
    #[instrument(skip(self), fields(repository = %repository))]
    pub async fn show(
        &self,
        repository: &Repository,
        reference: &str,
    ) -> Result<Commit, RepositoryError> {
        self.api
            .commit(repository, reference)
            .await?
            .ok_or_else(|| RepositoryError::ReferenceNotFound {
                repository: repository.to_string(),
                reference: reference.to_string(),
            })
    }

    /// Commits after `start_reference` up to and including `end_reference`.
    ///
    /// Without an end reference, or when the end is never reached, the walk
    /// runs until history is exhausted and returns everything it saw.
    #[instrument(skip(self), fields(repository = %repository))]
    pub async fn items(
        &self,
        repository: &Repository,
        start_reference: &str,
        end_reference: Option<&str>,
    ) -> Result<Vec<Commit>, RepositoryError> {
        let start = self.show(repository, start_reference).await?;
        let end_sha = match end_reference {
            Some(reference) => Some(self.show(repository, reference).await?.sha),
            None => None,
        };
        debug!(start = %start.sha, end = ?end_sha, "resolved references");

        let mut walk = CommitWalk::new(self.api, repository, &start.sha);
        let mut commits = Vec::new();
        let mut reached_end = false;

        while let Some(commit) = walk.next().await? {
            let is_end = end_sha.as_deref() == Some(commit.sha.as_str());
            commits.push(commit);
            if is_end {
                reached_end = true;
                break;
            }
        }

        if end_sha.is_some() && !reached_end {
            info!(commits = commits.len(), "end reference not reached, returning partial range");
        }

        Ok(commits)
    }
}
