//! In-memory `GitHubApi` over a linear commit history, paginated the way
//! the commits endpoint pages from a SHA.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{ApiError, GitHubApi};
use crate::resource::{Commit, PullRequest, Repository, User};

#[derive(Debug, Default)]
pub struct FakeGitHub {
    history: Vec<Commit>,
    tags: HashMap<String, String>,
    pull_requests: HashMap<u64, PullRequest>,
    page_size: usize,
    failure: Option<String>,
    requested_pages: Mutex<Vec<String>>,
}

impl FakeGitHub {
    /// History is listed in walk order: a page requested from a SHA starts
    /// at that commit and continues with the ones after it.
    pub fn new(history: Vec<Commit>, page_size: usize) -> Self {
        Self {
            history,
            page_size,
            ..Default::default()
        }
    }

    /// History of `count` commits with SHAs "c0".."c{count-1}".
    pub fn linear(count: usize, page_size: usize) -> Self {
        let history = (0..count)
            .map(|i| Commit::new(format!("c{}", i), format!("Commit {}", i)))
            .collect();
        Self::new(history, page_size)
    }

    pub fn with_tag(mut self, tag: &str, sha: &str) -> Self {
        self.tags.insert(tag.to_string(), sha.to_string());
        self
    }

    pub fn with_pull_request(mut self, id: u64, title: &str, author: &str) -> Self {
        self.pull_requests
            .insert(id, PullRequest::new(id, title, User::new(author)));
        self
    }

    /// Every call fails with a 500 carrying `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    /// SHAs that pages were requested from, in request order.
    pub fn requested_pages(&self) -> Vec<String> {
        self.requested_pages
            .lock()
            .map(|pages| pages.clone())
            .unwrap_or_default()
    }

    fn check_failure(&self) -> Result<(), ApiError> {
        match &self.failure {
            Some(message) => Err(ApiError::Status {
                status: 500,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl GitHubApi for FakeGitHub {
    async fn commits(&self, _repository: &Repository, sha: &str) -> Result<Vec<Commit>, ApiError> {
        self.check_failure()?;
        if let Ok(mut pages) = self.requested_pages.lock() {
            pages.push(sha.to_string());
        }

        let start = self
            .history
            .iter()
            .position(|commit| commit.sha == sha)
            .ok_or_else(|| ApiError::Status {
                status: 404,
                message: "Not Found".to_string(),
            })?;

        Ok(self
            .history
            .iter()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect())
    }

    async fn commit(
        &self,
        _repository: &Repository,
        reference: &str,
    ) -> Result<Option<Commit>, ApiError> {
        self.check_failure()?;
        let sha = self
            .tags
            .get(reference)
            .map(String::as_str)
            .unwrap_or(reference);

        Ok(self.history.iter().find(|commit| commit.sha == sha).cloned())
    }

    async fn pull_request(
        &self,
        _repository: &Repository,
        number: u64,
    ) -> Result<Option<PullRequest>, ApiError> {
        self.check_failure()?;
        Ok(self.pull_requests.get(&number).cloned())
    }
}
