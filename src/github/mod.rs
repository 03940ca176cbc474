pub mod client;
#[cfg(test)]
pub mod fake;

pub use client::GitHubClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::resource::{Commit, PullRequest, Repository};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("GitHub API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("GitHub API error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Invalid GitHub API URL: {0}")]
    InvalidBaseUrl(String),

    #[error("GitHub API rate limit exceeded")]
    RateLimited,

    #[error("Failed to decode GitHub API response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The slice of the GitHub REST API the changelog needs.
///
/// `GitHubClient` talks to the real service; tests substitute an in-memory
/// history. Every call is awaited before the next one is issued.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// One page of commits, listed starting at `sha` (which is included).
    async fn commits(&self, repository: &Repository, sha: &str) -> Result<Vec<Commit>, ApiError>;

    /// Look up the commit a reference (SHA, tag or branch) points to.
    /// Returns `Ok(None)` when the reference does not exist.
    async fn commit(
        &self,
        repository: &Repository,
        reference: &str,
    ) -> Result<Option<Commit>, ApiError>;

    /// Look up a pull request by number. Returns `Ok(None)` when it does not exist.
    async fn pull_request(
        &self,
        repository: &Repository,
        number: u64,
    ) -> Result<Option<PullRequest>, ApiError>;
}
