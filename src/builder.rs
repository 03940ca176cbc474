use thiserror::Error;
use tracing::instrument;

use crate::github::GitHubApi;
use crate::repository::{PullRequestRepository, RepositoryError};
use crate::resource::{Range, Repository, ResourceError};

#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("{0}")]
    InvalidCall(String),

    #[error(transparent)]
    InvalidArgument(#[from] ResourceError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A fully specified changelog query. Only the end reference is optional;
/// without it the range is open-ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogRequest {
    pub repository: Repository,
    pub start_reference: String,
    pub end_reference: Option<String>,
}

impl ChangelogRequest {
    pub fn new(
        repository: Repository,
        start_reference: impl Into<String>,
        end_reference: Option<String>,
    ) -> Self {
        Self {
            repository,
            start_reference: start_reference.into(),
            end_reference,
        }
    }

    #[instrument(skip(self, api), fields(repository = %self.repository, start = %self.start_reference))]
    pub async fn pull_requests<A: GitHubApi>(&self, api: &A) -> Result<Range, RepositoryError> {
        PullRequestRepository::new(api)
            .items(
                &self.repository,
                &self.start_reference,
                self.end_reference.as_deref(),
            )
            .await
    }
}

/// Fluent assembly of a `ChangelogRequest` with both ends of the range.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    owner: Option<String>,
    repository: Option<String>,
    start_reference: Option<String>,
    end_reference: Option<String>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    pub fn start_reference(mut self, reference: impl Into<String>) -> Self {
        self.start_reference = Some(reference.into());
        self
    }

    pub fn end_reference(mut self, reference: impl Into<String>) -> Self {
        self.end_reference = Some(reference.into());
        self
    }

    /// Check that every field is set and the owner/name pair is valid.
    pub fn build(&self) -> Result<ChangelogRequest, BuilderError> {
        let owner = required(&self.owner, "Owner")?;
        let name = required(&self.repository, "Repository")?;
        let start_reference = required(&self.start_reference, "Start reference")?;
        let end_reference = required(&self.end_reference, "End reference")?;

        Ok(ChangelogRequest::new(
            Repository::from_owner_and_name(owner, name)?,
            start_reference,
            Some(end_reference.to_string()),
        ))
    }

    pub async fn pull_requests<A: GitHubApi>(&self, api: &A) -> Result<Range, BuilderError> {
        let request = self.build()?;
        Ok(request.pull_requests(api).await?)
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, BuilderError> {
    value
        .as_deref()
        .ok_or_else(|| BuilderError::InvalidCall(format!("{} needs to be specified", field)))
}
