pub mod commit;
pub mod pull_request;

pub use commit::{CommitRepository, CommitWalk};
pub use pull_request::PullRequestRepository;

use thiserror::Error;

use crate::github::ApiError;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Could not find reference \"{reference}\" in \"{repository}\".")]
    ReferenceNotFound {
        repository: String,
        reference: String,
    },

    #[error("Could not find pull request \"{number}\" in \"{repository}\".")]
    PullRequestNotFound { repository: String, number: u64 },

    #[error(transparent)]
    Api(#[from] ApiError),
}
