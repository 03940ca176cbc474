//! Render a changelog from the GitHub pull requests merged between two
//! references of a repository.

pub mod builder;
pub mod changelog;
pub mod command;
pub mod config;
pub mod github;
pub mod repository;
pub mod resource;

pub use builder::{Builder, BuilderError, ChangelogRequest};
pub use github::{ApiError, GitHubApi, GitHubClient};
pub use repository::{PullRequestRepository, RepositoryError};
pub use resource::{Commit, PullRequest, Range, Repository, User};
