use std::fmt;

/// A GitHub repository, identified by owner and name.
/// Constructed through `Repository::from_owner_and_name()` or parsed from
/// "owner/name", so every value has passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repository {
    pub(super) owner: String,
    pub(super) name: String,
}

impl Repository {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A GitHub account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// GitHub login (e.g., "octocat")
    pub login: String,
}

impl User {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
        }
    }

    /// Profile page of this user on github.com.
    pub fn html_url(&self) -> String {
        format!("https://github.com/{}", self.login)
    }
}

/// A single commit as listed by the commits API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Full commit SHA
    pub sha: String,
    /// Full commit message, including the body
    pub message: String,
}

impl Commit {
    pub fn new(sha: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            message: message.into(),
        }
    }
}

/// A pull request, reduced to what a changelog line needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// PR number (e.g., 42)
    pub id: u64,
    /// PR title
    pub title: String,
    /// Author of the pull request
    pub author: User,
}

impl PullRequest {
    pub fn new(id: u64, title: impl Into<String>, author: User) -> Self {
        Self {
            id,
            title: title.into(),
            author,
        }
    }
}

/// Commits between two references (start exclusive, end inclusive) and the
/// pull requests they were merged from, both in history order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Range {
    pub commits: Vec<Commit>,
    pub pull_requests: Vec<PullRequest>,
}

impl Range {
    pub fn new(commits: Vec<Commit>) -> Self {
        Self {
            commits,
            pull_requests: Vec::new(),
        }
    }

    /// Append a pull request, keeping discovery order.
    pub fn with_pull_request(mut self, pull_request: PullRequest) -> Self {
        self.pull_requests.push(pull_request);
        self
    }
}
