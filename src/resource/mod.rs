pub mod types;

pub use types::{Commit, PullRequest, Range, Repository, User};

use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResourceError {
    #[error("{0}")]
    InvalidArgument(String),
}

const OWNER_PATTERN: &str = r"(?P<owner>[a-zA-Z0-9]+(-[a-zA-Z0-9]+)*)";
const NAME_PATTERN: &str = r"(?P<name>[a-zA-Z0-9\-_]+)";

static OWNER_RE: LazyLock<Regex> = LazyLock::new(|| full_match(OWNER_PATTERN));
static NAME_RE: LazyLock<Regex> = LazyLock::new(|| full_match(NAME_PATTERN));
static STRING_RE: LazyLock<Regex> =
    LazyLock::new(|| full_match(&format!("{}/{}", OWNER_PATTERN, NAME_PATTERN)));

fn full_match(pattern: &str) -> Regex {
    Regex::new(&format!("^{}$", pattern)).expect("repository patterns are valid")
}

impl Repository {
    /// Validate `owner` and `name` against GitHub's naming rules.
    pub fn from_owner_and_name(owner: &str, name: &str) -> Result<Self, ResourceError> {
        if !OWNER_RE.is_match(owner) {
            return Err(ResourceError::InvalidArgument(format!(
                "Owner \"{}\" does not appear to be a valid owner.",
                owner
            )));
        }

        if !NAME_RE.is_match(name) {
            return Err(ResourceError::InvalidArgument(format!(
                "Name \"{}\" does not appear to be a valid name.",
                name
            )));
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl FromStr for Repository {
    type Err = ResourceError;

    /// Parse the "owner/name" form produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = STRING_RE.captures(s).ok_or_else(|| {
            ResourceError::InvalidArgument(format!(
                "String \"{}\" does not appear to be a valid string.",
                s
            ))
        })?;

        Ok(Self {
            owner: captures["owner"].to_string(),
            name: captures["name"].to_string(),
        })
    }
}
