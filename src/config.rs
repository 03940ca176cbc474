use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::changelog::DEFAULT_TEMPLATE;
use crate::github::client::{DEFAULT_API_URL, DEFAULT_PER_PAGE};

pub const DEFAULT_CONFIG_PATH: &str = ".github-changelog.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .github-changelog.toml.
/// All fields are optional; the tool works with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// GitHub API settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Rendering settings
    #[serde(default)]
    pub changelog: ChangelogConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API token. If None, falls back to GITHUB_TOKEN env var.
    pub token: Option<String>,

    /// API base URL, for GitHub Enterprise installations
    pub api_url: Option<String>,

    /// Commits requested per page, clamped to 1..=100
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangelogConfig {
    /// Template for a single pull request line
    pub template: Option<String>,
}

impl Config {
    /// Load configuration from `path`, or defaults if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Resolve the GitHub token: an explicit value (the --auth-token flag)
    /// wins, then the config file, then the GITHUB_TOKEN env var.
    pub fn github_token(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .map(str::to_string)
            .or_else(|| self.github.token.clone())
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .filter(|token| !token.is_empty())
    }

    pub fn api_url(&self) -> &str {
        self.github.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn per_page(&self) -> u8 {
        self.github
            .per_page
            .map(|per_page| per_page.clamp(1, u32::from(DEFAULT_PER_PAGE)) as u8)
            .unwrap_or(DEFAULT_PER_PAGE)
    }

    /// Resolve the template: an explicit value wins over the config file.
    pub fn template<'a>(&'a self, explicit: Option<&'a str>) -> &'a str {
        explicit
            .or(self.changelog.template.as_deref())
            .unwrap_or(DEFAULT_TEMPLATE)
    }
}
