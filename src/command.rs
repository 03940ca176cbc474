use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, error, info, info_span, Instrument};

use crate::builder::ChangelogRequest;
use crate::changelog;
use crate::config::{Config, DEFAULT_CONFIG_PATH};
use crate::github::{GitHubApi, GitHubClient};
use crate::resource::Repository;

/// GitHub Changelog: render the pull requests merged between two references
/// of a GitHub repository as a changelog.
#[derive(Parser, Debug)]
#[command(name = "github-changelog", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Creates a changelog from pull requests merged between references
    PullRequest(PullRequestArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PullRequestArgs {
    /// The owner, e.g., "localheinz"
    pub owner: String,

    /// The repository, e.g. "github-changelog"
    pub repository: String,

    /// The start reference, e.g. "1.0.0"
    pub start_reference: String,

    /// The end reference, e.g. "1.1.0"
    pub end_reference: Option<String>,

    /// The GitHub token
    #[arg(short, long)]
    pub auth_token: Option<String>,

    /// The template to use for rendering a pull request [default: "- %title% (#%id%)"]
    #[arg(short, long)]
    pub template: Option<String>,

    /// Write the changelog to this file instead of the terminal
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

/// Run a parsed command line and return the process exit code.
pub async fn run(cli: Cli, out: &mut impl Write) -> u8 {
    match cli.command {
        Command::PullRequest(args) => run_pull_request(&args, out).await,
    }
}

async fn run_pull_request(args: &PullRequestArgs, out: &mut impl Write) -> u8 {
    info!(config = %args.config.display(), "loading configuration");
    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(err) => return report_error(&err, out),
    };

    let token = config.github_token(args.auth_token.as_deref());
    debug!(authenticated = token.is_some(), api_url = config.api_url(), "creating GitHub client");
    let client = match GitHubClient::new(config.api_url(), token, config.per_page()) {
        Ok(client) => client,
        Err(err) => return report_error(&err, out),
    };

    execute(&client, args, config.template(args.template.as_deref()), out).await
}

/// Fetch and render the changelog for `args` through `api`.
///
/// Errors are reported on `out` as "An error occurred: ..." with exit code 1.
/// Finding no pull requests is not an error.
pub async fn execute<A: GitHubApi>(
    api: &A,
    args: &PullRequestArgs,
    template: &str,
    out: &mut impl Write,
) -> u8 {
    let span = info_span!(
        "pull_request",
        owner = %args.owner,
        repository = %args.repository,
        start = %args.start_reference,
        end = ?args.end_reference,
    );

    match generate(api, args, template, out).instrument(span).await {
        Ok(()) => 0,
        Err(err) => report_error(err.as_ref(), out),
    }
}

async fn generate<A: GitHubApi>(
    api: &A,
    args: &PullRequestArgs,
    template: &str,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let repository = Repository::from_owner_and_name(&args.owner, &args.repository)?;
    let request = ChangelogRequest::new(
        repository,
        args.start_reference.as_str(),
        args.end_reference.clone(),
    );

    info!("fetching pull requests from GitHub");
    let range = request.pull_requests(api).await?;
    info!(
        commits = range.commits.len(),
        pull_requests = range.pull_requests.len(),
        "fetched range"
    );

    let rendered = changelog::build(
        template,
        &range.pull_requests,
        &request.start_reference,
        request.end_reference.as_deref(),
    );
    changelog::output(&rendered, args.output.as_deref(), out)?;

    Ok(())
}

fn report_error(err: &dyn std::error::Error, out: &mut impl Write) -> u8 {
    error!(error = %err, "command failed");
    if let Err(write_err) = writeln!(out, "{}", format!("An error occurred: {}", err).red()) {
        error!(error = %write_err, "failed to write error message");
    }
    1
}
