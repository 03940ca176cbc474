pub mod types;

pub use types::{Changelog, DEFAULT_TEMPLATE};

use crate::resource::PullRequest;
use colored::Colorize;
use regex::{Captures, Regex};
use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write changelog: {0}")]
    FileWrite(#[from] std::io::Error),
}

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%(title|id|author)%").expect("Invalid placeholder regex"));

/// Render a single pull request by literal placeholder substitution.
///
/// Supported placeholders: `%title%`, `%id%`, `%author%`. Substitution is a
/// single pass, so placeholders inside a title are left as they are.
pub fn render_pull_request(template: &str, pull_request: &PullRequest) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |captures: &Captures| match &captures[1] {
            "title" => pull_request.title.clone(),
            "id" => pull_request.id.to_string(),
            _ => pull_request.author.login.clone(),
        })
        .into_owned()
}

/// One rendered line per pull request, joined by newlines. Empty input
/// renders as an empty string.
pub fn render(template: &str, pull_requests: &[PullRequest]) -> String {
    pull_requests
        .iter()
        .map(|pull_request| render_pull_request(template, pull_request))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The line announcing how many pull requests were found in the range.
pub fn summary(count: usize, start_reference: &str, end_reference: Option<&str>) -> String {
    let range = match end_reference {
        Some(end) => format!("between \"{}\" and \"{}\"", start_reference, end),
        None => format!("since \"{}\"", start_reference),
    };

    if count == 0 {
        format!("Could not find any pull requests merged {}.", range)
    } else {
        format!("Found {} pull requests merged {}.", count, range)
    }
}

/// Build the full changelog for a set of pull requests.
pub fn build(
    template: &str,
    pull_requests: &[PullRequest],
    start_reference: &str,
    end_reference: Option<&str>,
) -> Changelog {
    Changelog {
        summary: summary(pull_requests.len(), start_reference, end_reference),
        body: render(template, pull_requests),
        count: pull_requests.len(),
    }
}

/// Write the changelog to `out` (the terminal) or, when `output_path` is
/// given, to that file. The summary is printed to `out` either way and also
/// heads the file.
#[instrument(skip(changelog, out), fields(count = changelog.count))]
pub fn output(
    changelog: &Changelog,
    output_path: Option<&Path>,
    out: &mut impl Write,
) -> Result<(), OutputError> {
    writeln!(out)?;
    writeln!(out, "{}", changelog.summary.as_str().bold())?;

    match output_path {
        None => {
            debug!("writing changelog to terminal");
            if !changelog.is_empty() {
                writeln!(out)?;
                writeln!(out, "{}", changelog.body)?;
            }
            writeln!(out)?;
            Ok(())
        }
        Some(path) => {
            debug!(path = %path.display(), "writing changelog to file");
            write_changelog_file(changelog, path)?;
            writeln!(out, "Changelog written to {}", path.display())?;
            Ok(())
        }
    }
}

fn write_changelog_file(changelog: &Changelog, path: &Path) -> Result<(), OutputError> {
    let mut contents = format!("{}\n", changelog.summary);
    if !changelog.is_empty() {
        contents.push('\n');
        contents.push_str(&changelog.body);
        contents.push('\n');
    }
    std::fs::write(path, contents)?;
    Ok(())
}
