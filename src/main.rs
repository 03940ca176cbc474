use clap::Parser;
use github_changelog::command;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = command::Cli::parse();

    let mut stdout = std::io::stdout().lock();
    ExitCode::from(command::run(cli, &mut stdout).await)
}
