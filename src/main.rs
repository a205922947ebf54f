use clap::Parser;
use colored::*;
use github_stars_export::cli::Cli;
use github_stars_export::export::{export_starred, Destination};
use github_stars_export::github::GitHubClient;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr; stdout may carry the export itself
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let Some(user) = cli.user.as_deref().filter(|user| !user.is_empty()) else {
        eprintln!("{}", "Please set `--user` to a valid GitHub user name.".red());
        return Ok(ExitCode::from(1));
    };

    let client = GitHubClient::with_base_url(&cli.api_url, cli.token.clone(), cli.retry_policy())?;
    if !client.is_authenticated() {
        info!("No token given, requests are unauthenticated");
    }

    let destination = Destination::from(cli.dest.clone());
    let summary = export_starred(&client, user, cli.format, destination).await?;

    match &summary.destination {
        Destination::File(path) => {
            println!(
                "{} {} starred repositories to {}",
                "Successfully exported".green(),
                summary.count,
                path.display()
            );
        }
        Destination::Stdout => {
            info!(count = summary.count, "Exported starred repositories to standard output");
        }
    }

    Ok(ExitCode::SUCCESS)
}
