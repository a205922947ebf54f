use crate::export::OutputFormat;
use crate::github::API_BASE_URL;
use crate::retry::RetryPolicy;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "export-stars")]
#[command(about = "Export a GitHub user's starred repositories")]
#[command(version)]
pub struct Cli {
    /// GitHub user name whose stars are exported
    #[arg(long)]
    pub user: Option<String>,

    /// Personal access token; requests are unauthenticated without one
    #[arg(long)]
    pub token: Option<String>,

    /// Output file; defaults to standard output
    #[arg(long)]
    pub dest: Option<PathBuf>,

    /// Output format (json or csv), defaults to json
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// GitHub REST API base URL
    #[arg(long, default_value = API_BASE_URL)]
    pub api_url: String,

    /// Retries for transient HTTP failures
    #[arg(long, default_value_t = RetryPolicy::DEFAULT_TOTAL)]
    pub retries: u32,

    /// Exponential backoff factor in seconds
    #[arg(long, default_value_t = RetryPolicy::DEFAULT_BACKOFF_FACTOR)]
    pub backoff_factor: f64,
}

impl Cli {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.backoff_factor, self.retries)
    }
}
