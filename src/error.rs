use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitHubStarsError {
    #[error("GitHub API error: {0}")]
    ApiError(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV serialization error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),
}

impl From<url::ParseError> for GitHubStarsError {
    fn from(err: url::ParseError) -> Self {
        GitHubStarsError::InvalidBaseUrl(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GitHubStarsError>;
