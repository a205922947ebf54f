use github_stars_export::error::{GitHubStarsError, Result};
use std::error::Error;

#[test]
fn test_error_display() {
    let error = GitHubStarsError::RateLimitExceeded("Rate limit hit".to_string());
    assert_eq!(format!("{}", error), "Rate limit exceeded: Rate limit hit");

    let error = GitHubStarsError::NotFound("User not found".to_string());
    assert_eq!(format!("{}", error), "Resource not found: User not found");

    let error = GitHubStarsError::ApiError("API failed".to_string());
    assert_eq!(format!("{}", error), "GitHub API error: API failed");

    let error = GitHubStarsError::AuthError("Bad credentials".to_string());
    assert_eq!(format!("{}", error), "Authentication error: Bad credentials");
}

#[test]
fn test_error_source() {
    let error = GitHubStarsError::RateLimitExceeded("Rate limit hit".to_string());
    assert!(error.source().is_none());

    let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
    let error = GitHubStarsError::from(io_error);
    assert!(error.source().is_some());
}

#[test]
fn test_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error: GitHubStarsError = io_error.into();
    assert!(matches!(error, GitHubStarsError::IoError(_)));

    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: GitHubStarsError = json_error.into();
    assert!(matches!(error, GitHubStarsError::JsonError(_)));

    let url_error = url::Url::parse("no scheme").unwrap_err();
    let error: GitHubStarsError = url_error.into();
    assert!(matches!(error, GitHubStarsError::InvalidBaseUrl(_)));
}

#[test]
fn test_result_type() {
    fn returns_result() -> Result<String> {
        Ok("success".to_string())
    }

    let result = returns_result();
    assert!(result.is_ok());
    assert_eq!(result.unwrap(), "success");

    fn returns_error() -> Result<String> {
        Err(GitHubStarsError::NotFound("Not found".to_string()))
    }

    let result = returns_error();
    assert!(result.is_err());
}
