use chrono::{DateTime, Duration, Utc};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::types::GitHubRepo;

/// One exported starred repository. Field order is the output key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarredRepoRecord {
    pub name: String,
    pub link: String,
}

impl From<GitHubRepo> for StarredRepoRecord {
    fn from(repo: GitHubRepo) -> Self {
        Self {
            name: repo.name,
            link: repo.html_url,
        }
    }
}

/// Rate limit state reported by the last response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitState {
    pub remaining: u32,
    pub limit: u32,
    pub reset_time: DateTime<Utc>,
    pub is_limited: bool,
}

impl Default for RateLimitState {
    fn default() -> Self {
        Self {
            remaining: 5000,
            limit: 5000,
            reset_time: Utc::now() + Duration::hours(1),
            is_limited: false,
        }
    }
}

impl RateLimitState {
    /// Reads the `X-RateLimit-*` headers. Absent headers leave the default in place.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| headers.get(name).and_then(|h| h.to_str().ok());

        let defaults = Self::default();

        let limit = header("X-RateLimit-Limit")
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(defaults.limit);

        let remaining = header("X-RateLimit-Remaining")
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(limit);

        let reset_time = header("X-RateLimit-Reset")
            .and_then(|s| s.parse::<i64>().ok())
            .and_then(|timestamp| DateTime::from_timestamp(timestamp, 0))
            .unwrap_or(defaults.reset_time);

        Self {
            remaining,
            limit,
            reset_time,
            is_limited: remaining == 0,
        }
    }
}
