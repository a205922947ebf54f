use reqwest::StatusCode;
use std::time::Duration;

/// Exponential backoff for transient failures on every API call.
///
/// The delay before the n-th retry is `backoff_factor * 2^(n - 1)` seconds,
/// never more than `backoff_max`. The ceiling defaults to the delay of the
/// final retry, `backoff_factor * 2^(total - 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    total: u32,
    backoff_factor: f64,
    backoff_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BACKOFF_FACTOR, Self::DEFAULT_TOTAL)
    }
}

impl RetryPolicy {
    pub const DEFAULT_TOTAL: u32 = 8;
    pub const DEFAULT_BACKOFF_FACTOR: f64 = 1.0;

    pub fn new(backoff_factor: f64, total: u32) -> Self {
        // NaN.max(0.0) is 0.0
        let backoff_factor = backoff_factor.max(0.0);
        let backoff_max = doubled(backoff_factor, total);

        Self {
            total,
            backoff_factor,
            backoff_max,
        }
    }

    /// Replaces the computed ceiling.
    pub fn with_backoff_max(mut self, backoff_max: Duration) -> Self {
        self.backoff_max = backoff_max;
        self
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn backoff_factor(&self) -> f64 {
        self.backoff_factor
    }

    pub fn backoff_max(&self) -> Duration {
        self.backoff_max
    }

    /// Delay before retry number `retry` (1-based). Retry 0 is the first attempt.
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }

        let delay = doubled(self.backoff_factor, retry);
        delay.min(self.backoff_max)
    }

    /// Delay before retry `retry`, preferring a server-sent `Retry-After`.
    pub fn delay_for(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(delay) => delay.min(self.backoff_max),
            None => self.backoff(retry),
        }
    }

    /// Whether another attempt is allowed after `retries` retries already made.
    pub fn can_retry(&self, retries: u32) -> bool {
        retries < self.total
    }

    /// Statuses a stock HTTP transport treats as transient. A 403 only counts
    /// when the rate limit is exhausted.
    pub fn is_retryable_status(&self, status: StatusCode, rate_limited: bool) -> bool {
        match status {
            StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => true,
            StatusCode::FORBIDDEN => rate_limited,
            _ => false,
        }
    }

    pub fn is_retryable_error(&self, err: &reqwest::Error) -> bool {
        err.is_connect() || err.is_timeout()
    }
}

/// `factor * 2^(n - 1)` seconds, saturating at `Duration::MAX`.
fn doubled(factor: f64, n: u32) -> Duration {
    if factor == 0.0 {
        return Duration::ZERO;
    }

    let exponent = i32::try_from(n).unwrap_or(i32::MAX).saturating_sub(1);
    seconds(factor * 2f64.powi(exponent))
}

fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}
