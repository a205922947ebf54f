use crate::error::{GitHubStarsError, Result};
use crate::models::RateLimitState;
use crate::retry::RetryPolicy;
use crate::types::{GitHubRepo, GitHubUser};
use futures::stream::{self, Stream, TryStreamExt};
use reqwest::header::{ACCEPT, AUTHORIZATION, LINK, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

pub const API_BASE_URL: &str = "https://api.github.com";
pub const PER_PAGE: u32 = 30;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub struct GitHubClient {
    client: Client,
    token: Option<String>,
    base_url: Url,
    retry: RetryPolicy,
}

impl GitHubClient {
    pub fn new(token: Option<String>, retry: RetryPolicy) -> Result<Self> {
        Self::with_base_url(API_BASE_URL, token, retry)
    }

    pub fn with_base_url(
        base_url: &str,
        token: Option<String>,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(GitHubStarsError::InvalidBaseUrl(base_url.to_string()));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(GitHubClient {
            client,
            token,
            base_url,
            retry,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GitHubStarsError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn make_request(&self, url: &Url) -> Result<Response> {
        let mut retries = 0;

        loop {
            let mut request = self
                .client
                .get(url.clone())
                .header(ACCEPT, "application/vnd.github+json");
            if let Some(token) = &self.token {
                request = request.header(AUTHORIZATION, format!("token {}", token));
            }

            debug!(%url, attempt = retries + 1, "GET");

            let response = match request.send().await {
                Ok(response) => response,
                Err(err)
                    if self.retry.is_retryable_error(&err) && self.retry.can_retry(retries) =>
                {
                    retries += 1;
                    let delay = self.retry.backoff(retries);
                    warn!(
                        error = %err,
                        retry = retries,
                        delay_secs = delay.as_secs_f64(),
                        "Transport error, retrying"
                    );
                    sleep(delay).await;
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            let rate_limit = RateLimitState::from_headers(response.headers());

            match response.status() {
                StatusCode::OK => {
                    if rate_limit.remaining < 10 {
                        warn!(
                            remaining = rate_limit.remaining,
                            reset = %rate_limit.reset_time,
                            "Rate limit low"
                        );
                    }
                    return Ok(response);
                }
                StatusCode::NOT_FOUND => {
                    return Err(GitHubStarsError::NotFound(format!("Resource not found: {}", url)));
                }
                StatusCode::UNAUTHORIZED => {
                    let error_text = response.text().await.unwrap_or_default();
                    return Err(GitHubStarsError::AuthError(format!(
                        "Unauthorized: {}",
                        error_text
                    )));
                }
                status if self.retry.is_retryable_status(status, rate_limit.is_limited)
                    && self.retry.can_retry(retries) =>
                {
                    retries += 1;
                    let delay = self.retry.delay_for(retries, retry_after(&response));
                    warn!(
                        %status,
                        retry = retries,
                        delay_secs = delay.as_secs_f64(),
                        "Transient API failure, retrying"
                    );
                    sleep(delay).await;
                    continue;
                }
                status if rate_limit.is_limited
                    && matches!(status, StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS) =>
                {
                    return Err(GitHubStarsError::RateLimitExceeded(format!(
                        "API rate limit exceeded after {} retries. Reset at: {}",
                        retries, rate_limit.reset_time
                    )));
                }
                status => {
                    let error_text = response.text().await.unwrap_or_default();
                    return Err(GitHubStarsError::ApiError(format!(
                        "API request failed with status {}: {}",
                        status, error_text
                    )));
                }
            }
        }
    }

    pub async fn get_user(&self, username: &str) -> Result<GitHubUser> {
        let url = self.endpoint(&["users", username])?;
        let response = self.make_request(&url).await?;
        let user: GitHubUser = response.json().await?;
        Ok(user)
    }

    /// Total number of repositories starred by `username`.
    ///
    /// Requests a single-item page and reads the last page number from the
    /// `Link` header; without one, everything fit on that page. A `Link`
    /// header with no usable `rel="last"` entry is an error.
    pub async fn starred_count(&self, username: &str) -> Result<u32> {
        let mut url = self.endpoint(&["users", username, "starred"])?;
        url.query_pairs_mut().append_pair("per_page", "1");

        let response = self.make_request(&url).await?;
        let link = response
            .headers()
            .get(LINK)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

        match link {
            Some(link) => parse_last_page(&link).ok_or_else(|| {
                GitHubStarsError::ApiError(format!("Link header has no last page: {}", link))
            }),
            None => {
                let repos: Vec<GitHubRepo> = response.json().await?;
                Ok(repos.len() as u32)
            }
        }
    }

    /// Fetch one page (1-based) of a user's starred repositories
    pub async fn fetch_starred_page(&self, username: &str, page: u32) -> Result<Vec<GitHubRepo>> {
        let mut url = self.endpoint(&["users", username, "starred"])?;
        url.query_pairs_mut()
            .append_pair("per_page", &PER_PAGE.to_string())
            .append_pair("page", &page.to_string());

        let response = self.make_request(&url).await?;
        let repos: Vec<GitHubRepo> = response.json().await?;
        debug!(username, page, count = repos.len(), "Fetched starred page");
        Ok(repos)
    }

    /// Resolves `username` and sizes its starred list.
    pub async fn starred(&self, username: &str) -> Result<StarredRepos<'_>> {
        let user = self.get_user(username).await?;
        let total_count = self.starred_count(&user.login).await?;
        info!(user = %user.login, total_count, "Resolved starred repositories");

        Ok(StarredRepos {
            client: self,
            login: user.login,
            total_count,
        })
    }
}

/// A user's starred repositories, paged `PER_PAGE` at a time.
pub struct StarredRepos<'a> {
    client: &'a GitHubClient,
    login: String,
    total_count: u32,
}

impl<'a> StarredRepos<'a> {
    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    pub fn total_pages(&self) -> u32 {
        self.total_count.div_ceil(PER_PAGE)
    }

    /// Yields repositories in page order, fetching each page only when the
    /// previous one is drained. Consumes the list, so it is walked once.
    pub fn into_stream(self) -> impl Stream<Item = Result<GitHubRepo>> + 'a {
        stream::try_unfold((self, 1u32), |(list, page)| async move {
            if page > list.total_pages() {
                return Ok::<_, GitHubStarsError>(None);
            }

            let repos = list.client.fetch_starred_page(&list.login, page).await?;
            let items = stream::iter(repos.into_iter().map(Ok::<_, GitHubStarsError>));
            Ok::<_, GitHubStarsError>(Some((items, (list, page + 1))))
        })
        .try_flatten()
    }
}

/// Page number of the `rel="last"` entry of a `Link` header.
pub fn parse_last_page(link_header: &str) -> Option<u32> {
    link_header.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let is_last = parts.any(|param| param.trim() == "rel=\"last\"");
        if !is_last {
            return None;
        }

        let target = target.strip_prefix('<')?.strip_suffix('>')?;
        let url = Url::parse(target).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse::<u32>().ok())
    })
}

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
