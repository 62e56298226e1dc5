mod builder;
mod limiter;
mod payload;

pub use builder::{GithubClientBuilder, DEFAULT_GITHUB_URL, DEFAULT_TIMEOUT};

use async_trait::async_trait;
use derive_more::Constructor;
use limiter::RateLimiter;
use log::{debug, warn};
use org_pulse::api::{
    Client, CommitRef, Error, MemberIdentity, Page, RepoType, RepositorySummary, Result, UserProfile,
};
use reqwest::header::{HeaderMap, LINK};
use reqwest::Response;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Bounded exponential backoff for transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Constructor)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::new(3, Duration::from_millis(500))
    }
}

impl RetryPolicy {
    fn delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1 << attempt.min(16))
    }
}

pub struct GithubClient {
    client: reqwest::Client,
    github_url: Url,
    core_limiter: RateLimiter,
    search_limiter: RateLimiter,
    retry_policy: RetryPolicy,
}

impl GithubClient {
    async fn get<T, Q>(&self, limiter: &RateLimiter, url: Url, query: &Q) -> Result<(T, Option<bool>)>
    where
        T: DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let mut attempt = 0;
        loop {
            limiter.wait().await;
            match self.send(limiter, url.clone(), query).await {
                Err(err) if err.is_transient() && attempt < self.retry_policy.max_retries => {
                    let delay = self.retry_policy.delay(attempt);
                    warn!("Retrying {} in {} ms: {}", url, delay.as_millis(), err);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn send<T, Q>(&self, limiter: &RateLimiter, url: Url, query: &Q) -> Result<(T, Option<bool>)>
    where
        T: DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let response = self.client.get(url).query(query).send().await?;
        limiter.reset_limiter(response.headers()).await;
        let last = last_page(response.headers());
        debug!("GET {} -> {}", response.url(), response.status());
        let body = read_response::<T>(response).await?;
        Ok((body, last))
    }

    async fn get_page<T, P, Q>(&self, url: Url, query: &Q) -> Result<Page<T>>
    where
        P: DeserializeOwned + Into<T>,
        Q: serde::Serialize + ?Sized,
    {
        let (items, last) = self.get::<Vec<P>, Q>(&self.core_limiter, url, query).await?;
        Ok(Page::new(items.into_iter().map(Into::into).collect(), last))
    }
}

pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| Error::Error("GitHub URL cannot be a base."))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

pub(crate) async fn read_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let rate_limited = matches!(status.as_u16(), 403 | 429) && limiter::is_exhausted(response.headers());
        return Err(Error::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
            rate_limited,
        });
    }
    Ok(response.json::<T>().await?)
}

/// Reads GitHub's `Link` header: `Some(true)` when it carries no `rel="next"` link.
fn last_page(headers: &HeaderMap) -> Option<bool> {
    let link = headers.get(LINK)?.to_str().ok()?;
    Some(!link.split(',').any(|part| part.contains("rel=\"next\"")))
}

#[async_trait]
impl Client for GithubClient {
    async fn org_repos(
        &self,
        org: &str,
        repo_type: RepoType,
        page: u32,
        per_page: u32,
    ) -> Result<Page<RepositorySummary>> {
        let url = endpoint(&self.github_url, &["orgs", org, "repos"])?;
        let query = [
            ("type", repo_type.to_string()),
            ("sort", "updated".to_string()),
            ("direction", "desc".to_string()),
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
        ];
        self.get_page::<RepositorySummary, payload::Repo, _>(url, &query).await
    }

    async fn org_members(&self, org: &str, page: u32, per_page: u32) -> Result<Page<MemberIdentity>> {
        let url = endpoint(&self.github_url, &["orgs", org, "members"])?;
        let query = [("per_page", per_page.to_string()), ("page", page.to_string())];
        self.get_page::<MemberIdentity, payload::Member, _>(url, &query).await
    }

    async fn repo_commits(
        &self,
        owner: &str,
        repo: &str,
        author: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Page<CommitRef>> {
        let url = endpoint(&self.github_url, &["repos", owner, repo, "commits"])?;
        let query = [
            ("author", author.to_string()),
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
        ];
        self.get_page::<CommitRef, payload::Commit, _>(url, &query).await
    }

    async fn search_count(&self, query: &str) -> Result<u64> {
        let url = endpoint(&self.github_url, &["search", "issues"])?;
        // Only the total is read.
        let query = [("q", query), ("per_page", "1")];
        let (body, _) = self
            .get::<payload::SearchIssues, _>(&self.search_limiter, url, &query)
            .await?;
        Ok(body.total_count)
    }

    async fn user(&self, login: &str) -> Result<UserProfile> {
        let url = endpoint(&self.github_url, &["users", login])?;
        let (user, _) = self
            .get::<payload::User, [(&str, &str)]>(&self.core_limiter, url, &[])
            .await?;
        Ok(user.into())
    }
}
