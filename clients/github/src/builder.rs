use crate::limiter::{RateLimit, RateLimiter};
use crate::payload::RateLimitBody;
use crate::{endpoint, GithubClient, RetryPolicy};
use log::warn;
use org_pulse::api::{Error, Result};
use reqwest::header;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use reqwest::Client;
use reqwest::ClientBuilder;
use secrecy::ExposeSecret;
use std::time::Duration;
use url::Url;

pub const DEFAULT_GITHUB_URL: &str = "https://api.github.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct GithubClientBuilder {
    client_builder: ClientBuilder,
    github_url: String,
    headers: HeaderMap,
    timeout: Duration,
    retry_policy: RetryPolicy,
}

impl Default for GithubClientBuilder {
    fn default() -> Self {
        let mut headers = HeaderMap::default();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("org_pulse"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        Self {
            client_builder: ClientBuilder::default(),
            github_url: DEFAULT_GITHUB_URL.to_string(),
            headers,
            timeout: DEFAULT_TIMEOUT,
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl GithubClientBuilder {
    pub fn try_with_token(self, token: secrecy::SecretString) -> Result<GithubClientBuilder> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|_| Error::Error("API token is not a valid header value."))?;
        value.set_sensitive(true);
        Ok(self.with_header_value(header::AUTHORIZATION, value))
    }

    pub fn try_with_user_agent<STR: AsRef<str>>(self, user_agent: STR) -> Result<GithubClientBuilder> {
        let value = HeaderValue::from_str(user_agent.as_ref()).map_err(anyhow::Error::from)?;
        Ok(self.with_header_value(header::USER_AGENT, value))
    }

    pub fn with_github_url<STR: AsRef<str>>(mut self, url: STR) -> GithubClientBuilder {
        self.github_url = url.as_ref().to_string();
        self
    }

    /// Timeout of every single request, retries excluded.
    pub fn with_timeout(mut self, timeout: Duration) -> GithubClientBuilder {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> GithubClientBuilder {
        self.retry_policy = retry_policy;
        self
    }

    fn with_header_value(mut self, key: HeaderName, val: HeaderValue) -> GithubClientBuilder {
        self.headers.insert(key, val);
        self
    }

    /// Builds the client, seeding its rate limiters from `GET /rate_limit`. When the endpoint is
    /// unavailable the limiters start unlimited and learn from response headers.
    pub async fn build(self) -> Result<GithubClient> {
        let github_url = Url::parse(&self.github_url).map_err(anyhow::Error::from)?;
        let client = self
            .client_builder
            .default_headers(self.headers)
            .timeout(self.timeout)
            .build()?;
        let (core_limiter, search_limiter) = match rate_limit(&client, &github_url).await {
            Ok(body) => (
                RateLimiter::new("core", RateLimit::from(&body.resources.core)),
                RateLimiter::new("search", RateLimit::from(&body.resources.search)),
            ),
            Err(err) => {
                warn!("Failed to read rate limits, starting unlimited: {}", err);
                (RateLimiter::unlimited("core"), RateLimiter::unlimited("search"))
            }
        };
        Ok(GithubClient {
            client,
            github_url,
            core_limiter,
            search_limiter,
            retry_policy: self.retry_policy,
        })
    }
}

async fn rate_limit(client: &Client, github_url: &Url) -> Result<RateLimitBody> {
    let request_url = endpoint(github_url, &["rate_limit"])?;
    let response = client.get(request_url).send().await?;
    crate::read_response::<RateLimitBody>(response).await
}
