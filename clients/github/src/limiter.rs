use crate::payload::RateLimitResource;
use chrono::Utc;
use derive_more::Constructor;
use log::debug;
use log::info;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Constructor, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    limit: u32,
    remaining: u32,
    reset: i64,
}

impl From<&RateLimitResource> for RateLimit {
    fn from(resource: &RateLimitResource) -> Self {
        RateLimit::new(resource.limit, resource.remaining, resource.reset)
    }
}

/// Request budget of one GitHub rate limit resource (`core` or `search`).
pub struct RateLimiter {
    resource: &'static str,
    limit: Mutex<RateLimit>,
}

impl RateLimiter {
    pub fn new(resource: &'static str, limit: RateLimit) -> Self {
        RateLimiter {
            resource,
            limit: Mutex::new(limit),
        }
    }

    /// Limiter which never waits unless response headers tell otherwise.
    pub fn unlimited(resource: &'static str) -> Self {
        RateLimiter::new(resource, RateLimit::new(u32::MAX, u32::MAX, 0))
    }

    pub(crate) async fn wait(&self) {
        while let Some(delay) = self.time_to_wait().await {
            info!("Rate limiting {} requests, waiting {} sec", self.resource, delay.as_secs());
            tokio::time::sleep(delay).await;
        }
    }

    async fn time_to_wait(&self) -> Option<Duration> {
        let mut rate_limit = self.limit.lock().await;
        if rate_limit.remaining > 0 {
            rate_limit.remaining -= 1;
            return None;
        }
        let now = Utc::now().timestamp();
        if rate_limit.reset < now {
            debug!("Old {} reset. Resetting remaining to limit.", self.resource);
            rate_limit.remaining = rate_limit.limit.saturating_sub(1);
            return None;
        }
        Some(Duration::from_secs((rate_limit.reset - now + 1) as u64))
    }

    /// Updates the budget from `x-ratelimit-*` response headers. Responses without them leave the
    /// budget untouched.
    pub(crate) async fn reset_limiter(&self, headers: &HeaderMap<HeaderValue>) {
        let (limit, remaining, reset) = match (
            read_header::<u32>(headers, "x-ratelimit-limit"),
            read_header::<u32>(headers, "x-ratelimit-remaining"),
            read_header::<i64>(headers, "x-ratelimit-reset"),
        ) {
            (Some(limit), Some(remaining), Some(reset)) => (limit, remaining, reset),
            _ => return,
        };
        let mut rate_limit = self.limit.lock().await;
        rate_limit.limit = limit;
        if reset > rate_limit.reset {
            // New window.
            rate_limit.reset = reset;
            rate_limit.remaining = remaining;
        } else {
            // Late response of a parallel request may carry an older `remaining`.
            rate_limit.remaining = std::cmp::min(remaining, rate_limit.remaining);
        }
        debug!("Updated {} limits: {:?}", self.resource, rate_limit);
    }

    #[cfg(test)]
    async fn current(&self) -> RateLimit {
        *self.limit.lock().await
    }
}

/// True when the response says the budget of its resource is spent.
pub(crate) fn is_exhausted(headers: &HeaderMap<HeaderValue>) -> bool {
    read_header::<u32>(headers, "x-ratelimit-remaining") == Some(0)
}

fn read_header<T: FromStr>(headers: &HeaderMap<HeaderValue>, header: &str) -> Option<T> {
    headers.get(header)?.to_str().ok()?.parse::<T>().ok()
}
