use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_more::Constructor;
use serde::Serialize;
use strum_macros::{Display, EnumString};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Error: {0}")]
    Error(&'static str),
    // the only reason of `reqwest` dependency..
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Upstream responded with {status} for {url}")]
    Status {
        status: u16,
        url: String,
        /// The response said no requests remain until the rate limit window resets.
        rate_limited: bool,
    },
    #[error("Failed to list organization {what}: {source}")]
    Listing {
        what: &'static str,
        #[source]
        source: Box<Error>,
    },
    #[error("Failed to sample contributions of {login}: {source}")]
    Sample {
        login: String,
        #[source]
        source: Box<Error>,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Timeouts, connection failures, 5xx, 429 and rate limited responses are worth another
    /// attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Request(err) => err.is_timeout() || err.is_connect(),
            Error::Status {
                status, rate_limited, ..
            } => *rate_limited || *status >= 500 || *status == 429,
            Error::Listing { source, .. } | Error::Sample { source, .. } => source.is_transient(),
            Error::Error(_) | Error::Other(_) => false,
        }
    }

    pub fn listing(what: &'static str, source: Error) -> Self {
        Error::Listing {
            what,
            source: Box::new(source),
        }
    }

    pub fn sample(login: impl Into<String>, source: Error) -> Self {
        Error::Sample {
            login: login.into(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Organization repository filter accepted by the repositories listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum RepoType {
    All,
    #[default]
    Public,
    Private,
    Forks,
    Sources,
    Member,
}

/// Search qualifier selecting pull requests or issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum IssueKind {
    Pr,
    Issue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositorySummary {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stargazers_count: u32,
    pub forks_count: u32,
    pub open_issues_count: u32,
    pub pushed_at: Option<DateTime<Utc>>,
    pub html_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Constructor)]
pub struct MemberIdentity {
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct UserProfile {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: String,
    pub html_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct CommitRef {
    pub sha: String,
}

/// One page of a paginated listing.
///
/// `last` is `Some(true)` when the upstream said no further page exists, `Some(false)` when it
/// advertised a next page and `None` when it gave no hint at all.
#[derive(Debug, Clone, PartialEq, Constructor)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub last: Option<bool>,
}

impl<T> Page<T> {
    /// True when no further page should be requested for a listing using `per_page`.
    pub fn is_final(&self, per_page: u32) -> bool {
        self.items.len() < per_page as usize || self.last == Some(true)
    }
}

#[async_trait]
pub trait Client: Send + Sync {
    async fn org_repos(
        &self,
        org: &str,
        repo_type: RepoType,
        page: u32,
        per_page: u32,
    ) -> Result<Page<RepositorySummary>>;

    async fn org_members(&self, org: &str, page: u32, per_page: u32) -> Result<Page<MemberIdentity>>;

    async fn repo_commits(
        &self,
        owner: &str,
        repo: &str,
        author: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Page<CommitRef>>;

    /// Total number of issues or pull requests matching `query`.
    async fn search_count(&self, query: &str) -> Result<u64>;

    async fn user(&self, login: &str) -> Result<UserProfile>;
}

#[test]
fn repo_type_parse_test() {
    use std::str::FromStr;
    assert_eq!(RepoType::from_str("sources").unwrap(), RepoType::Sources);
    assert_eq!(RepoType::Public.to_string(), "public");
    assert!(RepoType::from_str("secret").is_err());
}

#[test]
fn page_is_final_test() {
    let full = Page::new(vec![1, 2], None);
    assert!(!full.is_final(2));
    assert!(full.is_final(3), "short page ends pagination");
    assert!(Page::new(vec![1, 2], Some(true)).is_final(2), "last page marker ends pagination");
    assert!(!Page::new(vec![1, 2], Some(false)).is_final(2));
}

#[test]
fn transient_test() {
    let err = Error::Status {
        status: 502,
        url: "u".to_string(),
        rate_limited: false,
    };
    assert!(err.is_transient());
    assert!(Error::listing("members", err).is_transient());
    let err = Error::Status {
        status: 404,
        url: "u".to_string(),
        rate_limited: false,
    };
    assert!(!err.is_transient());
    let err = Error::Status {
        status: 403,
        url: "u".to_string(),
        rate_limited: false,
    };
    assert!(!err.is_transient(), "plain forbidden is permanent");
    let err = Error::Status {
        status: 403,
        url: "u".to_string(),
        rate_limited: true,
    };
    assert!(err.is_transient(), "exhausted rate limit waits for reset");
}
