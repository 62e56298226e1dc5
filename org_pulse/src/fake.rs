//! In-memory `Client` used by the engine tests.

use crate::api::{
    Client, CommitRef, Error, IssueKind, MemberIdentity, Page, RepoType, RepositorySummary, Result, UserProfile,
};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub(crate) fn repository(name: &str, pushed_days_ago: i64) -> RepositorySummary {
    let epoch = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    RepositorySummary {
        name: name.to_string(),
        full_name: format!("org/{}", name),
        description: None,
        language: Some("Rust".to_string()),
        stargazers_count: 0,
        forks_count: 0,
        open_issues_count: 0,
        pushed_at: Some(epoch - ChronoDuration::days(pushed_days_ago)),
        html_url: format!("https://github.com/org/{}", name),
    }
}

pub(crate) fn member(login: &str) -> MemberIdentity {
    MemberIdentity::new(
        login.to_string(),
        format!("https://avatars.example/{}", login),
        format!("https://github.com/{}", login),
    )
}

#[derive(Default)]
pub(crate) struct FakeClient {
    pub repos: Vec<RepositorySummary>,
    pub members: Vec<MemberIdentity>,
    /// Commits attributed to `(repo, login)`.
    pub commits: HashMap<(String, String), u32>,
    pub broken_repos: HashSet<String>,
    pub searches: HashMap<(String, IssueKind), u64>,
    pub broken_searches: HashSet<String>,
    pub broken_members_listing: bool,
    pub profiles: HashMap<String, UserProfile>,
    /// Answer pages with a last page marker, like GitHub's `Link` header does.
    pub last_marker: bool,
    pub delay: Option<Duration>,
    /// Answer commit listings with every commit regardless of `per_page`.
    pub oversized_commit_pages: bool,
    pub repo_pages: AtomicU32,
    pub member_pages: AtomicU32,
    pub commit_pages: Mutex<Vec<(String, String, u32)>>,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FakeClient {
    pub(crate) fn with_commits(mut self, repo: &str, login: &str, count: u32) -> Self {
        self.commits.insert((repo.to_string(), login.to_string()), count);
        self
    }

    pub(crate) fn with_search(mut self, login: &str, kind: IssueKind, total: u64) -> Self {
        self.searches.insert((login.to_string(), kind), total);
        self
    }

    async fn enter(&self) -> InFlight<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        InFlight(&self.in_flight)
    }

    fn page_of<T: Clone>(&self, all: &[T], page: u32, per_page: u32) -> Page<T> {
        let start = ((page - 1) * per_page) as usize;
        let items: Vec<T> = all.iter().skip(start).take(per_page as usize).cloned().collect();
        let last = self.last_marker.then(|| start + items.len() >= all.len());
        Page::new(items, last)
    }
}

fn status(code: u16, url: String) -> Error {
    Error::Status {
        status: code,
        url,
        rate_limited: false,
    }
}

#[async_trait]
impl Client for FakeClient {
    async fn org_repos(
        &self,
        org: &str,
        _repo_type: RepoType,
        page: u32,
        per_page: u32,
    ) -> Result<Page<RepositorySummary>> {
        let _guard = self.enter().await;
        self.repo_pages.fetch_add(1, Ordering::SeqCst);
        if org.is_empty() {
            return Err(status(404, "/orgs//repos".to_string()));
        }
        Ok(self.page_of(&self.repos, page, per_page))
    }

    async fn org_members(&self, org: &str, page: u32, per_page: u32) -> Result<Page<MemberIdentity>> {
        let _guard = self.enter().await;
        self.member_pages.fetch_add(1, Ordering::SeqCst);
        if self.broken_members_listing {
            return Err(status(502, format!("/orgs/{}/members", org)));
        }
        Ok(self.page_of(&self.members, page, per_page))
    }

    async fn repo_commits(
        &self,
        owner: &str,
        repo: &str,
        author: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Page<CommitRef>> {
        let _guard = self.enter().await;
        self.commit_pages
            .lock()
            .unwrap()
            .push((repo.to_string(), author.to_string(), page));
        if self.broken_repos.contains(repo) {
            return Err(status(409, format!("/repos/{}/{}/commits", owner, repo)));
        }
        let count = self
            .commits
            .get(&(repo.to_string(), author.to_string()))
            .copied()
            .unwrap_or(0);
        let all: Vec<CommitRef> = (0..count)
            .map(|i| CommitRef::new(format!("{}-{}-{}", repo, author, i)))
            .collect();
        if self.oversized_commit_pages {
            return Ok(Page::new(all, None));
        }
        Ok(self.page_of(&all, page, per_page))
    }

    async fn search_count(&self, query: &str) -> Result<u64> {
        let _guard = self.enter().await;
        let qualifier = |name: &str| {
            query
                .split_whitespace()
                .find_map(|token| token.strip_prefix(name))
                .map(str::to_string)
        };
        let login = qualifier("author:").ok_or(Error::Error("query without author"))?;
        let kind = match qualifier("is:").as_deref() {
            Some("pr") => IssueKind::Pr,
            Some("issue") => IssueKind::Issue,
            _ => return Err(Error::Error("query without kind")),
        };
        if self.broken_searches.contains(&login) {
            return Err(status(422, format!("/search/issues?q={}", query)));
        }
        Ok(self.searches.get(&(login, kind)).copied().unwrap_or(0))
    }

    async fn user(&self, login: &str) -> Result<UserProfile> {
        let _guard = self.enter().await;
        self.profiles
            .get(login)
            .cloned()
            .ok_or_else(|| status(404, format!("/users/{}", login)))
    }
}
