//! Per-member contribution sampling.
//!
//! # Overview
//!
//! Pull requests and issues are counted exactly through the issue search. Exact commit totals
//! are not available cheaply, so commits are sampled: only the first [`SamplingBounds::max_repos`]
//! candidate repositories (the catalog lists the most recently updated first) are inspected and
//! each of them is paged through for at most [`SamplingBounds::max_pages`] pages of
//! [`SamplingBounds::per_page`] commits. The commit count is therefore a lower bound, never more
//! than [`SamplingBounds::max_commits`].

use crate::api::{Client, Error, IssueKind, RepositorySummary, Result, UserProfile};
use crate::model::{ContributionCounts, MemberStats};
use crate::pagination::Paginator;
use derive_more::Constructor;
use log::{debug, warn};
use std::sync::Arc;

pub const DEFAULT_WEB_URL: &str = "https://github.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Constructor)]
pub struct SamplingBounds {
    /// Number of leading candidate repositories inspected for commits.
    pub max_repos: usize,
    /// Commit pages requested per repository.
    pub max_pages: u32,
    pub per_page: u32,
}

impl Default for SamplingBounds {
    fn default() -> Self {
        SamplingBounds::new(25, 5, 50)
    }
}

impl SamplingBounds {
    pub fn max_commits_per_repo(&self) -> u64 {
        self.max_pages as u64 * self.per_page as u64
    }

    pub fn max_commits(&self) -> u64 {
        self.max_repos as u64 * self.max_commits_per_repo()
    }
}

pub fn search_query(org: &str, login: &str, kind: IssueKind) -> String {
    format!("org:{} author:{} is:{}", org, login, kind)
}

pub struct ContributionSampler<CLIENT>
where
    CLIENT: Client,
{
    client: Arc<CLIENT>,
    bounds: SamplingBounds,
    web_url: String,
}

impl<CLIENT> ContributionSampler<CLIENT>
where
    CLIENT: 'static + Client,
{
    pub fn new(client: Arc<CLIENT>) -> Self {
        ContributionSampler {
            client,
            bounds: SamplingBounds::default(),
            web_url: DEFAULT_WEB_URL.to_string(),
        }
    }

    pub fn with_bounds(mut self, bounds: SamplingBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Base of the avatar and profile URLs used when the profile lookup fails.
    pub fn with_web_url<STR: AsRef<str>>(mut self, web_url: STR) -> Self {
        self.web_url = web_url.as_ref().trim_end_matches('/').to_string();
        self
    }

    pub fn bounds(&self) -> SamplingBounds {
        self.bounds
    }

    /// Computes the contributions of `login` to `org`.
    ///
    /// Fails only when one of the searches fails. Repositories whose commits cannot be listed are
    /// skipped and a failed profile lookup falls back to URLs built from the login.
    pub async fn sample_member(
        &self,
        org: &str,
        login: &str,
        candidate_repos: &[RepositorySummary],
    ) -> Result<MemberStats> {
        let pull_requests = self
            .search(org, login, IssueKind::Pr)
            .await
            .map_err(|err| Error::sample(login, err))?;
        let issues = self
            .search(org, login, IssueKind::Issue)
            .await
            .map_err(|err| Error::sample(login, err))?;
        let commits = self.sample_commits(org, login, candidate_repos).await;
        let profile = self.profile(login).await;
        debug!(
            "Sampled {}: {} commits, {} pull requests, {} issues",
            login, commits, pull_requests, issues
        );
        Ok(MemberStats {
            login: login.to_string(),
            name: profile.name.filter(|name| !name.is_empty()),
            avatar_url: profile.avatar_url,
            html_url: profile.html_url,
            contributions: ContributionCounts::new(commits, pull_requests, issues, 0),
        })
    }

    async fn search(&self, org: &str, login: &str, kind: IssueKind) -> Result<u64> {
        self.client.search_count(&search_query(org, login, kind)).await
    }

    async fn sample_commits(&self, org: &str, login: &str, candidate_repos: &[RepositorySummary]) -> u64 {
        let mut commits = 0;
        for repo in candidate_repos.iter().take(self.bounds.max_repos) {
            match self.repo_commits(org, &repo.name, login).await {
                Ok(count) => commits += count,
                Err(err) => warn!("Skipping {} in commit count of {}: {}", repo.full_name, login, err),
            }
        }
        commits
    }

    /// Commits by `login` in one repository, capped at the per-repository bound even when the
    /// upstream ignores `per_page`. A failure on any page discards the repository entirely.
    async fn repo_commits(&self, org: &str, repo: &str, login: &str) -> Result<u64> {
        let commits = Paginator::listing(self.bounds.per_page, self.bounds.max_pages)
            .collect("commits", |page, per_page| {
                self.client.repo_commits(org, repo, login, page, per_page)
            })
            .await?;
        Ok((commits.len() as u64).min(self.bounds.max_commits_per_repo()))
    }

    async fn profile(&self, login: &str) -> UserProfile {
        match self.client.user(login).await {
            Ok(profile) => profile,
            Err(err) => {
                debug!("Profile of {} unavailable, using defaults: {}", login, err);
                self.fallback_profile(login)
            }
        }
    }

    fn fallback_profile(&self, login: &str) -> UserProfile {
        UserProfile::new(
            login.to_string(),
            None,
            format!("{}/{}.png", self.web_url, login),
            format!("{}/{}", self.web_url, login),
        )
    }
}
