use crate::api::RepositorySummary;
use derive_more::Constructor;
use serde::Serialize;

/// Per-member contribution counters.
///
/// `commits` is a lower bound: only a bounded prefix of the organization's repositories is
/// sampled and each sampled repository is capped, see [`crate::sampler::SamplingBounds`].
/// `pull_requests` and `issues` come straight from search totals. `reviews` is not collected
/// and stays zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Constructor)]
pub struct ContributionCounts {
    pub commits: u64,
    pub pull_requests: u64,
    pub issues: u64,
    pub reviews: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberStats {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: String,
    pub html_url: String,
    pub contributions: ContributionCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Constructor)]
pub struct MemberFailure {
    pub login: String,
    pub reason: String,
}

/// Outcome of one organization aggregation run.
#[derive(Debug, Clone, Serialize)]
pub struct OrgReport {
    pub org: String,
    pub repositories: Vec<RepositorySummary>,
    /// Unordered, at most one record per login.
    pub members: Vec<MemberStats>,
    pub failures: Vec<MemberFailure>,
    pub attempted: usize,
}

impl OrgReport {
    pub fn succeeded(&self) -> usize {
        self.members.len()
    }

    pub fn member(&self, login: &str) -> Option<&MemberStats> {
        self.members.iter().find(|member| member.login == login)
    }
}
