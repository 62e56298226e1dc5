use chrono::{DateTime, Utc};
use org_pulse::api::{CommitRef, MemberIdentity, RepositorySummary, UserProfile};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct Repo {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub forks_count: u32,
    #[serde(default)]
    pub open_issues_count: u32,
    pub pushed_at: Option<DateTime<Utc>>,
    pub html_url: String,
}

impl From<Repo> for RepositorySummary {
    fn from(repo: Repo) -> Self {
        RepositorySummary {
            name: repo.name,
            full_name: repo.full_name,
            description: repo.description,
            language: repo.language,
            stargazers_count: repo.stargazers_count,
            forks_count: repo.forks_count,
            open_issues_count: repo.open_issues_count,
            pushed_at: repo.pushed_at,
            html_url: repo.html_url,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct Member {
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
}

impl From<Member> for MemberIdentity {
    fn from(member: Member) -> Self {
        MemberIdentity::new(member.login, member.avatar_url, member.html_url)
    }
}

#[derive(Deserialize, Debug)]
pub struct Commit {
    pub sha: String,
}

impl From<Commit> for CommitRef {
    fn from(commit: Commit) -> Self {
        CommitRef::new(commit.sha)
    }
}

#[derive(Deserialize, Debug)]
pub struct SearchIssues {
    pub total_count: u64,
}

#[derive(Deserialize, Debug)]
pub struct User {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: String,
    pub html_url: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile::new(user.login, user.name, user.avatar_url, user.html_url)
    }
}

#[derive(Deserialize, Debug)]
pub struct RateLimitBody {
    pub resources: RateLimitResources,
}

#[derive(Deserialize, Debug)]
pub struct RateLimitResources {
    pub core: RateLimitResource,
    pub search: RateLimitResource,
}

#[derive(Deserialize, Debug)]
pub struct RateLimitResource {
    pub limit: u32,
    pub remaining: u32,
    pub reset: i64,
}
