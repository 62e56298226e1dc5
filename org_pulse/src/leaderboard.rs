//! Ranking and dashboard shaping of an [`OrgReport`].

use crate::model::{ContributionCounts, MemberStats, OrgReport};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Reverse;

pub const COMMIT_POINTS: u64 = 1;
pub const PULL_REQUEST_POINTS: u64 = 5;
pub const ISSUE_POINTS: u64 = 2;

const RECENT_ACTIVITY_LEN: usize = 10;

pub fn points(counts: &ContributionCounts) -> u64 {
    counts.commits * COMMIT_POINTS + counts.pull_requests * PULL_REQUEST_POINTS + counts.issues * ISSUE_POINTS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub points: u64,
    #[serde(flatten)]
    pub member: MemberStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Ranks members by points, highest first. Equal points are ordered by login.
    pub fn from_members(members: &[MemberStats]) -> Self {
        let mut scored: Vec<(u64, &MemberStats)> = members
            .iter()
            .map(|member| (points(&member.contributions), member))
            .collect();
        scored.sort_by(|(a_points, a), (b_points, b)| {
            b_points.cmp(a_points).then_with(|| a.login.cmp(&b.login))
        });
        let entries = scored
            .into_iter()
            .enumerate()
            .map(|(index, (points, member))| LeaderboardEntry {
                rank: index + 1,
                points,
                member: member.clone(),
            })
            .collect();
        Leaderboard { entries }
    }

    pub fn top(&self) -> Option<&LeaderboardEntry> {
        self.entries.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentActivity {
    pub repo: String,
    pub full_name: String,
    pub pushed_at: DateTime<Utc>,
    pub time_ago: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub org: String,
    pub total_commits: u64,
    pub total_pull_requests: u64,
    pub total_issues: u64,
    pub active_projects: usize,
    pub top_contributor: Option<String>,
    pub attempted: usize,
    pub succeeded: usize,
    pub leaderboard: Leaderboard,
    pub recent_activity: Vec<RecentActivity>,
}

impl DashboardSummary {
    pub fn assemble(report: &OrgReport, now: DateTime<Utc>) -> Self {
        let leaderboard = Leaderboard::from_members(&report.members);
        let sum = |field: fn(&ContributionCounts) -> u64| -> u64 {
            report.members.iter().map(|member| field(&member.contributions)).sum()
        };
        DashboardSummary {
            org: report.org.clone(),
            total_commits: sum(|c: &ContributionCounts| c.commits),
            total_pull_requests: sum(|c: &ContributionCounts| c.pull_requests),
            total_issues: sum(|c: &ContributionCounts| c.issues),
            active_projects: report.repositories.len(),
            top_contributor: leaderboard.top().map(|entry| entry.member.login.clone()),
            attempted: report.attempted,
            succeeded: report.succeeded(),
            recent_activity: recent_activity(report, now),
            leaderboard,
        }
    }
}

fn recent_activity(report: &OrgReport, now: DateTime<Utc>) -> Vec<RecentActivity> {
    let mut pushed: Vec<_> = report
        .repositories
        .iter()
        .filter_map(|repo| repo.pushed_at.map(|pushed_at| (pushed_at, repo)))
        .collect();
    pushed.sort_by_key(|(pushed_at, _)| Reverse(*pushed_at));
    pushed
        .into_iter()
        .take(RECENT_ACTIVITY_LEN)
        .map(|(pushed_at, repo)| RecentActivity {
            repo: repo.name.clone(),
            full_name: repo.full_name.clone(),
            pushed_at,
            time_ago: time_ago(pushed_at, now),
        })
        .collect()
}

/// Coarse human readable age, months being 30 days.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    match seconds {
        s if s < 60 => "Just now".to_string(),
        s if s < 3_600 => format!("{} minutes ago", s / 60),
        s if s < 86_400 => format!("{} hours ago", s / 3_600),
        s if s < 2_592_000 => format!("{} days ago", s / 86_400),
        s => format!("{} months ago", s / 2_592_000),
    }
}
