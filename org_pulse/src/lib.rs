//! Organization contribution aggregation
//!
//! # Overview
//!
//! Given an organization, library lists all of its repositories (most recently updated first)
//! and all of its members, then computes the contributions of every member across the
//! organization: pull requests and issues authored, counted exactly through the issue search,
//! and commits authored, sampled over the most recently updated repositories.
//! Members are sampled by a fixed size pool of workers.
//!
//! Commit counts are approximate. Only the first 25 repositories are inspected and at most 250
//! commits are counted per repository, so a member is credited with at most 6 250 commits.
//! Repositories whose commits cannot be listed (archived, empty, inaccessible) are skipped.
//! Members whose searches fail are dropped from the results and reported as failures.
//!
//! [`leaderboard`] ranks the aggregated members and shapes a dashboard summary.

pub mod api;
pub mod leaderboard;
pub mod model;

#[cfg(feature = "aggregator")]
pub mod catalog;
#[cfg(feature = "aggregator")]
pub mod directory;
#[cfg(feature = "aggregator")]
mod pagination;
#[cfg(feature = "aggregator")]
pub mod sampler;
#[cfg(feature = "aggregator")]
pub mod scheduler;

#[cfg(test)]
mod fake;

#[cfg(feature = "aggregator")]
pub use scheduler::Aggregator;
