use clap::Parser;
use org_pulse::api::RepoType;
use secrecy::SecretString;
use std::{fmt::Display, str::FromStr};
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Output {
    /// Raw aggregation: repositories, member stats and dropped members
    Report,
    /// Ranked leaderboard with totals and recent activity
    Dashboard,
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// GitHub organization
    #[clap(short, long, env = "GITHUB_ORG")]
    pub org: String,

    /// API OAuth access token
    #[clap(short, long, env = "GITHUB_TOKEN")]
    pub api_token: Option<SecretString>,

    /// Repository API URL
    #[clap(long, env, default_value = "https://api.github.com")]
    pub api_url: String,

    /// Web URL used to build avatar and profile links of unresolved members
    #[clap(long, env, default_value = "https://github.com")]
    pub web_url: String,

    /// Organization repositories to include: all, public, private, forks, sources or member
    #[clap(long, env, default_value = "public")]
    pub repo_type: RepoType,

    /// Members sampled in parallel
    #[clap(short, long, env, default_value_t = 4, parse(try_from_str=concurrency_in_range))]
    pub concurrency: usize,

    /// Most recently updated repositories sampled for commits
    #[clap(long, env, default_value_t = 25, parse(try_from_str=max_repos_in_range))]
    pub max_repos: usize,

    /// Commit pages requested per sampled repository
    #[clap(long, env, default_value_t = 5, parse(try_from_str=max_pages_in_range))]
    pub max_pages: u32,

    /// Commits per page
    #[clap(long, env, default_value_t = 50, parse(try_from_str=commits_per_page_in_range))]
    pub commits_per_page: u32,

    /// Timeout of a single API request in seconds
    #[clap(long, env, default_value_t = 30, parse(try_from_str=timeout_in_range))]
    pub timeout_secs: u64,

    /// Retries of an API request failing with a transient error
    #[clap(long, env, default_value_t = 3)]
    pub max_retries: u32,

    /// Output: report or dashboard
    #[clap(long, env, default_value = "dashboard")]
    pub output: Output,
}

fn concurrency_in_range(value: &str) -> clap::Result<usize, String> {
    number_in_range(value, 1, 64, "concurrency".to_string())
}

fn max_repos_in_range(value: &str) -> clap::Result<usize, String> {
    number_in_range(value, 0, usize::MAX, "max_repos".to_string())
}

fn max_pages_in_range(value: &str) -> clap::Result<u32, String> {
    number_in_range(value, 1, u32::MAX, "max_pages".to_string())
}

fn commits_per_page_in_range(value: &str) -> clap::Result<u32, String> {
    // GitHub caps `per_page` at 100
    number_in_range(value, 1, 100, "commits_per_page".to_string())
}

fn timeout_in_range(value: &str) -> clap::Result<u64, String> {
    number_in_range(value, 1, u64::MAX, "timeout_secs".to_string())
}

fn number_in_range<T>(value: &str, min: T, max: T, name: String) -> clap::Result<T, String>
where
    T: FromStr + PartialOrd + Display,
    <T as FromStr>::Err: Display,
{
    value.parse::<T>().map_err(|err| format!("{}", err)).and_then(|value| {
        if value < min || value > max {
            return Err(format!("{} is not in range {} .. {}.", name, min, max));
        }
        Ok(value)
    })
}
