mod args;

pub use args::{Args, Output};

use chrono::Utc;
use github_client::{GithubClient, GithubClientBuilder, RetryPolicy};
use log::info;
use org_pulse::api::Result;
use org_pulse::leaderboard::DashboardSummary;
use org_pulse::model::OrgReport;
use org_pulse::sampler::SamplingBounds;
use org_pulse::Aggregator;
use std::time::Duration;

const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

pub async fn github_client(args: &Args) -> Result<GithubClient> {
    let mut client = GithubClientBuilder::default()
        .with_github_url(&args.api_url)
        .with_timeout(Duration::from_secs(args.timeout_secs))
        .with_retry_policy(RetryPolicy::new(args.max_retries, RETRY_BASE_DELAY));
    if let Some(token) = args.api_token.clone() {
        client = client.try_with_token(token)?;
    } else {
        info!("No API token given, requests are unauthenticated");
    }
    client.build().await
}

pub fn aggregator(args: &Args, client: GithubClient) -> Aggregator<GithubClient> {
    Aggregator::new(client)
        .with_repo_type(args.repo_type)
        .with_concurrency(args.concurrency)
        .with_bounds(SamplingBounds::new(args.max_repos, args.max_pages, args.commits_per_page))
        .with_web_url(&args.web_url)
}

/// Aggregates contributions of every member of `args.org`.
pub async fn aggregate(args: &Args) -> Result<OrgReport> {
    let client = github_client(args).await?;
    aggregator(args, client).aggregate_all(&args.org).await
}

pub async fn dashboard(args: &Args) -> Result<DashboardSummary> {
    let report = aggregate(args).await?;
    Ok(DashboardSummary::assemble(&report, Utc::now()))
}

/// Runs the aggregation selected by `args.output` and renders it as pretty JSON.
pub async fn render(args: &Args) -> Result<String> {
    let json = match args.output {
        Output::Report => serde_json::to_string_pretty(&aggregate(args).await?),
        Output::Dashboard => serde_json::to_string_pretty(&dashboard(args).await?),
    };
    Ok(json.map_err(anyhow::Error::from)?)
}
