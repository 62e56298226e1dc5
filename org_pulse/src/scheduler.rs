use crate::api::{Client, MemberIdentity, RepoType, RepositorySummary, Result};
use crate::catalog::list_org_repositories;
use crate::directory::list_org_members;
use crate::model::{MemberFailure, MemberStats, OrgReport};
use crate::sampler::{ContributionSampler, SamplingBounds, DEFAULT_WEB_URL};
use futures::future::join_all;
use log::{error, info, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;

pub const DEFAULT_CONCURRENCY: usize = 4;

type MemberOutcome = std::result::Result<MemberStats, MemberFailure>;

/// Aggregates the contributions of every member of an organization.
pub struct Aggregator<CLIENT>
where
    CLIENT: Client,
{
    client: Arc<CLIENT>,
    repo_type: RepoType,
    concurrency: usize,
    bounds: SamplingBounds,
    web_url: String,
}

impl<CLIENT> Aggregator<CLIENT>
where
    CLIENT: 'static + Client,
{
    pub fn new(client: CLIENT) -> Self {
        Aggregator {
            client: Arc::new(client),
            repo_type: RepoType::default(),
            concurrency: DEFAULT_CONCURRENCY,
            bounds: SamplingBounds::default(),
            web_url: DEFAULT_WEB_URL.to_string(),
        }
    }

    /// Number of members sampled at the same time, at least one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_repo_type(mut self, repo_type: RepoType) -> Self {
        self.repo_type = repo_type;
        self
    }

    pub fn with_bounds(mut self, bounds: SamplingBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_web_url<STR: AsRef<str>>(mut self, web_url: STR) -> Self {
        self.web_url = web_url.as_ref().to_string();
        self
    }

    /// Lists members and repositories of `org` once, then samples every member.
    ///
    /// Only listing failures are returned as errors. Members whose sampling fails are logged and
    /// reported in [`OrgReport::failures`].
    pub async fn aggregate_all(&self, org: &str) -> Result<OrgReport> {
        let (members, repositories) = tokio::try_join!(
            list_org_members(self.client.as_ref(), org),
            list_org_repositories(self.client.as_ref(), org, self.repo_type),
        )?;
        info!(
            "Aggregating {} members of {} over {} repositories",
            members.len(),
            org,
            repositories.len()
        );

        let members = Arc::new(members);
        let repositories = Arc::new(repositories);
        let outcomes = self.sample_all(org, members.clone(), repositories.clone()).await;

        let attempted = outcomes.len();
        let mut stats = Vec::with_capacity(attempted);
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(member) => stats.push(member),
                Err(failure) => failures.push(failure),
            }
        }
        info!(
            "Aggregated {} of {} members of {}, {} dropped",
            stats.len(),
            attempted,
            org,
            failures.len()
        );

        Ok(OrgReport {
            org: org.to_string(),
            repositories: Arc::try_unwrap(repositories).unwrap_or_else(|shared| shared.as_ref().clone()),
            members: stats,
            failures,
            attempted,
        })
    }

    /// Runs the worker pool. Workers claim member indexes from a shared counter and hand their
    /// outcome to this single collector, which returns one outcome per member in member order.
    async fn sample_all(
        &self,
        org: &str,
        members: Arc<Vec<MemberIdentity>>,
        repositories: Arc<Vec<RepositorySummary>>,
    ) -> Vec<MemberOutcome> {
        let sampler = Arc::new(
            ContributionSampler::new(self.client.clone())
                .with_bounds(self.bounds)
                .with_web_url(&self.web_url),
        );
        let workers = self.concurrency.min(members.len());
        let next = Arc::new(AtomicUsize::new(0));
        let (sender, mut receiver) = tokio::sync::mpsc::channel::<(usize, MemberOutcome)>(workers.max(1));

        let handles: Vec<JoinHandle<()>> = (0..workers)
            .map(|_| {
                tokio::spawn(Self::worker(
                    org.to_string(),
                    sampler.clone(),
                    members.clone(),
                    repositories.clone(),
                    next.clone(),
                    sender.clone(),
                ))
            })
            .collect();
        drop(sender);

        let mut outcomes: Vec<Option<MemberOutcome>> = (0..members.len()).map(|_| None).collect();
        while let Some((index, outcome)) = receiver.recv().await {
            outcomes[index] = Some(outcome);
        }
        for result in join_all(handles).await {
            if let Err(err) = result {
                error!("Aggregation worker failed: {}", err);
            }
        }

        outcomes
            .into_iter()
            .zip(members.iter())
            .map(|(outcome, member)| {
                outcome.unwrap_or_else(|| {
                    warn!("Dropping member {}: sampling did not complete", member.login);
                    Err(MemberFailure::new(
                        member.login.clone(),
                        "sampling did not complete".to_string(),
                    ))
                })
            })
            .collect()
    }

    async fn worker(
        org: String,
        sampler: Arc<ContributionSampler<CLIENT>>,
        members: Arc<Vec<MemberIdentity>>,
        repositories: Arc<Vec<RepositorySummary>>,
        next: Arc<AtomicUsize>,
        sender: Sender<(usize, MemberOutcome)>,
    ) {
        loop {
            let index = next.fetch_add(1, Ordering::SeqCst);
            let member = match members.get(index) {
                Some(member) => member,
                None => break,
            };
            let outcome = sampler
                .sample_member(&org, &member.login, &repositories)
                .await
                .map_err(|err| {
                    warn!("Dropping member {}: {}", member.login, err);
                    MemberFailure::new(member.login.clone(), err.to_string())
                });
            if let Err(err) = sender.send((index, outcome)).await {
                error!("Failed to collect sampled member: {}", err);
                break;
            }
        }
    }
}
