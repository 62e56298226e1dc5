//! Repository catalog of an organization.

use crate::api::{Client, Error, RepoType, RepositorySummary, Result};
use crate::pagination::{Paginator, MAX_LISTING_PAGES};

pub const REPOS_PER_PAGE: u32 = 100;

/// Lists every repository of `org`, most recently updated first, in the order the upstream
/// returns them. Any failed page fails the whole listing.
pub async fn list_org_repositories<CLIENT>(
    client: &CLIENT,
    org: &str,
    repo_type: RepoType,
) -> Result<Vec<RepositorySummary>>
where
    CLIENT: Client + ?Sized,
{
    Paginator::listing(REPOS_PER_PAGE, MAX_LISTING_PAGES)
        .collect("repositories", |page, per_page| client.org_repos(org, repo_type, page, per_page))
        .await
        .map_err(|err| Error::listing("repositories", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{repository, FakeClient};
    use std::sync::atomic::Ordering;

    fn client_with_repos(count: usize, last_marker: bool) -> FakeClient {
        FakeClient {
            repos: (0..count).map(|i| repository(&format!("repo_{}", i), i as i64)).collect(),
            last_marker,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn lists_all_pages_in_order() {
        let client = client_with_repos(250, false);
        let repos = list_org_repositories(&client, "org", RepoType::Public).await.unwrap();
        assert_eq!(repos.len(), 250);
        assert_eq!(client.repo_pages.load(Ordering::SeqCst), 3);
        let names: Vec<_> = repos.iter().map(|r| r.name.clone()).collect();
        let expected: Vec<_> = (0..250).map(|i| format!("repo_{}", i)).collect();
        assert_eq!(names, expected);
    }

    #[tokio::test]
    async fn exact_multiple_ends_on_marker() {
        let client = client_with_repos(200, true);
        let repos = list_org_repositories(&client, "org", RepoType::Public).await.unwrap();
        assert_eq!(repos.len(), 200);
        assert_eq!(client.repo_pages.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn exact_multiple_without_marker_ends_on_empty_page() {
        let client = client_with_repos(200, false);
        let repos = list_org_repositories(&client, "org", RepoType::Public).await.unwrap();
        assert_eq!(repos.len(), 200);
        assert_eq!(client.repo_pages.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn empty_org() {
        let client = client_with_repos(0, true);
        let repos = list_org_repositories(&client, "org", RepoType::Public).await.unwrap();
        assert!(repos.is_empty());
        assert_eq!(client.repo_pages.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_page_is_fatal() {
        let client = client_with_repos(10, true);
        let err = list_org_repositories(&client, "", RepoType::Public).await.unwrap_err();
        assert!(matches!(err, Error::Listing { what: "repositories", .. }));
    }
}
