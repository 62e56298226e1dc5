//! Member directory of an organization.

use crate::api::{Client, Error, MemberIdentity, Result};
use crate::pagination::{Paginator, MAX_LISTING_PAGES};

pub const MEMBERS_PER_PAGE: u32 = 100;

pub async fn list_org_members<CLIENT>(client: &CLIENT, org: &str) -> Result<Vec<MemberIdentity>>
where
    CLIENT: Client + ?Sized,
{
    Paginator::listing(MEMBERS_PER_PAGE, MAX_LISTING_PAGES)
        .collect("members", |page, per_page| client.org_members(org, page, per_page))
        .await
        .map_err(|err| Error::listing("members", err))
}
