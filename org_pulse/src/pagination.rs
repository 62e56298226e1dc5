use crate::api::{Page, Result};
use derive_more::Constructor;
use log::debug;
use std::future::Future;
use std::ops::AddAssign;

pub const FIRST_PAGE_NUMBER: u32 = 1;

/// Ceiling for listings which should otherwise end on their own.
pub const MAX_LISTING_PAGES: u32 = 1000;

#[derive(Constructor)]
pub(crate) struct Paginator {
    page_no: u32,
    per_page: u32,
    remaining_pages: u32,
}

impl Paginator {
    pub(crate) fn listing(per_page: u32, max_pages: u32) -> Self {
        Paginator::new(FIRST_PAGE_NUMBER, per_page, max_pages)
    }

    fn next_page(&mut self) -> Option<u32> {
        if self.remaining_pages == 0 {
            return None;
        }
        let page_no = self.page_no;
        self.page_no.add_assign(1);
        self.remaining_pages -= 1;
        Some(page_no)
    }

    fn observe<T>(&mut self, page: &Page<T>) {
        if page.is_final(self.per_page) {
            self.remaining_pages = 0;
        }
    }

    /// Requests pages through `fetch` until one of them ends the listing, concatenating items in
    /// the order received. The first failing page aborts the whole listing.
    pub(crate) async fn collect<T, F, Fut>(mut self, what: &str, mut fetch: F) -> Result<Vec<T>>
    where
        F: FnMut(u32, u32) -> Fut,
        Fut: Future<Output = Result<Page<T>>>,
    {
        let mut items = Vec::new();
        while let Some(page_no) = self.next_page() {
            let page = fetch(page_no, self.per_page).await?;
            self.observe(&page);
            debug!("Fetched {} {} from page {}", page.items.len(), what, page_no);
            items.extend(page.items);
        }
        Ok(items)
    }
}

#[test]
fn paginator_stops_on_short_page_test() {
    let mut paginator = Paginator::listing(2, 10);
    assert_eq!(paginator.next_page(), Some(1));
    paginator.observe(&Page::new(vec![1, 2], None));
    assert_eq!(paginator.next_page(), Some(2));
    paginator.observe(&Page::new(vec![3], None));
    assert_eq!(paginator.next_page(), None);
}

#[test]
fn paginator_stops_on_marker_test() {
    let mut paginator = Paginator::listing(2, 10);
    assert_eq!(paginator.next_page(), Some(1));
    paginator.observe(&Page::new(vec![1, 2], Some(true)));
    assert_eq!(paginator.next_page(), None);
}

#[test]
fn paginator_respects_ceiling_test() {
    let mut paginator = Paginator::listing(1, 3);
    let mut pages = Vec::new();
    while let Some(page_no) = paginator.next_page() {
        pages.push(page_no);
        paginator.observe(&Page::new(vec![page_no], Some(false)));
    }
    assert_eq!(pages, vec![1, 2, 3]);
}

#[tokio::test]
async fn collect_propagates_failure_test() {
    let result: Result<Vec<u32>> = Paginator::listing(1, 10)
        .collect("things", |page_no, _| async move {
            if page_no == 2 {
                Err(crate::api::Error::Error("boom"))
            } else {
                Ok(Page::new(vec![page_no], None))
            }
        })
        .await;
    assert!(result.is_err(), "a failed page aborts the listing");
}
