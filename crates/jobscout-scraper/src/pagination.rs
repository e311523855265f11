//! Sequential listing pagination with a result budget.
//!
//! States:
//!
//! ```text
//! NeedBudget ─► Fetching ─► Accumulated ─► Fetching … ─► Done
//!                  │  ▲
//!                  ▼  │
//!              RateLimited
//! ```
//!
//! The budget is either the caller's limit or, when unset, the total count
//! scraped from the first page. Every page contributes
//! `min(new page items, remaining budget)` items, where ids already seen
//! earlier in the crawl are not new; the crawl stops when there is no next
//! link or the budget is met. Pages are fetched strictly one after another
//! since each URL comes from the previous page. Overload retries draw on one
//! budget for the whole crawl.

use std::collections::HashSet;

use reqwest::Url;

use crate::client::SiteClient;
use crate::criteria::SearchCriteria;
use crate::error::CrawlError;
use crate::listing::{parse_listing_page, parse_total_count, ListItem};
use crate::rate_limit::{retry_on_overload, RateLimitPolicy};

/// Hard stop for a next link that never runs out.
pub const MAX_PAGES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Budget {
    NeedBudget,
    Resolved(usize),
}

/// Finished pagination: the accumulated items, in page order, and the
/// budget they were bounded by.
#[derive(Debug, Clone, PartialEq)]
pub struct ListCrawl {
    pub items: Vec<ListItem>,
    pub budget: usize,
    pub pages: usize,
}

pub struct ListCrawler<'a> {
    client: &'a SiteClient,
    policy: RateLimitPolicy,
}

impl<'a> ListCrawler<'a> {
    #[must_use]
    pub fn new(client: &'a SiteClient, policy: RateLimitPolicy) -> Self {
        Self { client, policy }
    }

    /// Walks the listing for `criteria` until the budget is met or the
    /// pages run out.
    ///
    /// # Errors
    ///
    /// Every error here is fatal to the run:
    /// - [`CrawlError::BudgetUnresolvable`] when no limit was given and the
    ///   first page has no positive count.
    /// - [`CrawlError::Overloaded`] once the crawl's rate-limit retries are
    ///   used up.
    /// - Any other fetch failure, unretried.
    /// - [`CrawlError::PaginationLimit`] after [`MAX_PAGES`] pages.
    pub async fn crawl(&self, criteria: &SearchCriteria) -> Result<ListCrawl, CrawlError> {
        let category = criteria.category();
        let mut url: Url = criteria.first_page_url(self.client.base_url())?;
        let mut budget = match criteria.max_results() {
            Some(limit) => Budget::Resolved(usize::try_from(limit).unwrap_or(usize::MAX)),
            None => Budget::NeedBudget,
        };
        let mut items: Vec<ListItem> = Vec::new();
        let mut seen: HashSet<u64> = HashSet::new();
        let mut overload_retries = 0u32;
        let mut page = 0usize;

        loop {
            page += 1;
            if page > MAX_PAGES {
                return Err(CrawlError::PaginationLimit {
                    url: url.to_string(),
                    max_pages: MAX_PAGES,
                });
            }

            tracing::info!(page, %url, "GET listing page");
            let html = retry_on_overload(&self.policy, &mut overload_retries, || {
                self.client.fetch_html(&url)
            })
            .await?;

            let limit = match budget {
                Budget::Resolved(limit) => limit,
                Budget::NeedBudget => {
                    let total = parse_total_count(category, &html)?;
                    tracing::info!(max_results = total, "parsed result budget from first page");
                    budget = Budget::Resolved(total);
                    total
                }
            };

            let listing = parse_listing_page(category, &html, self.client.base_url());
            let remaining = limit.saturating_sub(items.len());
            let found = listing.items.len();
            let fresh: Vec<ListItem> = listing
                .items
                .into_iter()
                .filter(|item| {
                    let new = seen.insert(item.id());
                    if !new {
                        tracing::warn!(page, id = item.id(), "dropping repeated listing id");
                    }
                    new
                })
                .collect();
            let kept = fresh.len().min(remaining);
            items.extend(fresh.into_iter().take(remaining));

            tracing::info!(
                page,
                found,
                kept,
                total = items.len(),
                next_page = listing.next_page.as_deref().unwrap_or(""),
                "listing page parsed"
            );

            match listing.next_page {
                Some(href) if items.len() < limit => url = self.client.resolve(&href)?,
                _ => {
                    return Ok(ListCrawl {
                        items,
                        budget: limit,
                        pages: page,
                    })
                }
            }
        }
    }
}
