//! Listing-page parsing for both categories.
//!
//! A listing page yields zero or more list items plus an optional link to
//! the next page. Items that lack an id or a link are skipped with a
//! warning; everything else is best effort (empty strings, `None` ratings).

use reqwest::Url;
use serde::Serialize;

use jobscout_core::Category;

use crate::client::resolve_against;
use crate::document::{Document, Node};
use crate::error::CrawlError;
use crate::parse_helpers::{parse_count, parse_leading_float};

const NEXT_PAGE_LINK: &str = "#FooterPageNav li.next a";

const JOB_ITEM: &str = "li.jl";
const JOB_EMPLOYER: &str = "div.jobInfoItem.jobEmpolyerName";
const JOB_RATING: &str = "span.compactStars";
const JOB_LOCATION: &str = "span.subtle.loc";
const JOB_SALARY: &str = "span.salaryText";
const JOB_COUNT: &str = "p.jobsCount";

const EMPLOYER_ITEM: &str = "div.eiHdrModule";
const EMPLOYER_LINK: &str = "div.margBotXs a";
const EMPLOYER_RATING: &str = "span.bigRating.strong.margRtSm.h1";
const EMPLOYER_COUNT: &str = "div.count.margBot.floatLt.tightBot strong";

const ANCHOR: &str = "a";

/// One job as seen on a listing page (or expanded from an employer page).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStub {
    pub id: u64,
    pub employer_name: String,
    /// `None` when the page shows no rating.
    pub employer_rating: Option<f64>,
    pub job_title: String,
    pub job_location: String,
    /// Absolute detail-page URL.
    pub url: String,
    pub salary: String,
}

/// One employer from the company-reviews listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerStub {
    pub id: u64,
    pub employer_name: String,
    pub employer_rating: Option<f64>,
    /// Site-relative review page path, e.g.
    /// `/Overview/Working-at-Web-com-EI_IE12965.11,18.htm`.
    pub review_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListItem {
    Job(JobStub),
    Employer(EmployerStub),
}

impl ListItem {
    #[must_use]
    pub fn id(&self) -> u64 {
        match self {
            ListItem::Job(job) => job.id,
            ListItem::Employer(employer) => employer.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListingPage {
    pub items: Vec<ListItem>,
    /// Raw `href` of the next-page link; `None` on the last page.
    pub next_page: Option<String>,
}

/// Parses one listing page of `category`. Relative job links are resolved
/// against `base`.
#[must_use]
pub fn parse_listing_page(category: Category, html: &str, base: &Url) -> ListingPage {
    let doc = Document::parse(html);

    let items = match category {
        Category::JobPostings => doc
            .select(JOB_ITEM)
            .iter()
            .filter_map(|el| parse_job_item(el, base).map(ListItem::Job))
            .collect(),
        Category::EmployerReviews => doc
            .select(EMPLOYER_ITEM)
            .iter()
            .filter_map(|el| parse_employer_item(el).map(ListItem::Employer))
            .collect(),
    };

    let next_page = doc
        .attr(NEXT_PAGE_LINK, "href")
        .map(|href| href.trim().to_owned())
        .filter(|href| !href.is_empty());

    ListingPage { items, next_page }
}

/// Reads the total result count from the category's summary element.
///
/// # Errors
///
/// Returns [`CrawlError::BudgetUnresolvable`] unless the element holds a
/// positive integer.
pub fn parse_total_count(category: Category, html: &str) -> Result<usize, CrawlError> {
    let doc = Document::parse(html);
    let raw = match category {
        Category::JobPostings => doc.text(JOB_COUNT),
        Category::EmployerReviews => doc
            .select(EMPLOYER_COUNT)
            .last()
            .map(Node::text)
            .unwrap_or_default(),
    };
    parse_count(&raw).ok_or(CrawlError::BudgetUnresolvable { raw })
}

fn parse_id(el: &Node<'_>, data_name: &str) -> Option<u64> {
    let raw = el.data(data_name);
    let id = raw.as_deref().and_then(|s| s.trim().parse::<u64>().ok());
    if id.is_none() {
        tracing::warn!(raw = ?raw, attribute = data_name, "skipping list item without a numeric id");
    }
    id
}

fn parse_job_item(el: &Node<'_>, base: &Url) -> Option<JobStub> {
    let id = parse_id(el, "id")?;
    let anchors = el.select(ANCHOR);

    let href = anchors.first().and_then(|a| a.attr("href"));
    let url = match href.as_deref().map(|h| resolve_against(base, h)) {
        Some(Ok(url)) => url.to_string(),
        Some(Err(e)) => {
            tracing::warn!(id, error = %e, "skipping job with unusable link");
            return None;
        }
        None => {
            tracing::warn!(id, "skipping job without a link");
            return None;
        }
    };

    Some(JobStub {
        id,
        employer_name: el.text_of(JOB_EMPLOYER),
        employer_rating: parse_leading_float(&el.text_of(JOB_RATING)),
        job_title: anchors.last().map(Node::text).unwrap_or_default(),
        // The location cell's wrapper also carries "hot"/"easy apply" badges.
        job_location: el.text_of(JOB_LOCATION),
        url,
        salary: el.text_of(JOB_SALARY).trim().to_owned(),
    })
}

fn parse_employer_item(el: &Node<'_>) -> Option<EmployerStub> {
    let id = parse_id(el, "emp-id")?;
    let Some(review_url) = el.attr_of(EMPLOYER_LINK, "href") else {
        tracing::warn!(id, "skipping employer without a review link");
        return None;
    };

    Some(EmployerStub {
        id,
        employer_name: el.text_of(EMPLOYER_LINK).trim().to_owned(),
        employer_rating: parse_leading_float(&el.text_of(EMPLOYER_RATING)),
        review_url: review_url.trim().to_owned(),
    })
}

#[cfg(test)]
#[path = "listing_test.rs"]
mod tests;
