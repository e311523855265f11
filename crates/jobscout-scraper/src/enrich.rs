//! Job detail pages and the employer profiles behind them.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use reqwest::Url;

use crate::cache::{EmployerCache, EmployerProfile};
use crate::client::SiteClient;
use crate::document::{fragment_text, Document};
use crate::error::CrawlError;
use crate::listing::JobStub;
use crate::record::{merge_record, JobRecord};
use crate::structured::{job_posting_node, structured_data_in};

const EMPLOYER_HERO: &str = "#EmpHero";
const PROFILE_LINK: &str = "div.logo.cell a";
const BASIC_INFO_ENTRY: &str = "#EmpBasicInfo div.infoEntity";
const INFO_LABEL: &str = "label";
const INFO_VALUE: &str = "span";

/// The fields of a `JobPosting` structured-data node the record uses.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub estimated_salary: Option<Value>,
    #[serde(default)]
    pub job_location: Option<Value>,
    #[serde(default)]
    pub hiring_organization: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub date_posted: Option<Value>,
}

#[derive(Debug)]
pub(crate) struct DetailPage {
    pub(crate) posting: JobPosting,
    pub(crate) employer_id: Option<String>,
    pub(crate) profile_href: Option<String>,
}

pub(crate) fn parse_detail_page(html: &str, url: &str) -> Result<DetailPage, CrawlError> {
    let doc = Document::parse(html);
    let data = structured_data_in(&doc, url)?;
    let node = job_posting_node(&data).ok_or_else(|| CrawlError::MissingStructuredData {
        url: url.to_owned(),
    })?;
    let posting: JobPosting =
        serde_json::from_value(node.clone()).map_err(|source| CrawlError::Deserialize {
            context: format!("job posting on {url}"),
            source,
        })?;

    let employer_id = doc
        .first(EMPLOYER_HERO)
        .and_then(|hero| hero.data("employer-id"))
        .map(|id| id.trim().to_owned())
        .filter(|id| !id.is_empty());
    let profile_href = doc
        .attr(PROFILE_LINK, "href")
        .map(|href| href.trim().to_owned())
        .filter(|href| !href.is_empty());

    Ok(DetailPage {
        posting,
        employer_id,
        profile_href,
    })
}

/// Reads the label/value pairs of an employer overview page. Entries with
/// an empty label or value are dropped.
pub(crate) fn parse_employer_profile(html: &str) -> EmployerProfile {
    let doc = Document::parse(html);
    doc.select(BASIC_INFO_ENTRY)
        .into_iter()
        .filter_map(|entry| {
            let label = entry.text_of(INFO_LABEL).trim().to_owned();
            let value = entry.text_of(INFO_VALUE).trim().to_owned();
            (!label.is_empty() && !value.is_empty()).then_some((label, value))
        })
        .collect()
}

/// Turns a structured `description` into plain text.
///
/// The site ships the description as entity-encoded HTML, so it is decoded
/// once and then stripped of markup. A missing description is empty text.
///
/// # Errors
///
/// Returns [`CrawlError::UndecodableDescription`] when the value is not a
/// string.
pub fn clean_description(description: Option<&Value>) -> Result<String, CrawlError> {
    match description {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(encoded)) => {
            let markup = fragment_text(encoded);
            Ok(fragment_text(&markup).trim().to_owned())
        }
        Some(other) => Err(CrawlError::UndecodableDescription {
            reason: format!("expected a string, found {}", json_kind(other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Fetches a job's detail page and its employer's profile, and merges both
/// into a [`JobRecord`].
///
/// Profiles are fetched at most once per employer per run through the
/// shared [`EmployerCache`].
pub struct JobDetailEnricher<'a> {
    client: &'a SiteClient,
    cache: &'a EmployerCache,
}

impl<'a> JobDetailEnricher<'a> {
    #[must_use]
    pub fn new(client: &'a SiteClient, cache: &'a EmployerCache) -> Self {
        Self { client, cache }
    }

    /// # Errors
    ///
    /// Returns an error when the detail page cannot be fetched or lacks
    /// structured data, when it carries no employer id, or when the
    /// employer profile cannot be fetched on a cache miss.
    pub async fn enrich(&self, stub: &JobStub, detail_url: &str) -> Result<JobRecord, CrawlError> {
        let url = self.client.resolve(detail_url)?;
        tracing::info!(listing_id = stub.id, %url, "fetching job details");
        let html = self.client.fetch_html(&url).await?;
        let page = parse_detail_page(&html, url.as_str())?;

        let job_details = match clean_description(page.posting.description.as_ref()) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(listing_id = stub.id, error = %e, "keeping raw job description");
                page.posting
                    .description
                    .as_ref()
                    .map(Value::to_string)
                    .unwrap_or_default()
            }
        };

        let employer_id = page
            .employer_id
            .as_deref()
            .ok_or_else(|| CrawlError::MissingElement {
                what: "employer id",
                url: url.to_string(),
            })?;
        let profile = self
            .employer_profile(employer_id, page.profile_href.as_deref(), &url)
            .await?;

        Ok(merge_record(stub, &page.posting, job_details, &profile))
    }

    /// Returns the cached profile for `employer_id`, fetching it from
    /// `profile_href` on a miss.
    async fn employer_profile(
        &self,
        employer_id: &str,
        profile_href: Option<&str>,
        page_url: &Url,
    ) -> Result<Arc<EmployerProfile>, CrawlError> {
        if let Some(profile) = self.cache.get(employer_id) {
            tracing::debug!(employer_id, "employer profile cache hit");
            return Ok(profile);
        }

        let href = profile_href.ok_or_else(|| CrawlError::MissingElement {
            what: "employer profile link",
            url: page_url.to_string(),
        })?;
        let url = self.client.resolve(href)?;
        self.cache
            .get_or_fetch(employer_id, || async {
                tracing::info!(employer_id, %url, "employer profile cache miss, fetching overview");
                let html = self.client.fetch_html(&url).await?;
                Ok::<_, CrawlError>(parse_employer_profile(&html))
            })
            .await
    }
}
