//! Employer → job expansion for the company-reviews category.
//!
//! Each employer's jobs page lists job summaries whose title link does not
//! lead to the job itself but to a list page pre-scrolled to that job. The
//! list page's structured data carries the canonical job URL, so every job
//! costs a second fetch.

use std::sync::LazyLock;

use regex::Regex;

use crate::client::SiteClient;
use crate::document::Document;
use crate::error::CrawlError;
use crate::listing::{EmployerStub, JobStub};
use crate::structured::{extract_structured_data, first_list_item_url};

const JOB_SUMMARY: &str = "div.JobsListItemStyles__jobDetailsContainer";
const JOB_TITLE_LINK: &str = ".JobDetailsStyles__jobTitle";
const JOB_DISPLAY_TITLE: &str = ".JobDetailsStyles__iconLink";

const REVIEW_SEGMENT: &str = "Overview/Working-at-";
const JOBS_SEGMENT: &str = "Jobs/";
const REVIEW_ID_MARKER: &str = "-EI_IE";
const JOBS_ID_MARKER: &str = "-Jobs-E";

static JOB_LISTING_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"jobListingId=([^&]+)").expect("valid jobListingId regex"));

/// Rewrites an employer review path into the employer's jobs path.
///
/// | review path | jobs path |
/// |---|---|
/// | `/Overview/Working-at-Web-com-EI_IE12965.11,18.htm` | `/Jobs/Web-com-Jobs-E12965.htm` |
/// | `/Overview/Working-at-Initech-EI_IE40772.htm` | `/Jobs/Initech-Jobs-E40772.htm` |
///
/// The `.11,18` suffix (name offsets inside the slug) is dropped.
///
/// # Errors
///
/// Returns [`CrawlError::InvalidReviewUrl`] when the path carries no
/// `-EI_IE{digits}` employer marker.
pub fn jobs_url_from_review_url(review_url: &str) -> Result<String, CrawlError> {
    let invalid = || CrawlError::InvalidReviewUrl {
        url: review_url.to_owned(),
    };

    let rewritten = review_url.replacen(REVIEW_SEGMENT, JOBS_SEGMENT, 1);
    let marker = rewritten.find(REVIEW_ID_MARKER).ok_or_else(invalid)?;
    let id_start = marker + REVIEW_ID_MARKER.len();
    let id_end = rewritten[id_start..]
        .find('.')
        .map_or(rewritten.len(), |i| id_start + i);

    let employer_id = &rewritten[id_start..id_end];
    if employer_id.is_empty() || !employer_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    Ok(format!(
        "{}{JOBS_ID_MARKER}{employer_id}.htm",
        &rewritten[..marker]
    ))
}

/// Parses the listing id out of a job link's query string.
pub(crate) fn parse_listing_id(href: &str) -> Option<u64> {
    JOB_LISTING_ID
        .captures(href)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
}

/// A job summary from an employer's jobs page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct JobLink {
    pub(crate) listing_id: u64,
    pub(crate) title: String,
    /// Link to the pre-scrolled list page, not to the job itself.
    pub(crate) href: String,
}

/// Parses up to `limit` job summaries. A summary without a usable link is
/// returned as an error in its slot so the caller can log and move on.
pub(crate) fn parse_employer_jobs_page(
    html: &str,
    limit: usize,
) -> Vec<Result<JobLink, CrawlError>> {
    let doc = Document::parse(html);
    doc.select(JOB_SUMMARY)
        .into_iter()
        .take(limit)
        .map(|summary| {
            // An empty match list, not a missing handle, is what signals
            // "no link element".
            let links = summary.select(JOB_TITLE_LINK);
            let Some(link) = links.first() else {
                return Err(CrawlError::MissingJobLink { href: None });
            };
            let href = link.attr("href").filter(|h| !h.trim().is_empty());
            let listing_id = href.as_deref().and_then(parse_listing_id);
            match (href, listing_id) {
                (Some(href), Some(listing_id)) => Ok(JobLink {
                    listing_id,
                    title: summary.text_of(JOB_DISPLAY_TITLE).trim().to_owned(),
                    href: href.trim().to_owned(),
                }),
                (href, _) => Err(CrawlError::MissingJobLink { href }),
            }
        })
        .collect()
}

pub struct EmployerJobExpander<'a> {
    client: &'a SiteClient,
    jobs_per_employer: usize,
}

impl<'a> EmployerJobExpander<'a> {
    #[must_use]
    pub fn new(client: &'a SiteClient, jobs_per_employer: usize) -> Self {
        Self {
            client,
            jobs_per_employer,
        }
    }

    /// Fetches the employer's jobs page at `jobs_url` and turns up to
    /// `jobs_per_employer` summaries into job stubs.
    ///
    /// Jobs with a corrupted link or no structured data are logged and
    /// skipped; the remaining jobs are still returned.
    ///
    /// # Errors
    ///
    /// Returns the fetch error if the jobs page itself cannot be fetched.
    pub async fn expand(
        &self,
        employer: &EmployerStub,
        jobs_url: &str,
    ) -> Result<Vec<JobStub>, CrawlError> {
        let url = self.client.resolve(jobs_url)?;
        let html = self.client.fetch_html(&url).await?;
        let links = parse_employer_jobs_page(&html, self.jobs_per_employer);
        tracing::info!(
            employer_id = employer.id,
            %url,
            jobs = links.len(),
            "preparing jobs for employer"
        );

        let mut stubs = Vec::with_capacity(links.len());
        for link in links {
            let link = match link {
                Ok(link) => link,
                Err(e) => {
                    tracing::error!(employer_id = employer.id, error = %e, "skipping job");
                    continue;
                }
            };
            match self.resolve_job_url(&link).await {
                Ok(job_url) => {
                    tracing::info!(listing_id = link.listing_id, url = %job_url, "queued job for detail fetch");
                    stubs.push(JobStub {
                        id: link.listing_id,
                        employer_name: employer.employer_name.clone(),
                        employer_rating: employer.employer_rating,
                        job_title: link.title,
                        job_location: String::new(),
                        url: job_url,
                        salary: String::new(),
                    });
                }
                Err(e) => {
                    tracing::error!(
                        employer_id = employer.id,
                        listing_id = link.listing_id,
                        error = %e,
                        "skipping job"
                    );
                }
            }
        }
        Ok(stubs)
    }

    /// Follows the pre-scrolled list link and reads the canonical job URL
    /// from its structured data.
    async fn resolve_job_url(&self, link: &JobLink) -> Result<String, CrawlError> {
        let list_url = self.client.resolve(&link.href)?;
        tracing::debug!(url = %list_url, "parsing job list page");
        let html = self.client.fetch_html(&list_url).await?;
        let data = extract_structured_data(&html, list_url.as_str())?;
        first_list_item_url(&data).ok_or_else(|| CrawlError::MissingStructuredData {
            url: list_url.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::is_valid_selector;

    #[test]
    fn selectors_are_valid() {
        for css in [JOB_SUMMARY, JOB_TITLE_LINK, JOB_DISPLAY_TITLE] {
            assert!(is_valid_selector(css), "invalid selector {css}");
        }
    }

    #[test]
    fn rewrites_review_url_with_offsets() {
        assert_eq!(
            jobs_url_from_review_url("/Overview/Working-at-Web-com-EI_IE12965.11,18.htm").unwrap(),
            "/Jobs/Web-com-Jobs-E12965.htm"
        );
    }

    #[test]
    fn rewrites_review_url_without_offsets() {
        assert_eq!(
            jobs_url_from_review_url("/Overview/Working-at-Initech-EI_IE40772.htm").unwrap(),
            "/Jobs/Initech-Jobs-E40772.htm"
        );
    }

    #[test]
    fn keeps_dots_in_the_employer_slug() {
        assert_eq!(
            jobs_url_from_review_url("/Overview/Working-at-Booking.com-EI_IE256219.11,22.htm")
                .unwrap(),
            "/Jobs/Booking.com-Jobs-E256219.htm"
        );
    }

    #[test]
    fn rejects_review_url_without_employer_marker() {
        let err = jobs_url_from_review_url("/Overview/Working-at-Nowhere.htm").unwrap_err();
        assert!(matches!(err, CrawlError::InvalidReviewUrl { .. }));
        let err = jobs_url_from_review_url("/Overview/Working-at-Bad-EI_IE.htm").unwrap_err();
        assert!(matches!(err, CrawlError::InvalidReviewUrl { .. }));
    }

    #[test]
    fn parses_listing_id_from_query() {
        assert_eq!(
            parse_listing_id("/job-listing/list.htm?pos=101&jobListingId=3456789&ao=1"),
            Some(3_456_789)
        );
        assert_eq!(parse_listing_id("/job-listing/list.htm?pos=101"), None);
        assert_eq!(parse_listing_id("/x?jobListingId=abc"), None);
    }

    const EMPLOYER_JOBS: &str = r#"
    <html><body>
      <div class="JobsListItemStyles__jobDetailsContainer">
        <a class="JobDetailsStyles__jobTitle" href="/Job/list.htm?jobListingId=501&pos=1">x</a>
        <a class="JobDetailsStyles__iconLink"> Platform Engineer </a>
      </div>
      <div class="JobsListItemStyles__jobDetailsContainer">
        <span class="JobDetailsStyles__iconLink">No link</span>
      </div>
      <div class="JobsListItemStyles__jobDetailsContainer">
        <a class="JobDetailsStyles__jobTitle" href="/Job/list.htm?pos=3">x</a>
        <a class="JobDetailsStyles__iconLink">Corrupted</a>
      </div>
      <div class="JobsListItemStyles__jobDetailsContainer">
        <a class="JobDetailsStyles__jobTitle" href="/Job/list.htm?jobListingId=504">x</a>
        <a class="JobDetailsStyles__iconLink">Over the cap</a>
      </div>
    </body></html>
    "#;

    #[test]
    fn parses_job_summaries_up_to_limit() {
        let links = parse_employer_jobs_page(EMPLOYER_JOBS, 3);
        assert_eq!(links.len(), 3);

        let first = links[0].as_ref().unwrap();
        assert_eq!(first.listing_id, 501);
        assert_eq!(first.title, "Platform Engineer");
        assert_eq!(first.href, "/Job/list.htm?jobListingId=501&pos=1");

        assert!(matches!(
            links[1],
            Err(CrawlError::MissingJobLink { href: None })
        ));
        assert!(matches!(
            links[2],
            Err(CrawlError::MissingJobLink { href: Some(_) })
        ));
    }

    #[test]
    fn limit_larger_than_page_returns_all() {
        let links = parse_employer_jobs_page(EMPLOYER_JOBS, 10);
        assert_eq!(links.len(), 4);
        assert_eq!(links[3].as_ref().unwrap().listing_id, 504);
    }
}
