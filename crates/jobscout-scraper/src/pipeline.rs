//! End-to-end crawl: location → listing → (employer expansion) → details.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use jobscout_core::{Category, InputParts};

use crate::cache::EmployerCache;
use crate::client::SiteClient;
use crate::criteria::SearchCriteria;
use crate::enrich::JobDetailEnricher;
use crate::error::CrawlError;
use crate::expand::{jobs_url_from_review_url, EmployerJobExpander};
use crate::listing::{EmployerStub, JobStub, ListItem};
use crate::location::LocationResolver;
use crate::pagination::ListCrawler;
use crate::queue::{QueueSettings, Request, WorkQueue};
use crate::rate_limit::RateLimitPolicy;
use crate::sink::RecordSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlSettings {
    pub rate_limit: RateLimitPolicy,
    pub queue: QueueSettings,
    pub location_candidates: u32,
    pub jobs_per_employer: usize,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            rate_limit: RateLimitPolicy::default(),
            queue: QueueSettings::default(),
            location_candidates: 10,
            jobs_per_employer: 3,
        }
    }
}

impl CrawlSettings {
    #[must_use]
    pub fn from_config(config: &jobscout_core::AppConfig) -> Self {
        Self {
            rate_limit: RateLimitPolicy::from_config(config),
            queue: QueueSettings::from_config(config),
            location_candidates: config.location_candidates,
            jobs_per_employer: config.jobs_per_employer,
        }
    }
}

/// Counters for one finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub category: Category,
    pub budget: usize,
    /// Items kept from the listing pages.
    pub listing_items: usize,
    /// Job stubs before de-duplication.
    pub job_stubs: usize,
    pub unique_jobs: usize,
    pub emitted: usize,
    pub skipped: usize,
    pub cached_employers: usize,
}

/// Runs crawls against one site. The employer profile cache lives as long
/// as the crawler, so use one crawler per run.
pub struct Crawler {
    client: SiteClient,
    settings: CrawlSettings,
    cache: EmployerCache,
}

impl Crawler {
    #[must_use]
    pub fn new(client: SiteClient, settings: CrawlSettings) -> Self {
        Self {
            client,
            settings,
            cache: EmployerCache::new(),
        }
    }

    #[must_use]
    pub fn cache(&self) -> &EmployerCache {
        &self.cache
    }

    /// Runs the whole crawl, pushing each finished record to `sink`.
    ///
    /// Per-item failures (an employer jobs page, a job detail page, an
    /// employer profile) are logged and counted as skipped.
    ///
    /// # Errors
    ///
    /// Fatal failures abort the run: location lookup errors, any listing
    /// pagination error (including an unresolvable budget or exhausted
    /// rate-limit retries), and sink write errors. A sink error stops any
    /// detail fetch that has not started yet.
    pub async fn run(
        &self,
        input: &InputParts,
        sink: &dyn RecordSink,
    ) -> Result<RunSummary, CrawlError> {
        let location = LocationResolver::new(&self.client, self.settings.location_candidates)
            .resolve(&input.location, input.region.as_deref())
            .await?;

        let criteria = SearchCriteria::new(
            input.query.clone(),
            location,
            input.category,
            input.max_results,
        );
        tracing::info!(
            query = criteria.query(),
            category = %criteria.category(),
            max_results = ?criteria.max_results(),
            "starting search"
        );

        let listing = ListCrawler::new(&self.client, self.settings.rate_limit)
            .crawl(&criteria)
            .await?;

        let mut summary = RunSummary {
            category: input.category,
            budget: listing.budget,
            listing_items: listing.items.len(),
            job_stubs: 0,
            unique_jobs: 0,
            emitted: 0,
            skipped: 0,
            cached_employers: 0,
        };

        let mut stubs = Vec::new();
        let mut employers = Vec::new();
        for item in listing.items {
            match item {
                ListItem::Job(job) => stubs.push(job),
                ListItem::Employer(employer) => employers.push(employer),
            }
        }
        if !employers.is_empty() {
            stubs.extend(self.expand_employers(employers).await);
        }

        summary.job_stubs = stubs.len();
        let mut seen = HashSet::new();
        stubs.retain(|stub| seen.insert(stub.id));
        summary.unique_jobs = stubs.len();
        tracing::info!(
            unique = summary.unique_jobs,
            total = summary.job_stubs,
            "found {} unique listings out of {}",
            summary.unique_jobs,
            summary.job_stubs
        );

        if stubs.is_empty() {
            tracing::error!(query = criteria.query(), "no results from search");
            return Ok(summary);
        }

        let (emitted, skipped) = self.enrich_jobs(&stubs, sink).await?;
        summary.emitted = emitted;
        summary.skipped = skipped;
        summary.cached_employers = self.cache.len();

        tracing::info!(
            category = %summary.category,
            budget = summary.budget,
            emitted = summary.emitted,
            skipped = summary.skipped,
            cached_employers = summary.cached_employers,
            "crawl finished"
        );
        Ok(summary)
    }

    /// Turns employer stubs into job stubs, in listing order. Employers
    /// whose jobs page fails contribute nothing.
    async fn expand_employers(&self, employers: Vec<EmployerStub>) -> Vec<JobStub> {
        let mut requests = Vec::with_capacity(employers.len());
        let mut by_key: HashMap<String, (usize, EmployerStub)> = HashMap::new();
        for (position, employer) in employers.into_iter().enumerate() {
            match jobs_url_from_review_url(&employer.review_url) {
                Ok(jobs_url) => {
                    let key = employer.id.to_string();
                    requests.push(Request::new(jobs_url, key.clone()));
                    by_key.entry(key).or_insert((position, employer));
                }
                Err(e) => {
                    tracing::error!(employer_id = employer.id, error = %e, "skipping employer");
                }
            }
        }

        let expander = EmployerJobExpander::new(&self.client, self.settings.jobs_per_employer);
        let queue = WorkQueue::new(requests, self.settings.queue);
        tracing::info!(employers = queue.len(), "expanding employers into jobs");

        let by_key = &by_key;
        let expander = &expander;
        let mut outcomes = queue
            .run(|request| async move {
                let (_, employer) =
                    by_key
                        .get(&request.unique_key)
                        .ok_or_else(|| CrawlError::UnknownListing {
                            key: request.unique_key.clone(),
                        })?;
                expander.expand(employer, &request.url).await
            })
            .await;
        outcomes.sort_by_key(|(request, _)| by_key.get(&request.unique_key).map(|(pos, _)| *pos));

        let mut stubs = Vec::new();
        for (request, outcome) in outcomes {
            match outcome {
                Ok(jobs) => stubs.extend(jobs),
                Err(e) => tracing::error!(
                    employer_id = %request.unique_key,
                    url = %request.url,
                    error = %e,
                    "failed to expand employer"
                ),
            }
        }
        stubs
    }

    /// Fetches details for every stub and pushes finished records to the
    /// sink. Returns `(emitted, skipped)`.
    async fn enrich_jobs(
        &self,
        stubs: &[JobStub],
        sink: &dyn RecordSink,
    ) -> Result<(usize, usize), CrawlError> {
        let index: HashMap<String, &JobStub> =
            stubs.iter().map(|stub| (stub.id.to_string(), stub)).collect();
        let requests = stubs
            .iter()
            .map(|stub| Request::new(stub.url.clone(), stub.id.to_string()));
        let queue = WorkQueue::new(requests, self.settings.queue);

        let enricher = JobDetailEnricher::new(&self.client, &self.cache);
        let index = &index;
        let enricher = &enricher;
        let outcomes = queue
            .run_until(
                |request| async move {
                    let stub = index
                        .get(&request.unique_key)
                        .ok_or_else(|| CrawlError::UnknownListing {
                            key: request.unique_key.clone(),
                        })?;
                    let record = enricher.enrich(stub, &request.url).await?;
                    tracing::info!(listing_id = record.id, "saving job record");
                    sink.push(&record).map_err(CrawlError::Sink)?;
                    Ok::<u64, CrawlError>(record.id)
                },
                |err| matches!(err, CrawlError::Sink(_)),
            )
            .await?;

        let mut emitted = 0;
        let mut skipped = 0;
        for (request, outcome) in outcomes {
            match outcome {
                Ok(_) => emitted += 1,
                Err(e) => {
                    skipped += 1;
                    tracing::error!(
                        listing_id = %request.unique_key,
                        url = %request.url,
                        error = %e,
                        "skipping job"
                    );
                }
            }
        }
        Ok((emitted, skipped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn default_settings_match_config_defaults() {
        let settings = CrawlSettings::default();
        assert_eq!(settings.rate_limit.max_retries, 5);
        assert_eq!(settings.rate_limit.wait, Duration::from_secs(3));
        assert_eq!(settings.location_candidates, 10);
        assert_eq!(settings.jobs_per_employer, 3);
        assert_eq!(settings.queue.concurrency, 4);
    }

    #[test]
    fn summary_serializes_camel_case() {
        let summary = RunSummary {
            category: Category::JobPostings,
            budget: 5,
            listing_items: 5,
            job_stubs: 5,
            unique_jobs: 5,
            emitted: 4,
            skipped: 1,
            cached_employers: 2,
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["listingItems"], 5);
        assert_eq!(value["cachedEmployers"], 2);
    }
}
