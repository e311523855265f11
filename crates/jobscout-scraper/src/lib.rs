pub mod cache;
pub mod client;
pub mod criteria;
pub mod enrich;
pub mod error;
pub mod expand;
pub mod listing;
pub mod location;
pub mod pagination;
pub mod pipeline;
pub mod queue;
pub mod rate_limit;
pub mod record;
pub mod sink;

mod document;
mod parse_helpers;
mod structured;

pub use cache::{EmployerCache, EmployerProfile};
pub use client::SiteClient;
pub use criteria::SearchCriteria;
pub use enrich::{clean_description, JobDetailEnricher, JobPosting};
pub use error::CrawlError;
pub use expand::{jobs_url_from_review_url, EmployerJobExpander};
pub use listing::{EmployerStub, JobStub, ListItem};
pub use location::{select_location, LocationFragment, LocationMatch, LocationResolver};
pub use pagination::{ListCrawl, ListCrawler};
pub use pipeline::{CrawlSettings, Crawler, RunSummary};
pub use queue::{QueueSettings, Request, WorkQueue};
pub use rate_limit::RateLimitPolicy;
pub use record::{merge_record, JobRecord};
pub use sink::{MemorySink, RecordSink};

pub use jobscout_core::Category;
