use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service overloaded at {url}")]
    Overloaded { url: String },

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no locations found for {text}")]
    NoLocationFound { text: String },

    #[error("failed to parse result count from {raw:?}")]
    BudgetUnresolvable { raw: String },

    #[error("pagination limit reached for {url}: exceeded {max_pages} pages")]
    PaginationLimit { url: String, max_pages: usize },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("review URL {url} carries no employer identifier")]
    InvalidReviewUrl { url: String },

    #[error("missing {what} on {url}")]
    MissingElement { what: &'static str, url: String },

    #[error("job link {href:?} is corrupted: no jobListingId")]
    MissingJobLink { href: Option<String> },

    #[error("structured data block not found on {url}")]
    MissingStructuredData { url: String },

    #[error("listing id {key} not found in search results")]
    UnknownListing { key: String },

    #[error("job description could not be decoded: {reason}")]
    UndecodableDescription { reason: String },

    #[error("output sink error: {0}")]
    Sink(#[source] std::io::Error),
}

impl CrawlError {
    /// Returns `true` for failures worth retrying at the worker-pool level:
    /// network failures, the overload status, and other 5xx responses.
    ///
    /// Parse and lookup failures are deterministic and never retried.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            CrawlError::Http(_) | CrawlError::Overloaded { .. } => true,
            CrawlError::UnexpectedStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overload_and_server_errors_are_transient() {
        assert!(CrawlError::Overloaded {
            url: "https://example.com".to_owned()
        }
        .is_transient());
        assert!(CrawlError::UnexpectedStatus {
            status: 502,
            url: "https://example.com".to_owned()
        }
        .is_transient());
    }

    #[test]
    fn client_errors_and_parse_failures_are_not_transient() {
        assert!(!CrawlError::UnexpectedStatus {
            status: 403,
            url: "https://example.com".to_owned()
        }
        .is_transient());
        assert!(!CrawlError::NotFound {
            url: "https://example.com".to_owned()
        }
        .is_transient());
        assert!(!CrawlError::MissingStructuredData {
            url: "https://example.com".to_owned()
        }
        .is_transient());
        assert!(!CrawlError::BudgetUnresolvable {
            raw: "many".to_owned()
        }
        .is_transient());
    }
}
