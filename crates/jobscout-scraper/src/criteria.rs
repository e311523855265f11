use reqwest::Url;

use jobscout_core::Category;

use crate::client::resolve_against;
use crate::error::CrawlError;
use crate::location::LocationFragment;

/// Listing path for a category. Only jobs and companies are searched; the
/// site's salary and interview searches do not fit the record model.
#[must_use]
pub fn search_path(category: Category) -> &'static str {
    match category {
        Category::JobPostings => "/Job/jobs.htm",
        Category::EmployerReviews => "/Reviews/company-reviews.htm",
    }
}

/// Immutable description of one search run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    query: String,
    location: LocationFragment,
    category: Category,
    max_results: Option<u32>,
}

impl SearchCriteria {
    /// `max_results` of `None` or `Some(0)` means the budget is read from the
    /// first listing page.
    #[must_use]
    pub fn new(
        query: impl Into<String>,
        location: LocationFragment,
        category: Category,
        max_results: Option<u32>,
    ) -> Self {
        Self {
            query: query.into(),
            location,
            category,
            max_results: max_results.filter(|n| *n > 0),
        }
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn location(&self) -> &LocationFragment {
        &self.location
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn max_results(&self) -> Option<u32> {
        self.max_results
    }

    /// `{path}?sc.keyword={query}&locT=..&locId=..&locKeyword=..&srs=RECENT_SEARCHES`
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::InvalidUrl`] if the path cannot be joined to `base`.
    pub fn first_page_url(&self, base: &Url) -> Result<Url, CrawlError> {
        let mut url = resolve_against(base, search_path(self.category))?;
        url.query_pairs_mut().append_pair("sc.keyword", &self.query);
        self.location.append_to(&mut url);
        url.query_pairs_mut().append_pair("srs", "RECENT_SEARCHES");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::LocationMatch;

    fn base() -> Url {
        Url::parse("https://www.glassdoor.com").unwrap()
    }

    #[test]
    fn job_search_url_without_location() {
        let criteria = SearchCriteria::new(
            "engineer",
            LocationFragment::empty(),
            Category::JobPostings,
            Some(5),
        );
        assert_eq!(
            criteria.first_page_url(&base()).unwrap().as_str(),
            "https://www.glassdoor.com/Job/jobs.htm?sc.keyword=engineer&srs=RECENT_SEARCHES"
        );
    }

    #[test]
    fn company_search_url_with_location_and_encoded_query() {
        let austin = LocationMatch {
            location_type: "C".to_owned(),
            location_id: 1_139_761,
            long_name: "Austin, TX (US)".to_owned(),
        };
        let criteria = SearchCriteria::new(
            "data & ml",
            LocationFragment::new(&austin, "Austin"),
            Category::EmployerReviews,
            None,
        );
        assert_eq!(
            criteria.first_page_url(&base()).unwrap().as_str(),
            "https://www.glassdoor.com/Reviews/company-reviews.htm?sc.keyword=data+%26+ml&locT=C&locId=1139761&locKeyword=Austin&srs=RECENT_SEARCHES"
        );
    }

    #[test]
    fn zero_max_results_means_unset() {
        let criteria =
            SearchCriteria::new("q", LocationFragment::empty(), Category::JobPostings, Some(0));
        assert_eq!(criteria.max_results(), None);
    }
}
