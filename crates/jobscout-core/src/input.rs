//! Run input as supplied by the caller (CLI flags or an input JSON file).
//!
//! ```json
//! {"query": "engineer", "location": "Austin", "locationState": "TX",
//!  "category": "Jobs", "maxResults": "25"}
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::InputError;

/// The two record categories the crawler understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    JobPostings,
    EmployerReviews,
}

impl Category {
    /// `"Companies"` selects employer reviews; every other value means jobs.
    #[must_use]
    pub fn from_input(raw: Option<&str>) -> Self {
        match raw {
            Some("Companies") => Self::EmployerReviews,
            _ => Self::JobPostings,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::JobPostings => write!(f, "Jobs"),
            Category::EmployerReviews => write!(f, "Companies"),
        }
    }
}

/// `maxResults` arrives either as a JSON number or as a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaxResults {
    Number(i64),
    Text(String),
}

impl MaxResults {
    /// Normalizes to a positive limit, or `None` when the budget should be
    /// derived from the first listing page (zero, negative, or blank).
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidMaxResults`] for non-numeric strings.
    pub fn limit(&self) -> Result<Option<u32>, InputError> {
        let value = match self {
            MaxResults::Number(n) => *n,
            MaxResults::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                trimmed
                    .parse::<i64>()
                    .map_err(|_| InputError::InvalidMaxResults(s.clone()))?
            }
        };
        if value <= 0 {
            return Ok(None);
        }
        Ok(Some(u32::try_from(value).unwrap_or(u32::MAX)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlInput {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Region hint, e.g. `"TX"`; matched against `", TX ("` in location names.
    #[serde(default)]
    pub location_state: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub max_results: Option<MaxResults>,
}

/// Validated input, ready to become search criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputParts {
    pub query: String,
    pub location: String,
    pub region: Option<String>,
    pub category: Category,
    pub max_results: Option<u32>,
}

impl CrawlInput {
    /// Reads an input JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Read`] or [`InputError::Parse`].
    pub fn from_file(path: &Path) -> Result<Self, InputError> {
        let raw = std::fs::read_to_string(path).map_err(|source| InputError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| InputError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Overlays every field that is set in `other` onto `self`.
    #[must_use]
    pub fn merged_with(mut self, other: CrawlInput) -> Self {
        if other.query.is_some() {
            self.query = other.query;
        }
        if other.location.is_some() {
            self.location = other.location;
        }
        if other.location_state.is_some() {
            self.location_state = other.location_state;
        }
        if other.category.is_some() {
            self.category = other.category;
        }
        if other.max_results.is_some() {
            self.max_results = other.max_results;
        }
        self
    }

    /// Validates the input.
    ///
    /// # Errors
    ///
    /// - [`InputError::MissingQuery`] when the query is absent or blank.
    /// - [`InputError::InvalidLocation`] when the location is absent or blank.
    /// - [`InputError::InvalidMaxResults`] when `maxResults` is not numeric.
    pub fn into_parts(self) -> Result<InputParts, InputError> {
        let query = self
            .query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .ok_or(InputError::MissingQuery)?;

        let location = match self.location {
            Some(loc) if !loc.trim().is_empty() => loc.trim().to_string(),
            other => return Err(InputError::InvalidLocation(other.unwrap_or_default())),
        };

        let region = self
            .location_state
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        let max_results = match &self.max_results {
            Some(m) => m.limit()?,
            None => None,
        };

        Ok(InputParts {
            query,
            location,
            region,
            category: Category::from_input(self.category.as_deref()),
            max_results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(json: &str) -> CrawlInput {
        serde_json::from_str(json).expect("valid input json")
    }

    #[test]
    fn companies_selects_employer_reviews() {
        assert_eq!(
            Category::from_input(Some("Companies")),
            Category::EmployerReviews
        );
    }

    #[test]
    fn anything_else_selects_job_postings() {
        assert_eq!(Category::from_input(Some("Jobs")), Category::JobPostings);
        assert_eq!(Category::from_input(Some("Salaries")), Category::JobPostings);
        assert_eq!(Category::from_input(None), Category::JobPostings);
    }

    #[test]
    fn max_results_accepts_number_and_numeric_string() {
        let parts = input(r#"{"query":"q","location":"Austin","maxResults":5}"#)
            .into_parts()
            .unwrap();
        assert_eq!(parts.max_results, Some(5));

        let parts = input(r#"{"query":"q","location":"Austin","maxResults":"12"}"#)
            .into_parts()
            .unwrap();
        assert_eq!(parts.max_results, Some(12));
    }

    #[test]
    fn non_positive_or_absent_max_results_means_derive() {
        for json in [
            r#"{"query":"q","location":"Austin"}"#,
            r#"{"query":"q","location":"Austin","maxResults":0}"#,
            r#"{"query":"q","location":"Austin","maxResults":-3}"#,
            r#"{"query":"q","location":"Austin","maxResults":""}"#,
            r#"{"query":"q","location":"Austin","maxResults":null}"#,
        ] {
            let parts = input(json).into_parts().unwrap();
            assert_eq!(parts.max_results, None, "input: {json}");
        }
    }

    #[test]
    fn non_numeric_max_results_is_rejected() {
        let err = input(r#"{"query":"q","location":"Austin","maxResults":"lots"}"#)
            .into_parts()
            .unwrap_err();
        assert!(matches!(err, InputError::InvalidMaxResults(ref s) if s == "lots"));
    }

    #[test]
    fn missing_query_is_rejected() {
        let err = input(r#"{"location":"Austin"}"#).into_parts().unwrap_err();
        assert!(matches!(err, InputError::MissingQuery));
        let err = input(r#"{"query":"  ","location":"Austin"}"#)
            .into_parts()
            .unwrap_err();
        assert!(matches!(err, InputError::MissingQuery));
    }

    #[test]
    fn empty_location_is_rejected() {
        let err = input(r#"{"query":"engineer","location":""}"#)
            .into_parts()
            .unwrap_err();
        assert!(matches!(err, InputError::InvalidLocation(_)));
        let err = input(r#"{"query":"engineer"}"#).into_parts().unwrap_err();
        assert!(matches!(err, InputError::InvalidLocation(_)));
    }

    #[test]
    fn region_hint_is_trimmed_and_optional() {
        let parts = input(r#"{"query":"q","location":"Yorktown","locationState":" VA "}"#)
            .into_parts()
            .unwrap();
        assert_eq!(parts.region.as_deref(), Some("VA"));

        let parts = input(r#"{"query":"q","location":"Yorktown","locationState":""}"#)
            .into_parts()
            .unwrap();
        assert!(parts.region.is_none());
    }

    #[test]
    fn merged_with_prefers_set_fields_of_the_overlay() {
        let file = input(r#"{"query":"engineer","location":"Austin","maxResults":5}"#);
        let flags = CrawlInput {
            category: Some("Companies".to_owned()),
            max_results: Some(MaxResults::Number(2)),
            ..CrawlInput::default()
        };
        let parts = file.merged_with(flags).into_parts().unwrap();
        assert_eq!(parts.query, "engineer");
        assert_eq!(parts.location, "Austin");
        assert_eq!(parts.category, Category::EmployerReviews);
        assert_eq!(parts.max_results, Some(2));
    }
}
