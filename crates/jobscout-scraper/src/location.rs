//! Free-text location → site location code.
//!
//! The site's location lookup returns candidates like:
//!
//! ```json
//! [{"compoundId":"C1132348","countryName":"United States","id":"C1132348",
//!   "label":"New York, NY (US)","locationId":1132348,"locationType":"C",
//!   "longName":"New York, NY (US)","realId":1132348}]
//! ```
//!
//! There is no separate region field; the region code is embedded in
//! `longName` as `", {region} ("`.

use reqwest::Url;
use serde::Deserialize;

use crate::client::SiteClient;
use crate::error::CrawlError;

const LOOKUP_PATH: &str = "/findPopularLocationAjax.htm";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationMatch {
    pub location_type: String,
    pub location_id: i64,
    pub long_name: String,
}

/// Picks the first candidate whose `long_name` contains `", {region} ("`,
/// falling back to the first candidate when no region is given or none match.
#[must_use]
pub fn select_location<'a>(
    matches: &'a [LocationMatch],
    region: Option<&str>,
) -> Option<&'a LocationMatch> {
    region
        .and_then(|region| {
            let needle = format!(", {region} (");
            matches.iter().find(|m| m.long_name.contains(&needle))
        })
        .or_else(|| matches.first())
}

/// Location part of a search query: `locT`, `locId`, and `locKeyword`.
///
/// The empty fragment adds nothing to the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationFragment {
    code: Option<LocationCode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LocationCode {
    location_type: String,
    location_id: i64,
    keyword: String,
}

impl LocationFragment {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new(location: &LocationMatch, keyword: &str) -> Self {
        Self {
            code: Some(LocationCode {
                location_type: location.location_type.clone(),
                location_id: location.location_id,
                keyword: keyword.to_owned(),
            }),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.code.is_none()
    }

    /// Appends the fragment's query pairs to `url`.
    pub fn append_to(&self, url: &mut Url) {
        if let Some(code) = &self.code {
            url.query_pairs_mut()
                .append_pair("locT", &code.location_type)
                .append_pair("locId", &code.location_id.to_string())
                .append_pair("locKeyword", &code.keyword);
        }
    }
}

impl std::fmt::Display for LocationFragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(
                f,
                "&locT={}&locId={}&locKeyword={}",
                code.location_type, code.location_id, code.keyword
            ),
            None => Ok(()),
        }
    }
}

/// Resolves free text plus an optional region hint through the site's
/// location lookup. One network call per [`LocationResolver::resolve`].
pub struct LocationResolver<'a> {
    client: &'a SiteClient,
    max_candidates: u32,
}

impl<'a> LocationResolver<'a> {
    /// `max_candidates` bounds the lookup; use 1 when no region hint will be
    /// applied and enough (e.g. 10) for the hint to find its match.
    #[must_use]
    pub fn new(client: &'a SiteClient, max_candidates: u32) -> Self {
        Self {
            client,
            max_candidates: max_candidates.max(1),
        }
    }

    /// # Errors
    ///
    /// - [`CrawlError::NoLocationFound`] when the lookup returns no candidates.
    /// - Transport and deserialization errors from the lookup call.
    pub async fn resolve(
        &self,
        text: &str,
        region: Option<&str>,
    ) -> Result<LocationFragment, CrawlError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(LocationFragment::empty());
        }

        let url = self.lookup_url(text)?;
        let matches: Vec<LocationMatch> =
            self.client.fetch_json(&url, "location lookup").await?;

        let chosen = select_location(&matches, region).ok_or_else(|| {
            CrawlError::NoLocationFound {
                text: text.to_owned(),
            }
        })?;

        let fragment = LocationFragment::new(chosen, text);
        tracing::info!(
            location = %fragment,
            long_name = %chosen.long_name,
            candidates = matches.len(),
            "found location"
        );
        Ok(fragment)
    }

    fn lookup_url(&self, text: &str) -> Result<Url, CrawlError> {
        let mut url = self.client.resolve(LOOKUP_PATH)?;
        url.query_pairs_mut()
            .append_pair("term", text)
            .append_pair("maxLocationsToReturn", &self.max_candidates.to_string());
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: i64, long_name: &str) -> LocationMatch {
        LocationMatch {
            location_type: "C".to_owned(),
            location_id: id,
            long_name: long_name.to_owned(),
        }
    }

    fn candidates() -> Vec<LocationMatch> {
        vec![
            candidate(1, "Yorktown, NY (US)"),
            candidate(2, "Yorktown, VA (US)"),
            candidate(3, "Yorktown, IN (US)"),
        ]
    }

    #[test]
    fn region_hint_selects_matching_candidate() {
        let list = candidates();
        let chosen = select_location(&list, Some("VA")).unwrap();
        assert_eq!(chosen.location_id, 2);
    }

    #[test]
    fn unmatched_region_falls_back_to_first() {
        let list = candidates();
        let chosen = select_location(&list, Some("TX")).unwrap();
        assert_eq!(chosen.location_id, 1);
    }

    #[test]
    fn no_region_selects_first() {
        let list = candidates();
        assert_eq!(select_location(&list, None).unwrap().location_id, 1);
    }

    #[test]
    fn region_must_match_the_delimited_form() {
        // "IN" appears inside "Indiana" but not as ", IN (".
        let list = vec![candidate(7, "Indianapolis, Indiana (US)"), candidate(8, "Gary, IN (US)")];
        assert_eq!(select_location(&list, Some("IN")).unwrap().location_id, 8);
    }

    #[test]
    fn empty_candidates_select_nothing() {
        assert!(select_location(&[], Some("VA")).is_none());
        assert!(select_location(&[], None).is_none());
    }

    #[test]
    fn deserializes_lookup_payload() {
        let payload = r#"[{"compoundId":"C1132348","countryName":"United States","id":"C1132348",
            "label":"New York, NY (US)","locationId":1132348,"locationType":"C",
            "longName":"New York, NY (US)","realId":1132348}]"#;
        let parsed: Vec<LocationMatch> = serde_json::from_str(payload).unwrap();
        assert_eq!(parsed[0], candidate(1_132_348, "New York, NY (US)"));
    }

    #[test]
    fn fragment_appends_query_pairs() {
        let fragment = LocationFragment::new(&candidate(1_139_761, "Austin, TX (US)"), "Austin");
        let mut url = Url::parse("https://www.glassdoor.com/Job/jobs.htm?sc.keyword=engineer").unwrap();
        fragment.append_to(&mut url);
        assert_eq!(
            url.as_str(),
            "https://www.glassdoor.com/Job/jobs.htm?sc.keyword=engineer&locT=C&locId=1139761&locKeyword=Austin"
        );
        assert_eq!(fragment.to_string(), "&locT=C&locId=1139761&locKeyword=Austin");
    }

    #[test]
    fn empty_fragment_appends_nothing() {
        let fragment = LocationFragment::empty();
        let mut url = Url::parse("https://www.glassdoor.com/Job/jobs.htm?sc.keyword=x").unwrap();
        fragment.append_to(&mut url);
        assert_eq!(url.as_str(), "https://www.glassdoor.com/Job/jobs.htm?sc.keyword=x");
        assert!(fragment.is_empty());
        assert_eq!(fragment.to_string(), "");
    }

    #[tokio::test]
    async fn empty_text_resolves_without_network() {
        // Port 9 is discard; any request would fail, proving none is made.
        let client = SiteClient::new("http://127.0.0.1:9", 1, "jobscout-test/0.1", None).unwrap();
        let resolver = LocationResolver::new(&client, 10);
        let fragment = resolver.resolve("   ", Some("TX")).await.unwrap();
        assert!(fragment.is_empty());
    }
}
