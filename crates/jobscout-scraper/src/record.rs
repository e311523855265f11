//! The emitted record and the rule that assembles it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cache::EmployerProfile;
use crate::enrich::JobPosting;
use crate::listing::JobStub;

/// One normalized job, written once to the output sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: u64,
    pub employer_name: String,
    pub employer_rating: Option<f64>,
    pub job_title: String,
    /// Structured location object from the detail page, or the listing's text.
    pub job_location: Value,
    pub url: String,
    /// Structured salary estimate from the detail page, or the listing's text.
    pub salary: Value,
    pub company_details: Map<String, Value>,
    pub job_details: String,
    pub date_posted: Option<Value>,
}

/// Merges a stub with its detail page and its employer's profile.
///
/// Detail-page values replace the stub's `url`, `salary`, and `jobLocation`
/// whenever the detail page has them. `companyDetails` starts from the
/// structured hiring organization; profile attributes only fill keys the
/// organization block does not already have.
#[must_use]
pub fn merge_record(
    stub: &JobStub,
    posting: &JobPosting,
    job_details: String,
    profile: &EmployerProfile,
) -> JobRecord {
    let url = posting
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map_or_else(|| stub.url.clone(), str::to_owned);

    let salary = present(posting.estimated_salary.as_ref())
        .cloned()
        .unwrap_or_else(|| text_or_null(&stub.salary));

    let job_location = present(posting.job_location.as_ref())
        .cloned()
        .unwrap_or_else(|| text_or_null(&stub.job_location));

    let mut company_details = posting
        .hiring_organization
        .as_ref()
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    for (label, value) in profile {
        company_details
            .entry(label.clone())
            .or_insert_with(|| Value::String(value.clone()));
    }

    JobRecord {
        id: stub.id,
        employer_name: stub.employer_name.clone(),
        employer_rating: stub.employer_rating,
        job_title: stub.job_title.clone(),
        job_location,
        url,
        salary,
        company_details,
        job_details,
        date_posted: present(posting.date_posted.as_ref()).cloned(),
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn text_or_null(text: &str) -> Value {
    if text.is_empty() {
        Value::Null
    } else {
        Value::String(text.to_owned())
    }
}
