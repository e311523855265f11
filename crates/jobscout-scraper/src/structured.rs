//! Embedded `application/ld+json` blocks.

use serde_json::Value;

use crate::document::Document;
use crate::error::CrawlError;
use crate::parse_helpers::collapse_whitespace;

pub(crate) const STRUCTURED_DATA: &str = r#"script[type="application/ld+json"]"#;

/// Parses the first structured-data block on the page.
///
/// The site pretty-prints these blocks with raw newlines inside string
/// values, which strict JSON rejects, so whitespace runs are collapsed
/// before parsing.
pub(crate) fn extract_structured_data(html: &str, url: &str) -> Result<Value, CrawlError> {
    structured_data_in(&Document::parse(html), url)
}

/// Same as [`extract_structured_data`] for an already parsed page.
pub(crate) fn structured_data_in(doc: &Document, url: &str) -> Result<Value, CrawlError> {
    let raw = doc
        .first(STRUCTURED_DATA)
        .map(|script| script.text())
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| CrawlError::MissingStructuredData {
            url: url.to_owned(),
        })?;

    serde_json::from_str(&collapse_whitespace(&raw)).map_err(|source| CrawlError::Deserialize {
        context: format!("structured data on {url}"),
        source,
    })
}

/// URL of the first entry of an `ItemList` block, if there is one.
pub(crate) fn first_list_item_url(value: &Value) -> Option<String> {
    value
        .get("itemListElement")
        .and_then(Value::as_array)
        .and_then(|entries| entries.first())
        .and_then(|entry| entry.get("url"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_owned)
}

/// The `JobPosting` node of a block: the block itself when it is an object,
/// otherwise the first `JobPosting` (or first object) in an array or
/// `@graph` container.
pub(crate) fn job_posting_node(value: &Value) -> Option<&Value> {
    let is_job_posting = |v: &&Value| v.get("@type").and_then(Value::as_str) == Some("JobPosting");

    let candidates: &[Value] = match value {
        Value::Object(map) => match map.get("@graph").and_then(Value::as_array) {
            Some(graph) => graph,
            None => return Some(value),
        },
        Value::Array(items) => items,
        _ => return None,
    };

    candidates
        .iter()
        .find(is_job_posting)
        .or_else(|| candidates.iter().find(|v| v.is_object()))
}
