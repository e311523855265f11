use super::*;

fn test_client() -> SiteClient {
    SiteClient::new("https://www.glassdoor.com", 5, "jobscout-test/0.1", None)
        .expect("failed to build test SiteClient")
}

#[test]
fn resolve_joins_site_relative_paths() {
    let client = test_client();
    let url = client.resolve("/Job/jobs.htm?p=2").unwrap();
    assert_eq!(url.as_str(), "https://www.glassdoor.com/Job/jobs.htm?p=2");
}

#[test]
fn resolve_keeps_absolute_urls() {
    let client = test_client();
    let url = client
        .resolve("https://www.glassdoor.com/job-listing/x-JV_KO0,5.htm?jl=42")
        .unwrap();
    assert_eq!(
        url.as_str(),
        "https://www.glassdoor.com/job-listing/x-JV_KO0,5.htm?jl=42"
    );
}

#[test]
fn resolve_trims_whitespace_around_href() {
    let client = test_client();
    let url = client.resolve("  /Jobs/Acme-Jobs-E1.htm\n").unwrap();
    assert_eq!(url.as_str(), "https://www.glassdoor.com/Jobs/Acme-Jobs-E1.htm");
}

#[test]
fn new_rejects_relative_base_url() {
    let result = SiteClient::new("glassdoor.com", 5, "jobscout-test/0.1", None);
    assert!(
        matches!(result, Err(CrawlError::InvalidUrl { .. })),
        "expected InvalidUrl"
    );
}

#[test]
fn new_accepts_proxy_url() {
    let result = SiteClient::new(
        "https://www.glassdoor.com",
        5,
        "jobscout-test/0.1",
        Some("http://proxy.local:8000"),
    );
    assert!(result.is_ok());
}
