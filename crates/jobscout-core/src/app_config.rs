use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub proxy_url: Option<String>,
    pub user_agent: String,
    pub log_level: String,
    pub output_path: PathBuf,
    pub request_timeout_secs: u64,
    pub max_concurrency: usize,
    pub max_request_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub rate_limit_retries: u32,
    pub rate_limit_wait_ms: u64,
    pub location_candidates: u32,
    pub jobs_per_employer: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("base_url", &self.base_url)
            // Proxy URLs routinely embed credentials.
            .field("proxy_url", &self.proxy_url.as_ref().map(|_| "[redacted]"))
            .field("user_agent", &self.user_agent)
            .field("log_level", &self.log_level)
            .field("output_path", &self.output_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_concurrency", &self.max_concurrency)
            .field("max_request_retries", &self.max_request_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("rate_limit_retries", &self.rate_limit_retries)
            .field("rate_limit_wait_ms", &self.rate_limit_wait_ms)
            .field("location_candidates", &self.location_candidates)
            .field("jobs_per_employer", &self.jobs_per_employer)
            .finish()
    }
}
