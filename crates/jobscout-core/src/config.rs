use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

pub(crate) const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default; only malformed values fail.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let base_url = or_default("JOBSCOUT_BASE_URL", "https://www.glassdoor.com");
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(invalid(
            "JOBSCOUT_BASE_URL",
            format!("expected an http(s) origin, got \"{base_url}\""),
        ));
    }
    let base_url = base_url.trim_end_matches('/').to_string();

    let proxy_url = lookup("JOBSCOUT_PROXY_URL")
        .ok()
        .filter(|s| !s.trim().is_empty());
    let user_agent = or_default("JOBSCOUT_USER_AGENT", DEFAULT_USER_AGENT);
    let log_level = or_default("JOBSCOUT_LOG_LEVEL", "info");
    let output_path = PathBuf::from(or_default(
        "JOBSCOUT_OUTPUT_PATH",
        "./jobscout-output.jsonl",
    ));

    let request_timeout_secs = parse_u64("JOBSCOUT_REQUEST_TIMEOUT_SECS", "30")?;
    let max_concurrency = parse_usize("JOBSCOUT_MAX_CONCURRENCY", "4")?;
    if max_concurrency == 0 {
        return Err(invalid(
            "JOBSCOUT_MAX_CONCURRENCY",
            "must be at least 1".to_string(),
        ));
    }
    let max_request_retries = parse_u32("JOBSCOUT_MAX_REQUEST_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("JOBSCOUT_RETRY_BACKOFF_BASE_MS", "500")?;
    let rate_limit_retries = parse_u32("JOBSCOUT_RATE_LIMIT_RETRIES", "5")?;
    let rate_limit_wait_ms = parse_u64("JOBSCOUT_RATE_LIMIT_WAIT_MS", "3000")?;
    let location_candidates = parse_u32("JOBSCOUT_LOCATION_CANDIDATES", "10")?;
    let jobs_per_employer = parse_usize("JOBSCOUT_JOBS_PER_EMPLOYER", "3")?;

    Ok(AppConfig {
        base_url,
        proxy_url,
        user_agent,
        log_level,
        output_path,
        request_timeout_secs,
        max_concurrency,
        max_request_retries,
        retry_backoff_base_ms,
        rate_limit_retries,
        rate_limit_wait_ms,
        location_candidates,
        jobs_per_employer,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
