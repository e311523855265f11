//! Shared configuration and run-input types for the jobscout crawler.

mod app_config;
mod config;
mod input;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use input::{Category, CrawlInput, InputParts, MaxResults};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("input must contain a non-empty query")]
    MissingQuery,

    #[error("incorrect location value {0:?}")]
    InvalidLocation(String),

    #[error("invalid maxResults value {0:?}")]
    InvalidMaxResults(String),

    #[error("could not read input file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse input file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
