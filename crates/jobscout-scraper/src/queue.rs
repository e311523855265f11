//! Bounded-concurrency request queue for per-item fetches.
//!
//! Requests are de-duplicated by key on entry, run at most
//! `concurrency` at a time, and retried with exponential backoff on
//! transient failures. A failed request never stops the others; the caller
//! gets every outcome back and decides what to log.

use std::collections::HashSet;
use std::future::Future;
use std::pin::pin;

use futures::stream::{self, StreamExt};

use crate::error::CrawlError;
use crate::rate_limit::retry_with_backoff;

/// A page to fetch, identified by a key unique within one queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub unique_key: String,
}

impl Request {
    #[must_use]
    pub fn new(url: impl Into<String>, unique_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            unique_key: unique_key.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSettings {
    pub concurrency: usize,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            concurrency: 4,
            max_retries: 3,
            backoff_base_ms: 500,
        }
    }
}

impl QueueSettings {
    #[must_use]
    pub fn from_config(config: &jobscout_core::AppConfig) -> Self {
        Self {
            concurrency: config.max_concurrency,
            max_retries: config.max_request_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        }
    }
}

#[derive(Debug)]
pub struct WorkQueue {
    requests: Vec<Request>,
    settings: QueueSettings,
}

impl WorkQueue {
    /// Builds a queue, keeping only the first request for each key.
    pub fn new(requests: impl IntoIterator<Item = Request>, settings: QueueSettings) -> Self {
        let mut seen = HashSet::new();
        let requests = requests
            .into_iter()
            .filter(|request| {
                let fresh = seen.insert(request.unique_key.clone());
                if !fresh {
                    tracing::debug!(key = %request.unique_key, "dropping duplicate request");
                }
                fresh
            })
            .collect();
        Self { requests, settings }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Runs `handler` over every request and returns each request with its
    /// outcome, in completion order.
    pub async fn run<T, F, Fut>(self, handler: F) -> Vec<(Request, Result<T, CrawlError>)>
    where
        F: Fn(Request) -> Fut,
        Fut: Future<Output = Result<T, CrawlError>>,
    {
        let settings = self.settings;
        let handler = &handler;

        stream::iter(self.requests)
            .map(move |request| async move {
                let result = retry_with_backoff(settings.max_retries, settings.backoff_base_ms, || {
                    handler(request.clone())
                })
                .await;
                (request, result)
            })
            .buffer_unordered(settings.concurrency.max(1))
            .collect()
            .await
    }

    /// Like [`WorkQueue::run`], but stops at the first error `is_fatal`
    /// accepts. Requests not yet started are never dispatched and the ones
    /// in flight are dropped.
    ///
    /// # Errors
    ///
    /// Returns the fatal error.
    pub async fn run_until<T, F, Fut, P>(
        self,
        handler: F,
        is_fatal: P,
    ) -> Result<Vec<(Request, Result<T, CrawlError>)>, CrawlError>
    where
        F: Fn(Request) -> Fut,
        Fut: Future<Output = Result<T, CrawlError>>,
        P: Fn(&CrawlError) -> bool,
    {
        let settings = self.settings;
        let handler = &handler;

        let mut outcomes = pin!(stream::iter(self.requests)
            .map(move |request| async move {
                let result = retry_with_backoff(settings.max_retries, settings.backoff_base_ms, || {
                    handler(request.clone())
                })
                .await;
                (request, result)
            })
            .buffer_unordered(settings.concurrency.max(1)));

        let mut done = Vec::new();
        while let Some((request, result)) = outcomes.next().await {
            match result {
                Err(err) if is_fatal(&err) => {
                    tracing::error!(key = %request.unique_key, error = %err, "stopping queue");
                    return Err(err);
                }
                result => done.push((request, result)),
            }
        }
        Ok(done)
    }
}
