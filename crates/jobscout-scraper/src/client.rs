//! HTTP transport for the job site.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::CrawlError;
use crate::rate_limit::OVERLOADED_STATUS;

/// Fetches pages from a single site origin.
///
/// Maps the overload status to [`CrawlError::Overloaded`] so the pagination
/// retry loop can tell it apart from every other failure. 404 becomes
/// [`CrawlError::NotFound`] and any other non-2xx response becomes
/// [`CrawlError::UnexpectedStatus`].
pub struct SiteClient {
    client: Client,
    base_url: Url,
}

impl SiteClient {
    /// Creates a `SiteClient` rooted at `base_url`.
    ///
    /// `proxy_url`, when set, routes every request (HTTP and HTTPS) through
    /// that proxy.
    ///
    /// # Errors
    ///
    /// - [`CrawlError::InvalidUrl`] if `base_url` is not an absolute URL.
    /// - [`CrawlError::Http`] if the proxy URL is rejected or the underlying
    ///   `reqwest::Client` cannot be constructed.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        proxy_url: Option<&str>,
    ) -> Result<Self, CrawlError> {
        let base_url = Url::parse(base_url).map_err(|e| CrawlError::InvalidUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/json;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .default_headers(headers);
        if let Some(proxy) = proxy_url {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    /// Builds a client from the application configuration.
    ///
    /// # Errors
    ///
    /// See [`SiteClient::new`].
    pub fn from_config(config: &jobscout_core::AppConfig) -> Result<Self, CrawlError> {
        Self::new(
            &config.base_url,
            config.request_timeout_secs,
            &config.user_agent,
            config.proxy_url.as_deref(),
        )
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a site-relative path (or an absolute URL) against the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::InvalidUrl`] if `href` cannot be joined.
    pub fn resolve(&self, href: &str) -> Result<Url, CrawlError> {
        resolve_against(&self.base_url, href)
    }

    /// GETs `url` and returns the body as text.
    ///
    /// # Errors
    ///
    /// - [`CrawlError::Overloaded`] for the overload status.
    /// - [`CrawlError::NotFound`] for 404.
    /// - [`CrawlError::UnexpectedStatus`] for any other non-2xx status.
    /// - [`CrawlError::Http`] for network or TLS failures.
    pub async fn fetch_html(&self, url: &Url) -> Result<String, CrawlError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == OVERLOADED_STATUS {
            return Err(CrawlError::Overloaded {
                url: url.to_string(),
            });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CrawlError::NotFound {
                url: url.to_string(),
            });
        }

        if !status.is_success() {
            return Err(CrawlError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }

    /// GETs `url` and deserializes the JSON body into `T`.
    ///
    /// # Errors
    ///
    /// Everything [`SiteClient::fetch_html`] returns, plus
    /// [`CrawlError::Deserialize`] when the body does not match `T`.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, CrawlError> {
        let body = self.fetch_html(url).await?;
        serde_json::from_str::<T>(&body).map_err(|source| CrawlError::Deserialize {
            context: format!("{context} from {url}"),
            source,
        })
    }
}

pub(crate) fn resolve_against(base: &Url, href: &str) -> Result<Url, CrawlError> {
    base.join(href.trim()).map_err(|e| CrawlError::InvalidUrl {
        url: href.to_owned(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
