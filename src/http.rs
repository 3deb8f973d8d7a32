//! HTTP transport for the extractor
//!
//! The extractor never talks to reqwest directly. It goes through the [`Transport`]
//! trait so the surrounding framework can plug in its own retrying or rate-limited
//! client; [`HttpTransport`] is the plain reqwest implementation.

mod error;
#[cfg(test)]
pub(crate) mod mock;

pub use error::FetchError;

use std::future::Future;

use reqwest::header::ACCEPT;
use reqwest::Client as ReqwestClient;
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};
use url::Url;

use crate::extractor::ExtractorConfig;

/// Representation requested from the remote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accept {
    /// `Accept: application/json`
    Json,
    /// The client's default `Accept` (`*/*`); the site serves its rendered page
    Html,
}

impl Accept {
    /// Value of the `Accept` header to send, if it overrides the client default
    pub fn header_value(self) -> Option<&'static str> {
        match self {
            Accept::Json => Some("application/json"),
            Accept::Html => None,
        }
    }
}

/// A successful response with its body fully read
#[derive(Debug, Clone)]
pub struct Response {
    url: String,
    status: u16,
    body: String,
}

impl Response {
    /// Create a response from its parts
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    /// URL the body was read from
    pub fn url(&self) -> &str {
        &self.url
    }

    /// HTTP status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Raw body
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Parse the body as a JSON document of type `T`
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        serde_json::from_str(&self.body).map_err(|source| FetchError::Json {
            url: self.url.clone(),
            source,
        })
    }
}

/// Fetch primitive consumed by the extractor.
///
/// Implementations must report non-2xx responses as [`FetchError::Status`] so that
/// callers never mistake an error page for content.
pub trait Transport {
    /// Fetch `url`, asking for the given representation
    fn fetch(
        &self,
        url: &str,
        accept: Accept,
    ) -> impl Future<Output = Result<Response, FetchError>> + Send;
}

impl<T: Transport + Sync> Transport for &T {
    fn fetch(
        &self,
        url: &str,
        accept: Accept,
    ) -> impl Future<Output = Result<Response, FetchError>> + Send {
        (**self).fetch(url, accept)
    }
}

/// [`Transport`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: ReqwestClient,
}

impl HttpTransport {
    /// Create a transport using the user agent and timeout from `config`
    pub fn new(config: &ExtractorConfig) -> Result<Self, FetchError> {
        let client = ReqwestClient::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;

        Ok(Self { client })
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: ReqwestClient) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    #[instrument(skip(self), level = "debug")]
    async fn fetch(&self, url: &str, accept: Accept) -> Result<Response, FetchError> {
        let parsed = Url::parse(url)?;
        let mut request = self.client.get(parsed);
        if let Some(value) = accept.header_value() {
            request = request.header(ACCEPT, value);
        }

        debug!("Sending GET request to {}", url);
        let response = request.send().await?;

        let status = response.status();
        let final_url = response.url().to_string();
        let body = response.text().await?;

        if !status.is_success() {
            error!("Request to {} failed with status {}", url, status);
            return Err(FetchError::Status {
                url: url.to_string(),
                status_code: status.as_u16(),
            });
        }

        Ok(Response::new(final_url, status.as_u16(), body))
    }
}
