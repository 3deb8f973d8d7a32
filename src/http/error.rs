//! Error types for the transport layer

use thiserror::Error;

/// Error type for fetch operations
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote answered with a non-success status
    #[error("Unexpected status {status_code} for {url}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status_code: u16,
    },

    /// The body is not the expected JSON document
    #[error("Invalid JSON from {url}: {source}")]
    Json {
        /// URL the body came from
        url: String,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
