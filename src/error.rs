//! Error types for the extractor crate

use crate::http::FetchError;
use thiserror::Error;

/// Result type for extractor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for extractor operations
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure: network error, non-success status or unparsable body
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// A fetched metadata document lacks an expected field or has it in the wrong shape
    #[error("Malformed metadata: {0}")]
    MalformedMetadata(String),

    /// Captions and scraped image URLs disagree in number
    #[error(
        "Image count mismatch for product {product_id}: {captions} captions, {urls} scraped URLs"
    )]
    CountMismatch {
        /// Product whose page was scraped
        product_id: String,
        /// Number of captions in the JSON document
        captions: usize,
        /// Number of URLs found in the HTML page
        urls: usize,
    },

    /// A storefront listing page contained an item URL without a product id
    #[error("Malformed listing: {0}")]
    MalformedListing(String),

    /// The input URL is neither a product page nor a storefront
    #[error("Unsupported URL: {0}")]
    UnsupportedUrl(String),
}
