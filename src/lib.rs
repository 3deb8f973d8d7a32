//! # booth-extract - Image listings from BOOTH product pages and storefronts
//!
//! This crate resolves BOOTH products to their metadata and images and walks
//! seller storefronts page by page, emitting a uniform stream of records that a
//! download pipeline can consume.
//!
//! ## Features
//!
//! - Product metadata normalized across both image layouts the site has served:
//!   - captions in the JSON document with URLs scraped from the rendered page
//!   - URLs embedded in the JSON document, upgraded to full resolution with fallbacks
//! - Lazy storefront pagination: nothing is fetched before the stream is polled
//! - Pluggable transport, with a reqwest implementation
//! - Configurable URL shapes and per-product failure policy
//!
//! ## Example
//!
//! ```rust,no_run
//! use booth_extract::prelude::*;
//! use futures::TryStreamExt;
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractorConfig::default();
//!     let extractor = Extractor::new(HttpTransport::new(&config)?, config);
//!     let target = Target::parse("https://sample.booth.pm/")?;
//!
//!     let mut messages = std::pin::pin!(extractor.items(&target));
//!     while let Some(message) = messages.try_next().await? {
//!         if let Message::Url(record) = message {
//!             println!("{}", serde_json::to_string(&record)?);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

mod error;
pub mod extractor;
pub mod http;
pub mod text;

pub use error::{Error, Result};

/// Commonly used types
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::extractor::{
        Extractor, ExtractorConfig, ImageRecord, Message, ProductMetadata, Target,
    };
    pub use crate::http::{HttpTransport, Transport};
}
