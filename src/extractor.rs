//! # BOOTH Extractor Module
//!
//! Turns a product page or a storefront into a stream of [`Message`]s for a
//! download pipeline: one [`Message::Directory`] per product carrying its metadata,
//! followed by one [`Message::Url`] per image.
//!
//! ## Key Components
//!
//! - `Target`: classification of an input URL as a product or a storefront
//! - `ProductResolver`: fetches one product's metadata and expands it into image records
//! - `StorefrontPaginator`: walks a storefront listing page by page, resolving each product
//! - `Extractor`: dispatches a `Target` to the matching component
//!
//! ## Usage
//!
//! ```rust,no_run
//! use booth_extract::extractor::{Extractor, ExtractorConfig, Message, Target};
//! use booth_extract::http::HttpTransport;
//! use futures::TryStreamExt;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExtractorConfig::default();
//! let extractor = Extractor::new(HttpTransport::new(&config)?, config);
//! let target = Target::parse("https://sample.booth.pm/items/12345")?;
//!
//! let messages: Vec<Message> = extractor.items(&target).try_collect().await?;
//! for message in &messages {
//!     if let Message::Url(record) = message {
//!         println!("{} -> {}", record.num, record.url);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod metadata;
mod product;
mod storefront;
mod target;

pub use config::{ExtractorConfig, ExtractorConfigBuilder, ProductErrorPolicy, ProductUrlStyle};
pub use metadata::{ImageEntry, ProductMetadata};
pub use product::{ProductResolver, expand, extension, fallback_urls, full_resolution_url};
pub use storefront::StorefrontPaginator;
pub use target::Target;

use std::sync::Arc;

use futures::Stream;
use futures::future::Either;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};

use crate::error::Result;
use crate::http::Transport;

/// Category name used by download pipelines for this site
pub const CATEGORY: &str = "booth";

/// One emission of the extractor
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Product-level metadata, emitted once before the product's images
    Directory(Arc<ProductMetadata>),
    /// One image to download
    Url(ImageRecord),
}

/// Per-image part of a record that is not shared with the product
#[derive(Debug, Clone, PartialEq)]
pub enum ImageDetail {
    /// Image whose URL was scraped from the product page
    Caption(Option<String>),
    /// Image whose URL is a full-resolution guess
    Fallback {
        /// Candidates to try, in order, when the guessed URL is missing
        urls: Vec<String>,
        /// The image entry as the document had it
        image_meta: Value,
    },
}

/// One image of a product.
///
/// The product metadata is shared between all records of a product and never
/// modified; [`ImageRecord::metadata`] combines it with this record's own fields
/// into a fresh object.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    product: Arc<ProductMetadata>,

    /// Position among the product's images, starting at 1
    pub num: usize,

    /// URL to download
    pub url: String,

    /// File extension taken from `url`
    pub extension: String,

    /// Caption or fallback information
    pub detail: ImageDetail,
}

impl ImageRecord {
    /// The product this image belongs to
    pub fn product(&self) -> &ProductMetadata {
        &self.product
    }

    /// Product fields overlaid with this image's fields
    pub fn metadata(&self) -> Map<String, Value> {
        let mut fields = self.product.fields().clone();
        fields.insert("num".to_string(), json!(self.num));
        fields.insert("image_url".to_string(), json!(self.url));
        fields.insert("extension".to_string(), json!(self.extension));

        match &self.detail {
            ImageDetail::Caption(caption) => {
                fields.insert("image_caption".to_string(), json!(caption));
            }
            ImageDetail::Fallback { urls, image_meta } => {
                fields.insert("_fallback".to_string(), json!(urls));
                fields.insert("image_meta".to_string(), image_meta.clone());
            }
        }

        fields
    }
}

impl Serialize for ImageRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.metadata().serialize(serializer)
    }
}

/// Entry point dispatching a [`Target`] to the product resolver or the storefront walk
#[derive(Debug, Clone)]
pub struct Extractor<T> {
    storefront: StorefrontPaginator<T>,
}

impl<T: Transport> Extractor<T> {
    /// Create an extractor fetching through `transport`
    pub fn new(transport: T, config: ExtractorConfig) -> Self {
        Self {
            storefront: StorefrontPaginator::new(ProductResolver::new(transport, config)),
        }
    }

    /// The product resolver
    pub fn products(&self) -> &ProductResolver<T> {
        self.storefront.resolver()
    }

    /// The storefront walker
    pub fn storefront(&self) -> &StorefrontPaginator<T> {
        &self.storefront
    }

    /// All messages for `target`
    pub fn items<'a>(&'a self, target: &'a Target) -> impl Stream<Item = Result<Message>> + 'a {
        match target {
            Target::Product {
                shop_id,
                product_id,
            } => Either::Left(self.products().items(shop_id.as_deref(), product_id)),
            Target::Shop { shop_id } => Either::Right(self.storefront.items(shop_id)),
        }
    }
}
