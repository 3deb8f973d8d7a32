//! Product resolution and per-image record expansion

use std::sync::Arc;

use async_stream::try_stream;
use futures::Stream;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use super::metadata::{ImageEntry, ImageLayout, ProductDocument, ProductMetadata};
use super::{ExtractorConfig, ImageDetail, ImageRecord, Message, ProductUrlStyle};
use crate::error::{Error, Result};
use crate::http::{Accept, Transport};
use crate::text::extract_iter;

const ORIGIN_BEGIN: &str = "data-origin=\"";
const ORIGIN_END: &str = "\"";

/// Marker the site appends to the stored, downscaled upload
const RESIZED_MARKER: &str = "_base_resized";

/// Resolves products to their metadata and image records
#[derive(Debug, Clone)]
pub struct ProductResolver<T> {
    transport: T,
    config: ExtractorConfig,
}

impl<T: Transport> ProductResolver<T> {
    /// Create a resolver fetching through `transport`
    pub fn new(transport: T, config: ExtractorConfig) -> Self {
        Self { transport, config }
    }

    /// The configuration in use
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// URL of a product page in the configured shape.
    ///
    /// Without a shop id only the localized shared-domain shape is available.
    pub fn product_url(&self, shop_id: Option<&str>, product_id: &str) -> String {
        match (self.config.product_url_style, shop_id) {
            (ProductUrlStyle::ShopSubdomain, Some(shop_id)) => {
                format!("{}/items/{}", self.config.shop_root_for(shop_id), product_id)
            }
            _ => format!(
                "{}/{}/items/{}",
                self.config.site_root.trim_end_matches('/'),
                self.config.language,
                product_id
            ),
        }
    }

    /// Fetch and normalize the metadata of one product.
    ///
    /// Requests the JSON document first. A second request for the rendered page is
    /// only made when the document lists captions without URLs.
    #[instrument(skip(self))]
    pub async fn resolve(&self, shop_id: Option<&str>, product_id: &str) -> Result<ProductMetadata> {
        let url = self.product_url(shop_id, product_id);
        let document: Map<String, Value> = self.transport.fetch(&url, Accept::Json).await?.json()?;
        let document = ProductDocument::parse(document)?;

        let images = match document.layout {
            ImageLayout::Embedded(images) => images,
            ImageLayout::Captions(captions) => {
                self.scrape_images(&url, product_id, captions).await?
            }
        };

        info!("Resolved product {} with {} images", product_id, images.len());
        Ok(ProductMetadata::new(product_id, document.fields, images))
    }

    async fn scrape_images(
        &self,
        url: &str,
        product_id: &str,
        captions: Vec<Option<String>>,
    ) -> Result<Vec<ImageEntry>> {
        debug!("Scraping image URLs for product {}", product_id);
        let page = self.transport.fetch(url, Accept::Html).await?;
        let urls: Vec<&str> = extract_iter(page.text(), ORIGIN_BEGIN, ORIGIN_END).collect();

        if urls.len() != captions.len() {
            return Err(Error::CountMismatch {
                product_id: product_id.to_string(),
                captions: captions.len(),
                urls: urls.len(),
            });
        }

        Ok(captions
            .into_iter()
            .zip(urls)
            .map(|(caption, url)| ImageEntry::Scraped {
                caption,
                url: url.to_string(),
            })
            .collect())
    }

    /// Directory message for the product followed by one message per image.
    ///
    /// Nothing is yielded until the product is fully resolved.
    pub fn items<'a>(
        &'a self,
        shop_id: Option<&'a str>,
        product_id: &'a str,
    ) -> impl Stream<Item = Result<Message>> + 'a {
        try_stream! {
            let metadata = Arc::new(self.resolve(shop_id, product_id).await?);
            yield Message::Directory(Arc::clone(&metadata));
            for record in expand(&metadata) {
                yield Message::Url(record);
            }
        }
    }
}

/// Build one record per image, numbered from 1 in document order.
pub fn expand(metadata: &Arc<ProductMetadata>) -> impl Iterator<Item = ImageRecord> + '_ {
    metadata
        .images()
        .iter()
        .enumerate()
        .map(move |(index, image)| {
            let (url, detail) = match image {
                ImageEntry::Scraped { caption, url } => {
                    (url.clone(), ImageDetail::Caption(caption.clone()))
                }
                ImageEntry::Embedded { original, raw, .. } => (
                    full_resolution_url(original),
                    ImageDetail::Fallback {
                        urls: fallback_urls(original),
                        image_meta: raw.clone(),
                    },
                ),
            };

            ImageRecord {
                product: Arc::clone(metadata),
                num: index + 1,
                extension: extension(&url).to_string(),
                url,
                detail,
            }
        })
}

/// Text after the last `.` of the URL's final path segment, or `""`.
///
/// Query and fragment are dropped first, and only the final path segment is
/// looked at, so dots in `?v=1.2` or `#a.b` never yield an extension.
pub fn extension(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rsplit_once('.').map_or("", |(_, ext)| ext)
}

/// Full-resolution guess for an embedded image: the original without its resize marker.
pub fn full_resolution_url(original: &str) -> String {
    original.replace(RESIZED_MARKER, "")
}

/// Candidates to try when the full-resolution guess is missing: a PNG variant of the
/// original, then the original itself.
pub fn fallback_urls(original: &str) -> Vec<String> {
    let png = match original.rsplit_once('.') {
        Some((stem, ext)) if !ext.contains('/') => format!("{stem}.PNG"),
        _ => format!("{original}.PNG"),
    };
    vec![png, original.to_string()]
}
