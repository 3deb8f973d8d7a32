//! Storefront listing walk

use std::sync::Arc;

use async_stream::try_stream;
use futures::Stream;
use tracing::{debug, info, warn};

use super::product::{ProductResolver, expand};
use super::target::item_id;
use super::{Message, ProductErrorPolicy};
use crate::error::{Error, Result};
use crate::http::{Accept, Transport};
use crate::text::{extract_first, extract_iter};

const ITEM_URL_BEGIN: &str = "&quot;shop_item_url&quot;:&quot;";
const ITEM_URL_END: &str = "&quot;,";
const NEXT_PAGE_BEGIN: &str = r#"<a rel="next" class="nav-item" href=""#;
const NEXT_PAGE_END: &str = "\">";

/// Walks a seller's paginated item listing, resolving every product on the way.
///
/// There is no page cap. A listing that always advertises a next page is walked
/// forever; bound the stream with `StreamExt::take` if that matters.
#[derive(Debug, Clone)]
pub struct StorefrontPaginator<T> {
    resolver: ProductResolver<T>,
}

impl<T: Transport> StorefrontPaginator<T> {
    /// Create a paginator delegating products to `resolver`
    pub fn new(resolver: ProductResolver<T>) -> Self {
        Self { resolver }
    }

    /// The resolver products are delegated to
    pub fn resolver(&self) -> &ProductResolver<T> {
        &self.resolver
    }

    /// URL of one listing page, counting from 1
    pub fn listing_url(&self, shop_id: &str, page: u32) -> String {
        format!(
            "{}/items?page={}",
            self.resolver.config().shop_root_for(shop_id),
            page
        )
    }

    /// Every record of every product in the storefront.
    ///
    /// Records come in page order, then listing order, then image order. Each
    /// product's directory message precedes its images.
    pub fn items<'a>(&'a self, shop_id: &'a str) -> impl Stream<Item = Result<Message>> + 'a {
        let policy = self.resolver.config().product_error_policy;

        try_stream! {
            let mut page = 1;
            loop {
                let url = self.listing_url(shop_id, page);
                let listing = self.resolver.transport().fetch(&url, Accept::Html).await?;
                let product_ids = product_ids(listing.text())?;
                info!("Listing page {} of {} has {} products", page, shop_id, product_ids.len());

                for product_id in &product_ids {
                    let metadata = match self.resolver.resolve(Some(shop_id), product_id).await {
                        Ok(metadata) => Arc::new(metadata),
                        Err(err) if policy == ProductErrorPolicy::Skip => {
                            warn!(error = %err, "Skipping product {} of {}", product_id, shop_id);
                            continue;
                        }
                        Err(err) => Err(err)?,
                    };

                    yield Message::Directory(Arc::clone(&metadata));
                    for record in expand(&metadata) {
                        yield Message::Url(record);
                    }
                }

                if !has_next_page(listing.text()) {
                    debug!("No page after {} of {}", page, shop_id);
                    break;
                }
                page += 1;
            }
        }
    }
}

/// Product ids of a listing page, in the order they appear.
fn product_ids(html: &str) -> Result<Vec<String>> {
    extract_iter(html, ITEM_URL_BEGIN, ITEM_URL_END)
        .map(|item_url| {
            item_id(item_url)
                .map(str::to_string)
                .ok_or_else(|| Error::MalformedListing(format!("no product id in {item_url}")))
        })
        .collect()
}

fn has_next_page(html: &str) -> bool {
    extract_first(html, NEXT_PAGE_BEGIN, NEXT_PAGE_END).is_some_and(|href| !href.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{ExtractorConfig, ProductUrlStyle};
    use crate::http::mock::MockTransport;
    use futures::{StreamExt, TryStreamExt};
    use serde_json::{Value, json};

    fn listing_page(product_ids: &[&str], next_page: Option<u32>) -> String {
        let items: String = product_ids
            .iter()
            .map(|id| {
                format!(
                    "{{&quot;id&quot;:{id},&quot;shop_item_url&quot;:&quot;https://sample.booth.pm/items/{id}&quot;,&quot;name&quot;:&quot;Item {id}&quot;}}"
                )
            })
            .collect();
        let nav = next_page
            .map(|page| format!(r#"<a rel="next" class="nav-item" href="/items?page={page}">Next</a>"#))
            .unwrap_or_default();
        format!(r#"<div data-react-props="{items}"></div><nav>{nav}</nav>"#)
    }

    fn product_document(product_id: &str, images: usize) -> Value {
        let images: Vec<Value> = (1..=images)
            .map(|n| {
                json!({
                    "caption": null,
                    "original": format!("https://booth.pximg.net/i/{product_id}/{n}_base_resized.jpg"),
                    "resized": format!("https://booth.pximg.net/c/72x72/i/{product_id}/{n}_base_resized.jpg")
                })
            })
            .collect();
        json!({
            "id": product_id.parse::<u64>().unwrap(),
            "name": format!("Item {product_id}"),
            "tags": [],
            "images": images
        })
    }

    fn product_url(product_id: &str) -> String {
        format!("https://booth.pm/en/items/{product_id}")
    }

    fn listing_url(page: u32) -> String {
        format!("https://sample.booth.pm/items?page={page}")
    }

    fn paginator(
        transport: &MockTransport,
        config: ExtractorConfig,
    ) -> StorefrontPaginator<&MockTransport> {
        StorefrontPaginator::new(ProductResolver::new(transport, config))
    }

    /// (product id, image num) for each image record, directory ids as num 0
    fn sequence(messages: &[Message]) -> Vec<(String, usize)> {
        messages
            .iter()
            .map(|message| match message {
                Message::Directory(metadata) => (metadata.product_id().to_string(), 0),
                Message::Url(record) => (record.product().product_id().to_string(), record.num),
            })
            .collect()
    }

    #[test]
    fn test_product_ids_in_order() {
        let html = listing_page(&["30", "10", "20"], None);
        assert_eq!(product_ids(&html).unwrap(), vec!["30", "10", "20"]);
    }

    #[test]
    fn test_product_ids_malformed_item_url() {
        let html = "&quot;shop_item_url&quot;:&quot;https://sample.booth.pm/&quot;,";
        assert!(matches!(product_ids(html), Err(Error::MalformedListing(_))));
    }

    #[test]
    fn test_next_page_detection() {
        assert!(has_next_page(&listing_page(&[], Some(2))));
        assert!(!has_next_page(&listing_page(&["1"], None)));
        assert!(!has_next_page(r#"<a rel="next" class="nav-item" href="">"#));
    }

    #[tokio::test]
    async fn test_stops_after_last_page() {
        let transport = MockTransport::new()
            .with_html(&listing_url(1), listing_page(&["1"], Some(2)))
            .with_html(&listing_url(2), listing_page(&["2"], Some(3)))
            .with_html(&listing_url(3), listing_page(&["3"], None))
            .with_json(&product_url("1"), product_document("1", 1))
            .with_json(&product_url("2"), product_document("2", 1))
            .with_json(&product_url("3"), product_document("3", 1));
        let paginator = paginator(&transport, ExtractorConfig::default());

        let messages: Vec<Message> = paginator.items("sample").try_collect().await.unwrap();
        let directories: Vec<_> = sequence(&messages)
            .into_iter()
            .filter(|(_, num)| *num == 0)
            .map(|(id, _)| id)
            .collect();
        assert_eq!(directories, vec!["1", "2", "3"]);

        let listings: Vec<_> = transport
            .requested_urls()
            .into_iter()
            .filter(|url| url.contains("?page="))
            .collect();
        assert_eq!(listings, vec![listing_url(1), listing_url(2), listing_url(3)]);
    }

    #[tokio::test]
    async fn test_record_order_across_pages() {
        let transport = MockTransport::new()
            .with_html(&listing_url(1), listing_page(&["11", "12"], Some(2)))
            .with_html(&listing_url(2), listing_page(&["21", "22"], None))
            .with_json(&product_url("11"), product_document("11", 2))
            .with_json(&product_url("12"), product_document("12", 1))
            .with_json(&product_url("21"), product_document("21", 2))
            .with_json(&product_url("22"), product_document("22", 3));
        let paginator = paginator(&transport, ExtractorConfig::default());

        let messages: Vec<Message> = paginator.items("sample").try_collect().await.unwrap();
        let expected: Vec<(String, usize)> = [
            ("11", 0),
            ("11", 1),
            ("11", 2),
            ("12", 0),
            ("12", 1),
            ("21", 0),
            ("21", 1),
            ("21", 2),
            ("22", 0),
            ("22", 1),
            ("22", 2),
            ("22", 3),
        ]
        .into_iter()
        .map(|(id, num)| (id.to_string(), num))
        .collect();
        assert_eq!(sequence(&messages), expected);

        assert_eq!(
            transport.requested_urls(),
            vec![
                listing_url(1),
                product_url("11"),
                product_url("12"),
                listing_url(2),
                product_url("21"),
                product_url("22"),
            ]
        );
    }

    #[tokio::test]
    async fn test_shop_subdomain_product_urls() {
        let shop_product_url = |id: &str| format!("https://sample.booth.pm/items/{id}");
        let transport = MockTransport::new()
            .with_html(&listing_url(1), listing_page(&["1"], Some(2)))
            .with_html(&listing_url(2), listing_page(&["2"], None))
            .with_json(&shop_product_url("1"), product_document("1", 2))
            .with_json(&shop_product_url("2"), product_document("2", 1));
        let config = ExtractorConfig::builder()
            .product_url_style(ProductUrlStyle::ShopSubdomain)
            .build();
        let paginator = paginator(&transport, config);

        let messages: Vec<Message> = paginator.items("sample").try_collect().await.unwrap();
        assert_eq!(
            sequence(&messages),
            vec![
                ("1".to_string(), 0),
                ("1".to_string(), 1),
                ("1".to_string(), 2),
                ("2".to_string(), 0),
                ("2".to_string(), 1),
            ]
        );
        assert_eq!(
            transport.requested_urls(),
            vec![
                listing_url(1),
                shop_product_url("1"),
                listing_url(2),
                shop_product_url("2"),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_listing_terminates() {
        let transport = MockTransport::new().with_html(&listing_url(1), "<html></html>");
        let paginator = paginator(&transport, ExtractorConfig::default());

        let messages: Vec<Message> = paginator.items("sample").try_collect().await.unwrap();
        assert!(messages.is_empty());
        assert_eq!(transport.requested_urls(), vec![listing_url(1)]);
    }

    #[tokio::test]
    async fn test_product_failure_aborts_by_default() {
        let transport = MockTransport::new()
            .with_html(&listing_url(1), listing_page(&["1", "2"], None))
            .with_json(&product_url("1"), json!({"images": []}))
            .with_json(&product_url("2"), product_document("2", 1));
        let paginator = paginator(&transport, ExtractorConfig::default());

        let result: Result<Vec<Message>> = paginator.items("sample").try_collect().await;
        assert!(matches!(result, Err(Error::MalformedMetadata(_))));
        assert!(!transport.requested_urls().contains(&product_url("2")));
    }

    #[tokio::test]
    async fn test_product_failure_skipped_when_configured() {
        let transport = MockTransport::new()
            .with_html(&listing_url(1), listing_page(&["1", "2"], None))
            .with_status(&product_url("1"), Accept::Json, 500)
            .with_json(&product_url("2"), product_document("2", 2));
        let config = ExtractorConfig::builder()
            .product_error_policy(ProductErrorPolicy::Skip)
            .build();
        let paginator = paginator(&transport, config);

        let messages: Vec<Message> = paginator.items("sample").try_collect().await.unwrap();
        assert_eq!(
            sequence(&messages),
            vec![("2".to_string(), 0), ("2".to_string(), 1), ("2".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn test_listing_failure_always_aborts() {
        let transport = MockTransport::new().with_status(&listing_url(1), Accept::Html, 502);
        let config = ExtractorConfig::builder()
            .product_error_policy(ProductErrorPolicy::Skip)
            .build();
        let paginator = paginator(&transport, config);

        let result: Result<Vec<Message>> = paginator.items("sample").try_collect().await;
        assert!(matches!(result, Err(Error::Fetch(_))));
    }

    #[tokio::test]
    async fn test_nothing_fetched_before_polled() {
        let transport = MockTransport::new()
            .with_html(&listing_url(1), listing_page(&["1"], Some(2)))
            .with_html(&listing_url(2), listing_page(&["2"], None))
            .with_json(&product_url("1"), product_document("1", 1))
            .with_json(&product_url("2"), product_document("2", 1));
        let paginator = paginator(&transport, ExtractorConfig::default());

        let stream = paginator.items("sample");
        assert!(transport.requests().is_empty());

        let first: Vec<Result<Message>> = stream.take(2).collect().await;
        assert_eq!(first.len(), 2);
        assert_eq!(transport.requested_urls(), vec![listing_url(1), product_url("1")]);
    }
}
