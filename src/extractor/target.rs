//! Input URL classification

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

static SHOP_PRODUCT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?([\w-]+)\.booth\.pm/items/(\d+)(?:[/?#].*)?$")
        .expect("valid regex")
});

static SITE_PRODUCT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.)?booth\.pm/(?:[\w-]+/)?items/(\d+)(?:[/?#].*)?$")
        .expect("valid regex")
});

static SHOP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?([\w-]+)\.booth\.pm(?:/(?:items/?)?)?(?:[?#].*)?$")
        .expect("valid regex")
});

static ITEM_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/items/(\d+)").expect("valid regex"));

/// What an input URL points at. Identifiers are fixed at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A single product page
    Product {
        /// Seller subdomain, absent for shared-domain URLs
        shop_id: Option<String>,
        /// Numeric product id
        product_id: String,
    },
    /// A seller's storefront
    Shop {
        /// Seller subdomain
        shop_id: String,
    },
}

impl Target {
    /// Classify `url`, trying the product shapes before the storefront shape.
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();

        if let Some(caps) = SHOP_PRODUCT_PATTERN.captures(url) {
            if !caps[1].eq_ignore_ascii_case("www") {
                return Ok(Target::Product {
                    shop_id: Some(caps[1].to_string()),
                    product_id: caps[2].to_string(),
                });
            }
        }

        if let Some(caps) = SITE_PRODUCT_PATTERN.captures(url) {
            return Ok(Target::Product {
                shop_id: None,
                product_id: caps[1].to_string(),
            });
        }

        if let Some(caps) = SHOP_PATTERN.captures(url) {
            if !caps[1].eq_ignore_ascii_case("www") {
                return Ok(Target::Shop {
                    shop_id: caps[1].to_string(),
                });
            }
        }

        Err(Error::UnsupportedUrl(url.to_string()))
    }

    /// Subcategory name used by download pipelines for this kind of target
    pub fn subcategory(&self) -> &'static str {
        match self {
            Target::Product { .. } => "product",
            Target::Shop { .. } => "shop",
        }
    }
}

/// Product id contained in an item URL taken from a storefront listing.
pub(crate) fn item_id(item_url: &str) -> Option<&str> {
    ITEM_ID_PATTERN
        .captures(item_url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
