//! # Extractor Configuration Module
//!
//! Site roots, URL shapes and failure policy for the extractor, with a builder for
//! overriding individual settings.
//!
//! The site has served product pages under two URL shapes over its lifetime: a path
//! on the seller's own subdomain, and a localized path on the shared domain. Which
//! one is used is a configuration choice ([`ProductUrlStyle`]), as is what a
//! storefront walk does when a single product cannot be resolved
//! ([`ProductErrorPolicy`]).

use std::time::Duration;

/// Placeholder replaced by the seller id in [`ExtractorConfig::shop_root`]
pub const SHOP_PLACEHOLDER: &str = "{shop}";

/// Which URL shape product pages are requested under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductUrlStyle {
    /// `https://SHOP.booth.pm/items/ID`
    ShopSubdomain,
    /// `https://booth.pm/LANG/items/ID`
    #[default]
    Localized,
}

/// What a storefront walk does when one of its products fails to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductErrorPolicy {
    /// End the walk with the product's error
    #[default]
    Abort,
    /// Log the error and continue with the next product
    Skip,
}

/// Configuration for the extractor
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Root of the shared domain
    pub site_root: String,

    /// Root of a seller's storefront, with `{shop}` standing for the seller id
    pub shop_root: String,

    /// Language segment used by localized product URLs
    pub language: String,

    /// URL shape for product pages
    pub product_url_style: ProductUrlStyle,

    /// Failure handling for products discovered through a storefront
    pub product_error_policy: ProductErrorPolicy,

    /// User agent to use for requests
    pub user_agent: String,

    /// Request timeout in seconds for [`crate::http::HttpTransport`]
    pub timeout_secs: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            site_root: "https://booth.pm".to_string(),
            shop_root: format!("https://{SHOP_PLACEHOLDER}.booth.pm"),
            language: "en".to_string(),
            product_url_style: ProductUrlStyle::default(),
            product_error_policy: ProductErrorPolicy::default(),
            user_agent: format!("booth-extract/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
        }
    }
}

/// Builder for ExtractorConfig
#[derive(Debug, Default)]
pub struct ExtractorConfigBuilder {
    config: ExtractorConfig,
}

impl ExtractorConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: ExtractorConfig::default(),
        }
    }

    /// Set the root of the shared domain
    pub fn site_root(mut self, site_root: impl Into<String>) -> Self {
        self.config.site_root = site_root.into();
        self
    }

    /// Set the storefront root template
    pub fn shop_root(mut self, shop_root: impl Into<String>) -> Self {
        self.config.shop_root = shop_root.into();
        self
    }

    /// Set the language segment of localized product URLs
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.config.language = language.into();
        self
    }

    /// Set the URL shape for product pages
    pub fn product_url_style(mut self, style: ProductUrlStyle) -> Self {
        self.config.product_url_style = style;
        self
    }

    /// Set what a storefront walk does with a failing product
    pub fn product_error_policy(mut self, policy: ProductErrorPolicy) -> Self {
        self.config.product_error_policy = policy;
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout in seconds
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.config.timeout_secs = timeout_secs;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ExtractorConfig {
        self.config
    }
}

impl ExtractorConfig {
    /// Create a new builder
    pub fn builder() -> ExtractorConfigBuilder {
        ExtractorConfigBuilder::new()
    }

    /// Storefront root for `shop_id`, without a trailing slash
    pub fn shop_root_for(&self, shop_id: &str) -> String {
        self.shop_root
            .replace(SHOP_PLACEHOLDER, shop_id)
            .trim_end_matches('/')
            .to_string()
    }

    /// Get the request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
