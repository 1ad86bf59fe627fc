//! Storefront types: support links and product listings shown on a profile.

use serde::{Deserialize, Serialize};

/// External link where readers can support an author.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupportLink {
    pub url: String,
    pub display_name: String,
    pub description: Option<String>,
}

/// A product listing. Prices are display strings; checkout happens off-site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    pub description: String,
    pub price_display: String,
    pub checkout_url: String,
}

/// A user's storefront, owned 1:1 by an identity.
///
/// Saved as a whole document; there are no partial updates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Storefront {
    pub support_links: Vec<SupportLink>,
    pub products: Vec<Product>,
}

impl Storefront {
    #[must_use]
    pub const fn new(support_links: Vec<SupportLink>, products: Vec<Product>) -> Self {
        Self {
            support_links,
            products,
        }
    }

    /// True when there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.support_links.is_empty() && self.products.is_empty()
    }
}
