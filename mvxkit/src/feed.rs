//! Merchant feed projection of product search results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::NetworkProvider;
use crate::search::{Availability, Product, SearchMode, search_products};

/// Search term of the showcase feed.
pub const FEED_QUERY: &str = "EGLD";

/// Products fetched for the feed.
pub const FEED_LIMIT: usize = 50;

/// Marketplace page prefix for item links.
pub const ITEM_LINK_BASE: &str = "https://xexchange.com/nft/";

const CURRENCY: &str = "EGLD";
const BRAND: &str = "MultiversX";
const CONDITION: &str = "new";

/// Price of a feed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPrice {
    /// Amount text.
    pub value: String,
    /// Currency code.
    pub currency: String,
}

/// One entry of the merchant feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Token identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Marketplace page.
    pub link: String,
    /// Image URL.
    pub image_link: String,
    /// Stock state.
    pub availability: Availability,
    /// Price.
    pub price: FeedPrice,
    /// Brand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Item condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl From<Product> for FeedItem {
    fn from(product: Product) -> Self {
        let value = product
            .price
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_owned();
        Self {
            link: format!("{ITEM_LINK_BASE}{}", product.id),
            title: product.name,
            description: product.description,
            image_link: product.image_url,
            availability: product.availability,
            price: FeedPrice {
                value,
                currency: CURRENCY.to_owned(),
            },
            brand: Some(BRAND.to_owned()),
            condition: Some(CONDITION.to_owned()),
            id: product.id,
        }
    }
}

/// Fetch the showcase products and project them into feed items.
pub async fn build_feed(provider: &NetworkProvider, mode: SearchMode<'_>) -> Vec<FeedItem> {
    search_products(provider, FEED_QUERY, None, FEED_LIMIT, mode)
        .await
        .into_iter()
        .map(FeedItem::from)
        .collect()
}

/// Outcome of [`validate_feed`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedReport {
    /// No errors were found.
    pub valid: bool,
    /// One message per missing field.
    pub errors: Vec<String>,
}

/// Check that every item of a feed document carries the required fields.
///
/// Empty strings, `null`, `false` and zero count as missing.
#[must_use]
pub fn validate_feed(items: &Value) -> FeedReport {
    let Some(items) = items.as_array() else {
        return FeedReport {
            valid: false,
            errors: vec!["Feed root must be an array of items".to_owned()],
        };
    };

    let mut errors = Vec::new();
    for (index, item) in items.iter().enumerate() {
        for field in ["id", "title", "description", "link", "image_link", "availability"] {
            if is_blank(item.get(field)) {
                errors.push(format!("Item {index}: Missing '{field}'"));
            }
        }
        match item.get("price").filter(|p| !is_blank(Some(p))) {
            None => errors.push(format!("Item {index}: Missing 'price' object")),
            Some(price) => {
                for field in ["value", "currency"] {
                    if is_blank(price.get(field)) {
                        errors.push(format!("Item {index}: Missing 'price.{field}'"));
                    }
                }
            }
        }
    }

    FeedReport {
        valid: errors.is_empty(),
        errors,
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null | Value::Bool(false)) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(_) => false,
    }
}
