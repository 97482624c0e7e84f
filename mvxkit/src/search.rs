//! Product search over NFTs and SFTs.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::{NetworkProvider, NftItem, NftQuery};
use crate::whitelist::Whitelist;

/// Results returned when the caller gives no limit.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Description when an item carries no attributes.
pub const NO_DESCRIPTION: &str = "No description";

/// Price text of public results without a listing.
pub const NOT_ON_SALE_PUBLIC: &str = "Not on sale (or auction)";

/// Price text of verified results without a listing.
pub const NOT_ON_SALE: &str = "Not on sale";

/// Provenance of a product record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustLevel {
    /// Straight from the public API.
    PublicApi,
    /// Collection is whitelisted.
    VerifiedMarketplace,
}

/// Stock state of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// Listed.
    InStock,
}

/// Chain metadata of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductMetadata {
    /// Token nonce.
    pub nonce: u64,
    /// Collection identifier.
    pub token_identifier: String,
    /// Provenance.
    pub trust_level: TrustLevel,
    /// RFC 3339 time the record was produced, for verified results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// A purchasable NFT or SFT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Full token identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Description or [`NO_DESCRIPTION`].
    pub description: String,
    /// `<amount> atomic units` or a not-on-sale text.
    pub price: String,
    /// Image URL, possibly empty.
    pub image_url: String,
    /// Stock state.
    pub availability: Availability,
    /// Chain metadata.
    pub metadata: ProductMetadata,
}

/// How search results are filtered and labelled.
#[derive(Debug, Clone, Copy)]
pub enum SearchMode<'a> {
    /// Every item with an identifier.
    Public,
    /// Only items whose collection is whitelisted.
    Verified(&'a Whitelist),
}

/// Search the public API for products.
///
/// Upstream failures yield an empty list.
pub async fn search_products(
    provider: &NetworkProvider,
    query: &str,
    collection: Option<&str>,
    limit: usize,
    mode: SearchMode<'_>,
) -> Vec<Product> {
    let request = NftQuery::products(query, limit).with_collection(collection.map(str::to_owned));
    match provider.search_nfts(&request).await {
        Ok(items) => {
            let products = normalize(items, mode);
            debug!(query, found = products.len(), "product search");
            products
        }
        Err(e) => {
            warn!(query, error = %e, "product search failed");
            Vec::new()
        }
    }
}

/// Turn raw NFT items into products. Items without identifier are skipped.
#[must_use]
pub fn normalize(items: Vec<NftItem>, mode: SearchMode<'_>) -> Vec<Product> {
    let now = match mode {
        SearchMode::Public => None,
        SearchMode::Verified(_) => Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    };

    items
        .into_iter()
        .filter_map(|item| {
            let id = item.identifier.clone().filter(|id| !id.is_empty())?;
            let prefix = collection_prefix(&id);

            let (token_identifier, trust_level, sentinel) = match mode {
                SearchMode::Public => (prefix, TrustLevel::PublicApi, NOT_ON_SALE_PUBLIC),
                SearchMode::Verified(whitelist) => {
                    let collection = item
                        .collection
                        .clone()
                        .filter(|c| !c.is_empty())
                        .unwrap_or(prefix);
                    if !whitelist.contains(&collection) {
                        return None;
                    }
                    (collection, TrustLevel::VerifiedMarketplace, NOT_ON_SALE)
                }
            };

            Some(Product {
                name: item.name.clone().unwrap_or_default(),
                description: if item.attributes.as_deref().is_some_and(|a| !a.is_empty()) {
                    "Attributes present".to_owned()
                } else {
                    NO_DESCRIPTION.to_owned()
                },
                price: item
                    .price
                    .as_deref()
                    .map_or_else(|| sentinel.to_owned(), |p| format!("{p} atomic units")),
                image_url: item.image_url().to_owned(),
                availability: Availability::InStock,
                metadata: ProductMetadata {
                    nonce: item.nonce.or_else(|| identifier_nonce(&id)).unwrap_or_default(),
                    token_identifier,
                    trust_level,
                    last_updated: now.clone(),
                },
                id,
            })
        })
        .collect()
}

/// First two dash segments of an identifier: `TEST-abcdef-01` gives `TEST-abcdef`.
#[must_use]
pub fn collection_prefix(identifier: &str) -> String {
    identifier.splitn(3, '-').take(2).collect::<Vec<_>>().join("-")
}

fn identifier_nonce(identifier: &str) -> Option<u64> {
    let mut parts = identifier.splitn(3, '-');
    parts.next()?;
    parts.next()?;
    u64::from_str_radix(parts.next()?, 16).ok()
}
