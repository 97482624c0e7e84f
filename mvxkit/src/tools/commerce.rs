//! Shopping tools: product search, purchase templates, order tracking.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use super::ToolContext;
use crate::error::Result;
use crate::search::{DEFAULT_SEARCH_LIMIT, search_products};
use crate::tool::{Tool, ToolResponse};
use crate::tracking::{track, track_verified};
use crate::transaction::{PurchaseItem, parse_field_address};

/// Arguments of `track-transaction`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TrackArgs {
    /// The transaction hash to track.
    pub tx_hash: String,
}

/// Reduced status of a transaction.
#[derive(Debug)]
pub struct TrackTransactionTool(pub Arc<ToolContext>);

#[async_trait]
impl Tool for TrackTransactionTool {
    const NAME: &'static str = "track-transaction";
    type Args = TrackArgs;

    fn description(&self) -> String {
        "Track the status of a transaction hash".to_owned()
    }

    async fn call(&self, args: TrackArgs) -> ToolResponse {
        let status = if self.0.settings().verified_search {
            track_verified(self.0.provider(), self.0.whitelist(), &args.tx_hash).await
        } else {
            track(self.0.provider(), &args.tx_hash).await
        };
        ToolResponse::json(&status)
    }
}

/// Arguments of `search-products`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SearchArgs {
    /// Search term (e.g., 'Chair', 'Art').
    pub query: String,
    /// Optional collection identifier filter.
    #[serde(default)]
    pub collection: Option<String>,
    /// Maximum number of results (default 5).
    #[serde(default)]
    pub limit: Option<usize>,
}

/// NFT/SFT search normalized into products.
#[derive(Debug)]
pub struct SearchProductsTool(pub Arc<ToolContext>);

#[async_trait]
impl Tool for SearchProductsTool {
    const NAME: &'static str = "search-products";
    type Args = SearchArgs;

    fn description(&self) -> String {
        "Search for NFTs/SFTs (products) on MultiversX".to_owned()
    }

    async fn call(&self, args: SearchArgs) -> ToolResponse {
        let collection = args.collection.as_deref().map(str::trim).filter(|c| !c.is_empty());
        let products = search_products(
            self.0.provider(),
            args.query.trim(),
            collection,
            args.limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
            self.0.search_mode(),
        )
        .await;
        ToolResponse::json(&products)
    }
}

fn default_quantity() -> u64 {
    1
}

fn default_marketplace() -> String {
    crate::marketplace::DEFAULT_MARKETPLACE.to_owned()
}

/// Arguments of `create-purchase-transaction`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PurchaseArgs {
    /// The token identifier of the product.
    pub token_identifier: String,
    /// The nonce of the NFT/SFT.
    pub nonce: u64,
    /// Quantity to buy (default 1).
    #[serde(default = "default_quantity")]
    pub quantity: u64,
    /// Marketplace key (default, xoxno, oox).
    #[serde(default = "default_marketplace")]
    pub marketplace: String,
    /// Buyer address, when known.
    #[serde(default)]
    pub sender: Option<String>,
}

/// Unsigned marketplace purchase payload.
#[derive(Debug)]
pub struct CreatePurchaseTransactionTool(pub Arc<ToolContext>);

impl CreatePurchaseTransactionTool {
    fn payload(&self, args: &PurchaseArgs) -> Result<serde_json::Value> {
        let sender = args
            .sender
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| parse_field_address("sender", s))
            .transpose()?;
        let contract = self.0.marketplaces().resolve(&args.marketplace);
        let item = PurchaseItem {
            token_identifier: args.token_identifier.trim().to_owned(),
            nonce: args.nonce,
            quantity: args.quantity,
        };
        let tx = self.0.builder().purchase(contract, sender, &item)?;

        let mut payload = json!({
            "receiver": tx.receiver.to_bech32(),
            "value": tx.value.to_string(),
            "data": tx.data_text(),
            "gasLimit": tx.gas_limit,
            "chainID": tx.chain_id,
        });
        if let Some(sender) = tx.sender {
            payload["sender"] = json!(sender.to_bech32());
        }
        Ok(payload)
    }
}

#[async_trait]
impl Tool for CreatePurchaseTransactionTool {
    const NAME: &'static str = "create-purchase-transaction";
    type Args = PurchaseArgs;

    fn description(&self) -> String {
        "Create an unsigned transaction for interactive product purchase".to_owned()
    }

    async fn call(&self, args: PurchaseArgs) -> ToolResponse {
        match self.payload(&args) {
            Ok(payload) => ToolResponse::json(&payload),
            Err(e) => ToolResponse::error(format!("Error creating purchase transaction: {e}")),
        }
    }
}
