//! Typed access to the MultiversX REST API.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::http::HttpTransport;
use super::transport::ApiTransport;
use super::types::{
    AccountOnNetwork, NftItem, SimulationOutcome, TransactionOnNetwork, TransactionSummary,
    VmQueryOutput,
};
use crate::address::Address;
use crate::error::{ApiError, Result};
use crate::network::NetworkConfig;
use crate::transaction::Transaction;

/// Token types searched for products.
pub const PRODUCT_TYPES: &str = "NonFungibleESDT,SemiFungibleESDT";

/// Token type of agent identity NFTs.
pub const AGENT_TYPES: &str = "NonFungibleESDT";

/// Parameters of `GET nfts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftQuery {
    /// Free-text search, omitted when empty.
    pub search: String,
    /// Page size.
    pub size: usize,
    /// Comma-separated token types.
    pub types: String,
    /// Restrict to one collection.
    pub collection: Option<String>,
}

impl NftQuery {
    /// Product search: NFTs and SFTs matching `search`.
    #[must_use]
    pub fn products(search: impl Into<String>, size: usize) -> Self {
        Self {
            search: search.into(),
            size,
            types: PRODUCT_TYPES.to_owned(),
            collection: None,
        }
    }

    /// Agent search: NFTs only.
    #[must_use]
    pub fn agents(search: impl Into<String>, size: usize) -> Self {
        Self {
            types: AGENT_TYPES.to_owned(),
            ..Self::products(search, size)
        }
    }

    /// Restrict to one collection.
    #[must_use]
    pub fn with_collection(mut self, collection: Option<String>) -> Self {
        self.collection = collection.filter(|c| !c.is_empty());
        self
    }

    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if !self.search.is_empty() {
            pairs.push(("search", self.search.clone()));
        }
        pairs.push(("size", self.size.to_string()));
        pairs.push(("type", self.types.clone()));
        if let Some(collection) = &self.collection {
            pairs.push(("collection", collection.clone()));
        }
        pairs
    }
}

/// Network reads and broadcasts over an [`ApiTransport`].
#[derive(Debug, Clone)]
pub struct NetworkProvider {
    transport: Arc<dyn ApiTransport>,
}

impl NetworkProvider {
    /// Provider over any transport.
    #[must_use]
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }

    /// Provider over HTTP to the network's API URL.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn http(network: &NetworkConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new(network.api_url.clone())?)))
    }

    /// Underlying transport.
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn ApiTransport> {
        &self.transport
    }

    /// `GET accounts/{address}`.
    ///
    /// # Errors
    ///
    /// Upstream failures, including [`ApiError::NotFound`].
    pub async fn get_account(&self, address: &Address) -> Result<AccountOnNetwork> {
        let path = format!("accounts/{address}");
        let body = self.transport.get(&path, &[]).await?;
        Ok(decode(&path, body)?)
    }

    /// `GET transactions/{hash}`.
    ///
    /// # Errors
    ///
    /// Upstream failures; a transaction not yet indexed is
    /// [`ApiError::NotFound`].
    pub async fn get_transaction(&self, hash: &str) -> Result<TransactionOnNetwork> {
        let path = format!("transactions/{hash}");
        let body = self.transport.get(&path, &[]).await?;
        Ok(decode(&path, body)?)
    }

    /// `GET nfts`. Entries that are not objects are logged and dropped.
    ///
    /// # Errors
    ///
    /// Upstream failures, or a response that is not an array.
    pub async fn search_nfts(&self, query: &NftQuery) -> Result<Vec<NftItem>> {
        let pairs = query.pairs();
        let body = self.transport.get("nfts", &pairs).await?;
        let Value::Array(items) = body else {
            return Err(ApiError::decode("nfts: expected an array").into());
        };
        let total = items.len();
        let decoded: Vec<NftItem> = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item.clone()) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    warn!(%item, error = %e, "dropping undecodable nft item");
                    None
                }
            })
            .collect();
        debug!(search = %query.search, total, decoded = decoded.len(), "nft search");
        Ok(decoded)
    }

    /// `GET accounts/{contract}/vm-values/{view}` with hex-encoded arguments.
    ///
    /// # Errors
    ///
    /// Upstream failures.
    pub async fn query_contract(
        &self,
        contract: &Address,
        view: &str,
        args: &[String],
    ) -> Result<VmQueryOutput> {
        let path = format!("accounts/{contract}/vm-values/{view}");
        let pairs: Vec<(&str, String)> = args.iter().map(|arg| ("args", arg.clone())).collect();
        let body = self.transport.get(&path, &pairs).await?;
        Ok(VmQueryOutput::from_response(&body))
    }

    /// Most recent transactions received by `receiver`, newest first.
    ///
    /// # Errors
    ///
    /// Upstream failures, or a response that is not an array.
    pub async fn transactions_to(
        &self,
        receiver: &Address,
        size: usize,
    ) -> Result<Vec<TransactionSummary>> {
        let pairs = [
            ("receiver", receiver.to_bech32()),
            ("size", size.to_string()),
            ("order", "desc".to_owned()),
        ];
        let body = self.transport.get("transactions", &pairs).await?;
        Ok(decode("transactions", body)?)
    }

    /// `POST transactions`; returns the transaction hash.
    ///
    /// # Errors
    ///
    /// Upstream failures, or a response without a hash.
    pub async fn send_transaction(&self, tx: &Transaction) -> Result<String> {
        let body = serde_json::to_value(tx)?;
        let response = self.transport.post("transactions", &body).await?;
        let hash = response
            .get("txHash")
            .or_else(|| response.pointer("/data/txHash"))
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::decode("transactions: response has no txHash"))?
            .to_owned();
        info!(tx_hash = %hash, nonce = tx.nonce, "broadcast transaction");
        Ok(hash)
    }

    /// `POST transaction/simulate`.
    ///
    /// # Errors
    ///
    /// Upstream failures.
    pub async fn simulate_transaction(&self, tx: &Transaction) -> Result<SimulationOutcome> {
        let body = serde_json::to_value(tx)?;
        let response = self.transport.post("transaction/simulate", &body).await?;
        let outcome = SimulationOutcome::from_response(&response);
        debug!(status = %outcome.status, "simulated transaction");
        Ok(outcome)
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: Value) -> std::result::Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::decode(format!("{path}: {e}")))
}
