//! Typed records decoded from upstream JSON.
//!
//! Every field the API may omit is optional or defaulted so that a sparse
//! record still decodes. Numbers that the API sends either as strings or as
//! JSON numbers are accepted in both shapes.

use alloy::primitives::U256;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::address::Address;

/// `GET accounts/{address}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountOnNetwork {
    /// Account address.
    pub address: Address,
    /// Balance in atomic units.
    #[serde(default, deserialize_with = "biguint_text")]
    pub balance: U256,
    /// Next nonce to use.
    #[serde(default)]
    pub nonce: u64,
    /// Shard reported by the API.
    #[serde(default)]
    pub shard: Option<u32>,
    /// Herotag, when registered.
    #[serde(default)]
    pub username: Option<String>,
}

/// One entry of a transaction's `operations`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TransactionOperation {
    /// Operation kind (`transfer`, `signalError` ...).
    #[serde(default)]
    pub action: Option<String>,
    /// Human-readable message, set for failures.
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET transactions/{hash}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOnNetwork {
    /// Transaction hash.
    #[serde(default, alias = "hash")]
    pub tx_hash: String,
    /// Raw upstream status (`pending`, `success`, `fail` ...).
    #[serde(default)]
    pub status: String,
    /// Sender address text.
    #[serde(default)]
    pub sender: Option<String>,
    /// Receiver address text.
    #[serde(default)]
    pub receiver: Option<String>,
    /// Base64 data field.
    #[serde(default)]
    pub data: Option<String>,
    /// Decoded function name, when the API recognised one.
    #[serde(default)]
    pub function: Option<String>,
    /// Nonce.
    #[serde(default)]
    pub nonce: Option<u64>,
    /// Block timestamp in seconds.
    #[serde(default)]
    pub timestamp: Option<i64>,
    /// Executed operations.
    #[serde(default)]
    pub operations: Vec<TransactionOperation>,
}

impl TransactionOnNetwork {
    /// Message of the first operation, if any.
    #[must_use]
    pub fn failure_message(&self) -> Option<&str> {
        self.operations.first()?.message.as_deref()
    }
}

/// One item of `GET transactions?receiver=...`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    /// Transaction hash.
    #[serde(default)]
    pub tx_hash: String,
    /// Sender address text.
    #[serde(default)]
    pub sender: Option<String>,
    /// Receiver address text.
    #[serde(default)]
    pub receiver: Option<String>,
    /// Base64 data field.
    #[serde(default)]
    pub data: Option<String>,
    /// Decoded function name.
    #[serde(default)]
    pub function: Option<String>,
    /// Block timestamp in seconds.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl TransactionSummary {
    /// The data field as text, empty when absent or not base64.
    #[must_use]
    pub fn data_text(&self) -> String {
        self.data
            .as_deref()
            .and_then(|data| BASE64.decode(data).ok())
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default()
    }
}

/// One item of `GET nfts`.
///
/// Fields with an unexpected JSON type decode as `None` instead of failing
/// the item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftItem {
    /// `TICKER-hash-nonce` identifier.
    #[serde(default, deserialize_with = "lenient")]
    pub identifier: Option<String>,
    /// Collection identifier.
    #[serde(default, deserialize_with = "lenient")]
    pub collection: Option<String>,
    /// Display name.
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    /// Token nonce.
    #[serde(default, deserialize_with = "lenient")]
    pub nonce: Option<u64>,
    /// Base64 attributes.
    #[serde(default, deserialize_with = "lenient")]
    pub attributes: Option<String>,
    /// Listing price in atomic units.
    #[serde(default, deserialize_with = "optional_text")]
    pub price: Option<String>,
    /// Primary media URL.
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
    /// Thumbnail URL.
    #[serde(default, deserialize_with = "lenient")]
    pub thumbnail_url: Option<String>,
    /// Current owner.
    #[serde(default, deserialize_with = "lenient")]
    pub owner: Option<String>,
    /// Mint timestamp in seconds.
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: Option<i64>,
}

impl NftItem {
    /// Primary URL, else thumbnail, else empty.
    #[must_use]
    pub fn image_url(&self) -> &str {
        self.url
            .as_deref()
            .filter(|u| !u.is_empty())
            .or_else(|| self.thumbnail_url.as_deref().filter(|u| !u.is_empty()))
            .unwrap_or("")
    }
}

/// Result of `GET accounts/{contract}/vm-values/{view}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VmQueryOutput {
    /// Base64 return values.
    pub return_data: Vec<String>,
    /// VM return code, when reported.
    pub return_code: Option<String>,
}

impl VmQueryOutput {
    /// Extract from any of the nestings the API uses:
    /// `data.data.returnData`, `data.returnData`, or `returnData`.
    #[must_use]
    pub fn from_response(body: &Value) -> Self {
        let candidates = [
            body.pointer("/data/data"),
            body.pointer("/data"),
            Some(body),
        ];
        let Some(node) = candidates
            .into_iter()
            .flatten()
            .find(|node| node.get("returnData").is_some_and(Value::is_array))
        else {
            return Self::default();
        };

        let return_data = node["returnData"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|item| item.as_str().unwrap_or_default().to_owned())
                    .collect()
            })
            .unwrap_or_default();
        let return_code = node
            .get("returnCode")
            .and_then(Value::as_str)
            .map(str::to_owned);

        Self {
            return_data,
            return_code,
        }
    }

    /// First return value, if present and non-empty.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.return_data
            .first()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Result of `POST transaction/simulate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationOutcome {
    /// Execution status; `success` when the transaction would pass.
    pub status: String,
    /// Failure reason, when reported.
    pub message: Option<String>,
    /// Hash the transaction would have.
    pub hash: Option<String>,
}

impl SimulationOutcome {
    /// Whether the simulated execution succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// Extract the outcome from a simulation response.
    ///
    /// Intra-shard results carry `data.result.status`; cross-shard results
    /// carry a status per shard and succeed only when every shard does.
    #[must_use]
    pub fn from_response(body: &Value) -> Self {
        let result = body
            .pointer("/data/result")
            .or_else(|| body.get("result"))
            .unwrap_or(body);

        let text = |node: &Value, key: &str| node.get(key).and_then(Value::as_str).map(str::to_owned);

        let status = if let Some(status) = text(result, "status") {
            status
        } else {
            let shards: Vec<&Value> = ["senderShard", "receiverShard"]
                .iter()
                .filter_map(|key| result.get(*key))
                .collect();
            if shards.is_empty() {
                body.pointer("/execution/result")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_owned()
            } else if shards
                .iter()
                .all(|shard| shard.get("status").and_then(Value::as_str) == Some("success"))
            {
                "success".to_owned()
            } else {
                shards
                    .iter()
                    .filter_map(|shard| shard.get("status").and_then(Value::as_str))
                    .find(|status| *status != "success")
                    .unwrap_or("unknown")
                    .to_owned()
            }
        };

        let message = text(result, "failReason")
            .or_else(|| body.get("error").and_then(Value::as_str).filter(|e| !e.is_empty()).map(str::to_owned))
            .or_else(|| body.pointer("/execution/message").and_then(Value::as_str).map(str::to_owned));

        Self {
            status,
            message,
            hash: text(result, "hash"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
}

impl TextOrNumber {
    fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

fn biguint_text<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    let text = TextOrNumber::deserialize(deserializer)?.into_text();
    U256::from_str_radix(text.trim(), 10).map_err(serde::de::Error::custom)
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).ok())
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<TextOrNumber>::deserialize(deserializer)?
        .map(TextOrNumber::into_text)
        .filter(|text| !text.is_empty()))
}
