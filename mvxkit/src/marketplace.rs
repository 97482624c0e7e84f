//! Marketplace ABI table for purchase transactions.
//!
//! Each marketplace key maps to a contract address and the call shape used to
//! buy a listed token. Keys are case-insensitive; unknown keys resolve to the
//! `default` entry.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::address::Address;
use crate::error::{Error, Result};

/// Key of the fallback entry.
pub const DEFAULT_MARKETPLACE: &str = "default";

const EMBEDDED_TABLE: &str = include_str!("../config/marketplaces.json");

/// Call shape of a marketplace purchase endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceAbi {
    /// Endpoint name placed first in the data field.
    pub function: String,
    /// Semantic argument names, in call order.
    pub args_order: Vec<String>,
}

/// One marketplace contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceContract {
    /// Contract address receiving the purchase call.
    pub address: Address,
    /// Endpoint description.
    pub abi: MarketplaceAbi,
}

impl MarketplaceContract {
    /// Resolve the argument order into known argument kinds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the function name is empty or an
    /// argument name is not one the purchase builder can materialize.
    pub fn purchase_args(&self) -> Result<Vec<PurchaseArg>> {
        if self.abi.function.trim().is_empty() {
            return Err(Error::configuration(format!(
                "marketplace contract {} has no abi.function",
                self.address
            )));
        }
        self.abi
            .args_order
            .iter()
            .map(|name| name.parse())
            .collect()
    }
}

/// Argument kinds the purchase builder knows how to encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PurchaseArg {
    /// Token identifier as UTF-8 hex.
    TokenIdentifier,
    /// Token nonce, at least two hex digits.
    Nonce,
    /// Quantity, even-length hex.
    Quantity,
}

impl PurchaseArg {
    /// Name used in `args_order`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TokenIdentifier => "token_identifier",
            Self::Nonce => "nonce",
            Self::Quantity => "quantity",
        }
    }
}

impl fmt::Display for PurchaseArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PurchaseArg {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "token_identifier" => Ok(Self::TokenIdentifier),
            "nonce" => Ok(Self::Nonce),
            "quantity" => Ok(Self::Quantity),
            other => Err(Error::configuration(format!(
                "unknown purchase argument '{other}' in marketplace abi"
            ))),
        }
    }
}

/// Case-insensitive marketplace lookup with a mandatory default entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketplaceTable {
    default: MarketplaceContract,
    entries: HashMap<String, MarketplaceContract>,
}

impl MarketplaceTable {
    /// The table shipped with the crate (`default`, `xoxno`, `oox`).
    ///
    /// # Errors
    ///
    /// Returns an error only if the embedded JSON is inconsistent.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_TABLE)
    }

    /// Parse a JSON object keyed by marketplace name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for malformed JSON, a missing
    /// `default` entry, keys equal up to letter case, or an entry with an
    /// unusable ABI.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: HashMap<String, MarketplaceContract> = serde_json::from_str(text)
            .map_err(|e| Error::configuration(format!("invalid marketplace table: {e}")))?;

        let mut entries = HashMap::with_capacity(raw.len());
        for (key, contract) in raw {
            contract.purchase_args()?;
            let name = key.to_lowercase();
            if entries.contains_key(&name) {
                return Err(Error::configuration(format!(
                    "marketplace table has duplicate key '{name}' (keys ignore case)"
                )));
            }
            entries.insert(name, contract);
        }

        let default = entries.get(DEFAULT_MARKETPLACE).cloned().ok_or_else(|| {
            Error::configuration(format!(
                "marketplace table has no '{DEFAULT_MARKETPLACE}' entry"
            ))
        })?;

        debug!(marketplaces = entries.len(), "loaded marketplace table");
        Ok(Self { default, entries })
    }

    /// Load a table from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!(
                "cannot read marketplace table {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&text)
    }

    /// Look up a marketplace, falling back to `default`.
    #[must_use]
    pub fn resolve(&self, key: &str) -> &MarketplaceContract {
        self.entries
            .get(&key.trim().to_lowercase())
            .unwrap_or(&self.default)
    }

    /// Whether a key names an explicit entry.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&key.trim().to_lowercase())
    }

    /// Known marketplace keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    const OOX: &str = "erd1qqqqqqqqqqqqqpgqnuvmfape5atwn00epl5w4lcfzf2dzslpg8vsd60sm7";

    #[test]
    fn embedded_table_loads() {
        let table = MarketplaceTable::embedded().unwrap();
        assert_eq!(table.keys(), vec!["default", "oox", "xoxno"]);
    }

    #[test]
    fn resolve_is_case_insensitive() {
        let table = MarketplaceTable::embedded().unwrap();
        assert_eq!(table.resolve("XoXnO"), table.resolve("xoxno"));
        assert_eq!(table.resolve(" OOX "), table.resolve("oox"));
    }

    #[test]
    fn unknown_key_falls_back_to_default() {
        let table = MarketplaceTable::embedded().unwrap();
        assert_eq!(table.resolve("unknown-key"), table.resolve("default"));
        assert!(!table.contains("unknown-key"));
    }

    #[test]
    fn oox_uses_buy_nft() {
        let table = MarketplaceTable::embedded().unwrap();
        let oox = table.resolve("oox");
        assert_eq!(oox.abi.function, "buyNft");
        assert_eq!(oox.address.to_bech32(), OOX);
        assert_eq!(
            oox.purchase_args().unwrap(),
            vec![
                PurchaseArg::TokenIdentifier,
                PurchaseArg::Nonce,
                PurchaseArg::Quantity
            ]
        );
    }

    #[test]
    fn missing_default_is_rejected() {
        let json = format!(
            r#"{{"oox": {{"address": "{OOX}", "abi": {{"function": "buyNft", "args_order": []}}}}}}"#
        );
        let err = MarketplaceTable::from_json(&json).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn unknown_argument_name_is_rejected() {
        let json = format!(
            r#"{{"default": {{"address": "{OOX}", "abi": {{"function": "buy", "args_order": ["price"]}}}}}}"#
        );
        let err = MarketplaceTable::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn empty_function_is_rejected() {
        let json = format!(
            r#"{{"default": {{"address": "{OOX}", "abi": {{"function": "", "args_order": []}}}}}}"#
        );
        assert!(MarketplaceTable::from_json(&json).is_err());
    }

    #[test]
    fn invalid_address_is_rejected() {
        let json = r#"{"default": {"address": "erd1oox", "abi": {"function": "buy", "args_order": []}}}"#;
        assert!(matches!(
            MarketplaceTable::from_json(json),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn keys_are_lowercased_on_load() {
        let json = format!(
            r#"{{"Default": {{"address": "{OOX}", "abi": {{"function": "buy", "args_order": ["nonce"]}}}},
                "MyMarket": {{"address": "{OOX}", "abi": {{"function": "purchase", "args_order": ["quantity"]}}}}}}"#
        );
        let table = MarketplaceTable::from_json(&json).unwrap();
        assert_eq!(table.resolve("mymarket").abi.function, "purchase");
        assert_eq!(table.resolve("MYMARKET").abi.function, "purchase");
    }

    #[test]
    fn keys_differing_in_case_are_rejected() {
        let json = format!(
            r#"{{"default": {{"address": "{OOX}", "abi": {{"function": "buy", "args_order": ["nonce"]}}}},
                "OOX": {{"address": "{OOX}", "abi": {{"function": "buy", "args_order": ["nonce"]}}}},
                "oox": {{"address": "{OOX}", "abi": {{"function": "purchase", "args_order": ["quantity"]}}}}}}"#
        );
        let Err(Error::Configuration(message)) = MarketplaceTable::from_json(&json) else {
            panic!("expected a configuration error");
        };
        assert!(message.contains("'oox'"), "{message}");
    }

    #[test]
    fn from_file_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marketplaces.json");
        std::fs::write(&path, EMBEDDED_TABLE).unwrap();
        let table = MarketplaceTable::from_file(&path).unwrap();
        assert!(table.contains("xoxno"));

        assert!(MarketplaceTable::from_file(dir.path().join("missing.json")).is_err());
    }
}
