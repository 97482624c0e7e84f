//! Network name resolution.
//!
//! Maps a network name to its API base URL, chain identifier and explorer URL.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Known MultiversX networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Mainnet (chain ID "1").
    #[default]
    Mainnet,
    /// Devnet (chain ID "D").
    Devnet,
    /// Testnet (chain ID "T").
    Testnet,
}

impl Network {
    /// Lowercase network name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Devnet => "devnet",
            Self::Testnet => "testnet",
        }
    }

    /// Chain identifier used in transactions.
    #[must_use]
    pub const fn chain_id(&self) -> &'static str {
        match self {
            Self::Mainnet => "1",
            Self::Devnet => "D",
            Self::Testnet => "T",
        }
    }

    /// Default public API base URL.
    #[must_use]
    pub const fn api_url(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://api.multiversx.com",
            Self::Devnet => "https://devnet-api.multiversx.com",
            Self::Testnet => "https://testnet-api.multiversx.com",
        }
    }

    /// Explorer base URL.
    #[must_use]
    pub const fn explorer_url(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://explorer.multiversx.com",
            Self::Devnet => "https://devnet-explorer.multiversx.com",
            Self::Testnet => "https://testnet-explorer.multiversx.com",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "devnet" => Ok(Self::Devnet),
            "testnet" => Ok(Self::Testnet),
            other => Err(Error::configuration(format!("unknown network '{other}'"))),
        }
    }
}

/// Resolved network endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network name.
    pub network: Network,
    /// API base URL, without trailing slash.
    pub api_url: String,
    /// Chain identifier.
    pub chain_id: String,
    /// Explorer base URL.
    pub explorer_url: String,
}

impl NetworkConfig {
    /// Endpoints for a known network.
    #[must_use]
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            api_url: network.api_url().to_owned(),
            chain_id: network.chain_id().to_owned(),
            explorer_url: network.explorer_url().to_owned(),
        }
    }

    /// Override the API base URL, keeping chain and explorer.
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Explorer link for a transaction hash.
    #[must_use]
    pub fn transaction_url(&self, hash: &str) -> String {
        format!("{}/transactions/{hash}", self.explorer_url)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::for_network(Network::Mainnet)
    }
}
