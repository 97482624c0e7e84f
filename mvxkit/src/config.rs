//! Runtime settings.
//!
//! [`Settings`] is a plain value built once at startup, either field by field
//! or from the `MVX_*` environment variables, and handed to the components
//! that need it.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::address::{Address, DEFAULT_SHARD_COUNT};
use crate::error::{Error, Result};
use crate::network::{Network, NetworkConfig};
use crate::registry::RegistryAddresses;
use crate::whitelist::DEFAULT_WHITELIST_PATH;

/// Whether mutating tools sign and broadcast or return templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigningMode {
    /// Return unsigned transactions for an external signer.
    #[default]
    Unsigned,
    /// Sign with the configured wallet and broadcast.
    Signed,
}

impl SigningMode {
    /// Whether signing is enabled.
    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(self, Self::Signed)
    }
}

impl fmt::Display for SigningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unsigned => "unsigned",
            Self::Signed => "signed",
        })
    }
}

impl FromStr for SigningMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "signed" => Ok(Self::Signed),
            "" | "unsigned" => Ok(Self::Unsigned),
            other => Err(Error::configuration(format!("unknown signing mode '{other}'"))),
        }
    }
}

/// Everything the tools need to know about their environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Network endpoints.
    pub network: NetworkConfig,
    /// Signing mode.
    pub signing_mode: SigningMode,
    /// PEM file of the signing wallet.
    pub wallet_pem: Option<PathBuf>,
    /// Directory of relayer PEM files, one per shard.
    pub wallet_dir: Option<PathBuf>,
    /// Agent registry contracts.
    pub registry: RegistryAddresses,
    /// Whitelist JSON file.
    pub whitelist_path: PathBuf,
    /// Marketplace table JSON file; the embedded table when unset.
    pub marketplaces_path: Option<PathBuf>,
    /// Number of shards used for relayer selection.
    pub shard_count: u32,
    /// Simulate relayed transactions before broadcast.
    pub simulate_relayed: bool,
    /// Filter search results through the whitelist.
    pub verified_search: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            signing_mode: SigningMode::default(),
            wallet_pem: None,
            wallet_dir: None,
            registry: RegistryAddresses::default(),
            whitelist_path: PathBuf::from(DEFAULT_WHITELIST_PATH),
            marketplaces_path: None,
            shard_count: DEFAULT_SHARD_COUNT,
            simulate_relayed: true,
            verified_search: false,
        }
    }
}

impl Settings {
    /// Settings from the process environment.
    ///
    /// # Errors
    ///
    /// See [`Settings::from_lookup`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Settings from any key lookup; empty values count as unset.
    ///
    /// An unknown `MVX_NETWORK` falls back to mainnet with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for an unknown signing mode, a
    /// malformed boolean or shard count, and [`Error::Validation`] for a
    /// malformed registry address.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let mut settings = Self::default();

        if let Some(name) = var("MVX_NETWORK") {
            let network = name.parse::<Network>().unwrap_or_else(|e| {
                warn!(network = %name, error = %e, "falling back to mainnet");
                Network::Mainnet
            });
            settings.network = NetworkConfig::for_network(network);
        }
        if let Some(url) = var("MVX_API_URL") {
            settings.network = settings.network.with_api_url(url);
        }
        if let Some(mode) = var("MVX_SIGNING_MODE") {
            settings.signing_mode = mode.parse()?;
        }
        settings.wallet_pem = var("MVX_WALLET_PEM").map(PathBuf::from);
        settings.wallet_dir = var("MVX_WALLET_DIR").map(PathBuf::from);

        if let Some(addr) = var("MVX_REGISTRY_IDENTITY") {
            settings.registry.identity = Address::from_bech32(&addr)?;
        }
        if let Some(addr) = var("MVX_REGISTRY_REPUTATION") {
            settings.registry.reputation = Address::from_bech32(&addr)?;
        }
        if let Some(addr) = var("MVX_REGISTRY_VALIDATION") {
            settings.registry.validation = Address::from_bech32(&addr)?;
        }

        if let Some(path) = var("MVX_WHITELIST_PATH") {
            settings.whitelist_path = PathBuf::from(path);
        }
        settings.marketplaces_path = var("MVX_MARKETPLACES_PATH").map(PathBuf::from);

        if let Some(count) = var("MVX_SHARD_COUNT") {
            settings.shard_count = count
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| Error::configuration(format!("invalid MVX_SHARD_COUNT '{count}'")))?;
        }
        if let Some(flag) = var("MVX_SIMULATE_RELAYED") {
            settings.simulate_relayed = parse_flag("MVX_SIMULATE_RELAYED", &flag)?;
        }
        if let Some(flag) = var("MVX_VERIFIED_SEARCH") {
            settings.verified_search = parse_flag("MVX_VERIFIED_SEARCH", &flag)?;
        }

        Ok(settings)
    }

    /// Whether mutating tools sign and broadcast.
    #[must_use]
    pub const fn is_signing_enabled(&self) -> bool {
        self.signing_mode.is_signed() && self.wallet_pem.is_some()
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::configuration(format!("invalid {key} '{value}'"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const REPUTATION: &str = "erd1qqqqqqqqqqqqqpgqqkts0uwjyd9rs5v2ys0u6g9va35luyrx3l6szjsurj";

    fn settings(vars: &[(&str, &str)]) -> Result<Settings> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let settings = settings(&[]).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.network.chain_id, "1");
        assert_eq!(settings.shard_count, 3);
        assert!(settings.simulate_relayed);
        assert!(!settings.verified_search);
        assert!(!settings.is_signing_enabled());
    }

    #[test]
    fn network_and_api_override() {
        let settings = settings(&[
            ("MVX_NETWORK", "devnet"),
            ("MVX_API_URL", "http://localhost:3001/"),
        ])
        .unwrap();
        assert_eq!(settings.network.chain_id, "D");
        assert_eq!(settings.network.api_url, "http://localhost:3001");
        assert_eq!(settings.network.explorer_url, "https://devnet-explorer.multiversx.com");
    }

    #[test]
    fn unknown_network_falls_back_to_mainnet() {
        let settings = settings(&[("MVX_NETWORK", "moonnet")]).unwrap();
        assert_eq!(settings.network, NetworkConfig::default());
    }

    #[test]
    fn signing_needs_mode_and_pem() {
        let mode_only = settings(&[("MVX_SIGNING_MODE", "signed")]).unwrap();
        assert!(!mode_only.is_signing_enabled());

        let both = settings(&[("MVX_SIGNING_MODE", "Signed"), ("MVX_WALLET_PEM", "w.pem")]).unwrap();
        assert!(both.is_signing_enabled());

        assert!(settings(&[("MVX_SIGNING_MODE", "maybe")]).is_err());
    }

    #[test]
    fn registry_overrides() {
        let settings = settings(&[("MVX_REGISTRY_REPUTATION", REPUTATION)]).unwrap();
        assert_eq!(settings.registry.reputation.to_bech32(), REPUTATION);
        assert_eq!(settings.registry.identity, RegistryAddresses::default().identity);
    }

    #[test]
    fn malformed_registry_address_is_rejected() {
        assert!(matches!(
            settings(&[("MVX_REGISTRY_IDENTITY", "erd1nope")]),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn flags_and_shards() {
        let settings = settings(&[
            ("MVX_SIMULATE_RELAYED", "false"),
            ("MVX_VERIFIED_SEARCH", "1"),
            ("MVX_SHARD_COUNT", "4"),
            ("MVX_WHITELIST_PATH", "/etc/mvx/wl.json"),
        ])
        .unwrap();
        assert!(!settings.simulate_relayed);
        assert!(settings.verified_search);
        assert_eq!(settings.shard_count, 4);
        assert_eq!(settings.whitelist_path, PathBuf::from("/etc/mvx/wl.json"));
    }

    #[test]
    fn zero_shards_is_rejected() {
        assert!(matches!(
            settings(&[("MVX_SHARD_COUNT", "0")]),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn blank_values_are_unset() {
        let settings = settings(&[("MVX_WALLET_PEM", "  "), ("MVX_NETWORK", "")]).unwrap();
        assert!(settings.wallet_pem.is_none());
        assert_eq!(settings.network.network, Network::Mainnet);
    }
}
