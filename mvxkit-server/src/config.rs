//! Configuration file for the `mvxkit` binary.
//!
//! Settings are resolved in three layers:
//! 1. `MVX_*` environment variables
//! 2. Config file (`~/.mvxkit/config.toml`)
//! 3. Command-line flags

use std::path::{Path, PathBuf};

use mvxkit::address::Address;
use mvxkit::config::{Settings, SigningMode};
use mvxkit::network::{Network, NetworkConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// TOML serialization error.
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    /// Invalid value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
    /// Settings rejected by the library.
    #[error(transparent)]
    Settings(#[from] mvxkit::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Default HTTP bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Get the default config directory path.
#[must_use]
pub fn default_config_dir() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mvxkit")
}

/// Get the default config file path.
#[must_use]
pub fn config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Contents of the config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// `mainnet`, `devnet` or `testnet`.
    pub network: Option<String>,
    /// API base URL override.
    pub api_url: Option<String>,
    /// `signed` or `unsigned`.
    pub signing_mode: Option<SigningMode>,
    /// Signing wallet PEM file.
    pub wallet_pem: Option<PathBuf>,
    /// Relayer wallet directory.
    pub wallet_dir: Option<PathBuf>,
    /// Whitelist JSON file.
    pub whitelist_path: Option<PathBuf>,
    /// Marketplace table JSON file.
    pub marketplaces_path: Option<PathBuf>,
    /// Shard count for relayer selection.
    pub shard_count: Option<u32>,
    /// Simulate relayed transactions before broadcast.
    pub simulate_relayed: Option<bool>,
    /// Filter search results through the whitelist.
    pub verified_search: Option<bool>,
    /// Registry contract addresses.
    pub registry: RegistryFileConfig,
    /// HTTP server section.
    pub server: ServerConfig,
}

/// `[registry]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryFileConfig {
    /// Identity registry address.
    pub identity: Option<String>,
    /// Reputation registry address.
    pub reputation: Option<String>,
    /// Validation registry address.
    pub validation: Option<String>,
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address of `mvxkit serve`.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: DEFAULT_BIND.to_owned() }
    }
}

impl FileConfig {
    /// Overlay the file values on `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unknown network, a zero
    /// shard count or a malformed registry address.
    pub fn apply(&self, settings: &mut Settings) -> ConfigResult<()> {
        if let Some(name) = &self.network {
            let network = name
                .parse::<Network>()
                .map_err(|e| ConfigError::InvalidValue(format!("network: {e}")))?;
            settings.network = NetworkConfig::for_network(network);
        }
        if let Some(url) = &self.api_url {
            settings.network = settings.network.clone().with_api_url(url.as_str());
        }
        if let Some(mode) = self.signing_mode {
            settings.signing_mode = mode;
        }
        if let Some(path) = &self.wallet_pem {
            settings.wallet_pem = Some(path.clone());
        }
        if let Some(path) = &self.wallet_dir {
            settings.wallet_dir = Some(path.clone());
        }
        if let Some(path) = &self.whitelist_path {
            settings.whitelist_path.clone_from(path);
        }
        if let Some(path) = &self.marketplaces_path {
            settings.marketplaces_path = Some(path.clone());
        }
        if let Some(count) = self.shard_count {
            if count == 0 {
                return Err(ConfigError::InvalidValue("shard_count must be positive".into()));
            }
            settings.shard_count = count;
        }
        if let Some(flag) = self.simulate_relayed {
            settings.simulate_relayed = flag;
        }
        if let Some(flag) = self.verified_search {
            settings.verified_search = flag;
        }

        let registry = [
            ("registry.identity", &self.registry.identity, &mut settings.registry.identity),
            ("registry.reputation", &self.registry.reputation, &mut settings.registry.reputation),
            ("registry.validation", &self.registry.validation, &mut settings.registry.validation),
        ];
        for (key, value, slot) in registry {
            if let Some(addr) = value {
                *slot = Address::from_bech32(addr)
                    .map_err(|e| ConfigError::InvalidValue(format!("{key}: {e}")))?;
            }
        }
        Ok(())
    }
}

/// Load the config file, or defaults when it does not exist.
pub async fn load_config_from(path: &Path) -> ConfigResult<FileConfig> {
    if !path.exists() {
        info!(path = %path.display(), "config file not found, using defaults");
        return Ok(FileConfig::default());
    }

    let content = tokio::fs::read_to_string(path).await?;
    let config: FileConfig = toml::from_str(&content)?;
    debug!(path = %path.display(), "loaded config file");

    Ok(config)
}

/// Environment settings with the config file laid over them.
pub async fn resolve_settings(path: &Path) -> ConfigResult<(Settings, FileConfig)> {
    let file = load_config_from(path).await?;
    let mut settings = Settings::from_env()?;
    file.apply(&mut settings)?;
    Ok((settings, file))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    const BOB: &str = "erd1spyavw0956vq68xj8y4tenjpq2wd5a9p2c6j8gsz7ztyrnpxrruqzu66jx";

    #[test]
    fn test_default_config_paths() {
        let dir = default_config_dir();
        assert!(dir.ends_with(".mvxkit"));
        assert!(config_path().ends_with(".mvxkit/config.toml"));
    }

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).await.unwrap();
        assert_eq!(config, FileConfig::default());
        assert_eq!(config.server.bind, DEFAULT_BIND);
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "network = [").unwrap();
        assert!(matches!(load_config_from(&path).await, Err(ConfigError::TomlParse(_))));
    }

    #[tokio::test]
    async fn file_values_override_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            format!(
                r#"
network = "devnet"
signing_mode = "signed"
verified_search = true
shard_count = 4

[registry]
identity = "{BOB}"

[server]
bind = "0.0.0.0:9000"
"#
            ),
        )
        .unwrap();

        let file = load_config_from(&path).await.unwrap();
        let mut settings = Settings::default();
        file.apply(&mut settings).unwrap();

        assert_eq!(settings.network.network, Network::Devnet);
        assert_eq!(settings.network.chain_id, "D");
        assert!(settings.signing_mode.is_signed());
        assert!(settings.verified_search);
        assert_eq!(settings.shard_count, 4);
        assert_eq!(settings.registry.identity.to_bech32(), BOB);
        assert_eq!(file.server.bind, "0.0.0.0:9000");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut settings = Settings::default();
        let file = FileConfig { network: Some("moonnet".into()), ..FileConfig::default() };
        assert!(matches!(file.apply(&mut settings), Err(ConfigError::InvalidValue(_))));

        let file = FileConfig { shard_count: Some(0), ..FileConfig::default() };
        assert!(matches!(file.apply(&mut settings), Err(ConfigError::InvalidValue(_))));
    }
}
