//! A directory of relayer wallets, one per shard.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{Signer, Wallet};
use crate::address::Address;
use crate::error::{Error, Result};

/// Wallets loaded from every `*.pem` file of a directory, in file name order.
#[derive(Debug, Default)]
pub struct WalletDirectory {
    root: PathBuf,
    wallets: Vec<(String, Wallet)>,
}

impl WalletDirectory {
    /// Load all readable PEM files under `dir`.
    ///
    /// A missing directory yields an empty set; unreadable or malformed files
    /// are skipped with a warning.
    #[must_use]
    pub fn load(dir: impl AsRef<Path>) -> Self {
        let root = dir.as_ref().to_path_buf();
        let entries = match std::fs::read_dir(&root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %root.display(), error = %e, "cannot read wallet directory");
                return Self {
                    root,
                    wallets: Vec::new(),
                };
            }
        };

        let mut files: Vec<(String, PathBuf)> = entries
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "pem"))
            .filter_map(|path| {
                let name = path.file_name()?.to_string_lossy().into_owned();
                Some((name, path))
            })
            .collect();
        files.sort_by(|a, b| a.0.cmp(&b.0));

        let mut wallets = Vec::with_capacity(files.len());
        for (name, path) in files {
            match Wallet::from_pem_file(&path) {
                Ok(wallet) => wallets.push((name, wallet)),
                Err(e) => warn!(file = %name, error = %e, "skipping wallet file"),
            }
        }
        debug!(dir = %root.display(), wallets = wallets.len(), "loaded wallet directory");

        Self { root, wallets }
    }

    /// Wrap already loaded wallets, keeping the given order.
    #[must_use]
    pub fn from_wallets(wallets: Vec<(String, Wallet)>) -> Self {
        Self {
            root: PathBuf::new(),
            wallets,
        }
    }

    /// Number of wallets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    /// Whether no wallet was loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    /// File names of the loaded wallets, in selection order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.wallets.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// The wallet in the same shard as `sender`, else the first wallet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when the directory holds no wallet.
    pub fn select_for(&self, sender: &Address, shard_count: u32) -> Result<&Wallet> {
        let shard = sender.shard(shard_count);
        if let Some((name, wallet)) = self
            .wallets
            .iter()
            .find(|(_, wallet)| wallet.shard(shard_count) == shard)
        {
            debug!(file = %name, shard, relayer = %wallet.address(), "selected same-shard relayer");
            return Ok(wallet);
        }

        let (name, wallet) = self.wallets.first().ok_or_else(|| {
            Error::configuration(format!(
                "no relayer wallets available in {}",
                self.root.display()
            ))
        })?;
        warn!(file = %name, shard, "no relayer in sender shard, using first wallet");
        Ok(wallet)
    }
}
