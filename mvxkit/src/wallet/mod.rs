//! PEM wallets and ed25519 signing.
//!
//! A [`Wallet`] is loaded per request from a PEM key file and exposes the
//! [`Signer`] capability used by the signed broadcast and relay flows.
//! [`WalletDirectory`] holds several wallets for shard-aware relaying.
//!
//! ```rust,ignore
//! use mvxkit::wallet::{Signer, Wallet};
//!
//! let wallet = Wallet::from_pem_file("wallet.pem")?;
//! let mut tx = builder.egld_transfer(Some(wallet.address()), receiver, amount);
//! wallet.sign_transaction(&mut tx)?;
//! ```

use std::fmt;
use std::path::Path;

use ed25519_dalek::{Signature, SigningKey, Verifier, VerifyingKey};
use ed25519_dalek::Signer as _;
use tracing::debug;

use crate::address::Address;
use crate::transaction::Transaction;

mod directory;
mod error;
mod pem;

pub use directory::WalletDirectory;
pub use error::WalletError;

/// Chain-agnostic signing capability.
pub trait Signer: Send + Sync + fmt::Debug {
    /// Address whose key produces the signatures.
    fn address(&self) -> Address;

    /// Sign raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::Signing`] if the key cannot sign.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, WalletError>;

    /// Sign `tx` as its sender and attach the signature.
    ///
    /// # Errors
    ///
    /// Fails if the transaction has no sender or the sender is not this
    /// signer.
    fn sign_transaction(&self, tx: &mut Transaction) -> crate::Result<()> {
        if tx.sender != Some(self.address()) {
            return Err(WalletError::signing(format!(
                "transaction sender is not the signer {}",
                self.address()
            ))
            .into());
        }
        let bytes = tx.signing_bytes()?;
        tx.signature = Some(self.sign(&bytes)?);
        Ok(())
    }
}

/// An ed25519 keypair loaded from a PEM file.
pub struct Wallet {
    key: SigningKey,
    address: Address,
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl Wallet {
    /// Wallet from a raw 32-byte seed.
    #[must_use]
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let key = SigningKey::from_bytes(seed);
        let address = Address::new(key.verifying_key().to_bytes());
        Self { key, address }
    }

    /// Parse PEM text.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::Pem`] for malformed text and
    /// [`WalletError::KeyMismatch`] when the embedded public key does not
    /// belong to the seed.
    pub fn from_pem(text: &str) -> Result<Self, WalletError> {
        let parsed = pem::parse(text)?;
        let wallet = Self::from_seed(&parsed.seed);
        if let Some(public_key) = parsed.public_key
            && public_key != *wallet.address.as_bytes()
        {
            return Err(WalletError::key_mismatch(format!(
                "embedded public key {} does not match the secret key",
                hex::encode(public_key)
            )));
        }
        Ok(wallet)
    }

    /// Read and parse a PEM file.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::Io`] when the file cannot be read, otherwise as
    /// [`Wallet::from_pem`].
    pub fn from_pem_file(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| WalletError::io(path.display().to_string(), &e))?;
        let wallet = Self::from_pem(&text)?;
        debug!(path = %path.display(), address = %wallet.address, "loaded wallet");
        Ok(wallet)
    }

    /// Render as PEM text.
    #[must_use]
    pub fn to_pem(&self) -> String {
        pem::render(
            &self.address.to_bech32(),
            &self.key.to_bytes(),
            self.address.as_bytes(),
        )
    }

    /// Shard of this wallet's address.
    #[must_use]
    pub fn shard(&self, shard_count: u32) -> u32 {
        self.address.shard(shard_count)
    }
}

impl Signer for Wallet {
    fn address(&self) -> Address {
        self.address
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, WalletError> {
        Ok(self.key.sign(message).to_bytes().to_vec())
    }
}

/// Check an ed25519 signature made by `address` over `message`.
#[must_use]
pub fn verify_signature(address: &Address, message: &[u8], signature: &[u8]) -> bool {
    let Ok(key) = VerifyingKey::from_bytes(address.as_bytes()) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    key.verify(message, &signature).is_ok()
}
