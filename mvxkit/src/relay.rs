//! Relayed (v3) and guardian co-signatures.
//!
//! The sender signs a transaction that already names the relayer; the relayer
//! checks that signature over the same bytes, adds its own and broadcasts.
//!
//! ```text
//! plain object -> Transaction -> pick relayer -> set relayer (v2)
//!   -> verify sender signature -> relayer signs -> simulate? -> broadcast
//! ```

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::address::{Address, DEFAULT_SHARD_COUNT};
use crate::api::NetworkProvider;
use crate::error::{Error, Result};
use crate::transaction::Transaction;
use crate::wallet::{Signer, WalletDirectory, verify_signature};

/// Where relayer keys come from.
#[derive(Debug, Clone)]
pub enum RelayerSource {
    /// One wallet relays for every shard.
    Single(Arc<dyn Signer>),
    /// One wallet per shard; the sender's shard picks the relayer.
    Directory(Arc<WalletDirectory>),
}

/// A relayed transaction that was broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayOutcome {
    /// Transaction hash.
    pub hash: String,
    /// Relayer that co-signed.
    pub relayer: Address,
}

/// Co-signs and broadcasts relayed transactions.
#[derive(Debug, Clone)]
pub struct RelayService {
    provider: NetworkProvider,
    source: RelayerSource,
    shard_count: u32,
    simulate: bool,
}

impl RelayService {
    /// Relay service with simulation enabled and three shards.
    #[must_use]
    pub fn new(provider: NetworkProvider, source: RelayerSource) -> Self {
        Self {
            provider,
            source,
            shard_count: DEFAULT_SHARD_COUNT,
            simulate: true,
        }
    }

    /// Set the shard count used to match relayers to senders.
    #[must_use]
    pub const fn with_shard_count(mut self, shard_count: u32) -> Self {
        self.shard_count = shard_count;
        self
    }

    /// Enable or disable simulation before broadcast.
    #[must_use]
    pub const fn with_simulation(mut self, simulate: bool) -> Self {
        self.simulate = simulate;
        self
    }

    /// Co-sign the sender-signed plain object and broadcast it.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] for a malformed object,
    /// [`Error::Configuration`] without relayer wallets,
    /// [`Error::SignatureVerification`] when the sender signature does not
    /// cover the relayer, [`Error::SimulationFailed`] when simulation does
    /// not succeed, and upstream failures. Nothing is broadcast on error.
    pub async fn relay(&self, inner: Value) -> Result<RelayOutcome> {
        let tx = self.prepare(inner)?;
        let relayer = tx
            .relayer
            .ok_or_else(|| Error::validation("relayer was not attached"))?;

        if self.simulate {
            let outcome = self.provider.simulate_transaction(&tx).await?;
            if !outcome.is_success() {
                let reason = outcome.message.unwrap_or_else(|| outcome.status.clone());
                warn!(status = %outcome.status, reason = %reason, "relayed transaction failed simulation");
                return Err(Error::simulation(format!("status {}: {reason}", outcome.status)));
            }
            debug!("simulation succeeded");
        }

        let hash = self.provider.send_transaction(&tx).await?;
        info!(tx_hash = %hash, relayer = %relayer, "relayed transaction broadcast");
        Ok(RelayOutcome { hash, relayer })
    }

    /// Everything up to the broadcast: rebuild, pick relayer, verify, co-sign.
    ///
    /// # Errors
    ///
    /// As [`RelayService::relay`], without the network steps.
    pub fn prepare(&self, inner: Value) -> Result<Transaction> {
        let mut tx = Transaction::from_json(inner)?;
        let sender = tx
            .sender
            .ok_or_else(|| Error::validation("inner transaction has no sender"))?;
        let signature = tx
            .signature
            .clone()
            .ok_or_else(|| Error::signature("inner transaction is not signed"))?;

        let relayer: &dyn Signer = match &self.source {
            RelayerSource::Single(signer) => signer.as_ref(),
            RelayerSource::Directory(wallets) => {
                wallets.select_for(&sender, self.shard_count)? as &dyn Signer
            }
        };
        let relayer_address = relayer.address();
        tx.set_relayer(relayer_address);

        let bytes = tx.signing_bytes()?;
        if !verify_signature(&sender, &bytes, &signature) {
            return Err(Error::signature(format!(
                "sender signature does not cover relayer {relayer_address}; sign the transaction with this relayer set"
            )));
        }

        tx.relayer_signature = Some(relayer.sign(&bytes)?);
        debug!(sender = %sender, relayer = %relayer_address, "co-signed as relayer");
        Ok(tx)
    }
}

/// Add the guardian signature to a sender-signed guarded transaction.
///
/// # Errors
///
/// [`Error::Validation`] when the transaction is not guarded by `guardian`,
/// [`Error::SignatureVerification`] when the sender signature does not verify.
pub fn guardian_cosign(tx: &mut Transaction, guardian: &dyn Signer) -> Result<()> {
    if tx.guardian != Some(guardian.address()) || !tx.is_guarded() {
        return Err(Error::validation(format!(
            "transaction is not guarded by {}",
            guardian.address()
        )));
    }
    let sender = tx
        .sender
        .ok_or_else(|| Error::validation("transaction has no sender"))?;
    let signature = tx
        .signature
        .as_deref()
        .ok_or_else(|| Error::signature("transaction is not signed by its sender"))?;

    let bytes = tx.signing_bytes()?;
    if !verify_signature(&sender, &bytes, signature) {
        return Err(Error::signature("sender signature does not verify"));
    }
    tx.guardian_signature = Some(guardian.sign(&bytes)?);
    Ok(())
}
