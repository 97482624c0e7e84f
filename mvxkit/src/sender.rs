//! Signed broadcast: nonce, sign, send.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::NetworkProvider;
use crate::error::{Error, Result};
use crate::transaction::Transaction;
use crate::wallet::Signer;

/// Signs transactions with one wallet and broadcasts them.
///
/// The account nonce is fetched once per call. Batches take consecutive
/// nonces and are sent strictly in order; a failure stops the batch, leaves
/// the later nonces unused and reports the hashes already sent.
#[derive(Debug, Clone)]
pub struct SignedSender {
    provider: NetworkProvider,
    signer: Arc<dyn Signer>,
}

impl SignedSender {
    /// Sender for `signer` over `provider`.
    #[must_use]
    pub fn new(provider: NetworkProvider, signer: Arc<dyn Signer>) -> Self {
        Self { provider, signer }
    }

    /// Signing wallet.
    #[must_use]
    pub fn signer(&self) -> &Arc<dyn Signer> {
        &self.signer
    }

    /// Current on-chain nonce of the signer.
    ///
    /// # Errors
    ///
    /// Upstream failures.
    pub async fn account_nonce(&self) -> Result<u64> {
        Ok(self.provider.get_account(&self.signer.address()).await?.nonce)
    }

    /// Sign and broadcast one transaction; returns its hash.
    ///
    /// # Errors
    ///
    /// Nonce lookup, signing or broadcast failures.
    pub async fn send(&self, tx: Transaction) -> Result<String> {
        let mut hashes = self.send_batch(vec![tx]).await?;
        hashes
            .pop()
            .ok_or_else(|| Error::validation("nothing was sent"))
    }

    /// Sign and broadcast `txs` with consecutive nonces; returns their hashes
    /// in order.
    ///
    /// # Errors
    ///
    /// The first failure. When transactions before it were already broadcast
    /// it is wrapped in [`Error::BatchPartial`] carrying their hashes.
    pub async fn send_batch(&self, txs: Vec<Transaction>) -> Result<Vec<String>> {
        if txs.is_empty() {
            return Ok(Vec::new());
        }
        let address = self.signer.address();
        let mut nonce = self.account_nonce().await?;
        let total = txs.len();
        let mut hashes = Vec::with_capacity(total);

        for tx in txs {
            let mut tx = tx.with_sender(Some(address)).with_nonce(nonce);
            let sent = match self.signer.sign_transaction(&mut tx) {
                Ok(()) => self.provider.send_transaction(&tx).await,
                Err(e) => Err(e),
            };
            match sent {
                Ok(hash) => {
                    info!(tx_hash = %hash, nonce, sender = %address, "sent signed transaction");
                    hashes.push(hash);
                    nonce += 1;
                }
                Err(e) => {
                    warn!(
                        nonce,
                        sent = hashes.len(),
                        total,
                        error = %e,
                        "batch stopped"
                    );
                    return Err(Error::after_sent(e, hashes));
                }
            }
        }
        Ok(hashes)
    }
}
