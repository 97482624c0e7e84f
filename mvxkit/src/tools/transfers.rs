//! EGLD and token transfer tools.

use std::sync::Arc;

use alloy::primitives::U256;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

use super::{ToolContext, respond};
use crate::address::Address;
use crate::codec::parse_biguint;
use crate::error::{Error, Result};
use crate::tool::{Tool, ToolResponse};
use crate::transaction::{TokenTransfer, parse_field_address};

const INVALID_RECEIVER: &str = "Invalid receiver address format.";

fn parse_sender(sender: Option<&str>) -> Result<Option<Address>> {
    sender
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_field_address("sender", s))
        .transpose()
}

/// Arguments of `send-egld`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SendEgldArgs {
    /// The bech32 address of the receiver (erd1...).
    pub receiver: String,
    /// The amount in atomic units (1 EGLD = 10^18 atomic units).
    pub amount: String,
}

/// Single EGLD transfer.
#[derive(Debug)]
pub struct SendEgldTool(pub Arc<ToolContext>);

#[async_trait]
impl Tool for SendEgldTool {
    const NAME: &'static str = "send-egld";
    type Args = SendEgldArgs;

    fn description(&self) -> String {
        "Send EGLD to a receiver address".to_owned()
    }

    async fn call(&self, args: SendEgldArgs) -> ToolResponse {
        let Ok(receiver) = Address::from_bech32(args.receiver.trim()) else {
            return ToolResponse::error(INVALID_RECEIVER);
        };
        let result = async {
            let amount = parse_biguint("amount", &args.amount)?;
            let tx = self.0.builder().egld_transfer(None, receiver, amount);
            self.0.send_or_template(tx).await
        };
        respond("Failed to send EGLD", result.await)
    }
}

/// Arguments of `send-tokens`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SendTokensArgs {
    /// The bech32 address of the receiver (erd1...).
    pub receiver: String,
    /// The token identifier (e.g., USDC-c76f1f).
    pub token_identifier: String,
    /// The amount to send in atomic units.
    pub amount: String,
    /// Token nonce for NFT/SFT (0 for fungible).
    #[serde(default)]
    pub nonce: Option<u64>,
    /// Sender of an unsigned NFT/SFT transfer; ignored when signing.
    #[serde(default)]
    pub sender: Option<String>,
}

/// Single ESDT, NFT or SFT transfer.
#[derive(Debug)]
pub struct SendTokensTool(pub Arc<ToolContext>);

#[async_trait]
impl Tool for SendTokensTool {
    const NAME: &'static str = "send-tokens";
    type Args = SendTokensArgs;

    fn description(&self) -> String {
        "Send ESDT/NFT/SFT tokens to a receiver address".to_owned()
    }

    async fn call(&self, args: SendTokensArgs) -> ToolResponse {
        let Ok(receiver) = Address::from_bech32(args.receiver.trim()) else {
            return ToolResponse::error(INVALID_RECEIVER);
        };
        let result = async {
            let amount = parse_biguint("amount", &args.amount)?;
            let transfer = TokenTransfer::new(args.token_identifier.trim(), args.nonce.unwrap_or(0), amount);
            let sender = if self.0.signing_enabled() {
                Some(self.0.signed_sender()?.signer().address())
            } else {
                parse_sender(args.sender.as_deref())?
            };
            let tx = self.0.builder().token_transfer(sender, receiver, &transfer)?;
            self.0.send_or_template(tx).await
        };
        respond("Failed to send tokens", result.await)
    }
}

/// Arguments of `send-egld-to-multiple`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SendEgldToMultipleArgs {
    /// Amount in atomic units to send to EACH receiver.
    pub amount: String,
    /// Array of bech32 receiver addresses.
    pub receivers: Vec<String>,
}

/// Signed EGLD airdrop, one transaction per receiver.
#[derive(Debug)]
pub struct SendEgldToMultipleTool(pub Arc<ToolContext>);

#[async_trait]
impl Tool for SendEgldToMultipleTool {
    const NAME: &'static str = "send-egld-to-multiple";
    type Args = SendEgldToMultipleArgs;

    fn description(&self) -> String {
        "Send EGLD to multiple receiver addresses (airdrop)".to_owned()
    }

    async fn call(&self, args: SendEgldToMultipleArgs) -> ToolResponse {
        if args.receivers.is_empty() {
            return ToolResponse::error("No receivers provided.");
        }
        let mut receivers = Vec::with_capacity(args.receivers.len());
        for text in &args.receivers {
            match Address::from_bech32(text.trim()) {
                Ok(address) => receivers.push(address),
                Err(_) => return ToolResponse::error(format!("Invalid address: {text}")),
            }
        }

        let result = async {
            let amount = parse_biguint("amount", &args.amount)?;
            let sender = self.0.signed_sender()?;
            let txs = receivers
                .iter()
                .map(|receiver| self.0.builder().egld_transfer(None, *receiver, amount))
                .collect();
            let hashes = sender.send_batch(txs).await?;
            info!(count = hashes.len(), "EGLD batch sent");
            Ok::<_, Error>(ToolResponse::text(format!(
                "Sent {} atomic EGLD to {} receivers.\n\nTransaction hashes:\n{}",
                args.amount.trim(),
                receivers.len(),
                self.0.hash_list(&hashes)
            )))
        };
        self.0.respond_batch("Failed to send batch EGLD", result.await)
    }
}

/// One token of a batch transfer.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TokenAmount {
    /// Token identifier (e.g., USDC-c76f1f).
    pub identifier: String,
    /// Token nonce for NFT/SFT (0 for fungible).
    #[serde(default)]
    pub nonce: Option<u64>,
    /// Amount to transfer in atomic units.
    pub amount: String,
}

/// Tokens for one receiver.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ReceiverTransfer {
    /// Bech32 receiver address.
    pub receiver: String,
    /// Tokens to send.
    pub tokens: Vec<TokenAmount>,
}

/// Arguments of `send-tokens-to-multiple`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SendTokensToMultipleArgs {
    /// Array of transfers, each with receiver address and list of tokens to send.
    pub transfers: Vec<ReceiverTransfer>,
}

/// Signed batch of token transfers, one transaction per receiver.
#[derive(Debug)]
pub struct SendTokensToMultipleTool(pub Arc<ToolContext>);

#[async_trait]
impl Tool for SendTokensToMultipleTool {
    const NAME: &'static str = "send-tokens-to-multiple";
    type Args = SendTokensToMultipleArgs;

    fn description(&self) -> String {
        "Send multiple tokens to multiple receivers (batch ESDT/NFT/SFT transfers)".to_owned()
    }

    async fn call(&self, args: SendTokensToMultipleArgs) -> ToolResponse {
        if args.transfers.is_empty() {
            return ToolResponse::error("No transfers provided.");
        }
        let mut receivers = Vec::with_capacity(args.transfers.len());
        for transfer in &args.transfers {
            match Address::from_bech32(transfer.receiver.trim()) {
                Ok(address) => receivers.push(address),
                Err(_) => return ToolResponse::error(format!("Invalid address: {}", transfer.receiver)),
            }
        }

        let result = async {
            let sender = self.0.signed_sender()?;
            let from = sender.signer().address();
            let mut txs = Vec::with_capacity(receivers.len());
            for (receiver, transfer) in receivers.iter().zip(&args.transfers) {
                let tokens = transfer
                    .tokens
                    .iter()
                    .map(|t| {
                        Ok(TokenTransfer::new(
                            t.identifier.trim(),
                            t.nonce.unwrap_or(0),
                            parse_biguint("amount", &t.amount)?,
                        ))
                    })
                    .collect::<Result<Vec<_>>>()?;
                txs.push(self.0.builder().multi_token_transfer(from, *receiver, &tokens)?);
            }
            let hashes = sender.send_batch(txs).await?;
            info!(count = hashes.len(), "token batch sent");
            Ok::<_, Error>(ToolResponse::text(format!(
                "Sent tokens to {} receivers.\n\nTransaction hashes:\n{}",
                receivers.len(),
                self.0.hash_list(&hashes)
            )))
        };
        self.0.respond_batch("Failed to send batch tokens", result.await)
    }
}

/// Arguments of `create-guarded-transaction`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GuardedTransactionArgs {
    /// Bech32 sender address.
    pub sender: String,
    /// Bech32 receiver address.
    pub receiver: String,
    /// EGLD value in atomic units.
    #[serde(default)]
    pub value: Option<String>,
    /// Data field text.
    #[serde(default)]
    pub data: Option<String>,
    /// Bech32 address of the guardian co-signer.
    pub guardian_address: String,
    /// Sender account nonce.
    pub nonce: u64,
}

/// Unsigned transaction that needs a guardian co-signature.
#[derive(Debug)]
pub struct CreateGuardedTransactionTool(pub Arc<ToolContext>);

#[async_trait]
impl Tool for CreateGuardedTransactionTool {
    const NAME: &'static str = "create-guarded-transaction";
    type Args = GuardedTransactionArgs;

    fn description(&self) -> String {
        "Create an unsigned transaction that requires a guardian co-signature".to_owned()
    }

    async fn call(&self, args: GuardedTransactionArgs) -> ToolResponse {
        respond(
            "Failed to create guarded transaction",
            guarded_template(&self.0, &args),
        )
    }
}

fn guarded_template(context: &ToolContext, args: &GuardedTransactionArgs) -> Result<ToolResponse> {
    let sender = parse_field_address("sender", args.sender.trim())?;
    let receiver = parse_field_address("receiver", args.receiver.trim())?;
    let guardian = parse_field_address("guardian", args.guardian_address.trim())?;
    if guardian == sender {
        return Err(Error::validation("guardian must differ from the sender"));
    }
    let value = match args.value.as_deref().map(str::trim) {
        None | Some("") => U256::ZERO,
        Some(text) => parse_biguint("value", text)?,
    };
    let tx = context.builder().guarded(
        sender,
        receiver,
        value,
        args.nonce,
        args.data.as_deref().unwrap_or_default(),
        guardian,
    );
    Ok(ToolResponse::json(&tx.to_plain()))
}
