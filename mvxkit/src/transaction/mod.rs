//! Transactions, their plain-object form and signing bytes.
//!
//! [`Transaction`] is the strongly typed record. Callers exchange it as a
//! camelCase JSON "plain object" ([`PlainTransaction`]); signatures are
//! computed over a canonical compact JSON rendering ([`Transaction::signing_bytes`]).

use alloy::primitives::U256;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::{Error, Result};

pub mod builder;
pub mod gas;

pub use builder::{CollectionKind, FungibleIssue, NftCreate, PurchaseItem, TokenTransfer, TransactionBuilder};

/// Version of an ordinary transaction.
pub const VERSION_DEFAULT: u32 = 1;

/// Version required for guarded and relayed transactions.
pub const VERSION_EXTENDED: u32 = 2;

/// Options bit marking a guarded transaction.
pub const OPTION_GUARDED: u32 = 0b10;

/// An unsigned or partially signed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PlainTransaction", into = "PlainTransaction")]
pub struct Transaction {
    /// Sender account nonce.
    pub nonce: u64,
    /// EGLD value in atomic units.
    pub value: U256,
    /// Receiver address.
    pub receiver: Address,
    /// Sender; templates may leave it for the caller to fill in.
    pub sender: Option<Address>,
    /// Gas price.
    pub gas_price: u64,
    /// Gas limit.
    pub gas_limit: u64,
    /// Raw data field (`function@arg...` for calls).
    pub data: Vec<u8>,
    /// Chain identifier.
    pub chain_id: String,
    /// Transaction version.
    pub version: u32,
    /// Option bit flags.
    pub options: u32,
    /// Guardian co-signer.
    pub guardian: Option<Address>,
    /// Relayer paying the gas.
    pub relayer: Option<Address>,
    /// Sender signature.
    pub signature: Option<Vec<u8>>,
    /// Guardian signature.
    pub guardian_signature: Option<Vec<u8>>,
    /// Relayer signature.
    pub relayer_signature: Option<Vec<u8>>,
}

impl Transaction {
    /// A zero-value, zero-nonce transaction to `receiver`.
    #[must_use]
    pub fn new(receiver: Address, chain_id: impl Into<String>, gas_limit: u64) -> Self {
        Self {
            nonce: 0,
            value: U256::ZERO,
            receiver,
            sender: None,
            gas_price: gas::DEFAULT_GAS_PRICE,
            gas_limit,
            data: Vec::new(),
            chain_id: chain_id.into(),
            version: VERSION_DEFAULT,
            options: 0,
            guardian: None,
            relayer: None,
            signature: None,
            guardian_signature: None,
            relayer_signature: None,
        }
    }

    /// Set the sender.
    #[must_use]
    pub const fn with_sender(mut self, sender: Option<Address>) -> Self {
        self.sender = sender;
        self
    }

    /// Set the value.
    #[must_use]
    pub const fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Set the nonce.
    #[must_use]
    pub const fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// Set the data field.
    #[must_use]
    pub fn with_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = data.into();
        self
    }

    /// Require `guardian` as co-signer: version 2 and the guarded option bit.
    #[must_use]
    pub const fn with_guardian(mut self, guardian: Address) -> Self {
        self.guardian = Some(guardian);
        self.version = VERSION_EXTENDED;
        self.options |= OPTION_GUARDED;
        self
    }

    /// Attach a relayer: version 2.
    pub const fn set_relayer(&mut self, relayer: Address) {
        self.relayer = Some(relayer);
        if self.version < VERSION_EXTENDED {
            self.version = VERSION_EXTENDED;
        }
    }

    /// Whether the guarded option bit is set.
    #[must_use]
    pub const fn is_guarded(&self) -> bool {
        self.options & OPTION_GUARDED != 0
    }

    /// The data field as text.
    #[must_use]
    pub fn data_text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }

    /// Canonical bytes signed by sender, guardian and relayer alike.
    ///
    /// Compact JSON with the fixed key order `nonce, value, receiver, sender,
    /// gasPrice, gasLimit, data?, chainID, version, options?, guardian?,
    /// relayer?`. Signatures never take part.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the sender is not set.
    pub fn signing_bytes(&self) -> Result<Vec<u8>> {
        let sender = self
            .sender
            .ok_or_else(|| Error::validation("transaction has no sender; cannot compute signing bytes"))?;

        let view = SigningView {
            nonce: self.nonce,
            value: self.value.to_string(),
            receiver: self.receiver.to_bech32(),
            sender: sender.to_bech32(),
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            data: (!self.data.is_empty()).then(|| BASE64.encode(&self.data)),
            chain_id: &self.chain_id,
            version: self.version,
            options: self.options,
            guardian: self.guardian.map(|a| a.to_bech32()),
            relayer: self.relayer.map(|a| a.to_bech32()),
        };
        Ok(serde_json::to_vec(&view)?)
    }

    /// Render as a plain object.
    #[must_use]
    pub fn to_plain(&self) -> PlainTransaction {
        PlainTransaction::from(self.clone())
    }

    /// Rebuild from a plain object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for any malformed field.
    pub fn from_plain(plain: PlainTransaction) -> Result<Self> {
        Self::try_from(plain)
    }

    /// Rebuild from a JSON plain object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the JSON does not describe a
    /// transaction.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let plain: PlainTransaction = serde_json::from_value(value)
            .map_err(|e| Error::validation(format!("invalid transaction object: {e}")))?;
        Self::from_plain(plain)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SigningView<'a> {
    nonce: u64,
    value: String,
    receiver: String,
    sender: String,
    gas_price: u64,
    gas_limit: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<String>,
    #[serde(rename = "chainID")]
    chain_id: &'a str,
    version: u32,
    #[serde(skip_serializing_if = "is_zero")]
    options: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    guardian: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    relayer: Option<String>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &u32) -> bool {
    *value == 0
}

const fn default_gas_price() -> u64 {
    gas::DEFAULT_GAS_PRICE
}

const fn default_version() -> u32 {
    VERSION_DEFAULT
}

fn default_value() -> String {
    "0".to_owned()
}

/// JSON plain-object form of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainTransaction {
    /// Sender nonce.
    #[serde(default)]
    pub nonce: u64,
    /// Value as a decimal string.
    #[serde(default = "default_value")]
    pub value: String,
    /// Receiver bech32.
    pub receiver: String,
    /// Sender bech32.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    /// Gas price.
    #[serde(default = "default_gas_price")]
    pub gas_price: u64,
    /// Gas limit.
    pub gas_limit: u64,
    /// Base64 data field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Chain identifier.
    #[serde(rename = "chainID")]
    pub chain_id: String,
    /// Version.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Options.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub options: u32,
    /// Guardian bech32.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian: Option<String>,
    /// Relayer bech32.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relayer: Option<String>,
    /// Hex sender signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Hex guardian signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian_signature: Option<String>,
    /// Hex relayer signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relayer_signature: Option<String>,
}

impl From<Transaction> for PlainTransaction {
    fn from(tx: Transaction) -> Self {
        Self {
            nonce: tx.nonce,
            value: tx.value.to_string(),
            receiver: tx.receiver.to_bech32(),
            sender: tx.sender.map(|a| a.to_bech32()),
            gas_price: tx.gas_price,
            gas_limit: tx.gas_limit,
            data: (!tx.data.is_empty()).then(|| BASE64.encode(&tx.data)),
            chain_id: tx.chain_id,
            version: tx.version,
            options: tx.options,
            guardian: tx.guardian.map(|a| a.to_bech32()),
            relayer: tx.relayer.map(|a| a.to_bech32()),
            signature: tx.signature.map(hex::encode),
            guardian_signature: tx.guardian_signature.map(hex::encode),
            relayer_signature: tx.relayer_signature.map(hex::encode),
        }
    }
}

impl TryFrom<PlainTransaction> for Transaction {
    type Error = Error;

    fn try_from(plain: PlainTransaction) -> Result<Self> {
        let tx = Self {
            nonce: plain.nonce,
            value: crate::codec::parse_biguint("value", &plain.value)?,
            receiver: parse_field_address("receiver", &plain.receiver)?,
            sender: plain
                .sender
                .as_deref()
                .map(|s| parse_field_address("sender", s))
                .transpose()?,
            gas_price: plain.gas_price,
            gas_limit: plain.gas_limit,
            data: match plain.data.as_deref() {
                None | Some("") => Vec::new(),
                Some(encoded) => BASE64
                    .decode(encoded)
                    .map_err(|e| Error::validation(format!("data is not valid base64: {e}")))?,
            },
            chain_id: plain.chain_id,
            version: plain.version,
            options: plain.options,
            guardian: plain
                .guardian
                .as_deref()
                .map(|s| parse_field_address("guardian", s))
                .transpose()?,
            relayer: plain
                .relayer
                .as_deref()
                .map(|s| parse_field_address("relayer", s))
                .transpose()?,
            signature: parse_signature("signature", plain.signature.as_deref())?,
            guardian_signature: parse_signature("guardianSignature", plain.guardian_signature.as_deref())?,
            relayer_signature: parse_signature("relayerSignature", plain.relayer_signature.as_deref())?,
        };

        if tx.guardian.is_some() && (tx.version < VERSION_EXTENDED || !tx.is_guarded()) {
            return Err(Error::validation(
                "a transaction with a guardian must use version 2 and the guarded option",
            ));
        }
        Ok(tx)
    }
}

/// Parse a bech32 address named `field` in error messages.
///
/// # Errors
///
/// Returns [`Error::Validation`] naming the field.
pub fn parse_field_address(field: &str, text: &str) -> Result<Address> {
    Address::from_bech32(text)
        .map_err(|e| Error::validation(format!("Invalid {field} address: {e}")))
}

fn parse_signature(field: &str, text: Option<&str>) -> Result<Option<Vec<u8>>> {
    match text {
        None | Some("") => Ok(None),
        Some(hex_text) => hex::decode(hex_text)
            .map(Some)
            .map_err(|e| Error::validation(format!("{field} is not valid hex: {e}"))),
    }
}
