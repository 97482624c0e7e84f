//! MultiversX account addresses and shard derivation.
//!
//! An address is a 32-byte ed25519 public key (or smart contract id) rendered
//! as bech32 with the `erd` human-readable part.

use std::fmt;
use std::str::FromStr;

use bech32::{Bech32, Hrp};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Human-readable part of every MultiversX address.
pub const ADDRESS_HRP: Hrp = Hrp::parse_unchecked("erd");

/// Number of bytes in an address.
pub const ADDRESS_LEN: usize = 32;

/// Shard count of the current MultiversX topology.
pub const DEFAULT_SHARD_COUNT: u32 = 3;

/// Raw bytes of the ESDT system smart contract.
const ESDT_SYSTEM_SC: [u8; ADDRESS_LEN] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 0xff,
    0xff,
];

/// A 32-byte MultiversX address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Wrap raw public key bytes.
    #[must_use]
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// The all-zero address.
    #[must_use]
    pub const fn zero() -> Self {
        Self([0; ADDRESS_LEN])
    }

    /// The ESDT system smart contract, receiver of token issuance calls.
    #[must_use]
    pub const fn esdt_system_sc() -> Self {
        Self(ESDT_SYSTEM_SC)
    }

    /// Parse a bech32 `erd1...` address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] on a bad checksum, wrong prefix or a
    /// payload that is not exactly 32 bytes.
    pub fn from_bech32(text: &str) -> Result<Self> {
        let (hrp, data) = bech32::decode(text.trim())
            .map_err(|e| Error::validation(format!("invalid bech32 address '{text}': {e}")))?;
        if hrp != ADDRESS_HRP {
            return Err(Error::validation(format!(
                "invalid address prefix '{hrp}', expected '{ADDRESS_HRP}'"
            )));
        }
        Self::from_slice(&data)
    }

    /// Build from a byte slice that must be exactly 32 bytes long.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for any other length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| {
            Error::validation(format!(
                "address must be {ADDRESS_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// Parse a 64-character hex public key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] on bad hex or wrong length.
    pub fn from_hex(text: &str) -> Result<Self> {
        let bytes = hex::decode(text)
            .map_err(|e| Error::validation(format!("invalid hex address: {e}")))?;
        Self::from_slice(&bytes)
    }

    /// Bech32 rendering.
    #[must_use]
    pub fn to_bech32(&self) -> String {
        // Encoding 32 bytes under a valid static HRP cannot exceed the bech32 length limit.
        bech32::encode::<Bech32>(ADDRESS_HRP, &self.0).unwrap_or_default()
    }

    /// Lowercase hex of the public key.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Raw public key bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Whether this is a smart contract address (eight leading zero bytes).
    #[must_use]
    pub fn is_smart_contract(&self) -> bool {
        self.0[..8].iter().all(|b| *b == 0)
    }

    /// Shard this address belongs to.
    #[must_use]
    pub fn shard(&self, shard_count: u32) -> u32 {
        shard_of(&self.0, shard_count)
    }
}

/// Derive the shard of a public key from its last byte.
///
/// The last byte is masked with `2^n - 1` where `n = ceil(log2(shard_count))`.
/// A result past the last shard is remapped with the next smaller mask.
#[must_use]
pub fn shard_of(pubkey: &[u8; ADDRESS_LEN], shard_count: u32) -> u32 {
    if shard_count <= 1 {
        return 0;
    }
    let bits = u32::BITS - (shard_count - 1).leading_zeros();
    let mask_high = (1_u32 << bits) - 1;
    let mask_low = (1_u32 << (bits - 1)) - 1;
    let last = u32::from(pubkey[ADDRESS_LEN - 1]);

    let shard = last & mask_high;
    if shard > shard_count - 1 {
        last & mask_low
    } else {
        shard
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bech32())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_bech32())
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_bech32(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_bech32())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_bech32(&text).map_err(serde::de::Error::custom)
    }
}
