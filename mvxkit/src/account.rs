//! Account queries and EGLD amount formatting.

use alloy::primitives::U256;
use serde::Serialize;

use crate::address::{Address, DEFAULT_SHARD_COUNT};
use crate::api::NetworkProvider;
use crate::error::Result;

/// Decimals of the EGLD denomination.
pub const EGLD_DECIMALS: usize = 18;

/// Account state as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDetails {
    /// Bech32 address.
    pub address: String,
    /// Balance in atomic units.
    pub balance: String,
    /// Balance as `<x> EGLD`.
    pub balance_formatted: String,
    /// Next nonce.
    pub nonce: u64,
    /// Shard, as reported or derived from the address.
    pub shard: u32,
}

/// Fetch the balance of `address` in atomic units.
///
/// # Errors
///
/// Upstream failures.
pub async fn get_balance(provider: &NetworkProvider, address: &Address) -> Result<U256> {
    Ok(provider.get_account(address).await?.balance)
}

/// Fetch the full account state of `address`.
///
/// # Errors
///
/// Upstream failures.
pub async fn get_account_details(
    provider: &NetworkProvider,
    address: &Address,
) -> Result<AccountDetails> {
    let account = provider.get_account(address).await?;
    Ok(AccountDetails {
        address: account.address.to_bech32(),
        balance: account.balance.to_string(),
        balance_formatted: format!("{} EGLD", format_egld(&account.balance)),
        nonce: account.nonce,
        shard: account
            .shard
            .unwrap_or_else(|| account.address.shard(DEFAULT_SHARD_COUNT)),
    })
}

/// Render atomic units as a decimal EGLD amount without trailing zeros.
///
/// `1500000000000000000` renders as `1.5`, zero as `0`.
#[must_use]
pub fn format_egld(atomic: &U256) -> String {
    let digits = atomic.to_string();
    let (int_part, frac_part) = if digits.len() > EGLD_DECIMALS {
        digits.split_at(digits.len() - EGLD_DECIMALS)
    } else {
        ("0", digits.as_str())
    };
    let frac = format!("{frac_part:0>EGLD_DECIMALS$}");
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        int_part.to_owned()
    } else {
        format!("{int_part}.{frac}")
    }
}
