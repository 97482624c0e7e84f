//! Gas limits and fixed costs.

/// Default gas price (1 Gwei-equivalent, in atomic units).
pub const DEFAULT_GAS_PRICE: u64 = 1_000_000_000;

/// Plain EGLD transfer.
pub const EGLD_TRANSFER: u64 = 50_000;

/// Fungible ESDT transfer.
pub const ESDT_TRANSFER: u64 = 500_000;

/// Single NFT/SFT transfer and NFT creation.
pub const NFT_TRANSFER: u64 = 1_000_000;

/// Token or collection issuance.
pub const ISSUE: u64 = 60_000_000;

/// Per token movement in a multi-token transfer.
pub const MULTI_TRANSFER_PER_TOKEN: u64 = 1_100_000;

/// Marketplace purchase call.
pub const PURCHASE: u64 = 20_000_000;

/// Guarded transaction.
pub const GUARDED: u64 = 50_000_000;

/// Reputation registry `submitFeedback`.
pub const SUBMIT_FEEDBACK: u64 = 10_000_000;

/// Validation registry `submitProof`.
pub const SUBMIT_PROOF: u64 = 15_000_000;

/// Validation registry `verifyJob`.
pub const VERIFY_JOB: u64 = 10_000_000;

/// ESDT issuance fee, 0.05 EGLD in atomic units.
pub const ISSUE_COST: u128 = 50_000_000_000_000_000;
