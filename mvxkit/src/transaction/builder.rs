//! Pure transaction construction.
//!
//! [`TransactionBuilder`] turns structured parameters into unsigned
//! [`Transaction`]s. It never touches the network: nonce is left at zero and
//! signing is a separate, explicit step.

use alloy::primitives::U256;
use regex::Regex;

use super::{Transaction, gas};
use crate::address::Address;
use crate::codec::{self, DataField};
use crate::error::{Error, Result};
use crate::marketplace::{MarketplaceContract, PurchaseArg};
use crate::network::NetworkConfig;

/// Sender used by unsigned registry templates when the caller omits one.
pub const PLACEHOLDER_SENDER: Address = Address::new([
    0x01, 0x39, 0x47, 0x21, 0x70, 0xf2, 0x42, 0x55, 0x74, 0x54, 0x22, 0x89, 0xc0, 0x7e, 0x00, 0x78,
    0x89, 0xe4, 0x72, 0x28, 0xa0, 0x71, 0x00, 0x78, 0x89, 0xe4, 0x72, 0x28, 0xa0, 0x71, 0x00, 0x78,
]);

/// Highest royalties value (100.00%).
pub const MAX_ROYALTIES: u32 = 10_000;

/// Highest number of decimals for a fungible token.
pub const MAX_DECIMALS: u32 = 18;

/// One token movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransfer {
    /// Token or collection identifier.
    pub token: String,
    /// Token nonce, 0 for fungible tokens.
    pub nonce: u64,
    /// Amount in atomic units.
    pub amount: U256,
}

impl TokenTransfer {
    /// A token movement.
    #[must_use]
    pub fn new(token: impl Into<String>, nonce: u64, amount: U256) -> Self {
        Self {
            token: token.into(),
            nonce,
            amount,
        }
    }

    /// Whether this is a fungible (nonce 0) movement.
    #[must_use]
    pub const fn is_fungible(&self) -> bool {
        self.nonce == 0
    }

    fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(Error::validation("token identifier must not be empty"));
        }
        Ok(())
    }
}

/// Item bought through a marketplace contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseItem {
    /// Token identifier of the listing.
    pub token_identifier: String,
    /// Token nonce.
    pub nonce: u64,
    /// Quantity, at least 1.
    pub quantity: u64,
}

/// Fungible token issuance parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FungibleIssue {
    /// Token name, 3-20 alphanumeric characters.
    pub name: String,
    /// Ticker, 3-10 uppercase alphanumeric characters.
    pub ticker: String,
    /// Initial supply in atomic units.
    pub initial_supply: U256,
    /// Number of decimals, 0-18.
    pub decimals: u32,
}

/// Kind of collection to register with the ESDT system contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    /// Non-fungible collection (`issueNonFungible`).
    NonFungible,
    /// Semi-fungible collection (`issueSemiFungible`).
    SemiFungible,
    /// Meta-ESDT collection (`registerMetaESDT`).
    MetaEsdt {
        /// Number of decimals, 0-18.
        decimals: u32,
    },
}

impl CollectionKind {
    const fn function(self) -> &'static str {
        match self {
            Self::NonFungible => "issueNonFungible",
            Self::SemiFungible => "issueSemiFungible",
            Self::MetaEsdt { .. } => "registerMetaESDT",
        }
    }
}

/// NFT/SFT creation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftCreate {
    /// Collection identifier.
    pub collection: String,
    /// Display name.
    pub name: String,
    /// Royalties in basis points of 0.01%, 0-10000.
    pub royalties: u32,
    /// Initial quantity, 1 for an NFT.
    pub quantity: U256,
    /// Media and metadata URIs.
    pub uris: Vec<String>,
}

const FUNGIBLE_PROPERTIES: [&str; 6] = [
    "canFreeze",
    "canWipe",
    "canPause",
    "canChangeOwner",
    "canUpgrade",
    "canAddSpecialRoles",
];

const COLLECTION_PROPERTIES: [&str; 7] = [
    "canFreeze",
    "canWipe",
    "canPause",
    "canTransferNFTCreateRole",
    "canChangeOwner",
    "canUpgrade",
    "canAddSpecialRoles",
];

/// Builds unsigned transactions for one network.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    chain_id: String,
}

impl TransactionBuilder {
    /// Builder for the chain of `network`.
    #[must_use]
    pub fn new(network: &NetworkConfig) -> Self {
        Self {
            chain_id: network.chain_id.clone(),
        }
    }

    /// Chain identifier placed in every transaction.
    #[must_use]
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    fn base(&self, receiver: Address, gas_limit: u64) -> Transaction {
        Transaction::new(receiver, self.chain_id.clone(), gas_limit)
    }

    /// Plain EGLD transfer.
    #[must_use]
    pub fn egld_transfer(&self, sender: Option<Address>, receiver: Address, amount: U256) -> Transaction {
        self.base(receiver, gas::EGLD_TRANSFER)
            .with_sender(sender)
            .with_value(amount)
    }

    /// Single token transfer.
    ///
    /// Fungible tokens use `ESDTTransfer` sent to the receiver. NFT/SFT
    /// movements use `ESDTNFTTransfer`, sent to the sender itself with the
    /// receiver in the data field, so they need a sender.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty token identifier or a
    /// missing sender on an NFT/SFT transfer.
    pub fn token_transfer(
        &self,
        sender: Option<Address>,
        receiver: Address,
        transfer: &TokenTransfer,
    ) -> Result<Transaction> {
        transfer.validate()?;

        if transfer.is_fungible() {
            let data = DataField::new("ESDTTransfer")
                .text(&transfer.token)
                .biguint(&transfer.amount)
                .build();
            return Ok(self
                .base(receiver, gas::ESDT_TRANSFER)
                .with_sender(sender)
                .with_data(data));
        }

        let sender = sender.ok_or_else(|| {
            Error::validation("an NFT/SFT transfer is sent from the sender to itself; sender is required")
        })?;
        let data = DataField::new("ESDTNFTTransfer")
            .text(&transfer.token)
            .u64(transfer.nonce)
            .biguint(&transfer.amount)
            .address(&receiver)
            .build();
        Ok(self
            .base(sender, gas::NFT_TRANSFER)
            .with_sender(Some(sender))
            .with_data(data))
    }

    /// Several tokens to one receiver in a single transaction.
    ///
    /// A lone fungible token degrades to `ESDTTransfer`; anything else uses
    /// `MultiESDTNFTTransfer` sent to self. Gas scales with the token count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty token list or an empty
    /// token identifier.
    pub fn multi_token_transfer(
        &self,
        sender: Address,
        receiver: Address,
        transfers: &[TokenTransfer],
    ) -> Result<Transaction> {
        if transfers.is_empty() {
            return Err(Error::validation("at least one token is required"));
        }
        for transfer in transfers {
            transfer.validate()?;
        }

        let count = transfers.len() as u64;
        let gas_limit = gas::MULTI_TRANSFER_PER_TOKEN.saturating_mul(count);

        if let [single] = transfers
            && single.is_fungible()
        {
            let data = DataField::new("ESDTTransfer")
                .text(&single.token)
                .biguint(&single.amount)
                .build();
            return Ok(self
                .base(receiver, gas_limit)
                .with_sender(Some(sender))
                .with_data(data));
        }

        let mut data = DataField::new("MultiESDTNFTTransfer")
            .address(&receiver)
            .u64(count);
        for transfer in transfers {
            data = data
                .text(&transfer.token)
                .u64(transfer.nonce)
                .biguint(&transfer.amount);
        }
        Ok(self
            .base(sender, gas_limit)
            .with_sender(Some(sender))
            .with_data(data.build()))
    }

    /// Guarded transaction: version 2, guarded option, guardian co-signer.
    #[must_use]
    pub fn guarded(
        &self,
        sender: Address,
        receiver: Address,
        value: U256,
        nonce: u64,
        data: &str,
        guardian: Address,
    ) -> Transaction {
        self.base(receiver, gas::GUARDED)
            .with_sender(Some(sender))
            .with_value(value)
            .with_nonce(nonce)
            .with_data(data.as_bytes().to_vec())
            .with_guardian(guardian)
    }

    /// Marketplace purchase.
    ///
    /// The data field follows the contract's `args_order`. The value stays
    /// zero: the listing price is not looked up.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty identifier or zero quantity
    /// and [`Error::Configuration`] for an unusable ABI.
    pub fn purchase(
        &self,
        contract: &MarketplaceContract,
        sender: Option<Address>,
        item: &PurchaseItem,
    ) -> Result<Transaction> {
        if item.token_identifier.trim().is_empty() {
            return Err(Error::validation("token identifier must not be empty"));
        }
        if item.quantity == 0 {
            return Err(Error::validation("quantity must be at least 1"));
        }

        let mut data = DataField::new(contract.abi.function.as_str());
        for arg in contract.purchase_args()? {
            data = match arg {
                PurchaseArg::TokenIdentifier => data.text(&item.token_identifier),
                PurchaseArg::Nonce => data.arg(codec::encode_nonce(item.nonce)),
                PurchaseArg::Quantity => data.u64(item.quantity),
            };
        }

        Ok(self
            .base(contract.address, gas::PURCHASE)
            .with_sender(sender)
            .with_data(data.build()))
    }

    /// Fungible token issuance, paying the issuance fee.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a malformed name, ticker or decimals.
    pub fn issue_fungible(&self, sender: Address, issue: &FungibleIssue) -> Result<Transaction> {
        validate_token_name(&issue.name)?;
        validate_ticker(&issue.ticker)?;
        validate_decimals(issue.decimals)?;

        let data = with_properties(
            DataField::new("issue")
                .text(&issue.name)
                .text(&issue.ticker)
                .biguint(&issue.initial_supply)
                .u64(u64::from(issue.decimals)),
            &FUNGIBLE_PROPERTIES,
        );
        Ok(self.issuance(sender, data))
    }

    /// Collection issuance (NFT, SFT or Meta-ESDT), paying the issuance fee.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a malformed name, ticker or decimals.
    pub fn issue_collection(
        &self,
        sender: Address,
        kind: CollectionKind,
        name: &str,
        ticker: &str,
    ) -> Result<Transaction> {
        validate_token_name(name)?;
        validate_ticker(ticker)?;

        let mut data = DataField::new(kind.function()).text(name).text(ticker);
        if let CollectionKind::MetaEsdt { decimals } = kind {
            validate_decimals(decimals)?;
            data = data.u64(u64::from(decimals));
        }
        Ok(self.issuance(sender, with_properties(data, &COLLECTION_PROPERTIES)))
    }

    fn issuance(&self, sender: Address, data: DataField) -> Transaction {
        self.base(Address::esdt_system_sc(), gas::ISSUE)
            .with_sender(Some(sender))
            .with_value(U256::from(gas::ISSUE_COST))
            .with_data(data.build())
    }

    /// `ESDTNFTCreate` under an existing collection, sent to self.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for royalties above 10000, a zero
    /// quantity or an empty collection identifier.
    pub fn create_nft(&self, sender: Address, nft: &NftCreate) -> Result<Transaction> {
        if nft.collection.trim().is_empty() {
            return Err(Error::validation("collection identifier must not be empty"));
        }
        if nft.royalties > MAX_ROYALTIES {
            return Err(Error::validation(
                "Royalties must be between 0 and 10000 (0% - 100%).",
            ));
        }
        if nft.quantity.is_zero() {
            return Err(Error::validation("quantity must be at least 1"));
        }

        let mut data = DataField::new("ESDTNFTCreate")
            .text(&nft.collection)
            .biguint(&nft.quantity)
            .text(&nft.name)
            .u64(u64::from(nft.royalties))
            .arg("")
            .arg("");
        for uri in &nft.uris {
            data = data.text(uri);
        }

        Ok(self
            .base(sender, gas::NFT_TRANSFER)
            .with_sender(Some(sender))
            .with_data(data.build()))
    }

    /// Reputation registry feedback for an agent, rating 1-5.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a rating outside 1-5.
    pub fn submit_feedback(
        &self,
        registry: Address,
        sender: Option<Address>,
        agent_nonce: u64,
        rating: u8,
    ) -> Result<Transaction> {
        if !(1..=5).contains(&rating) {
            return Err(Error::validation("rating must be between 1 and 5"));
        }
        let data = DataField::new("submitFeedback")
            .arg(codec::encode_fixed_u64(agent_nonce))
            .arg(format!("{rating:02x}"))
            .build();
        Ok(self.registry_call(registry, sender, gas::SUBMIT_FEEDBACK, data))
    }

    /// Validation registry job proof.
    ///
    /// A proof that already is even-length hex is passed through; any other
    /// text is hex-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty job id or proof.
    pub fn submit_proof(
        &self,
        registry: Address,
        sender: Option<Address>,
        job_id: &str,
        proof: &str,
    ) -> Result<Transaction> {
        if job_id.trim().is_empty() {
            return Err(Error::validation("job id must not be empty"));
        }
        if proof.trim().is_empty() {
            return Err(Error::validation("proof must not be empty"));
        }
        let proof_hex = if is_hex_bytes(proof) {
            proof.to_ascii_lowercase()
        } else {
            codec::encode_text(proof)
        };
        let data = DataField::new("submitProof")
            .text(job_id)
            .arg(proof_hex)
            .build();
        Ok(self.registry_call(registry, sender, gas::SUBMIT_PROOF, data))
    }

    /// Validation registry verdict on a job.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty job id.
    pub fn verify_job(
        &self,
        registry: Address,
        sender: Option<Address>,
        job_id: &str,
        verified: bool,
    ) -> Result<Transaction> {
        if job_id.trim().is_empty() {
            return Err(Error::validation("job id must not be empty"));
        }
        let data = DataField::new("verifyJob")
            .text(job_id)
            .arg(codec::encode_bool(verified))
            .build();
        Ok(self.registry_call(registry, sender, gas::VERIFY_JOB, data))
    }

    fn registry_call(
        &self,
        registry: Address,
        sender: Option<Address>,
        gas_limit: u64,
        data: String,
    ) -> Transaction {
        self.base(registry, gas_limit)
            .with_sender(Some(sender.unwrap_or(PLACEHOLDER_SENDER)))
            .with_data(data)
    }
}

fn with_properties(mut data: DataField, properties: &[&str]) -> DataField {
    for property in properties {
        data = data.text(property).arg(codec::encode_flag(true));
    }
    data
}

fn matches_pattern(pattern: &str, text: &str) -> bool {
    Regex::new(pattern).is_ok_and(|re| re.is_match(text))
}

fn is_hex_bytes(text: &str) -> bool {
    text.len() % 2 == 0 && matches_pattern(r"^[0-9a-fA-F]+$", text)
}

/// Token and collection names: 3-20 alphanumeric characters.
///
/// # Errors
///
/// Returns [`Error::Validation`] otherwise.
pub fn validate_token_name(name: &str) -> Result<()> {
    if matches_pattern(r"^[A-Za-z0-9]{3,20}$", name) {
        Ok(())
    } else {
        Err(Error::validation(
            "Token name must be 3-20 alphanumeric characters.",
        ))
    }
}

/// Tickers: 3-10 uppercase alphanumeric characters.
///
/// # Errors
///
/// Returns [`Error::Validation`] otherwise.
pub fn validate_ticker(ticker: &str) -> Result<()> {
    if matches_pattern(r"^[A-Z0-9]{3,10}$", ticker) {
        Ok(())
    } else {
        Err(Error::validation(
            "Token ticker must be 3-10 uppercase alphanumeric characters.",
        ))
    }
}

fn validate_decimals(decimals: u32) -> Result<()> {
    if decimals > MAX_DECIMALS {
        return Err(Error::validation("Number of decimals must be between 0 and 18."));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::marketplace::MarketplaceTable;
    use crate::network::Network;

    const ALICE: &str = "erd1qyu5wgts7fp92az5y2yuqlsq0zy7gu3g5pcsq7yfu3ez3gr3qpuq00xjqv";
    const BOB: &str = "erd1spyavw0956vq68xj8y4tenjpq2wd5a9p2c6j8gsz7ztyrnpxrruqzu66jx";
    const CAROL: &str = "erd1k2s324ww2g0yj38qn2ch2jwctdy8mnfxep94q9arncc6xecg3xaq6mjse8";
    const OOX: &str = "erd1qqqqqqqqqqqqqpgqnuvmfape5atwn00epl5w4lcfzf2dzslpg8vsd60sm7";

    fn addr(s: &str) -> Address {
        Address::from_bech32(s).unwrap()
    }

    fn builder() -> TransactionBuilder {
        TransactionBuilder::new(&NetworkConfig::for_network(Network::Devnet))
    }

    fn data_of(tx: &Transaction) -> String {
        tx.data_text()
    }

    mod transfers {
        use super::*;

        #[test]
        fn egld_transfer() {
            let tx = builder().egld_transfer(Some(addr(ALICE)), addr(BOB), U256::from(10_u64));
            assert_eq!(tx.receiver, addr(BOB));
            assert_eq!(tx.value, U256::from(10_u64));
            assert_eq!(tx.gas_limit, 50_000);
            assert_eq!(tx.chain_id, "D");
            assert!(tx.data.is_empty());
        }

        #[test]
        fn egld_template_without_sender() {
            let tx = builder().egld_transfer(None, addr(BOB), U256::from(1_u64));
            assert!(tx.sender.is_none());
        }

        #[test]
        fn fungible_token_transfer() {
            let transfer = TokenTransfer::new("USDC-c76f1f", 0, U256::from(1_000_000_u64));
            let tx = builder().token_transfer(None, addr(BOB), &transfer).unwrap();
            assert_eq!(data_of(&tx), "ESDTTransfer@555344432d633736663166@0f4240");
            assert_eq!(tx.receiver, addr(BOB));
            assert_eq!(tx.gas_limit, gas::ESDT_TRANSFER);
        }

        #[test]
        fn nft_transfer_goes_to_self() {
            let transfer = TokenTransfer::new("NFT-123456", 5, U256::from(1_u64));
            let tx = builder()
                .token_transfer(Some(addr(ALICE)), addr(BOB), &transfer)
                .unwrap();
            assert_eq!(tx.receiver, addr(ALICE));
            assert_eq!(
                data_of(&tx),
                format!(
                    "ESDTNFTTransfer@{}@05@01@{}",
                    codec::encode_text("NFT-123456"),
                    addr(BOB).to_hex()
                )
            );
            assert_eq!(tx.gas_limit, gas::NFT_TRANSFER);
        }

        #[test]
        fn nft_transfer_requires_sender() {
            let transfer = TokenTransfer::new("NFT-123456", 5, U256::from(1_u64));
            assert!(builder().token_transfer(None, addr(BOB), &transfer).is_err());
        }

        #[test]
        fn empty_token_is_rejected() {
            let transfer = TokenTransfer::new(" ", 0, U256::from(1_u64));
            assert!(matches!(
                builder().token_transfer(None, addr(BOB), &transfer),
                Err(Error::Validation(_))
            ));
        }

        #[test]
        fn single_fungible_in_batch_uses_esdt_transfer() {
            let tokens = [TokenTransfer::new("TOK-abcdef", 0, U256::from(16_u64))];
            let tx = builder()
                .multi_token_transfer(addr(ALICE), addr(BOB), &tokens)
                .unwrap();
            assert_eq!(tx.receiver, addr(BOB));
            assert!(data_of(&tx).starts_with("ESDTTransfer@"));
            assert_eq!(tx.gas_limit, 1_100_000);
        }

        #[test]
        fn several_tokens_use_multi_transfer() {
            let tokens = [
                TokenTransfer::new("TOK-abcdef", 0, U256::from(16_u64)),
                TokenTransfer::new("NFT-123456", 1, U256::from(1_u64)),
            ];
            let tx = builder()
                .multi_token_transfer(addr(ALICE), addr(CAROL), &tokens)
                .unwrap();
            assert_eq!(tx.receiver, addr(ALICE));
            assert_eq!(tx.gas_limit, 2_200_000);
            let (function, args) = codec::parse_data_field(&data_of(&tx));
            assert_eq!(function, "MultiESDTNFTTransfer");
            assert_eq!(args[0], addr(CAROL).to_hex());
            assert_eq!(args[1], "02");
            assert_eq!(args[2], codec::encode_text("TOK-abcdef"));
            assert_eq!(args[3], "");
            assert_eq!(args[4], "10");
            assert_eq!(args[6], "01");
            assert_eq!(args.len(), 8);
        }

        #[test]
        fn empty_batch_is_rejected() {
            assert!(builder()
                .multi_token_transfer(addr(ALICE), addr(BOB), &[])
                .is_err());
        }
    }

    mod guarded {
        use super::*;

        #[test]
        fn sets_version_options_and_guardian() {
            let tx = builder().guarded(
                addr(ALICE),
                addr(BOB),
                U256::from(5_u64),
                3,
                "pay",
                addr(CAROL),
            );
            assert_eq!(tx.version, 2);
            assert_eq!(tx.options & 0b10, 0b10);
            assert_eq!(tx.guardian, Some(addr(CAROL)));
            assert_eq!(tx.gas_limit, gas::GUARDED);
            assert_eq!(tx.nonce, 3);
            assert_eq!(tx.data, b"pay");
        }
    }

    mod purchase {
        use super::*;

        fn item(nonce: u64, quantity: u64) -> PurchaseItem {
            PurchaseItem {
                token_identifier: "TOK-1".to_owned(),
                nonce,
                quantity,
            }
        }

        #[test]
        fn oox_uses_buy_nft() {
            let table = MarketplaceTable::embedded().unwrap();
            let tx = builder()
                .purchase(table.resolve("oox"), None, &item(1, 1))
                .unwrap();
            assert_eq!(data_of(&tx), "buyNft@544f4b2d31@01@01");
            assert_eq!(tx.receiver.to_bech32(), OOX);
            assert_eq!(tx.value, U256::ZERO);
            assert_eq!(tx.gas_limit, gas::PURCHASE);
        }

        #[test]
        fn data_field_shape_for_every_marketplace() {
            let table = MarketplaceTable::embedded().unwrap();
            for key in table.keys() {
                let contract = table.resolve(key);
                for (nonce, quantity) in [(0, 1), (15, 16), (255, 256), (1 << 20, 3)] {
                    let tx = builder().purchase(contract, None, &item(nonce, quantity)).unwrap();
                    let pattern = format!("^{}@[0-9a-f]+(@[0-9a-f]+)*$", contract.abi.function);
                    assert!(
                        Regex::new(&pattern).unwrap().is_match(&data_of(&tx)),
                        "unexpected data {}",
                        data_of(&tx)
                    );
                }
            }
        }

        #[test]
        fn zero_quantity_is_rejected() {
            let table = MarketplaceTable::embedded().unwrap();
            assert!(builder().purchase(table.resolve("default"), None, &item(1, 0)).is_err());
        }

        #[test]
        fn unknown_abi_argument_fails_loudly() {
            let mut contract = MarketplaceTable::embedded().unwrap().resolve("oox").clone();
            contract.abi.args_order.push("price".to_owned());
            let err = builder().purchase(&contract, None, &item(1, 1)).unwrap_err();
            assert!(matches!(err, Error::Configuration(_)));
        }
    }

    mod issuance {
        use super::*;

        #[test]
        fn fungible_issue_data_and_fee() {
            let issue = FungibleIssue {
                name: "MyToken".to_owned(),
                ticker: "MTK".to_owned(),
                initial_supply: U256::from(1000_u64),
                decimals: 6,
            };
            let tx = builder().issue_fungible(addr(ALICE), &issue).unwrap();
            assert_eq!(tx.receiver, Address::esdt_system_sc());
            assert_eq!(tx.value, U256::from(50_000_000_000_000_000_u128));
            assert_eq!(tx.gas_limit, gas::ISSUE);

            let (function, args) = codec::parse_data_field(&data_of(&tx));
            assert_eq!(function, "issue");
            assert_eq!(args[0], codec::encode_text("MyToken"));
            assert_eq!(args[1], codec::encode_text("MTK"));
            assert_eq!(args[2], "03e8");
            assert_eq!(args[3], "06");
            assert_eq!(args[4], codec::encode_text("canFreeze"));
            assert_eq!(args[5], codec::encode_text("true"));
            assert_eq!(args.len(), 4 + 12);
        }

        #[test]
        fn name_and_ticker_rules() {
            assert!(validate_token_name("ab").is_err());
            assert!(validate_token_name("has space").is_err());
            assert!(validate_token_name("A".repeat(21).as_str()).is_err());
            assert!(validate_token_name("Token1").is_ok());

            assert!(validate_ticker("mtk").is_err());
            assert!(validate_ticker("MT").is_err());
            assert!(validate_ticker("MTK1").is_ok());
        }

        #[test]
        fn decimals_above_eighteen_rejected() {
            let issue = FungibleIssue {
                name: "MyToken".to_owned(),
                ticker: "MTK".to_owned(),
                initial_supply: U256::from(1_u64),
                decimals: 19,
            };
            assert!(builder().issue_fungible(addr(ALICE), &issue).is_err());
        }

        #[test]
        fn collection_functions() {
            let b = builder();
            let nft = b
                .issue_collection(addr(ALICE), CollectionKind::NonFungible, "Coll", "COLL")
                .unwrap();
            assert!(data_of(&nft).starts_with("issueNonFungible@"));

            let sft = b
                .issue_collection(addr(ALICE), CollectionKind::SemiFungible, "Coll", "COLL")
                .unwrap();
            assert!(data_of(&sft).starts_with("issueSemiFungible@"));

            let meta = b
                .issue_collection(addr(ALICE), CollectionKind::MetaEsdt { decimals: 18 }, "Coll", "COLL")
                .unwrap();
            let (function, args) = codec::parse_data_field(&data_of(&meta));
            assert_eq!(function, "registerMetaESDT");
            assert_eq!(args[2], "12");
            assert_eq!(args.len(), 3 + 14);
            assert!(data_of(&meta).contains(&codec::encode_text("canTransferNFTCreateRole")));
        }

        #[test]
        fn create_nft_shape() {
            let nft = NftCreate {
                collection: "COL-123456".to_owned(),
                name: "First".to_owned(),
                royalties: 500,
                quantity: U256::from(1_u64),
                uris: vec!["https://x.y/1.png".to_owned()],
            };
            let tx = builder().create_nft(addr(ALICE), &nft).unwrap();
            assert_eq!(tx.receiver, addr(ALICE));
            let (function, args) = codec::parse_data_field(&data_of(&tx));
            assert_eq!(function, "ESDTNFTCreate");
            assert_eq!(args[1], "01");
            assert_eq!(args[3], "01f4");
            assert_eq!(args[4], "");
            assert_eq!(args[5], "");
            assert_eq!(args[6], codec::encode_text("https://x.y/1.png"));
        }

        #[test]
        fn royalties_bound() {
            let nft = NftCreate {
                collection: "COL-123456".to_owned(),
                name: "First".to_owned(),
                royalties: 10_001,
                quantity: U256::from(1_u64),
                uris: Vec::new(),
            };
            let err = builder().create_nft(addr(ALICE), &nft).unwrap_err();
            assert!(err.to_string().contains("10000"));
        }
    }

    mod registry {
        use super::*;

        #[test]
        fn feedback_encoding_and_placeholder_sender() {
            let tx = builder()
                .submit_feedback(addr(CAROL), None, 42, 5)
                .unwrap();
            assert_eq!(data_of(&tx), "submitFeedback@000000000000002a@05");
            assert_eq!(tx.sender, Some(addr(ALICE)));
            assert_eq!(PLACEHOLDER_SENDER, addr(ALICE));
            assert_eq!(tx.gas_limit, gas::SUBMIT_FEEDBACK);
        }

        #[test]
        fn feedback_rating_bounds() {
            assert!(builder().submit_feedback(addr(CAROL), None, 1, 0).is_err());
            assert!(builder().submit_feedback(addr(CAROL), None, 1, 6).is_err());
        }

        #[test]
        fn feedback_keeps_given_sender() {
            let tx = builder()
                .submit_feedback(addr(CAROL), Some(addr(BOB)), 1, 3)
                .unwrap();
            assert_eq!(tx.sender, Some(addr(BOB)));
        }

        #[test]
        fn proof_passes_hex_through() {
            let tx = builder()
                .submit_proof(addr(CAROL), None, "job-1", "ABCDEF")
                .unwrap();
            assert_eq!(data_of(&tx), format!("submitProof@{}@abcdef", codec::encode_text("job-1")));

            let tx = builder()
                .submit_proof(addr(CAROL), None, "job-1", "not hex")
                .unwrap();
            assert!(data_of(&tx).ends_with(&codec::encode_text("not hex")));
            assert_eq!(tx.gas_limit, gas::SUBMIT_PROOF);
        }

        #[test]
        fn verify_job_status_byte() {
            let ok = builder().verify_job(addr(CAROL), None, "job-1", true).unwrap();
            assert!(data_of(&ok).ends_with("@01"));
            let fail = builder().verify_job(addr(CAROL), None, "job-1", false).unwrap();
            assert!(data_of(&fail).ends_with("@00"));
            assert!(builder().verify_job(addr(CAROL), None, "", true).is_err());
        }
    }
}
