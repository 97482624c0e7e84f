//! Token issuance and NFT creation tools.
//!
//! Issuance pays a fee and needs a funded wallet, so these tools only work in
//! signed mode.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{SIGNING_HINT, ToolContext, respond};
use crate::codec::parse_biguint;
use crate::error::{Error, Result, ToolError};
use crate::sender::SignedSender;
use crate::tool::{DynTool, Tool, ToolDefinition, ToolResponse, ToolResult, input_schema};
use crate::transaction::{CollectionKind, FungibleIssue, NftCreate, Transaction};

fn issuance_sender(context: &ToolContext) -> std::result::Result<SignedSender, ToolResponse> {
    if !context.signing_enabled() && context.wallet_failure().is_none() {
        return Err(ToolResponse::error(format!(
            "Signing mode required for token issuance. {SIGNING_HINT}"
        )));
    }
    context
        .signed_sender()
        .map_err(|e| ToolResponse::error(e.to_string()))
}

async fn send_issuance(context: &ToolContext, sender: &SignedSender, tx: Transaction) -> Result<String> {
    let hash = sender.send(tx).await?;
    Ok(context.transaction_url(&hash))
}

/// Arguments of `issue-fungible-token`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IssueFungibleArgs {
    /// Token name (3-20 alphanumeric characters).
    pub token_name: String,
    /// Token ticker (3-10 uppercase alphanumeric characters).
    pub token_ticker: String,
    /// Initial supply in atomic units.
    pub initial_supply: String,
    /// Number of decimals (0-18).
    pub num_decimals: u32,
}

/// Fungible ESDT issuance.
#[derive(Debug)]
pub struct IssueFungibleTokenTool(pub Arc<ToolContext>);

#[async_trait]
impl Tool for IssueFungibleTokenTool {
    const NAME: &'static str = "issue-fungible-token";
    type Args = IssueFungibleArgs;

    fn description(&self) -> String {
        "Issue a new fungible ESDT token on MultiversX".to_owned()
    }

    async fn call(&self, args: IssueFungibleArgs) -> ToolResponse {
        let sender = match issuance_sender(&self.0) {
            Ok(sender) => sender,
            Err(response) => return response,
        };
        let result = async {
            let issue = FungibleIssue {
                name: args.token_name.trim().to_owned(),
                ticker: args.token_ticker.trim().to_owned(),
                initial_supply: parse_biguint("initialSupply", &args.initial_supply)?,
                decimals: args.num_decimals,
            };
            let tx = self.0.builder().issue_fungible(sender.signer().address(), &issue)?;
            let url = send_issuance(&self.0, &sender, tx).await?;
            Ok::<_, Error>(ToolResponse::text(format!(
                "Token issuance transaction sent. Track status at: {url}\n\n\
                 Note: The token identifier will be available in the transaction logs after confirmation."
            )))
        };
        respond("Failed to issue token", result.await)
    }
}

/// Arguments of `issue-nft-collection` and `issue-sft-collection`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IssueCollectionArgs {
    /// Collection name (3-20 alphanumeric characters).
    pub token_name: String,
    /// Collection ticker (3-10 uppercase alphanumeric characters).
    pub token_ticker: String,
}

/// Arguments of `issue-meta-esdt-collection`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IssueMetaEsdtArgs {
    /// Collection name (3-20 alphanumeric characters).
    pub token_name: String,
    /// Collection ticker (3-10 uppercase alphanumeric characters).
    pub token_ticker: String,
    /// Number of decimals (0-18).
    pub num_decimals: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Nft,
    Sft,
    MetaEsdt,
}

impl Flavor {
    const fn name(self) -> &'static str {
        match self {
            Self::Nft => "issue-nft-collection",
            Self::Sft => "issue-sft-collection",
            Self::MetaEsdt => "issue-meta-esdt-collection",
        }
    }

    const fn description(self) -> &'static str {
        match self {
            Self::Nft => "Issue a new NFT collection on MultiversX",
            Self::Sft => "Issue a new Semi-Fungible Token collection",
            Self::MetaEsdt => "Issue a new Meta-ESDT collection (fungible-like with nonces)",
        }
    }

    const fn sent(self) -> &'static str {
        match self {
            Self::Nft => "NFT collection issuance sent",
            Self::Sft => "SFT collection issuance sent",
            Self::MetaEsdt => "Meta-ESDT collection issuance sent",
        }
    }

    const fn failed(self) -> &'static str {
        match self {
            Self::Nft => "Failed to issue NFT collection",
            Self::Sft => "Failed to issue SFT collection",
            Self::MetaEsdt => "Failed to issue Meta-ESDT",
        }
    }
}

/// Collection issuance; one instance per collection kind.
///
/// The three kinds share a handler but are registered under different names,
/// so this implements [`DynTool`] directly.
#[derive(Debug)]
pub struct IssueCollectionTool {
    context: Arc<ToolContext>,
    flavor: Flavor,
}

impl IssueCollectionTool {
    /// `issue-nft-collection`.
    #[must_use]
    pub const fn nft(context: Arc<ToolContext>) -> Self {
        Self { context, flavor: Flavor::Nft }
    }

    /// `issue-sft-collection`.
    #[must_use]
    pub const fn sft(context: Arc<ToolContext>) -> Self {
        Self { context, flavor: Flavor::Sft }
    }

    /// `issue-meta-esdt-collection`.
    #[must_use]
    pub const fn meta_esdt(context: Arc<ToolContext>) -> Self {
        Self { context, flavor: Flavor::MetaEsdt }
    }

    /// Issue a collection of this tool's kind.
    pub async fn issue(&self, name: &str, ticker: &str, decimals: u32) -> ToolResponse {
        let sender = match issuance_sender(&self.context) {
            Ok(sender) => sender,
            Err(response) => return response,
        };
        let kind = match self.flavor {
            Flavor::Nft => CollectionKind::NonFungible,
            Flavor::Sft => CollectionKind::SemiFungible,
            Flavor::MetaEsdt => CollectionKind::MetaEsdt { decimals },
        };
        let result = async {
            let tx = self.context.builder().issue_collection(
                sender.signer().address(),
                kind,
                name.trim(),
                ticker.trim(),
            )?;
            let url = send_issuance(&self.context, &sender, tx).await?;
            Ok::<_, Error>(ToolResponse::text(format!("{}: {url}", self.flavor.sent())))
        };
        respond(self.flavor.failed(), result.await)
    }
}

fn parse_args<T: DeserializeOwned>(args: Value) -> ToolResult<T> {
    let args = match args {
        Value::String(s) => serde_json::from_str(&s),
        Value::Null => serde_json::from_value(Value::Object(serde_json::Map::new())),
        other => serde_json::from_value(other),
    };
    args.map_err(|e| ToolError::invalid_args(e.to_string()))
}

#[async_trait]
impl DynTool for IssueCollectionTool {
    fn name(&self) -> &str {
        self.flavor.name()
    }

    fn definition(&self) -> ToolDefinition {
        let schema = match self.flavor {
            Flavor::MetaEsdt => input_schema::<IssueMetaEsdtArgs>(),
            Flavor::Nft | Flavor::Sft => input_schema::<IssueCollectionArgs>(),
        };
        ToolDefinition::new(self.flavor.name(), self.flavor.description(), schema)
    }

    async fn call_json(&self, args: Value) -> ToolResult<ToolResponse> {
        if self.flavor == Flavor::MetaEsdt {
            let args: IssueMetaEsdtArgs = parse_args(args)?;
            Ok(self.issue(&args.token_name, &args.token_ticker, args.num_decimals).await)
        } else {
            let args: IssueCollectionArgs = parse_args(args)?;
            Ok(self.issue(&args.token_name, &args.token_ticker, 0).await)
        }
    }
}

/// Arguments of `create-nft`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateNftArgs {
    /// Collection identifier (e.g., ART-abcdef).
    pub collection_identifier: String,
    /// Display name of the token.
    pub name: String,
    /// Royalties in hundredths of a percent (0-10000).
    pub royalties: u32,
    /// Quantity to mint; 1 for an NFT.
    pub quantity: String,
    /// Media and metadata URIs.
    #[serde(default)]
    pub uris: Vec<String>,
}

/// `ESDTNFTCreate` under an existing collection.
#[derive(Debug)]
pub struct CreateNftTool(pub Arc<ToolContext>);

#[async_trait]
impl Tool for CreateNftTool {
    const NAME: &'static str = "create-nft";
    type Args = CreateNftArgs;

    fn description(&self) -> String {
        "Create (mint) a new NFT/SFT/Meta-ESDT under an existing collection".to_owned()
    }

    async fn call(&self, args: CreateNftArgs) -> ToolResponse {
        let sender = match issuance_sender(&self.0) {
            Ok(sender) => sender,
            Err(response) => return response,
        };
        let result = async {
            let nft = NftCreate {
                collection: args.collection_identifier.trim().to_owned(),
                name: args.name,
                royalties: args.royalties,
                quantity: parse_biguint("quantity", &args.quantity)?,
                uris: args.uris,
            };
            let tx = self.0.builder().create_nft(sender.signer().address(), &nft)?;
            let url = send_issuance(&self.0, &sender, tx).await?;
            Ok::<_, Error>(ToolResponse::text(format!("NFT/SFT creation transaction sent: {url}")))
        };
        respond("Failed to create NFT", result.await)
    }
}
