//! The MultiversX tool set.
//!
//! Each tool wraps a shared [`ToolContext`] and exposes one operation through
//! the [`Tool`](crate::tool::Tool) interface. [`create_tools`] builds the full
//! set; [`toolbox`] registers it in a dispatcher.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::NetworkProvider;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::marketplace::MarketplaceTable;
use crate::registry::AgentRegistry;
use crate::relay::{RelayService, RelayerSource};
use crate::search::SearchMode;
use crate::sender::SignedSender;
use crate::tool::{BoxedTool, ToolBox, ToolResponse};
use crate::transaction::{Transaction, TransactionBuilder};
use crate::wallet::{Signer, Wallet, WalletDirectory, WalletError};
use crate::whitelist::Whitelist;

mod account;
mod commerce;
mod registry;
mod relay;
mod tokens;
mod transfers;

pub use account::{GetBalanceTool, QueryAccountTool};
pub use commerce::{CreatePurchaseTransactionTool, SearchProductsTool, TrackTransactionTool};
pub use registry::{
    GetAgentManifestTool, GetAgentReputationTool, GetAgentTrustSummaryTool, GetTopRatedAgentsTool,
    IsJobVerifiedTool, SearchAgentsTool, SubmitAgentFeedbackTool, SubmitJobProofTool, VerifyJobTool,
};
pub use relay::CreateRelayedV3Tool;
pub use tokens::{CreateNftTool, IssueCollectionTool, IssueFungibleTokenTool};
pub use transfers::{
    CreateGuardedTransactionTool, SendEgldTool, SendEgldToMultipleTool, SendTokensTool,
    SendTokensToMultipleTool,
};

/// Message of unsigned templates.
pub const UNSIGNED_MESSAGE: &str = "Unsigned transaction. Set sender, nonce, and sign before broadcasting.";

/// Hint appended when a tool needs a signing wallet.
pub const SIGNING_HINT: &str = "Set MVX_SIGNING_MODE=signed and MVX_WALLET_PEM.";

/// Shared state of every tool.
#[derive(Debug)]
pub struct ToolContext {
    settings: Settings,
    provider: NetworkProvider,
    builder: TransactionBuilder,
    marketplaces: MarketplaceTable,
    whitelist: Arc<Whitelist>,
    registry: AgentRegistry,
    signer: Option<Arc<dyn Signer>>,
    wallet_error: Option<WalletError>,
    relayers: Option<Arc<WalletDirectory>>,
}

impl ToolContext {
    /// Context talking HTTP to the configured API, loading wallets from disk.
    ///
    /// An unusable wallet PEM does not fail construction; the error is kept
    /// and returned by the tools that need to sign.
    ///
    /// # Errors
    ///
    /// Fails on a bad marketplace table or an HTTP client that cannot be
    /// built.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let provider = NetworkProvider::http(&settings.network)?;
        let mut context = Self::with_provider(settings, provider)?;

        if let Some(path) = context.settings.wallet_pem.clone() {
            context = context.with_wallet_file(&path);
        }
        if let Some(dir) = context.settings.wallet_dir.clone() {
            let wallets = WalletDirectory::load(&dir);
            info!(dir = %dir.display(), wallets = wallets.len(), "loaded relayer wallets");
            context.relayers = Some(Arc::new(wallets));
        }
        Ok(context)
    }

    /// Context over an existing provider, without wallets.
    ///
    /// # Errors
    ///
    /// Fails on a bad marketplace table.
    pub fn with_provider(settings: Settings, provider: NetworkProvider) -> Result<Self> {
        let marketplaces = match &settings.marketplaces_path {
            Some(path) => MarketplaceTable::from_file(path)?,
            None => MarketplaceTable::embedded()?,
        };
        let whitelist = Arc::new(Whitelist::from_path(settings.whitelist_path.clone()));
        let registry = AgentRegistry::new(provider.clone(), settings.registry);
        debug!(network = %settings.network.network, signing = %settings.signing_mode, "tool context ready");
        Ok(Self {
            builder: TransactionBuilder::new(&settings.network),
            provider,
            marketplaces,
            whitelist,
            registry,
            signer: None,
            wallet_error: None,
            relayers: None,
            settings,
        })
    }

    /// Load the signing wallet from a PEM file, keeping the error on failure.
    #[must_use]
    pub fn with_wallet_file(mut self, path: &Path) -> Self {
        match Wallet::from_pem_file(path) {
            Ok(wallet) => {
                info!(address = %wallet.address(), "loaded signing wallet");
                self.signer = Some(Arc::new(wallet));
                self.wallet_error = None;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "signing wallet unavailable");
                self.signer = None;
                self.wallet_error = Some(e);
            }
        }
        self
    }

    /// Use `signer` as the signing wallet.
    #[must_use]
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self.wallet_error = None;
        self
    }

    /// Use `relayers` for shard-matched relaying.
    #[must_use]
    pub fn with_relayers(mut self, relayers: Arc<WalletDirectory>) -> Self {
        self.relayers = Some(relayers);
        self
    }

    /// Replace the whitelist.
    #[must_use]
    pub fn with_whitelist(mut self, whitelist: Arc<Whitelist>) -> Self {
        self.whitelist = whitelist;
        self
    }

    /// Settings the context was built from.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Upstream API.
    #[must_use]
    pub const fn provider(&self) -> &NetworkProvider {
        &self.provider
    }

    /// Transaction builder for the configured chain.
    #[must_use]
    pub const fn builder(&self) -> &TransactionBuilder {
        &self.builder
    }

    /// Marketplace table.
    #[must_use]
    pub const fn marketplaces(&self) -> &MarketplaceTable {
        &self.marketplaces
    }

    /// Trusted collections and addresses.
    #[must_use]
    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    /// Agent registry reader.
    #[must_use]
    pub const fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Whether mutating tools sign and broadcast.
    #[must_use]
    pub const fn signing_enabled(&self) -> bool {
        self.settings.signing_mode.is_signed() && self.signer.is_some()
    }

    /// Load failure of the configured signing wallet, when signing mode asks
    /// for it.
    #[must_use]
    pub fn wallet_failure(&self) -> Option<Error> {
        self.wallet_error
            .clone()
            .filter(|_| self.settings.signing_mode.is_signed())
            .map(Error::Wallet)
    }

    /// Signed broadcaster of the configured wallet.
    ///
    /// # Errors
    ///
    /// Returns the wallet load error when the PEM could not be used, else
    /// [`Error::Configuration`] when signing is not enabled.
    pub fn signed_sender(&self) -> Result<SignedSender> {
        match &self.signer {
            Some(signer) if self.settings.signing_mode.is_signed() => {
                Ok(SignedSender::new(self.provider.clone(), Arc::clone(signer)))
            }
            _ => Err(self
                .wallet_failure()
                .unwrap_or_else(|| Error::configuration(format!("Signing mode required. {SIGNING_HINT}")))),
        }
    }

    /// Relay service over the wallet directory, else the signing wallet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when no relayer wallet is available.
    pub fn relay_service(&self) -> Result<RelayService> {
        let source = if let Some(relayers) = &self.relayers {
            RelayerSource::Directory(Arc::clone(relayers))
        } else if let Some(signer) = self.signer.as_ref().filter(|_| self.settings.signing_mode.is_signed()) {
            RelayerSource::Single(Arc::clone(signer))
        } else if let Some(e) = self.wallet_failure() {
            return Err(e);
        } else {
            return Err(Error::configuration(format!(
                "Signing mode required for RelayedV3 (relayer wallet needed). {SIGNING_HINT}"
            )));
        };
        Ok(RelayService::new(self.provider.clone(), source)
            .with_shard_count(self.settings.shard_count)
            .with_simulation(self.settings.simulate_relayed))
    }

    /// Search mode selected by `verified_search`.
    #[must_use]
    pub fn search_mode(&self) -> SearchMode<'_> {
        if self.settings.verified_search {
            SearchMode::Verified(&self.whitelist)
        } else {
            SearchMode::Public
        }
    }

    /// Explorer link of a transaction.
    #[must_use]
    pub fn transaction_url(&self, hash: &str) -> String {
        self.settings.network.transaction_url(hash)
    }

    /// Sign and send `tx`, or return it as an unsigned template.
    async fn send_or_template(&self, tx: Transaction) -> Result<ToolResponse> {
        if let Some(e) = self.wallet_failure() {
            return Err(e);
        }
        if !self.signing_enabled() {
            return Ok(unsigned_template(&tx));
        }
        let hash = self.signed_sender()?.send(tx).await?;
        Ok(ToolResponse::text(format!(
            "Transaction sent: {}",
            self.transaction_url(&hash)
        )))
    }

    /// Numbered explorer links of a batch.
    fn hash_list(&self, hashes: &[String]) -> String {
        hashes
            .iter()
            .enumerate()
            .map(|(i, hash)| format!("{}. {}", i + 1, self.transaction_url(hash)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Like [`respond`], listing the hashes a failed batch already sent.
    fn respond_batch(&self, operation: &str, result: Result<ToolResponse>) -> ToolResponse {
        match result {
            Err(Error::BatchPartial { sent, source }) => ToolResponse::error(format!(
                "{operation}: {source}\n\nSent before the failure:\n{}",
                self.hash_list(&sent)
            )),
            other => respond(operation, other),
        }
    }
}

/// `{message, transaction}` envelope of an unsigned transaction.
fn unsigned_template(tx: &Transaction) -> ToolResponse {
    ToolResponse::json(&serde_json::json!({
        "message": UNSIGNED_MESSAGE,
        "transaction": tx.to_plain(),
    }))
}

/// Render a domain result, prefixing errors with the failed operation.
fn respond(operation: &str, result: Result<ToolResponse>) -> ToolResponse {
    result.unwrap_or_else(|e| ToolResponse::error(format!("{operation}: {e}")))
}

/// Create every tool over a shared context.
pub fn create_tools(context: &Arc<ToolContext>) -> Vec<BoxedTool> {
    vec![
        // Accounts
        Box::new(GetBalanceTool(Arc::clone(context))),
        Box::new(QueryAccountTool(Arc::clone(context))),
        // Transfers
        Box::new(SendEgldTool(Arc::clone(context))),
        Box::new(SendTokensTool(Arc::clone(context))),
        Box::new(SendEgldToMultipleTool(Arc::clone(context))),
        Box::new(SendTokensToMultipleTool(Arc::clone(context))),
        Box::new(CreateGuardedTransactionTool(Arc::clone(context))),
        // Token management
        Box::new(IssueFungibleTokenTool(Arc::clone(context))),
        Box::new(IssueCollectionTool::nft(Arc::clone(context))),
        Box::new(IssueCollectionTool::sft(Arc::clone(context))),
        Box::new(IssueCollectionTool::meta_esdt(Arc::clone(context))),
        Box::new(CreateNftTool(Arc::clone(context))),
        // Relaying
        Box::new(CreateRelayedV3Tool(Arc::clone(context))),
        // Commerce
        Box::new(TrackTransactionTool(Arc::clone(context))),
        Box::new(SearchProductsTool(Arc::clone(context))),
        Box::new(CreatePurchaseTransactionTool(Arc::clone(context))),
        // Agent registries
        Box::new(GetAgentReputationTool(Arc::clone(context))),
        Box::new(SubmitAgentFeedbackTool(Arc::clone(context))),
        Box::new(IsJobVerifiedTool(Arc::clone(context))),
        Box::new(SubmitJobProofTool(Arc::clone(context))),
        Box::new(VerifyJobTool(Arc::clone(context))),
        Box::new(GetAgentTrustSummaryTool(Arc::clone(context))),
        Box::new(GetTopRatedAgentsTool(Arc::clone(context))),
        Box::new(SearchAgentsTool(Arc::clone(context))),
        Box::new(GetAgentManifestTool(Arc::clone(context))),
    ]
}

/// Dispatcher holding every tool.
#[must_use]
pub fn toolbox(context: &Arc<ToolContext>) -> ToolBox {
    let mut tools = ToolBox::new();
    for tool in create_tools(context) {
        tools.add_boxed(tool);
    }
    tools
}


#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::api::MockTransport;

    #[test]
    fn every_tool_is_registered_once() {
        let (context, _) = unsigned(MockTransport::new());
        let tools = toolbox(&context);
        assert_eq!(tools.len(), create_tools(&context).len());
        for name in [
            "get-balance",
            "query-account",
            "send-egld",
            "send-tokens",
            "send-egld-to-multiple",
            "send-tokens-to-multiple",
            "create-guarded-transaction",
            "issue-fungible-token",
            "issue-nft-collection",
            "issue-sft-collection",
            "issue-meta-esdt-collection",
            "create-nft",
            "create-relayed-v3",
            "track-transaction",
            "search-products",
            "create-purchase-transaction",
            "get-agent-reputation",
            "submit-agent-feedback",
            "is-job-verified",
            "submit-job-proof",
            "verify-job",
            "get-agent-trust-summary",
            "get-top-rated-agents",
            "search-agents",
            "get-agent-manifest",
        ] {
            assert!(tools.contains(name), "missing {name}");
        }
    }

    #[test]
    fn schemas_reject_unknown_fields() {
        let (context, _) = unsigned(MockTransport::new());
        for def in toolbox(&context).definitions() {
            assert_eq!(def.input_schema["type"], "object", "{}", def.name);
            assert_eq!(def.input_schema["additionalProperties"], false, "{}", def.name);
        }
    }

    #[test]
    fn signing_requires_mode_and_wallet() {
        let (context, _) = unsigned(MockTransport::new());
        assert!(!context.signing_enabled());
        assert!(matches!(context.signed_sender(), Err(Error::Configuration(_))));
        assert!(matches!(context.relay_service(), Err(Error::Configuration(_))));

        let (context, _) = signed(MockTransport::new());
        assert!(context.signing_enabled());
        assert!(context.signed_sender().is_ok());
        assert!(context.relay_service().is_ok());
    }

    fn missing_wallet(mock: MockTransport) -> (Arc<ToolContext>, Arc<MockTransport>) {
        let mock = Arc::new(mock);
        let settings = Settings {
            signing_mode: crate::config::SigningMode::Signed,
            ..Settings::default()
        };
        let context = ToolContext::with_provider(settings, NetworkProvider::new(mock.clone()))
            .unwrap()
            .with_wallet_file(Path::new("/nonexistent/mvxkit/wallet.pem"));
        (Arc::new(context), mock)
    }

    #[test]
    fn unreadable_wallet_still_builds_context() {
        let settings = Settings {
            signing_mode: crate::config::SigningMode::Signed,
            wallet_pem: Some("/nonexistent/mvxkit/wallet.pem".into()),
            ..Settings::default()
        };
        let context = ToolContext::from_settings(settings).unwrap();
        assert!(!context.signing_enabled());
        assert!(matches!(context.wallet_failure(), Some(Error::Wallet(WalletError::Io { .. }))));
    }

    #[tokio::test]
    async fn unreadable_wallet_only_fails_signing_tools() {
        let mock = MockTransport::new()
            .on_get(format!("accounts/{BOB}"), serde_json::json!({ "address": BOB, "balance": "0", "nonce": 0 }));
        let (context, mock) = missing_wallet(mock);
        let tools = toolbox(&context);

        let balance = tools
            .call("get-balance", serde_json::json!({ "address": BOB }))
            .await
            .unwrap();
        assert!(!balance.is_error, "{}", balance.text_content());

        let send = tools
            .call("send-egld", serde_json::json!({ "receiver": BOB, "amount": "1" }))
            .await
            .unwrap();
        assert!(send.is_error);
        assert!(send.text_content().contains("Cannot read wallet file"), "{}", send.text_content());
        assert!(matches!(context.signed_sender(), Err(Error::Wallet(_))));
        assert!(matches!(context.relay_service(), Err(Error::Wallet(_))));
        assert_eq!(mock.requests_to(crate::api::Method::Post, "transactions").len(), 0);
    }

    #[test]
    fn wallet_directory_enables_relay_without_signing() {
        let (context, _) = unsigned(MockTransport::new());
        let context = Arc::try_unwrap(context)
            .unwrap()
            .with_relayers(Arc::new(WalletDirectory::default()));
        assert!(context.relay_service().is_ok());
    }
}
