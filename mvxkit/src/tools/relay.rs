//! Relayer co-signing tool.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use super::ToolContext;
use crate::tool::{Tool, ToolResponse};

/// Arguments of `create-relayed-v3`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RelayedV3Args {
    /// Sender-signed transaction as a plain object, signed with the relayer
    /// field already set.
    pub inner_transaction: Value,
}

/// Co-signs a sender-signed transaction as relayer and broadcasts it.
#[derive(Debug)]
pub struct CreateRelayedV3Tool(pub Arc<ToolContext>);

#[async_trait]
impl Tool for CreateRelayedV3Tool {
    const NAME: &'static str = "create-relayed-v3";
    type Args = RelayedV3Args;

    fn description(&self) -> String {
        "Co-sign a signed inner transaction as a relayer for gas sponsoring (RelayedV3)".to_owned()
    }

    async fn call(&self, args: RelayedV3Args) -> ToolResponse {
        let outcome = match self.0.relay_service() {
            Ok(service) => service.relay(args.inner_transaction).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(outcome) => ToolResponse::text(format!(
                "RelayedV3 transaction sent: {}\n\nTransaction Hash: {}",
                self.0.transaction_url(&outcome.hash),
                outcome.hash
            )),
            Err(e) => ToolResponse::error(format!("Failed to create RelayedV3 transaction: {e}")),
        }
    }
}
