//! Account read tools.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use super::{ToolContext, respond};
use crate::account::{format_egld, get_account_details, get_balance};
use crate::address::Address;
use crate::tool::{Tool, ToolResponse};

/// Arguments naming one account.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AddressArgs {
    /// The bech32 representation of the address (erd1...).
    pub address: String,
}

/// EGLD balance of an address.
#[derive(Debug)]
pub struct GetBalanceTool(pub Arc<ToolContext>);

#[async_trait]
impl Tool for GetBalanceTool {
    const NAME: &'static str = "get-balance";
    type Args = AddressArgs;

    fn description(&self) -> String {
        "Get the EGLD balance for a MultiversX address".to_owned()
    }

    async fn call(&self, args: AddressArgs) -> ToolResponse {
        let Ok(address) = Address::from_bech32(args.address.trim()) else {
            return ToolResponse::error("Invalid address. Please provide a valid bech32 address (erd1...)");
        };
        respond(
            "Failed to fetch balance",
            get_balance(self.0.provider(), &address).await.map(|balance| {
                ToolResponse::text(format!(
                    "The balance for {address} is {} EGLD.",
                    format_egld(&balance)
                ))
            }),
        )
    }
}

/// Balance, nonce and shard of an address.
#[derive(Debug)]
pub struct QueryAccountTool(pub Arc<ToolContext>);

#[async_trait]
impl Tool for QueryAccountTool {
    const NAME: &'static str = "query-account";
    type Args = AddressArgs;

    fn description(&self) -> String {
        "Fetch detailed account information (balance, nonce, shard)".to_owned()
    }

    async fn call(&self, args: AddressArgs) -> ToolResponse {
        let Ok(address) = Address::from_bech32(args.address.trim()) else {
            return ToolResponse::error(
                "Invalid address format. Please provide a valid bech32 address (erd1...)",
            );
        };
        respond(
            "Failed to query account",
            get_account_details(self.0.provider(), &address)
                .await
                .map(|details| ToolResponse::json(&details)),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::api::MockTransport;
    use crate::error::ApiError;
    use crate::tools::testing::*;
    use serde_json::json;

    fn account_mock() -> MockTransport {
        MockTransport::new().on_get(
            format!("accounts/{BOB}"),
            json!({ "address": BOB, "balance": "1500000000000000000", "nonce": 7, "shard": 1 }),
        )
    }

    mod balance {
        use super::*;

        #[tokio::test]
        async fn formats_egld() {
            let (context, _) = unsigned(account_mock());
            let response = GetBalanceTool(context)
                .call(AddressArgs { address: BOB.into() })
                .await;
            assert_eq!(response.text_content(), format!("The balance for {BOB} is 1.5 EGLD."));
        }

        #[tokio::test]
        async fn invalid_address_makes_no_request() {
            let (context, mock) = unsigned(MockTransport::new());
            let response = GetBalanceTool(context)
                .call(AddressArgs { address: "erd1xyz".into() })
                .await;
            assert!(response.is_error);
            assert!(response.text_content().starts_with("Invalid address."));
            assert_eq!(mock.request_count(), 0);
        }

        #[tokio::test]
        async fn upstream_failure_names_operation() {
            let mock = MockTransport::new()
                .on_get_error(format!("accounts/{BOB}"), ApiError::network("timeout"));
            let (context, _) = unsigned(mock);
            let response = GetBalanceTool(context)
                .call(AddressArgs { address: BOB.into() })
                .await;
            assert!(response.is_error);
            assert!(response.text_content().starts_with("Failed to fetch balance: "));
        }
    }

    mod details {
        use super::*;

        #[tokio::test]
        async fn renders_json() {
            let (context, _) = unsigned(account_mock());
            let response = QueryAccountTool(context)
                .call(AddressArgs { address: BOB.into() })
                .await;
            let value = json_of(&response);
            assert_eq!(value["address"], BOB);
            assert_eq!(value["balance"], "1500000000000000000");
            assert_eq!(value["balanceFormatted"], "1.5 EGLD");
            assert_eq!(value["nonce"], 7);
            assert_eq!(value["shard"], 1);
        }
    }
}
