//! Transaction status tracking.
//!
//! Every call maps the latest upstream snapshot onto four states. Nothing is
//! remembered between calls; `retry_after` is a hint for the caller.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::NetworkProvider;
use crate::whitelist::Whitelist;

/// Seconds to wait while a transaction is pending or not yet indexed.
pub const RETRY_PENDING_SECS: u64 = 5;

/// Seconds to wait on an unrecognised interim status.
pub const RETRY_INTERIM_SECS: u64 = 2;

/// Reduced transaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingStatus {
    /// Not final yet, or not visible yet.
    Pending,
    /// Executed successfully.
    Success,
    /// Executed and failed, or rejected.
    Failed,
    /// The status could not be determined.
    Unknown,
}

impl fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        })
    }
}

/// Result of tracking one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatus {
    /// Reduced state.
    pub status: TrackingStatus,
    /// Human-readable explanation.
    pub details: String,
    /// Suggested delay before polling again, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
    /// Whether the transaction receiver is whitelisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trusted: Option<bool>,
}

impl OrderStatus {
    fn new(status: TrackingStatus, details: impl Into<String>, retry_after: Option<u64>) -> Self {
        Self {
            status,
            details: details.into(),
            retry_after,
            trusted: None,
        }
    }

    /// Status of a transaction the API does not know yet.
    #[must_use]
    pub fn propagation_delay() -> Self {
        Self::new(
            TrackingStatus::Pending,
            "Transaction not yet indexed by API (Propagation Delay).",
            Some(RETRY_PENDING_SECS),
        )
    }

    /// Status when no hash was given.
    #[must_use]
    pub fn no_hash() -> Self {
        Self::new(TrackingStatus::Unknown, "No hash provided", None)
    }

    /// Status when the upstream failed for any reason other than "not found".
    #[must_use]
    pub fn api_error(message: impl fmt::Display) -> Self {
        Self::new(TrackingStatus::Unknown, format!("API Error: {message}"), None)
    }
}

/// Map an upstream status string onto [`OrderStatus`].
///
/// `failure` is the first operation's message of a failed transaction.
#[must_use]
pub fn map_status(raw: &str, failure: Option<&str>) -> OrderStatus {
    match raw {
        "pending" | "reward-reverted" => OrderStatus::new(
            TrackingStatus::Pending,
            "Transaction is broadcasting or processing.",
            Some(RETRY_PENDING_SECS),
        ),
        "success" => OrderStatus::new(
            TrackingStatus::Success,
            "Transaction processed successfully on-chain.",
            None,
        ),
        "fail" | "invalid" => OrderStatus::new(
            TrackingStatus::Failed,
            format!(
                "Transaction failed. Error: {}",
                failure.filter(|m| !m.is_empty()).unwrap_or(raw)
            ),
            None,
        ),
        other => OrderStatus::new(
            TrackingStatus::Pending,
            format!("Current status: {other}"),
            Some(RETRY_INTERIM_SECS),
        ),
    }
}

/// Track `hash` against the API.
pub async fn track(provider: &NetworkProvider, hash: &str) -> OrderStatus {
    track_inner(provider, hash, None).await
}

/// Track `hash` and flag whether its receiver is whitelisted.
pub async fn track_verified(
    provider: &NetworkProvider,
    whitelist: &Whitelist,
    hash: &str,
) -> OrderStatus {
    track_inner(provider, hash, Some(whitelist)).await
}

async fn track_inner(
    provider: &NetworkProvider,
    hash: &str,
    whitelist: Option<&Whitelist>,
) -> OrderStatus {
    let hash = hash.trim();
    if hash.is_empty() {
        return OrderStatus::no_hash();
    }

    match provider.get_transaction(hash).await {
        Ok(tx) => {
            let mut status = map_status(&tx.status, tx.failure_message());
            if let Some(whitelist) = whitelist {
                status.trusted = Some(
                    tx.receiver
                        .as_deref()
                        .is_some_and(|receiver| whitelist.contains(receiver)),
                );
            }
            debug!(tx_hash = %hash, upstream = %tx.status, status = %status.status, "tracked transaction");
            status
        }
        Err(e) if e.is_not_found() => {
            debug!(tx_hash = %hash, "transaction not indexed yet");
            OrderStatus::propagation_delay()
        }
        Err(e) => OrderStatus::api_error(e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::api::MockTransport;
    use crate::error::ApiError;
    use serde_json::json;
    use std::sync::Arc;

    const XOXNO: &str = "erd1qqqqqqqqqqqqqpgq6wegs2xkypfpync8mn2sa5cmpqjlvrhwz5nqgepyg8";

    mod mapping {
        use super::*;

        #[test]
        fn table() {
            let pending = map_status("pending", None);
            assert_eq!(pending.status, TrackingStatus::Pending);
            assert_eq!(pending.retry_after, Some(5));

            assert_eq!(map_status("reward-reverted", None).retry_after, Some(5));

            let success = map_status("success", None);
            assert_eq!(success.status, TrackingStatus::Success);
            assert!(success.retry_after.is_none());

            let failed = map_status("fail", Some("insufficient funds"));
            assert_eq!(failed.status, TrackingStatus::Failed);
            assert_eq!(failed.details, "Transaction failed. Error: insufficient funds");

            let invalid = map_status("invalid", None);
            assert_eq!(invalid.details, "Transaction failed. Error: invalid");
        }

        #[test]
        fn unrecognised_status_is_pending() {
            for raw in ["received", "executed", "", "SUCCESS"] {
                let status = map_status(raw, None);
                assert_eq!(status.status, TrackingStatus::Pending);
                assert_eq!(status.retry_after, Some(2));
                assert_eq!(status.details, format!("Current status: {raw}"));
            }
        }

        #[test]
        fn serialization_omits_empty_fields() {
            let value = serde_json::to_value(map_status("success", None)).unwrap();
            assert_eq!(value["status"], "success");
            assert!(value.get("retry_after").is_none());
            assert!(value.get("trusted").is_none());
        }
    }

    mod live {
        use super::*;

        fn provider(mock: MockTransport) -> NetworkProvider {
            NetworkProvider::new(Arc::new(mock))
        }

        #[tokio::test]
        async fn not_found_is_propagation_delay() {
            let status = track(&provider(MockTransport::new()), "abc").await;
            assert_eq!(status.status, TrackingStatus::Pending);
            assert_eq!(status.retry_after, Some(5));
            assert!(status.details.contains("Propagation Delay"));
        }

        #[tokio::test]
        async fn empty_hash_is_unknown() {
            let mock = Arc::new(MockTransport::new());
            let status = track(&NetworkProvider::new(mock.clone()), "  ").await;
            assert_eq!(status, OrderStatus::no_hash());
            assert_eq!(mock.request_count(), 0);
        }

        #[tokio::test]
        async fn other_errors_are_unknown() {
            let mock = MockTransport::new()
                .on_get_error("transactions/abc", ApiError::status(500, "internal"));
            let status = track(&provider(mock), "abc").await;
            assert_eq!(status.status, TrackingStatus::Unknown);
            assert_eq!(status.details, "API Error: HTTP 500: internal");
        }

        #[tokio::test]
        async fn failed_uses_operation_message() {
            let mock = MockTransport::new().on_get(
                "transactions/abc",
                json!({ "txHash": "abc", "status": "fail", "operations": [{ "message": "out of gas" }] }),
            );
            let status = track(&provider(mock), "abc").await;
            assert_eq!(status.details, "Transaction failed. Error: out of gas");
        }

        #[tokio::test]
        async fn verified_flags_receiver() {
            let mock = MockTransport::new()
                .on_get(
                    "transactions/abc",
                    json!({ "txHash": "abc", "status": "success", "receiver": XOXNO }),
                )
                .on_get(
                    "transactions/def",
                    json!({ "txHash": "def", "status": "success", "receiver": "erd1other" }),
                );
            let provider = provider(mock);
            let whitelist = Whitelist::from_entries([XOXNO]);

            let trusted = track_verified(&provider, &whitelist, "abc").await;
            assert_eq!(trusted.trusted, Some(true));

            let untrusted = track_verified(&provider, &whitelist, "def").await;
            assert_eq!(untrusted.trusted, Some(false));

            let plain = track(&provider, "abc").await;
            assert!(plain.trusted.is_none());
        }
    }
}
