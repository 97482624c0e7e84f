//! Unified error types for mvxkit.
//!
//! This module provides the error hierarchy shared by every component:
//! - [`Error`] for builders, normalizers and flows
//! - [`ApiError`] for the upstream REST boundary, with a transport-neutral
//!   "not found" classification
//! - [`ToolError`] for the dispatcher boundary

use crate::wallet::WalletError;

/// Result type alias for mvxkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for mvxkit.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Bad caller input: malformed address, out-of-range number, missing field.
    #[error("{0}")]
    Validation(String),

    /// Missing or inconsistent configuration (wallet path, marketplace ABI).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Upstream API failure, including "not found".
    #[error(transparent)]
    Upstream(#[from] ApiError),

    /// The inner signature does not verify against the bytes being relayed.
    #[error("Signature verification failed: {0}")]
    SignatureVerification(String),

    /// Pre-broadcast simulation did not succeed.
    #[error("Simulation failed: {0}")]
    SimulationFailed(String),

    /// Wallet loading or signing error.
    #[error(transparent)]
    Wallet(#[from] WalletError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A batch broadcast failed after some transactions went out.
    #[error("{source} ({} already sent)", .sent.len())]
    BatchPartial {
        /// Hashes of the transactions broadcast before the failure.
        sent: Vec<String>,
        /// The failure that stopped the batch.
        source: Box<Error>,
    },
}

impl Error {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a signature verification error.
    #[must_use]
    pub fn signature(msg: impl Into<String>) -> Self {
        Self::SignatureVerification(msg.into())
    }

    /// Create a simulation failure.
    #[must_use]
    pub fn simulation(msg: impl Into<String>) -> Self {
        Self::SimulationFailed(msg.into())
    }

    /// Wrap `source` with the hashes already broadcast, unless there are none.
    #[must_use]
    pub fn after_sent(source: Self, sent: Vec<String>) -> Self {
        if sent.is_empty() {
            source
        } else {
            Self::BatchPartial { sent, source: Box::new(source) }
        }
    }

    /// Whether this error is the upstream "not found" condition.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Upstream(ApiError::NotFound { .. }))
    }
}

/// Error type for the upstream REST API.
///
/// Every transport classifies failures the same way, so callers can treat
/// [`ApiError::NotFound`] as "not yet visible" without sniffing status codes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// The resource does not exist (yet).
    #[error("Not found: {path}")]
    NotFound {
        /// Request path that returned 404.
        path: String,
    },

    /// Any non-success HTTP status other than 404.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// Connection, timeout or TLS failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The response could not be decoded into the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a status error.
    #[must_use]
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Create a network error.
    #[must_use]
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a decode error.
    #[must_use]
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Whether the upstream reported the resource as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Error type for tool dispatch.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ToolError {
    /// Error during tool execution, already phrased for the caller.
    #[error("{0}")]
    Execution(String),

    /// Arguments did not match the tool's input schema.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// No tool registered under this name.
    #[error("Unknown tool: {0}")]
    NotFound(String),
}

impl ToolError {
    /// Create an execution error.
    #[must_use]
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Create an invalid arguments error.
    #[must_use]
    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Prefix an error with the operation that failed.
    #[must_use]
    pub fn failed(operation: &str, cause: impl std::fmt::Display) -> Self {
        Self::Execution(format!("{operation}: {cause}"))
    }
}

impl From<Error> for ToolError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(msg) => Self::InvalidArguments(msg),
            other => Self::Execution(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidArguments(err.to_string())
    }
}
