//! Error types for wallet operations.
//!
//! [`WalletError`] covers PEM parsing, key file access, key consistency and
//! signing failures. It integrates into the crate error via `Error::Wallet`.

/// Error type for wallet operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum WalletError {
    /// The PEM text is malformed.
    #[error("Invalid PEM: {0}")]
    Pem(String),

    /// The key file could not be read.
    #[error("Cannot read wallet file {path}: {message}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying I/O message.
        message: String,
    },

    /// The embedded public key does not belong to the secret key.
    #[error("Key mismatch: {0}")]
    KeyMismatch(String),

    /// Signing failed.
    #[error("Signing error: {0}")]
    Signing(String),
}

impl WalletError {
    /// Create a PEM error.
    #[must_use]
    pub fn pem(msg: impl Into<String>) -> Self {
        Self::Pem(msg.into())
    }

    /// Create an I/O error for `path`.
    #[must_use]
    pub fn io(path: impl Into<String>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Create a key mismatch error.
    #[must_use]
    pub fn key_mismatch(msg: impl Into<String>) -> Self {
        Self::KeyMismatch(msg.into())
    }

    /// Create a signing error.
    #[must_use]
    pub fn signing(msg: impl Into<String>) -> Self {
        Self::Signing(msg.into())
    }
}

impl From<WalletError> for crate::error::ToolError {
    fn from(e: WalletError) -> Self {
        Self::Execution(e.to_string())
    }
}
