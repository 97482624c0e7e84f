//! Transport abstraction over the MultiversX REST API.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiError;

/// HTTP method of a recorded or scripted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
        })
    }
}

/// A JSON-over-HTTP transport.
///
/// Paths are relative to the API base URL and carry no leading slash
/// (`accounts/erd1...`). Implementations must report a missing resource as
/// [`ApiError::NotFound`] so callers never inspect status codes themselves.
#[async_trait]
pub trait ApiTransport: Send + Sync + fmt::Debug {
    /// `GET path?query`.
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError>;

    /// `POST path` with a JSON body.
    async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError>;
}
