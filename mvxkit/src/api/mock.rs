//! Scripted transport for tests.
//!
//! Responses are registered per method and path. Several responses for the
//! same route are served in order and the last one repeats. Requests to an
//! unscripted route fail with [`ApiError::NotFound`], the same way the real
//! API reports unknown resources.
//!
//! ```rust,ignore
//! let transport = MockTransport::new()
//!     .on_get("accounts/erd1...", json!({"nonce": 5, "balance": "1"}))
//!     .on_post("transactions", json!({"txHash": "h1"}));
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use super::transport::{ApiTransport, Method};
use crate::error::ApiError;

/// A request seen by [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: Method,
    /// Request path.
    pub path: String,
    /// Query pairs, in the order given.
    pub query: Vec<(String, String)>,
    /// JSON body of a POST.
    pub body: Option<Value>,
}

impl RecordedRequest {
    /// First value of a query parameter.
    #[must_use]
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

type Scripted = Result<Value, ApiError>;

/// In-memory [`ApiTransport`] with scripted responses.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    /// An empty mock; every request fails with "not found".
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a GET response.
    #[must_use]
    pub fn on_get(self, path: impl Into<String>, response: Value) -> Self {
        self.script(Method::Get, path.into(), Ok(response))
    }

    /// Script a GET failure.
    #[must_use]
    pub fn on_get_error(self, path: impl Into<String>, error: ApiError) -> Self {
        self.script(Method::Get, path.into(), Err(error))
    }

    /// Script a POST response.
    #[must_use]
    pub fn on_post(self, path: impl Into<String>, response: Value) -> Self {
        self.script(Method::Post, path.into(), Ok(response))
    }

    /// Script a POST failure.
    #[must_use]
    pub fn on_post_error(self, path: impl Into<String>, error: ApiError) -> Self {
        self.script(Method::Post, path.into(), Err(error))
    }

    fn script(self, method: Method, path: String, response: Scripted) -> Self {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((method, path))
            .or_default()
            .push_back(response);
        self
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests received for one method and path.
    #[must_use]
    pub fn requests_to(&self, method: Method, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    /// Number of requests received.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn respond(&self, request: RecordedRequest) -> Scripted {
        let key = (request.method, request.path.clone());
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(queue) = routes.get_mut(&key) else {
            return Err(ApiError::not_found(key.1));
        };
        if queue.len() > 1 {
            queue
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::not_found(key.1.clone())))
        } else {
            queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err(ApiError::not_found(key.1.clone())))
        }
    }
}

#[async_trait]
impl ApiTransport for MockTransport {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        self.respond(RecordedRequest {
            method: Method::Get,
            path: path.to_owned(),
            query: query
                .iter()
                .map(|(k, v)| ((*k).to_owned(), v.clone()))
                .collect(),
            body: None,
        })
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.respond(RecordedRequest {
            method: Method::Post,
            path: path.to_owned(),
            query: Vec::new(),
            body: Some(body.clone()),
        })
    }
}
