//! HTTP surface of `mvxkit serve`.
//!
//! - `GET /health`
//! - `GET /feed.json`
//! - `GET /tools`
//! - `POST /tools/{name}`

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use mvxkit::feed::build_feed;
use mvxkit::tool::{ToolBox, ToolResponse};
use mvxkit::tools::ToolContext;
use mvxkit::ToolError;
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Service name reported by `/health`.
pub const SERVICE_NAME: &str = "mvxkit-http";

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    tools: Arc<ToolBox>,
    context: Arc<ToolContext>,
}

impl AppState {
    /// State over a toolbox and the context its tools share.
    #[must_use]
    pub const fn new(tools: Arc<ToolBox>, context: Arc<ToolContext>) -> Self {
        Self { tools, context }
    }
}

/// All routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/feed.json", get(feed))
        .route("/tools", get(list_tools))
        .route("/tools/{name}", post(call_tool))
        .with_state(state)
}

/// Serve until Ctrl+C.
pub async fn run(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, tools = state.tools.len(), "HTTP server starting");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": SERVICE_NAME }))
}

async fn feed(State(state): State<AppState>) -> Json<Value> {
    let items = build_feed(state.context.provider(), state.context.search_mode()).await;
    Json(json!({ "items": items }))
}

async fn list_tools(State(state): State<AppState>) -> Response {
    Json(state.tools.definitions()).into_response()
}

async fn call_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(args): Json<Value>,
) -> Response {
    match state.tools.call(&name, args).await {
        Ok(response) => Json(response).into_response(),
        Err(e @ ToolError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, Json(ToolResponse::from(e))).into_response()
        }
        Err(e) => (StatusCode::BAD_REQUEST, Json(ToolResponse::from(e))).into_response(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
