//! Main HTTP Gateway Server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use kvforge_core::{CompressionParameters, ToolRegistry};
use kvforge_routing::PromptRouter;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, instrument, warn};

use crate::health_api;
use crate::mcp::{self, McpRequest, McpResponse, PARSE_ERROR};
use crate::tools::default_tools;

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub tools: Arc<ToolRegistry>,
    pub started_at: DateTime<Utc>,
}

impl GatewayState {
    /// State serving the standard tool set.
    pub fn new(defaults: CompressionParameters, router: PromptRouter) -> Self {
        Self {
            tools: Arc::new(default_tools(defaults, router)),
            started_at: Utc::now(),
        }
    }
}

pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(health_api::get_health))
        .route("/mcp", post(handle_mcp))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handler for `POST /mcp`. Malformed bodies still get an envelope.
pub async fn handle_mcp(
    State(state): State<GatewayState>,
    payload: Result<Json<McpRequest>, JsonRejection>,
) -> Json<McpResponse> {
    match payload {
        Ok(Json(request)) => Json(mcp::dispatch(&state.tools, request).await),
        Err(rejection) => {
            warn!(error = %rejection, "Rejected MCP request body");
            Json(McpResponse::failure(None, PARSE_ERROR, rejection.body_text()))
        }
    }
}

/// Starts the Axum HTTP server; returns after Ctrl-C.
#[instrument(skip(state))]
pub async fn start_server(addr: SocketAddr, state: GatewayState) -> Result<()> {
    let app = build_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Gateway HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
        .context("Gateway server error")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvforge_routing::ModelRegistry;
    use serde_json::json;

    fn state() -> GatewayState {
        GatewayState::new(
            CompressionParameters::default(),
            PromptRouter::new(ModelRegistry::with_defaults()),
        )
    }

    #[tokio::test]
    async fn health_reports_services() {
        let Json(report) = health_api::get_health(State(state())).await;
        assert_eq!(report.status, "healthy");
        assert_eq!(report.services, ["spectral", "fusion", "routing"]);
        assert!(report.uptime_seconds >= 0);

        let body = serde_json::to_value(&report).unwrap();
        assert_eq!(body["services"], json!(["spectral", "fusion", "routing"]));
    }

    #[tokio::test]
    async fn mcp_handler_wraps_dispatch() {
        let request: McpRequest =
            serde_json::from_value(json!({ "method": "tools/list", "id": "abc" })).unwrap();
        let Json(response) = handle_mcp(State(state()), Ok(Json(request))).await;
        assert_eq!(response.id, Some(json!("abc")));
        assert_eq!(response.result.unwrap()["tools"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn router_builds() {
        let _ = build_router(state());
    }
}
