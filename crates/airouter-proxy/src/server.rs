//! Axum HTTP server for the routing proxy.
//!
//! This module provides the `serve()` function that runs the router
//! using a pre-bound TcpListener (from the supervisor).

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use reqwest::Client;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use airouter_core::{MatchKind, ModelRegistry, ModelResolver, RescanPort};

use crate::forward::forward_chat_completion;
use crate::models::{ErrorResponse, ModelsResponse, RoutedRequest};

/// Largest chat request body accepted (it is held in memory to read `model`).
const MAX_REQUEST_BODY: usize = 32 * 1024 * 1024;

/// Shared application state for the router.
#[derive(Debug, Clone)]
pub struct AppState {
    /// HTTP client for forwarding requests to backends (no timeout).
    client: Client,
    /// Registry read by the listing endpoint.
    registry: ModelRegistry,
    /// Resolves requested model ids to backends.
    resolver: ModelResolver,
}

impl AppState {
    /// Build state around a registry and the rescan trigger.
    pub fn new(registry: ModelRegistry, rescan: Arc<dyn RescanPort>) -> anyhow::Result<Self> {
        let client = Client::builder().pool_max_idle_per_host(10).build()?;
        let resolver = ModelResolver::new(registry.clone(), rescan);
        Ok(Self {
            client,
            registry,
            resolver,
        })
    }
}

/// Build the router's axum `Router`.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/models", get(list_models))
        .route("/v1/chat/completions", post(chat_completions))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY))
        .with_state(state)
}

/// Run the router with a pre-bound listener.
///
/// This function runs the Axum server until the cancellation token is triggered.
///
/// # Arguments
///
/// * `listener` - Pre-bound TCP listener (from supervisor)
/// * `registry` - Registry the discovery scheduler publishes into
/// * `rescan` - Trigger for on-demand scans after a lookup miss
/// * `cancel` - Cancellation token for graceful shutdown
pub async fn serve(
    listener: TcpListener,
    registry: ModelRegistry,
    rescan: Arc<dyn RescanPort>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!("Router starting on {addr}");

    let app = create_router(AppState::new(registry, rescan)?);

    info!("Point OpenAI clients at: http://{addr}/v1");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;

    info!("Router shut down");
    Ok(())
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok"
    }))
}

/// List every model in the current registry snapshot.
async fn list_models(State(state): State<AppState>) -> impl IntoResponse {
    debug!("GET /v1/models");
    Json(ModelsResponse::from_entries(state.registry.all_entries()))
}

/// Resolve the requested model and relay the request to its backend.
async fn chat_completions(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    debug!("POST /v1/chat/completions");

    let request = match RoutedRequest::from_body(&body) {
        Ok(req) => req,
        Err(e) => {
            warn!("Rejected chat request: {e}");
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse::from(e))).into_response();
        }
    };

    let resolved = match state.resolver.resolve(&request.model).await {
        Ok(resolved) => resolved,
        Err(e) => {
            warn!(model = %request.model, "{e}");
            return (StatusCode::NOT_FOUND, Json(ErrorResponse::from(e))).into_response();
        }
    };

    let upstream_url = format!("{}/v1/chat/completions", resolved.address.base_url());
    info!(
        model = %request.model,
        streaming = %request.stream,
        rescanned = matches!(resolved.kind, MatchKind::AfterRescan),
        upstream = %upstream_url,
        "Proxying chat completion"
    );

    forward_chat_completion(&state.client, method, &upstream_url, &headers, body).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let response = health_check().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
