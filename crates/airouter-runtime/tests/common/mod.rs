//! Shared fake-backend helpers for airouter-runtime integration tests.

#![allow(dead_code)]

use std::time::Duration;

use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;

/// Host the fake backends bind to.
pub const TEST_HOST: &str = "127.0.0.1";

/// A fake OpenAI-style backend serving `ids`.
pub fn model_backend(ids: &[&str]) -> Router {
    let data: Vec<_> = ids
        .iter()
        .map(|id| serde_json::json!({ "id": id, "object": "model", "owned_by": "llamacpp" }))
        .collect();
    let listing = serde_json::json!({ "object": "list", "data": data });
    let name = ids.first().map(ToString::to_string).unwrap_or_default();

    Router::new()
        .route("/v1/models", get(move || async move { Json(listing) }))
        .route(
            "/v1/chat/completions",
            post(move || async move {
                Json(serde_json::json!({ "object": "chat.completion", "served_by": name }))
            }),
        )
}

/// Serve `app` on an already-bound listener.
pub fn serve_on(listener: TcpListener, app: Router) {
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
}

/// Serve `app` on an ephemeral port and return the port.
pub async fn spawn_backend(app: Router) -> u16 {
    let listener = TcpListener::bind((TEST_HOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    serve_on(listener, app);
    port
}

/// Two listeners on consecutive ports, so one small range covers both.
pub async fn adjacent_listeners() -> (TcpListener, TcpListener) {
    loop {
        let first = TcpListener::bind((TEST_HOST, 0)).await.unwrap();
        let port = first.local_addr().unwrap().port();
        if port == u16::MAX {
            continue;
        }
        if let Ok(second) = TcpListener::bind((TEST_HOST, port + 1)).await {
            return (first, second);
        }
    }
}

/// A port with nothing listening on it.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind((TEST_HOST, 0)).await.unwrap();
    listener.local_addr().unwrap().port()
}

pub const PROBE_TIMEOUT: Duration = Duration::from_millis(500);
