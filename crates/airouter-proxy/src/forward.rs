//! Request forwarding to the resolved backend with streaming relay.
//!
//! The upstream response body is never collected: its byte stream becomes
//! the downstream body directly, so chunks reach the caller as they
//! arrive and hyper applies backpressure between the two connections.

use axum::{
    Json,
    body::Body,
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures_util::TryStreamExt;
use reqwest::Client;
use tracing::{debug, error, warn};

use crate::models::ErrorResponse;

/// Headers that should NOT be forwarded (hop-by-hop headers).
const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
    // Recomputed by the client/server on each hop
    "host",
    "content-length",
];

/// Check if a header should be forwarded.
fn should_forward_header(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    !HOP_BY_HOP_HEADERS.contains(&lower.as_str())
}

/// Copy end-to-end headers from `source` into a new map.
fn forwardable_headers(source: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(source.len());
    for (name, value) in source {
        if should_forward_header(name.as_str()) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}

/// Forward a chat completion request to a backend.
///
/// # Arguments
///
/// * `client` - HTTP client to use (must not carry a request timeout)
/// * `method` - Method of the inbound request
/// * `upstream_url` - Full URL of the backend endpoint
/// * `headers` - Inbound request headers
/// * `body` - Inbound request body
///
/// # Returns
///
/// The backend's status, headers and body relayed as they arrive, or a
/// 502 if the backend could not be reached.
pub async fn forward_chat_completion(
    client: &Client,
    method: Method,
    upstream_url: &str,
    headers: &HeaderMap,
    body: Bytes,
) -> Response {
    debug!(upstream = %upstream_url, "Forwarding request");

    let request = client
        .request(method, upstream_url)
        .headers(forwardable_headers(headers))
        .body(body);

    let response = match request.send().await {
        Ok(resp) => resp,
        Err(e) => {
            error!(upstream = %upstream_url, "Failed to reach backend: {e}");
            return (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse::upstream_error(&e.to_string())),
            )
                .into_response();
        }
    };

    relay_response(response, upstream_url.to_string())
}

/// Turn an upstream response into a streaming downstream response.
fn relay_response(response: reqwest::Response, upstream_url: String) -> Response {
    let status = response.status();
    let headers = forwardable_headers(response.headers());

    // A mid-stream error ends the downstream body early; nothing is replayed.
    let stream = response
        .bytes_stream()
        .inspect_err(move |e| warn!(upstream = %upstream_url, "Upstream stream failed: {e}"))
        .map_err(std::io::Error::other);

    let mut builder = Response::builder().status(status);
    if let Some(out) = builder.headers_mut() {
        out.extend(headers);
    }

    builder
        .body(Body::from_stream(stream))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_should_forward_header() {
        // Should forward
        assert!(should_forward_header("accept"));
        assert!(should_forward_header("content-type"));
        assert!(should_forward_header("authorization"));
        assert!(should_forward_header("x-custom-header"));

        // Should NOT forward
        assert!(!should_forward_header("connection"));
        assert!(!should_forward_header("Host"));
        assert!(!should_forward_header("Content-Length"));
        assert!(!should_forward_header("transfer-encoding"));
    }

    #[test]
    fn test_forwardable_headers_keeps_repeated_values() {
        let mut source = HeaderMap::new();
        source.append("x-tag", HeaderValue::from_static("a"));
        source.append("x-tag", HeaderValue::from_static("b"));
        source.insert("connection", HeaderValue::from_static("keep-alive"));

        let headers = forwardable_headers(&source);
        let tags: Vec<_> = headers.get_all("x-tag").iter().collect();

        assert_eq!(tags, vec!["a", "b"]);
        assert!(headers.get("connection").is_none());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_bad_gateway() {
        // Bind then drop to get a port with nothing listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = Client::new();
        let response = forward_chat_completion(
            &client,
            Method::POST,
            &format!("http://127.0.0.1:{port}/v1/chat/completions"),
            &HeaderMap::new(),
            Bytes::from_static(b"{}"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
