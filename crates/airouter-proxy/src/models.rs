//! OpenAI API data models for request/response handling.
//!
//! The router only inspects the `model` field of a chat request; the rest
//! of the body is forwarded untouched, so no full request type lives here.

use airouter_core::{ModelEntry, ResolveError};
use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Chat Completion Request
// =============================================================================

/// The parts of a chat completion request the router needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedRequest {
    /// Requested model id.
    pub model: String,
    /// Whether the caller asked for a streamed response (logging only).
    pub stream: bool,
}

/// Request validation failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Invalid JSON body")]
    InvalidJson,

    #[error("Missing 'model' field")]
    MissingModel,
}

impl RoutedRequest {
    /// Pull the routing fields out of a raw request body.
    ///
    /// The body must be a JSON object with a non-empty string `model`.
    pub fn from_body(body: &[u8]) -> Result<Self, RequestError> {
        let value: serde_json::Value =
            serde_json::from_slice(body).map_err(|_| RequestError::InvalidJson)?;

        let model = value
            .get("model")
            .and_then(serde_json::Value::as_str)
            .filter(|m| !m.is_empty())
            .ok_or(RequestError::MissingModel)?;

        let stream = value
            .get("stream")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);

        Ok(Self {
            model: model.to_string(),
            stream,
        })
    }
}

// =============================================================================
// Models Endpoint Types
// =============================================================================

/// Response from /v1/models endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ModelsResponse {
    pub object: String,
    pub data: Vec<ModelInfo>,
}

impl ModelsResponse {
    /// Build the listing from registry entries.
    pub fn from_entries(entries: Vec<ModelEntry>) -> Self {
        Self {
            object: "list".to_string(),
            data: entries.into_iter().map(ModelInfo::from).collect(),
        }
    }
}

/// Information about a single model (OpenAI format).
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub object: String,
    pub owned_by: String,
    pub permission: Vec<serde_json::Value>,
}

impl From<ModelEntry> for ModelInfo {
    fn from(entry: ModelEntry) -> Self {
        Self {
            id: entry.model_id,
            object: "model".to_string(),
            owned_by: "system".to_string(),
            permission: Vec::new(),
        }
    }
}

// =============================================================================
// Error Response Types
// =============================================================================

/// Error response matching OpenAI format.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail within an error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Known model ids, present on model-not-found errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<Vec<String>>,
}

impl ErrorResponse {
    /// Create an error response with a code.
    pub fn with_code(
        message: impl Into<String>,
        error_type: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                r#type: error_type.into(),
                code: Some(code.into()),
                available: None,
            },
        }
    }

    /// Create an error response for model not found, listing known ids.
    pub fn model_not_found(model: &str, available: Vec<String>) -> Self {
        let mut response = Self::with_code(
            format!("Model '{model}' not found. Available: {available:?}"),
            "invalid_request_error",
            "model_not_found",
        );
        response.error.available = Some(available);
        response
    }

    /// Create an error response for upstream connection failure.
    pub fn upstream_error(reason: &str) -> Self {
        Self::with_code(
            format!("Failed to connect to model server: {reason}"),
            "server_error",
            "upstream_error",
        )
    }
}

impl From<RequestError> for ErrorResponse {
    fn from(err: RequestError) -> Self {
        let code = match err {
            RequestError::InvalidJson => "invalid_json",
            RequestError::MissingModel => "missing_model",
        };
        Self::with_code(err.to_string(), "invalid_request_error", code)
    }
}

impl From<ResolveError> for ErrorResponse {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound { model, available } => {
                Self::model_not_found(&model, available)
            }
        }
    }
}
