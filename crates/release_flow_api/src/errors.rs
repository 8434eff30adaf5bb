//! Error handling and HTTP error conversion
//!
//! Domain errors from `release_flow_core` are converted to HTTP responses at the HTTP
//! boundary. Internal failures are reported with a generic message so that storage
//! and GitHub details never reach the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use release_flow_core::{ErrorKind, ReleaseFlowError, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Standard error response for all API errors.
///
/// All error responses follow this consistent structure to provide
/// machine-readable error codes and human-readable messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorDetails,
}

/// Error details structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Additional context (optional, type varies by error)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Axum response wrapper for API errors
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(State(state): State<AppState>) -> Result<Json<ConfigurationResponse>, ApiError> {
///     let configuration = state.configurations.get(&id).await?; // Converts ReleaseFlowError
///     Ok(Json(configuration.into()))
/// }
/// ```
#[derive(Debug, Error)]
pub enum ApiError {
    /// An error returned by the release flow
    #[error(transparent)]
    Domain(#[from] ReleaseFlowError),

    /// Malformed request detected by the HTTP layer, such as a missing header
    #[error("Field '{field}' is invalid: {message}")]
    Validation { field: String, message: String },

    /// Failure inside the HTTP layer itself
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Create a validation error with field information
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Domain(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = convert_error(&self);

        log_error(&self, status);

        (status, Json(error_response)).into_response()
    }
}

/// Convert an API error to an HTTP status code and error response
pub(crate) fn convert_error(error: &ApiError) -> (StatusCode, ErrorResponse) {
    let (status, code, message, details) = match error {
        ApiError::Domain(domain) => convert_domain_error(domain),
        ApiError::Validation { field, message } => (
            StatusCode::BAD_REQUEST,
            "ValidationError",
            error.to_string(),
            Some(json!({ "field": field, "reason": message })),
        ),
        ApiError::Internal(_) => internal_error(),
    };

    (
        status,
        ErrorResponse {
            error: ErrorDetails {
                code: code.to_string(),
                message,
                details,
            },
        },
    )
}

fn convert_domain_error(
    error: &ReleaseFlowError,
) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
    match (error.kind(), error) {
        (ErrorKind::BadRequest, ReleaseFlowError::Validation(validation)) => (
            StatusCode::BAD_REQUEST,
            "ValidationError",
            error.to_string(),
            Some(json!({ "field": validation_field(validation) })),
        ),
        (ErrorKind::BadRequest, _) => (
            StatusCode::BAD_REQUEST,
            "BadRequest",
            error.to_string(),
            None,
        ),
        (ErrorKind::NotFound, ReleaseFlowError::NotFound { resource, id }) => (
            StatusCode::NOT_FOUND,
            "NotFound",
            error.to_string(),
            Some(json!({ "resource": resource, "id": id })),
        ),
        (ErrorKind::NotFound, _) => (StatusCode::NOT_FOUND, "NotFound", error.to_string(), None),
        (ErrorKind::Conflict, _) => (StatusCode::CONFLICT, "Conflict", error.to_string(), None),
        (
            ErrorKind::QualityGateIncomplete,
            ReleaseFlowError::QualityGateIncomplete { sha, missing },
        ) => (
            StatusCode::PARTIAL_CONTENT,
            "QualityGateIncomplete",
            error.to_string(),
            Some(json!({ "sha": sha, "missingChecks": missing })),
        ),
        (ErrorKind::QualityGateIncomplete, _) => (
            StatusCode::PARTIAL_CONTENT,
            "QualityGateIncomplete",
            error.to_string(),
            None,
        ),
        (ErrorKind::Internal, _) => internal_error(),
    }
}

fn internal_error() -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "InternalError",
        "An internal error occurred".to_string(),
        None,
    )
}

fn validation_field(error: &ValidationError) -> &str {
    match error {
        ValidationError::EmptyField { field }
        | ValidationError::InvalidFormat { field, .. }
        | ValidationError::Unsupported { field, .. } => field,
    }
}

/// Log error with appropriate level based on HTTP status.
///
/// Duplicate deliveries and an incomplete quality gate happen all the time and are
/// logged at debug level.
fn log_error(error: &ApiError, status: StatusCode) {
    if let ApiError::Domain(domain) = error {
        if domain.is_expected() {
            tracing::debug!(status = %status, error = %error, "Expected outcome");
            return;
        }
    }

    match status {
        StatusCode::INTERNAL_SERVER_ERROR | StatusCode::BAD_GATEWAY => {
            tracing::error!("API error: {} - {}", status, error);
        }
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => {
            tracing::warn!("API error: {} - {}", status, error);
        }
        _ => {
            tracing::info!("API error: {} - {}", status, error);
        }
    }
}
