//! API error types and response handling.
//!
//! This module provides a unified error type for all API handlers
//! with automatic conversion to appropriate HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type.
///
/// Each variant maps to a specific HTTP status code and produces a
/// consistent JSON error response.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// 400 Bad Request - Invalid input from client.
    BadRequest {
        /// Machine-readable error code.
        error_code: String,
        /// Human-readable error message.
        message: String,
    },

    /// 404 Not Found - Resource does not exist.
    NotFound {
        /// Machine-readable error code.
        error_code: String,
        /// Human-readable error message.
        message: String,
    },

    /// 422 Unprocessable Entity - Well-formed request the config rejects.
    Unprocessable {
        /// Machine-readable error code.
        error_code: String,
        /// Human-readable error message.
        message: String,
    },

    /// 500 Internal Server Error - Unexpected server-side error.
    InternalError {
        /// Machine-readable error code.
        error_code: String,
        /// Human-readable error message.
        message: String,
        /// Optional details.
        details: Option<String>,
    },
}

/// Standard JSON error response body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "invalid_mac_address",
    "message": "MAC address must be in format XX:XX:XX:XX:XX:XX",
    "details": null
}))]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "device_not_found").
    #[schema(example = "invalid_mac_address")]
    pub error: String,

    /// Human-readable error message.
    #[schema(example = "MAC address must be in format XX:XX:XX:XX:XX:XX")]
    pub message: String,

    /// Optional additional details for debugging.
    #[schema(nullable)]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            Self::BadRequest { error_code, message } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: error_code,
                    message,
                    details: None,
                },
            ),

            Self::NotFound { error_code, message } => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: error_code,
                    message,
                    details: None,
                },
            ),

            Self::Unprocessable { error_code, message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse {
                    error: error_code,
                    message,
                    details: None,
                },
            ),

            Self::InternalError {
                error_code,
                message,
                details,
            } => {
                tracing::error!(
                    error_code = %error_code,
                    message = %message,
                    details = ?details,
                    "Internal server error"
                );

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: error_code,
                        message,
                        details: details.map(|d| serde_json::json!(d)),
                    },
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest { message, .. } => write!(f, "Bad Request: {message}"),
            Self::NotFound { message, .. } => write!(f, "Not Found: {message}"),
            Self::Unprocessable { message, .. } => write!(f, "Unprocessable: {message}"),
            Self::InternalError { message, .. } => write!(f, "Internal Error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Malformed MAC address in a path or body.
    pub fn invalid_mac(mac: &str) -> Self {
        Self::BadRequest {
            error_code: "invalid_mac_address".to_string(),
            message: format!("'{mac}' is not in format XX:XX:XX:XX:XX:XX"),
        }
    }
}

/// Convert from airtrack_core errors.
impl From<airtrack_core::TrackerError> for ApiError {
    fn from(err: airtrack_core::TrackerError) -> Self {
        use airtrack_core::TrackerError;

        match &err {
            TrackerError::InvalidMacAddress(mac) => Self::invalid_mac(mac),
            TrackerError::ConfigValidationError(_) | TrackerError::ConfigParseError(_) => {
                Self::Unprocessable {
                    error_code: err.error_code().to_lowercase(),
                    message: err.to_string(),
                }
            }
            TrackerError::ConfigNotFound(_) => Self::NotFound {
                error_code: err.error_code().to_lowercase(),
                message: err.to_string(),
            },
            TrackerError::ReportUnreadable { .. }
            | TrackerError::PersistenceError(_)
            | TrackerError::IoError(_) => Self::InternalError {
                error_code: err.error_code().to_lowercase(),
                message: err.to_string(),
                details: None,
            },
        }
    }
}

impl From<airtrack_core::ConfigError> for ApiError {
    fn from(err: airtrack_core::ConfigError) -> Self {
        Self::from(airtrack_core::TrackerError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_error() {
        let err = ApiError::BadRequest {
            error_code: "test_error".to_string(),
            message: "Test message".to_string(),
        };
        assert!(err.to_string().contains("Bad Request"));
    }

    #[test]
    fn test_error_response_serialization() {
        let response = ErrorResponse {
            error: "test_error".to_string(),
            message: "Test message".to_string(),
            details: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("test_error"));
    }

    #[test]
    fn test_validation_error_maps_to_unprocessable() {
        let err = ApiError::from(airtrack_core::TrackerError::ConfigValidationError(
            "presence.recency_window_secs: must be between 1 and 86400".into(),
        ));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_invalid_mac_maps_to_bad_request() {
        let err = ApiError::from(airtrack_core::TrackerError::InvalidMacAddress("zz".into()));
        assert!(matches!(err, ApiError::BadRequest { .. }));
    }
}
