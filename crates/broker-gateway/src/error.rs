//! Error types for the broker gateway.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Errors from the broker client.
#[derive(thiserror::Error, Debug)]
pub enum BrokerError {
    /// Caller input rejected before any network activity
    #[error("Validation error: {field}: {message}")]
    Validation {
        /// Offending input
        field: String,
        /// Validation error message
        message: String,
    },

    /// HTTP transport error (connection, DNS, TLS, timeout)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body was not the expected JSON
    #[error("Failed to decode broker response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Broker answered with a non-2xx status
    #[error("Broker returned status {status}: {body}")]
    Broker {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Broker response lacks a field its contract promises
    #[error("Broker response missing required field '{field}'")]
    Protocol {
        /// Missing field name
        field: &'static str,
    },
}

impl BrokerError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a broker status error.
    #[must_use]
    pub fn broker(status: u16, body: impl Into<String>) -> Self {
        Self::Broker {
            status,
            body: body.into(),
        }
    }

    /// Returns true if the failure was caused by the caller's input.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns true if the outbound call timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network(e) if e.is_timeout())
    }
}

/// Errors surfaced to HTTP callers.
///
/// Only validation detail reaches the client; everything else is a generic 500.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// Invalid or missing request parameters
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Upstream or internal failure, detail already logged
    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl From<BrokerError> for ApiError {
    fn from(e: BrokerError) -> Self {
        match e {
            BrokerError::Validation { field, message } => {
                Self::BadRequest(format!("{field}: {message}"))
            }
            other => {
                tracing::error!(
                    error = %other,
                    timeout = other.is_timeout(),
                    "Broker call failed"
                );
                Self::Internal("Broker request failed")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = Json(serde_json::json!({
            "error": code,
            "message": self.to_string()
        }));

        (status, body).into_response()
    }
}

/// Errors from the server lifecycle.
#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    /// Listening socket could not be bound
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Requested address
        addr: SocketAddr,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// I/O failure while serving
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// In-flight requests did not drain before the deadline
    #[error("Shutdown forced after {0:?}: in-flight requests did not drain")]
    ShutdownTimeout(Duration),
}

/// Result type alias for broker operations.
pub type BrokerResult<T> = Result<T, BrokerError>;

/// Result type alias for handler operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = BrokerError::validation("stateKey", "must not be empty");
        let err = ApiError::from(err);
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_broker_failures_hide_detail() {
        let err = BrokerError::broker(502, "upstream exploded: secret-detail");
        let err = ApiError::from(err);
        assert!(!err.to_string().contains("secret-detail"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let err = ApiError::from(BrokerError::Protocol {
            field: "merchant_id",
        });
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_broker_error_messages() {
        let err = BrokerError::broker(500, "oops");
        assert!(err.to_string().contains("500"));
        assert!(!err.is_validation());
        assert!(!err.is_timeout());

        let err = BrokerError::Protocol {
            field: "public_access_token",
        };
        assert!(err.to_string().contains("public_access_token"));
    }

    #[test]
    fn test_shutdown_timeout_message() {
        let err = ServerError::ShutdownTimeout(Duration::from_secs(5));
        assert!(err.to_string().contains("5s"));
    }
}
