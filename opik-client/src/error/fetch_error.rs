//! Request executor failures.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::method::HttpMethod;

/// A classified failure produced by the [`Fetcher`](crate::fetcher::Fetcher).
///
/// The executor never panics or returns anything outside this set for a
/// request it managed to describe; each variant carries enough detail to
/// diagnose the failure without re-sending the request.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The server answered with a non-success status code.
    #[error("HTTP {status}: {body}")]
    StatusCode {
        /// The HTTP status code returned.
        status: u16,
        /// The response body, parsed as JSON when possible, otherwise the raw text.
        body: Value,
    },

    /// A success response whose body is not valid JSON.
    #[error("non-JSON response body (HTTP {status}): {raw_body}")]
    NonJson {
        /// The HTTP status code returned.
        status: u16,
        /// The body exactly as received.
        raw_body: String,
    },

    /// No response arrived before the per-attempt deadline.
    #[error("{method} {path} timed out after {}ms", .budget.as_millis())]
    Timeout {
        /// The deadline that elapsed.
        budget: Duration,
        /// HTTP method of the request.
        method: HttpMethod,
        /// Path of the request URL.
        path: String,
    },

    /// The caller's cancellation token fired before completion.
    #[error("request cancelled")]
    Cancelled,

    /// Transport-level failure not otherwise classified.
    #[error("request failed: {message}")]
    Unknown {
        /// Message from the underlying failure.
        message: String,
    },
}

impl FetchError {
    /// Creates an unknown error from any displayable cause.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    /// Returns the wire-level reason tag for this failure.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::StatusCode { .. } => "status-code",
            Self::NonJson { .. } => "non-json",
            Self::Timeout { .. } => "timeout",
            Self::Cancelled => "cancelled",
            Self::Unknown { .. } => "unknown",
        }
    }

    /// Returns the HTTP status code if a response was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::StatusCode { status, .. } | Self::NonJson { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<super::ConfigError> for FetchError {
    fn from(err: super::ConfigError) -> Self {
        Self::unknown(format!("invalid request: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn status_code_extraction() {
        let err = FetchError::StatusCode {
            status: 404,
            body: serde_json::json!({"message": "not found"}),
        };
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.reason(), "status-code");

        assert_eq!(FetchError::Cancelled.status_code(), None);
    }

    #[test]
    fn timeout_display_names_the_request() {
        let err = FetchError::Timeout {
            budget: Duration::from_secs(1),
            method: HttpMethod::Get,
            path: "/v1/internal/usage/bi-traces".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "GET /v1/internal/usage/bi-traces timed out after 1000ms"
        );
    }

    #[test]
    fn config_error_becomes_unknown() {
        let err: FetchError = ConfigError::missing_path_param("itemId", "/items/{itemId}").into();
        assert_eq!(err.reason(), "unknown");
        assert!(err.to_string().contains("itemId"));
    }
}
