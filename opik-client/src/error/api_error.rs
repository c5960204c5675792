//! Top-level API error type.

use strum::{Display, EnumIter};
use thiserror::Error;

use super::{ConfigError, FetchError, ValidationError};

/// The closed set of failure kinds a client call can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ErrorKind {
    /// Response received with a non-success status.
    StatusCodeError,
    /// Response body could not be parsed as JSON.
    #[strum(serialize = "NonJSONError")]
    NonJsonError,
    /// Deadline elapsed before a response arrived.
    TimeoutError,
    /// The cancellation token fired before completion.
    CancelledError,
    /// Body received but rejected by the schema engine.
    ValidationError,
    /// Transport-level failure not otherwise classified.
    UnknownError,
}

/// Top-level error type for all client calls.
///
/// Aggregates executor failures and schema validation failures while keeping
/// the ability to match on each layer.
///
/// ## Examples
///
/// ```rust,ignore
/// use opik_client::error::{ApiError, ErrorKind};
///
/// fn handle_error(err: ApiError) {
///     match err.kind() {
///         ErrorKind::StatusCodeError => eprintln!("server said no: {err}"),
///         ErrorKind::ValidationError => eprintln!("unexpected payload: {err}"),
///         kind => eprintln!("{kind}: {err}"),
///     }
/// }
/// ```
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Failures classified by the request executor.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The response (or request) body failed schema validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Configuration problems surface as [`ErrorKind::UnknownError`].
impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        Self::Fetch(FetchError::from(err))
    }
}

impl ApiError {
    /// Returns the classified kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Fetch(FetchError::StatusCode { .. }) => ErrorKind::StatusCodeError,
            Self::Fetch(FetchError::NonJson { .. }) => ErrorKind::NonJsonError,
            Self::Fetch(FetchError::Timeout { .. }) => ErrorKind::TimeoutError,
            Self::Fetch(FetchError::Cancelled) => ErrorKind::CancelledError,
            Self::Fetch(FetchError::Unknown { .. }) => ErrorKind::UnknownError,
            Self::Validation(_) => ErrorKind::ValidationError,
        }
    }

    /// Returns the HTTP status code if a response was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Fetch(e) => e.status_code(),
            Self::Validation(_) => None,
        }
    }

    /// Returns the validation error, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Fetch(_) => None,
        }
    }
}
