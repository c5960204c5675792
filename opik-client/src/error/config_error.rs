//! Client and request configuration errors.

use thiserror::Error;

/// Errors in client or request configuration.
///
/// These indicate programmer errors: a malformed base URL, a header that
/// cannot be sent, or a path template left with an unfilled parameter.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Header name is not a valid HTTP token.
    #[error("Invalid header name: {name}")]
    InvalidHeaderName {
        /// The rejected header name.
        name: String,
    },

    /// Header value contains characters HTTP does not allow.
    #[error("Invalid value for header {name}")]
    InvalidHeaderValue {
        /// The header whose value was rejected.
        name: String,
    },

    /// A `{param}` placeholder in the path template has no value.
    #[error("Missing path parameter {param} for {path}")]
    MissingPathParam {
        /// The unfilled parameter name.
        param: String,
        /// The path template.
        path: String,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

impl ConfigError {
    /// Creates a missing path parameter error.
    pub fn missing_path_param(param: impl Into<String>, path: impl Into<String>) -> Self {
        Self::MissingPathParam {
            param: param.into(),
            path: path.into(),
        }
    }
}
