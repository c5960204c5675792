//! Layered error types for the client runtime.
//!
//! - [`ApiError`] - Top-level error returned by every client call
//! - [`FetchError`] - Failures classified by the request executor
//! - [`ValidationError`] - Schema validation failures with breadcrumbs
//! - [`ConfigError`] - Client and request configuration mistakes

mod api_error;
mod config_error;
mod fetch_error;
mod validation_error;

pub use api_error::{ApiError, ErrorKind};
pub use config_error::ConfigError;
pub use fetch_error::FetchError;
pub use validation_error::{ROOT_BREADCRUMB, ValidationError, ValidationIssue};
