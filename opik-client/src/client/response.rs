use reqwest::header::HeaderMap;

use crate::error::ApiError;

/// Outcome of one client call.
///
/// Every failure is returned, never raised. Callers who prefer `?` use
/// [`into_result`](Self::into_result); callers who prefer to panic use
/// [`unwrap`](Self::unwrap).
///
/// ## Examples
///
/// ```rust
/// use opik_client::client::ApiResponse;
/// use opik_client::error::{ApiError, ErrorKind, FetchError};
///
/// let failed: ApiResponse<String> = ApiResponse::Err(ApiError::from(FetchError::Cancelled));
/// assert!(!failed.is_ok());
/// assert_eq!(failed.error().map(ApiError::kind), Some(ErrorKind::CancelledError));
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub enum ApiResponse<T> {
    Ok {
        body: T,
        status: u16,
        headers: HeaderMap,
    },
    Err(ApiError),
}

impl<T> ApiResponse<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    pub fn is_err(&self) -> bool {
        !self.is_ok()
    }

    /// The typed body, on success.
    pub fn body(&self) -> Option<&T> {
        match self {
            Self::Ok { body, .. } => Some(body),
            Self::Err(_) => None,
        }
    }

    /// The classified failure, on error.
    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Self::Ok { .. } => None,
            Self::Err(err) => Some(err),
        }
    }

    /// Response headers, on success.
    pub fn headers(&self) -> Option<&HeaderMap> {
        match self {
            Self::Ok { headers, .. } => Some(headers),
            Self::Err(_) => None,
        }
    }

    /// Response status, on success.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Ok { status, .. } => Some(*status),
            Self::Err(_) => None,
        }
    }

    pub fn into_result(self) -> Result<T, ApiError> {
        match self {
            Self::Ok { body, .. } => Ok(body),
            Self::Err(err) => Err(err),
        }
    }

    /// Transforms the body, keeping status and headers.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        match self {
            Self::Ok {
                body,
                status,
                headers,
            } => ApiResponse::Ok {
                body: f(body),
                status,
                headers,
            },
            Self::Err(err) => ApiResponse::Err(err),
        }
    }

    /// Returns the body.
    ///
    /// ## Panics
    ///
    /// Panics with the error kind and detail if the call failed.
    #[track_caller]
    pub fn unwrap(self) -> T {
        match self {
            Self::Ok { body, .. } => body,
            Self::Err(err) => panic!("{}: {err}", err.kind()),
        }
    }
}

impl<T> From<ApiResponse<T>> for Result<T, ApiError> {
    fn from(response: ApiResponse<T>) -> Self {
        response.into_result()
    }
}
