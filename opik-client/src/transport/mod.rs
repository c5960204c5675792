//! The network capability the request executor is polymorphic over.
//!
//! A [`Transport`] sends one attempt of a [`RequestDescriptor`] and reports
//! either a raw response or a transport-level failure. Status codes, JSON and
//! retries are the executor's concern, not the transport's.

mod http;
mod replay;

use std::future::Future;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub use http::HttpTransport;
pub use replay::{RecordedRequest, Reply, ReplayTransport};

use crate::fetcher::RequestDescriptor;

/// A response as received, before any classification.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }
}

/// A failure before any response was received.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The connection could not be established or was reset.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The transport's own deadline elapsed.
    #[error("transport timed out")]
    Timeout,

    /// The cancellation token fired while the attempt was in flight.
    #[error("transport cancelled")]
    Cancelled,

    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else {
            Self::Other(err.to_string())
        }
    }
}

/// Sends a single attempt of a request.
///
/// Implementations should stop work and return [`TransportError::Cancelled`]
/// once `cancel` fires. The executor may also drop the returned future when
/// its own deadline elapses.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}
