use tokio_util::sync::CancellationToken;

use super::{Transport, TransportError, TransportResponse};
use crate::error::ConfigError;
use crate::fetcher::RequestDescriptor;

/// [`Transport`] over a pooled `reqwest` client.
///
/// The per-attempt deadline is enforced by the executor, so the client is
/// built without a global timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds a transport with connection pooling.
    ///
    /// ## Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wraps an already configured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn round_trip(
        &self,
        request: &RequestDescriptor,
    ) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method().into(), request.url().clone())
            .headers(request.headers().clone());
        if let Some(body) = request.body() {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse, TransportError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(TransportError::Cancelled),
            result = self.round_trip(request) => result,
        }
    }
}
