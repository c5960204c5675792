//! The client every endpoint method delegates to.

use reqwest::header::{AUTHORIZATION, USER_AGENT as USER_AGENT_HEADER};
use tracing::{Span, debug, instrument};

use super::endpoint::{Endpoint, EndpointCall};
use super::response::ApiResponse;
use crate::config::{ClientOptions, RequestOptions, ResolvedOptions};
use crate::error::{ApiError, ConfigError, FetchError};
use crate::fetcher::{Fetcher, RequestDescriptor, RetryPolicy};
use crate::schema::{Context, SchemaObject};
use crate::transport::{HttpTransport, Transport};

/// Header carrying the workspace name.
pub const WORKSPACE_HEADER: &str = "Comet-Workspace";

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!("opik-client-rust/", env!("CARGO_PKG_VERSION"));

/// Breadcrumb root for request bodies.
pub const REQUEST_BREADCRUMB: &str = "request";

/// Breadcrumb root for response bodies.
pub const RESPONSE_BREADCRUMB: &str = "response";

/// Async client for the Opik REST API.
///
/// Each call resolves configuration, builds a [`RequestDescriptor`], runs it
/// through the [`Fetcher`] and validates the response against the endpoint's
/// schema. Calls share nothing mutable, so one client can serve many
/// concurrent calls.
///
/// ## Examples
///
/// ```rust,no_run
/// use opik_client::{ClientOptions, OpikClient, RequestOptions};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let client = OpikClient::new(ClientOptions::from_env())?;
/// let usage = client
///     .system_usage()
///     .get_bi_traces(&RequestOptions::new().timeout_in_seconds(5))
///     .await
///     .into_result()?;
/// println!("{} workspaces", usage.entries().len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OpikClient<T = HttpTransport> {
    options: ClientOptions,
    fetcher: Fetcher<T>,
}

impl OpikClient<HttpTransport> {
    /// Creates a client over a pooled HTTP transport.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(options: ClientOptions) -> Result<Self, ConfigError> {
        Ok(Self::with_transport(options, HttpTransport::new()?))
    }

    /// Creates a client configured from `OPIK_*` environment variables.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(ClientOptions::from_env())
    }
}

impl<T: Transport> OpikClient<T> {
    pub fn with_transport(options: ClientOptions, transport: T) -> Self {
        Self {
            options,
            fetcher: Fetcher::new(transport),
        }
    }

    /// Replaces the retry policy.
    pub fn with_retry_policy(self, policy: RetryPolicy) -> Self {
        Self {
            options: self.options,
            fetcher: Fetcher::with_policy(self.fetcher.into_transport(), policy),
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn fetcher(&self) -> &Fetcher<T> {
        &self.fetcher
    }

    /// Executes one call of `endpoint`.
    ///
    /// The request body is validated under the `request` breadcrumb and the
    /// response under `response`, both with the endpoint's strictness unless
    /// `options` overrides it.
    ///
    /// Never panics: every failure is classified into the returned
    /// [`ApiResponse`].
    #[instrument(
        name = "api_request",
        skip_all,
        fields(
            endpoint = endpoint.id(),
            http.method = tracing::field::Empty,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
            otel.status_code = tracing::field::Empty,
        )
    )]
    pub async fn execute<Req, Res>(
        &self,
        endpoint: &Endpoint<Req, Res>,
        call: EndpointCall<Req>,
        options: &RequestOptions,
    ) -> ApiResponse<Res>
    where
        Req: SchemaObject,
        Res: SchemaObject,
    {
        let span = Span::current();
        span.record("http.method", endpoint.method().to_string().as_str());

        match self.try_execute(endpoint, call, options, &span).await {
            Ok(response) => {
                span.record("otel.status_code", "OK");
                response
            }
            Err(err) => {
                let otel_status = match err.status_code() {
                    Some(status) if status < 500 => "UNSET",
                    _ => "ERROR",
                };
                span.record("otel.status_code", otel_status);
                debug!(kind = %err.kind(), error = %err, "call failed");
                ApiResponse::Err(err)
            }
        }
    }

    async fn try_execute<Req, Res>(
        &self,
        endpoint: &Endpoint<Req, Res>,
        call: EndpointCall<Req>,
        options: &RequestOptions,
        span: &Span,
    ) -> Result<ApiResponse<Res>, ApiError>
    where
        Req: SchemaObject,
        Res: SchemaObject,
    {
        let resolved = ResolvedOptions::resolve(&self.options, options).await;
        let strictness = resolved.strictness.unwrap_or(endpoint.strictness());

        let url = endpoint
            .url(&resolved.base_url, &call.path_params, &call.query)
            .map_err(FetchError::from)?;
        span.record("http.url", url.as_str());

        let mut builder = RequestDescriptor::builder(endpoint.method(), url)
            .timeout(resolved.timeout)
            .max_retries(resolved.max_retries)
            .header(USER_AGENT_HEADER.as_str(), USER_AGENT)
            .map_err(FetchError::from)?;
        if let Some(api_key) = &resolved.api_key {
            builder = builder
                .header(AUTHORIZATION.as_str(), api_key)
                .map_err(FetchError::from)?;
        }
        if let Some(workspace) = &resolved.workspace_name {
            builder = builder
                .header(WORKSPACE_HEADER, workspace)
                .map_err(FetchError::from)?;
        }
        // Client headers, then call headers; later writes win.
        for (name, value) in &resolved.headers {
            builder = builder.header(name, value).map_err(FetchError::from)?;
        }
        if let Some(token) = resolved.cancellation {
            builder = builder.cancellation(token);
        }
        if let Some(body) = &call.body {
            let ctx = Context::new(strictness).with_prefix([REQUEST_BREADCRUMB]);
            builder = builder.json(body.to_wire(&ctx)?);
        }
        let request = builder.build();

        let raw = self.fetcher.fetch(&request).await.inspect_err(|err| {
            if let Some(status) = err.status_code() {
                span.record("http.status_code", status);
            }
        })?;
        span.record("http.status_code", raw.status);
        debug!(status = raw.status, attempts = raw.attempts, "response received");

        let ctx = Context::new(strictness).with_prefix([RESPONSE_BREADCRUMB]);
        let body = Res::from_wire(&raw.body, &ctx)?;

        Ok(ApiResponse::Ok {
            body,
            status: raw.status,
            headers: raw.headers,
        })
    }
}
