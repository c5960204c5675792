//! Immutable descriptions of a single logical request.

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::{DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS};
use crate::error::ConfigError;
use crate::method::HttpMethod;

/// Everything needed to send one logical request, reused unchanged by every
/// retry.
///
/// ## Examples
///
/// ```rust
/// use std::time::Duration;
/// use opik_client::HttpMethod;
/// use opik_client::fetcher::RequestDescriptor;
/// use serde_json::json;
/// use url::Url;
///
/// let url = Url::parse("http://localhost:5173/api/v1/private/datasets")?;
/// let request = RequestDescriptor::builder(HttpMethod::Post, url)
///     .header("Comet-Workspace", "research")?
///     .json(json!({"name": "golden"}))
///     .timeout(Duration::from_secs(5))
///     .max_retries(0)
///     .build();
///
/// assert_eq!(request.content_type(), Some("application/json"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: HttpMethod,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
    timeout: Duration,
    max_retries: u32,
    cancellation: Option<CancellationToken>,
}

impl RequestDescriptor {
    pub fn builder(method: HttpMethod, url: Url) -> RequestDescriptorBuilder {
        RequestDescriptorBuilder::new(method, url)
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Returns the `Content-Type` header, if set and readable.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Per-attempt deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Retries allowed after the first attempt.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }
}

/// Builder for [`RequestDescriptor`].
#[derive(Debug)]
pub struct RequestDescriptorBuilder {
    method: HttpMethod,
    url: Url,
    headers: HeaderMap,
    body: Option<(Bytes, HeaderValue)>,
    timeout: Duration,
    max_retries: u32,
    cancellation: Option<CancellationToken>,
}

impl RequestDescriptorBuilder {
    fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            cancellation: None,
        }
    }

    /// Sets a header, replacing any earlier value for the same name.
    ///
    /// Names compare case-insensitively.
    ///
    /// ## Errors
    ///
    /// Returns an error if the name or value cannot be sent over HTTP.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self, ConfigError> {
        let name = name.as_ref();
        let header_name =
            HeaderName::try_from(name).map_err(|_| ConfigError::InvalidHeaderName {
                name: name.to_string(),
            })?;
        let header_value =
            HeaderValue::try_from(value.as_ref()).map_err(|_| ConfigError::InvalidHeaderValue {
                name: name.to_string(),
            })?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    /// Sets every header in `headers`.
    ///
    /// Each name replaces whatever was set for it before; all of its values
    /// in `headers` are kept.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        let mut current: Option<HeaderName> = None;
        for (name, value) in headers {
            // Extra values of a multi-valued header come with no name.
            match name {
                Some(name) => {
                    self.headers.insert(name.clone(), value);
                    current = Some(name);
                }
                None => {
                    if let Some(name) = &current {
                        self.headers.append(name.clone(), value);
                    }
                }
            }
        }
        self
    }

    /// Sends `body` as JSON.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some((
            Bytes::from(body.to_string()),
            HeaderValue::from_static("application/json"),
        ));
        self
    }

    /// Sends `body` as UTF-8 text.
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some((
            Bytes::from(body.into()),
            HeaderValue::from_static("text/plain; charset=utf-8"),
        ));
        self
    }

    /// Sends raw bytes with the given content type.
    pub fn bytes(mut self, body: impl Into<Bytes>, content_type: HeaderValue) -> Self {
        self.body = Some((body.into(), content_type));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Builds the descriptor.
    ///
    /// An explicit `Content-Type` header wins over the one implied by the body.
    pub fn build(self) -> RequestDescriptor {
        let mut headers = self.headers;
        let body = self.body.map(|(bytes, content_type)| {
            headers.entry(CONTENT_TYPE).or_insert(content_type);
            bytes
        });

        RequestDescriptor {
            method: self.method,
            url: self.url,
            headers,
            body,
            timeout: self.timeout,
            max_retries: self.max_retries,
            cancellation: self.cancellation,
        }
    }
}
