//! Client-level defaults and per-call overrides.

use std::fmt;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::environment::Environment;
use super::supplier::{Supplier, resolve_with_fallback};
use crate::schema::Strictness;

/// Default per-attempt timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Environment variable overriding the base URL.
pub const URL_OVERRIDE_ENV: &str = "OPIK_URL_OVERRIDE";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPIK_API_KEY";

/// Environment variable holding the workspace name.
pub const WORKSPACE_ENV: &str = "OPIK_WORKSPACE";

/// Options fixed when the client is constructed.
///
/// Every option may be overridden per call through [`RequestOptions`].
///
/// ## Examples
///
/// ```rust
/// use opik_client::config::{ClientOptions, Environment, Supplier};
///
/// let options = ClientOptions::new()
///     .environment(Environment::Cloud)
///     .api_key(Supplier::env("MY_OPIK_KEY"))
///     .workspace_name("research")
///     .timeout_in_seconds(30);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub(crate) environment: Option<Supplier<Environment>>,
    pub(crate) base_url: Option<Supplier<String>>,
    pub(crate) api_key: Option<Supplier<String>>,
    pub(crate) workspace_name: Option<Supplier<String>>,
    pub(crate) timeout_in_seconds: Option<u64>,
    pub(crate) max_retries: Option<u32>,
    pub(crate) headers: Vec<(String, String)>,
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the base URL, API key and workspace from the environment.
    ///
    /// The variables are read on every call, so changes take effect without
    /// rebuilding the client.
    pub fn from_env() -> Self {
        Self::new()
            .base_url(Supplier::env(URL_OVERRIDE_ENV))
            .api_key(Supplier::env(API_KEY_ENV))
            .workspace_name(Supplier::env(WORKSPACE_ENV))
    }

    /// Selects a named deployment. An explicit [`base_url`](Self::base_url) wins.
    pub fn environment(mut self, environment: impl Into<Supplier<Environment>>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<Supplier<String>>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<Supplier<String>>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn workspace_name(mut self, workspace_name: impl Into<Supplier<String>>) -> Self {
        self.workspace_name = Some(workspace_name.into());
        self
    }

    pub fn timeout_in_seconds(mut self, seconds: u64) -> Self {
        self.timeout_in_seconds = Some(seconds);
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Adds a header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Overrides for a single call.
///
/// Unset options fall back to the client's [`ClientOptions`].
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub(crate) environment: Option<Supplier<Environment>>,
    pub(crate) base_url: Option<Supplier<String>>,
    pub(crate) api_key: Option<Supplier<String>>,
    pub(crate) workspace_name: Option<Supplier<String>>,
    pub(crate) timeout_in_seconds: Option<u64>,
    pub(crate) max_retries: Option<u32>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) strictness: Option<Strictness>,
    pub(crate) cancellation: Option<CancellationToken>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn environment(mut self, environment: impl Into<Supplier<Environment>>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<Supplier<String>>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<Supplier<String>>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn workspace_name(mut self, workspace_name: impl Into<Supplier<String>>) -> Self {
        self.workspace_name = Some(workspace_name.into());
        self
    }

    pub fn timeout_in_seconds(mut self, seconds: u64) -> Self {
        self.timeout_in_seconds = Some(seconds);
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Adds a header for this call. Wins over a client header of the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Replaces the endpoint's strictness for this call.
    pub fn strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = Some(strictness);
        self
    }

    /// Cancels this call, and only this call, when the token fires.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// The effective configuration of one call.
#[derive(Clone)]
pub struct ResolvedOptions {
    pub base_url: String,
    pub api_key: Option<String>,
    pub workspace_name: Option<String>,
    pub timeout: Duration,
    pub max_retries: u32,
    /// Client headers followed by call headers; later entries win.
    pub headers: Vec<(String, String)>,
    pub strictness: Option<Strictness>,
    pub cancellation: Option<CancellationToken>,
}

impl fmt::Debug for ResolvedOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedOptions")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("workspace_name", &self.workspace_name)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("headers", &self.headers.len())
            .field("strictness", &self.strictness)
            .field("cancellation", &self.cancellation.is_some())
            .finish()
    }
}

impl ResolvedOptions {
    /// Resolves every option, per-call override first.
    ///
    /// Suppliers run once each, in a fixed order, and nothing is cached.
    pub async fn resolve(client: &ClientOptions, call: &RequestOptions) -> Self {
        let base_url = match resolve_base_url(call.base_url.as_ref(), call.environment.as_ref())
            .await
        {
            Some(url) => url,
            None => resolve_base_url(client.base_url.as_ref(), client.environment.as_ref())
                .await
                .unwrap_or_else(|| Environment::Default.base_url().to_string()),
        };

        let api_key = resolve_with_fallback(call.api_key.as_ref(), client.api_key.as_ref()).await;
        let workspace_name =
            resolve_with_fallback(call.workspace_name.as_ref(), client.workspace_name.as_ref())
                .await;

        let seconds = call
            .timeout_in_seconds
            .or(client.timeout_in_seconds)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            base_url,
            api_key,
            workspace_name,
            timeout: Duration::from_secs(seconds),
            max_retries: call
                .max_retries
                .or(client.max_retries)
                .unwrap_or(DEFAULT_MAX_RETRIES),
            headers: client
                .headers
                .iter()
                .chain(call.headers.iter())
                .cloned()
                .collect(),
            strictness: call.strictness,
            cancellation: call.cancellation.clone(),
        }
    }
}

async fn resolve_base_url(
    base_url: Option<&Supplier<String>>,
    environment: Option<&Supplier<Environment>>,
) -> Option<String> {
    if let Some(url) = resolve_with_fallback(base_url, None).await {
        return Some(url);
    }
    resolve_with_fallback(environment, None)
        .await
        .map(|env| env.base_url().to_string())
}
