//! Endpoint definitions with a type-state builder.
//!
//! An [`Endpoint`] names one operation of the API: its method, path template
//! and the strictness its payloads are validated with. The request and
//! response models are carried as type parameters so the facade can run the
//! right schemas at compile time.

use std::fmt;
use std::marker::PhantomData;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

use crate::error::ConfigError;
use crate::method::HttpMethod;
use crate::schema::Strictness;

/// Characters escaped in a path parameter: everything but RFC 3986 unreserved.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Marker for a builder field that has not been set.
#[derive(Debug, Clone, Copy)]
pub struct Missing;

/// One API operation.
///
/// ## Type Parameters
///
/// - `Req`: request body model, `()` for operations without a body.
/// - `Res`: response body model, `()` for operations without one.
///
/// ## Examples
///
/// ```rust
/// use opik_client::HttpMethod;
/// use opik_client::client::Endpoint;
/// use serde_json::Value;
///
/// let endpoint: Endpoint<(), Value> = Endpoint::builder()
///     .id("get_dataset_by_id")
///     .method(HttpMethod::Get)
///     .path("/v1/private/datasets/{id}")
///     .build();
///
/// assert_eq!(endpoint.path_params(), vec!["id"]);
/// ```
pub struct Endpoint<Req, Res> {
    id: String,
    method: HttpMethod,
    path: String,
    strictness: Strictness,
    _models: PhantomData<fn(Req) -> Res>,
}

impl<Req, Res> fmt::Debug for Endpoint<Req, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("id", &self.id)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("strictness", &self.strictness)
            .finish_non_exhaustive()
    }
}

impl<Req, Res> Clone for Endpoint<Req, Res> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            method: self.method,
            path: self.path.clone(),
            strictness: self.strictness,
            _models: PhantomData,
        }
    }
}

impl<Req, Res> Endpoint<Req, Res> {
    pub fn builder() -> EndpointBuilder<Missing, Missing, Missing, Req, Res> {
        EndpointBuilder::new()
    }

    /// Operation identifier, used in logs.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Path template, relative to the base URL.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Strictness applied to both the request and the response.
    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// Names of the `{param}` placeholders, in order of appearance.
    pub fn path_params(&self) -> Vec<&str> {
        placeholders(&self.path).map(|(_, name)| name).collect()
    }

    /// Fills every placeholder with its percent-encoded value.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::MissingPathParam`] for the first placeholder
    /// without a value.
    pub fn resolve_path(&self, params: &[(String, String)]) -> Result<String, ConfigError> {
        let mut resolved = String::with_capacity(self.path.len());
        let mut rest = 0;
        for (start, name) in placeholders(&self.path) {
            let value = params
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value)
                .ok_or_else(|| ConfigError::missing_path_param(name, &self.path))?;
            resolved.push_str(&self.path[rest..start]);
            resolved.extend(utf8_percent_encode(value, PATH_SEGMENT));
            rest = start + name.len() + 2;
        }
        resolved.push_str(&self.path[rest..]);
        Ok(resolved)
    }

    /// Joins `base_url` with the resolved path and appends `query`.
    ///
    /// The base URL's own path is kept, so `http://host/api` and
    /// `/v1/private/traces` give `http://host/api/v1/private/traces`.
    ///
    /// ## Errors
    ///
    /// Returns an error for a missing path parameter or an unparseable URL.
    pub fn url(
        &self,
        base_url: &str,
        params: &[(String, String)],
        query: &[(String, String)],
    ) -> Result<Url, ConfigError> {
        let path = self.resolve_path(params)?;
        let joined = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut url = Url::parse(&joined)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}

/// Yields `(offset of '{', name)` for each `{name}` in `path`.
fn placeholders(path: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut cursor = 0;
    std::iter::from_fn(move || {
        let open = cursor + path[cursor..].find('{')?;
        let close = open + path[open..].find('}')?;
        cursor = close + 1;
        Some((open, &path[open + 1..close]))
    })
}

/// Type-state builder for [`Endpoint`].
///
/// `id`, `method` and `path` are required; each starts as [`Missing`] and
/// `build` only exists once all three hold their real types.
pub struct EndpointBuilder<I, M, P, Req, Res> {
    id: I,
    method: M,
    path: P,
    strictness: Strictness,
    _models: PhantomData<fn(Req) -> Res>,
}

impl<Req, Res> EndpointBuilder<Missing, Missing, Missing, Req, Res> {
    pub fn new() -> Self {
        Self {
            id: Missing,
            method: Missing,
            path: Missing,
            strictness: Strictness::default(),
            _models: PhantomData,
        }
    }
}

impl<Req, Res> Default for EndpointBuilder<Missing, Missing, Missing, Req, Res> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, P, Req, Res> EndpointBuilder<Missing, M, P, Req, Res> {
    pub fn id(self, id: impl Into<String>) -> EndpointBuilder<String, M, P, Req, Res> {
        EndpointBuilder {
            id: id.into(),
            method: self.method,
            path: self.path,
            strictness: self.strictness,
            _models: PhantomData,
        }
    }
}

impl<I, P, Req, Res> EndpointBuilder<I, Missing, P, Req, Res> {
    pub fn method(self, method: HttpMethod) -> EndpointBuilder<I, HttpMethod, P, Req, Res> {
        EndpointBuilder {
            id: self.id,
            method,
            path: self.path,
            strictness: self.strictness,
            _models: PhantomData,
        }
    }
}

impl<I, M, Req, Res> EndpointBuilder<I, M, Missing, Req, Res> {
    /// Sets the path template, which may contain `{param}` placeholders.
    pub fn path(self, path: impl Into<String>) -> EndpointBuilder<I, M, String, Req, Res> {
        EndpointBuilder {
            id: self.id,
            method: self.method,
            path: path.into(),
            strictness: self.strictness,
            _models: PhantomData,
        }
    }
}

impl<I, M, P, Req, Res> EndpointBuilder<I, M, P, Req, Res> {
    /// Defaults to [`Strictness::strict`].
    pub fn strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }
}

impl<Req, Res> EndpointBuilder<String, HttpMethod, String, Req, Res> {
    pub fn build(self) -> Endpoint<Req, Res> {
        Endpoint {
            id: self.id,
            method: self.method,
            path: self.path,
            strictness: self.strictness,
            _models: PhantomData,
        }
    }
}

/// Per-call inputs of an [`Endpoint`]: body, path parameters and query.
#[derive(Debug, Clone)]
pub struct EndpointCall<Req> {
    pub(crate) body: Option<Req>,
    pub(crate) path_params: Vec<(String, String)>,
    pub(crate) query: Vec<(String, String)>,
}

impl<Req> Default for EndpointCall<Req> {
    fn default() -> Self {
        Self {
            body: None,
            path_params: Vec::new(),
            query: Vec::new(),
        }
    }
}

impl<Req> EndpointCall<Req> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A call carrying `body`.
    pub fn with_body(body: Req) -> Self {
        Self::new().body(body)
    }

    pub fn body(mut self, body: Req) -> Self {
        self.body = Some(body);
        self
    }

    pub fn path_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.path_params.push((name.into(), value.to_string()));
        self
    }

    /// Appends a query parameter. Repeated names are sent repeatedly.
    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn endpoint(path: &str) -> Endpoint<(), Value> {
        Endpoint::builder()
            .id("test")
            .method(HttpMethod::Get)
            .path(path)
            .build()
    }

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn builder_fields_in_any_order() {
        let endpoint: Endpoint<(), Value> = Endpoint::builder()
            .path("/v1/private/traces")
            .strictness(Strictness::permissive())
            .method(HttpMethod::Get)
            .id("get_traces")
            .build();

        assert_eq!(endpoint.id(), "get_traces");
        assert_eq!(endpoint.method(), HttpMethod::Get);
        assert_eq!(endpoint.strictness(), Strictness::permissive());
    }

    #[test]
    fn default_strictness_is_strict() {
        assert_eq!(endpoint("/x").strictness(), Strictness::strict());
    }

    #[test]
    fn path_params_in_order() {
        let endpoint = endpoint("/v1/private/datasets/{datasetId}/items/{itemId}");
        assert_eq!(endpoint.path_params(), vec!["datasetId", "itemId"]);
        assert!(self::endpoint("/v1/private/traces").path_params().is_empty());
    }

    #[test]
    fn resolve_path_encodes_values() {
        let endpoint = endpoint("/v1/private/projects/{name}/traces");
        let path = endpoint
            .resolve_path(&params(&[("name", "my project/α")]))
            .unwrap();
        assert_eq!(path, "/v1/private/projects/my%20project%2F%CE%B1/traces");
    }

    #[test]
    fn missing_path_param_is_reported() {
        let endpoint = endpoint("/v1/private/datasets/{id}");
        let err = endpoint.resolve_path(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingPathParam { ref param, .. } if param == "id"));
    }

    #[test]
    fn url_keeps_base_path_and_appends_query() {
        let endpoint = endpoint("/v1/private/datasets/{id}/items");
        let url = endpoint
            .url(
                "http://localhost:5173/api/",
                &params(&[("id", "d1")]),
                &params(&[("page", "2"), ("size", "10")]),
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5173/api/v1/private/datasets/d1/items?page=2&size=10"
        );
    }

    #[test]
    fn invalid_base_url() {
        let err = endpoint("/x").url("not a url", &[], &[]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl(_)));
    }

    #[test]
    fn call_builder_collects_inputs() {
        let call = EndpointCall::with_body("payload".to_string())
            .path_param("id", 7)
            .query("tag", "a")
            .query("tag", "b");
        assert_eq!(call.body.as_deref(), Some("payload"));
        assert_eq!(call.path_params, params(&[("id", "7")]));
        assert_eq!(call.query.len(), 2);
    }
}
