//! Request/response runtime for the Opik REST API.
//!
//! Every endpoint method funnels through one pipeline:
//!
//! 1. [`config`] resolves client and per-call options into concrete values,
//!    awaiting deferred suppliers such as rotating API keys.
//! 2. [`schema`] validates and serializes the request body under the call's
//!    [`Strictness`].
//! 3. [`fetcher`] sends the request through a [`Transport`](transport::Transport)
//!    with a timeout, bounded retries and cooperative cancellation.
//! 4. The response body is validated back into a typed value and returned as
//!    an [`ApiResponse`], whose failures carry one of six [`ErrorKind`]s.
//!
//! ## Features
//!
//! - **Composable schemas**: primitives, enums, objects, lists, maps and
//!   unions with strict or permissive handling of unknown data
//! - **Breadcrumbed validation errors**: every issue names its path, e.g.
//!   `response -> content -> [1] -> name`
//! - **Retrying fetcher**: exponential backoff on transport failures, 429 and
//!   5xx, honouring `Retry-After`
//! - **Pluggable transport**: pooled `reqwest` by default, a scripted
//!   [`ReplayTransport`](transport::ReplayTransport) for tests
//!
//! ## Example
//!
//! ```rust,no_run
//! use opik_client::{ClientOptions, OpikClient, RequestOptions};
//! use opik_client::config::Supplier;
//!
//! # async fn run() -> Result<(), opik_client::ApiError> {
//! let options = ClientOptions::new()
//!     .api_key(Supplier::<String>::env("OPIK_API_KEY"))
//!     .workspace_name("default");
//! let client = OpikClient::new(options)?;
//!
//! let datasets = client
//!     .datasets()
//!     .find_datasets(Some(1), Some(10), None, &RequestOptions::new())
//!     .await
//!     .into_result()?;
//! for dataset in datasets.items() {
//!     println!("{}: {}", dataset.id, dataset.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod method;
pub mod resources;
pub mod schema;
pub mod transport;

pub use client::{ApiResponse, Endpoint, EndpointCall, OpikClient};
pub use config::{ClientOptions, Environment, RequestOptions, Supplier};
pub use error::{ApiError, ConfigError, ErrorKind, FetchError, ValidationError};
pub use fetcher::RetryPolicy;
pub use method::HttpMethod;
pub use schema::{Schema, SchemaObject, Strictness};
