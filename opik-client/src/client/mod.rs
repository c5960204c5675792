//! Endpoint definitions, the executing client and its result type.
//!
//! ## Examples
//!
//! ```rust
//! use opik_client::client::{Endpoint, EndpointCall, OpikClient};
//! use opik_client::config::{ClientOptions, RequestOptions};
//! use opik_client::transport::{Reply, ReplayTransport};
//! use opik_client::HttpMethod;
//! use serde_json::{Value, json};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let transport = ReplayTransport::new().then(Reply::json(200, json!({"id": "d1"})));
//! let client = OpikClient::with_transport(ClientOptions::new().api_key("sk-test"), transport);
//!
//! let endpoint: Endpoint<(), Value> = Endpoint::builder()
//!     .id("get_dataset_by_id")
//!     .method(HttpMethod::Get)
//!     .path("/v1/private/datasets/{id}")
//!     .build();
//!
//! let response = client
//!     .execute(&endpoint, EndpointCall::new().path_param("id", "d1"), &RequestOptions::new())
//!     .await;
//! assert_eq!(response.unwrap(), json!({"id": "d1"}));
//! # });
//! ```

mod endpoint;
mod facade;
mod response;

pub use endpoint::{Endpoint, EndpointBuilder, EndpointCall, Missing};
pub use facade::{OpikClient, REQUEST_BREADCRUMB, RESPONSE_BREADCRUMB, USER_AGENT, WORKSPACE_HEADER};
pub use response::ApiResponse;
