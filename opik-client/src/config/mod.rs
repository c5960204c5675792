//! Configuration resolution.
//!
//! Every option is resolved per call: the [`RequestOptions`] override first,
//! then the [`ClientOptions`] default, then a documented constant. Deferred
//! [`Supplier`]s run on each resolution and are never cached.

mod environment;
mod options;
mod supplier;

pub use environment::{CLOUD_BASE_URL, DEFAULT_BASE_URL, Environment};
pub use options::{
    API_KEY_ENV, ClientOptions, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS, RequestOptions,
    ResolvedOptions, URL_OVERRIDE_ENV, WORKSPACE_ENV,
};
pub use supplier::{Supplier, resolve_with_fallback};
