//! Deferred configuration values.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

type DeferredFn<T> = dyn Fn() -> BoxFuture<'static, Option<T>> + Send + Sync;

/// A configuration value that is either pinned or produced on demand.
///
/// Deferred suppliers run on every resolution and are never cached, so a
/// rotated credential is picked up by the next call. A deferred supplier may
/// produce nothing, in which case resolution falls back to the next source.
///
/// ## Examples
///
/// ```rust
/// use opik_client::config::Supplier;
///
/// # tokio_test_block(async {
/// let pinned: Supplier<String> = Supplier::value("my-workspace");
/// assert_eq!(pinned.resolve().await.as_deref(), Some("my-workspace"));
///
/// let deferred: Supplier<String> = Supplier::from_fn(|| async { Some("rotated".to_string()) });
/// assert_eq!(deferred.resolve().await.as_deref(), Some("rotated"));
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
pub enum Supplier<T> {
    /// A pinned value.
    Static(T),
    /// A possibly-suspending accessor invoked on every resolution.
    Deferred(Arc<DeferredFn<T>>),
}

impl<T> Clone for Supplier<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        match self {
            Self::Static(v) => Self::Static(v.clone()),
            Self::Deferred(f) => Self::Deferred(Arc::clone(f)),
        }
    }
}

// Values may be credentials, so they are never printed.
impl<T> fmt::Debug for Supplier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(_) => f.write_str("Supplier::Static(..)"),
            Self::Deferred(_) => f.write_str("Supplier::Deferred(..)"),
        }
    }
}

impl<T> Supplier<T>
where
    T: Clone + Send + 'static,
{
    /// Pins a value.
    pub fn value(value: impl Into<T>) -> Self {
        Self::Static(value.into())
    }

    /// Defers to an async accessor.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<T>> + Send + 'static,
    {
        Self::Deferred(Arc::new(move || f().boxed()))
    }

    /// Defers to a synchronous accessor.
    pub fn from_sync<F>(f: F) -> Self
    where
        F: Fn() -> Option<T> + Send + Sync + 'static,
    {
        Self::Deferred(Arc::new(move || futures::future::ready(f()).boxed()))
    }

    /// Produces the current value.
    pub async fn resolve(&self) -> Option<T> {
        match self {
            Self::Static(v) => Some(v.clone()),
            Self::Deferred(f) => f().await,
        }
    }
}

impl Supplier<String> {
    /// Reads an environment variable on every resolution.
    ///
    /// Unset and blank variables resolve to nothing.
    pub fn env(var: &'static str) -> Self {
        Self::from_sync(move || {
            std::env::var(var)
                .ok()
                .filter(|v| !v.trim().is_empty())
        })
    }
}

impl From<&str> for Supplier<String> {
    fn from(value: &str) -> Self {
        Self::Static(value.to_string())
    }
}

impl<T> From<T> for Supplier<T> {
    fn from(value: T) -> Self {
        Self::Static(value)
    }
}

/// Resolves the per-call override first, then the client default.
///
/// Either source may be absent or resolve to nothing; only then does the
/// result come back empty.
pub async fn resolve_with_fallback<T>(
    overriding: Option<&Supplier<T>>,
    default: Option<&Supplier<T>>,
) -> Option<T>
where
    T: Clone + Send + 'static,
{
    if let Some(supplier) = overriding
        && let Some(value) = supplier.resolve().await
    {
        return Some(value);
    }
    match default {
        Some(supplier) => supplier.resolve().await,
        None => None,
    }
}
