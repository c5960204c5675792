//! The request executor.

use std::time::Duration;

use reqwest::header::HeaderMap;
use serde_json::Value;
use strum::Display;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::descriptor::RequestDescriptor;
use super::retry::{RetryPolicy, parse_retry_after};
use crate::error::FetchError;
use crate::transport::{Transport, TransportError, TransportResponse};

/// A successful response with its body decoded as JSON.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    /// Decoded body; `null` when the body was empty.
    pub body: Value,
    /// Attempts made, including the successful one.
    pub attempts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
enum FetchState {
    Idle,
    Sending,
    Retrying,
    Succeeded,
    Failed,
}

struct AttemptFailure {
    error: FetchError,
    retry_after: Option<Duration>,
}

impl From<FetchError> for AttemptFailure {
    fn from(error: FetchError) -> Self {
        Self {
            error,
            retry_after: None,
        }
    }
}

/// Executes [`RequestDescriptor`]s over a [`Transport`].
///
/// One call to [`fetch`](Self::fetch) walks
/// `idle -> sending -> {succeeded | failed | retrying}`, with
/// `retrying -> sending` until the retry budget is spent. Attempts are
/// strictly sequential and each one gets the full per-attempt timeout.
/// The cancellation token is checked before every attempt, raced against
/// every attempt and every backoff sleep, and handed to the transport.
///
/// ## Examples
///
/// ```rust
/// use opik_client::HttpMethod;
/// use opik_client::fetcher::{Fetcher, RequestDescriptor};
/// use opik_client::transport::{Reply, ReplayTransport};
/// use serde_json::json;
/// use url::Url;
///
/// # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
/// let transport = ReplayTransport::new()
///     .then(Reply::failure("connection reset"))
///     .then(Reply::json(200, json!({"ok": true})));
/// let fetcher = Fetcher::new(transport);
///
/// let url = Url::parse("http://localhost:5173/api/is-alive/ping").unwrap();
/// let request = RequestDescriptor::builder(HttpMethod::Get, url).build();
/// let response = fetcher.fetch(&request).await.unwrap();
///
/// assert_eq!(response.attempts, 2);
/// assert_eq!(response.body, json!({"ok": true}));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct Fetcher<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: Transport> Fetcher<T> {
    /// Creates a fetcher with the default [`RetryPolicy`].
    pub fn new(transport: T) -> Self {
        Self::with_policy(transport, RetryPolicy::default())
    }

    pub fn with_policy(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Sends `request`, retrying per the policy and the descriptor's budget.
    ///
    /// ## Errors
    ///
    /// Returns the classified failure of the last attempt. Cancellation
    /// takes precedence over any other outcome once the token has fired.
    pub async fn fetch(&self, request: &RequestDescriptor) -> Result<RawResponse, FetchError> {
        let cancel = request.cancellation().cloned().unwrap_or_default();
        let max_retries = request.max_retries();
        let mut state = FetchState::Idle;
        let mut attempt: u32 = 0;
        let mut previous_delay = Duration::ZERO;

        loop {
            if cancel.is_cancelled() {
                transition(&mut state, FetchState::Failed, attempt);
                return Err(FetchError::Cancelled);
            }

            attempt += 1;
            transition(&mut state, FetchState::Sending, attempt);

            let failure = match self.attempt(request, &cancel).await {
                Ok(mut response) => {
                    transition(&mut state, FetchState::Succeeded, attempt);
                    response.attempts = attempt;
                    return Ok(response);
                }
                Err(failure) => failure,
            };

            if cancel.is_cancelled() {
                transition(&mut state, FetchState::Failed, attempt);
                return Err(FetchError::Cancelled);
            }

            let retries_used = attempt - 1;
            if retries_used >= max_retries || !self.policy.should_retry(&failure.error) {
                transition(&mut state, FetchState::Failed, attempt);
                debug!(attempt, reason = failure.error.reason(), error = %failure.error, "request failed");
                return Err(failure.error);
            }

            let delay = self
                .policy
                .delay_for(retries_used, failure.retry_after)
                .max(previous_delay);
            previous_delay = delay;

            transition(&mut state, FetchState::Retrying, attempt);
            warn!(
                attempt,
                max_retries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                reason = failure.error.reason(),
                error = %failure.error,
                "retrying request"
            );

            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    transition(&mut state, FetchState::Failed, attempt);
                    return Err(FetchError::Cancelled);
                }
                () = tokio::time::sleep(delay) => {}
            }
        }
    }

    async fn attempt(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<RawResponse, AttemptFailure> {
        let timed_out = || FetchError::Timeout {
            budget: request.timeout(),
            method: request.method(),
            path: request.url().path().to_string(),
        };

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(FetchError::Cancelled.into()),
            outcome = tokio::time::timeout(request.timeout(), self.transport.send(request, cancel)) => outcome,
        };

        match outcome {
            Err(_elapsed) => Err(timed_out().into()),
            Ok(Err(TransportError::Timeout)) => Err(timed_out().into()),
            Ok(Err(TransportError::Cancelled)) => Err(FetchError::Cancelled.into()),
            Ok(Err(err)) => Err(FetchError::unknown(err.to_string()).into()),
            Ok(Ok(response)) => classify(response),
        }
    }
}

fn transition(state: &mut FetchState, next: FetchState, attempt: u32) {
    debug!(from = %state, to = %next, attempt, "fetch state");
    *state = next;
}

fn classify(response: TransportResponse) -> Result<RawResponse, AttemptFailure> {
    let TransportResponse {
        status,
        headers,
        body,
    } = response;

    if (200..300).contains(&status) {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(RawResponse {
                status,
                headers,
                body: Value::Null,
                attempts: 0,
            });
        }
        return match serde_json::from_slice::<Value>(&body) {
            Ok(value) => Ok(RawResponse {
                status,
                headers,
                body: value,
                attempts: 0,
            }),
            Err(_) => Err(FetchError::NonJson {
                status,
                raw_body: String::from_utf8_lossy(&body).into_owned(),
            }
            .into()),
        };
    }

    let detail = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };

    Err(AttemptFailure {
        error: FetchError::StatusCode {
            status,
            body: detail,
        },
        retry_after: parse_retry_after(&headers),
    })
}
