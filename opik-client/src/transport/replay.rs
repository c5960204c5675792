//! A scripted transport for tests and recorded fixtures.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::{Transport, TransportError, TransportResponse};
use crate::fetcher::RequestDescriptor;
use crate::method::HttpMethod;

/// One scripted outcome.
#[derive(Debug, Clone)]
pub enum Reply {
    Response(TransportResponse),
    Failure(TransportError),
    /// Never answers; only cancellation or the executor's deadline ends it.
    Hang,
    /// Answers with the inner reply after a delay.
    Delayed(Duration, Box<Reply>),
}

impl Reply {
    /// A JSON response.
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self::Response(TransportResponse::new(status, headers, body.to_string()))
    }

    /// A plain-text response.
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        Self::Response(TransportResponse::new(status, headers, body.into()))
    }

    /// A response with an empty body.
    pub fn empty(status: u16) -> Self {
        Self::Response(TransportResponse::new(status, HeaderMap::new(), Bytes::new()))
    }

    /// A connection failure.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(TransportError::Connection(message.into()))
    }

    /// Adds a response header. Has no effect on failures.
    ///
    /// ## Panics
    ///
    /// Panics if `name` is not a lowercase header name or `value` is not a
    /// visible ASCII header value.
    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        match &mut self {
            Self::Response(response) => {
                response.headers.insert(
                    HeaderName::from_static(name),
                    HeaderValue::from_static(value),
                );
            }
            Self::Delayed(_, inner) => {
                let reply = std::mem::replace(inner.as_mut(), Self::Hang);
                **inner = reply.with_header(name, value);
            }
            Self::Failure(_) | Self::Hang => {}
        }
        self
    }

    /// Delays this reply.
    pub fn after(self, delay: Duration) -> Self {
        Self::Delayed(delay, Box::new(self))
    }
}

/// A request as seen by the transport.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl RecordedRequest {
    /// Returns the body decoded as JSON, if it is JSON.
    pub fn json(&self) -> Option<Value> {
        self.body
            .as_ref()
            .and_then(|body| serde_json::from_slice(body).ok())
    }
}

#[derive(Debug, Default)]
struct Script {
    replies: VecDeque<Reply>,
    fallback: Option<Reply>,
    requests: Vec<RecordedRequest>,
}

/// [`Transport`] that answers from a script and records every request.
///
/// Clones share the same script, so a test can keep a handle while the
/// client owns another.
///
/// ## Examples
///
/// ```rust
/// use opik_client::transport::{Reply, ReplayTransport};
/// use serde_json::json;
///
/// let transport = ReplayTransport::new()
///     .then(Reply::failure("connection reset"))
///     .then(Reply::json(200, json!({"ok": true})));
/// assert_eq!(transport.request_count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReplayTransport {
    script: Arc<Mutex<Script>>,
}

impl ReplayTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply for the next unanswered attempt.
    pub fn then(self, reply: Reply) -> Self {
        self.lock().replies.push_back(reply);
        self
    }

    /// Answers with `reply` once the queue is exhausted.
    pub fn otherwise(self, reply: Reply) -> Self {
        self.lock().fallback = Some(reply);
        self
    }

    /// Returns every request received so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_reply(&self, request: &RequestDescriptor) -> Reply {
        let mut script = self.lock();
        script.requests.push(RecordedRequest {
            method: request.method(),
            url: request.url().to_string(),
            headers: request.headers().clone(),
            body: request.body().cloned(),
        });
        match script.replies.pop_front() {
            Some(reply) => reply,
            None => script.fallback.clone().unwrap_or_else(|| {
                Reply::Failure(TransportError::Other("no scripted reply left".to_string()))
            }),
        }
    }
}

async fn play(reply: Reply, cancel: &CancellationToken) -> Result<TransportResponse, TransportError> {
    let mut reply = reply;
    loop {
        match reply {
            Reply::Response(response) => return Ok(response),
            Reply::Failure(err) => return Err(err),
            Reply::Hang => {
                cancel.cancelled().await;
                return Err(TransportError::Cancelled);
            }
            Reply::Delayed(delay, inner) => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return Err(TransportError::Cancelled),
                    () = tokio::time::sleep(delay) => reply = *inner,
                }
            }
        }
    }
}

impl Transport for ReplayTransport {
    async fn send(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse, TransportError> {
        let reply = self.next_reply(request);
        play(reply, cancel).await
    }
}
