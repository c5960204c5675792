//! Retry eligibility and backoff.
//!
//! ## Default policy
//!
//! - Retried: transport failures and statuses 429 and 500 to 599
//! - Not retried: other statuses, non-JSON bodies, cancellation, and
//!   timeouts unless [`RetryPolicy::retry_on_timeout`] is enabled
//! - Delay before retry `n` (zero-based): `500ms * 2^n`, capped at 10s
//! - A numeric `Retry-After` header may raise the next delay, never lower it,
//!   and never beyond the cap

use std::ops::RangeInclusive;
use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};

use crate::error::FetchError;

/// Initial delay before the first retry.
pub const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Growth factor between consecutive delays.
pub const RETRY_MULTIPLIER: f64 = 2.0;

/// Upper bound on any single delay.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Decides whether a failed attempt is retried and how long to wait.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    initial_delay: Duration,
    multiplier: f64,
    max_delay: Duration,
    retryable_statuses: Vec<RangeInclusive<u16>>,
    retry_on_timeout: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: INITIAL_RETRY_DELAY,
            multiplier: RETRY_MULTIPLIER,
            max_delay: MAX_RETRY_DELAY,
            retryable_statuses: vec![429..=429, 500..=599],
            retry_on_timeout: false,
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the growth factor. Values below 1 are treated as 1.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier.max(1.0);
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Replaces the set of retryable status codes.
    pub fn retry_statuses(mut self, statuses: impl IntoIterator<Item = RangeInclusive<u16>>) -> Self {
        self.retryable_statuses = statuses.into_iter().collect();
        self
    }

    /// Retries attempts that hit the per-attempt deadline.
    pub fn retry_on_timeout(mut self, enabled: bool) -> Self {
        self.retry_on_timeout = enabled;
        self
    }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_statuses.iter().any(|r| r.contains(&status))
    }

    /// Returns `true` if `error` may succeed when the request is sent again.
    pub fn should_retry(&self, error: &FetchError) -> bool {
        match error {
            FetchError::Unknown { .. } => true,
            FetchError::StatusCode { status, .. } => self.is_retryable_status(*status),
            FetchError::Timeout { .. } => self.retry_on_timeout,
            FetchError::NonJson { .. } | FetchError::Cancelled => false,
        }
    }

    /// Delay before retry number `retry` (zero-based).
    pub fn delay_for(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let scaled = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let backoff = if scaled.is_finite() && scaled < self.max_delay.as_secs_f64() {
            Duration::from_secs_f64(scaled)
        } else {
            self.max_delay
        };

        match retry_after {
            Some(hint) => backoff.max(hint).min(self.max_delay),
            None => backoff,
        }
    }
}

/// Reads a `Retry-After` header given in whole seconds.
///
/// HTTP-date values are ignored.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::HttpMethod;
    use reqwest::header::HeaderValue;

    #[test]
    fn default_schedule_doubles_up_to_the_cap() {
        let policy = RetryPolicy::default();
        let delays: Vec<Duration> = (0..7).map(|n| policy.delay_for(n, None)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(500),
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8),
                Duration::from_secs(10),
                Duration::from_secs(10),
            ]
        );
        assert!(delays.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(policy.delay_for(u32::MAX, None), MAX_RETRY_DELAY);
    }

    #[test]
    fn retry_after_raises_but_never_lowers() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.delay_for(0, Some(Duration::from_secs(3))),
            Duration::from_secs(3)
        );
        assert_eq!(
            policy.delay_for(3, Some(Duration::from_secs(1))),
            Duration::from_secs(4)
        );
        assert_eq!(
            policy.delay_for(0, Some(Duration::from_secs(3600))),
            MAX_RETRY_DELAY
        );
    }

    #[test]
    fn default_retryable_set() {
        let policy = RetryPolicy::default();
        let status = |status| FetchError::StatusCode {
            status,
            body: serde_json::Value::Null,
        };

        assert!(policy.should_retry(&status(429)));
        assert!(policy.should_retry(&status(500)));
        assert!(policy.should_retry(&status(503)));
        assert!(!policy.should_retry(&status(400)));
        assert!(!policy.should_retry(&status(404)));
        assert!(policy.should_retry(&FetchError::unknown("connection reset")));
        assert!(!policy.should_retry(&FetchError::Cancelled));
        assert!(!policy.should_retry(&FetchError::NonJson {
            status: 200,
            raw_body: "<html>".to_string(),
        }));
    }

    #[test]
    fn timeouts_are_opt_in() {
        let timeout = FetchError::Timeout {
            budget: Duration::from_secs(1),
            method: HttpMethod::Get,
            path: "/".to_string(),
        };
        assert!(!RetryPolicy::default().should_retry(&timeout));
        assert!(RetryPolicy::default().retry_on_timeout(true).should_retry(&timeout));
    }

    #[test]
    fn custom_status_set() {
        let policy = RetryPolicy::new().retry_statuses([502..=504]);
        assert!(policy.is_retryable_status(503));
        assert!(!policy.is_retryable_status(429));
        assert!(!policy.is_retryable_status(500));
    }

    #[test]
    fn retry_after_header_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(7)));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert_eq!(parse_retry_after(&headers), None);
    }
}
