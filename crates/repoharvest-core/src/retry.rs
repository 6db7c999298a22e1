//! Classify-then-delay retry loop for GraphQL requests

use std::time::Duration;

use serde_json::Value;

use crate::error::FetchError;

/// Back-off policy for one request: attempt bound plus per-class delays.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Delay after transport errors and unexpected HTTP statuses.
    pub transient_delay: Duration,
    /// Delay after 401/403 responses, long enough to cross a rate-limit
    /// reset window before retrying with the next token.
    pub rate_limit_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            transient_delay: Duration::from_secs(5),
            rate_limit_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Zero-delay policy, for tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            transient_delay: Duration::ZERO,
            rate_limit_delay: Duration::ZERO,
        }
    }
}

/// Outcome of a single request attempt, already classified.
#[derive(Debug)]
pub enum Attempt {
    Success(Value),
    /// API-level error payload — permanent, never retried.
    Fatal(String),
    /// Connection error, timeout, unreadable body, or unexpected HTTP status.
    Transient(String),
    /// 401/403-class response.
    RateLimited(String),
}

/// Run `attempt_fn` until success, a fatal outcome, or the attempt budget
/// is spent, sleeping the policy delay between attempts.
///
/// Returns `Ok` on the first success, [`FetchError::Query`] on a fatal
/// outcome, [`FetchError::Budget`] on exhaustion.
pub fn run_with_retry(
    policy: &RetryPolicy,
    label: &str,
    mut attempt_fn: impl FnMut() -> Attempt,
) -> Result<Value, FetchError> {
    let mut last = String::new();
    for attempt in 1..=policy.max_attempts {
        let (message, delay) = match attempt_fn() {
            Attempt::Success(body) => return Ok(body),
            Attempt::Fatal(msg) => {
                log::warn!("{label}: query failed permanently: {msg}");
                return Err(FetchError::Query(msg));
            }
            Attempt::Transient(msg) => (msg, policy.transient_delay),
            Attempt::RateLimited(msg) => (msg, policy.rate_limit_delay),
        };
        log::debug!(
            "{label}: attempt {attempt}/{} failed: {message}, retrying...",
            policy.max_attempts
        );
        last = message;
        if attempt < policy.max_attempts {
            std::thread::sleep(delay);
        }
    }
    Err(FetchError::Budget {
        attempts: policy.max_attempts,
        last,
    })
}
