//! Retrying GraphQL request executor

use std::time::Duration;

use serde_json::Value;

use crate::error::FetchError;
use crate::http::{SHARED_RUNTIME, http_client};
use crate::retry::{Attempt, RetryPolicy, run_with_retry};
use crate::token::TokenPool;

/// Per-call timeout covering connect, request, and full response body.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// GraphQL client posting `{query, variables}` payloads with bearer
/// authorization, one token rotation per attempt.
pub struct GraphQlClient {
    endpoint: String,
    tokens: TokenPool,
    policy: RetryPolicy,
    timeout: Duration,
}

impl GraphQlClient {
    pub fn new(endpoint: impl Into<String>, tokens: TokenPool, policy: RetryPolicy) -> Self {
        Self {
            endpoint: endpoint.into(),
            tokens,
            policy,
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Execute one query, retrying per the policy. `label` names the
    /// requesting job in logs.
    pub fn execute(
        &self,
        label: &str,
        document: &str,
        variables: Value,
    ) -> Result<Value, FetchError> {
        let payload = serde_json::json!({ "query": document, "variables": variables });
        run_with_retry(&self.policy, label, || self.attempt(&payload))
    }

    /// One POST with the next token in rotation, classified for the retry loop.
    fn attempt(&self, payload: &Value) -> Attempt {
        let token = self.tokens.next();
        let result = SHARED_RUNTIME.handle().block_on(async {
            let response = http_client()
                .post(&self.endpoint)
                .bearer_auth(token)
                .header(reqwest::header::ACCEPT, "application/vnd.github+json")
                .timeout(self.timeout)
                .json(payload)
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        });

        match result {
            Ok((status, body)) => classify_response(status, &body),
            Err(e) => Attempt::Transient(format!("transport: {}", e.without_url())),
        }
    }
}

impl std::fmt::Debug for GraphQlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphQlClient")
            .field("endpoint", &self.endpoint)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

/// Classify one completed HTTP exchange.
///
/// 401/403 back off long enough for a rate-limit reset; any other non-2xx
/// and an unreadable 2xx body retry with the short delay; a 2xx body
/// carrying a non-empty `errors` array is permanent.
fn classify_response(status: u16, body: &str) -> Attempt {
    match status {
        200..=299 => match serde_json::from_str::<Value>(body) {
            Ok(parsed) => match parsed.get("errors").and_then(Value::as_array) {
                Some(errors) if !errors.is_empty() => Attempt::Fatal(summarize_errors(errors)),
                _ => Attempt::Success(parsed),
            },
            Err(e) => Attempt::Transient(format!("malformed response body: {e}")),
        },
        401 | 403 => Attempt::RateLimited(format!("HTTP {status}")),
        _ => Attempt::Transient(format!("HTTP {status}")),
    }
}

/// Join the `message` fields of a GraphQL error array.
fn summarize_errors(errors: &[Value]) -> String {
    let messages: Vec<&str> = errors
        .iter()
        .filter_map(|e| e.get("message").and_then(Value::as_str))
        .collect();
    if messages.is_empty() {
        // No message fields — keep the raw payload for diagnosis
        serde_json::to_string(errors).unwrap_or_else(|_| "unknown GraphQL error".to_string())
    } else {
        messages.join("; ")
    }
}
