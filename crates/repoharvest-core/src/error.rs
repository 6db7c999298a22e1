//! Error taxonomy for the harvesting engine

/// Terminal failure of one GraphQL request, after retries are spent.
///
/// Transient failures (transport errors, rate-limit responses, unexpected
/// HTTP statuses) never escape the executor; only these two do.
#[derive(Debug)]
pub enum FetchError {
    /// API-level error payload on an otherwise successful call.
    /// Never retried — repeating an invalid query only wastes quota.
    Query(String),
    /// Retry budget consumed without a successful response.
    Budget { attempts: u32, last: String },
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Query(msg) => write!(f, "query error: {msg}"),
            Self::Budget { attempts, last } => {
                write!(f, "gave up after {attempts} attempts (last: {last})")
            }
        }
    }
}

impl std::error::Error for FetchError {}

/// Why a harvest job ended in [`Failed`](crate::page::JobOutcome::Failed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Parent object was null in the response: target absent or no access.
    TargetUnavailable,
    /// API-level error payload or a response shape the strategy cannot read.
    QueryError,
    /// Request retry budget exhausted.
    RetriesExhausted,
    /// Destination write failed.
    Sink,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::TargetUnavailable => "target unavailable",
            Self::QueryError => "query error",
            Self::RetriesExhausted => "retries exhausted",
            Self::Sink => "sink write failed",
        };
        f.write_str(s)
    }
}
