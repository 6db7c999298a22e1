//! Cursor-pagination loop driving one target's harvest

use std::time::Duration;

use serde_json::Value;

use crate::error::{FailureKind, FetchError};
use crate::sink::CsvSink;
use crate::sink::Row;

/// One independent unit of harvesting work: an `(owner, name)`
/// repository-style pair. Targets have no ordering or data dependency
/// between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub owner: String,
    pub name: String,
}

impl Target {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// One page of projected rows plus the continuation marker.
#[derive(Debug)]
pub struct Page {
    pub rows: Vec<Row>,
    pub has_next: bool,
    pub end_cursor: Option<String>,
}

/// What a query strategy saw in the `data` object of a response.
#[derive(Debug)]
pub enum Parsed {
    Page(Page),
    /// Parent object was null: target absent or inaccessible. Permanent,
    /// the job fails without further requests.
    MissingTarget,
    /// Target exists but has nothing to iterate (e.g. no default branch).
    /// The job ends exhausted, not failed.
    NothingToHarvest,
}

/// Injected query-and-projection strategy: one per entity type. Supplies
/// the query document, binds the `{owner, name, cursor}` variables, and
/// turns a response into projected rows.
pub trait PageQuery: Sync {
    fn document(&self) -> &str;
    fn variables(&self, target: &Target, cursor: Option<&str>) -> Value;
    /// Interpret the `data` object of a successful response. `Err` means
    /// the response shape does not match the query — a permanent,
    /// query-class failure.
    fn parse_page(&self, target: &Target, data: &Value) -> Result<Parsed, String>;
}

/// Terminal state of one target's job. This is the only thing that
/// crosses the scheduler boundary — transient failures are absorbed
/// below it.
#[derive(Debug)]
pub enum JobOutcome {
    Exhausted { rows: usize, pages: usize },
    Failed { kind: FailureKind, detail: String },
}

/// Drive one target to a terminal state.
///
/// Holds the cursor (starting at none), fetches pages through `execute`,
/// appends each non-empty batch to the sink, and advances while the API
/// reports more pages, pacing between requests to stay under burst
/// limits. Page k+1 is never fetched before page k's batch was handed to
/// the sink. An empty page with `has_next` set is legal and continues
/// the loop.
pub fn run_job<E>(
    execute: E,
    query: &dyn PageQuery,
    target: &Target,
    sink: &CsvSink,
    pacing: Duration,
) -> JobOutcome
where
    E: Fn(&str, &str, Value) -> Result<Value, FetchError>,
{
    let label = target.to_string();
    let mut cursor: Option<String> = None;
    let mut rows_total = 0usize;
    let mut pages = 0usize;

    loop {
        let variables = query.variables(target, cursor.as_deref());
        let body = match execute(&label, query.document(), variables) {
            Ok(body) => body,
            Err(FetchError::Query(msg)) => {
                return JobOutcome::Failed {
                    kind: FailureKind::QueryError,
                    detail: msg,
                };
            }
            Err(e @ FetchError::Budget { .. }) => {
                return JobOutcome::Failed {
                    kind: FailureKind::RetriesExhausted,
                    detail: e.to_string(),
                };
            }
        };

        let data = body.get("data").cloned().unwrap_or(Value::Null);
        let page = match query.parse_page(target, &data) {
            Ok(Parsed::Page(page)) => page,
            Ok(Parsed::MissingTarget) => {
                return JobOutcome::Failed {
                    kind: FailureKind::TargetUnavailable,
                    detail: "repository absent or inaccessible".to_string(),
                };
            }
            Ok(Parsed::NothingToHarvest) => {
                log::debug!("{label}: nothing to harvest");
                return JobOutcome::Exhausted {
                    rows: rows_total,
                    pages,
                };
            }
            Err(msg) => {
                return JobOutcome::Failed {
                    kind: FailureKind::QueryError,
                    detail: msg,
                };
            }
        };

        pages += 1;
        if !page.rows.is_empty() {
            let batch_len = page.rows.len();
            if let Err(e) = sink.append(&page.rows) {
                return JobOutcome::Failed {
                    kind: FailureKind::Sink,
                    detail: e.to_string(),
                };
            }
            rows_total += batch_len;
        }

        if page.has_next {
            cursor = page.end_cursor;
            std::thread::sleep(pacing);
        } else {
            return JobOutcome::Exhausted {
                rows: rows_total,
                pages,
            };
        }
    }
}
