//! repoharvest core - generic harvesting engine
//!
//! Reusable machinery for pulling large, paginated result sets out of a
//! rate-limited GraphQL API and persisting every page as it arrives:
//! round-robin token rotation, a retrying request executor, a
//! cursor-pagination loop, an append-only CSV sink, and a bounded
//! worker-pool scheduler. Entity specifics (query documents, row
//! projection) are injected through [`PageQuery`].

pub mod client;
pub mod error;
pub mod http;
pub mod logging;
pub mod page;
pub mod queue;
pub mod retry;
pub mod scheduler;
pub mod sink;
pub mod token;

// Re-exports for convenience
pub use client::GraphQlClient;
pub use error::{FailureKind, FetchError};
pub use logging::init_logging;
pub use page::{JobOutcome, Page, PageQuery, Parsed, Target, run_job};
pub use retry::{Attempt, RetryPolicy, run_with_retry};
pub use scheduler::{
    HarvestSummary, request_shutdown, run_all, shutdown_flag, shutdown_requested,
};
pub use sink::{CsvSink, Row};
pub use token::TokenPool;
