//! Bounded worker pool running one harvest job per target

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::Value;

use crate::error::FetchError;
use crate::page::{self, JobOutcome, PageQuery, Target};
use crate::queue::WorkQueue;
use crate::sink::CsvSink;

/// Global shutdown flag — set by the SIGTERM/SIGINT handler.
pub fn shutdown_flag() -> &'static AtomicBool {
    static FLAG: AtomicBool = AtomicBool::new(false);
    &FLAG
}

pub fn shutdown_requested() -> bool {
    shutdown_flag().load(Ordering::Relaxed)
}

/// Request shutdown (for signal handlers). Workers finish their in-flight
/// target and stop claiming new ones.
pub fn request_shutdown() {
    shutdown_flag().store(true, Ordering::Relaxed);
}

/// Aggregated terminal outcomes of one scheduler run.
#[derive(Debug, Default)]
pub struct HarvestSummary {
    pub targets: usize,
    pub completed: usize,
    pub failed: usize,
    pub rows: usize,
    pub pages: usize,
    /// `(target, reason)` for every failed job.
    pub failures: Vec<(String, String)>,
}

/// Run every target to a terminal state with at most `workers` jobs in
/// flight, blocking until all are done.
///
/// Workers claim targets from an atomic queue and run each job to
/// completion before taking the next, so a target is never paginated
/// concurrently. One target's failure never cancels another's job; the
/// outcome is aggregated and the run carries on.
pub fn run_all<E>(
    targets: Vec<Target>,
    execute: E,
    query: &dyn PageQuery,
    sink: &CsvSink,
    workers: usize,
    pacing: Duration,
) -> HarvestSummary
where
    E: Fn(&str, &str, Value) -> Result<Value, FetchError> + Sync,
{
    let queue = WorkQueue::new(targets);
    let total = queue.len();
    let completed = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let rows = AtomicUsize::new(0);
    let pages = AtomicUsize::new(0);
    let failures: Mutex<Vec<(String, String)>> = Mutex::new(Vec::new());

    rayon::scope(|s| {
        for _ in 0..workers.max(1) {
            s.spawn(|_| {
                while let Some(target) = queue.claim() {
                    if shutdown_requested() {
                        break;
                    }
                    log::info!("{target}: harvesting");
                    match page::run_job(&execute, query, target, sink, pacing) {
                        JobOutcome::Exhausted { rows: n, pages: p } => {
                            log::info!("{target}: exhausted after {p} pages ({n} rows)");
                            completed.fetch_add(1, Ordering::Relaxed);
                            rows.fetch_add(n, Ordering::Relaxed);
                            pages.fetch_add(p, Ordering::Relaxed);
                        }
                        JobOutcome::Failed { kind, detail } => {
                            log::error!("{target}: failed ({kind}): {detail}");
                            failed.fetch_add(1, Ordering::Relaxed);
                            failures
                                .lock()
                                .expect("worker thread panicked")
                                .push((target.to_string(), format!("{kind}: {detail}")));
                        }
                    }
                }
            });
        }
    });

    HarvestSummary {
        targets: total,
        completed: completed.into_inner(),
        failed: failed.into_inner(),
        rows: rows.into_inner(),
        pages: pages.into_inner(),
        failures: failures.into_inner().expect("worker thread panicked"),
    }
}
