//! Main execution logic: one scheduler run per requested entity

use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use repoharvest_core::{CsvSink, GraphQlClient, TokenPool, run_all, shutdown_requested};

use crate::config::Config;
use crate::query::GithubQuery;
use crate::targets::load_targets;

/// Run the harvest. Returns exit code 0 when every target of every entity
/// exhausted, 1 when any target failed, 130 on shutdown request.
pub fn run(config: &Config) -> anyhow::Result<ExitCode> {
    std::fs::create_dir_all(&config.output_dir).context("Cannot create output directory")?;

    let targets = load_targets(&config.input, config.max_targets)?;
    let tokens = TokenPool::new(config.tokens.clone()).context("Token pool cannot be empty")?;
    log::info!(
        "repoharvest starting: {} targets, {} tokens, {} workers, entities={:?}",
        targets.len(),
        tokens.len(),
        config.workers,
        config.entities
    );
    let client = GraphQlClient::new(&config.endpoint, tokens, config.policy.clone());

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build()
        .context("Failed to create thread pool")?;

    let mut any_failed = false;
    for &entity in &config.entities {
        let path = config.output_dir.join(format!("{}.csv", entity.file_prefix()));
        let sink = CsvSink::open(&path, entity.columns())
            .with_context(|| format!("Cannot open {}", path.display()))?;
        let query = GithubQuery::new(entity);
        log::info!("{entity}: harvesting into {}", path.display());

        let start = Instant::now();
        let summary = pool.install(|| {
            run_all(
                targets.clone(),
                |label, document, variables| client.execute(label, document, variables),
                &query,
                &sink,
                config.workers,
                config.pacing,
            )
        });
        log::info!(
            "{entity}: {} targets, {} exhausted, {} failed, {} rows ({} pages) in {:.0?}",
            summary.targets,
            summary.completed,
            summary.failed,
            summary.rows,
            summary.pages,
            start.elapsed()
        );
        for (target, reason) in &summary.failures {
            log::warn!("{entity}: {target} failed: {reason}");
        }

        if shutdown_requested() {
            log::warn!("Shutdown requested, stopping after {entity}");
            return Ok(ExitCode::from(130));
        }
        if summary.failed > 0 {
            any_failed = true;
        }
    }

    log::info!("repoharvest completed");
    Ok(if any_failed {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}
