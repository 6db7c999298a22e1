//! Target list loading

use std::path::Path;

use anyhow::Context;
use repoharvest_core::Target;
use serde::Deserialize;

#[derive(Deserialize)]
struct TargetRecord {
    owner: String,
    repo: String,
}

/// Load `(owner, repo)` pairs from a CSV with `owner` and `repo` columns,
/// in file order. Extra columns are ignored.
pub fn load_targets(path: &Path, max_targets: Option<usize>) -> anyhow::Result<Vec<Target>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let mut targets = Vec::new();
    for record in reader.deserialize() {
        let record: TargetRecord = record.context("Invalid target row")?;
        targets.push(Target::new(record.owner, record.repo));
    }
    if let Some(max) = max_targets {
        targets.truncate(max);
    }
    anyhow::ensure!(!targets.is_empty(), "No targets found in {}", path.display());
    log::info!("{} targets to harvest", targets.len());
    Ok(targets)
}
