//! Runtime configuration

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use repoharvest_core::RetryPolicy;

use crate::cli::Cli;
use crate::entity::Entity;

/// Environment variable holding the comma-separated API token pool.
pub const TOKENS_ENV: &str = "GITHUB_TOKENS";

/// Delay between consecutive page requests of one target, to stay under
/// burst limits.
const PAGE_PACING: Duration = Duration::from_secs(1);

/// Validated runtime configuration.
#[derive(Debug)]
pub struct Config {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub entities: Vec<Entity>,
    pub workers: usize,
    pub max_targets: Option<usize>,
    pub endpoint: String,
    pub tokens: Vec<String>,
    pub policy: RetryPolicy,
    pub pacing: Duration,
}

impl TryFrom<Cli> for Config {
    type Error = anyhow::Error;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let entities = parse_entities(&cli.entities)?;
        anyhow::ensure!(
            cli.input.exists(),
            "Input file does not exist: {}",
            cli.input.display()
        );
        anyhow::ensure!(cli.workers > 0, "--workers must be at least 1");
        let tokens = read_tokens()?;

        Ok(Self {
            input: cli.input,
            output_dir: cli.output_dir,
            entities,
            workers: cli.workers,
            max_targets: cli.max_targets,
            endpoint: cli.endpoint,
            tokens,
            policy: RetryPolicy {
                max_attempts: cli.max_attempts,
                ..RetryPolicy::default()
            },
            pacing: PAGE_PACING,
        })
    }
}

fn parse_entities(names: &[String]) -> anyhow::Result<Vec<Entity>> {
    let entities: Vec<Entity> = names
        .iter()
        .map(|s| Entity::from_name(s).with_context(|| format!("Unknown entity: {s}")))
        .collect::<anyhow::Result<_>>()?;
    anyhow::ensure!(!entities.is_empty(), "At least one entity is required");
    Ok(entities)
}

/// Read the token pool from the environment. Token acquisition and
/// validation stay outside this tool.
fn read_tokens() -> anyhow::Result<Vec<String>> {
    let raw = std::env::var(TOKENS_ENV)
        .with_context(|| format!("{TOKENS_ENV} environment variable required"))?;
    let tokens: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    anyhow::ensure!(!tokens.is_empty(), "{TOKENS_ENV} is set but holds no tokens");
    Ok(tokens)
}
