//! CLI argument definitions (clap derive)

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "repoharvest",
    about = "Harvest repository metadata from the GitHub GraphQL API into CSV",
    version
)]
pub struct Cli {
    /// CSV listing the repositories to harvest (owner,repo columns)
    #[arg(long)]
    pub input: PathBuf,

    /// Comma-separated entities to harvest
    #[arg(
        long,
        default_value = "pull-requests,commits,issues",
        value_delimiter = ','
    )]
    pub entities: Vec<String>,

    /// Output directory for the per-entity CSVs
    #[arg(long, default_value = "./outputs")]
    pub output_dir: PathBuf,

    /// Number of concurrent harvest jobs
    #[arg(long, default_value_t = 5)]
    pub workers: usize,

    /// Max targets to harvest (for testing)
    #[arg(long)]
    pub max_targets: Option<usize>,

    /// GraphQL endpoint
    #[arg(long, default_value = "https://api.github.com/graphql")]
    pub endpoint: String,

    /// Maximum attempts per request
    #[arg(long, default_value_t = 5)]
    pub max_attempts: u32,

    /// Suppress info logs (only warnings and errors)
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
