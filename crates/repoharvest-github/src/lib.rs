//! repoharvest GitHub adapters
//!
//! Instantiates the generic harvesting engine for the GitHub GraphQL
//! API: one query-and-projection strategy per entity (pull requests,
//! commit history, issues), target-list loading, configuration, and the
//! per-entity run orchestration.

pub mod cli;
pub mod config;
pub mod entity;
pub mod query;
pub mod runner;
pub mod targets;
pub mod transform;

// Re-exports
pub use cli::Cli;
pub use config::Config;
pub use entity::Entity;
pub use query::GithubQuery;
pub use runner::run;
