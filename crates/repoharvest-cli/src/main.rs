//! repoharvest - GitHub repository metadata harvester
//!
//! Streams pull requests, commit history, and issues for a list of
//! repositories into append-only CSVs, rotating API tokens and retrying
//! transient failures along the way.

use std::process::ExitCode;
use std::sync::atomic::Ordering;

use clap::Parser;
use repoharvest_core::{init_logging, shutdown_flag};
use repoharvest_github::{Cli, Config};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);
    setup_signal_handler();

    let config = match Config::try_from(cli) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Configuration error: {e:#}");
            return ExitCode::from(2);
        }
    };

    match repoharvest_github::run(&config) {
        Ok(code) => code,
        Err(e) => {
            log::error!("Fatal error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn setup_signal_handler() {
    // First signal: set graceful shutdown flag
    // Second signal: force exit
    // SAFETY: AtomicBool::swap and process::exit are async-signal-safe
    unsafe {
        signal_hook::low_level::register(signal_hook::consts::SIGTERM, || {
            if shutdown_flag().swap(true, Ordering::Relaxed) {
                std::process::exit(130);
            }
        })
        .expect("Failed to register SIGTERM handler");
        signal_hook::low_level::register(signal_hook::consts::SIGINT, || {
            if shutdown_flag().swap(true, Ordering::Relaxed) {
                std::process::exit(130);
            }
        })
        .expect("Failed to register SIGINT handler");
    }
}
