#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod pipeline;

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use weft_oozie::generation_timestamp;

use crate::config::Cli;
use crate::pipeline::{Batch, load_config};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "weft_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "weft_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "weft_cli::config";
pub const TRACING_TARGET_PIPELINE: &str = "weft_cli::pipeline";

fn main() {
    let Err(error) = run() else {
        tracing::info!(
            target: TRACING_TARGET_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        let message = format!("{error:#}");
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %message,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing();
    log_startup_info();
    cli.log();

    let config = load_config(cli.config_sources())?;
    let timestamp = generation_timestamp();
    let batch = Batch {
        config: &config,
        output: &cli.output,
        graphviz: cli.graphviz.as_deref(),
        timestamp: &timestamp,
    };
    let written = batch.run(&cli.input)?;

    tracing::info!(
        target: TRACING_TARGET_PIPELINE,
        workflows = written.len(),
        output = %cli.output.display(),
        "batch complete"
    );

    Ok(())
}

/// Initializes tracing with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Logs startup information.
fn log_startup_info() {
    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting weft"
    );

    tracing::debug!(
        target: TRACING_TARGET_STARTUP,
        pid = process::id(),
        arch = std::env::consts::ARCH,
        os = std::env::consts::OS,
        "build information"
    );
}
