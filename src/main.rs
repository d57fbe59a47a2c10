mod chunking;
mod cli;
mod commands;
mod config;
mod dataset;
mod model;
mod reassembly;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, RunMode};
use crate::config::PipelineConfig;

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mode = cli.run_mode();
    let config = PipelineConfig::from_cli(&cli)?;

    info!(mode = mode.as_str(), work_dir = %cli.work_dir.display(), "selected run mode");
    if !cli.ignored.is_empty() {
        debug!(ignored = ?cli.ignored, "ignoring arguments after the mode");
    }

    match mode {
        RunMode::Prepare => commands::prepare::run(&config),
        RunMode::ProcessSummaries => commands::assemble::run(&config),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
