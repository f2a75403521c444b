mod cli;
mod commands;
mod config;
mod error;

use crate::{
    cli::{Args, Commands},
    config::AppConfig,
    error::{AppError, Result},
};
use clap::Parser;
use std::process;
use tracing::{Level, debug, error};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

fn main() {
    if let Err(e) = run() {
        error!("Application error: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet)?;

    // Load configuration
    let config = AppConfig::load(args.config.as_deref())?;
    debug!("Loaded configuration: {:?}", config);

    match args.command {
        Commands::Apply(apply) => commands::apply(&config, &apply),
        Commands::Inspect { input, json } => commands::inspect(&input, json),
    }
}

/// Logs go to stderr so stdout carries only the manifest.
fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .with(filter)
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))?;

    Ok(())
}
