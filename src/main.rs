//! kiln - front-end asset pipeline with a live-reloading preview server.

mod cli;
mod config;
mod core;
mod embed;
mod logger;
mod paths;
mod pipeline;
mod reload;
mod serve;
mod task;
mod utils;
mod watch;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::KilnConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = KilnConfig::load(&cli)?;
    if let Some(path) = &config.config_path {
        debug!("config"; "using {}", path.display());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    let result = runtime.block_on(task::run(&config, &cli.task));

    // Timed-out stages may still occupy blocking threads
    runtime.shutdown_timeout(Duration::from_secs(1));
    result
}
