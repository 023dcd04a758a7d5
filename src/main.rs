//! Lume - a live LaTeX compile-and-preview engine.

#![allow(dead_code)]

mod actor;
mod artifact;
mod cli;
mod compile;
mod config;
mod core;
mod error;
mod export;
mod logger;
mod outline;
mod render;
mod session;
mod workspace;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::PreviewConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    let shutdown_rx = core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = PreviewConfig::load(&cli.config)?;

    match &cli.command {
        Commands::Preview {
            file,
            debounce_ms,
            no_initial,
        } => cli::preview::run(config, file, *debounce_ms, *no_initial, shutdown_rx),
        Commands::Build { file, output } => cli::build::run(&config, file, output.as_deref()),
        Commands::Outline { file, pretty } => cli::outline::run(file, *pretty),
    }
}
