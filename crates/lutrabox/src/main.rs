//! Lutrabox CLI - interactive try-it widgets for documentation pages.
//!
//! Provides commands for:
//! - `build`: Add widget markup to a page
//! - `run`: Submit one region of a page to the processing endpoint

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, RunArgs};
use output::Output;

/// Lutrabox - interactive try-it widgets for documentation pages.
#[derive(Parser)]
#[command(name = "lutrabox", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build widget markup for every region on a page.
    Build(BuildArgs),
    /// Build a page and submit one of its regions.
    Run(RunArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::Build(args) => args.verbose,
        Commands::Run(args) => args.verbose,
    };

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Run(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
