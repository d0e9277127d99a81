//! spaceback CLI - Confluence space backup and publishing.
//!
//! Provides commands for:
//! - `export`: Back up a space as a static HTML archive
//! - `space create`: Create a space from the project template
//! - `page create|update|get`: Publish and inspect pages
//! - `blog create`: Publish blog posts

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BlogCommand, ExportArgs, PageCommand, SpaceCommand};
use output::Output;

/// spaceback - Confluence space backup and publishing.
#[derive(Parser)]
#[command(name = "spaceback", version, about)]
struct Cli {
    /// Log every remote call and written item.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a space to a static HTML archive.
    Export(ExportArgs),
    /// Space commands.
    #[command(subcommand)]
    Space(SpaceCommand),
    /// Page commands.
    #[command(subcommand)]
    Page(PageCommand),
    /// Blog post commands.
    #[command(subcommand)]
    Blog(BlogCommand),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Export(args) => args.execute(),
        Commands::Space(cmd) => cmd.execute(),
        Commands::Page(cmd) => cmd.execute(),
        Commands::Blog(cmd) => cmd.execute(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}
