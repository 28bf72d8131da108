//! Quire CLI - content collections.
//!
//! Provides commands for:
//! - `check`: Load every configured collection and report its contents
//! - `routes`: Print the route table with rendering contexts as JSON
//! - `paginate`: Print a pagination window as JSON

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CheckArgs, PaginateArgs, RoutesArgs};
use output::Output;

/// Quire - content collections.
#[derive(Parser)]
#[command(name = "quire", version, about)]
struct Cli {
    /// Enable verbose output (show collection loading logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load all collections and report counts.
    Check(CheckArgs),
    /// Print routes and rendering contexts as JSON.
    Routes(RoutesArgs),
    /// Print a pagination window as JSON.
    Paginate(PaginateArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Check(args) => args.execute(),
        Commands::Routes(args) => args.execute(),
        Commands::Paginate(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
