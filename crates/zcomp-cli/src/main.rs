//! zcomp CLI - inspect and benchmark compression backends.

#![deny(missing_docs)]
#![deny(clippy::panic)]
#![warn(clippy::all, clippy::pedantic)]

mod commands;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// zcomp: compression backends with pooled work memory
#[derive(Parser)]
#[command(name = "zcomp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "table")]
    format: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List compiled-in compression algorithms
    Available(commands::AvailableArgs),

    /// Run compression benchmarks through a backend
    Benchmark(commands::BenchmarkArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Available(args) => commands::available(&args, cli.format),
        Commands::Benchmark(args) => commands::benchmark(&args, cli.format),
    }
}
