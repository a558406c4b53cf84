//! # Main — CLI Entry Point
//!
//! Reads a batch of `[m, n]` queries from stdin and prints every prime in
//! each range to stdout. The `check` subcommand replays a sample input and
//! compares the result with an expected-output file.
//!
//! ## Global Options
//!
//! - `--variant` / `SEGSIEVE_VARIANT`: `prime1` (n ≤ 10^9, blank line after
//!   each case) or `print` (n ≤ 2^31 − 1, no separators).
//! - `--reuse-small-primes` / `SEGSIEVE_REUSE_SMALL_PRIMES`: sieve the small
//!   primes once per batch instead of once per query.
//!
//! Logs go to stderr only. `LOG_FORMAT=json` switches to JSON lines and
//! `RUST_LOG` sets the filter (default `warn`).

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use segsieve::Variant;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "segsieve", about = "List the primes in bounded ranges [m, n]")]
struct Cli {
    /// Input/output protocol: prime1 (n <= 10^9, blank line between cases) or print (n <= 2^31-1)
    #[arg(long, global = true, env = "SEGSIEVE_VARIANT", value_enum, default_value = "prime1")]
    variant: Variant,

    /// Sieve the small primes once for the whole batch instead of per test case
    #[arg(long, global = true, env = "SEGSIEVE_REUSE_SMALL_PRIMES")]
    reuse_small_primes: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read test cases from stdin and print the primes to stdout (default)
    Run,
    /// Run a sample input and compare against its expected output
    Check {
        /// Sample input file
        #[arg(long)]
        input: PathBuf,
        /// Expected output file
        #[arg(long)]
        expected: PathBuf,
    },
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Structured logging on stderr: LOG_FORMAT=json for log shippers, human-readable otherwise
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();

    match &cli.command {
        None | Some(Commands::Run) => cli::run_batch(&cli),
        Some(Commands::Check { input, expected }) => cli::run_check(&cli, input, expected),
    }
}
