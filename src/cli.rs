//! # CLI Execution Functions
//!
//! Kept out of `main.rs` so the entry point only parses arguments and sets up
//! logging. Both commands validate the whole batch before printing anything.

use anyhow::{Context, Result};
use segsieve::{output, query, sample};
use std::io::{Read, Write};
use std::path::Path;
use std::time::Instant;
use tracing::{info, info_span};

use super::Cli;

/// Parse `input` and stream the answer for every test case into `writer`.
fn solve<W: Write>(cli: &Cli, input: &str, writer: W) -> Result<output::BatchSummary> {
    let queries = query::parse_batch(input, cli.variant).context("invalid batch input")?;
    info!(
        cases = queries.len(),
        variant = ?cli.variant,
        reuse_small_primes = cli.reuse_small_primes,
        "batch parsed"
    );
    output::write_batch(
        &queries,
        cli.variant.output_style(),
        cli.reuse_small_primes,
        writer,
    )
}

/// stdin → stdout.
pub fn run_batch(cli: &Cli) -> Result<()> {
    let _span = info_span!("run").entered();

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    let stdout = std::io::stdout();
    solve(cli, &input, stdout.lock())?;
    Ok(())
}

/// Run a sample input, print the output and the elapsed time, and fail if
/// the output differs from `expected_path`.
pub fn run_check(cli: &Cli, input_path: &Path, expected_path: &Path) -> Result<()> {
    let _span = info_span!("check", input = %input_path.display()).entered();

    let input = std::fs::read_to_string(input_path)
        .with_context(|| format!("failed to read {}", input_path.display()))?;
    let expected = std::fs::read_to_string(expected_path)
        .with_context(|| format!("failed to read {}", expected_path.display()))?;

    let start = Instant::now();
    let mut produced = Vec::new();
    solve(cli, &input, &mut produced)?;
    let elapsed = start.elapsed();

    let actual = String::from_utf8(produced).context("sieve output is not UTF-8")?;
    sample::compare_lines(&expected, &actual)
        .with_context(|| format!("output differs from {}", expected_path.display()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    out.write_all(actual.as_bytes())?;
    writeln!(out, "took: {}", sample::format_elapsed(elapsed))?;
    out.flush()?;
    Ok(())
}
