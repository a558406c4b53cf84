//! # Sample — Expected-Output Verification and Timing
//!
//! Backs the `check` subcommand: run a batch from a sample input, compare
//! the produced lines with an expected-output file, and report how long the
//! run took in the unit that keeps the number readable.

use std::time::Duration;

/// First difference between expected and actual output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// Line `line` (1-based) differs.
    Line {
        line: usize,
        expected: String,
        actual: String,
    },
    /// One side ran out of lines first.
    Length { expected: usize, actual: usize },
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mismatch::Line {
                line,
                expected,
                actual,
            } => write!(
                f,
                "line {}: expected {:?}, got {:?}",
                line, expected, actual
            ),
            Mismatch::Length { expected, actual } => write!(
                f,
                "expected {} lines, got {}",
                expected, actual
            ),
        }
    }
}

impl std::error::Error for Mismatch {}

/// Split into lines, tolerating `\r\n`. Trailing empty lines are dropped,
/// so a final blank case separator is optional on either side; blank
/// separators between cases are still compared.
fn lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.lines().collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Compare two outputs line by line.
pub fn compare_lines(expected: &str, actual: &str) -> Result<(), Mismatch> {
    let expected = lines(expected);
    let actual = lines(actual);

    if let Some((idx, (e, a))) = expected
        .iter()
        .zip(actual.iter())
        .enumerate()
        .find(|(_, (e, a))| e != a)
    {
        return Err(Mismatch::Line {
            line: idx + 1,
            expected: e.to_string(),
            actual: a.to_string(),
        });
    }
    if expected.len() != actual.len() {
        return Err(Mismatch::Length {
            expected: expected.len(),
            actual: actual.len(),
        });
    }
    Ok(())
}

/// Render an elapsed time as `µs`, `ms` or `s` with three decimals.
pub fn format_elapsed(elapsed: Duration) -> String {
    let micros = elapsed.as_micros();
    if micros < 1_000 {
        format!("{:.3} µs", micros as f64)
    } else if micros < 1_000_000 {
        format!("{:.3} ms", micros as f64 / 1_000.0)
    } else {
        format!("{:.3} s", micros as f64 / 1_000_000.0)
    }
}
