//! # Query — Range Queries and the Batch Input Protocol
//!
//! A batch is a test-case count `T` followed by `T` pairs `m n`, all
//! whitespace separated. Each pair becomes a validated `RangeQuery` over the
//! inclusive interval `[m, n]`.
//!
//! Two protocol variants exist:
//!
//! | Variant  | Upper bound on n | Output between cases |
//! |----------|------------------|----------------------|
//! | `prime1` | 10^9             | blank line           |
//! | `print`  | 2^31 − 1         | nothing              |
//!
//! Validation is all-or-nothing: the first bad token or out-of-contract pair
//! rejects the whole batch, so a caller never prints a partial answer.
//!
//! ## The `i32::MAX` endpoint
//!
//! An inclusive `n = 2^31 − 1` would need an exclusive sweep bound of 2^31.
//! Instead the sweep stops at `i32::MAX` (exclusive) and the endpoint itself
//! is appended after a separate trial-division check.

use crate::output::OutputStyle;
use crate::segmented::SegmentedSieve;
use crate::sieve;

/// Largest value any query may reach: 2^31 − 1.
pub const MAX_VALUE: u64 = i32::MAX as u64;

/// Widest allowed `n − m`.
pub const MAX_WIDTH: u64 = 100_000;

/// Input/output protocol flavor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Variant {
    /// n ≤ 10^9, blank line after each test case.
    Prime1,
    /// n ≤ 2^31 − 1, no separators.
    Print,
}

impl Variant {
    /// Inclusive upper bound on `n`.
    pub fn upper_bound(self) -> u64 {
        match self {
            Variant::Prime1 => 1_000_000_000,
            Variant::Print => MAX_VALUE,
        }
    }

    pub fn output_style(self) -> OutputStyle {
        match self {
            Variant::Prime1 => OutputStyle::Separated,
            Variant::Print => OutputStyle::Compact,
        }
    }
}

/// Errors from parsing or validating a batch. Case numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Input ended before the expected token.
    UnexpectedEof { expected: &'static str, case: usize },
    /// A token that is not a decimal integer.
    Malformed { token: String, case: usize },
    /// `m` below 1.
    LowerBound { case: usize, m: i64 },
    /// `m > n`.
    Inverted { case: usize, m: i64, n: i64 },
    /// `n` above the variant's ceiling.
    UpperBound { case: usize, n: i64, bound: u64 },
    /// `n − m` exceeds `MAX_WIDTH`.
    TooWide { case: usize, m: i64, n: i64 },
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputError::UnexpectedEof { expected, case: 0 } => {
                write!(f, "input ended before {}", expected)
            }
            InputError::UnexpectedEof { expected, case } => {
                write!(f, "input ended before {} of test case {}", expected, case)
            }
            InputError::Malformed { token, case: 0 } => {
                write!(f, "expected a test case count, found {:?}", token)
            }
            InputError::Malformed { token, case } => {
                write!(f, "test case {}: expected an integer, found {:?}", case, token)
            }
            InputError::LowerBound { case, m } => {
                write!(f, "test case {}: m = {} is below 1", case, m)
            }
            InputError::Inverted { case, m, n } => {
                write!(f, "test case {}: m = {} exceeds n = {}", case, m, n)
            }
            InputError::UpperBound { case, n, bound } => {
                write!(f, "test case {}: n = {} exceeds {}", case, n, bound)
            }
            InputError::TooWide { case, m, n } => write!(
                f,
                "test case {}: range [{}, {}] is wider than {}",
                case, m, n, MAX_WIDTH
            ),
        }
    }
}

impl std::error::Error for InputError {}

/// A validated inclusive interval `[m, n]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeQuery {
    m: u64,
    n: u64,
}

impl RangeQuery {
    /// Validate `[m, n]` against the protocol contract for a given upper
    /// bound. `case` is only used for error reporting.
    pub fn new(case: usize, m: i64, n: i64, bound: u64) -> Result<Self, InputError> {
        if m < 1 {
            return Err(InputError::LowerBound { case, m });
        }
        if m > n {
            return Err(InputError::Inverted { case, m, n });
        }
        // m >= 1 and n >= m, so both casts are lossless
        let (mu, nu) = (m as u64, n as u64);
        if nu > bound.min(MAX_VALUE) {
            return Err(InputError::UpperBound {
                case,
                n,
                bound: bound.min(MAX_VALUE),
            });
        }
        if nu - mu > MAX_WIDTH {
            return Err(InputError::TooWide { case, m, n });
        }
        Ok(RangeQuery { m: mu, n: nu })
    }

    pub fn m(&self) -> u64 {
        self.m
    }

    pub fn n(&self) -> u64 {
        self.n
    }

    /// Exclusive end of the segmented sweep. Equal to `n + 1` except at the
    /// `i32::MAX` endpoint, which is checked separately.
    pub fn sweep_end(&self) -> u64 {
        if self.n == MAX_VALUE {
            MAX_VALUE
        } else {
            self.n + 1
        }
    }

    /// Exclusive limit of the small-prime table this query needs.
    pub fn small_prime_limit(&self) -> u64 {
        sieve::isqrt(self.sweep_end()) + 1
    }

    /// Lazily yield the primes of `[m, n]` using a caller-supplied table of
    /// small primes (at least every prime below `small_prime_limit()`).
    pub fn primes_with<'a>(&self, small_primes: &'a [u64]) -> impl Iterator<Item = u64> + 'a {
        let endpoint = (self.n == MAX_VALUE && sieve::is_prime(MAX_VALUE)).then_some(MAX_VALUE);
        SegmentedSieve::new(self.m, self.sweep_end(), small_primes)
            .with_ceiling(MAX_VALUE)
            .chain(endpoint)
    }

    /// Collect the primes of `[m, n]`, generating a fresh small-prime table.
    pub fn primes(&self) -> Vec<u64> {
        let small = sieve::small_primes_below(self.small_prime_limit());
        self.primes_with(&small).collect()
    }
}

/// Parse and validate a whole batch. Fails on the first problem; extra
/// tokens after the last pair are ignored.
pub fn parse_batch(input: &str, variant: Variant) -> Result<Vec<RangeQuery>, InputError> {
    let mut tokens = input.split_ascii_whitespace();

    let count_token = tokens.next().ok_or(InputError::UnexpectedEof {
        expected: "the test case count",
        case: 0,
    })?;
    let count: usize = count_token.parse().map_err(|_| InputError::Malformed {
        token: count_token.to_string(),
        case: 0,
    })?;

    let bound = variant.upper_bound();
    // The count is untrusted; cap the reservation
    let mut queries = Vec::with_capacity(count.min(1_024));
    for case in 1..=count {
        let m = next_int(&mut tokens, "m", case)?;
        let n = next_int(&mut tokens, "n", case)?;
        queries.push(RangeQuery::new(case, m, n, bound)?);
    }
    Ok(queries)
}

fn next_int<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    expected: &'static str,
    case: usize,
) -> Result<i64, InputError> {
    let token = tokens
        .next()
        .ok_or(InputError::UnexpectedEof { expected, case })?;
    token.parse().map_err(|_| InputError::Malformed {
        token: token.to_string(),
        case,
    })
}
