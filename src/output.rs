//! # Output — Streaming Batch Writer
//!
//! Runs every query of a validated batch through the segmented sieve and
//! streams the primes to a writer, one per line. Primes are never collected
//! per case: each is formatted straight into a `BufWriter` as the sweep
//! yields it.
//!
//! By default every query builds its own small-prime table. With
//! `SmallPrimeCache` the batch sieves once, up to the largest limit any
//! query needs, and every query reads a prefix of that table. Output is
//! byte-identical either way.

use std::io::{BufWriter, Write};
use std::time::Instant;

use anyhow::Result;
use tracing::{debug, info};

use crate::query::RangeQuery;
use crate::sieve;

/// How test cases are delimited in the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputStyle {
    /// A blank line after every test case, including the last.
    Separated,
    /// Primes only.
    Compact,
}

/// Totals for one batch run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub cases: usize,
    pub primes: u64,
}

/// Small primes shared across every query of a batch.
pub struct SmallPrimeCache {
    limit: u64,
    primes: Vec<u64>,
}

impl SmallPrimeCache {
    /// Sieve once up to the largest table any of `queries` needs.
    pub fn for_queries(queries: &[RangeQuery]) -> Self {
        let limit = queries
            .iter()
            .map(RangeQuery::small_prime_limit)
            .max()
            .unwrap_or(0);
        SmallPrimeCache {
            limit,
            primes: sieve::small_primes_below(limit),
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Primes below `limit`, which must not exceed the cache's own limit.
    pub fn primes_below(&self, limit: u64) -> &[u64] {
        debug_assert!(
            limit <= self.limit,
            "small-prime cache holds primes below {}, asked for {}",
            self.limit,
            limit
        );
        let end = self.primes.partition_point(|&p| p < limit);
        &self.primes[..end]
    }
}

/// Write the primes of every query to `writer` in `style`.
///
/// With `reuse_small_primes` the small-prime table is computed once for the
/// whole batch instead of once per query.
pub fn write_batch<W: Write>(
    queries: &[RangeQuery],
    style: OutputStyle,
    reuse_small_primes: bool,
    writer: W,
) -> Result<BatchSummary> {
    let start = Instant::now();
    let mut out = BufWriter::new(writer);
    let cache = reuse_small_primes.then(|| SmallPrimeCache::for_queries(queries));
    if let Some(cache) = &cache {
        debug!(limit = cache.limit(), "small-prime cache ready");
    }

    let mut summary = BatchSummary::default();
    for query in queries {
        let owned;
        let small = match &cache {
            Some(cache) => cache.primes_below(query.small_prime_limit()),
            None => {
                owned = sieve::small_primes_below(query.small_prime_limit());
                &owned[..]
            }
        };

        let mut found = 0u64;
        for p in query.primes_with(small) {
            writeln!(out, "{}", p)?;
            found += 1;
        }
        if style == OutputStyle::Separated {
            writeln!(out)?;
        }

        debug!(m = query.m(), n = query.n(), primes = found, "test case done");
        summary.cases += 1;
        summary.primes += found;
    }
    out.flush()?;

    info!(
        cases = summary.cases,
        primes = summary.primes,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "batch complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{parse_batch, Variant};

    fn render(input: &str, variant: Variant, reuse: bool) -> String {
        let queries = parse_batch(input, variant).unwrap();
        let mut buf = Vec::new();
        write_batch(&queries, variant.output_style(), reuse, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn separated_style_single_case() {
        assert_eq!(render("1\n1 10\n", Variant::Prime1, false), "2\n3\n5\n7\n\n");
    }

    #[test]
    fn compact_style_single_case() {
        assert_eq!(render("1\n1 10\n", Variant::Print, false), "2\n3\n5\n7\n");
    }

    #[test]
    fn separated_style_keeps_blank_line_for_empty_case() {
        assert_eq!(
            render("2\n1 10\n3 5\n", Variant::Prime1, false),
            "2\n3\n5\n7\n\n3\n5\n\n"
        );
        assert_eq!(render("2\n8 10\n1 1\n", Variant::Prime1, false), "\n\n");
    }

    #[test]
    fn compact_style_appends_i32_max() {
        let out = render("1\n2147483640 2147483647\n", Variant::Print, false);
        assert_eq!(out, "2147483647\n");
    }

    #[test]
    fn cache_does_not_change_output() {
        let input = "4\n1 100\n999900000 1000000000\n500 600\n2 2\n";
        assert_eq!(
            render(input, Variant::Prime1, true),
            render(input, Variant::Prime1, false)
        );
        let input = "2\n2147383647 2147483647\n7 7\n";
        assert_eq!(
            render(input, Variant::Print, true),
            render(input, Variant::Print, false)
        );
    }

    #[test]
    fn summary_counts_cases_and_primes() {
        let queries = parse_batch("2\n1 10\n11 20\n", Variant::Print).unwrap();
        let summary =
            write_batch(&queries, OutputStyle::Compact, false, std::io::sink()).unwrap();
        assert_eq!(summary, BatchSummary { cases: 2, primes: 8 });
    }

    #[test]
    fn cache_serves_prefixes() {
        let queries = parse_batch("2\n1 10\n1 10000\n", Variant::Prime1).unwrap();
        let cache = SmallPrimeCache::for_queries(&queries);
        assert_eq!(cache.limit(), 101);
        assert_eq!(cache.primes_below(5), &[2, 3]);
        assert_eq!(cache.primes_below(101).len(), 25);
    }

    #[test]
    fn cache_for_empty_batch() {
        let cache = SmallPrimeCache::for_queries(&[]);
        assert_eq!(cache.limit(), 0);
        assert!(cache.primes_below(0).is_empty());
    }
}
