//! # Segmented — Block-by-Block Range Sieve
//!
//! Enumerates the primes of a half-open window `[from, to)` without ever
//! allocating an array sized to `to`. The small primes below
//! `seg_width = isqrt(to) + 1` are emitted directly; everything from
//! `seg_width` upward is swept in blocks of `seg_width` integers, each
//! block marked by every small prime and then scanned for survivors.
//!
//! ## Algorithm
//!
//! ```text
//! low = seg_width, high = min(2 * seg_width, to)
//! while low < to:
//!     if high >= from:                  // block touches the window
//!         mark multiples of each small prime in [low, high)
//!         yield survivors that lie in [from, to)
//!     low += seg_width; high = min(to, high + seg_width)
//! ```
//!
//! Every composite below `to` has a prime factor ≤ isqrt(to) < seg_width,
//! so a block survivor is prime. Blocks start at `seg_width >= 2`, so 0 and
//! 1 never appear as candidates.
//!
//! All block arithmetic is u64: with `to` up to 2^31 the products
//! `low / p * p` and `high + seg_width` stay far from overflow, and the
//! yielded values always fit in 32 bits.
//!
//! The sweep is lazy: `SegmentedSieve` is an `Iterator` holding at most one
//! block (`seg_width + 1` bits), so memory is O(sqrt(to)) regardless of how
//! many primes the window contains.

use tracing::trace;

use crate::sieve::{self, BitSieve, IntoSetBits};

/// One block of the sweep: the half-open interval `[low, high)` and its
/// survivor bitmap indexed by `value - low`.
pub struct Block {
    low: u64,
    high: u64,
    marks: BitSieve,
}

impl Block {
    /// Sieve `[low, high)` with `small_primes`. `capacity` is the bitmap
    /// size and must be at least `high - low`.
    pub fn mark(low: u64, high: u64, small_primes: &[u64], capacity: usize) -> Self {
        debug_assert!(low <= high);
        debug_assert!((high - low) as usize <= capacity);

        let mut marks = BitSieve::new_all_set(capacity);
        for &p in small_primes {
            let mut start = low / p * p;
            if start < low {
                start += p;
            }
            let mut j = start;
            while j < high {
                marks.clear((j - low) as usize);
                j += p;
            }
        }
        Block { low, high, marks }
    }

    /// Consume the block, yielding the values in `[low, high)` not divisible
    /// by any small prime, ascending.
    pub fn into_survivors(self) -> Survivors {
        Survivors {
            low: self.low,
            width: (self.high - self.low) as usize,
            bits: self.marks.into_set_bits(),
        }
    }
}

/// Survivors of one block. Bits past `high - low` in the bitmap are never
/// members of the block.
pub struct Survivors {
    low: u64,
    width: usize,
    bits: IntoSetBits,
}

impl Iterator for Survivors {
    type Item = u64;

    #[inline]
    fn next(&mut self) -> Option<u64> {
        let offset = self.bits.next()?;
        if offset < self.width {
            Some(self.low + offset as u64)
        } else {
            self.width = 0;
            None
        }
    }
}

/// Lazy iterator over the primes of `[from, to)`.
pub struct SegmentedSieve<'a> {
    from: u64,
    to: u64,
    ceiling: u64,
    small_primes: &'a [u64],
    seg_width: u64,
    /// Position in `small_primes` during the direct-emission phase.
    next_small: usize,
    low: u64,
    high: u64,
    /// Survivors of the current block, not yet checked against the window.
    survivors: Option<Survivors>,
}

impl<'a> SegmentedSieve<'a> {
    /// Sweep `[from, to)`.
    ///
    /// `small_primes` must contain every prime ≤ sqrt(to), in increasing
    /// order; entries at or above `isqrt(to) + 1` are ignored. A window with
    /// `from >= to` yields nothing.
    pub fn new(from: u64, to: u64, small_primes: &'a [u64]) -> Self {
        let seg_width = sieve::isqrt(to) + 1;
        let small_primes = &small_primes[..small_primes.partition_point(|&p| p < seg_width)];
        debug_assert!(
            small_primes.windows(2).all(|w| w[0] < w[1]),
            "small primes must be strictly increasing"
        );

        SegmentedSieve {
            from,
            to,
            ceiling: u64::MAX,
            small_primes,
            seg_width,
            next_small: 0,
            low: seg_width,
            high: seg_width.saturating_mul(2).min(to),
            survivors: None,
        }
    }

    /// Never yield values above `ceiling`. Used by the 32-bit query layer to
    /// keep output within `i32::MAX`.
    pub fn with_ceiling(mut self, ceiling: u64) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// Width of every block (and the exclusive bound of the small primes).
    pub fn seg_width(&self) -> u64 {
        self.seg_width
    }

    #[inline]
    fn in_window(&self, value: u64) -> bool {
        value >= self.from && value < self.to && value <= self.ceiling
    }

    /// Sieve the next block that overlaps the window, or return `false` once
    /// the sweep has passed `to`.
    fn advance_block(&mut self) -> bool {
        while self.low < self.to {
            let (low, high) = (self.low, self.high);
            self.low += self.seg_width;
            self.high = self.to.min(high + self.seg_width);

            if high < self.from {
                continue;
            }

            trace!(low, high, "sieving block");
            let capacity = (self.seg_width + 1) as usize;
            let block = Block::mark(low, high, self.small_primes, capacity);
            self.survivors = Some(block.into_survivors());
            return true;
        }
        false
    }
}

impl Iterator for SegmentedSieve<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        while self.next_small < self.small_primes.len() {
            let p = self.small_primes[self.next_small];
            self.next_small += 1;
            if self.in_window(p) {
                return Some(p);
            }
        }

        loop {
            if let Some(survivors) = &mut self.survivors {
                for value in survivors.by_ref() {
                    if value >= self.from && value < self.to && value <= self.ceiling {
                        return Some(value);
                    }
                }
                self.survivors = None;
            }
            if !self.advance_block() {
                return None;
            }
        }
    }
}

/// Collect the primes of `[from, to)`, generating the small primes first.
pub fn primes_in_range(from: u64, to: u64) -> Vec<u64> {
    let small = sieve::small_primes_for(to);
    SegmentedSieve::new(from, to, &small).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Trial-division oracle.
    fn brute_force(from: u64, to: u64) -> Vec<u64> {
        (from..to).filter(|&n| sieve::is_prime(n)).collect()
    }

    #[test]
    fn primes_in_range_tiny_windows() {
        assert_eq!(primes_in_range(2, 3), vec![2]);
        assert_eq!(primes_in_range(1, 10), vec![2, 3, 5, 7]);
        assert_eq!(primes_in_range(1, 1), Vec::<u64>::new());
        assert_eq!(primes_in_range(0, 2), Vec::<u64>::new());
        assert_eq!(primes_in_range(0, 3), vec![2]);
        assert_eq!(primes_in_range(4, 5), Vec::<u64>::new());
        assert_eq!(primes_in_range(5, 6), vec![5]);
    }

    #[test]
    fn primes_in_range_inverted_window_is_empty() {
        assert_eq!(primes_in_range(100, 50), Vec::<u64>::new());
    }

    #[test]
    fn primes_in_range_matches_brute_force_low() {
        for to in 0..300u64 {
            for from in [0, 1, 2, 3, to / 3, to / 2, to.saturating_sub(1)] {
                assert_eq!(
                    primes_in_range(from, to),
                    brute_force(from, to),
                    "from={}, to={}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn primes_in_range_full_sweep_count() {
        // π(100_000) = 9592, swept from the very bottom
        assert_eq!(primes_in_range(1, 100_001).len(), 9_592);
    }

    #[test]
    fn primes_in_range_near_one_billion() {
        let primes = primes_in_range(999_999_900, 1_000_000_001);
        assert_eq!(primes, vec![999_999_929, 999_999_937]);
    }

    #[test]
    fn primes_in_range_top_of_i32() {
        let primes = primes_in_range(2_147_483_546, 2_147_483_648);
        assert_eq!(
            primes,
            vec![
                2_147_483_549,
                2_147_483_563,
                2_147_483_579,
                2_147_483_587,
                2_147_483_629,
                2_147_483_647
            ]
        );
    }

    #[test]
    fn ceiling_cuts_off_values_above_it() {
        let small = sieve::small_primes_for(2_147_483_648);
        let primes: Vec<u64> = SegmentedSieve::new(2_147_483_600, 2_147_483_648, &small)
            .with_ceiling(2_147_483_646)
            .collect();
        assert_eq!(primes, vec![2_147_483_629]);
    }

    #[test]
    fn window_straddling_small_primes_and_blocks() {
        // seg_width for 1000 is 32: 29 and 31 come from the small table,
        // 37 and 41 from the first block
        let small = sieve::small_primes_for(1_000);
        let sweep = SegmentedSieve::new(29, 1_000, &small);
        assert_eq!(sweep.seg_width(), 32);
        let head: Vec<u64> = sweep.take_while(|&p| p < 42).collect();
        assert_eq!(head, vec![29, 31, 37, 41]);
    }

    #[test]
    fn extra_small_primes_are_ignored() {
        // Passing a larger table than needed must not drop or duplicate values
        let oversized = sieve::small_primes_below(2_000);
        let primes: Vec<u64> = SegmentedSieve::new(1, 1_000, &oversized).collect();
        assert_eq!(primes, brute_force(1, 1_000));
    }

    #[test]
    fn sweep_is_deterministic() {
        let a = primes_in_range(1_234_567, 1_334_567);
        let b = primes_in_range(1_234_567, 1_334_567);
        assert_eq!(a, b);
        assert!(a.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn block_mark_survivors() {
        let small = [2u64, 3, 5, 7];
        let block = Block::mark(50, 60, &small, 11);
        assert_eq!(block.into_survivors().collect::<Vec<_>>(), vec![53, 59]);
    }

    #[test]
    fn block_survivors_stop_at_high() {
        // Bits past `high - low` stay set in the bitmap but are not members
        let block = Block::mark(10, 12, &[2, 3], 8);
        let mut survivors = block.into_survivors();
        assert_eq!(survivors.next(), Some(11));
        assert_eq!(survivors.next(), None);
        assert_eq!(survivors.next(), None);
    }
}
