//! # Sieve — Small-Prime Generation and Packed Candidate Bitmaps
//!
//! Leaf infrastructure for the segmented range sieve. Provides:
//!
//! 1. **Small-prime generation** via the classic sieve of Eratosthenes
//!    (`small_primes_below`). The limit is always ≈ sqrt(upper bound) + 1,
//!    so for 32-bit ranges the table never exceeds ~46k entries.
//! 2. **Exact integer square root** (`isqrt`), corrected after the f64
//!    estimate so block widths never drift by one near perfect squares.
//! 3. **`BitSieve`**, the packed survivor bitmap used for every block.
//! 4. **Trial-division primality** (`is_prime`) for single values that sit
//!    outside the sieved window (the `i32::MAX` endpoint).
//!
//! ## Algorithm: Sieve of Eratosthenes
//!
//! Start with every index marked prime. For each i with i² < limit that is
//! still marked, clear i², i² + i, … below the limit. Complexity:
//! O(L log log L) time, O(L/64) words of space.

/// Floor of the square root of `n`.
///
/// The f64 estimate can be off by one for large inputs; it is nudged until
/// `r² ≤ n < (r + 1)²` holds exactly.
pub fn isqrt(n: u64) -> u64 {
    let mut r = (n as f64).sqrt() as u64;
    while r.checked_mul(r).is_none_or(|sq| sq > n) {
        r -= 1;
    }
    while (r + 1).checked_mul(r + 1).is_some_and(|sq| sq <= n) {
        r += 1;
    }
    r
}

/// Generate all primes `p` with `2 <= p < limit`, in increasing order.
///
/// Returns an empty list for `limit <= 2`.
pub fn small_primes_below(limit: u64) -> Vec<u64> {
    if limit <= 2 {
        return vec![];
    }

    let len = limit as usize;
    let mut candidates = BitSieve::new_all_set(len);

    let mut i = 2usize;
    while i * i < len {
        if candidates.get(i) {
            let mut j = i * i;
            while j < len {
                candidates.clear(j);
                j += i;
            }
        }
        i += 1;
    }

    let mut primes = Vec::with_capacity(estimate_prime_count(len));
    primes.extend(
        candidates
            .iter_set_bits()
            .filter(|&n| n >= 2)
            .map(|n| n as u64),
    );
    primes
}

/// Small primes sufficient to sieve every composite below `to_exclusive`:
/// all primes ≤ sqrt(to_exclusive).
pub fn small_primes_for(to_exclusive: u64) -> Vec<u64> {
    small_primes_below(isqrt(to_exclusive) + 1)
}

/// Upper-bound estimate of π(n), used only to size the output vector.
fn estimate_prime_count(n: usize) -> usize {
    if n < 10 {
        return 4;
    }
    let nf = n as f64;
    (1.3 * nf / nf.ln()) as usize
}

/// Deterministic trial division, for single values above a sieved window.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n.is_multiple_of(2) || n.is_multiple_of(3) {
        return false;
    }
    let mut d = 5u64;
    while d * d <= n {
        if n.is_multiple_of(d) || n.is_multiple_of(d + 2) {
            return false;
        }
        d += 6;
    }
    true
}

/// Packed bit array for sieve results.
///
/// 8× smaller than `Vec<bool>`: a block for a bound near 2^31 is ~46k bits,
/// under 6 KB, so it stays in L1 while the small primes sweep over it.
///
/// Bit layout: bit `i` is stored in word `i / 64`, bit position `i % 64`.
/// A set bit (1) means the candidate **survives**; a clear bit (0) means a
/// small prime divides it.
pub struct BitSieve {
    words: Vec<u64>,
    len: usize,
}

impl BitSieve {
    /// Create a sieve of `len` bits, all set to 1 (all candidates survive).
    pub fn new_all_set(len: usize) -> Self {
        let num_words = len.div_ceil(64);
        let mut words = vec![u64::MAX; num_words];
        let extra = num_words * 64 - len;
        if extra > 0 {
            words[num_words - 1] >>= extra;
        }
        BitSieve { words, len }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if bit `index` is set.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        debug_assert!(
            index < self.len,
            "BitSieve index out of bounds: {} >= {}",
            index,
            self.len
        );
        self.words[index / 64] & (1u64 << (index % 64)) != 0
    }

    /// Clear bit `index` (candidate eliminated).
    #[inline]
    pub fn clear(&mut self, index: usize) {
        debug_assert!(index < self.len);
        self.words[index / 64] &= !(1u64 << (index % 64));
    }

    /// Number of surviving candidates.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Indices of all set bits, ascending.
    pub fn iter_set_bits(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &word)| BitIter {
            word,
            base: wi * 64,
        })
    }

    /// Consume the sieve, yielding the indices of set bits in ascending order.
    pub fn into_set_bits(self) -> IntoSetBits {
        IntoSetBits {
            words: self.words.into_iter(),
            word: 0,
            base: 0,
            next_base: 0,
        }
    }
}

/// Owning counterpart of `iter_set_bits`; skips zero words whole.
pub struct IntoSetBits {
    words: std::vec::IntoIter<u64>,
    word: u64,
    base: usize,
    next_base: usize,
}

impl Iterator for IntoSetBits {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        while self.word == 0 {
            self.word = self.words.next()?;
            self.base = self.next_base;
            self.next_base += 64;
        }
        let tz = self.word.trailing_zeros() as usize;
        self.word &= self.word - 1;
        Some(self.base + tz)
    }
}

/// Set bits within a single u64 word.
struct BitIter {
    word: u64,
    base: usize,
}

impl Iterator for BitIter {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.word == 0 {
            return None;
        }
        let tz = self.word.trailing_zeros() as usize;
        self.word &= self.word - 1; // clear lowest set bit
        Some(self.base + tz)
    }
}
