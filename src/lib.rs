//! Segmented sieve of Eratosthenes for bounded prime ranges.
//!
//! Lists every prime in `[m, n]` for `n` up to 2^31 − 1 and `n − m` up to
//! 100,000, using memory proportional to sqrt(n) rather than n.
//!
//! - [`sieve`]: small-prime table, integer square root, packed bitmaps.
//! - [`segmented`]: the lazy block sweep over `[from, to)`.
//! - [`query`]: validated `[m, n]` queries and the batch input protocol.
//! - [`output`]: streaming batch writer and the shared small-prime cache.
//! - [`sample`]: expected-output comparison and timing for `check`.

pub mod output;
pub mod query;
pub mod sample;
pub mod segmented;
pub mod sieve;

pub use query::{parse_batch, RangeQuery, Variant};
pub use segmented::{primes_in_range, SegmentedSieve};
pub use sieve::small_primes_below;
