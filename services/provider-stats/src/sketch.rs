//! Count-Min Sketch over provider net fees
//!
//! A fixed-memory counter matrix of `depth` independent hash rows by
//! `width` columns. An update adds a claim line's net fee (in integer
//! cents) to one cell per row; an estimate reads the minimum across rows,
//! which cancels most collision inflation. Collisions can only inflate a
//! cell, so `estimate(npi) >= true_total(npi)` holds at all times.
//!
//! With `width = ceil(e/ε)` and `depth = ceil(ln(1/δ))`, the overestimate
//! is at most `ε × total` with probability `1 − δ`. The defaults
//! (ε = 0.001, δ = 0.01) give width 2719 and depth 5 — roughly 106KB of
//! counters regardless of how many distinct providers the stream carries.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use types::errors::AggregationError;

/// Default error factor: overestimate at most 0.1% of total fees
pub const DEFAULT_EPSILON: f64 = 0.001;
/// Default failure probability: the bound holds with 99% confidence
pub const DEFAULT_DELTA: f64 = 0.01;

/// Bytes per counter cell (u64 cents)
const COUNTER_BYTES: usize = 8;

/// Fixed-memory sum sketch keyed by provider NPI.
///
/// Counters hold integer cents so every 2-dp currency amount is exact and
/// the monotonic-counter invariant is never at the mercy of float drift.
#[derive(Debug, Clone)]
pub struct CountMinSketch {
    width: usize,
    depth: usize,
    /// Row-major counter matrix, `depth * width` cells of cents
    counters: Vec<u64>,
    /// One hash seed per row, derived deterministically
    row_seeds: Vec<u64>,
    /// Total cents ever added, for the error bound
    total_cents: u64,
}

impl CountMinSketch {
    /// Builds a sketch from error-style parameters.
    ///
    /// `epsilon` and `delta` must be finite values in `(0, 1)`.
    ///
    /// This constructor chooses:
    /// - `width = ceil(e / epsilon)`,
    /// - `depth = ceil(ln(1 / delta))`.
    pub fn new(epsilon: f64, delta: f64) -> Result<Self, AggregationError> {
        if !epsilon.is_finite() || epsilon <= 0.0 || epsilon >= 1.0 {
            return Err(AggregationError::InvalidArgument {
                reason: "epsilon must be finite and strictly between 0 and 1".to_string(),
            });
        }
        if !delta.is_finite() || delta <= 0.0 || delta >= 1.0 {
            return Err(AggregationError::InvalidArgument {
                reason: "delta must be finite and strictly between 0 and 1".to_string(),
            });
        }

        let width = (std::f64::consts::E / epsilon).ceil() as usize;
        let depth = (1.0 / delta).ln().ceil() as usize;
        Self::with_dimensions(width.max(1), depth.max(1))
    }

    /// Builds a sketch with the default (ε = 0.001, δ = 0.01) contract.
    pub fn with_defaults() -> Self {
        // Defaults are in range, so construction cannot fail
        Self::new(DEFAULT_EPSILON, DEFAULT_DELTA).expect("default parameters are valid")
    }

    /// Builds a sketch from explicit dimensions.
    ///
    /// Memory is fixed at `width * depth * 8` bytes for the lifetime of
    /// the structure.
    pub fn with_dimensions(width: usize, depth: usize) -> Result<Self, AggregationError> {
        if width == 0 {
            return Err(AggregationError::InvalidArgument {
                reason: "width must be greater than zero".to_string(),
            });
        }
        if depth == 0 {
            return Err(AggregationError::InvalidArgument {
                reason: "depth must be greater than zero".to_string(),
            });
        }

        let table_len = width
            .checked_mul(depth)
            .ok_or_else(|| AggregationError::InvalidArgument {
                reason: "width * depth overflows usize".to_string(),
            })?;

        let row_seeds = (0..depth)
            .map(|row| splitmix64((row as u64).wrapping_add(0x0D6E_8FD9_3A5E_4C31)))
            .collect();

        Ok(Self {
            width,
            depth,
            counters: vec![0; table_len],
            row_seeds,
            total_cents: 0,
        })
    }

    /// Builds a sketch sized to fit a counter-memory budget.
    ///
    /// Width is derived as `budget_bytes / (depth * 8)`; the budget must
    /// leave room for at least one column.
    pub fn with_memory_budget(budget_bytes: usize, depth: usize) -> Result<Self, AggregationError> {
        if depth == 0 {
            return Err(AggregationError::InvalidArgument {
                reason: "depth must be greater than zero".to_string(),
            });
        }
        let width = budget_bytes / (depth * COUNTER_BYTES);
        if width == 0 {
            return Err(AggregationError::InvalidArgument {
                reason: format!(
                    "memory budget of {} bytes is too small for depth {}",
                    budget_bytes, depth
                ),
            });
        }
        Self::with_dimensions(width, depth)
    }

    /// Returns the number of columns per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of hash rows.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the total cents added across all providers.
    pub fn total_cents(&self) -> u64 {
        self.total_cents
    }

    /// Returns `true` if no fees have been recorded.
    pub fn is_empty(&self) -> bool {
        self.total_cents == 0
    }

    /// Adds `cents` to the provider's counters. O(depth).
    pub fn update(&mut self, provider_npi: &str, cents: u64) {
        for row in 0..self.depth {
            let idx = self.counter_index(row, provider_npi);
            self.counters[idx] = self.counters[idx].saturating_add(cents);
        }
        self.total_cents = self.total_cents.saturating_add(cents);
    }

    /// Estimates the provider's total cents: minimum across rows. O(depth).
    pub fn estimate(&self, provider_npi: &str) -> u64 {
        (0..self.depth)
            .map(|row| self.counters[self.counter_index(row, provider_npi)])
            .min()
            .unwrap_or(0)
    }

    /// Upper bound on overestimation: `ε × total` where `ε = e / width`.
    ///
    /// Holds with probability `1 − δ` for `δ = exp(-depth)`.
    pub fn error_bound_cents(&self) -> u64 {
        let bound = self.total_cents as f64 * std::f64::consts::E / self.width as f64;
        bound.ceil() as u64
    }

    /// Merges another sketch into this one, for aggregating across
    /// instances. Shapes and row seeds must match.
    pub fn merge(&mut self, other: &Self) -> Result<(), AggregationError> {
        if self.width != other.width || self.depth != other.depth {
            return Err(AggregationError::InvalidArgument {
                reason: "width/depth must match for merge".to_string(),
            });
        }
        if self.row_seeds != other.row_seeds {
            return Err(AggregationError::InvalidArgument {
                reason: "hash seeds must match for merge".to_string(),
            });
        }

        for (left, right) in self.counters.iter_mut().zip(other.counters.iter()) {
            *left = left.saturating_add(*right);
        }
        self.total_cents = self.total_cents.saturating_add(other.total_cents);
        Ok(())
    }

    fn counter_index(&self, row: usize, provider_npi: &str) -> usize {
        let column = (seeded_hash64(provider_npi, self.row_seeds[row]) as usize) % self.width;
        row * self.width + column
    }
}

/// Computes a deterministic 64-bit hash of an item under a fixed seed.
///
/// `DefaultHasher::new()` uses fixed keys, so the same (seed, item) pair
/// hashes identically across processes and runs.
fn seeded_hash64<T: Hash + ?Sized>(item: &T, seed: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    item.hash(&mut hasher);
    hasher.finish()
}

/// SplitMix64 mixer used for deriving independent row seeds.
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    #[test]
    fn default_dimensions_match_documented_contract() {
        let sketch = CountMinSketch::with_defaults();
        // width = ceil(e / 0.001) = 2719, depth = ceil(ln 100) = 5
        assert_eq!(sketch.width(), 2719);
        assert_eq!(sketch.depth(), 5);
    }

    #[test]
    fn constructor_rejects_invalid_parameters() {
        assert!(CountMinSketch::new(0.0, 0.1).is_err());
        assert!(CountMinSketch::new(0.1, 0.0).is_err());
        assert!(CountMinSketch::new(1.0, 0.1).is_err());
        assert!(CountMinSketch::new(0.1, 1.0).is_err());
        assert!(CountMinSketch::new(f64::NAN, 0.1).is_err());
        assert!(CountMinSketch::with_dimensions(0, 2).is_err());
        assert!(CountMinSketch::with_dimensions(2, 0).is_err());
    }

    #[test]
    fn memory_budget_constructor_sizes_width() {
        // 54KB budget at depth 5 → 1382 columns per row
        let sketch = CountMinSketch::with_memory_budget(54 * 1024, 5).unwrap();
        assert_eq!(sketch.depth(), 5);
        assert_eq!(sketch.width(), 54 * 1024 / (5 * 8));
        assert!(CountMinSketch::with_memory_budget(7, 5).is_err());
    }

    #[test]
    fn estimate_is_at_least_true_total() {
        let mut sketch = CountMinSketch::with_dimensions(1000, 5).unwrap();
        sketch.update("1497775530", 10_000);
        sketch.update("1497775530", 5_000);
        sketch.update("1234567893", 20_000);

        assert!(sketch.estimate("1497775530") >= 15_000);
        assert!(sketch.estimate("1234567893") >= 20_000);
        assert_eq!(sketch.total_cents(), 35_000);
    }

    #[test]
    fn unseen_provider_estimates_zero_in_sparse_sketch() {
        let mut sketch = CountMinSketch::with_dimensions(4096, 5).unwrap();
        sketch.update("1497775530", 10_000);
        // Overwhelmingly likely to miss all five occupied cells
        assert_eq!(sketch.estimate("9999999999"), 0);
    }

    #[test]
    fn estimate_is_idempotent_without_updates() {
        let mut sketch = CountMinSketch::with_dimensions(512, 4).unwrap();
        sketch.update("1497775530", 7_500);
        let first = sketch.estimate("1497775530");
        for _ in 0..10 {
            assert_eq!(sketch.estimate("1497775530"), first);
        }
    }

    #[test]
    fn estimate_is_monotone_over_updates() {
        let mut sketch = CountMinSketch::with_dimensions(512, 4).unwrap();
        let mut last = 0;
        for _ in 0..100 {
            sketch.update("1497775530", 100);
            let est = sketch.estimate("1497775530");
            assert!(est >= last);
            last = est;
        }
    }

    #[test]
    fn identical_streams_produce_identical_state() {
        let build = || {
            let mut sketch = CountMinSketch::with_defaults();
            for i in 0..500u64 {
                sketch.update(&format!("provider_{}", i % 37), 100 + i);
            }
            sketch
        };
        let a = build();
        let b = build();
        assert_eq!(a.counters, b.counters);
        assert_eq!(a.estimate("provider_5"), b.estimate("provider_5"));
    }

    #[test]
    fn error_bound_tracks_total() {
        let mut sketch = CountMinSketch::with_defaults();
        for i in 0..100u64 {
            sketch.update(&format!("provider_{i}"), 10_000);
        }
        // ε ≈ e / 2719 ≈ 0.001, total = 1,000,000 cents
        let bound = sketch.error_bound_cents();
        assert!(bound >= 1_000 && bound <= 2_000, "bound={bound}");
    }

    #[test]
    fn merge_combines_totals() {
        let mut left = CountMinSketch::with_dimensions(512, 5).unwrap();
        let mut right = CountMinSketch::with_dimensions(512, 5).unwrap();
        left.update("1497775530", 10_000);
        right.update("1497775530", 5_000);

        left.merge(&right).unwrap();
        assert!(left.estimate("1497775530") >= 15_000);
        assert_eq!(left.total_cents(), 15_000);
    }

    #[test]
    fn merge_rejects_mismatched_shape() {
        let mut left = CountMinSketch::with_dimensions(256, 4).unwrap();
        let right = CountMinSketch::with_dimensions(128, 4).unwrap();
        assert!(left.merge(&right).is_err());
    }

    proptest! {
        /// One-sided error: for any stream of updates the sketch never
        /// underestimates a provider's true total.
        #[test]
        fn prop_never_underestimates(
            updates in prop::collection::vec((0u8..20, 1u64..100_000), 1..200)
        ) {
            let mut sketch = CountMinSketch::with_dimensions(64, 4).unwrap();
            let mut truth: HashMap<u8, u64> = HashMap::new();

            for (key, cents) in &updates {
                sketch.update(&format!("npi_{key}"), *cents);
                *truth.entry(*key).or_insert(0) += cents;
            }

            for (key, total) in &truth {
                let npi = format!("npi_{key}");
                prop_assert!(sketch.estimate(&npi) >= *total);
            }
        }

        /// Total is conserved exactly regardless of collisions.
        #[test]
        fn prop_total_is_exact(
            updates in prop::collection::vec(1u64..100_000, 1..100)
        ) {
            let mut sketch = CountMinSketch::with_dimensions(32, 3).unwrap();
            let mut sum = 0u64;
            for (i, cents) in updates.iter().enumerate() {
                sketch.update(&format!("npi_{}", i % 7), *cents);
                sum += cents;
            }
            prop_assert_eq!(sketch.total_cents(), sum);
        }
    }
}
