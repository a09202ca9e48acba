//! Fee aggregation facade
//!
//! The single surface the rest of the service talks to:
//! `record(npi, net_fee)` on the write path and `top(n)` on the query
//! path. Owns the sketch and the top-K tracker behind one mutex, since an
//! observe must see the estimate computed under the same update. Critical
//! sections are bounded by `depth` (record) or `K × depth` (top).

use std::sync::Mutex;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use types::errors::AggregationError;
use types::ids::ProviderNpi;
use types::money;

use crate::sketch::{CountMinSketch, DEFAULT_DELTA, DEFAULT_EPSILON};
use crate::topk::TopProviders;

/// Aggregator construction parameters
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Max overestimate as a fraction of total fees processed
    pub epsilon: f64,
    /// Probability the error bound is exceeded
    pub delta: f64,
    /// Candidate-set capacity (K)
    pub max_candidates: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            delta: DEFAULT_DELTA,
            max_candidates: 10,
        }
    }
}

/// One entry of a top-N response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderTotal {
    pub provider_npi: String,
    /// Upper bound on the provider's true aggregate net fee
    pub estimated_total: Decimal,
    pub claim_count: u64,
}

/// Point-in-time accuracy statistics for the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatorStats {
    pub total_net_fees: Decimal,
    /// Upper bound on any single provider's overestimate
    pub max_error_estimate: Decimal,
    pub tracked_candidates: usize,
    pub max_candidates: usize,
    pub sketch_width: usize,
    pub sketch_depth: usize,
}

struct Inner {
    sketch: CountMinSketch,
    topk: TopProviders,
}

/// Thread-safe approximate per-provider fee aggregation.
///
/// Construct once at startup and share via `Arc`; request handlers call
/// `record` and `top` concurrently. Returned totals are upper bounds on
/// the true aggregates, and relative order can be imprecise for providers
/// whose totals are close together or whose NPIs collide under the hash
/// rows.
pub struct FeeAggregator {
    inner: Mutex<Inner>,
}

impl FeeAggregator {
    /// Creates an aggregator from error-bound parameters.
    pub fn new(config: AggregatorConfig) -> Result<Self, AggregationError> {
        let sketch = CountMinSketch::new(config.epsilon, config.delta)?;
        Self::from_parts(sketch, config.max_candidates)
    }

    /// Creates an aggregator with an explicitly sized sketch.
    pub fn with_dimensions(
        width: usize,
        depth: usize,
        max_candidates: usize,
    ) -> Result<Self, AggregationError> {
        let sketch = CountMinSketch::with_dimensions(width, depth)?;
        Self::from_parts(sketch, max_candidates)
    }

    /// Creates an aggregator sized to a counter-memory budget in bytes.
    pub fn with_memory_budget(
        budget_bytes: usize,
        depth: usize,
        max_candidates: usize,
    ) -> Result<Self, AggregationError> {
        let sketch = CountMinSketch::with_memory_budget(budget_bytes, depth)?;
        Self::from_parts(sketch, max_candidates)
    }

    fn from_parts(sketch: CountMinSketch, max_candidates: usize) -> Result<Self, AggregationError> {
        let topk = TopProviders::new(max_candidates)?;
        Ok(Self {
            inner: Mutex::new(Inner { sketch, topk }),
        })
    }

    /// Records a claim line's net fee against a provider.
    ///
    /// Rejects empty NPIs and negative fees with `InvalidClaimLine`;
    /// otherwise cannot fail. Zero fees still count toward the
    /// candidate's claim count.
    pub fn record(&self, provider_npi: &str, net_fee: Decimal) -> Result<(), AggregationError> {
        let npi = ProviderNpi::new(provider_npi)?;
        if net_fee.is_sign_negative() && !net_fee.is_zero() {
            return Err(AggregationError::InvalidClaimLine {
                reason: format!("net fee must be non-negative, got {net_fee}"),
            });
        }
        let cents = money::to_cents(net_fee).ok_or_else(|| AggregationError::InvalidClaimLine {
            reason: format!("net fee {net_fee} exceeds the representable range"),
        })?;

        let mut inner = self.lock();
        inner.sketch.update(npi.as_str(), cents);
        let estimate = inner.sketch.estimate(npi.as_str());
        inner.topk.observe(npi.as_str(), estimate);
        Ok(())
    }

    /// Returns up to `n` providers ordered by estimated total descending.
    ///
    /// Each candidate's value is re-read from the sketch so the response
    /// reflects all updates, not just the candidate's own. Fails with
    /// `InvalidArgument` when `n` is zero; `n` beyond the tracker's
    /// capacity returns all held entries.
    pub fn top(&self, n: usize) -> Result<Vec<ProviderTotal>, AggregationError> {
        if n == 0 {
            return Err(AggregationError::InvalidArgument {
                reason: "n must be a positive integer".to_string(),
            });
        }

        let mut inner = self.lock();
        let Inner { sketch, topk } = &mut *inner;
        let snapshot = topk.snapshot(n, |npi| sketch.estimate(npi));

        Ok(snapshot
            .into_iter()
            .map(|c| ProviderTotal {
                provider_npi: c.provider_npi,
                estimated_total: money::cents_to_decimal(c.estimated_cents),
                claim_count: c.claim_count,
            })
            .collect())
    }

    /// Returns accuracy statistics for monitoring and tests.
    pub fn stats(&self) -> AggregatorStats {
        let inner = self.lock();
        AggregatorStats {
            total_net_fees: money::cents_to_decimal(inner.sketch.total_cents()),
            max_error_estimate: money::cents_to_decimal(inner.sketch.error_bound_cents()),
            tracked_candidates: inner.topk.tracked(),
            max_candidates: inner.topk.capacity(),
            sketch_width: inner.sketch.width(),
            sketch_depth: inner.sketch.depth(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock still guards valid state: counters are
        // monotone u64 cells and every update either fully applied or
        // saturated, so recover rather than propagate the panic.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
