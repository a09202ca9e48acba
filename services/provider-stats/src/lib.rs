//! Provider Stats Service
//!
//! Fixed-memory tracking of per-provider net-fee totals over the claim
//! stream, answering approximate top-N queries without per-provider state.
//!
//! **Key Invariants:**
//! - One-sided error: estimates never fall below the true total
//! - Counters are monotonically non-decreasing for the process lifetime
//! - Memory is fixed at construction; no runtime resizing
//! - Deterministic output (same input stream → same rankings)

pub mod aggregator;
pub mod sketch;
pub mod topk;

pub use aggregator::{AggregatorConfig, AggregatorStats, FeeAggregator, ProviderTotal};
pub use sketch::CountMinSketch;
pub use topk::TopProviders;
