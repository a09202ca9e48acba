//! Claims Engine Service
//!
//! Turns raw claim payloads with inconsistent field naming into validated,
//! priced claims:
//!
//! 1. `mapper` normalizes messy field names to the canonical schema
//! 2. `validator` applies metadata-driven rules (NPI checksum, procedure
//!    codes, currency bounds)
//! 3. `calculator` computes per-line net fees and claim totals
//! 4. `processor` orchestrates the pipeline into a `Claim`
//!
//! The engine is pure with respect to storage and aggregation; the
//! gateway owns both and feeds each finalized line's (NPI, net fee) into
//! the provider-stats core.

pub mod calculator;
pub mod mapper;
pub mod processor;
pub mod validator;

pub use calculator::{compute_net_fee, ClaimTotals};
pub use mapper::FieldMapper;
pub use processor::{ClaimProcessor, ProcessedClaim};
pub use validator::{ClaimValidator, ValidationOutcome};
