//! Error types for the claims pipeline
//!
//! Comprehensive error taxonomy using thiserror

use thiserror::Error;

/// Top-level claims processing error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClaimError {
    #[error("Field mapping error: {0}")]
    Mapping(#[from] MappingError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Calculation error: {0}")]
    Calculation(#[from] CalculationError),

    #[error("Aggregation error: {0}")]
    Aggregation(#[from] AggregationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Field normalization errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error("Required field missing: {field}")]
    MissingField { field: String },

    #[error("Cannot parse value '{value}' for field {field}")]
    UnparsableValue { field: String, value: String },

    #[error("Line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },
}

/// Claim validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("No claim lines provided")]
    EmptyClaim,

    #[error("Claim failed validation: {errors:?}")]
    Failed { errors: Vec<String> },
}

/// Fee calculation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalculationError {
    #[error("Cannot parse '{value}' as a monetary amount")]
    InvalidAmount { value: String },

    #[error("Negative amount for {field}: {value}")]
    NegativeAmount { field: String, value: String },
}

/// Aggregation facade errors
///
/// These two variants are the only conditions the fee aggregation core can
/// surface; the sketch and tracker themselves have no failure states.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregationError {
    #[error("Invalid claim line: {reason}")]
    InvalidClaimLine { reason: String },

    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },
}

/// In-memory claim store errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Claim not found: {claim_id}")]
    NotFound { claim_id: String },

    #[error("Claim with external id '{external_id}' already exists")]
    DuplicateExternalId { external_id: String },
}
