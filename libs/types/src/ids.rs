//! Unique identifier types for claims entities
//!
//! Claim IDs use UUID v7 for time-sortable ordering, enabling efficient
//! chronological queries. Provider identifiers are NPIs (National Provider
//! Identifier), carried as validated strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::AggregationError;

/// Unique identifier for a processed claim
///
/// Uses UUID v7 for time-based sorting. Claims can be efficiently
/// listed in chronological order using the embedded timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimId(Uuid);

impl ClaimId {
    /// Create a new ClaimId with current timestamp
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create from existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ClaimId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// National Provider Identifier
///
/// The key under which fees are aggregated. Construction rejects empty
/// identifiers so the sketch never sees a degenerate key; full 10-digit
/// and checksum validation lives in the claims engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderNpi(String);

impl ProviderNpi {
    /// Create a new ProviderNpi from a string
    ///
    /// Returns `InvalidClaimLine` when the identifier is empty or blank.
    pub fn new(npi: impl Into<String>) -> Result<Self, AggregationError> {
        let npi = npi.into();
        if npi.trim().is_empty() {
            return Err(AggregationError::InvalidClaimLine {
                reason: "provider NPI must not be empty".to_string(),
            });
        }
        Ok(Self(npi))
    }

    /// Get the NPI as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderNpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
