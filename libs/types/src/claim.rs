//! Claim and claim line types
//!
//! `ClaimLine` is the canonical form produced by field normalization;
//! `Claim` is the processed header-plus-totals record kept by the store.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::ClaimId;

/// A single normalized claim line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimLine {
    /// Date the service was provided (as received, e.g. "3/28/18 0:00")
    pub service_date: String,
    /// Dental procedure code, "D" followed by four digits
    pub submitted_procedure: String,
    /// Dental quadrant (UR/UL/LR/LL); the only optional field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quadrant: Option<String>,
    /// Insurance plan/group identifier
    pub plan_group_number: String,
    /// Member/subscriber identifier
    pub subscriber_number: String,
    /// National Provider Identifier, ten digits
    pub provider_npi: String,
    /// Amount billed by the provider
    pub submitted_fee: Decimal,
    /// Maximum amount insurance will pay
    pub allowed_fee: Decimal,
    /// Member's coinsurance responsibility
    pub member_coinsurance: Decimal,
    /// Member's copay amount
    pub member_copay: Decimal,
}

/// Lifecycle status of a processed claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    Processed,
    Rejected,
}

/// A fully processed claim: header fields plus computed totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_id: ClaimId,
    /// Caller-supplied identifier used for duplicate detection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_claim_id: Option<String>,
    pub provider_npi: String,
    pub subscriber_number: String,
    pub plan_group_number: String,
    /// Sum of per-line net fees
    pub net_fee: Decimal,
    pub total_submitted_fees: Decimal,
    pub total_allowed_fees: Decimal,
    pub total_member_coinsurance: Decimal,
    pub total_member_copay: Decimal,
    /// Total member responsibility: coinsurance + copay
    pub member_responsibility: Decimal,
    /// Provider write-off: submitted - allowed
    pub provider_adjustment: Decimal,
    pub line_count: usize,
    pub status: ClaimStatus,
    pub created_at: DateTime<Utc>,
}
