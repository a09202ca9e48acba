use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use types::claim::{Claim, ClaimStatus};

/// Incoming claim submission.
///
/// Lines are raw key/value records; field names may use any of the known
/// messy variations and are normalized by the claims engine.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimCreateRequest {
    #[serde(default)]
    pub external_claim_id: Option<String>,
    pub lines: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClaimResponse {
    pub claim_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_claim_id: Option<String>,
    pub provider_npi: String,
    pub subscriber_number: String,
    pub plan_group_number: String,
    /// Total net fee, fixed two decimal places
    pub net_fee: String,
    pub line_count: usize,
    pub status: ClaimStatus,
    pub created_at: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ClaimResponse {
    pub fn from_claim(claim: &Claim, warnings: Vec<String>) -> Self {
        Self {
            claim_id: claim.claim_id.to_string(),
            external_claim_id: claim.external_claim_id.clone(),
            provider_npi: claim.provider_npi.clone(),
            subscriber_number: claim.subscriber_number.clone(),
            plan_group_number: claim.plan_group_number.clone(),
            net_fee: format!("{:.2}", claim.net_fee),
            line_count: claim.line_count,
            status: claim.status,
            created_at: claim.created_at.to_rfc3339(),
            warnings,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TopProviderResponse {
    pub rank: usize,
    pub provider_npi: String,
    /// Estimated total net fees; an upper bound on the true aggregate
    pub total_net_fees: String,
    pub claim_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    /// Claims currently held by the in-memory store
    pub claims_stored: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_accepts_messy_field_names() {
        let payload = json!({
            "external_claim_id": "claim_1234",
            "lines": [{
                "Provider NPI": "1234567893",
                "provider fees": "$120.00"
            }]
        });
        let req: ClaimCreateRequest = serde_json::from_value(payload).unwrap();
        assert_eq!(req.external_claim_id.as_deref(), Some("claim_1234"));
        assert_eq!(req.lines.len(), 1);
        assert!(req.lines[0].contains_key("Provider NPI"));
    }

    #[test]
    fn test_external_id_optional() {
        let req: ClaimCreateRequest =
            serde_json::from_value(json!({ "lines": [] })).unwrap();
        assert!(req.external_claim_id.is_none());
    }

    #[test]
    fn test_health_response_reports_store_size() {
        let resp = HealthResponse {
            status: "healthy",
            service: "claims-gateway",
            claims_stored: 3,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["claims_stored"], 3);
    }

    #[test]
    fn test_top_provider_response_shape() {
        let resp = TopProviderResponse {
            rank: 1,
            provider_npi: "1234567893".to_string(),
            total_net_fees: "85.00".to_string(),
            claim_count: 2,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["rank"], 1);
        assert_eq!(json["total_net_fees"], "85.00");
    }
}
