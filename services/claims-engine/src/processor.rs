//! Claim processing orchestration
//!
//! normalize → validate → calculate → assemble. Storage and fee
//! aggregation stay with the caller so the pipeline can be exercised in
//! isolation with fresh state per test.

use chrono::Utc;
use serde_json::{Map, Value};

use types::claim::{Claim, ClaimLine, ClaimStatus};
use types::errors::ClaimError;
use types::ids::ClaimId;

use crate::calculator::ClaimTotals;
use crate::mapper::FieldMapper;
use crate::validator::ClaimValidator;

/// Output of a successful processing run.
#[derive(Debug, Clone)]
pub struct ProcessedClaim {
    pub claim: Claim,
    /// Normalized lines, in submission order
    pub lines: Vec<ClaimLine>,
    /// Per-line net fees aligned with `lines`; feed these to the
    /// aggregation facade
    pub line_net_fees: Vec<rust_decimal::Decimal>,
    /// Non-fatal findings (unmapped fields, header inconsistencies)
    pub warnings: Vec<String>,
}

/// Orchestrates the claim processing pipeline.
pub struct ClaimProcessor {
    mapper: FieldMapper,
    validator: ClaimValidator,
}

impl ClaimProcessor {
    pub fn new() -> Self {
        Self {
            mapper: FieldMapper::new(),
            validator: ClaimValidator::new(),
        }
    }

    /// Processes raw claim records into a priced `Claim`.
    ///
    /// Header fields (provider NPI, subscriber, plan/group) are taken
    /// from the first line.
    pub fn process(
        &self,
        external_claim_id: Option<String>,
        records: &[Map<String, Value>],
    ) -> Result<ProcessedClaim, ClaimError> {
        let (lines, mut warnings) = self.mapper.normalize_lines(records)?;

        let outcome = self.validator.validate_lines(&lines)?;
        warnings.extend(outcome.into_result()?);

        let totals = ClaimTotals::from_lines(&lines)?;

        let first = &lines[0];
        let claim = Claim {
            claim_id: ClaimId::new(),
            external_claim_id,
            provider_npi: first.provider_npi.clone(),
            subscriber_number: first.subscriber_number.clone(),
            plan_group_number: first.plan_group_number.clone(),
            net_fee: totals.total_net_fee,
            total_submitted_fees: totals.total_submitted_fees,
            total_allowed_fees: totals.total_allowed_fees,
            total_member_coinsurance: totals.total_member_coinsurance,
            total_member_copay: totals.total_member_copay,
            member_responsibility: totals.member_responsibility,
            provider_adjustment: totals.provider_adjustment,
            line_count: lines.len(),
            status: ClaimStatus::Processed,
            created_at: Utc::now(),
        };

        Ok(ProcessedClaim {
            claim,
            lines,
            line_net_fees: totals.line_net_fees,
            warnings,
        })
    }
}

impl Default for ClaimProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn record(pairs: &[(&str, &str)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    fn valid_record() -> Map<String, Value> {
        record(&[
            ("Service Date", "3/28/18 0:00"),
            ("Submitted Procedure", "D0180"),
            ("Plan/Group #", "GRP-1000"),
            ("Subscriber#", "3730189502"),
            ("Provider NPI", "1234567893"),
            ("provider fees", "$120.00"),
            ("Allowed fees", "$100.00"),
            ("member coinsurance", "$10.00"),
            ("member copay", "$5.00"),
        ])
    }

    #[test]
    fn test_process_single_line() {
        let processor = ClaimProcessor::new();
        let result = processor.process(Some("claim_1234".to_string()), &[valid_record()]);
        let processed = result.unwrap();

        assert_eq!(processed.claim.provider_npi, "1234567893");
        assert_eq!(processed.claim.external_claim_id.as_deref(), Some("claim_1234"));
        // net = 100 - 10 - 5
        assert_eq!(processed.claim.net_fee, "85.00".parse::<Decimal>().unwrap());
        assert_eq!(processed.claim.member_responsibility, "15.00".parse::<Decimal>().unwrap());
        assert_eq!(processed.claim.provider_adjustment, "20.00".parse::<Decimal>().unwrap());
        assert_eq!(processed.claim.line_count, 1);
        assert_eq!(processed.claim.status, ClaimStatus::Processed);
        assert_eq!(processed.line_net_fees.len(), 1);
    }

    #[test]
    fn test_process_multi_line_totals() {
        let processor = ClaimProcessor::new();
        let mut second = valid_record();
        second.insert(
            "Submitted Procedure".to_string(),
            Value::String("D0210".to_string()),
        );
        let processed = processor
            .process(None, &[valid_record(), second])
            .unwrap();

        assert_eq!(processed.claim.line_count, 2);
        assert_eq!(processed.claim.net_fee, "170.00".parse::<Decimal>().unwrap());
        assert_eq!(processed.line_net_fees.len(), 2);
    }

    #[test]
    fn test_process_rejects_invalid_npi() {
        let processor = ClaimProcessor::new();
        let mut rec = valid_record();
        rec.insert("Provider NPI".to_string(), Value::String("123".to_string()));
        let err = processor.process(None, &[rec]).unwrap_err();
        assert!(matches!(err, ClaimError::Validation(_)));
    }

    #[test]
    fn test_process_rejects_empty_claim() {
        let processor = ClaimProcessor::new();
        let err = processor.process(None, &[]).unwrap_err();
        assert!(matches!(err, ClaimError::Validation(_)));
    }

    #[test]
    fn test_unmapped_fields_become_warnings() {
        let processor = ClaimProcessor::new();
        let mut rec = valid_record();
        rec.insert("mystery".to_string(), Value::String("x".to_string()));
        let processed = processor.process(None, &[rec]).unwrap();
        assert_eq!(processed.warnings.len(), 1);
        assert!(processed.warnings[0].contains("mystery"));
    }
}
