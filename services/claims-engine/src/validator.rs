//! Claim line validation
//!
//! Applies the per-field rules from the canonical schema: NPI format and
//! Luhn checksum, dental procedure code shape, quadrant codes, subscriber
//! length bounds, and non-negative currency amounts. Claim-level
//! consistency issues (mixed header fields, repeated procedures) surface
//! as warnings rather than rejections.

use rust_decimal::Decimal;

use types::claim::ClaimLine;
use types::errors::ValidationError;

const QUADRANTS: &[&str] = &["UR", "UL", "LR", "LL"];
const SUBSCRIBER_MIN_LEN: usize = 5;
const SUBSCRIBER_MAX_LEN: usize = 20;

/// Collected validation errors and warnings for a claim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOutcome {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Converts a failed outcome into its error form.
    pub fn into_result(self) -> Result<Vec<String>, ValidationError> {
        if self.is_valid() {
            Ok(self.warnings)
        } else {
            Err(ValidationError::Failed {
                errors: self.errors,
            })
        }
    }

    fn error(&mut self, line: usize, message: impl Into<String>) {
        self.errors.push(format!("Line {}: {}", line, message.into()));
    }

    fn warning(&mut self, line: usize, message: impl Into<String>) {
        self.warnings
            .push(format!("Line {}: {}", line, message.into()));
    }
}

/// Metadata-driven validator for normalized claim lines.
#[derive(Debug, Clone, Default)]
pub struct ClaimValidator;

impl ClaimValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validates all lines of a claim plus claim-level consistency rules.
    pub fn validate_lines(&self, lines: &[ClaimLine]) -> Result<ValidationOutcome, ValidationError> {
        if lines.is_empty() {
            return Err(ValidationError::EmptyClaim);
        }

        let mut outcome = ValidationOutcome::default();
        for (idx, line) in lines.iter().enumerate() {
            self.validate_line(line, idx + 1, &mut outcome);
        }
        self.validate_claim_level(lines, &mut outcome);
        Ok(outcome)
    }

    fn validate_line(&self, line: &ClaimLine, num: usize, outcome: &mut ValidationOutcome) {
        if line.service_date.trim().is_empty() {
            outcome.error(num, "service date is required");
        }

        if !is_procedure_code(&line.submitted_procedure) {
            outcome.error(
                num,
                format!(
                    "invalid procedure code '{}': must be D followed by 4 digits",
                    line.submitted_procedure
                ),
            );
        }

        if let Some(quadrant) = &line.quadrant {
            if !QUADRANTS.contains(&quadrant.as_str()) {
                outcome.error(
                    num,
                    format!("invalid quadrant '{quadrant}': must be one of UR, UL, LR, LL"),
                );
            }
        }

        let sub_len = line.subscriber_number.len();
        if !(SUBSCRIBER_MIN_LEN..=SUBSCRIBER_MAX_LEN).contains(&sub_len) {
            outcome.error(
                num,
                format!(
                    "subscriber number must be {SUBSCRIBER_MIN_LEN}-{SUBSCRIBER_MAX_LEN} characters"
                ),
            );
        }

        if line.plan_group_number.trim().is_empty() {
            outcome.error(num, "plan/group number is required");
        }

        if !is_ten_digits(&line.provider_npi) {
            outcome.error(
                num,
                format!("NPI '{}' must be exactly 10 digits", line.provider_npi),
            );
        } else if !npi_checksum_valid(&line.provider_npi) {
            outcome.error(
                num,
                format!("NPI '{}' failed checksum validation", line.provider_npi),
            );
        }

        for (field, amount) in [
            ("submitted fee", line.submitted_fee),
            ("allowed fee", line.allowed_fee),
            ("member coinsurance", line.member_coinsurance),
            ("member copay", line.member_copay),
        ] {
            if amount < Decimal::ZERO {
                outcome.error(num, format!("{field} must be non-negative, got {amount}"));
            }
        }
    }

    /// Header fields should agree across lines; repeats are suspicious
    /// but not fatal.
    fn validate_claim_level(&self, lines: &[ClaimLine], outcome: &mut ValidationOutcome) {
        let first = &lines[0];
        for (idx, line) in lines.iter().enumerate().skip(1) {
            if line.provider_npi != first.provider_npi {
                outcome.warning(idx + 1, "inconsistent provider_npi across claim lines");
            }
            if line.subscriber_number != first.subscriber_number {
                outcome.warning(idx + 1, "inconsistent subscriber_number across claim lines");
            }
            if line.plan_group_number != first.plan_group_number {
                outcome.warning(idx + 1, "inconsistent plan_group_number across claim lines");
            }
        }

        for (idx, line) in lines.iter().enumerate() {
            let repeated = lines[..idx]
                .iter()
                .any(|prev| prev.submitted_procedure == line.submitted_procedure);
            if repeated {
                outcome.warning(
                    idx + 1,
                    format!("duplicate procedure {}", line.submitted_procedure),
                );
            }
        }
    }
}

/// Dental procedure codes: `D` followed by exactly four digits.
fn is_procedure_code(code: &str) -> bool {
    let bytes = code.as_bytes();
    bytes.len() == 5 && bytes[0] == b'D' && bytes[1..].iter().all(u8::is_ascii_digit)
}

fn is_ten_digits(npi: &str) -> bool {
    npi.len() == 10 && npi.bytes().all(|b| b.is_ascii_digit())
}

/// NPI Luhn check: the US-provider prefix 80840 is prepended to the first
/// nine digits and the Luhn check digit must match the tenth.
fn npi_checksum_valid(npi: &str) -> bool {
    if !is_ten_digits(npi) {
        return false;
    }

    let prefixed: Vec<u32> = "80840"
        .chars()
        .chain(npi[..9].chars())
        .filter_map(|c| c.to_digit(10))
        .collect();

    // Double every other digit starting from the rightmost payload digit
    let mut total = 0;
    for (i, digit) in prefixed.iter().rev().enumerate() {
        let mut n = *digit;
        if i % 2 == 0 {
            n *= 2;
            if n > 9 {
                n -= 9;
            }
        }
        total += n;
    }

    let check = (10 - (total % 10)) % 10;
    npi[9..].parse::<u32>() == Ok(check)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Real-format NPI with a valid Luhn check digit
    const VALID_NPI: &str = "1234567893";

    fn valid_line() -> ClaimLine {
        ClaimLine {
            service_date: "3/28/18 0:00".to_string(),
            submitted_procedure: "D0180".to_string(),
            quadrant: None,
            plan_group_number: "GRP-1000".to_string(),
            subscriber_number: "3730189502".to_string(),
            provider_npi: VALID_NPI.to_string(),
            submitted_fee: Decimal::new(10000, 2),
            allowed_fee: Decimal::new(10000, 2),
            member_coinsurance: Decimal::ZERO,
            member_copay: Decimal::ZERO,
        }
    }

    #[test]
    fn test_valid_line_passes() {
        let outcome = ClaimValidator::new().validate_lines(&[valid_line()]).unwrap();
        assert!(outcome.is_valid(), "errors: {:?}", outcome.errors);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_empty_claim_rejected() {
        let err = ClaimValidator::new().validate_lines(&[]).unwrap_err();
        assert_eq!(err, ValidationError::EmptyClaim);
    }

    #[test]
    fn test_npi_checksum() {
        assert!(npi_checksum_valid(VALID_NPI));
        // Tweak the last digit → checksum fails
        assert!(!npi_checksum_valid("1234567890"));
        assert!(!npi_checksum_valid("123456789"));
        assert!(!npi_checksum_valid("12345678931"));
    }

    #[test]
    fn test_bad_npi_rejected() {
        let mut line = valid_line();
        line.provider_npi = "notanpi".to_string();
        let outcome = ClaimValidator::new().validate_lines(&[line]).unwrap();
        assert!(!outcome.is_valid());
        assert!(outcome.errors[0].contains("10 digits"));
    }

    #[test]
    fn test_procedure_code_format() {
        assert!(is_procedure_code("D0180"));
        assert!(!is_procedure_code("C0180"));
        assert!(!is_procedure_code("D180"));
        assert!(!is_procedure_code("D01800"));
        assert!(!is_procedure_code("D018X"));
    }

    #[test]
    fn test_invalid_quadrant_rejected() {
        let mut line = valid_line();
        line.quadrant = Some("XX".to_string());
        let outcome = ClaimValidator::new().validate_lines(&[line]).unwrap();
        assert!(!outcome.is_valid());
    }

    #[test]
    fn test_valid_quadrant_accepted() {
        for quad in QUADRANTS {
            let mut line = valid_line();
            line.quadrant = Some(quad.to_string());
            let outcome = ClaimValidator::new().validate_lines(&[line]).unwrap();
            assert!(outcome.is_valid());
        }
    }

    #[test]
    fn test_negative_amount_rejected() {
        let mut line = valid_line();
        line.member_copay = Decimal::new(-100, 2);
        let outcome = ClaimValidator::new().validate_lines(&[line]).unwrap();
        assert!(!outcome.is_valid());
        assert!(outcome.errors[0].contains("non-negative"));
    }

    #[test]
    fn test_subscriber_length_bounds() {
        let mut line = valid_line();
        line.subscriber_number = "1234".to_string();
        let outcome = ClaimValidator::new().validate_lines(&[line]).unwrap();
        assert!(!outcome.is_valid());
    }

    #[test]
    fn test_inconsistent_header_warns() {
        let mut second = valid_line();
        second.submitted_procedure = "D0210".to_string();
        second.subscriber_number = "9999999999".to_string();
        let outcome = ClaimValidator::new()
            .validate_lines(&[valid_line(), second])
            .unwrap();
        assert!(outcome.is_valid());
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("subscriber_number"));
    }

    #[test]
    fn test_duplicate_procedure_warns() {
        let outcome = ClaimValidator::new()
            .validate_lines(&[valid_line(), valid_line()])
            .unwrap();
        assert!(outcome.is_valid());
        assert!(outcome
            .warnings
            .iter()
            .any(|w| w.contains("duplicate procedure D0180")));
    }
}
