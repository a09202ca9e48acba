//! Field-name normalization
//!
//! Claim records arrive with inconsistent field naming ("Provider NPI",
//! "provider_npi", "NPI", ...). The mapper resolves each incoming key
//! case-insensitively against a table of known variations, cleans currency
//! values, and produces canonical `ClaimLine`s. Unmapped fields are
//! dropped and reported back as warnings for the caller to log.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use types::claim::ClaimLine;
use types::errors::MappingError;
use types::money;

/// Whether a canonical field carries a currency amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Text,
    Currency,
}

struct FieldSpec {
    canonical: &'static str,
    variations: &'static [&'static str],
    kind: FieldKind,
    required: bool,
}

/// Known field-name variations, matched case-insensitively.
const FIELD_SPECS: &[FieldSpec] = &[
    FieldSpec {
        canonical: "service_date",
        variations: &["service date", "service_date", "servicedate", "service_dt"],
        kind: FieldKind::Text,
        required: true,
    },
    FieldSpec {
        canonical: "submitted_procedure",
        variations: &[
            "submitted procedure",
            "submitted_procedure",
            "procedure",
            "procedure_code",
            "proc_code",
        ],
        kind: FieldKind::Text,
        required: true,
    },
    FieldSpec {
        canonical: "quadrant",
        variations: &["quadrant", "quad"],
        kind: FieldKind::Text,
        required: false,
    },
    FieldSpec {
        canonical: "plan_group_number",
        variations: &[
            "plan/group #",
            "plan group",
            "plan_group_number",
            "group_number",
            "plan_number",
        ],
        kind: FieldKind::Text,
        required: true,
    },
    FieldSpec {
        canonical: "subscriber_number",
        variations: &[
            "subscriber#",
            "subscriber #",
            "subscriber_number",
            "subscriber_id",
            "member_id",
        ],
        kind: FieldKind::Text,
        required: true,
    },
    FieldSpec {
        canonical: "provider_npi",
        variations: &["provider npi", "provider_npi", "npi"],
        kind: FieldKind::Text,
        required: true,
    },
    FieldSpec {
        canonical: "submitted_fee",
        variations: &[
            "provider fees",
            "provider_fees",
            "submitted_fee",
            "billed_amount",
        ],
        kind: FieldKind::Currency,
        required: true,
    },
    FieldSpec {
        canonical: "allowed_fee",
        variations: &["allowed fees", "allowed_fees", "allowed_fee", "allowed_amount"],
        kind: FieldKind::Currency,
        required: true,
    },
    FieldSpec {
        canonical: "member_coinsurance",
        variations: &["member coinsurance", "member_coinsurance", "coinsurance", "member_coins"],
        kind: FieldKind::Currency,
        required: true,
    },
    FieldSpec {
        canonical: "member_copay",
        variations: &["member copay", "member_copay", "copay", "member_copayment"],
        kind: FieldKind::Currency,
        required: true,
    },
];

/// Maps messy field names onto the canonical claim-line schema.
pub struct FieldMapper {
    /// lowercase variation → field spec
    index: HashMap<&'static str, &'static FieldSpec>,
}

impl FieldMapper {
    pub fn new() -> Self {
        let mut index = HashMap::new();
        for spec in FIELD_SPECS {
            for variation in spec.variations {
                index.insert(*variation, spec);
            }
        }
        Self { index }
    }

    /// Resolves a raw field name to its canonical name, if known.
    pub fn canonical_name(&self, field: &str) -> Option<&'static str> {
        self.index
            .get(field.trim().to_lowercase().as_str())
            .map(|spec| spec.canonical)
    }

    /// Normalizes one raw record into a canonical claim line.
    ///
    /// Returns the line together with the raw names of any fields that
    /// matched no known variation.
    pub fn normalize_record(
        &self,
        record: &Map<String, Value>,
    ) -> Result<(ClaimLine, Vec<String>), MappingError> {
        let mut text: HashMap<&'static str, String> = HashMap::new();
        let mut amounts: HashMap<&'static str, Decimal> = HashMap::new();
        let mut unmapped = Vec::new();

        for (field, value) in record {
            let Some(spec) = self.index.get(field.trim().to_lowercase().as_str()) else {
                unmapped.push(field.clone());
                continue;
            };

            let raw = value_to_string(value);
            match spec.kind {
                FieldKind::Text => {
                    let cleaned = raw.trim().to_string();
                    if !cleaned.is_empty() {
                        text.insert(spec.canonical, cleaned);
                    }
                }
                FieldKind::Currency => {
                    let amount = money::parse_amount(&raw).map_err(|_| {
                        MappingError::UnparsableValue {
                            field: spec.canonical.to_string(),
                            value: raw.clone(),
                        }
                    })?;
                    amounts.insert(spec.canonical, amount);
                }
            }
        }

        for spec in FIELD_SPECS {
            if !spec.required {
                continue;
            }
            let present = match spec.kind {
                FieldKind::Text => text.contains_key(spec.canonical),
                FieldKind::Currency => amounts.contains_key(spec.canonical),
            };
            if !present {
                return Err(MappingError::MissingField {
                    field: spec.canonical.to_string(),
                });
            }
        }

        let line = ClaimLine {
            service_date: text.remove("service_date").unwrap_or_default(),
            submitted_procedure: text.remove("submitted_procedure").unwrap_or_default(),
            quadrant: text.remove("quadrant"),
            plan_group_number: text.remove("plan_group_number").unwrap_or_default(),
            subscriber_number: text.remove("subscriber_number").unwrap_or_default(),
            provider_npi: text.remove("provider_npi").unwrap_or_default(),
            submitted_fee: amounts.remove("submitted_fee").unwrap_or_default(),
            allowed_fee: amounts.remove("allowed_fee").unwrap_or_default(),
            member_coinsurance: amounts.remove("member_coinsurance").unwrap_or_default(),
            member_copay: amounts.remove("member_copay").unwrap_or_default(),
        };

        Ok((line, unmapped))
    }

    /// Normalizes all lines of a claim, adding 1-based line context to
    /// failures. Returns the lines plus warnings about unmapped fields.
    pub fn normalize_lines(
        &self,
        records: &[Map<String, Value>],
    ) -> Result<(Vec<ClaimLine>, Vec<String>), MappingError> {
        let mut lines = Vec::with_capacity(records.len());
        let mut warnings = Vec::new();

        for (idx, record) in records.iter().enumerate() {
            let (line, unmapped) =
                self.normalize_record(record)
                    .map_err(|e| MappingError::InvalidLine {
                        line: idx + 1,
                        reason: e.to_string(),
                    })?;
            if !unmapped.is_empty() {
                warnings.push(format!("line {}: unmapped fields {:?}", idx + 1, unmapped));
            }
            lines.push(line);
        }

        Ok((lines, warnings))
    }
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new()
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, &str)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    fn messy_record() -> Map<String, Value> {
        record(&[
            ("Service Date", "3/28/18 0:00"),
            ("Submitted Procedure", "D0180"),
            ("Quadrant", ""),
            ("Plan/Group #", "GRP-1000"),
            ("Subscriber#", "3730189502"),
            ("Provider NPI", "1497775530"),
            ("provider fees", "$100.00"),
            ("Allowed fees", "$100.00"),
            ("member coinsurance", "$0.00"),
            ("member copay", "$0.00"),
        ])
    }

    #[test]
    fn test_canonical_name_variations() {
        let mapper = FieldMapper::new();
        assert_eq!(mapper.canonical_name("Provider NPI"), Some("provider_npi"));
        assert_eq!(mapper.canonical_name("provider_npi"), Some("provider_npi"));
        assert_eq!(mapper.canonical_name("NPI"), Some("provider_npi"));
        assert_eq!(mapper.canonical_name("billed_amount"), Some("submitted_fee"));
        assert_eq!(mapper.canonical_name("no such field"), None);
    }

    #[test]
    fn test_normalize_messy_record() {
        let mapper = FieldMapper::new();
        let (line, unmapped) = mapper.normalize_record(&messy_record()).unwrap();

        assert!(unmapped.is_empty());
        assert_eq!(line.provider_npi, "1497775530");
        assert_eq!(line.submitted_procedure, "D0180");
        assert_eq!(line.submitted_fee, "100.00".parse().unwrap());
        assert_eq!(line.quadrant, None);
    }

    #[test]
    fn test_currency_formatting_cleaned() {
        let mapper = FieldMapper::new();
        let mut rec = messy_record();
        rec.insert(
            "provider fees".to_string(),
            Value::String("$1,500.50".to_string()),
        );
        let (line, _) = mapper.normalize_record(&rec).unwrap();
        assert_eq!(line.submitted_fee, "1500.50".parse().unwrap());
    }

    #[test]
    fn test_numeric_json_values_accepted() {
        let mapper = FieldMapper::new();
        let mut rec = messy_record();
        rec.insert("provider fees".to_string(), json!(250.75));
        let (line, _) = mapper.normalize_record(&rec).unwrap();
        assert_eq!(line.submitted_fee, "250.75".parse().unwrap());
    }

    #[test]
    fn test_missing_required_field() {
        let mapper = FieldMapper::new();
        let mut rec = messy_record();
        rec.remove("Provider NPI");
        let err = mapper.normalize_record(&rec).unwrap_err();
        assert!(matches!(err, MappingError::MissingField { ref field } if field == "provider_npi"));
    }

    #[test]
    fn test_unmapped_fields_reported() {
        let mapper = FieldMapper::new();
        let mut rec = messy_record();
        rec.insert("mystery_column".to_string(), Value::String("x".to_string()));
        let (_, unmapped) = mapper.normalize_record(&rec).unwrap();
        assert_eq!(unmapped, vec!["mystery_column".to_string()]);
    }

    #[test]
    fn test_unparsable_currency_rejected() {
        let mapper = FieldMapper::new();
        let mut rec = messy_record();
        rec.insert(
            "provider fees".to_string(),
            Value::String("not money".to_string()),
        );
        let err = mapper.normalize_record(&rec).unwrap_err();
        assert!(matches!(err, MappingError::UnparsableValue { .. }));
    }

    #[test]
    fn test_normalize_lines_adds_line_context() {
        let mapper = FieldMapper::new();
        let mut bad = messy_record();
        bad.remove("Subscriber#");
        let err = mapper
            .normalize_lines(&[messy_record(), bad])
            .unwrap_err();
        assert!(matches!(err, MappingError::InvalidLine { line: 2, .. }));
    }
}
