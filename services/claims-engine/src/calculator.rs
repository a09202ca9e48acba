//! Net fee and claim total calculations
//!
//! The net fee is what remains owed after patient-responsibility amounts
//! come out of the allowed fee, floored at zero:
//!
//! `net_fee = max(allowed_fee − member_coinsurance − member_copay, 0)`
//!
//! The floor keeps downstream aggregation safe: the provider-stats sketch
//! only accepts non-negative contributions, so a claim line can never
//! retract fees another line added.

use rust_decimal::Decimal;

use types::claim::ClaimLine;
use types::errors::CalculationError;
use types::money;

/// Compute the net fee for one claim line.
///
/// All four amounts must be non-negative; a negative raw input is a data
/// error surfaced as `NegativeAmount` before anything reaches the sketch.
pub fn compute_net_fee(
    submitted_fee: Decimal,
    allowed_fee: Decimal,
    member_coinsurance: Decimal,
    member_copay: Decimal,
) -> Result<Decimal, CalculationError> {
    for (field, amount) in [
        ("submitted_fee", submitted_fee),
        ("allowed_fee", allowed_fee),
        ("member_coinsurance", member_coinsurance),
        ("member_copay", member_copay),
    ] {
        if amount < Decimal::ZERO {
            return Err(CalculationError::NegativeAmount {
                field: field.to_string(),
                value: amount.to_string(),
            });
        }
    }

    let net = allowed_fee - member_coinsurance - member_copay;
    Ok(money::round_money(net.max(Decimal::ZERO)))
}

/// Per-claim aggregation over all lines.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimTotals {
    pub total_submitted_fees: Decimal,
    pub total_allowed_fees: Decimal,
    pub total_member_coinsurance: Decimal,
    pub total_member_copay: Decimal,
    /// Sum of per-line net fees
    pub total_net_fee: Decimal,
    /// Net fee per line, in line order; feeds the aggregation core
    pub line_net_fees: Vec<Decimal>,
    /// coinsurance + copay
    pub member_responsibility: Decimal,
    /// submitted − allowed (write-off)
    pub provider_adjustment: Decimal,
    pub average_net_fee: Decimal,
}

impl ClaimTotals {
    /// Computes all totals for a claim's lines.
    pub fn from_lines(lines: &[ClaimLine]) -> Result<Self, CalculationError> {
        let mut totals = Self {
            total_submitted_fees: Decimal::ZERO,
            total_allowed_fees: Decimal::ZERO,
            total_member_coinsurance: Decimal::ZERO,
            total_member_copay: Decimal::ZERO,
            total_net_fee: Decimal::ZERO,
            line_net_fees: Vec::with_capacity(lines.len()),
            member_responsibility: Decimal::ZERO,
            provider_adjustment: Decimal::ZERO,
            average_net_fee: Decimal::ZERO,
        };

        for line in lines {
            let net = compute_net_fee(
                line.submitted_fee,
                line.allowed_fee,
                line.member_coinsurance,
                line.member_copay,
            )?;

            totals.total_submitted_fees += line.submitted_fee;
            totals.total_allowed_fees += line.allowed_fee;
            totals.total_member_coinsurance += line.member_coinsurance;
            totals.total_member_copay += line.member_copay;
            totals.total_net_fee += net;
            totals.line_net_fees.push(net);
        }

        totals.member_responsibility =
            totals.total_member_coinsurance + totals.total_member_copay;
        totals.provider_adjustment =
            totals.total_submitted_fees - totals.total_allowed_fees;
        if !lines.is_empty() {
            totals.average_net_fee = money::round_money(
                totals.total_net_fee / Decimal::from(lines.len()),
            );
        }

        Ok(totals)
    }
}
