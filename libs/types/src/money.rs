//! Currency parsing and fixed-point conversion helpers
//!
//! All money is carried as `rust_decimal::Decimal` with two decimal places
//! (HALF_UP rounding). The aggregation sketch stores integer cents, so the
//! conversions here must be exact for any 2-dp amount.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::CalculationError;

/// Parse a raw currency value into a Decimal.
///
/// Accepts plain decimal strings as well as formatted values such as
/// `"$1,000.00"` or `" 12.5 "`. Empty input parses to zero, matching how
/// absent optional amounts are treated during normalization.
pub fn parse_amount(raw: &str) -> Result<Decimal, CalculationError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return Ok(Decimal::ZERO);
    }

    cleaned
        .parse::<Decimal>()
        .map(round_money)
        .map_err(|_| CalculationError::InvalidAmount {
            value: raw.to_string(),
        })
}

/// Round a monetary amount to two decimal places, HALF_UP.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a non-negative 2-dp amount to integer cents.
///
/// Returns `None` for negative amounts or values too large for `u64`;
/// callers reject those before the amount ever reaches the sketch.
pub fn to_cents(amount: Decimal) -> Option<u64> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return None;
    }
    round_money(amount)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.to_u64())
}

/// Convert integer cents back to a 2-dp Decimal amount.
pub fn cents_to_decimal(cents: u64) -> Decimal {
    Decimal::from_i128_with_scale(cents as i128, 2)
}
