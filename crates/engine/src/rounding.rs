//! Two-decimal rounding for stored metrics
//!
//! Rounds through `rust_decimal` so values like 2.675 land on the decimal
//! neighbour a reader expects instead of the binary-float one.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// Round to `dp` decimal places, half away from zero
pub fn round_dp(value: f64, dp: u32) -> f64 {
    to_decimal(value, dp).to_f64().unwrap_or(value)
}

/// Round to cents
pub fn round2(value: f64) -> f64 {
    round_dp(value, 2)
}

/// `value` as a decimal rounded to `dp` places; non-finite input becomes zero
pub fn to_decimal(value: f64, dp: u32) -> Decimal {
    Decimal::from_f64(value)
        .unwrap_or_default()
        .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Split `total` into a `share` part and its remainder, both in cents.
/// The two parts always add back to the rounded total exactly.
pub fn split_cents(total: f64, share: f64) -> (Decimal, Decimal, Decimal) {
    let total = to_decimal(total, 2);
    let share = Decimal::from_f64(share).unwrap_or_default();
    let part = (total * share).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    (total, part, total - part)
}
