//! Money calculation utilities using rust_decimal for precision
//!
//! Amounts are stored and serialized as `f64`. Every sum and difference is
//! computed in `Decimal` and rounded back to 2 decimal places.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
///
/// Input values are validated as finite at the boundary. If NaN/Infinity
/// somehow reaches here, logs an error and returns ZERO.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

#[inline]
fn round_dp(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert Decimal back to f64, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    let rounded = round_dp(value);
    rounded.to_f64().unwrap_or_else(|| {
        tracing::error!(value = %rounded, "Decimal not representable as f64, defaulting to zero");
        0.0
    })
}

/// Round an amount to cents
#[inline]
pub fn round_money(value: f64) -> f64 {
    to_f64(to_decimal(value))
}

/// Exact sum of amounts
pub fn sum<I: IntoIterator<Item = f64>>(values: I) -> Decimal {
    values.into_iter().map(to_decimal).sum()
}

/// Revenue / expense roll-up
///
/// `total = morning + evening`, `net = total - expense`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub morning: f64,
    pub evening: f64,
    pub expense: f64,
    pub total: f64,
    pub net: f64,
}

impl Totals {
    pub fn compute(morning: f64, evening: f64, expense: f64) -> Self {
        // 先按分取整再求和
        let m = round_dp(to_decimal(morning));
        let e = round_dp(to_decimal(evening));
        let x = round_dp(to_decimal(expense));
        let total = m + e;
        Self {
            morning: to_f64(m),
            evening: to_f64(e),
            expense: to_f64(x),
            total: to_f64(total),
            net: to_f64(total - x),
        }
    }
}

/// Plain decimal text without trailing zeros (`1200`, `120.5`)
pub fn format_amount(value: f64) -> String {
    round_dp(to_decimal(value)).normalize().to_string()
}
