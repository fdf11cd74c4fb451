//! Decimal rounding policy for monetary values and rates.
//!
//! All amounts and rates in Cambio are [`rust_decimal::Decimal`] values,
//! never binary floats, so repeated conversions round reproducibly. Two
//! rounding points exist and are intentionally distinct: the high-precision
//! rate returned by rate lookups, and the coarser display precision used for
//! persisted rates and converted amounts.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places for exchange rates returned by rate lookups.
pub const RATE_DP: u32 = 9;

/// Decimal places for persisted/display values (rates and amounts).
pub const DISPLAY_DP: u32 = 2;

/// Round a rate to lookup precision (9 decimal places, half-up).
pub fn round_rate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(RATE_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a value to display precision (2 decimal places, half-up).
pub fn round_display(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DISPLAY_DP, RoundingStrategy::MidpointAwayFromZero)
}
