//! Daily readiness aggregation.
//!
//! Reduces the three check-in indicators (sleep, physical form, motivation)
//! into a single load multiplier. The policy is weakest-link: one poor
//! indicator caps the whole day, and indicators are never averaged.

use crate::domain::{ReadinessLevel, ReadinessState};

/// Multiplier on a nominal day.
const GOOD_ADJUSTMENT: f64 = 1.0;
/// Multiplier when the weakest indicator is medium: a 5% backoff.
const MEDIUM_ADJUSTMENT: f64 = 0.95;
/// Multiplier when the weakest indicator is poor: a 10% backoff.
const POOR_ADJUSTMENT: f64 = 0.90;

/// Returns the load adjustment for a single readiness level.
pub fn adjustment(level: ReadinessLevel) -> f64 {
    match level {
        ReadinessLevel::Good => GOOD_ADJUSTMENT,
        ReadinessLevel::Medium => MEDIUM_ADJUSTMENT,
        ReadinessLevel::Poor => POOR_ADJUSTMENT,
    }
}

/// Reduces a check-in to the day's load multiplier.
///
/// Equivalent to looking up the adjustment of the weakest indicator: any
/// poor indicator gives 0.90, otherwise any medium indicator gives 0.95,
/// otherwise 1.0.
pub fn daily_multiplier(state: ReadinessState) -> f64 {
    adjustment(state.weakest_link())
}
