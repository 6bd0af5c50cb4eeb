//! Day-over-day percentage change.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Percentage change from `previous` to `current`: `(current - previous) / previous * 100`.
///
/// Returns `0.0` when there is no previous value or the previous value is zero,
/// so a first entry or a day recovering from zero never reports an infinite change.
///
/// ```
/// use rust_decimal::Decimal;
/// use tallybook_core::percent_change;
///
/// let pct = percent_change(Decimal::from(1200), Some(Decimal::from(1000)));
/// assert!((pct - 20.0).abs() < 0.01);
/// assert_eq!(percent_change(Decimal::from(5), Some(Decimal::ZERO)), 0.0);
/// assert_eq!(percent_change(Decimal::from(5), None), 0.0);
/// ```
#[must_use]
pub fn percent_change(current: Decimal, previous: Option<Decimal>) -> f64 {
    let Some(previous) = previous.filter(|p| !p.is_zero()) else {
        return 0.0;
    };

    ((current - previous) / previous * Decimal::ONE_HUNDRED)
        .round_dp(4)
        .to_f64()
        .unwrap_or(0.0)
}
