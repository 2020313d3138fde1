//! Amount policies for statement figures.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Statement figures are `Option<Decimal>`: `None` means "no value entered",
//! which is distinct from an entered zero. Two policies decide when a
//! computed figure is reported, and they must not be mixed:
//!
//! - [`zero_to_absent`] for ordinary roll-ups and cumulative balances,
//!   where an exact zero total is shown as "no value".
//! - [`clamp_non_positive_to_zero`] for the Surplus/Deficit and Net Financial
//!   Assets cumulative balances, which always carry a literal figure and
//!   never go below zero.
//!
//! Sums and differences saturate at `Decimal::MAX` / `Decimal::MIN` instead of
//! overflowing, so recomputation never fails on oversized figures.

use rust_decimal::Decimal;

/// Maps an exact zero total to "no value".
///
/// Negative and positive totals are kept as they are.
#[must_use]
pub fn zero_to_absent(total: Decimal) -> Option<Decimal> {
    if total.is_zero() { None } else { Some(total) }
}

/// Floors a total at a literal zero.
#[must_use]
pub fn clamp_non_positive_to_zero(total: Decimal) -> Decimal {
    if total <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        total
    }
}

/// Sums figures, counting missing ones as zero. Saturates on overflow.
pub fn sum_present<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Option<Decimal>>,
{
    values
        .into_iter()
        .flatten()
        .fold(Decimal::ZERO, Decimal::saturating_add)
}
