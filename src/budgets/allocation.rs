//! Spending allowance policies.
//!
//! Two independent rules: a daily recommendation derived from what is left
//! of this month's balance, and a weekly cap defaulting to a fixed share of
//! monthly income.

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::DEFAULT_DAILY_BUDGET;
use crate::spending::last_day_of_month;

/// Recommended daily budget from the month's remaining balance.
///
/// A positive balance is spread evenly over the remaining days and rounded
/// half-up to a whole currency unit; otherwise the default applies. The
/// result is floored at [`DEFAULT_DAILY_BUDGET`] either way, so the
/// recommendation never tells the user to spend less than the minimum.
pub fn compute_daily_budget(available_balance: Decimal, days_left: i64) -> Decimal {
    let days = Decimal::from(days_left.max(1));
    let computed = if available_balance > Decimal::ZERO {
        (available_balance / days)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    } else {
        DEFAULT_DAILY_BUDGET
    };
    computed.max(DEFAULT_DAILY_BUDGET)
}

/// Days remaining in the month containing `today`, inclusive of today.
/// Never less than 1.
pub fn days_left_in_month(today: NaiveDate) -> i64 {
    let remaining = i64::from(last_day_of_month(today).day()) - i64::from(today.day()) + 1;
    remaining.max(1)
}
