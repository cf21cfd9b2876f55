use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Hard minimum for the recommended daily budget, in whole currency units.
/// The recommendation never drops below this floor even when funds are scarce.
pub const DEFAULT_DAILY_BUDGET: Decimal = dec!(500);

/// Share of monthly income used for the default weekly budget.
pub const WEEKLY_INCOME_RATIO: Decimal = dec!(0.25);

/// Budget usage percentage at which a WARNING status begins.
pub const DEFAULT_ALERT_THRESHOLD: i32 = 80;

/// Overspend factor required for the hard-exceeded signal (20% hysteresis
/// past the budget amount, so alerts do not flap right at 100%).
pub const HARD_EXCEEDED_FACTOR: Decimal = dec!(1.2);

/// Maximum number of insights returned per generation.
pub const MAX_INSIGHTS: usize = 5;

/// Purchases strictly below this amount count as "small".
pub const SMALL_PURCHASE_LIMIT: Decimal = dec!(10);

/// Minimum number of small purchases before they are reported.
pub const SMALL_PURCHASE_COUNT_THRESHOLD: usize = 5;

/// Minimum absolute period-over-period change (percent) worth reporting.
pub const TREND_REPORT_THRESHOLD: Decimal = dec!(10);

/// Minimum transaction count in a single category before it is called a habit.
pub const CATEGORY_HABIT_THRESHOLD: usize = 4;

/// Decimal precision for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Storage format for business dates (local calendar days).
pub const DATE_FORMAT: &str = "%Y-%m-%d";
