use chrono::NaiveDate;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::DATE_FORMAT;

/// Cadence over which a category spending cap resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetPeriod {
    Weekly,
    Monthly,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Weekly => "WEEKLY",
            BudgetPeriod::Monthly => "MONTHLY",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "WEEKLY" => Some(BudgetPeriod::Weekly),
            "MONTHLY" => Some(BudgetPeriod::Monthly),
            _ => None,
        }
    }
}

/// Spend classification against a budget's alert threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetStatus {
    Ok,
    Warning,
    Exceeded,
}

/// Database model for category budgets.
///
/// At most one row exists per (user_id, category_id, period); creation is
/// an upsert.
#[derive(
    Queryable,
    Identifiable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::budgets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub user_id: String,
    pub category_id: String,
    pub amount: String,
    pub period: String,
    pub start_date: String,
    pub alert_threshold: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl Budget {
    pub fn amount_decimal(&self) -> Decimal {
        self.amount.parse().unwrap_or(Decimal::ZERO)
    }

    pub fn period_enum(&self) -> BudgetPeriod {
        BudgetPeriod::from_str(&self.period).unwrap_or(BudgetPeriod::Monthly)
    }

    pub fn start_date_naive(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.start_date, DATE_FORMAT).ok()
    }
}

/// Model for inserting a budget row
#[derive(Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::budgets)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
    pub id: Option<String>,
    pub user_id: String,
    pub category_id: String,
    pub amount: String,
    pub period: String,
    pub start_date: String,
    pub alert_threshold: i32,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Caller-facing input for creating/updating a budget.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BudgetDraft {
    pub category_id: String,
    pub amount: Decimal,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub alert_threshold: Option<i32>,
}

/// Budget joined with its category for display.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BudgetWithCategory {
    #[serde(flatten)]
    pub budget: Budget,
    pub category_name: String,
}

/// Tracker output for one monthly category budget.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBudgetStatus {
    pub budget_id: String,
    pub category_id: String,
    pub category_name: String,
    pub budgeted: Decimal,
    pub spent: Decimal,
    /// Raw spend/budget ratio in percent; may exceed 100.
    pub percent_used: Decimal,
    /// Capped at 100 for progress-bar display.
    pub percent_display: Decimal,
    pub status: BudgetStatus,
    /// Urgent UI treatment: spend is past the budget by 20% or more.
    pub hard_exceeded: bool,
}

/// Recommended spending limits for the current month.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpendingAllowance {
    pub daily_budget: Decimal,
    pub weekly_budget: Decimal,
    pub days_left_in_month: i64,
    pub available_balance: Decimal,
}
