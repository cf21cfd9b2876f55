use chrono::NaiveDate;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::DATE_FORMAT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalPriority {
    Low,
    Medium,
    High,
}

impl GoalPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalPriority::Low => "LOW",
            GoalPriority::Medium => "MEDIUM",
            GoalPriority::High => "HIGH",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "LOW" => Some(GoalPriority::Low),
            "MEDIUM" => Some(GoalPriority::Medium),
            "HIGH" => Some(GoalPriority::High),
            _ => None,
        }
    }
}

/// Database model for savings goals.
///
/// `is_completed` is a one-way flag set by an explicit complete action.
/// Reaching the target amount does not flip it; `current_amount` may keep
/// growing past `target_amount`.
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
#[diesel(table_name = crate::schema::goals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub target_amount: String,
    pub current_amount: String,
    pub start_date: String,
    pub end_date: String,
    pub priority: String,
    pub is_completed: bool,
    pub completion_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Goal {
    pub fn target_amount_decimal(&self) -> Decimal {
        self.target_amount.parse().unwrap_or(Decimal::ZERO)
    }

    pub fn current_amount_decimal(&self) -> Decimal {
        self.current_amount.parse().unwrap_or(Decimal::ZERO)
    }

    pub fn priority_enum(&self) -> GoalPriority {
        GoalPriority::from_str(&self.priority).unwrap_or(GoalPriority::Medium)
    }

    pub fn start_date_naive(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.start_date, DATE_FORMAT).ok()
    }

    pub fn end_date_naive(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.end_date, DATE_FORMAT).ok()
    }

    /// Computed fact, distinct from the persisted completed state.
    pub fn is_reached(&self) -> bool {
        self.current_amount_decimal() >= self.target_amount_decimal()
    }
}

/// Model for inserting a goal row
#[derive(Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::goals)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub id: Option<String>,
    pub user_id: String,
    pub name: String,
    pub target_amount: String,
    pub current_amount: String,
    pub start_date: String,
    pub end_date: String,
    pub priority: String,
    pub is_completed: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Caller-facing input for creating or editing a goal.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GoalDraft {
    pub name: String,
    pub target_amount: Decimal,
    #[serde(default)]
    pub current_amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub priority: GoalPriority,
}

/// Append-only audit row for one quick-save contribution. Never updated or
/// deleted; the sum of a goal's rows plus its initial seed reconciles with
/// `current_amount`.
#[derive(Queryable, Identifiable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::quick_saves)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct QuickSave {
    pub id: String,
    pub user_id: String,
    pub goal_id: String,
    pub amount: String,
    pub save_date: String,
}

impl QuickSave {
    pub fn amount_decimal(&self) -> Decimal {
        self.amount.parse().unwrap_or(Decimal::ZERO)
    }
}

#[derive(Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::quick_saves)]
#[serde(rename_all = "camelCase")]
pub struct NewQuickSave {
    pub id: String,
    pub user_id: String,
    pub goal_id: String,
    pub amount: String,
    pub save_date: String,
}

/// Result of the atomic quick-save write: the goal after the increment plus
/// the balance it held before, needed for edge-triggered notifications.
#[derive(Debug, Clone)]
pub struct QuickSaveApplied {
    pub previous_amount: Decimal,
    pub goal: Goal,
}

/// Caller-facing outcome of a quick-save.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuickSaveOutcome {
    pub new_amount: Decimal,
    pub target_amount: Decimal,
    /// Capped at 100 for display.
    pub percentage: Decimal,
    pub goal_reached: bool,
    /// True only on the call that pushed the balance across the target.
    pub just_reached: bool,
    pub goal_name: String,
}

/// Display projection of a goal with derived pacing fields.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub id: String,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    /// Capped at 100; over-saving is shown through `current_amount` instead.
    pub percentage: Decimal,
    /// What is left to save; zero once the target is reached.
    pub remaining: Decimal,
    pub priority: GoalPriority,
    pub is_completed: bool,
    pub goal_reached: bool,
    pub days_left: i64,
    /// Where the balance should be by now, assuming linear pacing.
    pub expected_progress_pct: Decimal,
    pub on_track: bool,
    pub suggested_quick_saves: Vec<Decimal>,
}
