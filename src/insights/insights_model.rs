use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Which heuristic produced an insight. Doubles as the dedup key for
/// persistence: at most one stored row per (user, kind, period).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InsightKind {
    TopCategory,
    SmallPurchases,
    SpendingTrend,
    BudgetOverrun,
    CategoryHabit,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::TopCategory => "TOP_CATEGORY",
            InsightKind::SmallPurchases => "SMALL_PURCHASES",
            InsightKind::SpendingTrend => "SPENDING_TREND",
            InsightKind::BudgetOverrun => "BUDGET_OVERRUN",
            InsightKind::CategoryHabit => "CATEGORY_HABIT",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "TOP_CATEGORY" => Some(InsightKind::TopCategory),
            "SMALL_PURCHASES" => Some(InsightKind::SmallPurchases),
            "SPENDING_TREND" => Some(InsightKind::SpendingTrend),
            "BUDGET_OVERRUN" => Some(InsightKind::BudgetOverrun),
            "CATEGORY_HABIT" => Some(InsightKind::CategoryHabit),
            _ => None,
        }
    }
}

/// One generated observation. Derived and regenerable, never authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub kind: InsightKind,
    pub text: String,
}

/// Database model for persisted insights
#[derive(Queryable, Identifiable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::insights)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct InsightRecord {
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub period: String,
    pub content: String,
    pub is_read: bool,
    pub created_at: String,
}

impl InsightRecord {
    pub fn kind_enum(&self) -> Option<InsightKind> {
        InsightKind::from_str(&self.kind)
    }
}

#[derive(Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::insights)]
#[serde(rename_all = "camelCase")]
pub struct NewInsightRecord {
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub period: String,
    pub content: String,
    pub is_read: bool,
    pub created_at: String,
}
