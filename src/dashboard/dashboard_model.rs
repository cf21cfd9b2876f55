use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::budgets::{CategoryBudgetStatus, SpendingAllowance};
use crate::goals::GoalProgress;
use crate::insights::Insight;

/// Everything the dashboard screen needs in one payload.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub available_balance: Decimal,
    pub allowance: SpendingAllowance,
    pub budgets: Vec<CategoryBudgetStatus>,
    pub goals: Vec<GoalProgress>,
    pub insights: Vec<Insight>,
}
