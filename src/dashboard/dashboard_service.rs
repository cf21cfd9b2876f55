use crate::budgets::BudgetServiceTrait;
use crate::categories::CategoryType;
use crate::dashboard::dashboard_model::DashboardSummary;
use crate::errors::Result;
use crate::goals::GoalServiceTrait;
use crate::insights::InsightServiceTrait;
use crate::spending::{DateRange, SpendingServiceTrait};
use chrono::NaiveDate;
use std::sync::Arc;

/// Read-only aggregation of the other services for one screen. Holds no
/// state and performs no writes of its own.
pub struct DashboardService {
    spending_service: Arc<dyn SpendingServiceTrait>,
    budget_service: Arc<dyn BudgetServiceTrait>,
    goal_service: Arc<dyn GoalServiceTrait>,
    insight_service: Arc<dyn InsightServiceTrait>,
}

impl DashboardService {
    pub fn new(
        spending_service: Arc<dyn SpendingServiceTrait>,
        budget_service: Arc<dyn BudgetServiceTrait>,
        goal_service: Arc<dyn GoalServiceTrait>,
        insight_service: Arc<dyn InsightServiceTrait>,
    ) -> Self {
        DashboardService {
            spending_service,
            budget_service,
            goal_service,
            insight_service,
        }
    }

    pub fn get_summary(
        &self,
        user_id: &str,
        range: &DateRange,
        today: NaiveDate,
    ) -> Result<DashboardSummary> {
        let total_income =
            self.spending_service
                .sum(user_id, CategoryType::Income, range, None)?;
        let total_expense =
            self.spending_service
                .sum(user_id, CategoryType::Expense, range, None)?;

        Ok(DashboardSummary {
            total_income,
            total_expense,
            available_balance: total_income - total_expense,
            allowance: self.budget_service.get_spending_allowance(user_id, today)?,
            budgets: self.budget_service.get_budget_statuses(user_id, today)?,
            goals: self.goal_service.get_goal_progress(user_id, today)?,
            insights: self.insight_service.generate(user_id, range)?,
        })
    }
}
