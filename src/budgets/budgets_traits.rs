use crate::budgets::budgets_model::{
    Budget, BudgetDraft, BudgetPeriod, BudgetWithCategory, CategoryBudgetStatus, NewBudget,
    SpendingAllowance,
};
use crate::errors::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Trait for budget repository operations
#[async_trait]
pub trait BudgetRepositoryTrait: Send + Sync {
    fn find_budgets(&self, user_id: &str, period: Option<BudgetPeriod>) -> Result<Vec<Budget>>;

    fn find_budgets_with_categories(
        &self,
        user_id: &str,
        period: Option<BudgetPeriod>,
    ) -> Result<Vec<BudgetWithCategory>>;

    /// Insert, or update the existing row for (user, category, period).
    async fn upsert_budget(&self, new_budget: NewBudget) -> Result<Budget>;

    async fn delete_budget(&self, id: &str, user_id: &str) -> Result<usize>;
}

/// Trait for budget service operations
#[async_trait]
pub trait BudgetServiceTrait: Send + Sync {
    fn get_budgets(&self, user_id: &str, period: Option<BudgetPeriod>) -> Result<Vec<Budget>>;

    /// Per-category status of every monthly budget for the month
    /// containing `today`.
    fn get_budget_statuses(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<CategoryBudgetStatus>>;

    /// Recommended daily and weekly spending limits.
    fn get_spending_allowance(&self, user_id: &str, today: NaiveDate)
        -> Result<SpendingAllowance>;

    async fn upsert_budget(&self, user_id: &str, draft: BudgetDraft) -> Result<Budget>;

    async fn delete_budget(&self, id: &str, user_id: &str) -> Result<usize>;
}
