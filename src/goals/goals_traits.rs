use crate::errors::Result;
use crate::goals::goals_model::{
    Goal, GoalDraft, GoalProgress, NewGoal, QuickSave, QuickSaveApplied, QuickSaveOutcome,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Trait for goal repository operations
#[async_trait]
pub trait GoalRepositoryTrait: Send + Sync {
    fn find_goals(&self, user_id: &str) -> Result<Vec<Goal>>;

    fn get_goal(&self, id: &str, user_id: &str) -> Result<Goal>;

    fn find_quick_saves(&self, goal_id: &str, user_id: &str) -> Result<Vec<QuickSave>>;

    async fn insert_goal(&self, new_goal: NewGoal) -> Result<Goal>;

    async fn update_goal(&self, id: &str, user_id: &str, draft: GoalDraft) -> Result<Goal>;

    /// Atomically adds `amount` to the goal's balance and appends the audit
    /// row. Both land or neither does.
    async fn quick_save(
        &self,
        user_id: &str,
        goal_id: &str,
        amount: Decimal,
        save_date: NaiveDate,
    ) -> Result<QuickSaveApplied>;

    /// Overwrites the balance without touching the audit ledger.
    async fn set_current_amount(
        &self,
        user_id: &str,
        goal_id: &str,
        new_amount: Decimal,
    ) -> Result<Goal>;

    /// Marks the goal completed. Fails with a conflict if it already is.
    async fn complete_goal(
        &self,
        user_id: &str,
        goal_id: &str,
        completion_date: NaiveDate,
    ) -> Result<Goal>;

    async fn delete_goal(&self, id: &str, user_id: &str) -> Result<usize>;
}

/// Trait for goal service operations
#[async_trait]
pub trait GoalServiceTrait: Send + Sync {
    fn get_goals(&self, user_id: &str) -> Result<Vec<Goal>>;

    /// Every goal for the user with derived pacing fields for display.
    fn get_goal_progress(&self, user_id: &str, today: NaiveDate) -> Result<Vec<GoalProgress>>;

    async fn create_goal(&self, user_id: &str, draft: GoalDraft) -> Result<Goal>;

    async fn update_goal(&self, user_id: &str, id: &str, draft: GoalDraft) -> Result<Goal>;

    async fn quick_save(
        &self,
        user_id: &str,
        goal_id: &str,
        amount: Decimal,
        today: NaiveDate,
    ) -> Result<QuickSaveOutcome>;

    /// Manual correction of the balance; additive history is untouched.
    async fn update_progress(
        &self,
        user_id: &str,
        goal_id: &str,
        new_current_amount: Decimal,
    ) -> Result<Goal>;

    async fn complete(&self, user_id: &str, goal_id: &str, today: NaiveDate) -> Result<Goal>;

    async fn delete_goal(&self, user_id: &str, id: &str) -> Result<usize>;
}
