use crate::constants::{DATE_FORMAT, DISPLAY_DECIMAL_PRECISION};
use crate::errors::{Result, ValidationError};
use crate::goals::goals_model::{
    Goal, GoalDraft, GoalProgress, NewGoal, QuickSaveOutcome,
};
use crate::goals::goals_traits::{GoalRepositoryTrait, GoalServiceTrait};
use async_trait::async_trait;
use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

pub struct GoalService {
    repository: Arc<dyn GoalRepositoryTrait>,
}

impl GoalService {
    pub fn new(repository: Arc<dyn GoalRepositoryTrait>) -> Self {
        GoalService { repository }
    }

    fn validate_draft(draft: &GoalDraft) -> Result<()> {
        if draft.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        if draft.target_amount <= Decimal::ZERO {
            return Err(
                ValidationError::NonPositiveAmount(draft.target_amount.to_string()).into(),
            );
        }
        if draft.current_amount < Decimal::ZERO {
            return Err(ValidationError::InvalidInput(
                "current amount cannot be negative".to_string(),
            )
            .into());
        }
        if draft.end_date <= draft.start_date {
            return Err(ValidationError::InvalidDateRange(
                "end date must be after start date".to_string(),
            )
            .into());
        }
        Ok(())
    }

    fn display_percentage(current: Decimal, target: Decimal) -> Decimal {
        if target <= Decimal::ZERO {
            return Decimal::ONE_HUNDRED;
        }
        (current / target * Decimal::ONE_HUNDRED)
            .round_dp(DISPLAY_DECIMAL_PRECISION)
            .min(Decimal::ONE_HUNDRED)
    }
}

/// Candidate one-tap contribution amounts for a goal.
///
/// Sizes scale with the daily pace needed to finish on time, rounded up to
/// tens, hundreds or thousands, and never exceed what is left to save. An
/// already-reached goal gets no suggestions.
pub fn suggested_quick_saves(remaining: Decimal, days_left: i64) -> Vec<Decimal> {
    if remaining <= Decimal::ZERO {
        return Vec::new();
    }
    let daily_needed = remaining / Decimal::from(days_left.max(1));
    let step = if daily_needed > dec!(1000) {
        dec!(1000)
    } else if daily_needed > dec!(100) {
        dec!(100)
    } else {
        dec!(10)
    };

    let mut amounts = Vec::new();
    for multiplier in [dec!(1), dec!(2), dec!(5)] {
        let candidate = (daily_needed * multiplier / step).ceil() * step;
        if candidate <= remaining && !amounts.contains(&candidate) {
            amounts.push(candidate);
        }
    }
    amounts.sort();
    amounts.truncate(3);

    if amounts.is_empty() {
        amounts.push(Decimal::ONE.max(remaining.min(dec!(100))));
    }
    amounts
}

#[async_trait]
impl GoalServiceTrait for GoalService {
    fn get_goals(&self, user_id: &str) -> Result<Vec<Goal>> {
        self.repository.find_goals(user_id)
    }

    fn get_goal_progress(&self, user_id: &str, today: NaiveDate) -> Result<Vec<GoalProgress>> {
        let goals = self.repository.find_goals(user_id)?;
        let mut progress = Vec::with_capacity(goals.len());

        for goal in goals {
            let (start, end) = match (goal.start_date_naive(), goal.end_date_naive()) {
                (Some(s), Some(e)) => (s, e),
                _ => {
                    warn!("Skipping goal {} with unparsable dates", goal.id);
                    continue;
                }
            };

            let target = goal.target_amount_decimal();
            let current = goal.current_amount_decimal();
            let percentage = Self::display_percentage(current, target);

            let days_left = (end - today).num_days().max(0);
            let total_days = (end - start).num_days();
            let expected_progress_pct = if total_days <= 0 {
                Decimal::ZERO
            } else {
                let elapsed = (today - start).num_days().clamp(0, total_days);
                (Decimal::from(elapsed) * Decimal::ONE_HUNDRED / Decimal::from(total_days))
                    .round_dp(DISPLAY_DECIMAL_PRECISION)
            };

            let remaining = (target - current).max(Decimal::ZERO);

            progress.push(GoalProgress {
                id: goal.id.clone(),
                name: goal.name.clone(),
                target_amount: target,
                current_amount: current,
                percentage,
                remaining,
                priority: goal.priority_enum(),
                is_completed: goal.is_completed,
                goal_reached: goal.is_reached(),
                days_left,
                expected_progress_pct,
                on_track: percentage >= expected_progress_pct,
                suggested_quick_saves: suggested_quick_saves(remaining, days_left),
            });
        }
        Ok(progress)
    }

    async fn create_goal(&self, user_id: &str, draft: GoalDraft) -> Result<Goal> {
        Self::validate_draft(&draft)?;
        let new_goal = NewGoal {
            id: None,
            user_id: user_id.to_string(),
            name: draft.name.trim().to_string(),
            target_amount: draft.target_amount.to_string(),
            current_amount: draft.current_amount.to_string(),
            start_date: draft.start_date.format(DATE_FORMAT).to_string(),
            end_date: draft.end_date.format(DATE_FORMAT).to_string(),
            priority: draft.priority.as_str().to_string(),
            is_completed: false,
            created_at: None,
            updated_at: None,
        };
        self.repository.insert_goal(new_goal).await
    }

    async fn update_goal(&self, user_id: &str, id: &str, draft: GoalDraft) -> Result<Goal> {
        Self::validate_draft(&draft)?;
        self.repository.update_goal(id, user_id, draft).await
    }

    async fn quick_save(
        &self,
        user_id: &str,
        goal_id: &str,
        amount: Decimal,
        today: NaiveDate,
    ) -> Result<QuickSaveOutcome> {
        if amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount(amount.to_string()).into());
        }

        let applied = self
            .repository
            .quick_save(user_id, goal_id, amount, today)
            .await?;

        let target = applied.goal.target_amount_decimal();
        let new_amount = applied.goal.current_amount_decimal();
        let goal_reached = new_amount >= target;

        Ok(QuickSaveOutcome {
            new_amount,
            target_amount: target,
            percentage: Self::display_percentage(new_amount, target),
            goal_reached,
            // Fires exactly once, on the save that crosses the target.
            just_reached: goal_reached && applied.previous_amount < target,
            goal_name: applied.goal.name,
        })
    }

    async fn update_progress(
        &self,
        user_id: &str,
        goal_id: &str,
        new_current_amount: Decimal,
    ) -> Result<Goal> {
        if new_current_amount < Decimal::ZERO {
            return Err(ValidationError::InvalidInput(
                "current amount cannot be negative".to_string(),
            )
            .into());
        }
        self.repository
            .set_current_amount(user_id, goal_id, new_current_amount)
            .await
    }

    async fn complete(&self, user_id: &str, goal_id: &str, today: NaiveDate) -> Result<Goal> {
        self.repository.complete_goal(user_id, goal_id, today).await
    }

    async fn delete_goal(&self, user_id: &str, id: &str) -> Result<usize> {
        self.repository.delete_goal(id, user_id).await
    }
}
