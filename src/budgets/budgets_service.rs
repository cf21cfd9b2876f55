use crate::budgets::allocation::{compute_daily_budget, days_left_in_month};
use crate::budgets::budgets_model::{
    Budget, BudgetDraft, BudgetPeriod, BudgetStatus, CategoryBudgetStatus, NewBudget,
    SpendingAllowance,
};
use crate::budgets::budgets_traits::{BudgetRepositoryTrait, BudgetServiceTrait};
use crate::categories::CategoryType;
use crate::constants::{
    DATE_FORMAT, DEFAULT_ALERT_THRESHOLD, DISPLAY_DECIMAL_PRECISION, HARD_EXCEEDED_FACTOR,
    WEEKLY_INCOME_RATIO,
};
use crate::errors::{Result, ValidationError};
use crate::spending::{DateRange, SpendingServiceTrait};
use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

pub struct BudgetService {
    repository: Arc<dyn BudgetRepositoryTrait>,
    spending_service: Arc<dyn SpendingServiceTrait>,
}

impl BudgetService {
    pub fn new(
        repository: Arc<dyn BudgetRepositoryTrait>,
        spending_service: Arc<dyn SpendingServiceTrait>,
    ) -> Self {
        BudgetService {
            repository,
            spending_service,
        }
    }

    fn classify(percent_used: Decimal, alert_threshold: i32) -> BudgetStatus {
        let threshold = Decimal::from(alert_threshold);
        if percent_used > Decimal::ONE_HUNDRED {
            BudgetStatus::Exceeded
        } else if percent_used >= threshold {
            BudgetStatus::Warning
        } else {
            BudgetStatus::Ok
        }
    }
}

#[async_trait]
impl BudgetServiceTrait for BudgetService {
    fn get_budgets(&self, user_id: &str, period: Option<BudgetPeriod>) -> Result<Vec<Budget>> {
        self.repository.find_budgets(user_id, period)
    }

    fn get_budget_statuses(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<CategoryBudgetStatus>> {
        let month = DateRange::month_of(today);
        let budgets = self
            .repository
            .find_budgets_with_categories(user_id, Some(BudgetPeriod::Monthly))?;

        let mut statuses = Vec::with_capacity(budgets.len());
        for entry in budgets {
            let budgeted = entry.budget.amount_decimal();
            if budgeted <= Decimal::ZERO {
                // amount > 0 is a data-model invariant; a corrupt row must
                // not take the whole dashboard down with a division by zero.
                debug!("Skipping budget {} with non-positive amount", entry.budget.id);
                continue;
            }

            let spent = self.spending_service.sum(
                user_id,
                CategoryType::Expense,
                &month,
                Some(&entry.budget.category_id),
            )?;

            // Classification works on the exact quotient; only the display
            // field is rounded, so a spend of 79.999% never rounds itself
            // across the threshold.
            let percent_used = spent / budgeted * Decimal::ONE_HUNDRED;
            let percent_display = percent_used
                .min(Decimal::ONE_HUNDRED)
                .round_dp(DISPLAY_DECIMAL_PRECISION);
            let hard_exceeded = spent > budgeted && spent > budgeted * HARD_EXCEEDED_FACTOR;

            statuses.push(CategoryBudgetStatus {
                budget_id: entry.budget.id.clone(),
                category_id: entry.budget.category_id.clone(),
                category_name: entry.category_name,
                budgeted,
                spent,
                percent_used,
                percent_display,
                status: Self::classify(percent_used, entry.budget.alert_threshold),
                hard_exceeded,
            });
        }
        Ok(statuses)
    }

    fn get_spending_allowance(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<SpendingAllowance> {
        let totals = self.spending_service.month_totals(user_id, today)?;
        let days_left = days_left_in_month(today);
        let daily_budget = compute_daily_budget(totals.available_balance, days_left);

        // An explicit weekly budget that has started overrides the income
        // share; newest row wins (find_budgets orders by created_at desc).
        let weekly_budget = self
            .repository
            .find_budgets(user_id, Some(BudgetPeriod::Weekly))?
            .into_iter()
            .find(|b| b.start_date_naive().is_some_and(|d| d <= today))
            .map(|b| b.amount_decimal())
            .unwrap_or_else(|| {
                (totals.total_income * WEEKLY_INCOME_RATIO).round_dp(DISPLAY_DECIMAL_PRECISION)
            });

        Ok(SpendingAllowance {
            daily_budget,
            weekly_budget,
            days_left_in_month: days_left,
            available_balance: totals.available_balance,
        })
    }

    async fn upsert_budget(&self, user_id: &str, draft: BudgetDraft) -> Result<Budget> {
        if draft.amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount(draft.amount.to_string()).into());
        }
        let alert_threshold = draft.alert_threshold.unwrap_or(DEFAULT_ALERT_THRESHOLD);
        if !(1..=100).contains(&alert_threshold) {
            return Err(ValidationError::InvalidInput(format!(
                "alert threshold must be between 1 and 100, got {}",
                alert_threshold
            ))
            .into());
        }

        let new_budget = NewBudget {
            id: None,
            user_id: user_id.to_string(),
            category_id: draft.category_id,
            amount: draft.amount.to_string(),
            period: draft.period.as_str().to_string(),
            start_date: draft.start_date.format(DATE_FORMAT).to_string(),
            alert_threshold,
            created_at: None,
            updated_at: None,
        };
        self.repository.upsert_budget(new_budget).await
    }

    async fn delete_budget(&self, id: &str, user_id: &str) -> Result<usize> {
        self.repository.delete_budget(id, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budgets::budgets_model::BudgetWithCategory;
    use crate::spending::{CategorySpend, MonthTotals};
    use crate::transactions::LedgerEntry;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockBudgetRepository {
        budgets: Mutex<Vec<BudgetWithCategory>>,
    }

    impl MockBudgetRepository {
        fn with(budgets: Vec<BudgetWithCategory>) -> Self {
            Self {
                budgets: Mutex::new(budgets),
            }
        }
    }

    #[async_trait]
    impl BudgetRepositoryTrait for MockBudgetRepository {
        fn find_budgets(
            &self,
            user_id: &str,
            period: Option<BudgetPeriod>,
        ) -> Result<Vec<Budget>> {
            let mut rows: Vec<Budget> = self
                .budgets
                .lock()
                .unwrap()
                .iter()
                .map(|b| b.budget.clone())
                .filter(|b| b.user_id == user_id)
                .filter(|b| period.map_or(true, |p| b.period_enum() == p))
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(rows)
        }

        fn find_budgets_with_categories(
            &self,
            user_id: &str,
            period: Option<BudgetPeriod>,
        ) -> Result<Vec<BudgetWithCategory>> {
            Ok(self
                .budgets
                .lock()
                .unwrap()
                .iter()
                .filter(|b| b.budget.user_id == user_id)
                .filter(|b| period.map_or(true, |p| b.budget.period_enum() == p))
                .cloned()
                .collect())
        }

        async fn upsert_budget(&self, new_budget: NewBudget) -> Result<Budget> {
            let budget = Budget {
                id: new_budget.id.unwrap_or_else(|| "b1".to_string()),
                user_id: new_budget.user_id,
                category_id: new_budget.category_id,
                amount: new_budget.amount,
                period: new_budget.period,
                start_date: new_budget.start_date,
                alert_threshold: new_budget.alert_threshold,
                created_at: "2025-05-01T00:00:00Z".to_string(),
                updated_at: "2025-05-01T00:00:00Z".to_string(),
            };
            self.budgets.lock().unwrap().push(BudgetWithCategory {
                budget: budget.clone(),
                category_name: "test".to_string(),
            });
            Ok(budget)
        }

        async fn delete_budget(&self, _id: &str, _user_id: &str) -> Result<usize> {
            Ok(1)
        }
    }

    struct MockSpending {
        spent_per_category: Decimal,
        income: Decimal,
        expense: Decimal,
    }

    impl SpendingServiceTrait for MockSpending {
        fn sum(
            &self,
            _user_id: &str,
            kind: CategoryType,
            _range: &DateRange,
            category_id: Option<&str>,
        ) -> Result<Decimal> {
            Ok(match (kind, category_id) {
                (CategoryType::Expense, Some(_)) => self.spent_per_category,
                (CategoryType::Expense, None) => self.expense,
                (CategoryType::Income, _) => self.income,
            })
        }

        fn month_totals(&self, _user_id: &str, _day: NaiveDate) -> Result<MonthTotals> {
            Ok(MonthTotals {
                total_income: self.income,
                total_expense: self.expense,
                available_balance: self.income - self.expense,
            })
        }

        fn expense_breakdown(
            &self,
            _user_id: &str,
            _range: &DateRange,
        ) -> Result<Vec<CategorySpend>> {
            Ok(vec![])
        }

        fn expense_entries(
            &self,
            _user_id: &str,
            _range: &DateRange,
        ) -> Result<Vec<LedgerEntry>> {
            Ok(vec![])
        }
    }

    fn monthly_budget(id: &str, amount: &str, threshold: i32) -> BudgetWithCategory {
        BudgetWithCategory {
            budget: Budget {
                id: id.to_string(),
                user_id: "u1".to_string(),
                category_id: format!("cat_{}", id),
                amount: amount.to_string(),
                period: "MONTHLY".to_string(),
                start_date: "2025-05-01".to_string(),
                alert_threshold: threshold,
                created_at: "2025-05-01T00:00:00Z".to_string(),
                updated_at: "2025-05-01T00:00:00Z".to_string(),
            },
            category_name: "Dining".to_string(),
        }
    }

    fn weekly_budget(id: &str, amount: &str, start: &str, created: &str) -> BudgetWithCategory {
        let mut b = monthly_budget(id, amount, 80);
        b.budget.period = "WEEKLY".to_string();
        b.budget.start_date = start.to_string();
        b.budget.created_at = created.to_string();
        b
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 15).unwrap()
    }

    fn service(budgets: Vec<BudgetWithCategory>, spending: MockSpending) -> BudgetService {
        BudgetService::new(Arc::new(MockBudgetRepository::with(budgets)), Arc::new(spending))
    }

    #[test]
    fn overspent_budget_is_exceeded_and_hard_flagged() {
        let svc = service(
            vec![monthly_budget("b1", "1000", 80)],
            MockSpending {
                spent_per_category: dec!(1350),
                income: dec!(0),
                expense: dec!(1350),
            },
        );
        let statuses = svc.get_budget_statuses("u1", today()).unwrap();
        assert_eq!(statuses.len(), 1);
        let s = &statuses[0];
        assert_eq!(s.percent_used, dec!(135));
        assert_eq!(s.percent_display, dec!(100));
        assert_eq!(s.status, BudgetStatus::Exceeded);
        assert!(s.hard_exceeded, "135% is past the 20% hysteresis band");
    }

    #[test]
    fn just_over_budget_is_exceeded_but_not_hard_flagged() {
        let svc = service(
            vec![monthly_budget("b1", "1000", 80)],
            MockSpending {
                spent_per_category: dec!(1100),
                income: dec!(0),
                expense: dec!(1100),
            },
        );
        let s = &svc.get_budget_statuses("u1", today()).unwrap()[0];
        assert_eq!(s.status, BudgetStatus::Exceeded);
        assert!(!s.hard_exceeded, "110% sits inside the hysteresis band");
    }

    #[test]
    fn warning_begins_at_the_alert_threshold() {
        let svc = service(
            vec![monthly_budget("b1", "1000", 80)],
            MockSpending {
                spent_per_category: dec!(800),
                income: dec!(0),
                expense: dec!(800),
            },
        );
        let s = &svc.get_budget_statuses("u1", today()).unwrap()[0];
        assert_eq!(s.status, BudgetStatus::Warning);

        let svc = service(
            vec![monthly_budget("b1", "1000", 80)],
            MockSpending {
                spent_per_category: dec!(799.99),
                income: dec!(0),
                expense: dec!(799.99),
            },
        );
        let s = &svc.get_budget_statuses("u1", today()).unwrap()[0];
        assert_eq!(s.status, BudgetStatus::Ok);
    }

    #[test]
    fn classification_uses_the_exact_quotient_not_the_display_value() {
        // 1000.004 of 1000 is 100.0004%: displays as 100 but is exceeded.
        let svc = service(
            vec![monthly_budget("b1", "1000", 80)],
            MockSpending {
                spent_per_category: dec!(1000.004),
                income: dec!(0),
                expense: dec!(1000.004),
            },
        );
        let s = &svc.get_budget_statuses("u1", today()).unwrap()[0];
        assert!(s.percent_used > dec!(100));
        assert_eq!(s.percent_display, dec!(100));
        assert_eq!(s.status, BudgetStatus::Exceeded);
        assert!(!s.hard_exceeded);
    }

    #[test]
    fn allowance_uses_income_share_without_weekly_budget() {
        let svc = service(
            vec![],
            MockSpending {
                spent_per_category: dec!(0),
                income: dec!(4000),
                expense: dec!(1000),
            },
        );
        let allowance = svc.get_spending_allowance("u1", today()).unwrap();
        assert_eq!(allowance.weekly_budget, dec!(1000.00));
        // 3000 over 17 remaining days computes to 176/day; the floor wins.
        assert_eq!(allowance.days_left_in_month, 17);
        assert_eq!(allowance.daily_budget, dec!(500));
    }

    #[test]
    fn started_weekly_budget_overrides_income_share() {
        let svc = service(
            vec![
                weekly_budget("old", "700", "2025-05-01", "2025-05-01T00:00:00Z"),
                weekly_budget("new", "900", "2025-05-10", "2025-05-10T00:00:00Z"),
                weekly_budget("future", "50", "2025-06-01", "2025-06-01T00:00:00Z"),
            ],
            MockSpending {
                spent_per_category: dec!(0),
                income: dec!(4000),
                expense: dec!(0),
            },
        );
        let allowance = svc.get_spending_allowance("u1", today()).unwrap();
        // Newest started row wins; the future-dated one is ignored.
        assert_eq!(allowance.weekly_budget, dec!(900));
    }

    #[test]
    fn zero_income_means_zero_weekly_default() {
        let svc = service(
            vec![],
            MockSpending {
                spent_per_category: dec!(0),
                income: dec!(0),
                expense: dec!(0),
            },
        );
        let allowance = svc.get_spending_allowance("u1", today()).unwrap();
        assert_eq!(allowance.weekly_budget, dec!(0.00));
    }

    #[tokio::test]
    async fn upsert_rejects_non_positive_amounts_and_bad_thresholds() {
        let svc = service(
            vec![],
            MockSpending {
                spent_per_category: dec!(0),
                income: dec!(0),
                expense: dec!(0),
            },
        );
        let draft = BudgetDraft {
            category_id: "cat_1".to_string(),
            amount: dec!(0),
            period: BudgetPeriod::Monthly,
            start_date: today(),
            alert_threshold: None,
        };
        assert!(svc.upsert_budget("u1", draft.clone()).await.is_err());

        let draft_bad_threshold = BudgetDraft {
            amount: dec!(100),
            alert_threshold: Some(0),
            ..draft
        };
        assert!(svc.upsert_budget("u1", draft_bad_threshold).await.is_err());
    }
}
