use crate::budgets::BudgetServiceTrait;
use crate::constants::{
    CATEGORY_HABIT_THRESHOLD, DATE_FORMAT, MAX_INSIGHTS, SMALL_PURCHASE_COUNT_THRESHOLD,
    SMALL_PURCHASE_LIMIT, TREND_REPORT_THRESHOLD,
};
use crate::errors::Result;
use crate::insights::insights_model::{Insight, InsightKind, InsightRecord};
use crate::insights::insights_traits::{InsightRepositoryTrait, InsightServiceTrait};
use crate::spending::{DateRange, SpendingServiceTrait};
use async_trait::async_trait;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Storage key for the period a set of insights was generated over.
pub fn period_key(range: &DateRange) -> String {
    format!(
        "{}..{}",
        range.start().format(DATE_FORMAT),
        range.end().format(DATE_FORMAT)
    )
}

pub struct InsightService {
    repository: Arc<dyn InsightRepositoryTrait>,
    spending_service: Arc<dyn SpendingServiceTrait>,
    budget_service: Arc<dyn BudgetServiceTrait>,
}

impl InsightService {
    pub fn new(
        repository: Arc<dyn InsightRepositoryTrait>,
        spending_service: Arc<dyn SpendingServiceTrait>,
        budget_service: Arc<dyn BudgetServiceTrait>,
    ) -> Self {
        InsightService {
            repository,
            spending_service,
            budget_service,
        }
    }
}

#[async_trait]
impl InsightServiceTrait for InsightService {
    fn generate(&self, user_id: &str, range: &DateRange) -> Result<Vec<Insight>> {
        let mut insights = Vec::new();

        let breakdown = self.spending_service.expense_breakdown(user_id, range)?;
        let total_expense: Decimal = breakdown.iter().map(|c| c.total).sum();

        // 1. Top spending category.
        if let Some(top) = breakdown.first() {
            if top.total > Decimal::ZERO {
                insights.push(Insight {
                    kind: InsightKind::TopCategory,
                    text: format!(
                        "Your biggest spending category was {} at {}.",
                        top.category_name,
                        top.total.round_dp(2)
                    ),
                });
            }
        }

        // 2. Frequent small purchases.
        let entries = self.spending_service.expense_entries(user_id, range)?;
        let small: Vec<_> = entries
            .iter()
            .filter(|e| e.amount < SMALL_PURCHASE_LIMIT)
            .collect();
        if small.len() > SMALL_PURCHASE_COUNT_THRESHOLD {
            let small_total: Decimal = small.iter().map(|e| e.amount).sum();
            insights.push(Insight {
                kind: InsightKind::SmallPurchases,
                text: format!(
                    "{} purchases under {} added up to about {}.",
                    small.len(),
                    SMALL_PURCHASE_LIMIT,
                    small_total.round_dp(2)
                ),
            });
        }

        // 3. Period-over-period trend against the preceding equal-length range.
        let previous_expense =
            self.spending_service
                .sum(user_id, crate::categories::CategoryType::Expense, &range.preceding(), None)?;
        if previous_expense > Decimal::ZERO {
            let change = (total_expense - previous_expense) / previous_expense
                * Decimal::ONE_HUNDRED;
            if change.abs() > TREND_REPORT_THRESHOLD {
                let text = if change < Decimal::ZERO {
                    format!(
                        "Nice work: you spent {}% less than in the previous period.",
                        change.abs().round_dp(0)
                    )
                } else {
                    format!(
                        "Heads up: spending is up {}% compared to the previous period.",
                        change.round_dp(0)
                    )
                };
                insights.push(Insight {
                    kind: InsightKind::SpendingTrend,
                    text,
                });
            }
        }

        // 4. Worst monthly budget overrun, anchored on the range's end date.
        let statuses = self
            .budget_service
            .get_budget_statuses(user_id, range.end())?;
        if let Some(worst) = statuses
            .iter()
            .filter(|s| s.percent_used > Decimal::ONE_HUNDRED)
            .max_by(|a, b| a.percent_used.cmp(&b.percent_used))
        {
            insights.push(Insight {
                kind: InsightKind::BudgetOverrun,
                text: format!(
                    "Your {} budget is over by {}%.",
                    worst.category_name,
                    (worst.percent_used - Decimal::ONE_HUNDRED).round_dp(0)
                ),
            });
        }

        // 5. Habitual category: the one hit most often, if often enough.
        if let Some(habit) = breakdown
            .iter()
            .filter(|c| c.transaction_count as usize > CATEGORY_HABIT_THRESHOLD)
            .max_by_key(|c| c.transaction_count)
        {
            insights.push(Insight {
                kind: InsightKind::CategoryHabit,
                text: format!(
                    "You spent on {} {} separate times this period.",
                    habit.category_name, habit.transaction_count
                ),
            });
        }

        insights.truncate(MAX_INSIGHTS);
        debug!(
            "Generated {} insights for {} over {}",
            insights.len(),
            user_id,
            period_key(range)
        );
        Ok(insights)
    }

    async fn generate_and_store(
        &self,
        user_id: &str,
        range: &DateRange,
    ) -> Result<Vec<InsightRecord>> {
        let insights = self.generate(user_id, range)?;
        self.repository
            .replace_insights(user_id, &period_key(range), insights)
            .await
    }

    fn get_insights(&self, user_id: &str, period: Option<&str>) -> Result<Vec<InsightRecord>> {
        self.repository.find_insights(user_id, period)
    }

    async fn mark_read(&self, id: &str, user_id: &str) -> Result<usize> {
        self.repository.mark_read(id, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budgets::{
        Budget, BudgetDraft, BudgetPeriod, BudgetStatus, CategoryBudgetStatus, SpendingAllowance,
    };
    use crate::categories::CategoryType;
    use crate::errors::Error;
    use crate::spending::{CategorySpend, MonthTotals};
    use crate::transactions::LedgerEntry;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    struct FixedSpending {
        entries: Vec<LedgerEntry>,
        previous_total: Decimal,
    }

    impl SpendingServiceTrait for FixedSpending {
        fn sum(
            &self,
            _user_id: &str,
            _kind: CategoryType,
            _range: &DateRange,
            _category_id: Option<&str>,
        ) -> Result<Decimal> {
            // Only consulted for the preceding period.
            Ok(self.previous_total)
        }

        fn month_totals(&self, _user_id: &str, _day: NaiveDate) -> Result<MonthTotals> {
            unimplemented!("not used by insight generation")
        }

        fn expense_breakdown(
            &self,
            _user_id: &str,
            _range: &DateRange,
        ) -> Result<Vec<CategorySpend>> {
            let mut by_category: Vec<CategorySpend> = Vec::new();
            for entry in &self.entries {
                match by_category
                    .iter_mut()
                    .find(|c| c.category_id == entry.category_id)
                {
                    Some(slot) => {
                        slot.total += entry.amount;
                        slot.transaction_count += 1;
                    }
                    None => by_category.push(CategorySpend {
                        category_id: entry.category_id.clone(),
                        category_name: entry.category_name.clone(),
                        category_color: None,
                        total: entry.amount,
                        transaction_count: 1,
                    }),
                }
            }
            by_category.sort_by(|a, b| b.total.cmp(&a.total));
            Ok(by_category)
        }

        fn expense_entries(
            &self,
            _user_id: &str,
            _range: &DateRange,
        ) -> Result<Vec<LedgerEntry>> {
            Ok(self.entries.clone())
        }
    }

    struct FixedBudgets {
        statuses: Vec<CategoryBudgetStatus>,
    }

    #[async_trait]
    impl BudgetServiceTrait for FixedBudgets {
        fn get_budgets(
            &self,
            _user_id: &str,
            _period: Option<BudgetPeriod>,
        ) -> Result<Vec<Budget>> {
            Ok(vec![])
        }

        fn get_budget_statuses(
            &self,
            _user_id: &str,
            _today: NaiveDate,
        ) -> Result<Vec<CategoryBudgetStatus>> {
            Ok(self.statuses.clone())
        }

        fn get_spending_allowance(
            &self,
            _user_id: &str,
            _today: NaiveDate,
        ) -> Result<SpendingAllowance> {
            unimplemented!("not used by insight generation")
        }

        async fn upsert_budget(&self, _user_id: &str, _draft: BudgetDraft) -> Result<Budget> {
            unimplemented!("not used by insight generation")
        }

        async fn delete_budget(&self, _id: &str, _user_id: &str) -> Result<usize> {
            unimplemented!("not used by insight generation")
        }
    }

    #[derive(Default)]
    struct RecordingRepository {
        stored: Mutex<Vec<InsightRecord>>,
    }

    #[async_trait]
    impl InsightRepositoryTrait for RecordingRepository {
        fn find_insights(
            &self,
            user_id: &str,
            period: Option<&str>,
        ) -> Result<Vec<InsightRecord>> {
            Ok(self
                .stored
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.user_id == user_id)
                .filter(|r| period.map_or(true, |p| r.period == p))
                .cloned()
                .collect())
        }

        async fn replace_insights(
            &self,
            user_id: &str,
            period: &str,
            insights: Vec<Insight>,
        ) -> Result<Vec<InsightRecord>> {
            let mut stored = self.stored.lock().unwrap();
            stored.retain(|r| !(r.user_id == user_id && r.period == period));
            for (i, insight) in insights.into_iter().enumerate() {
                stored.push(InsightRecord {
                    id: format!("i{}", i),
                    user_id: user_id.to_string(),
                    kind: insight.kind.as_str().to_string(),
                    period: period.to_string(),
                    content: insight.text,
                    is_read: false,
                    created_at: "2025-05-31T00:00:00Z".to_string(),
                });
            }
            Ok(stored
                .iter()
                .filter(|r| r.user_id == user_id && r.period == period)
                .cloned()
                .collect())
        }

        async fn mark_read(&self, id: &str, user_id: &str) -> Result<usize> {
            let mut stored = self.stored.lock().unwrap();
            match stored
                .iter_mut()
                .find(|r| r.id == id && r.user_id == user_id)
            {
                Some(record) => {
                    record.is_read = true;
                    Ok(1)
                }
                None => Err(Error::NotFound("insight".to_string())),
            }
        }
    }

    fn entry(category: &str, amount: Decimal) -> LedgerEntry {
        LedgerEntry {
            category_id: category.to_string(),
            category_name: category.to_string(),
            category_color: None,
            amount,
            date: NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
        }
    }

    fn overrun_status(category: &str, percent: Decimal) -> CategoryBudgetStatus {
        CategoryBudgetStatus {
            budget_id: format!("b_{}", category),
            category_id: format!("cat_{}", category),
            category_name: category.to_string(),
            budgeted: dec!(1000),
            spent: percent * dec!(10),
            percent_used: percent,
            percent_display: percent.min(dec!(100)),
            status: if percent > dec!(100) {
                BudgetStatus::Exceeded
            } else {
                BudgetStatus::Ok
            },
            hard_exceeded: percent > dec!(120),
        }
    }

    fn may_range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 5, 31).unwrap(),
        )
        .unwrap()
    }

    fn service(
        entries: Vec<LedgerEntry>,
        previous_total: Decimal,
        statuses: Vec<CategoryBudgetStatus>,
    ) -> InsightService {
        InsightService::new(
            Arc::new(RecordingRepository::default()),
            Arc::new(FixedSpending {
                entries,
                previous_total,
            }),
            Arc::new(FixedBudgets { statuses }),
        )
    }

    fn kinds(insights: &[Insight]) -> Vec<InsightKind> {
        insights.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn no_expenses_yields_no_insights() {
        let svc = service(vec![], dec!(0), vec![]);
        assert!(svc.generate("u1", &may_range()).unwrap().is_empty());
    }

    #[test]
    fn top_category_reports_the_largest_total() {
        let svc = service(
            vec![
                entry("groceries", dec!(200)),
                entry("dining", dec!(350)),
                entry("groceries", dec!(100)),
            ],
            dec!(0),
            vec![],
        );
        let insights = svc.generate("u1", &may_range()).unwrap();
        assert_eq!(insights[0].kind, InsightKind::TopCategory);
        assert!(insights[0].text.contains("dining"));
    }

    #[test]
    fn small_purchases_need_more_than_the_threshold() {
        let five: Vec<_> = (0..5).map(|_| entry("coffee", dec!(4.50))).collect();
        let svc = service(five, dec!(0), vec![]);
        assert!(!kinds(&svc.generate("u1", &may_range()).unwrap())
            .contains(&InsightKind::SmallPurchases));

        let six: Vec<_> = (0..6).map(|_| entry("coffee", dec!(4.50))).collect();
        let svc = service(six, dec!(0), vec![]);
        let insights = svc.generate("u1", &may_range()).unwrap();
        let small = insights
            .iter()
            .find(|i| i.kind == InsightKind::SmallPurchases)
            .expect("six small purchases fire the heuristic");
        assert!(small.text.contains('6'));
        assert!(small.text.contains("27.00"));
    }

    #[test]
    fn trend_fires_only_past_ten_percent_change() {
        // 80 now vs 100 before: 20% drop, phrased positively.
        let svc = service(vec![entry("misc", dec!(80))], dec!(100), vec![]);
        let insights = svc.generate("u1", &may_range()).unwrap();
        let trend = insights
            .iter()
            .find(|i| i.kind == InsightKind::SpendingTrend)
            .unwrap();
        assert!(trend.text.contains("less"));
        assert!(trend.text.contains("20"));

        // 105 now vs 100 before: within the band, silent.
        let svc = service(vec![entry("misc", dec!(105))], dec!(100), vec![]);
        assert!(!kinds(&svc.generate("u1", &may_range()).unwrap())
            .contains(&InsightKind::SpendingTrend));

        // No previous spending at all: no trend to speak of.
        let svc = service(vec![entry("misc", dec!(105))], dec!(0), vec![]);
        assert!(!kinds(&svc.generate("u1", &may_range()).unwrap())
            .contains(&InsightKind::SpendingTrend));
    }

    #[test]
    fn worst_overrun_wins() {
        let svc = service(
            vec![entry("misc", dec!(50))],
            dec!(0),
            vec![
                overrun_status("dining", dec!(110)),
                overrun_status("travel", dec!(135)),
                overrun_status("rent", dec!(90)),
            ],
        );
        let insights = svc.generate("u1", &may_range()).unwrap();
        let overrun = insights
            .iter()
            .find(|i| i.kind == InsightKind::BudgetOverrun)
            .unwrap();
        assert!(overrun.text.contains("travel"));
        assert!(overrun.text.contains("35"));
    }

    #[test]
    fn habit_needs_enough_occurrences() {
        let four: Vec<_> = (0..4).map(|_| entry("dining", dec!(20))).collect();
        let svc = service(four, dec!(0), vec![]);
        assert!(!kinds(&svc.generate("u1", &may_range()).unwrap())
            .contains(&InsightKind::CategoryHabit));

        let five: Vec<_> = (0..5).map(|_| entry("dining", dec!(20))).collect();
        let svc = service(five, dec!(0), vec![]);
        let insights = svc.generate("u1", &may_range()).unwrap();
        assert!(kinds(&insights).contains(&InsightKind::CategoryHabit));
    }

    #[test]
    fn all_heuristics_fire_in_priority_order_within_the_cap() {
        let mut entries: Vec<_> = (0..6).map(|_| entry("coffee", dec!(4))).collect();
        entries.push(entry("rent", dec!(900)));
        let svc = service(
            entries,
            dec!(500),
            vec![overrun_status("travel", dec!(135))],
        );
        let insights = svc.generate("u1", &may_range()).unwrap();
        assert_eq!(insights.len(), MAX_INSIGHTS);
        assert_eq!(
            kinds(&insights),
            vec![
                InsightKind::TopCategory,
                InsightKind::SmallPurchases,
                InsightKind::SpendingTrend,
                InsightKind::BudgetOverrun,
                InsightKind::CategoryHabit,
            ]
        );
    }

    #[tokio::test]
    async fn regeneration_does_not_accumulate_rows() {
        let repo = Arc::new(RecordingRepository::default());
        let svc = InsightService::new(
            repo.clone(),
            Arc::new(FixedSpending {
                entries: vec![entry("dining", dec!(100))],
                previous_total: dec!(0),
            }),
            Arc::new(FixedBudgets { statuses: vec![] }),
        );

        let range = may_range();
        svc.generate_and_store("u1", &range).await.unwrap();
        svc.generate_and_store("u1", &range).await.unwrap();
        let stored = repo.find_insights("u1", Some(&period_key(&range))).unwrap();
        assert_eq!(stored.len(), 1, "same period regenerates in place");
    }
}
