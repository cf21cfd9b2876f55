use crate::categories::CategoryType;
use crate::errors::Result;
use crate::spending::spending_model::{CategorySpend, DateRange, MonthTotals};
use crate::transactions::{LedgerEntry, TransactionRepositoryTrait};
use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

/// Trait defining the contract for the spend aggregator.
///
/// All operations are pure reads: exact decimal arithmetic, zero (never an
/// error) when no matching rows exist, no side effects.
pub trait SpendingServiceTrait: Send + Sync {
    /// Sum of matching transaction amounts over an inclusive date range.
    fn sum(
        &self,
        user_id: &str,
        kind: CategoryType,
        range: &DateRange,
        category_id: Option<&str>,
    ) -> Result<Decimal>;

    /// Income/expense totals for the calendar month containing `day`.
    fn month_totals(&self, user_id: &str, day: NaiveDate) -> Result<MonthTotals>;

    /// Expense totals and counts per category, largest first.
    fn expense_breakdown(&self, user_id: &str, range: &DateRange) -> Result<Vec<CategorySpend>>;

    /// Raw expense rows for heuristics that need individual amounts.
    fn expense_entries(&self, user_id: &str, range: &DateRange) -> Result<Vec<LedgerEntry>>;
}

pub struct SpendingService {
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
}

impl SpendingService {
    pub fn new(transaction_repository: Arc<dyn TransactionRepositoryTrait>) -> Self {
        SpendingService {
            transaction_repository,
        }
    }
}

impl SpendingServiceTrait for SpendingService {
    fn sum(
        &self,
        user_id: &str,
        kind: CategoryType,
        range: &DateRange,
        category_id: Option<&str>,
    ) -> Result<Decimal> {
        let entries = self
            .transaction_repository
            .entries(user_id, kind, range, category_id)?;

        let total = entries
            .iter()
            .fold(Decimal::ZERO, |acc, entry| acc + entry.amount);
        debug!(
            "Summed {} {:?} entries for {}..{}: {}",
            entries.len(),
            kind,
            range.start(),
            range.end(),
            total
        );
        Ok(total)
    }

    fn month_totals(&self, user_id: &str, day: NaiveDate) -> Result<MonthTotals> {
        let month = DateRange::month_of(day);
        let total_income = self.sum(user_id, CategoryType::Income, &month, None)?;
        let total_expense = self.sum(user_id, CategoryType::Expense, &month, None)?;

        Ok(MonthTotals {
            available_balance: total_income - total_expense,
            total_income,
            total_expense,
        })
    }

    fn expense_breakdown(&self, user_id: &str, range: &DateRange) -> Result<Vec<CategorySpend>> {
        let entries =
            self.transaction_repository
                .entries(user_id, CategoryType::Expense, range, None)?;

        let mut by_category: HashMap<String, CategorySpend> = HashMap::new();
        for entry in entries {
            let slot = by_category
                .entry(entry.category_id.clone())
                .or_insert_with(|| CategorySpend {
                    category_id: entry.category_id.clone(),
                    category_name: entry.category_name.clone(),
                    category_color: entry.category_color.clone(),
                    total: Decimal::ZERO,
                    transaction_count: 0,
                });
            slot.total += entry.amount;
            slot.transaction_count += 1;
        }

        let mut breakdown: Vec<CategorySpend> = by_category.into_values().collect();
        breakdown.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then_with(|| a.category_name.cmp(&b.category_name))
        });
        Ok(breakdown)
    }

    fn expense_entries(&self, user_id: &str, range: &DateRange) -> Result<Vec<LedgerEntry>> {
        self.transaction_repository
            .entries(user_id, CategoryType::Expense, range, None)
    }
}
