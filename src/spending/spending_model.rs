use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};

/// An inclusive range of local calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(ValidationError::InvalidDateRange(format!(
                "end {} is before start {}",
                end, start
            ))
            .into());
        }
        Ok(DateRange { start, end })
    }

    /// The calendar month containing `day`, first through last day.
    pub fn month_of(day: NaiveDate) -> Self {
        let start = day.with_day(1).expect("day 1 always exists");
        let end = last_day_of_month(day);
        DateRange { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days covered, inclusive of both endpoints.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// The immediately preceding range of equal length.
    pub fn preceding(&self) -> Self {
        let len = self.days() as u64;
        let end = self.start - Days::new(1);
        let start = self.start - Days::new(len);
        DateRange { start, end }
    }
}

pub fn last_day_of_month(day: NaiveDate) -> NaiveDate {
    let (next_year, next_month) = if day.month() == 12 {
        (day.year() + 1, 1)
    } else {
        (day.year(), day.month() + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .expect("first of month always exists")
        - Days::new(1)
}

/// Income and expense totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTotals {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub available_balance: Decimal,
}

/// Per-category expense aggregation over a range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpend {
    pub category_id: String,
    pub category_name: String,
    pub category_color: Option<String>,
    pub total: Decimal,
    pub transaction_count: i32,
}
