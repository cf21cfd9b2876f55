use chrono::NaiveDate;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::DATE_FORMAT;

/// Database model for ledger transactions.
///
/// Income/expense classification is inherited from the category; the row
/// itself only carries the amount.
#[derive(
    Queryable,
    Identifiable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub category_id: String,
    pub amount: String,
    pub date: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Transaction {
    pub fn amount_decimal(&self) -> Decimal {
        self.amount.parse().unwrap_or(Decimal::ZERO)
    }

    pub fn date_naive(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()
    }
}

/// Model for creating a new transaction
#[derive(Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::transactions)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub id: Option<String>,
    pub user_id: String,
    pub category_id: String,
    pub amount: String,
    pub date: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Model for an owner's explicit edit of a transaction
#[derive(AsChangeset, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::transactions)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransaction {
    pub category_id: Option<String>,
    pub amount: Option<String>,
    pub date: Option<String>,
    pub updated_at: String,
}

/// A ledger row joined with its category, as consumed by the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub category_id: String,
    pub category_name: String,
    pub category_color: Option<String>,
    pub amount: Decimal,
    pub date: NaiveDate,
}
