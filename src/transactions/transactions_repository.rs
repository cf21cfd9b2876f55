use crate::categories::CategoryType;
use crate::constants::DATE_FORMAT;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{Error, Result, ValidationError};
use crate::schema::{categories, transactions};
use crate::spending::DateRange;
use crate::transactions::transactions_model::{
    LedgerEntry, NewTransaction, Transaction, UpdateTransaction,
};
use crate::transactions::transactions_traits::TransactionRepositoryTrait;
use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::warn;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

pub struct TransactionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl TransactionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        TransactionRepository { pool, writer }
    }
}

#[async_trait]
impl TransactionRepositoryTrait for TransactionRepository {
    fn entries(
        &self,
        user_id: &str,
        kind: CategoryType,
        range: &DateRange,
        category_id: Option<&str>,
    ) -> Result<Vec<LedgerEntry>> {
        let mut conn = get_connection(&self.pool)?;

        // Text dates in %Y-%m-%d order lexicographically, so BETWEEN works.
        let mut query = transactions::table
            .inner_join(categories::table)
            .filter(transactions::user_id.eq(user_id))
            .filter(categories::category_type.eq(kind.as_str()))
            .filter(transactions::date.ge(range.start().format(DATE_FORMAT).to_string()))
            .filter(transactions::date.le(range.end().format(DATE_FORMAT).to_string()))
            .into_boxed();

        if let Some(cat) = category_id {
            query = query.filter(transactions::category_id.eq(cat.to_string()));
        }

        let rows: Vec<(String, String, Option<String>, String, String)> = query
            .select((
                transactions::category_id,
                categories::name,
                categories::color,
                transactions::amount,
                transactions::date,
            ))
            .load(&mut conn)?;

        let mut entries = Vec::with_capacity(rows.len());
        for (cat_id, cat_name, cat_color, amount, date) in rows {
            let parsed_amount: Decimal = match amount.parse() {
                Ok(a) => a,
                Err(e) => {
                    warn!("Skipping ledger row with unparsable amount {}: {}", amount, e);
                    continue;
                }
            };
            let parsed_date = match NaiveDate::parse_from_str(&date, DATE_FORMAT) {
                Ok(d) => d,
                Err(e) => {
                    warn!("Skipping ledger row with unparsable date {}: {}", date, e);
                    continue;
                }
            };
            entries.push(LedgerEntry {
                category_id: cat_id,
                category_name: cat_name,
                category_color: cat_color,
                amount: parsed_amount,
                date: parsed_date,
            });
        }
        Ok(entries)
    }

    fn get_transaction(&self, id: &str, user_id: &str) -> Result<Option<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(transactions::table
            .filter(transactions::id.eq(id))
            .filter(transactions::user_id.eq(user_id))
            .first::<Transaction>(&mut conn)
            .optional()?)
    }

    async fn insert_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        let amount: Decimal = new_transaction.amount.parse()?;
        if amount <= Decimal::ZERO {
            return Err(
                ValidationError::NonPositiveAmount(new_transaction.amount.clone()).into(),
            );
        }

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Transaction> {
                let mut transaction = new_transaction;
                if transaction.id.is_none() {
                    transaction.id = Some(format!(
                        "txn_{}",
                        &Uuid::new_v4().to_string().replace('-', "")[..12]
                    ));
                }
                let now = chrono::Utc::now().to_rfc3339();
                transaction.created_at.get_or_insert_with(|| now.clone());
                transaction.updated_at.get_or_insert(now);

                diesel::insert_into(transactions::table)
                    .values(&transaction)
                    .execute(conn)?;

                Ok(transactions::table
                    .find(transaction.id.unwrap())
                    .first::<Transaction>(conn)?)
            })
            .await
    }

    async fn update_transaction(
        &self,
        id: &str,
        user_id: &str,
        update: UpdateTransaction,
    ) -> Result<Transaction> {
        if let Some(ref amount) = update.amount {
            let parsed: Decimal = amount.parse()?;
            if parsed <= Decimal::ZERO {
                return Err(ValidationError::NonPositiveAmount(amount.clone()).into());
            }
        }

        let id_owned = id.to_string();
        let user_owned = user_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Transaction> {
                let updated = diesel::update(
                    transactions::table
                        .filter(transactions::id.eq(&id_owned))
                        .filter(transactions::user_id.eq(&user_owned)),
                )
                .set(&update)
                .execute(conn)?;

                if updated == 0 {
                    return Err(Error::NotFound("transaction".to_string()));
                }

                Ok(transactions::table
                    .find(&id_owned)
                    .first::<Transaction>(conn)?)
            })
            .await
    }

    async fn delete_transaction(&self, id: &str, user_id: &str) -> Result<usize> {
        let id_owned = id.to_string();
        let user_owned = user_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let deleted = diesel::delete(
                    transactions::table
                        .filter(transactions::id.eq(&id_owned))
                        .filter(transactions::user_id.eq(&user_owned)),
                )
                .execute(conn)?;

                if deleted == 0 {
                    return Err(Error::NotFound("transaction".to_string()));
                }
                Ok(deleted)
            })
            .await
    }
}
