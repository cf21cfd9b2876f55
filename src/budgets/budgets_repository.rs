use crate::budgets::budgets_model::{Budget, BudgetPeriod, BudgetWithCategory, NewBudget};
use crate::budgets::budgets_traits::BudgetRepositoryTrait;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{Error, Result};
use crate::schema::{budgets, categories};
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

pub struct BudgetRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl BudgetRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        BudgetRepository { pool, writer }
    }
}

#[async_trait]
impl BudgetRepositoryTrait for BudgetRepository {
    fn find_budgets(&self, user_id: &str, period: Option<BudgetPeriod>) -> Result<Vec<Budget>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = budgets::table
            .filter(budgets::user_id.eq(user_id))
            .order(budgets::created_at.desc())
            .into_boxed();
        if let Some(p) = period {
            query = query.filter(budgets::period.eq(p.as_str()));
        }
        Ok(query.load::<Budget>(&mut conn)?)
    }

    fn find_budgets_with_categories(
        &self,
        user_id: &str,
        period: Option<BudgetPeriod>,
    ) -> Result<Vec<BudgetWithCategory>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = budgets::table
            .inner_join(categories::table)
            .filter(budgets::user_id.eq(user_id))
            .order(categories::name.asc())
            .into_boxed();
        if let Some(p) = period {
            query = query.filter(budgets::period.eq(p.as_str()));
        }

        let rows: Vec<(Budget, String)> = query
            .select((Budget::as_select(), categories::name))
            .load(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(budget, category_name)| BudgetWithCategory {
                budget,
                category_name,
            })
            .collect())
    }

    async fn upsert_budget(&self, new_budget: NewBudget) -> Result<Budget> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Budget> {
                let now = Utc::now().to_rfc3339();

                // One budget per (user, category, period): update in place
                // when a row already exists.
                let existing: Option<Budget> = budgets::table
                    .filter(budgets::user_id.eq(&new_budget.user_id))
                    .filter(budgets::category_id.eq(&new_budget.category_id))
                    .filter(budgets::period.eq(&new_budget.period))
                    .first::<Budget>(conn)
                    .optional()?;

                if let Some(existing_budget) = existing {
                    diesel::update(budgets::table.find(&existing_budget.id))
                        .set((
                            budgets::amount.eq(&new_budget.amount),
                            budgets::start_date.eq(&new_budget.start_date),
                            budgets::alert_threshold.eq(new_budget.alert_threshold),
                            budgets::updated_at.eq(&now),
                        ))
                        .execute(conn)?;

                    Ok(budgets::table
                        .find(&existing_budget.id)
                        .first::<Budget>(conn)?)
                } else {
                    let mut budget = new_budget;
                    budget.id = Some(Uuid::new_v4().to_string());
                    budget.created_at = Some(now.clone());
                    budget.updated_at = Some(now);

                    diesel::insert_into(budgets::table)
                        .values(&budget)
                        .execute(conn)?;

                    Ok(budgets::table
                        .find(budget.id.unwrap())
                        .first::<Budget>(conn)?)
                }
            })
            .await
    }

    async fn delete_budget(&self, id: &str, user_id: &str) -> Result<usize> {
        let id_owned = id.to_string();
        let user_owned = user_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let deleted = diesel::delete(
                    budgets::table
                        .filter(budgets::id.eq(&id_owned))
                        .filter(budgets::user_id.eq(&user_owned)),
                )
                .execute(conn)?;

                if deleted == 0 {
                    return Err(Error::NotFound("budget".to_string()));
                }
                Ok(deleted)
            })
            .await
    }
}
