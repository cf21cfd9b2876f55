use crate::constants::DATE_FORMAT;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{Error, Result};
use crate::goals::goals_model::{
    Goal, GoalDraft, NewGoal, NewQuickSave, QuickSave, QuickSaveApplied,
};
use crate::goals::goals_traits::GoalRepositoryTrait;
use crate::schema::{goals, quick_saves};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

pub struct GoalRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl GoalRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        GoalRepository { pool, writer }
    }

    fn load_owned(conn: &mut SqliteConnection, id: &str, user_id: &str) -> Result<Goal> {
        goals::table
            .filter(goals::id.eq(id))
            .filter(goals::user_id.eq(user_id))
            .first::<Goal>(conn)
            .optional()?
            .ok_or_else(|| Error::NotFound("goal".to_string()))
    }
}

#[async_trait]
impl GoalRepositoryTrait for GoalRepository {
    fn find_goals(&self, user_id: &str) -> Result<Vec<Goal>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(goals::table
            .filter(goals::user_id.eq(user_id))
            .order(goals::created_at.asc())
            .load::<Goal>(&mut conn)?)
    }

    fn get_goal(&self, id: &str, user_id: &str) -> Result<Goal> {
        let mut conn = get_connection(&self.pool)?;
        Self::load_owned(&mut conn, id, user_id)
    }

    fn find_quick_saves(&self, goal_id: &str, user_id: &str) -> Result<Vec<QuickSave>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(quick_saves::table
            .filter(quick_saves::goal_id.eq(goal_id))
            .filter(quick_saves::user_id.eq(user_id))
            .order(quick_saves::save_date.asc())
            .load::<QuickSave>(&mut conn)?)
    }

    async fn insert_goal(&self, new_goal: NewGoal) -> Result<Goal> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Goal> {
                let now = Utc::now().to_rfc3339();
                let mut goal = new_goal;
                goal.id = Some(Uuid::new_v4().to_string());
                goal.created_at = Some(now.clone());
                goal.updated_at = Some(now);

                diesel::insert_into(goals::table)
                    .values(&goal)
                    .execute(conn)?;

                Ok(goals::table.find(goal.id.unwrap()).first::<Goal>(conn)?)
            })
            .await
    }

    async fn update_goal(&self, id: &str, user_id: &str, draft: GoalDraft) -> Result<Goal> {
        let id_owned = id.to_string();
        let user_owned = user_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Goal> {
                let goal = Self::load_owned(conn, &id_owned, &user_owned)?;

                diesel::update(goals::table.find(&goal.id))
                    .set((
                        goals::name.eq(&draft.name),
                        goals::target_amount.eq(draft.target_amount.to_string()),
                        goals::start_date.eq(draft.start_date.format(DATE_FORMAT).to_string()),
                        goals::end_date.eq(draft.end_date.format(DATE_FORMAT).to_string()),
                        goals::priority.eq(draft.priority.as_str()),
                        goals::updated_at.eq(Utc::now().to_rfc3339()),
                    ))
                    .execute(conn)?;

                Ok(goals::table.find(&goal.id).first::<Goal>(conn)?)
            })
            .await
    }

    async fn quick_save(
        &self,
        user_id: &str,
        goal_id: &str,
        amount: Decimal,
        save_date: NaiveDate,
    ) -> Result<QuickSaveApplied> {
        let user_owned = user_id.to_string();
        let goal_owned = goal_id.to_string();
        // The whole read-add-write-append cycle runs as one job on the
        // writer's immediate transaction, so concurrent saves on the same
        // goal serialize instead of losing an update.
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<QuickSaveApplied> {
                let goal = Self::load_owned(conn, &goal_owned, &user_owned)?;
                if goal.is_completed {
                    return Err(Error::Conflict("goal is already completed".to_string()));
                }

                let previous_amount = goal.current_amount_decimal();
                let new_amount = previous_amount + amount;

                diesel::update(goals::table.find(&goal.id))
                    .set((
                        goals::current_amount.eq(new_amount.to_string()),
                        goals::updated_at.eq(Utc::now().to_rfc3339()),
                    ))
                    .execute(conn)?;

                let entry = NewQuickSave {
                    id: Uuid::new_v4().to_string(),
                    user_id: user_owned.clone(),
                    goal_id: goal.id.clone(),
                    amount: amount.to_string(),
                    save_date: save_date.format(DATE_FORMAT).to_string(),
                };
                diesel::insert_into(quick_saves::table)
                    .values(&entry)
                    .execute(conn)?;

                let goal = goals::table.find(&goal.id).first::<Goal>(conn)?;
                Ok(QuickSaveApplied {
                    previous_amount,
                    goal,
                })
            })
            .await
    }

    async fn set_current_amount(
        &self,
        user_id: &str,
        goal_id: &str,
        new_amount: Decimal,
    ) -> Result<Goal> {
        let user_owned = user_id.to_string();
        let goal_owned = goal_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Goal> {
                let goal = Self::load_owned(conn, &goal_owned, &user_owned)?;

                diesel::update(goals::table.find(&goal.id))
                    .set((
                        goals::current_amount.eq(new_amount.to_string()),
                        goals::updated_at.eq(Utc::now().to_rfc3339()),
                    ))
                    .execute(conn)?;

                Ok(goals::table.find(&goal.id).first::<Goal>(conn)?)
            })
            .await
    }

    async fn complete_goal(
        &self,
        user_id: &str,
        goal_id: &str,
        completion_date: NaiveDate,
    ) -> Result<Goal> {
        let user_owned = user_id.to_string();
        let goal_owned = goal_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Goal> {
                let goal = Self::load_owned(conn, &goal_owned, &user_owned)?;
                if goal.is_completed {
                    return Err(Error::Conflict("goal is already completed".to_string()));
                }

                diesel::update(goals::table.find(&goal.id))
                    .set((
                        goals::is_completed.eq(true),
                        goals::completion_date
                            .eq(completion_date.format(DATE_FORMAT).to_string()),
                        goals::updated_at.eq(Utc::now().to_rfc3339()),
                    ))
                    .execute(conn)?;

                Ok(goals::table.find(&goal.id).first::<Goal>(conn)?)
            })
            .await
    }

    async fn delete_goal(&self, id: &str, user_id: &str) -> Result<usize> {
        let id_owned = id.to_string();
        let user_owned = user_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                // Audit rows go with the goal; they are meaningless orphaned.
                diesel::delete(
                    quick_saves::table
                        .filter(quick_saves::goal_id.eq(&id_owned))
                        .filter(quick_saves::user_id.eq(&user_owned)),
                )
                .execute(conn)?;

                let deleted = diesel::delete(
                    goals::table
                        .filter(goals::id.eq(&id_owned))
                        .filter(goals::user_id.eq(&user_owned)),
                )
                .execute(conn)?;

                if deleted == 0 {
                    return Err(Error::NotFound("goal".to_string()));
                }
                Ok(deleted)
            })
            .await
    }
}
