use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{Error, Result};
use crate::insights::insights_model::{Insight, InsightRecord, NewInsightRecord};
use crate::insights::insights_traits::InsightRepositoryTrait;
use crate::schema::insights;
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub struct InsightRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl InsightRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        InsightRepository { pool, writer }
    }
}

#[async_trait]
impl InsightRepositoryTrait for InsightRepository {
    fn find_insights(&self, user_id: &str, period: Option<&str>) -> Result<Vec<InsightRecord>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = insights::table
            .filter(insights::user_id.eq(user_id))
            .order(insights::created_at.desc())
            .into_boxed();
        if let Some(p) = period {
            query = query.filter(insights::period.eq(p));
        }
        Ok(query.load::<InsightRecord>(&mut conn)?)
    }

    async fn replace_insights(
        &self,
        user_id: &str,
        period: &str,
        new_insights: Vec<Insight>,
    ) -> Result<Vec<InsightRecord>> {
        let user_owned = user_id.to_string();
        let period_owned = period.to_string();
        self.writer
            .exec(
                move |conn: &mut SqliteConnection| -> Result<Vec<InsightRecord>> {
                    let existing: Vec<InsightRecord> = insights::table
                        .filter(insights::user_id.eq(&user_owned))
                        .filter(insights::period.eq(&period_owned))
                        .load(conn)?;
                    let read_by_kind: HashMap<String, bool> = existing
                        .into_iter()
                        .map(|r| (r.kind, r.is_read))
                        .collect();

                    diesel::delete(
                        insights::table
                            .filter(insights::user_id.eq(&user_owned))
                            .filter(insights::period.eq(&period_owned)),
                    )
                    .execute(conn)?;

                    let now = Utc::now().to_rfc3339();
                    let rows: Vec<NewInsightRecord> = new_insights
                        .into_iter()
                        .map(|insight| NewInsightRecord {
                            id: Uuid::new_v4().to_string(),
                            user_id: user_owned.clone(),
                            kind: insight.kind.as_str().to_string(),
                            period: period_owned.clone(),
                            content: insight.text,
                            is_read: read_by_kind
                                .get(insight.kind.as_str())
                                .copied()
                                .unwrap_or(false),
                            created_at: now.clone(),
                        })
                        .collect();

                    diesel::insert_into(insights::table)
                        .values(&rows)
                        .execute(conn)?;

                    Ok(insights::table
                        .filter(insights::user_id.eq(&user_owned))
                        .filter(insights::period.eq(&period_owned))
                        .load::<InsightRecord>(conn)?)
                },
            )
            .await
    }

    async fn mark_read(&self, id: &str, user_id: &str) -> Result<usize> {
        let id_owned = id.to_string();
        let user_owned = user_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let updated = diesel::update(
                    insights::table
                        .filter(insights::id.eq(&id_owned))
                        .filter(insights::user_id.eq(&user_owned)),
                )
                .set(insights::is_read.eq(true))
                .execute(conn)?;

                if updated == 0 {
                    return Err(Error::NotFound("insight".to_string()));
                }
                Ok(updated)
            })
            .await
    }
}
