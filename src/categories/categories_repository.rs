use crate::categories::categories_model::{Category, NewCategory, UpdateCategory};
use crate::categories::categories_traits::CategoryRepositoryTrait;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{Error, Result};
use crate::schema::{budgets, categories, transactions};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

pub struct CategoryRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl CategoryRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        CategoryRepository { pool, writer }
    }
}

// Visibility predicate shared by every read: a user sees their own rows and
// the shared system defaults (user_id IS NULL).
fn visible_to(user: &str) -> categories::BoxedQuery<'_, diesel::sqlite::Sqlite> {
    categories::table
        .filter(
            categories::user_id
                .eq(user.to_string())
                .or(categories::user_id.is_null()),
        )
        .into_boxed()
}

#[async_trait]
impl CategoryRepositoryTrait for CategoryRepository {
    fn get_categories(&self, user_id: &str) -> Result<Vec<Category>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(visible_to(user_id)
            .order((categories::category_type.asc(), categories::name.asc()))
            .load::<Category>(&mut conn)?)
    }

    fn get_category_by_id(&self, id: &str, user_id: &str) -> Result<Option<Category>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(visible_to(user_id)
            .filter(categories::id.eq(id.to_string()))
            .first::<Category>(&mut conn)
            .optional()?)
    }

    async fn create_category(&self, new_category: NewCategory) -> Result<Category> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Category> {
                let mut category = new_category;
                if category.id.is_none() {
                    category.id = Some(format!(
                        "cat_{}",
                        &Uuid::new_v4().to_string().replace('-', "")[..12]
                    ));
                }

                diesel::insert_into(categories::table)
                    .values(&category)
                    .execute(conn)?;

                Ok(categories::table
                    .find(category.id.unwrap())
                    .first::<Category>(conn)?)
            })
            .await
    }

    async fn update_category(
        &self,
        id: &str,
        user_id: &str,
        update: UpdateCategory,
    ) -> Result<Category> {
        let id_owned = id.to_string();
        let user_owned = user_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Category> {
                // Ownership predicate also excludes system defaults.
                let updated = diesel::update(
                    categories::table
                        .filter(categories::id.eq(&id_owned))
                        .filter(categories::user_id.eq(&user_owned)),
                )
                .set(&update)
                .execute(conn)?;

                if updated == 0 {
                    return Err(Error::NotFound("category".to_string()));
                }

                Ok(categories::table
                    .find(&id_owned)
                    .first::<Category>(conn)?)
            })
            .await
    }

    async fn delete_category(&self, id: &str, user_id: &str) -> Result<usize> {
        let id_owned = id.to_string();
        let user_owned = user_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let owned: i64 = categories::table
                    .filter(categories::id.eq(&id_owned))
                    .filter(categories::user_id.eq(&user_owned))
                    .count()
                    .get_result(conn)?;
                if owned == 0 {
                    return Err(Error::NotFound("category".to_string()));
                }

                let transaction_count: i64 = transactions::table
                    .filter(transactions::category_id.eq(&id_owned))
                    .count()
                    .get_result(conn)?;
                let budget_count: i64 = budgets::table
                    .filter(budgets::category_id.eq(&id_owned))
                    .count()
                    .get_result(conn)?;

                if transaction_count > 0 || budget_count > 0 {
                    return Err(Error::Conflict(format!(
                        "Cannot delete category: {} transactions and {} budgets reference it",
                        transaction_count, budget_count
                    )));
                }

                Ok(diesel::delete(categories::table.find(&id_owned)).execute(conn)?)
            })
            .await
    }
}
