use crate::categories::categories_model::{Category, CategoryType, NewCategory, UpdateCategory};
use crate::errors::Result;
use async_trait::async_trait;

/// Trait for category repository operations
#[async_trait]
pub trait CategoryRepositoryTrait: Send + Sync {
    /// Get the categories visible to a user: their own plus system defaults.
    fn get_categories(&self, user_id: &str) -> Result<Vec<Category>>;

    /// Get a single visible category by ID.
    fn get_category_by_id(&self, id: &str, user_id: &str) -> Result<Option<Category>>;

    /// Create a new user-owned category.
    async fn create_category(&self, new_category: NewCategory) -> Result<Category>;

    /// Update a user-owned category. System defaults are read-only.
    async fn update_category(
        &self,
        id: &str,
        user_id: &str,
        update: UpdateCategory,
    ) -> Result<Category>;

    /// Delete a user-owned category. Blocked while any budget or
    /// transaction references it.
    async fn delete_category(&self, id: &str, user_id: &str) -> Result<usize>;
}

/// Trait for category service operations
#[async_trait]
pub trait CategoryServiceTrait: Send + Sync {
    fn get_categories(&self, user_id: &str) -> Result<Vec<Category>>;

    fn get_category(&self, id: &str, user_id: &str) -> Result<Option<Category>>;

    async fn create_category(
        &self,
        user_id: &str,
        name: String,
        category_type: CategoryType,
        color: Option<String>,
        icon: Option<String>,
    ) -> Result<Category>;

    async fn update_category(
        &self,
        id: &str,
        user_id: &str,
        name: Option<String>,
        color: Option<String>,
        icon: Option<String>,
    ) -> Result<Category>;

    async fn delete_category(&self, id: &str, user_id: &str) -> Result<usize>;
}
