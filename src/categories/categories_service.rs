use crate::categories::categories_model::{
    Category, CategoryType, NewCategory, UpdateCategory,
};
use crate::categories::categories_traits::{CategoryRepositoryTrait, CategoryServiceTrait};
use crate::errors::{Result, ValidationError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

pub struct CategoryService {
    repository: Arc<dyn CategoryRepositoryTrait>,
}

impl CategoryService {
    pub fn new(repository: Arc<dyn CategoryRepositoryTrait>) -> Self {
        CategoryService { repository }
    }
}

#[async_trait]
impl CategoryServiceTrait for CategoryService {
    fn get_categories(&self, user_id: &str) -> Result<Vec<Category>> {
        let categories = self.repository.get_categories(user_id)?;

        // A user-owned category shadows a system default with the same name.
        // Keyed by normalized name rather than scanning a seen-list.
        let mut by_name: HashMap<String, Category> = HashMap::new();
        for category in categories {
            let key = category.name.trim().to_lowercase();
            match by_name.get(&key) {
                Some(existing) if !existing.is_system_default() => {}
                _ => {
                    by_name.insert(key, category);
                }
            }
        }

        let mut deduped: Vec<Category> = by_name.into_values().collect();
        deduped.sort_by(|a, b| {
            a.category_type
                .cmp(&b.category_type)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(deduped)
    }

    fn get_category(&self, id: &str, user_id: &str) -> Result<Option<Category>> {
        self.repository.get_category_by_id(id, user_id)
    }

    async fn create_category(
        &self,
        user_id: &str,
        name: String,
        category_type: CategoryType,
        color: Option<String>,
        icon: Option<String>,
    ) -> Result<Category> {
        let trimmed = name.trim().to_string();
        if trimmed.is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }

        let now = Utc::now().to_rfc3339();
        let new_category = NewCategory {
            id: None,
            user_id: Some(user_id.to_string()),
            name: trimmed,
            category_type: category_type.as_str().to_string(),
            color,
            icon,
            created_at: now.clone(),
            updated_at: now,
        };
        self.repository.create_category(new_category).await
    }

    async fn update_category(
        &self,
        id: &str,
        user_id: &str,
        name: Option<String>,
        color: Option<String>,
        icon: Option<String>,
    ) -> Result<Category> {
        if let Some(ref n) = name {
            if n.trim().is_empty() {
                return Err(ValidationError::MissingField("name".to_string()).into());
            }
        }

        let update = UpdateCategory {
            name: name.map(|n| n.trim().to_string()),
            color,
            icon,
            updated_at: Utc::now().to_rfc3339(),
        };
        self.repository.update_category(id, user_id, update).await
    }

    async fn delete_category(&self, id: &str, user_id: &str) -> Result<usize> {
        self.repository.delete_category(id, user_id).await
    }
}
