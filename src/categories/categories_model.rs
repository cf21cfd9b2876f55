use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Whether a category classifies money coming in or going out.
///
/// The category is the single source of truth for a transaction's
/// classification; transactions never store a redundant type flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryType {
    Income,
    Expense,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Income => "INCOME",
            CategoryType::Expense => "EXPENSE",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "INCOME" => Some(CategoryType::Income),
            "EXPENSE" => Some(CategoryType::Expense),
            _ => None,
        }
    }
}

/// Database model for categories.
///
/// Rows with `user_id = NULL` are shared system defaults, read-only to users.
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
#[diesel(table_name = crate::schema::categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub category_type: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Category {
    pub fn is_system_default(&self) -> bool {
        self.user_id.is_none()
    }

    pub fn type_enum(&self) -> CategoryType {
        CategoryType::from_str(&self.category_type).unwrap_or(CategoryType::Expense)
    }

    pub fn is_expense(&self) -> bool {
        self.type_enum() == CategoryType::Expense
    }
}

/// Model for creating a new category
#[derive(Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::categories)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub name: String,
    pub category_type: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Model for updating a category. The type is immutable once created;
/// changing it would silently re-classify the whole transaction history.
#[derive(AsChangeset, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::categories)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub updated_at: String,
}
