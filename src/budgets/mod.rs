pub mod allocation;
pub mod budgets_model;
pub mod budgets_repository;
pub mod budgets_service;
pub mod budgets_traits;

pub use allocation::{compute_daily_budget, days_left_in_month};
pub use budgets_model::*;
pub use budgets_repository::BudgetRepository;
pub use budgets_service::BudgetService;
pub use budgets_traits::*;
