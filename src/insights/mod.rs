pub mod insights_model;
pub mod insights_repository;
pub mod insights_service;
pub mod insights_traits;

pub use insights_model::*;
pub use insights_repository::InsightRepository;
pub use insights_service::{period_key, InsightService};
pub use insights_traits::*;
