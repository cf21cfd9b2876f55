pub mod dashboard_model;
pub mod dashboard_service;

pub use dashboard_model::DashboardSummary;
pub use dashboard_service::DashboardService;
