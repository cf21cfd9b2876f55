pub mod db;

pub mod budgets;
pub mod categories;
pub mod constants;
pub mod dashboard;
pub mod errors;
pub mod goals;
pub mod insights;
pub mod schema;
pub mod spending;
pub mod transactions;

#[cfg(feature = "api")]
pub mod api;

pub use errors::{Error, Result};
pub use spending::DateRange;
