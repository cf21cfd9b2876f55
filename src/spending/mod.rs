pub mod spending_model;
pub mod spending_service;

pub use spending_model::*;
pub use spending_service::{SpendingService, SpendingServiceTrait};
