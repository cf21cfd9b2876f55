//! Optional axum surface over the engine. The session layer in front of it
//! is expected to authenticate and pass the caller's opaque id in the
//! `x-user-id` header.

pub mod dashboard;
pub mod error;
pub mod goals;

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts, Router};

use crate::dashboard::DashboardService;
use crate::goals::GoalServiceTrait;

pub use error::{ApiError, ApiResult};

pub struct AppState {
    pub goal_service: Arc<dyn GoalServiceTrait>,
    pub dashboard_service: Arc<DashboardService>,
}

/// Caller identity, taken verbatim from the `x-user-id` header.
pub struct UserId(pub String);

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(|value| UserId(value.to_string()))
            .ok_or_else(|| ApiError::Unauthorized("missing x-user-id header".to_string()))
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(goals::router())
        .merge(dashboard::router())
        .with_state(state)
}
