use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::api::error::ApiResult;
use crate::api::{AppState, UserId};
use crate::dashboard::DashboardSummary;
use crate::spending::DateRange;

#[derive(Deserialize)]
struct SummaryQuery {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

async fn summary(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Query(query): Query<SummaryQuery>,
) -> ApiResult<Json<DashboardSummary>> {
    let today = chrono::Local::now().date_naive();
    let range = match (query.start, query.end) {
        (Some(start), Some(end)) => DateRange::new(start, end).map_err(crate::api::ApiError::Core)?,
        _ => DateRange::month_of(today),
    };
    let summary = state.dashboard_service.get_summary(&user_id, &range, today)?;
    Ok(Json(summary))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/dashboard/summary", get(summary))
}
