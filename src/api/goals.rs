use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::error::status_and_message;
use crate::api::{AppState, UserId};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuickSaveRequest {
    goal_id: String,
    amount: Decimal,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuickSaveResponse {
    success: bool,
    new_amount: Decimal,
    target_amount: Decimal,
    percentage: Decimal,
    goal_reached: bool,
    just_reached: bool,
    goal_name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuickSaveFailure {
    success: bool,
    message: String,
}

/// A duplicate call adds the amount twice; the write is atomic either way,
/// so a retry can never half-apply.
async fn quick_save(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Json(request): Json<QuickSaveRequest>,
) -> Response {
    let today = chrono::Local::now().date_naive();
    match state
        .goal_service
        .quick_save(&user_id, &request.goal_id, request.amount, today)
        .await
    {
        Ok(outcome) => Json(QuickSaveResponse {
            success: true,
            new_amount: outcome.new_amount,
            target_amount: outcome.target_amount,
            percentage: outcome.percentage,
            goal_reached: outcome.goal_reached,
            just_reached: outcome.just_reached,
            goal_name: outcome.goal_name,
        })
        .into_response(),
        Err(err) => {
            let (status, message) = status_and_message(&err);
            (
                status,
                Json(QuickSaveFailure {
                    success: false,
                    message,
                }),
            )
                .into_response()
        }
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/goals/quick-save", post(quick_save))
}
