use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use serde::Serialize;
use thiserror::Error;

use crate::errors::Error as CoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    Unauthorized(String),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

/// Maps a core error to a status and a message safe to show the caller.
/// Storage and unexpected failures are logged here and surfaced generically.
pub fn status_and_message(err: &CoreError) -> (StatusCode, String) {
    match err {
        CoreError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
        // Generic wording: must not confirm whether the record exists for
        // someone else.
        CoreError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
        other => {
            error!("Request failed: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong, please try again.".to_string(),
            )
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Core(e) => status_and_message(e),
            ApiError::Unauthorized(reason) => (StatusCode::UNAUTHORIZED, reason.clone()),
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
