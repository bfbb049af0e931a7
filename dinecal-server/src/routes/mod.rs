pub mod events;
pub mod uploads;

use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dinecal_core::DineCalError;
use serde::Serialize;
use thiserror::Error;
use tower_http::services::ServeDir;

use crate::state::AppState;

/// Build the full API router.
pub fn router(state: AppState) -> Router {
    let served = ServeDir::new(&state.upload_dir);

    Router::new()
        .merge(events::router())
        .merge(uploads::router())
        .nest_service(&format!("/{}", uploads::UPLOADS_PREFIX), served)
        .with_state(state)
}

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Errors returned by handlers, rendered as `{ "detail": ... }`
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(String),

    /// A request body axum could not extract; keeps axum's status.
    #[error("{detail}")]
    Rejected { status: StatusCode, detail: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Rejected { status, .. } => *status,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!("Request failed: {:#}", self);
        } else {
            tracing::warn!("Request rejected ({}): {}", status, self);
        }

        let body = Json(ErrorResponse {
            detail: self.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<DineCalError> for AppError {
    fn from(err: DineCalError) -> Self {
        match err {
            DineCalError::Validation(_) | DineCalError::InvalidTimestamp(_) => {
                AppError::Validation(err.to_string())
            }
            other => AppError::Internal(other.into()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.into())
    }
}
