use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, AppError>;

// Set once at startup from Config::production. Defaults to redacted so a
// test or misconfigured process never leaks detail by accident.
static VERBOSE_ERRORS: AtomicBool = AtomicBool::new(false);

pub fn set_verbose_errors(verbose: bool) {
    VERBOSE_ERRORS.store(verbose, Ordering::Relaxed);
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Too many requests, please try later")]
    RateLimited,

    #[error("{message}")]
    Upstream {
        message: String,
        detail: Option<String>,
    },

    #[error("Internal Server Error. Please try again later.")]
    Database(#[from] sqlx::Error),

    #[error("Internal Server Error. Please try again later.")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, None),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, None),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, None),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, None),
            AppError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, None),
            AppError::Upstream { detail, .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, detail.clone())
            }
            AppError::Database(err) => {
                tracing::error!("database error: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, Some(err.to_string()))
            }
            AppError::Internal(detail) => {
                tracing::error!("internal error: {detail}");
                (StatusCode::INTERNAL_SERVER_ERROR, Some(detail.clone()))
            }
        };

        let mut body = json!({
            "success": false,
            "message": self.to_string(),
        });

        // Diagnostic detail is only ever attached outside production mode.
        if VERBOSE_ERRORS.load(Ordering::Relaxed) {
            if let Some(detail) = detail {
                body["error"] = json!(detail);
            }
        }

        (status, Json(body)).into_response()
    }
}
