use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::{auth::repo_types::UserStatus, llm::LlmError};

/// Every failure a handler can report. Implements `IntoResponse`, so handlers
/// return `Result<_, AppError>` and the status code follows from the variant.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden ({status}): {message}")]
    Forbidden { message: String, status: UserStatus },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("missing server configuration: {0}")]
    Config(String),

    #[error("plan generation failed: {0}")]
    Generation(#[from] LlmError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Config(_) | AppError::Generation(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg) => json!({ "error": msg }),
            AppError::Forbidden { message, status } => {
                json!({ "error": message, "status": status })
            }
            AppError::Config(setting) => {
                tracing::error!(%setting, "server is missing configuration");
                json!({ "error": format!("{setting} is not configured on the server") })
            }
            AppError::Generation(e) => {
                tracing::error!(error = %e, "plan generation failed");
                json!({ "error": "Failed to generate the plan" })
            }
            AppError::Internal(e) => {
                tracing::error!(error = ?e, "internal error");
                json!({ "error": "An internal server error occurred" })
            }
        };

        (status, Json(body)).into_response()
    }
}
