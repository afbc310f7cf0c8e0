//! Application error type and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::{auth::password::PasswordError, binder::FieldErrors, store::StoreError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(FieldErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// Duplicate unique value. Reported as 400, not 409.
    #[error("{0}")]
    Conflict(String),

    #[error("{context}: {cause}")]
    Internal {
        context: &'static str,
        cause: anyhow::Error,
    },
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(context: &'static str, cause: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            context,
            cause: cause.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::internal("store operation failed", e)
    }
}

impl From<PasswordError> for AppError {
    fn from(e: PasswordError) -> Self {
        AppError::internal("password hashing failed", e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            AppError::Validation(fields) => json!({ "validation_error": fields }),
            AppError::Internal { context, cause } => {
                // full detail stays in the logs
                error!(error = ?cause, "{}", context);
                json!({ "error": context })
            }
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_errors_are_a_field_map() {
        let mut fields = FieldErrors::new();
        fields.insert("first".into(), "is required".into());
        let (status, body) = body_json(AppError::Validation(fields)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "validation_error": { "first": "is required" } }));
    }

    #[tokio::test]
    async fn conflict_maps_to_bad_request() {
        let (status, body) =
            body_json(AppError::Conflict("Email already registered".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Email already registered");
    }

    #[tokio::test]
    async fn internal_errors_hide_their_source() {
        let err = AppError::internal("store operation failed", anyhow::anyhow!("password=hunter2"));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "store operation failed" }));
    }
}
