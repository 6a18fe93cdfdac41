use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::backend::BackendError;

/// Failures surfaced by the data access layer, the admin forms and the auth gate.
#[derive(Debug, Error)]
pub enum CinemaError {
    /// Malformed admin input, rejected before it reaches a repository.
    #[error("{0}")]
    Validation(String),

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Persistence or network failure. The cause is logged, never shown to the user.
    #[error(transparent)]
    Store(#[from] BackendError),

    #[error("invalid administrator credential")]
    Auth,
}

impl CinemaError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CinemaError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CinemaError::Validation(message.into())
    }
}

impl From<ValidationErrors> for CinemaError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, _)| field.to_string())
            .collect();
        fields.sort();
        CinemaError::Validation(format!("required fields missing: {}", fields.join(", ")))
    }
}

impl IntoResponse for CinemaError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            CinemaError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            CinemaError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),
            CinemaError::Auth => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string()),
            CinemaError::Store(err) => {
                tracing::error!(error = %err, "Store operation failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_ERROR",
                    "The cinema store is unavailable, try again".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}
