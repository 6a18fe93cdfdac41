use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequestParts},
    http::{header, request::Parts},
    Extension, Json,
};
use std::sync::Arc;

use crate::auth::AdminAuth;
use crate::error::CinemaError;
use crate::repository::{MovieRepository, SnackRepository};

pub mod auth_controller;
pub mod home_controller;
pub mod movie_controller;
pub mod snack_controller;

/// Everything the handlers need, shared through an `Extension` layer.
#[derive(Clone)]
pub struct AppState {
    pub movies: Arc<dyn MovieRepository>,
    pub snacks: Arc<dyn SnackRepository>,
    pub auth: Arc<AdminAuth>,
}

/// Present in a handler's arguments when the request carries a live admin token.
#[derive(Debug, Clone)]
pub struct AdminGuard {
    pub token: String,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AdminGuard {
    type Rejection = CinemaError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or(CinemaError::Auth)?
            .to_string();

        let Extension(app) = Extension::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                tracing::error!(error = %rejection, "AppState extension is missing");
                CinemaError::Auth
            })?;

        if !app.auth.verify(&token).await {
            return Err(CinemaError::Auth);
        }
        Ok(AdminGuard { token })
    }
}

/// Unwraps a JSON body, reporting a malformed one as a validation error.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, CinemaError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| CinemaError::validation(rejection.body_text()))
}
