use axum::{
    extract::{rejection::JsonRejection, Extension},
    response::Json,
};
use serde_json::{json, Value};

use super::{json_body, AdminGuard, AppState};
use crate::auth::{AdminSession, Credential};
use crate::error::CinemaError;

pub async fn sign_in(
    Extension(state): Extension<AppState>,
    payload: Result<Json<Credential>, JsonRejection>,
) -> Result<Json<AdminSession>, CinemaError> {
    let credential = json_body(payload)?;
    Ok(Json(state.auth.sign_in(&credential).await?))
}

pub async fn sign_out(admin: AdminGuard, Extension(state): Extension<AppState>) -> Json<Value> {
    state.auth.sign_out(&admin.token).await;
    Json(json!({ "authenticated": state.auth.is_authenticated().await }))
}

pub async fn status(Extension(state): Extension<AppState>) -> Json<Value> {
    Json(json!({
        "authenticated": state.auth.is_authenticated().await,
        "email": state.auth.email(),
    }))
}
