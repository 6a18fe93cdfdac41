use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use validator::Validate;

use super::{json_body, AdminGuard, AppState};
use crate::error::CinemaError;
use crate::forms::SnackForm;
use crate::models::snack_model::{SnackCategory, SnackItem, SnackUpdate};

#[derive(Debug, Default, Deserialize)]
pub struct SnackQuery {
    pub category: Option<SnackCategory>,
}

pub async fn load_snacks(
    Extension(state): Extension<AppState>,
    Query(query): Query<SnackQuery>,
) -> Result<Json<Vec<SnackItem>>, CinemaError> {
    let snacks = state.snacks.list().await?;
    let snacks = match query.category {
        Some(category) => snacks.into_iter().filter(|s| s.details.category == category).collect(),
        None => snacks,
    };
    Ok(Json(snacks))
}

pub async fn load_snack(
    Path(id): Path<String>,
    Extension(state): Extension<AppState>,
) -> Result<Json<SnackItem>, CinemaError> {
    reload(&state, id).await
}

pub async fn add_snack(
    _admin: AdminGuard,
    Extension(state): Extension<AppState>,
    payload: Result<Json<SnackForm>, JsonRejection>,
) -> Result<(StatusCode, Json<SnackItem>), CinemaError> {
    let snack = json_body(payload)?.parse()?;
    let stored = state.snacks.add(snack).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

pub async fn replace_snack(
    _admin: AdminGuard,
    Path(id): Path<String>,
    Extension(state): Extension<AppState>,
    payload: Result<Json<SnackForm>, JsonRejection>,
) -> Result<Json<SnackItem>, CinemaError> {
    let snack = json_body(payload)?.parse()?;
    state.snacks.update(&id, SnackUpdate::replacing(snack)).await?;
    reload(&state, id).await
}

pub async fn update_snack(
    _admin: AdminGuard,
    Path(id): Path<String>,
    Extension(state): Extension<AppState>,
    payload: Result<Json<SnackUpdate>, JsonRejection>,
) -> Result<Json<SnackItem>, CinemaError> {
    let changes = json_body(payload)?.trimmed();
    changes.validate()?;
    state.snacks.update(&id, changes).await?;
    reload(&state, id).await
}

pub async fn delete_snack(
    _admin: AdminGuard,
    Path(id): Path<String>,
    Extension(state): Extension<AppState>,
) -> Result<Json<String>, CinemaError> {
    state.snacks.remove(&id).await?;
    Ok(Json("Snack deleted successfully".to_string()))
}

async fn reload(state: &AppState, id: String) -> Result<Json<SnackItem>, CinemaError> {
    state
        .snacks
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| CinemaError::not_found("snack", id))
}
