use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::StatusCode,
    response::Json,
};
use validator::Validate;

use super::{json_body, AdminGuard, AppState};
use crate::error::CinemaError;
use crate::filter::{featured, Programacao, Selection};
use crate::forms::MovieForm;
use crate::models::movie_model::{Movie, MovieUpdate};

pub async fn load_movies(
    Extension(state): Extension<AppState>,
    Query(selection): Query<Selection>,
) -> Result<Json<Programacao>, CinemaError> {
    let movies = state.movies.list().await?;
    Ok(Json(selection.apply(&movies)))
}

pub async fn load_featured_movies(Extension(state): Extension<AppState>) -> Result<Json<Vec<Movie>>, CinemaError> {
    let movies = state.movies.list().await?;
    Ok(Json(featured(&movies).into_iter().cloned().collect()))
}

pub async fn load_movie(
    Path(id): Path<String>,
    Extension(state): Extension<AppState>,
) -> Result<Json<Movie>, CinemaError> {
    reload(&state, id).await
}

pub async fn add_movie(
    _admin: AdminGuard,
    Extension(state): Extension<AppState>,
    payload: Result<Json<MovieForm>, JsonRejection>,
) -> Result<(StatusCode, Json<Movie>), CinemaError> {
    let movie = json_body(payload)?.parse()?;
    let stored = state.movies.add(movie).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// The edit modal resubmits the whole form; every field and the session set are replaced.
pub async fn replace_movie(
    _admin: AdminGuard,
    Path(id): Path<String>,
    Extension(state): Extension<AppState>,
    payload: Result<Json<MovieForm>, JsonRejection>,
) -> Result<Json<Movie>, CinemaError> {
    let movie = json_body(payload)?.parse()?;
    state.movies.update(&id, MovieUpdate::replacing(movie)).await?;
    reload(&state, id).await
}

pub async fn update_movie(
    _admin: AdminGuard,
    Path(id): Path<String>,
    Extension(state): Extension<AppState>,
    payload: Result<Json<MovieUpdate>, JsonRejection>,
) -> Result<Json<Movie>, CinemaError> {
    let changes = json_body(payload)?.trimmed();
    changes.validate()?;
    state.movies.update(&id, changes).await?;
    reload(&state, id).await
}

pub async fn delete_movie(
    _admin: AdminGuard,
    Path(id): Path<String>,
    Extension(state): Extension<AppState>,
) -> Result<Json<String>, CinemaError> {
    state.movies.remove(&id).await?;
    Ok(Json("Movie deleted successfully".to_string()))
}

async fn reload(state: &AppState, id: String) -> Result<Json<Movie>, CinemaError> {
    state
        .movies
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| CinemaError::not_found("movie", id))
}
