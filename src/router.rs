use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::controllers::{
    auth_controller, home_controller, movie_controller::*, snack_controller::*, AppState,
};
use crate::websockets::{websocket_handler, SharedState};

/// Full route table. `app_url` is the only origin allowed by CORS.
pub fn build_router(state: AppState, shared_state: Arc<Mutex<SharedState>>, app_url: &str) -> anyhow::Result<Router> {
    let origin = app_url
        .parse::<HeaderValue>()
        .map_err(|err| anyhow::anyhow!("APP_URL is not a valid origin: {err}"))?;

    let app = Router::new()
        .route("/", get(home_controller::index))
        .route("/genres", get(home_controller::genres))
        .route("/ws", get(websocket_handler))
        .route("/movies", get(load_movies).post(add_movie))
        .route("/movies/featured", get(load_featured_movies))
        .route(
            "/movies/:id",
            get(load_movie).put(replace_movie).patch(update_movie).delete(delete_movie),
        )
        .route("/snacks", get(load_snacks).post(add_snack))
        .route(
            "/snacks/:id",
            get(load_snack).put(replace_snack).patch(update_snack).delete(delete_snack),
        )
        .route("/auth/sign-in", post(auth_controller::sign_in))
        .route("/auth/sign-out", post(auth_controller::sign_out))
        .route("/auth/status", get(auth_controller::status))
        .layer(
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_origin(origin)
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http())
        .layer(Extension(shared_state))
        .layer(Extension(state));

    Ok(app)
}
