#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::sync::Mutex;
use tower::ServiceExt;

use cine_cornelio::auth::{hash_password, AdminAuth, DEFAULT_ADMIN_EMAIL};
use cine_cornelio::backend::memory::InMemoryBackend;
use cine_cornelio::controllers::AppState;
use cine_cornelio::repository::local::CinemaStore;
use cine_cornelio::repository::remote::RemoteMovieRepository;
use cine_cornelio::router::build_router;
use cine_cornelio::websockets::SharedState;

pub const ADMIN_PASSWORD: &str = "pipoca-doce";
pub const APP_URL: &str = "http://localhost:5173";

fn admin() -> Arc<AdminAuth> {
    Arc::new(AdminAuth::new(DEFAULT_ADMIN_EMAIL, hash_password(ADMIN_PASSWORD).unwrap()))
}

fn router(state: AppState) -> Router {
    build_router(state, Arc::new(Mutex::new(SharedState::new())), APP_URL).unwrap()
}

/// Router over the seeded local store, as in a default deployment.
pub fn build_test_app() -> Router {
    let store = Arc::new(CinemaStore::seeded());
    router(AppState {
        movies: store.clone(),
        snacks: store,
        auth: admin(),
    })
}

/// Router whose movies come from the in-memory remote backend.
pub fn build_remote_test_app() -> (Router, Arc<InMemoryBackend>) {
    let backend = Arc::new(InMemoryBackend::new());
    let app = router(AppState {
        movies: Arc::new(RemoteMovieRepository::new(backend.clone())),
        snacks: Arc::new(CinemaStore::seeded()),
        auth: admin(),
    });
    (app, backend)
}

pub async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Response<Body> {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Signs in as the administrator and returns the bearer token.
pub async fn sign_in(app: &Router) -> String {
    let response = send(
        app,
        Method::POST,
        "/auth/sign-in",
        None,
        Some(serde_json::json!({ "password": ADMIN_PASSWORD })),
    )
    .await;
    body_json(response).await["token"].as_str().unwrap().to_string()
}
