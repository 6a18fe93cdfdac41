use anyhow::Context;
use shuttle_secrets::{SecretStore, Secrets};
use std::sync::Arc;
use tokio::sync::Mutex;

use cine_cornelio::{
    auth::AdminAuth,
    backend::mongo::MongoBackend,
    config::{AppConfig, StoreKind},
    controllers::AppState,
    repository::{local::CinemaStore, remote::RemoteMovieRepository, MovieRepository},
    router::build_router,
    websockets::{spawn_carousel_fanout, spawn_change_fanout, SharedState},
};

#[shuttle_runtime::main]
async fn main(#[Secrets] secret_store: SecretStore) -> shuttle_axum::ShuttleAxum {
    // Secrets come from `Secrets.toml`.
    let config = AppConfig::from_secrets(&secret_store)?;

    // Snacks always live in the local store.
    let local_store = Arc::new(CinemaStore::seeded());
    let movies: Arc<dyn MovieRepository> = match &config.store {
        StoreKind::Local => {
            tracing::info!("Serving the seeded local catalogue");
            local_store.clone()
        }
        StoreKind::Mongo { uri, database } => {
            let backend = MongoBackend::connect(uri, database)
                .await
                .context("failed to connect to MongoDB")?;
            Arc::new(RemoteMovieRepository::new(Arc::new(backend)))
        }
    };

    let state = AppState {
        movies,
        snacks: local_store,
        auth: Arc::new(AdminAuth::new(config.admin_email.clone(), config.admin_password_hash.clone())),
    };

    let shared_state = Arc::new(Mutex::new(SharedState::new()));
    spawn_change_fanout(shared_state.clone(), state.movies.changes(), state.snacks.changes());
    spawn_carousel_fanout(shared_state.clone(), state.movies.clone());

    let app = build_router(state, shared_state, &config.app_url)?;

    Ok(app.into())
}
