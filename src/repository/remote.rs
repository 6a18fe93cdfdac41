// Remote-backed movie repository.
//
// Purpose
// - Serve movies from a MovieBackend while keeping a snapshot cache fresh.
//
// Responsibilities
// - Join session rows to their movies by movie_id; never expose a half-joined movie.
// - Rebuild the snapshot wholesale after a successful mutation or a change notification.
// - Keep the last good snapshot when a fetch or a mutation fails.
//
// Freshness
// - Every invalidation bumps a generation counter. A snapshot is served only if it was
//   loaded at the current generation, so a write is visible to the next list() even when
//   its change notification has not arrived yet. An older refresh that completes late never
//   replaces a newer snapshot.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::{
    sync::{broadcast, RwLock},
    task::JoinHandle,
};

use super::{ChangeEvent, MovieRepository};
use crate::backend::{BackendError, MovieBackend, MovieRecord};
use crate::error::CinemaError;
use crate::models::movie_model::{Movie, MovieUpdate, NewMovie, Session};

#[derive(Default)]
struct Snapshot {
    movies: Arc<Vec<Movie>>,
    loaded_at: Option<u64>,
}

#[derive(Default)]
struct SnapshotCache {
    snapshot: RwLock<Snapshot>,
    generation: AtomicU64,
}

impl SnapshotCache {
    fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    async fn fresh(&self) -> Option<Arc<Vec<Movie>>> {
        let snapshot = self.snapshot.read().await;
        let current = self.generation.load(Ordering::SeqCst);
        (snapshot.loaded_at == Some(current)).then(|| snapshot.movies.clone())
    }

    /// Whatever was loaded last, fresh or not. `None` before the first successful load.
    async fn last_good(&self) -> Option<Arc<Vec<Movie>>> {
        let snapshot = self.snapshot.read().await;
        snapshot.loaded_at.map(|_| snapshot.movies.clone())
    }

    async fn refresh<B: MovieBackend + ?Sized>(&self, backend: &B) -> Result<Arc<Vec<Movie>>, BackendError> {
        let generation = self.generation.load(Ordering::SeqCst);
        let movies = backend.fetch_movies().await?;
        let sessions = backend.fetch_sessions().await?;
        let movies = Arc::new(join_sessions(movies, sessions));

        let mut snapshot = self.snapshot.write().await;
        if snapshot.loaded_at.map_or(true, |loaded| loaded <= generation) {
            snapshot.movies = movies.clone();
            snapshot.loaded_at = Some(generation);
        }
        tracing::debug!(generation, count = movies.len(), "Movie snapshot refreshed");
        Ok(movies)
    }
}

/// Attaches session rows to their movies, keeping the movie order.
/// Rows pointing at an unknown movie are dropped.
fn join_sessions(movies: Vec<MovieRecord>, sessions: Vec<Session>) -> Vec<Movie> {
    let mut by_movie: HashMap<String, Vec<Session>> = HashMap::new();
    for session in sessions {
        by_movie.entry(session.movie_id.clone()).or_default().push(session);
    }
    movies
        .into_iter()
        .map(|record| Movie {
            sessions: by_movie.remove(&record.id).unwrap_or_default(),
            id: record.id,
            details: record.details,
        })
        .collect()
}

/// Owns the change-feed listener; the listener stops when this is dropped.
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub struct RemoteMovieRepository<B: MovieBackend> {
    backend: Arc<B>,
    cache: Arc<SnapshotCache>,
    _subscription: Subscription,
}

impl<B: MovieBackend> RemoteMovieRepository<B> {
    /// Must be called inside a Tokio runtime: it spawns the change-feed listener.
    pub fn new(backend: Arc<B>) -> Self {
        let cache = Arc::new(SnapshotCache::default());
        let subscription = Self::listen(backend.clone(), cache.clone());
        Self {
            backend,
            cache,
            _subscription: subscription,
        }
    }

    fn listen(backend: Arc<B>, cache: Arc<SnapshotCache>) -> Subscription {
        let mut feed = backend.subscribe();
        let handle = tokio::spawn(async move {
            loop {
                match feed.recv().await {
                    Ok(event) => tracing::debug!(table = ?event.table, "Change notification"),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Change feed lagged")
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
                cache.invalidate();
                if let Err(err) = cache.refresh(backend.as_ref()).await {
                    tracing::warn!(error = %err, "Background movie refresh failed");
                }
            }
        });
        Subscription { handle }
    }

    async fn snapshot(&self) -> Result<Arc<Vec<Movie>>, CinemaError> {
        if let Some(movies) = self.cache.fresh().await {
            return Ok(movies);
        }
        match self.cache.refresh(self.backend.as_ref()).await {
            Ok(movies) => Ok(movies),
            Err(err) => match self.cache.last_good().await {
                Some(movies) => {
                    tracing::warn!(error = %err, "Movie refresh failed, serving the last snapshot");
                    Ok(movies)
                }
                None => Err(err.into()),
            },
        }
    }
}

#[async_trait]
impl<B: MovieBackend> MovieRepository for RemoteMovieRepository<B> {
    async fn list(&self) -> Result<Vec<Movie>, CinemaError> {
        Ok(self.snapshot().await?.as_ref().clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Movie>, CinemaError> {
        Ok(self.snapshot().await?.iter().find(|m| m.id == id).cloned())
    }

    async fn add(&self, movie: NewMovie) -> Result<Movie, CinemaError> {
        let NewMovie { details, sessions } = movie;
        let record = self.backend.insert_movie(details, sessions.clone()).await?;
        self.cache.invalidate();
        tracing::info!(movie_id = %record.id, title = %record.details.title, "Movie added");
        Ok(Movie::assemble(record.id, record.details, sessions))
    }

    async fn update(&self, id: &str, changes: MovieUpdate) -> Result<(), CinemaError> {
        if !self.backend.update_movie(id, &changes).await? {
            return Err(CinemaError::not_found("movie", id));
        }
        self.cache.invalidate();
        tracing::info!(movie_id = %id, sessions_replaced = changes.sessions.is_some(), "Movie updated");
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), CinemaError> {
        if !self.backend.delete_movie(id).await? {
            return Err(CinemaError::not_found("movie", id));
        }
        self.cache.invalidate();
        tracing::info!(movie_id = %id, "Movie removed");
        Ok(())
    }

    fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.backend.subscribe()
    }
}

#[cfg(test)]
mod remote_movie_repository_tests {
    use super::*;
    use crate::backend::memory::InMemoryBackend;
    use crate::models::movie_model::{AgeRating, MovieDetails, SessionType, Showtime, Tech};
    use rstest::{fixture, rstest};

    #[fixture]
    fn new_movie() -> NewMovie {
        NewMovie {
            details: MovieDetails::new("Entre Silêncios", "/posters/5.jpg", AgeRating::Fourteen),
            sessions: vec![
                Showtime::new("16:00", SessionType::Subtitled, Tech::TwoD),
                Showtime::new("18:30", SessionType::Dubbed, Tech::TwoD),
            ],
        }
    }

    fn repository() -> (Arc<InMemoryBackend>, RemoteMovieRepository<InMemoryBackend>) {
        let backend = Arc::new(InMemoryBackend::new());
        let repository = RemoteMovieRepository::new(backend.clone());
        (backend, repository)
    }

    #[rstest]
    fn it_should_join_sessions_by_movie_id() {
        let record = |id: &str| MovieRecord {
            id: id.to_string(),
            details: MovieDetails::new(id, "/p.jpg", AgeRating::Free),
            created_at: chrono::Utc::now(),
        };
        let session = |movie_id: &str, time: &str| Session {
            movie_id: movie_id.to_string(),
            showtime: Showtime::new(time, SessionType::Dubbed, Tech::TwoD),
        };
        let movies = join_sessions(
            vec![record("b"), record("a")],
            vec![session("a", "14:00"), session("b", "15:00"), session("ghost", "16:00"), session("a", "18:00")],
        );

        assert_eq!(movies[0].id, "b");
        assert_eq!(movies[0].sessions.len(), 1);
        assert_eq!(movies[1].sessions.len(), 2);
        assert_eq!(movies[1].sessions[1].showtime.time, "18:00");
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_read_its_own_writes(new_movie: NewMovie) {
        let (_, repository) = repository();
        assert!(repository.list().await.unwrap().is_empty());

        let stored = repository.add(new_movie).await.unwrap();
        let movies = repository.list().await.unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].sessions.len(), 2);
        assert!(movies[0].sessions.iter().all(|s| s.movie_id == stored.id));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_list_newest_first(new_movie: NewMovie) {
        let (_, repository) = repository();
        let first = repository.add(new_movie.clone()).await.unwrap();
        let second = repository.add(new_movie).await.unwrap();
        let ids: Vec<String> = repository.list().await.unwrap().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_keep_sessions_on_a_title_update(new_movie: NewMovie) {
        let (_, repository) = repository();
        let stored = repository.add(new_movie).await.unwrap();
        let before = repository.get_by_id(&stored.id).await.unwrap().unwrap();

        repository.update(&stored.id, MovieUpdate::title("X")).await.unwrap();
        let after = repository.get_by_id(&stored.id).await.unwrap().unwrap();
        assert_eq!(after.details.title, "X");
        assert_eq!(after.sessions, before.sessions);
        assert_eq!(after.details.poster_url, before.details.poster_url);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_cascade_sessions_on_remove(new_movie: NewMovie) {
        let (backend, repository) = repository();
        let stored = repository.add(new_movie).await.unwrap();
        repository.remove(&stored.id).await.unwrap();

        assert!(repository.get_by_id(&stored.id).await.unwrap().is_none());
        let orphans = backend.fetch_sessions().await.unwrap();
        assert!(orphans.iter().all(|s| s.movie_id != stored.id));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_report_missing_ids_as_not_found() {
        let (_, repository) = repository();
        assert!(matches!(
            repository.remove("nope").await,
            Err(CinemaError::NotFound { .. })
        ));
        assert!(matches!(
            repository.update("nope", MovieUpdate::title("X")).await,
            Err(CinemaError::NotFound { .. })
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_keep_the_snapshot_when_a_mutation_fails(new_movie: NewMovie) {
        let (backend, repository) = repository();
        repository.add(new_movie.clone()).await.unwrap();
        // Let the listener drain the notifications of the first add.
        settle().await;
        let before = repository.list().await.unwrap();

        backend.set_offline(true);
        let result = repository.add(new_movie).await;
        assert!(matches!(result, Err(CinemaError::Store(_))));
        assert_eq!(repository.list().await.unwrap(), before);
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_serve_the_last_snapshot_when_a_refetch_fails(new_movie: NewMovie) {
        let (backend, repository) = repository();
        repository.add(new_movie.clone()).await.unwrap();
        let before = repository.list().await.unwrap();

        // Another admin writes, then the store goes away before the refetch.
        backend.insert_movie(new_movie.details, new_movie.sessions).await.unwrap();
        backend.set_offline(true);
        settle().await;

        assert_eq!(repository.list().await.unwrap(), before);
        let id = &before[0].id;
        assert!(repository.get_by_id(id).await.unwrap().is_some());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_replace_the_whole_session_set(new_movie: NewMovie) {
        let (backend, repository) = repository();
        let stored = repository.add(new_movie).await.unwrap();
        let update = MovieUpdate {
            sessions: Some(vec![Showtime::new("23:00", SessionType::Subtitled, Tech::TwoD)]),
            ..Default::default()
        };
        repository.update(&stored.id, update).await.unwrap();

        let after = repository.get_by_id(&stored.id).await.unwrap().unwrap();
        let times: Vec<&str> = after.sessions.iter().map(|s| s.showtime.time.as_str()).collect();
        assert_eq!(times, vec!["23:00"]);
        assert_eq!(after.sessions[0].movie_id, stored.id);

        let rows = backend.fetch_sessions().await.unwrap();
        assert_eq!(rows.iter().filter(|s| s.movie_id == stored.id).count(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_keep_the_snapshot_when_update_or_remove_fails(new_movie: NewMovie) {
        let (backend, repository) = repository();
        let stored = repository.add(new_movie).await.unwrap();
        settle().await;
        let before = repository.list().await.unwrap();

        backend.set_offline(true);
        assert!(matches!(
            repository.update(&stored.id, MovieUpdate::title("X")).await,
            Err(CinemaError::Store(_))
        ));
        assert_eq!(repository.list().await.unwrap(), before);

        assert!(matches!(repository.remove(&stored.id).await, Err(CinemaError::Store(_))));
        assert_eq!(repository.list().await.unwrap(), before);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_surface_fetch_failures_as_store_errors() {
        let (backend, repository) = repository();
        backend.set_offline(true);
        assert!(matches!(repository.list().await, Err(CinemaError::Store(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_pick_up_writes_from_other_sessions(new_movie: NewMovie) {
        let (backend, repository) = repository();
        assert!(repository.list().await.unwrap().is_empty());

        // Another admin writes straight to the store.
        backend.insert_movie(new_movie.details, new_movie.sessions).await.unwrap();

        let mut listed = Vec::new();
        for _ in 0..50 {
            listed = repository.list().await.unwrap();
            if !listed.is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(listed.len(), 1);
    }
}
