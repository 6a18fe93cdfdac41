// Local-state repository.
//
// Purpose
// - Hold the movie and snack collections in memory, seeded from the fixtures.
//
// Responsibilities
// - Assign random ids on creation, never reassign them.
// - Apply every mutation under one write lock and announce it on the change feed.
//
// Nothing is persisted; a restart brings back the seed catalogue.

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use super::{ChangeEvent, MovieRepository, SnackRepository, Table, CHANGE_FEED_CAPACITY};
use crate::error::CinemaError;
use crate::fixtures;
use crate::models::movie_model::{Movie, MovieUpdate, NewMovie};
use crate::models::snack_model::{NewSnack, SnackItem, SnackUpdate};

const ID_LENGTH: usize = 8;

#[derive(Default)]
struct CinemaState {
    movies: Vec<Movie>,
    snacks: Vec<SnackItem>,
}

pub struct CinemaStore {
    state: RwLock<CinemaState>,
    movie_changes: broadcast::Sender<ChangeEvent>,
    snack_changes: broadcast::Sender<ChangeEvent>,
}

/// Random short token, redrawn until it is not `taken`.
fn generate_id(taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id: String = Uuid::new_v4().simple().to_string()[..ID_LENGTH].to_string();
        if !taken(&id) {
            return id;
        }
    }
}

impl CinemaStore {
    pub fn new() -> Self {
        Self::with_state(CinemaState::default())
    }

    /// A store holding the seed catalogue.
    pub fn seeded() -> Self {
        let mut state = CinemaState::default();
        for movie in fixtures::movies() {
            let id = generate_id(|id| state.movies.iter().any(|m| m.id == id));
            state.movies.push(Movie::assemble(id, movie.details, movie.sessions));
        }
        for snack in fixtures::snacks() {
            let id = generate_id(|id| state.snacks.iter().any(|s| s.id == id));
            state.snacks.push(SnackItem { id, details: snack });
        }

        Self::with_state(state)
    }

    fn with_state(state: CinemaState) -> Self {
        let (movie_changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        let (snack_changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            state: RwLock::new(state),
            movie_changes,
            snack_changes,
        }
    }

    /// No subscriber is not an error.
    fn publish(&self, table: Table) {
        let feed = match table {
            Table::Snacks => &self.snack_changes,
            Table::Movies | Table::MovieSessions => &self.movie_changes,
        };
        let _ = feed.send(ChangeEvent::new(table));
    }
}

impl Default for CinemaStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MovieRepository for CinemaStore {
    async fn list(&self) -> Result<Vec<Movie>, CinemaError> {
        Ok(self.state.read().await.movies.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Movie>, CinemaError> {
        let guard = self.state.read().await;
        Ok(guard.movies.iter().find(|m| m.id == id).cloned())
    }

    async fn add(&self, movie: NewMovie) -> Result<Movie, CinemaError> {
        let stored = {
            let mut guard = self.state.write().await;
            let id = generate_id(|id| guard.movies.iter().any(|m| m.id == id));
            let stored = Movie::assemble(id, movie.details, movie.sessions);
            guard.movies.push(stored.clone());
            stored
        };
        tracing::info!(movie_id = %stored.id, title = %stored.details.title, "Movie added");
        self.publish(Table::Movies);
        Ok(stored)
    }

    async fn update(&self, id: &str, changes: MovieUpdate) -> Result<(), CinemaError> {
        {
            let mut guard = self.state.write().await;
            let movie = guard
                .movies
                .iter_mut()
                .find(|m| m.id == id)
                .ok_or_else(|| CinemaError::not_found("movie", id))?;
            changes.apply_to(&mut movie.details);
            if let Some(showtimes) = changes.sessions {
                movie.replace_sessions(showtimes);
            }
        }
        tracing::info!(movie_id = %id, "Movie updated");
        self.publish(Table::Movies);
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), CinemaError> {
        {
            let mut guard = self.state.write().await;
            let before = guard.movies.len();
            guard.movies.retain(|m| m.id != id);
            if guard.movies.len() == before {
                return Err(CinemaError::not_found("movie", id));
            }
        }
        tracing::info!(movie_id = %id, "Movie removed");
        self.publish(Table::Movies);
        Ok(())
    }

    fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.movie_changes.subscribe()
    }
}

#[async_trait]
impl SnackRepository for CinemaStore {
    async fn list(&self) -> Result<Vec<SnackItem>, CinemaError> {
        Ok(self.state.read().await.snacks.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<SnackItem>, CinemaError> {
        let guard = self.state.read().await;
        Ok(guard.snacks.iter().find(|s| s.id == id).cloned())
    }

    async fn add(&self, snack: NewSnack) -> Result<SnackItem, CinemaError> {
        let stored = {
            let mut guard = self.state.write().await;
            let id = generate_id(|id| guard.snacks.iter().any(|s| s.id == id));
            let stored = SnackItem { id, details: snack };
            guard.snacks.push(stored.clone());
            stored
        };
        tracing::info!(snack_id = %stored.id, name = %stored.details.name, "Snack added");
        self.publish(Table::Snacks);
        Ok(stored)
    }

    async fn update(&self, id: &str, changes: SnackUpdate) -> Result<(), CinemaError> {
        {
            let mut guard = self.state.write().await;
            let snack = guard
                .snacks
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or_else(|| CinemaError::not_found("snack", id))?;
            changes.apply_to(&mut snack.details);
        }
        tracing::info!(snack_id = %id, "Snack updated");
        self.publish(Table::Snacks);
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), CinemaError> {
        {
            let mut guard = self.state.write().await;
            let before = guard.snacks.len();
            guard.snacks.retain(|s| s.id != id);
            if guard.snacks.len() == before {
                return Err(CinemaError::not_found("snack", id));
            }
        }
        tracing::info!(snack_id = %id, "Snack removed");
        self.publish(Table::Snacks);
        Ok(())
    }

    fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.snack_changes.subscribe()
    }
}

#[cfg(test)]
mod cinema_store_tests {
    use super::*;
    use crate::models::movie_model::{AgeRating, MovieDetails, SessionType, Showtime, Tech};
    use crate::models::snack_model::{Price, SnackCategory};
    use rstest::{fixture, rstest};

    #[fixture]
    fn new_movie() -> NewMovie {
        let mut details = MovieDetails::new("Velocidade Máxima", "/posters/4.jpg", AgeRating::Fourteen);
        details.genres = vec!["Ação".into(), "Aventura".into()];
        NewMovie {
            details,
            sessions: vec![
                Showtime::new("15:00", SessionType::Dubbed, Tech::ThreeD),
                Showtime::new("18:00", SessionType::Subtitled, Tech::ThreeD),
            ],
        }
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_seed_the_catalogue() {
        let store = CinemaStore::seeded();
        assert_eq!(MovieRepository::list(&store).await.unwrap().len(), 9);
        assert_eq!(SnackRepository::list(&store).await.unwrap().len(), 6);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_return_the_added_movie_by_id(new_movie: NewMovie) {
        let store = CinemaStore::new();
        let stored = MovieRepository::add(&store, new_movie.clone()).await.unwrap();

        let fetched = MovieRepository::get_by_id(&store, &stored.id).await.unwrap().unwrap();
        assert_eq!(fetched.details, new_movie.details);
        let showtimes: Vec<Showtime> = fetched.showtimes().cloned().collect();
        assert_eq!(showtimes, new_movie.sessions);
        assert!(fetched.sessions.iter().all(|s| s.movie_id == stored.id));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_append_new_movies(new_movie: NewMovie) {
        let store = CinemaStore::seeded();
        let stored = MovieRepository::add(&store, new_movie).await.unwrap();
        let movies = MovieRepository::list(&store).await.unwrap();
        assert_eq!(movies.last().unwrap().id, stored.id);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_keep_ids_unique() {
        let store = CinemaStore::seeded();
        let movies = MovieRepository::list(&store).await.unwrap();
        let mut ids: Vec<&str> = movies.iter().map(|m| m.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), movies.len());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_change_only_the_title(new_movie: NewMovie) {
        let store = CinemaStore::new();
        let before = MovieRepository::add(&store, new_movie).await.unwrap();
        MovieRepository::update(&store, &before.id, MovieUpdate::title("X")).await.unwrap();

        let after = MovieRepository::get_by_id(&store, &before.id).await.unwrap().unwrap();
        assert_eq!(after.details.title, "X");
        let mut expected = before.clone();
        expected.details.title = "X".to_string();
        assert_eq!(after, expected);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_replace_the_whole_session_set(new_movie: NewMovie) {
        let store = CinemaStore::new();
        let stored = MovieRepository::add(&store, new_movie).await.unwrap();
        let update = MovieUpdate {
            sessions: Some(vec![Showtime::new("23:00", SessionType::Subtitled, Tech::TwoD)]),
            ..Default::default()
        };
        MovieRepository::update(&store, &stored.id, update).await.unwrap();

        let after = MovieRepository::get_by_id(&store, &stored.id).await.unwrap().unwrap();
        assert_eq!(after.sessions.len(), 1);
        assert_eq!(after.sessions[0].showtime.time, "23:00");
        assert_eq!(after.sessions[0].movie_id, stored.id);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_report_unknown_ids() {
        let store = CinemaStore::seeded();
        assert!(MovieRepository::get_by_id(&store, "missing").await.unwrap().is_none());
        assert!(matches!(
            MovieRepository::update(&store, "missing", MovieUpdate::title("X")).await,
            Err(CinemaError::NotFound { entity: "movie", .. })
        ));
        assert!(matches!(
            MovieRepository::remove(&store, "missing").await,
            Err(CinemaError::NotFound { .. })
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_remove_movies_with_their_sessions(new_movie: NewMovie) {
        let store = CinemaStore::seeded();
        let stored = MovieRepository::add(&store, new_movie).await.unwrap();
        MovieRepository::remove(&store, &stored.id).await.unwrap();

        let movies = MovieRepository::list(&store).await.unwrap();
        assert!(movies.iter().all(|m| m.id != stored.id));
        assert!(movies
            .iter()
            .flat_map(|m| m.sessions.iter())
            .all(|s| s.movie_id != stored.id));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_announce_mutations_on_the_change_feed(new_movie: NewMovie) {
        let store = CinemaStore::new();
        let mut feed = MovieRepository::changes(&store);
        MovieRepository::add(&store, new_movie).await.unwrap();
        assert_eq!(feed.recv().await.unwrap().table, Table::Movies);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_keep_the_snack_feed_quiet_on_movie_changes(new_movie: NewMovie) {
        let store = CinemaStore::new();
        let mut snack_feed = SnackRepository::changes(&store);
        MovieRepository::add(&store, new_movie).await.unwrap();
        assert!(snack_feed.try_recv().is_err());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_update_and_remove_snacks() {
        let store = CinemaStore::new();
        let snack = SnackRepository::add(
            &store,
            NewSnack {
                name: "Refrigerante 500ml".into(),
                description: "Lata gelada".into(),
                price: Price::from_cents(900),
                image_url: "/placeholder.svg".into(),
                category: SnackCategory::Bebida,
            },
        )
        .await
        .unwrap();

        let update = SnackUpdate {
            price: Some(Price::from_cents(1000)),
            ..Default::default()
        };
        SnackRepository::update(&store, &snack.id, update).await.unwrap();
        let fetched = SnackRepository::get_by_id(&store, &snack.id).await.unwrap().unwrap();
        assert_eq!(fetched.details.price, Price::from_cents(1000));
        assert_eq!(fetched.details.name, "Refrigerante 500ml");

        SnackRepository::remove(&store, &snack.id).await.unwrap();
        assert!(SnackRepository::list(&store).await.unwrap().is_empty());
        assert!(matches!(
            SnackRepository::remove(&store, &snack.id).await,
            Err(CinemaError::NotFound { entity: "snack", .. })
        ));
    }
}
