// In memory implementation of the MovieBackend port.
//
// Purpose
// - Run the remote-backed repository without a database (tests, local development).
//
// Responsibilities
// - Keep movie and session rows in insertion order, apply multi-row writes under one lock.
// - Publish a change event per touched table, like a real change feed.
// - Simulate an unreachable store when switched offline.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use super::{BackendError, MovieBackend, MovieRecord};
use crate::models::movie_model::{MovieDetails, MovieUpdate, Session, Showtime};
use crate::repository::{ChangeEvent, Table, CHANGE_FEED_CAPACITY};

#[derive(Default)]
struct Tables {
    movies: Vec<MovieRecord>,
    sessions: Vec<Session>,
}

pub struct InMemoryBackend {
    tables: RwLock<Tables>,
    offline: AtomicBool,
    changes: broadcast::Sender<ChangeEvent>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            tables: RwLock::new(Tables::default()),
            offline: AtomicBool::new(false),
            changes,
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), BackendError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("movie backend offline".to_string()));
        }
        Ok(())
    }

    fn publish(&self, table: Table) {
        // No receiver is not an error.
        let _ = self.changes.send(ChangeEvent::new(table));
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MovieBackend for InMemoryBackend {
    async fn fetch_movies(&self) -> Result<Vec<MovieRecord>, BackendError> {
        self.ensure_online()?;
        let guard = self.tables.read().await;
        Ok(guard.movies.iter().rev().cloned().collect())
    }

    async fn fetch_sessions(&self) -> Result<Vec<Session>, BackendError> {
        self.ensure_online()?;
        Ok(self.tables.read().await.sessions.clone())
    }

    async fn insert_movie(
        &self,
        details: MovieDetails,
        sessions: Vec<Showtime>,
    ) -> Result<MovieRecord, BackendError> {
        self.ensure_online()?;
        let record = MovieRecord {
            id: Uuid::new_v4().to_string(),
            details,
            created_at: Utc::now(),
        };
        let has_sessions = !sessions.is_empty();
        {
            let mut guard = self.tables.write().await;
            guard.movies.push(record.clone());
            guard
                .sessions
                .extend(sessions.into_iter().map(|showtime| Session {
                    movie_id: record.id.clone(),
                    showtime,
                }));
        }
        self.publish(Table::Movies);
        if has_sessions {
            self.publish(Table::MovieSessions);
        }
        Ok(record)
    }

    async fn update_movie(&self, id: &str, changes: &MovieUpdate) -> Result<bool, BackendError> {
        self.ensure_online()?;
        {
            let mut guard = self.tables.write().await;
            let tables = &mut *guard;
            let Some(record) = tables.movies.iter_mut().find(|m| m.id == id) else {
                return Ok(false);
            };
            changes.apply_to(&mut record.details);
            if let Some(showtimes) = &changes.sessions {
                tables.sessions.retain(|s| s.movie_id != id);
                tables
                    .sessions
                    .extend(showtimes.iter().cloned().map(|showtime| Session {
                        movie_id: id.to_string(),
                        showtime,
                    }));
            }
        }
        self.publish(Table::Movies);
        if changes.sessions.is_some() {
            self.publish(Table::MovieSessions);
        }
        Ok(true)
    }

    async fn delete_movie(&self, id: &str) -> Result<bool, BackendError> {
        self.ensure_online()?;
        {
            let mut guard = self.tables.write().await;
            let before = guard.movies.len();
            guard.movies.retain(|m| m.id != id);
            if guard.movies.len() == before {
                return Ok(false);
            }
            guard.sessions.retain(|s| s.movie_id != id);
        }
        self.publish(Table::Movies);
        self.publish(Table::MovieSessions);
        Ok(true)
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }
}
