//! Remote movie store used by the remote-backed repository.
//!
//! A backend persists two related tables, `movies` and `movie_sessions`, and
//! publishes a "something changed" event per table on every write, whoever
//! issued it. Multi-row writes (a movie with its sessions, a session set
//! replacement, a cascade delete) are single backend operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::broadcast;

use crate::models::movie_model::{MovieDetails, MovieUpdate, Session, Showtime};
use crate::repository::ChangeEvent;

pub mod memory;
pub mod mongo;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<mongodb::bson::ser::Error> for BackendError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        BackendError::Serialization(err.to_string())
    }
}

impl From<mongodb::bson::de::Error> for BackendError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        BackendError::Serialization(err.to_string())
    }
}

/// One row of the `movies` table.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub id: String,
    pub details: MovieDetails,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait MovieBackend: Send + Sync + 'static {
    /// All movie rows, newest first.
    async fn fetch_movies(&self) -> Result<Vec<MovieRecord>, BackendError>;

    async fn fetch_sessions(&self) -> Result<Vec<Session>, BackendError>;

    /// Inserts the movie row and its session rows together; the store assigns the id.
    async fn insert_movie(
        &self,
        details: MovieDetails,
        sessions: Vec<Showtime>,
    ) -> Result<MovieRecord, BackendError>;

    /// Applies `changes`, replacing the session rows when `changes.sessions` is set.
    /// Returns `Ok(false)` when no movie has this id.
    async fn update_movie(&self, id: &str, changes: &MovieUpdate) -> Result<bool, BackendError>;

    /// Deletes the movie and its session rows. Returns `Ok(false)` when no movie has this id.
    async fn delete_movie(&self, id: &str) -> Result<bool, BackendError>;

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}
