// Data access ports.
//
// Purpose
// - Single source of truth for the movie and snack collections; every mutation goes through here.
//
// Boundaries
// - Inputs are already validated at the admin-form boundary.
// - No authorization: the admin surface gates access before calling in.
//
// Implementations
// - local::CinemaStore, in-memory state seeded from fixtures.
// - remote::RemoteMovieRepository, backed by a MovieBackend with a change feed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::CinemaError;
use crate::models::movie_model::{Movie, MovieUpdate, NewMovie};
use crate::models::snack_model::{NewSnack, SnackItem, SnackUpdate};

pub mod local;
pub mod remote;

pub const CHANGE_FEED_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Movies,
    MovieSessions,
    Snacks,
}

/// "Something changed in `table`". Carries no row diff; listeners refetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: Table,
}

impl ChangeEvent {
    pub fn new(table: Table) -> Self {
        Self { table }
    }
}

#[async_trait]
pub trait MovieRepository: Send + Sync {
    /// Snapshot of every movie with its sessions.
    async fn list(&self) -> Result<Vec<Movie>, CinemaError>;

    /// `Ok(None)` for an unknown id.
    async fn get_by_id(&self, id: &str) -> Result<Option<Movie>, CinemaError>;

    /// Stores the movie and its sessions as one operation and returns it with its new id.
    async fn add(&self, movie: NewMovie) -> Result<Movie, CinemaError>;

    /// Merges `changes` into the movie. A `sessions` field replaces the whole set.
    async fn update(&self, id: &str, changes: MovieUpdate) -> Result<(), CinemaError>;

    /// Deletes the movie and its sessions. `NotFound` for an unknown id.
    async fn remove(&self, id: &str) -> Result<(), CinemaError>;

    fn changes(&self) -> broadcast::Receiver<ChangeEvent>;
}

#[async_trait]
pub trait SnackRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<SnackItem>, CinemaError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<SnackItem>, CinemaError>;

    async fn add(&self, snack: NewSnack) -> Result<SnackItem, CinemaError>;

    async fn update(&self, id: &str, changes: SnackUpdate) -> Result<(), CinemaError>;

    async fn remove(&self, id: &str) -> Result<(), CinemaError>;

    fn changes(&self) -> broadcast::Receiver<ChangeEvent>;
}
