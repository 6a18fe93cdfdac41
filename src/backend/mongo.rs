use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use mongodb::{
    bson::{self, doc, oid::ObjectId, Bson, Document},
    options::{ClientOptions, FindOptions},
    Client, Collection, Database,
};
use serde::{Deserialize, Serialize};
use tokio::{sync::broadcast, task::JoinHandle};

use super::{BackendError, MovieBackend, MovieRecord};
use crate::models::movie_model::{MovieDetails, MovieUpdate, Session, Showtime};
use crate::repository::{ChangeEvent, Table, CHANGE_FEED_CAPACITY};

const MOVIES: &str = "movies";
const MOVIE_SESSIONS: &str = "movie_sessions";

#[derive(Debug, Serialize, Deserialize)]
struct MovieDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    #[serde(flatten)]
    details: MovieDetails,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    movie_id: ObjectId,
    #[serde(flatten)]
    showtime: Showtime,
}

/// MongoDB store. Writes spanning both collections run in a transaction, so the
/// deployment must be a replica set (Atlas clusters are).
pub struct MongoBackend {
    client: Client,
    database: Database,
    changes: broadcast::Sender<ChangeEvent>,
    watchers: Vec<JoinHandle<()>>,
}

impl MongoBackend {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, BackendError> {
        let client_options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(client_options)?;
        let database = client.database(database);

        // Fail at startup rather than on the first request.
        database.run_command(doc! {"ping": 1}, None).await?;
        tracing::info!(database = %database.name(), "Connected to MongoDB");

        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        let watchers = vec![
            spawn_watcher(database.collection::<Document>(MOVIES), Table::Movies, changes.clone()),
            spawn_watcher(
                database.collection::<Document>(MOVIE_SESSIONS),
                Table::MovieSessions,
                changes.clone(),
            ),
        ];

        Ok(Self {
            client,
            database,
            changes,
            watchers,
        })
    }

    fn movies(&self) -> Collection<MovieDocument> {
        self.database.collection(MOVIES)
    }

    fn sessions(&self) -> Collection<SessionDocument> {
        self.database.collection(MOVIE_SESSIONS)
    }
}

impl Drop for MongoBackend {
    fn drop(&mut self) {
        for watcher in &self.watchers {
            watcher.abort();
        }
    }
}

/// Forwards every change-stream event of `collection` as a table-level change.
fn spawn_watcher(
    collection: Collection<Document>,
    table: Table,
    changes: broadcast::Sender<ChangeEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut stream = match collection.watch(Vec::<Document>::new(), None).await {
            Ok(stream) => stream,
            Err(err) => {
                tracing::warn!(table = ?table, error = %err, "Failed to open change stream");
                return;
            }
        };
        while let Some(event) = stream.next().await {
            match event {
                Ok(_) => {
                    let _ = changes.send(ChangeEvent::new(table));
                }
                Err(err) => {
                    tracing::warn!(table = ?table, error = %err, "Change stream closed");
                    break;
                }
            }
        }
    })
}

fn session_documents(movie_id: ObjectId, showtimes: &[Showtime]) -> Vec<SessionDocument> {
    showtimes
        .iter()
        .cloned()
        .map(|showtime| SessionDocument {
            id: None,
            movie_id,
            showtime,
        })
        .collect()
}

#[async_trait]
impl MovieBackend for MongoBackend {
    async fn fetch_movies(&self) -> Result<Vec<MovieRecord>, BackendError> {
        let options = FindOptions::builder().sort(doc! {"created_at": -1}).build();
        let documents: Vec<MovieDocument> = self.movies().find(None, options).await?.try_collect().await?;

        documents
            .into_iter()
            .map(|document| {
                let id = document
                    .id
                    .ok_or_else(|| BackendError::Serialization("movie row without _id".to_string()))?;
                Ok(MovieRecord {
                    id: id.to_hex(),
                    details: document.details,
                    created_at: document.created_at.to_chrono(),
                })
            })
            .collect()
    }

    async fn fetch_sessions(&self) -> Result<Vec<Session>, BackendError> {
        let documents: Vec<SessionDocument> = self.sessions().find(None, None).await?.try_collect().await?;

        Ok(documents
            .into_iter()
            .map(|document| Session {
                movie_id: document.movie_id.to_hex(),
                showtime: document.showtime,
            })
            .collect())
    }

    async fn insert_movie(
        &self,
        details: MovieDetails,
        sessions: Vec<Showtime>,
    ) -> Result<MovieRecord, BackendError> {
        let now = bson::DateTime::now();
        let document = MovieDocument {
            id: None,
            details,
            created_at: now,
            updated_at: now,
        };

        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        let inserted = self.movies().insert_one_with_session(&document, None, &mut session).await?;
        let movie_id = inserted
            .inserted_id
            .as_object_id()
            .ok_or_else(|| BackendError::Serialization("store assigned a non ObjectId id".to_string()))?;

        if !sessions.is_empty() {
            self.sessions()
                .insert_many_with_session(session_documents(movie_id, &sessions), None, &mut session)
                .await?;
        }
        session.commit_transaction().await?;

        Ok(MovieRecord {
            id: movie_id.to_hex(),
            details: document.details,
            created_at: now.to_chrono(),
        })
    }

    async fn update_movie(&self, id: &str, changes: &MovieUpdate) -> Result<bool, BackendError> {
        let movie_id = match ObjectId::parse_str(id) {
            Ok(id) => id,
            Err(_) => return Ok(false),
        };

        let mut update_doc = Document::new();
        for (key, value) in changes.scalar_fields() {
            let bson_value =
                Bson::try_from(value).map_err(|err| BackendError::Serialization(err.to_string()))?;
            update_doc.insert(key, bson_value);
        }
        update_doc.insert("updated_at", bson::DateTime::now());

        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        let update_result = self
            .movies()
            .update_one_with_session(doc! {"_id": movie_id}, doc! {"$set": update_doc}, None, &mut session)
            .await?;
        if update_result.matched_count == 0 {
            session.abort_transaction().await?;
            return Ok(false);
        }

        if let Some(showtimes) = &changes.sessions {
            self.sessions()
                .delete_many_with_session(doc! {"movie_id": movie_id}, None, &mut session)
                .await?;
            if !showtimes.is_empty() {
                self.sessions()
                    .insert_many_with_session(session_documents(movie_id, showtimes), None, &mut session)
                    .await?;
            }
        }
        session.commit_transaction().await?;

        Ok(true)
    }

    async fn delete_movie(&self, id: &str) -> Result<bool, BackendError> {
        let movie_id = match ObjectId::parse_str(id) {
            Ok(id) => id,
            Err(_) => return Ok(false),
        };

        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        let delete_result = self
            .movies()
            .delete_one_with_session(doc! {"_id": movie_id}, None, &mut session)
            .await?;
        if delete_result.deleted_count == 0 {
            session.abort_transaction().await?;
            return Ok(false);
        }
        self.sessions()
            .delete_many_with_session(doc! {"movie_id": movie_id}, None, &mut session)
            .await?;
        session.commit_transaction().await?;

        Ok(true)
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }
}
