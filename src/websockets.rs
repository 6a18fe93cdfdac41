use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::IntoResponse,
    Extension,
};
use futures::{SinkExt, StreamExt};
use serde_json::{json, to_string, Value};
use std::sync::Arc;
use tokio::{
    sync::{
        broadcast::{self, error::RecvError},
        mpsc::{unbounded_channel, UnboundedSender},
        Mutex,
    },
    task::JoinHandle,
};

use crate::carousel::{spawn_auto_advance, Carousel};
use crate::controllers::AppState;
use crate::filter::featured;
use crate::repository::{ChangeEvent, MovieRepository};

/// Connected browsers. Every frame uses the `{action_type, status, data}` envelope.
#[derive(Default)]
pub struct SharedState {
    clients: Vec<UnboundedSender<Message>>,
}

impl SharedState {
    pub fn new() -> Self {
        SharedState { clients: Vec::new() }
    }

    pub fn register(&mut self, client: UnboundedSender<Message>) {
        self.clients.push(client);
    }

    /// Forgets `client`, matched by channel identity.
    pub fn unregister(&mut self, client: &UnboundedSender<Message>) {
        self.clients.retain(|registered| !registered.same_channel(client));
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Sends to every client, forgetting the ones whose socket has gone away.
    pub fn broadcast(&mut self, action_type: &str, status: &str, data: Value) {
        let message_text = envelope(action_type, status, data);
        self.clients.retain(|client| {
            let delivered = client.send(Message::Text(message_text.clone())).is_ok();
            if !delivered {
                tracing::debug!("Dropping closed websocket client");
            }
            delivered
        });
    }
}

fn envelope(action_type: &str, status: &str, data: Value) -> String {
    let message = json!({
        "action_type": action_type,
        "status": status,
        "data": data
    });
    to_string(&message).unwrap_or_else(|_| "{}".to_string())
}

/// Forwards repository change events to every connected browser as `changed` frames.
pub fn spawn_change_fanout(
    shared_state: Arc<Mutex<SharedState>>,
    mut movies: broadcast::Receiver<ChangeEvent>,
    mut snacks: broadcast::Receiver<ChangeEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                event = movies.recv() => event,
                event = snacks.recv() => event,
            };
            match event {
                Ok(event) => {
                    let mut state = shared_state.lock().await;
                    state.broadcast("changed", "success", json!(event));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Websocket fan-out lagged behind the change feed");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

async fn featured_count(movies: &dyn MovieRepository) -> Option<usize> {
    match movies.list().await {
        Ok(list) => Some(featured(&list).len()),
        Err(err) => {
            tracing::warn!(error = %err, "Failed to count featured movies");
            None
        }
    }
}

/// Drives the hero carousel over the featured movies and pushes every slide change as a
/// `carousel` frame with the new index. The slide count follows the movie change feed.
pub fn spawn_carousel_fanout(
    shared_state: Arc<Mutex<SharedState>>,
    movies: Arc<dyn MovieRepository>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut changes = movies.changes();
        let len = featured_count(movies.as_ref()).await.unwrap_or(0);
        let carousel = Arc::new(Mutex::new(Carousel::new(len)));
        let (mut index, _auto_advance) = spawn_auto_advance(carousel.clone());

        loop {
            tokio::select! {
                changed = index.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let current = *index.borrow_and_update();
                    let mut state = shared_state.lock().await;
                    state.broadcast("carousel", "success", json!({ "index": current }));
                }
                event = changes.recv() => match event {
                    Ok(_) | Err(RecvError::Lagged(_)) => {
                        if let Some(len) = featured_count(movies.as_ref()).await {
                            carousel.lock().await.set_len(len);
                        }
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
    })
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Extension(state): Extension<AppState>,
    Extension(shared_state): Extension<Arc<Mutex<SharedState>>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, shared_state))
}

async fn handle_socket(socket: WebSocket, state: AppState, shared_state: Arc<Mutex<SharedState>>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = unbounded_channel::<Message>();

    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if let Err(err) = sender.send(message).await {
                tracing::warn!(error = %err, "Failed to send websocket message");
                break;
            }
        }
    });

    shared_state.lock().await.register(tx.clone());

    while let Some(frame) = receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                let reply = handle_action(&state, &text).await;
                if tx.send(Message::Text(reply)).is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            // Pings are answered by axum; binary frames carry no action.
            Ok(_) => continue,
            Err(err) => {
                tracing::debug!(error = %err, "Websocket read failed");
                break;
            }
        }
    }

    // Dropping the last sender ends the writer task.
    shared_state.lock().await.unregister(&tx);
}

/// Answers one client request with a framed reply for that client only.
pub async fn handle_action(state: &AppState, text: &str) -> String {
    let request: Value = serde_json::from_str(text).unwrap_or_else(|_| {
        tracing::debug!("Failed to parse websocket request as JSON");
        Value::Null
    });

    let Some(action_type) = request["action"].as_str() else {
        return envelope("error", "error", json!({"error": "Action type is missing"}));
    };

    let (status, data) = match action_type {
        "list_movies" => match state.movies.list().await {
            Ok(movies) => ("success", json!(movies)),
            Err(err) => {
                tracing::error!(error = %err, "Failed to list movies for websocket client");
                ("error", json!({"error": "Failed to list movies"}))
            }
        },
        "list_snacks" => match state.snacks.list().await {
            Ok(snacks) => ("success", json!(snacks)),
            Err(err) => {
                tracing::error!(error = %err, "Failed to list snacks for websocket client");
                ("error", json!({"error": "Failed to list snacks"}))
            }
        },
        _ => ("error", json!({"error": "Unsupported action"})),
    };
    envelope(action_type, status, data)
}
