use std::collections::HashMap;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};
use shared::models::responses::{ChatMessage, LobbyEvent, MoveEvent};

pub fn routes() -> Router<AppState> {
    Router::new().route("/ws", get(upgrade))
}

#[derive(Debug, Deserialize)]
struct ChannelParams {
    token: Option<String>,
}

/// Client to server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ChannelCommand {
    Join {
        #[serde(rename = "lobbyId")]
        lobby_id: Uuid,
    },
    Leave {
        #[serde(rename = "lobbyId")]
        lobby_id: Uuid,
    },
    Chat {
        #[serde(rename = "lobbyId")]
        lobby_id: Uuid,
        message: String,
    },
}

/// Server to client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChannelMessage {
    Move(MoveEvent),
    Chat(ChatMessage),
    Joined {
        #[serde(rename = "lobbyId")]
        lobby_id: Uuid,
    },
    Left {
        #[serde(rename = "lobbyId")]
        lobby_id: Uuid,
    },
    /// Events were dropped because the socket fell behind; the client should
    /// reload the lobby's state.
    Resync {
        #[serde(rename = "lobbyId")]
        lobby_id: Uuid,
        skipped: u64,
    },
    Error {
        message: String,
    },
}

/// Anyone may watch a lobby; chatting needs `?token=`.
async fn upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<ChannelParams>,
) -> Result<Response, ApiError> {
    let user_id = match params.token.as_deref() {
        Some(token) => Some(state.auth_service.extract_user_id_from_token(token)?),
        None => None,
    };
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user_id)))
}

async fn handle_socket(socket: WebSocket, state: AppState, user_id: Option<String>) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ChannelMessage>();

    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Failed to serialize channel message: {}", e);
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let mut subscriptions: HashMap<Uuid, JoinHandle<()>> = HashMap::new();

    while let Some(Ok(message)) = stream.next().await {
        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        match serde_json::from_str::<ChannelCommand>(text.as_str()) {
            Ok(ChannelCommand::Join { lobby_id }) => {
                if !subscriptions.contains_key(&lobby_id) {
                    let forwarder = forward_events(&state, lobby_id, tx.clone());
                    subscriptions.insert(lobby_id, forwarder);
                    debug!("Socket joined channel of lobby {}", lobby_id);
                }
                let _ = tx.send(ChannelMessage::Joined { lobby_id });
            }
            Ok(ChannelCommand::Leave { lobby_id }) => {
                if let Some(forwarder) = subscriptions.remove(&lobby_id) {
                    forwarder.abort();
                    let _ = forwarder.await;
                    state.notifier.prune(&lobby_id);
                }
                let _ = tx.send(ChannelMessage::Left { lobby_id });
            }
            Ok(ChannelCommand::Chat { lobby_id, message }) => {
                let joined = subscriptions.contains_key(&lobby_id);
                if let Err(message) =
                    relay_chat(&state, user_id.as_deref(), joined, lobby_id, &message).await
                {
                    let _ = tx.send(ChannelMessage::Error { message });
                }
            }
            Err(e) => {
                let _ = tx.send(ChannelMessage::Error {
                    message: format!("Unrecognised command: {}", e),
                });
            }
        }
    }

    for (lobby_id, forwarder) in subscriptions {
        forwarder.abort();
        let _ = forwarder.await;
        state.notifier.prune(&lobby_id);
    }
    drop(tx);
    let _ = writer.await;
    info!("Socket closed");
}

/// Sends a chat line from a signed-in socket that has joined the lobby's
/// channel. The error is the text shown back to the sender.
async fn relay_chat(
    state: &AppState,
    sender_id: Option<&str>,
    joined: bool,
    lobby_id: Uuid,
    text: &str,
) -> Result<(), String> {
    let Some(sender_id) = sender_id else {
        return Err("Sign in to chat".to_string());
    };
    if !joined {
        return Err("Join the lobby's channel before chatting".to_string());
    }

    let sender_name = state.user_service.display_name(sender_id).await;
    state
        .notifier
        .send_chat(lobby_id, sender_id, &sender_name, text)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

/// Relays one lobby's events onto the socket's outgoing queue.
fn forward_events(
    state: &AppState,
    lobby_id: Uuid,
    tx: mpsc::UnboundedSender<ChannelMessage>,
) -> JoinHandle<()> {
    let mut events = state.notifier.subscribe(lobby_id);
    tokio::spawn(async move {
        loop {
            let message = match events.recv().await {
                Ok(LobbyEvent::Move(event)) => ChannelMessage::Move(event),
                Ok(LobbyEvent::Chat(chat)) => ChannelMessage::Chat(chat),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Socket lagged {} event(s) behind on lobby {}", skipped, lobby_id);
                    ChannelMessage::Resync { lobby_id, skipped }
                }
                Err(RecvError::Closed) => break,
            };
            if tx.send(message).is_err() {
                break;
            }
        }
    })
}
