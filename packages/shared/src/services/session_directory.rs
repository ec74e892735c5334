use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::models::game_session::GameSession;
use crate::models::lobby::{BoardMirror, Lobby};
use crate::services::chess_service::RulesEngine;
use crate::services::errors::game_session_service_errors::GameSessionServiceError;
use crate::services::lobby_service::LobbyRegistry;

pub type SessionHandle = Arc<Mutex<GameSession>>;

/// Maps a lobby id to its live session. One lock per session; unrelated games
/// never contend. Sessions are retired once their game ends; the lobby's
/// board mirror keeps the final state.
pub struct SessionDirectory {
    sessions: DashMap<Uuid, SessionHandle>,
    lobbies: Arc<LobbyRegistry>,
    rules: Arc<dyn RulesEngine>,
}

impl SessionDirectory {
    pub fn new(lobbies: Arc<LobbyRegistry>, rules: Arc<dyn RulesEngine>) -> Self {
        SessionDirectory {
            sessions: DashMap::new(),
            lobbies,
            rules,
        }
    }

    /// Starts the game for a full lobby. Returns `Ok(None)` when the lobby is
    /// missing or still has an open seat. Sides are drawn at random.
    pub async fn start_session(
        &self,
        lobby_id: &Uuid,
    ) -> Result<Option<GameSession>, GameSessionServiceError> {
        let Some(slot) = self.lobbies.slot(lobby_id) else {
            return Ok(None);
        };
        let mut guard = slot.lock().await;
        let Some(lobby) = guard.as_mut() else {
            return Ok(None);
        };
        let (Some(seat_a), Some(seat_b)) = (lobby.seat_a.clone(), lobby.seat_b.clone()) else {
            return Ok(None);
        };
        if lobby.in_session || self.sessions.contains_key(lobby_id) {
            return Err(GameSessionServiceError::AlreadyStarted);
        }

        let (white, black) = if rand::random::<bool>() {
            (seat_a, seat_b)
        } else {
            (seat_b, seat_a)
        };
        let session = self.seed(lobby, &white, &black);
        self.sessions
            .insert(*lobby_id, Arc::new(Mutex::new(session.clone())));

        info!(
            "Session {} started for lobby {}: {} (white) vs {} (black)",
            session.session_id, lobby_id, white, black
        );
        Ok(Some(session))
    }

    fn seed(&self, lobby: &mut Lobby, white: &str, black: &str) -> GameSession {
        let starting_position = self.rules.starting_position();
        let session = GameSession::new(
            lobby.id,
            white,
            black,
            &starting_position,
            lobby.time_control,
        );
        lobby.in_session = true;
        lobby.board = BoardMirror {
            position: starting_position,
            white_player_id: Some(white.to_string()),
            black_player_id: Some(black.to_string()),
            ..BoardMirror::new(lobby.time_control.initial_seconds)
        };
        session
    }

    pub fn get_session(&self, lobby_id: &Uuid) -> Option<SessionHandle> {
        self.sessions.get(lobby_id).map(|entry| entry.value().clone())
    }

    /// Copy of the session as of now.
    pub async fn snapshot(&self, lobby_id: &Uuid) -> Option<GameSession> {
        let handle = self.get_session(lobby_id)?;
        let session = handle.lock().await;
        Some(session.clone())
    }

    /// Drops the session for a finished game. Callers still holding its
    /// handle keep a valid, terminal copy.
    pub fn retire(&self, lobby_id: &Uuid) -> bool {
        let retired = self.sessions.remove(lobby_id).is_some();
        if retired {
            info!("Session for lobby {} retired", lobby_id);
        }
        retired
    }

    pub fn contains(&self, lobby_id: &Uuid) -> bool {
        self.sessions.contains_key(lobby_id)
    }

    pub async fn get_lobby(&self, lobby_id: &Uuid) -> Option<Lobby> {
        self.lobbies.get_lobby(lobby_id).await
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
