use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::game_session::TimeControl;
use crate::models::lobby::{BoardMirror, JoinOutcome, LeaveOutcome, Lobby};
use crate::models::requests::CreateLobbyRequest;
use crate::models::responses::LobbyResponse;
use crate::services::clock::checked_seconds;
use crate::services::errors::lobby_service_errors::LobbyServiceError;
use crate::services::user_service::UserService;

pub const MAX_LISTED_LOBBIES: usize = 100;

/// A lobby slot. `None` once the lobby has been removed, so a caller that
/// fetched the slot before removal still observes `NotFound` after locking.
pub(crate) type LobbySlot = Arc<Mutex<Option<Lobby>>>;

/// Registry of pre-game rooms. Each lobby has its own lock; join and leave
/// run their check-then-set under it.
pub struct LobbyRegistry {
    lobbies: DashMap<Uuid, LobbySlot>,
    user_service: Arc<UserService>,
}

impl LobbyRegistry {
    pub fn new(user_service: Arc<UserService>) -> Self {
        LobbyRegistry {
            lobbies: DashMap::new(),
            user_service,
        }
    }

    pub(crate) fn slot(&self, lobby_id: &Uuid) -> Option<LobbySlot> {
        self.lobbies.get(lobby_id).map(|entry| entry.value().clone())
    }

    pub async fn create_lobby(
        &self,
        creator_id: &str,
        request: &CreateLobbyRequest,
    ) -> Result<LobbyResponse, LobbyServiceError> {
        let initial_seconds = checked_seconds(request.initial_time_seconds).ok_or_else(|| {
            LobbyServiceError::ValidationError(
                "Initial time must be a non-negative number of seconds".to_string(),
            )
        })?;
        let increment_seconds = checked_seconds(request.increment_seconds).ok_or_else(|| {
            LobbyServiceError::ValidationError(
                "Increment must be a non-negative number of seconds".to_string(),
            )
        })?;

        let creator_name = self.user_service.display_name(creator_id).await;
        let name = match request.name.trim() {
            "" => format!("{}'s Game", creator_name),
            given => given.to_string(),
        };

        let lobby = Lobby::new(
            creator_id,
            name,
            request.is_public,
            request.secret.clone(),
            TimeControl {
                initial_seconds,
                increment_seconds,
            },
        );
        let response = LobbyResponse::from_lobby(&lobby, Some(creator_name));

        info!(
            "Lobby {} created by {} (public: {})",
            lobby.id, creator_id, lobby.is_public
        );
        self.lobbies
            .insert(lobby.id, Arc::new(Mutex::new(Some(lobby))));

        Ok(response)
    }

    /// Lobbies with an open second seat, newest first. Built from a snapshot,
    /// so an entry may already be full by the time the caller sees it.
    pub async fn list_joinable(&self) -> Vec<LobbyResponse> {
        let slots: Vec<LobbySlot> = self
            .lobbies
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        let mut open = Vec::new();
        for slot in slots {
            if let Some(lobby) = slot.lock().await.as_ref() {
                if lobby.seat_b.is_none() && !lobby.in_session {
                    open.push(lobby.clone());
                }
            }
        }
        open.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        open.truncate(MAX_LISTED_LOBBIES);

        let mut summaries = Vec::with_capacity(open.len());
        for lobby in &open {
            let seat_a_name = match lobby.seat_a.as_deref() {
                Some(user_id) => Some(self.user_service.display_name(user_id).await),
                None => None,
            };
            summaries.push(LobbyResponse::from_lobby(lobby, seat_a_name));
        }
        summaries
    }

    pub async fn join(&self, user_id: &str, lobby_id: &Uuid, secret: Option<&str>) -> JoinOutcome {
        let Some(slot) = self.slot(lobby_id) else {
            return JoinOutcome::NotFound;
        };
        let mut guard = slot.lock().await;
        let Some(lobby) = guard.as_mut() else {
            return JoinOutcome::NotFound;
        };

        if !lobby.accepts_secret(secret) {
            debug!("Rejected secret from {} for lobby {}", user_id, lobby_id);
            return JoinOutcome::WrongSecret;
        }
        if lobby.is_member(user_id) {
            return JoinOutcome::AlreadyMember;
        }
        // Seats vacated after a game ended are not reopened.
        if lobby.in_session {
            return JoinOutcome::Full;
        }

        match lobby.occupy(user_id) {
            Some(seat) => {
                info!("User {} joined lobby {} in seat {:?}", user_id, lobby_id, seat);
                JoinOutcome::Joined(seat)
            }
            None => JoinOutcome::Full,
        }
    }

    pub async fn leave(&self, user_id: &str, lobby_id: &Uuid) -> LeaveOutcome {
        let Some(slot) = self.slot(lobby_id) else {
            return LeaveOutcome::NotFound;
        };
        let mut guard = slot.lock().await;
        let Some(lobby) = guard.as_mut() else {
            return LeaveOutcome::NotFound;
        };

        if lobby.is_game_running() {
            debug!(
                "Ignoring leave from {}: lobby {} has a game",
                user_id, lobby_id
            );
            return LeaveOutcome::GameInProgress;
        }
        if !lobby.vacate(user_id) {
            return LeaveOutcome::NotMember;
        }

        if lobby.is_empty() {
            *guard = None;
            self.lobbies
                .remove_if(lobby_id, |_, entry| Arc::ptr_eq(entry, &slot));
            info!("Lobby {} removed after last player left", lobby_id);
            LeaveOutcome::LobbyRemoved
        } else {
            info!("User {} left lobby {}", user_id, lobby_id);
            LeaveOutcome::Left
        }
    }

    pub async fn get_lobby(&self, lobby_id: &Uuid) -> Option<Lobby> {
        let slot = self.slot(lobby_id)?;
        let guard = slot.lock().await;
        guard.clone()
    }

    /// Overwrites the lobby's display copy of the board.
    pub async fn mirror_board(&self, lobby_id: &Uuid, board: BoardMirror) {
        if let Some(slot) = self.slot(lobby_id) {
            if let Some(lobby) = slot.lock().await.as_mut() {
                lobby.board = board;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lobbies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lobbies.is_empty()
    }
}
