use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::game_session::{Outcome, Side};
use crate::models::lobby::Lobby;
use crate::models::match_record::MatchRecord;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyResponse {
    pub lobby_id: Uuid,
    pub name: String,
    pub seat_a_occupant_id: Option<String>,
    pub seat_a_occupant_name: Option<String>,
    pub seat_b_occupant_id: Option<String>,
    pub is_public: bool,
    pub is_full: bool,
    pub initial_time_seconds: u32,
    pub increment_seconds: u32,
    pub created_at: DateTime<Utc>,
}

impl LobbyResponse {
    pub fn from_lobby(lobby: &Lobby, seat_a_occupant_name: Option<String>) -> Self {
        LobbyResponse {
            lobby_id: lobby.id,
            name: lobby.name.clone(),
            seat_a_occupant_id: lobby.seat_a.clone(),
            seat_a_occupant_name,
            seat_b_occupant_id: lobby.seat_b.clone(),
            is_public: lobby.is_public,
            is_full: lobby.is_full(),
            initial_time_seconds: lobby.time_control.initial_seconds,
            increment_seconds: lobby.time_control.increment_seconds,
            created_at: lobby.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinLobbyResponse {
    pub success: bool,
    pub lobby_id: Option<Uuid>,
    pub message: String,
    pub session_started: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResponse {
    pub success: bool,
    pub new_position: Option<String>,
    pub is_game_over: bool,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncClockResponse {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateResponse {
    pub position: String,
    pub last_move: Option<String>,
    pub side_to_move: Side,
    pub is_game_over: bool,
    pub result: Option<String>,
    pub white_remaining_seconds: u32,
    pub black_remaining_seconds: u32,
    pub white_player_id: Option<String>,
    pub black_player_id: Option<String>,
    pub white_player_name: String,
    pub black_player_name: String,
    /// Side whose clock has run out by wall-clock reckoning, if any.
    pub flagged_side: Option<Side>,
}

/// Pushed on a lobby's channel after every committed move.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveEvent {
    pub lobby_id: Uuid,
    /// Ply number of the move; strictly increasing per lobby.
    pub sequence: u32,
    pub new_position: String,
    pub last_move: String,
    pub is_game_over: bool,
    pub white_remaining_seconds: u32,
    pub black_remaining_seconds: u32,
}

/// A player's chat line, relayed to everyone watching the lobby.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub lobby_id: Uuid,
    pub sender_id: String,
    pub sender_name: String,
    pub message: String,
    pub sent_at: DateTime<Utc>,
}

/// Everything fanned out on a lobby's channel.
#[derive(Debug, Clone, PartialEq)]
pub enum LobbyEvent {
    Move(MoveEvent),
    Chat(ChatMessage),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecordResponse {
    pub match_id: String,
    pub lobby_id: String,
    pub white_player_id: String,
    pub black_player_id: String,
    pub outcome: Outcome,
    pub result: Option<String>,
    pub moves: Vec<String>,
    pub initial_time_seconds: u32,
    pub increment_seconds: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl From<MatchRecord> for MatchRecordResponse {
    fn from(record: MatchRecord) -> Self {
        MatchRecordResponse {
            result: record.outcome.result_notation().map(str::to_string),
            match_id: record.match_id,
            lobby_id: record.lobby_id,
            white_player_id: record.white_player_id,
            black_player_id: record.black_player_id,
            outcome: record.outcome,
            moves: record.moves,
            initial_time_seconds: record.initial_time_seconds,
            increment_seconds: record.increment_seconds,
            start_time: record.start_time,
            end_time: record.end_time,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
