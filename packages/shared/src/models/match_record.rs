use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::game_session::{GameSession, Outcome};

/// Durable, write-once record of a finished game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_id: String,
    pub lobby_id: String,
    pub white_player_id: String,
    pub black_player_id: String,
    pub outcome: Outcome,
    pub moves: Vec<String>,
    pub initial_time_seconds: u32,
    pub increment_seconds: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl MatchRecord {
    /// Returns `None` while the session has no end time.
    pub fn from_session(session: &GameSession) -> Option<Self> {
        let end_time = session.ended_at?;
        Some(MatchRecord {
            match_id: Uuid::new_v4().to_string(),
            lobby_id: session.lobby_id.to_string(),
            white_player_id: session.white_player_id.clone(),
            black_player_id: session.black_player_id.clone(),
            outcome: session.outcome,
            moves: session.move_notations(),
            initial_time_seconds: session.time_control.initial_seconds,
            increment_seconds: session.time_control.increment_seconds,
            start_time: session.started_at,
            end_time,
        })
    }

    pub fn involves(&self, player_id: &str) -> bool {
        self.white_player_id == player_id || self.black_player_id == player_id
    }
}
