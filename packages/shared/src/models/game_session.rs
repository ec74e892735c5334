use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::clock::Clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawReason {
    Stalemate,
    /// Threefold repetition or the 50-move rule.
    Generic,
    InsufficientMaterial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    Pending,
    WhiteWins,
    BlackWins,
    Draw(DrawReason),
    Aborted,
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Pending)
    }

    /// Score notation shown to spectators, `None` while nothing has been decided.
    pub fn result_notation(&self) -> Option<&'static str> {
        match self {
            Outcome::WhiteWins => Some("1-0"),
            Outcome::BlackWins => Some("0-1"),
            Outcome::Draw(_) => Some("1/2-1/2"),
            Outcome::Pending | Outcome::Aborted => None,
        }
    }

    pub fn winner(&self) -> Option<Side> {
        match self {
            Outcome::WhiteWins => Some(Side::White),
            Outcome::BlackWins => Some(Side::Black),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeControl {
    pub initial_seconds: u32,
    pub increment_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    pub side: Side,
    pub origin: String,
    pub destination: String,
    pub promotion: Option<char>,
    pub resulting_position: String,
}

impl MoveRecord {
    /// `e2-e4`, or `e7-e8q` for a promotion.
    pub fn notation(&self) -> String {
        match self.promotion {
            Some(piece) => format!("{}-{}{}", self.origin, self.destination, piece),
            None => format!("{}-{}", self.origin, self.destination),
        }
    }
}

/// Authoritative state of one started lobby.
///
/// Only the session engine mutates a `GameSession`, and only while holding the
/// session's lock in the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub session_id: String,
    pub lobby_id: Uuid,
    pub white_player_id: String,
    pub black_player_id: String,
    pub starting_position: String,
    pub position: String,
    pub move_history: Vec<MoveRecord>,
    pub outcome: Outcome,
    pub time_control: TimeControl,
    pub clock: Clock,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl GameSession {
    pub fn new(
        lobby_id: Uuid,
        white_player_id: &str,
        black_player_id: &str,
        starting_position: &str,
        time_control: TimeControl,
    ) -> Self {
        let started_at = Utc::now();
        GameSession {
            session_id: Uuid::new_v4().to_string(),
            lobby_id,
            white_player_id: white_player_id.to_string(),
            black_player_id: black_player_id.to_string(),
            starting_position: starting_position.to_string(),
            position: starting_position.to_string(),
            move_history: vec![],
            outcome: Outcome::Pending,
            time_control,
            clock: Clock::new(time_control, started_at),
            started_at,
            ended_at: None,
        }
    }

    /// Even history length means white is to move.
    pub fn side_to_move(&self) -> Side {
        if self.move_history.len() % 2 == 0 {
            Side::White
        } else {
            Side::Black
        }
    }

    pub fn side_of(&self, user_id: &str) -> Option<Side> {
        if self.white_player_id == user_id {
            Some(Side::White)
        } else if self.black_player_id == user_id {
            Some(Side::Black)
        } else {
            None
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome.is_terminal()
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.move_history.last()
    }

    /// Positions reached before the current one, oldest first.
    pub fn prior_positions(&self) -> Vec<String> {
        let mut positions = Vec::with_capacity(self.move_history.len() + 1);
        positions.push(self.starting_position.clone());
        positions.extend(
            self.move_history
                .iter()
                .map(|record| record.resulting_position.clone()),
        );
        positions.pop();
        positions
    }

    pub fn move_notations(&self) -> Vec<String> {
        self.move_history.iter().map(MoveRecord::notation).collect()
    }
}
