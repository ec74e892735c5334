use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::game_session::{Side, TimeControl};
use crate::services::chess_service::STARTING_POSITION;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seat {
    A,
    B,
}

/// Display copy of the board kept on the lobby for spectators. Outlives
/// the session, so it also carries who played which side and the clocks
/// as of the last move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardMirror {
    pub position: String,
    pub last_move: Option<String>,
    pub side_to_move: Side,
    pub is_game_over: bool,
    pub result: Option<String>,
    pub white_player_id: Option<String>,
    pub black_player_id: Option<String>,
    pub white_remaining_seconds: u32,
    pub black_remaining_seconds: u32,
}

impl BoardMirror {
    /// Starting position with both clocks full and no players assigned.
    pub fn new(initial_seconds: u32) -> Self {
        BoardMirror {
            position: STARTING_POSITION.to_string(),
            last_move: None,
            side_to_move: Side::White,
            is_game_over: false,
            result: None,
            white_player_id: None,
            black_player_id: None,
            white_remaining_seconds: initial_seconds,
            black_remaining_seconds: initial_seconds,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lobby {
    pub id: Uuid,
    pub name: String,
    pub is_public: bool,
    /// Only set on private lobbies. Never leaves the registry.
    #[serde(skip_serializing)]
    pub secret: Option<String>,
    pub seat_a: Option<String>,
    pub seat_b: Option<String>,
    pub time_control: TimeControl,
    pub created_at: DateTime<Utc>,
    pub board: BoardMirror,
    /// Set once a session has been started for this lobby; seats are frozen from then on.
    #[serde(default)]
    pub in_session: bool,
}

impl Lobby {
    pub fn new(
        creator_id: &str,
        name: String,
        is_public: bool,
        secret: Option<String>,
        time_control: TimeControl,
    ) -> Self {
        Lobby {
            id: Uuid::new_v4(),
            name,
            is_public,
            secret: if is_public { None } else { secret },
            seat_a: Some(creator_id.to_string()),
            seat_b: None,
            created_at: Utc::now(),
            board: BoardMirror::new(time_control.initial_seconds),
            time_control,
            in_session: false,
        }
    }

    pub fn is_member(&self, user_id: &str) -> bool {
        self.seat_a.as_deref() == Some(user_id) || self.seat_b.as_deref() == Some(user_id)
    }

    pub fn is_full(&self) -> bool {
        self.seat_a.is_some() && self.seat_b.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.seat_a.is_none() && self.seat_b.is_none()
    }

    /// A session was started and has not reached a result yet.
    pub fn is_game_running(&self) -> bool {
        self.in_session && !self.board.is_game_over
    }

    /// A session was started here and its game is over.
    pub fn is_game_finished(&self) -> bool {
        self.in_session && self.board.is_game_over
    }

    /// Private lobbies accept only an exact, non-empty match.
    pub fn accepts_secret(&self, supplied: Option<&str>) -> bool {
        if self.is_public {
            return true;
        }
        match (self.secret.as_deref(), supplied) {
            (Some(expected), Some(given)) => !given.is_empty() && expected == given,
            _ => false,
        }
    }

    /// Seats the user in the first free seat, A before B.
    pub fn occupy(&mut self, user_id: &str) -> Option<Seat> {
        if self.seat_a.is_none() {
            self.seat_a = Some(user_id.to_string());
            Some(Seat::A)
        } else if self.seat_b.is_none() {
            self.seat_b = Some(user_id.to_string());
            Some(Seat::B)
        } else {
            None
        }
    }

    /// Clears every seat held by the user; returns whether anything changed.
    pub fn vacate(&mut self, user_id: &str) -> bool {
        let mut vacated = false;
        if self.seat_a.as_deref() == Some(user_id) {
            self.seat_a = None;
            vacated = true;
        }
        if self.seat_b.as_deref() == Some(user_id) {
            self.seat_b = None;
            vacated = true;
        }
        vacated
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined(Seat),
    AlreadyMember,
    WrongSecret,
    Full,
    NotFound,
}

impl JoinOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JoinOutcome::Joined(_) | JoinOutcome::AlreadyMember)
    }

    pub fn message(&self) -> &'static str {
        match self {
            JoinOutcome::Joined(_) => "Joined lobby",
            JoinOutcome::AlreadyMember => "Already in this lobby",
            JoinOutcome::WrongSecret => "Wrong or missing lobby password",
            JoinOutcome::Full => "Lobby is full",
            JoinOutcome::NotFound => "Lobby not found",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    Left,
    LobbyRemoved,
    NotMember,
    NotFound,
    /// A game is running; seats are frozen until it ends.
    GameInProgress,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn time_control() -> TimeControl {
        TimeControl {
            initial_seconds: 300,
            increment_seconds: 3,
        }
    }

    #[test]
    fn test_public_lobby_drops_secret() {
        let lobby = Lobby::new(
            "u1",
            "Open".to_string(),
            true,
            Some("ignored".to_string()),
            time_control(),
        );

        assert!(lobby.secret.is_none());
        assert_eq!(lobby.seat_a.as_deref(), Some("u1"));
        assert!(lobby.seat_b.is_none());
        assert_eq!(lobby.board, BoardMirror::new(300));
        assert_eq!(lobby.board.position, STARTING_POSITION);
    }

    #[test]
    fn test_game_running_until_board_reports_result() {
        let mut lobby = Lobby::new("u1", "L".to_string(), true, None, time_control());
        assert!(!lobby.is_game_running());
        assert!(!lobby.is_game_finished());

        lobby.in_session = true;
        assert!(lobby.is_game_running());

        lobby.board.is_game_over = true;
        assert!(!lobby.is_game_running());
        assert!(lobby.is_game_finished());
    }

    #[test_case(Some("p@ss"), true ; "exact match")]
    #[test_case(Some("P@SS"), false ; "case differs")]
    #[test_case(Some(""), false ; "empty")]
    #[test_case(None, false ; "missing")]
    fn test_private_lobby_secret_check(supplied: Option<&str>, expected: bool) {
        let lobby = Lobby::new(
            "u1",
            "Private".to_string(),
            false,
            Some("p@ss".to_string()),
            time_control(),
        );

        assert_eq!(lobby.accepts_secret(supplied), expected);
    }

    #[test]
    fn test_private_lobby_without_secret_rejects_everyone() {
        let lobby = Lobby::new("u1", "Locked".to_string(), false, None, time_control());

        assert!(!lobby.accepts_secret(Some("")));
        assert!(!lobby.accepts_secret(Some("anything")));
    }

    #[test]
    fn test_occupy_prefers_seat_a_then_b() {
        let mut lobby = Lobby::new("u1", "L".to_string(), true, None, time_control());
        lobby.vacate("u1");

        assert_eq!(lobby.occupy("u2"), Some(Seat::A));
        assert_eq!(lobby.occupy("u3"), Some(Seat::B));
        assert_eq!(lobby.occupy("u4"), None);
        assert!(lobby.is_full());
    }

    #[test]
    fn test_secret_is_not_serialized() {
        let lobby = Lobby::new(
            "u1",
            "Private".to_string(),
            false,
            Some("p@ss".to_string()),
            time_control(),
        );

        let serialized = serde_json::to_string(&lobby).unwrap();
        assert!(!serialized.contains("p@ss"));
    }
}
