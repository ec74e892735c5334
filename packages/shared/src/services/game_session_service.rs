use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    models::{
        game_session::{DrawReason, GameSession, MoveRecord, Outcome, Side},
        lobby::BoardMirror,
        match_record::MatchRecord,
        requests::{MakeMoveRequest, SyncClockRequest},
        responses::{GameStateResponse, MoveEvent},
    },
    repositories::match_repository::MatchRepository,
    services::{
        chess_service::{CandidateMove, PositionReport, RulesEngine},
        clock::checked_seconds,
        errors::game_session_service_errors::GameSessionServiceError,
        lobby_service::LobbyRegistry,
        notifier::Notifier,
        rating_service::RatingService,
        session_directory::SessionDirectory,
        user_service::UserService,
    },
};

pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(2);

const UNKNOWN_PLAYER: &str = "Unknown";

/// Result of a committed move.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveResult {
    pub position: String,
    pub last_move: String,
    pub is_game_over: bool,
    pub outcome: Outcome,
}

/// The session engine. Every mutation of a session happens while holding
/// that session's lock, from the rules check through the notification.
#[derive(Clone)]
pub struct GameSessionService {
    directory: Arc<SessionDirectory>,
    lobbies: Arc<LobbyRegistry>,
    rules: Arc<dyn RulesEngine>,
    match_repository: Arc<dyn MatchRepository + Send + Sync>,
    rating_service: Arc<RatingService>,
    user_service: Arc<UserService>,
    notifier: Arc<dyn Notifier>,
    notify_timeout: Duration,
}

impl GameSessionService {
    pub fn new(
        directory: Arc<SessionDirectory>,
        lobbies: Arc<LobbyRegistry>,
        rules: Arc<dyn RulesEngine>,
        match_repository: Arc<dyn MatchRepository + Send + Sync>,
        rating_service: Arc<RatingService>,
        user_service: Arc<UserService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        GameSessionService {
            directory,
            lobbies,
            rules,
            match_repository,
            rating_service,
            user_service,
            notifier,
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
        }
    }

    pub fn with_notify_timeout(mut self, notify_timeout: Duration) -> Self {
        self.notify_timeout = notify_timeout;
        self
    }

    pub async fn submit_move(
        &self,
        user_id: &str,
        request: &MakeMoveRequest,
    ) -> Result<MoveResult, GameSessionServiceError> {
        let Some(handle) = self.directory.get_session(&request.lobby_id) else {
            return Err(self.missing_session_error(&request.lobby_id).await);
        };
        let mut session = handle.lock().await;

        if session.is_terminal() {
            return Err(GameSessionServiceError::GameOver);
        }

        let mover = session.side_to_move();
        if session.side_of(user_id) != Some(mover) {
            debug!(
                "Rejected move from {} in lobby {}: {:?} to move",
                user_id, request.lobby_id, mover
            );
            return Err(GameSessionServiceError::NotYourTurn);
        }

        let candidate = CandidateMove::normalize(
            &request.origin,
            &request.destination,
            request.promotion.as_deref(),
        )?;
        let clocks = reported_clocks(request)?;

        let applied = self
            .rules
            .apply_move(&session.position, &session.prior_positions(), &candidate)
            .map_err(|e| {
                debug!("Rejected move in lobby {}: {}", request.lobby_id, e);
                GameSessionServiceError::from(e)
            })?;

        let now = Utc::now();
        let record = MoveRecord {
            side: mover,
            origin: candidate.origin,
            destination: candidate.destination,
            promotion: candidate.promotion,
            resulting_position: applied.position.clone(),
        };
        let notation = record.notation();
        session.move_history.push(record);
        session.position = applied.position;
        session.clock.credit_increment(mover, now);
        if let Some((white, black)) = clocks {
            session.clock.sync(white, black, now);
        }

        let outcome = decide_outcome(&applied.report);
        if outcome.is_terminal() {
            session.outcome = outcome;
            session.ended_at = Some(now);
            info!(
                "Game in lobby {} finished after {} moves: {:?}",
                session.lobby_id,
                session.move_history.len(),
                outcome
            );
            self.record_finished_game(&session).await;
        } else {
            debug!(
                "Move {} by {} accepted in lobby {}",
                notation, user_id, session.lobby_id
            );
        }

        self.lobbies
            .mirror_board(
                &session.lobby_id,
                BoardMirror {
                    position: session.position.clone(),
                    last_move: Some(notation.clone()),
                    side_to_move: session.side_to_move(),
                    is_game_over: outcome.is_terminal(),
                    result: outcome.result_notation().map(str::to_string),
                    white_player_id: Some(session.white_player_id.clone()),
                    black_player_id: Some(session.black_player_id.clone()),
                    white_remaining_seconds: session.clock.remaining(Side::White),
                    black_remaining_seconds: session.clock.remaining(Side::Black),
                },
            )
            .await;

        let event = MoveEvent {
            lobby_id: session.lobby_id,
            sequence: u32::try_from(session.move_history.len()).unwrap_or(u32::MAX),
            new_position: session.position.clone(),
            last_move: notation.clone(),
            is_game_over: outcome.is_terminal(),
            white_remaining_seconds: session.clock.remaining(Side::White),
            black_remaining_seconds: session.clock.remaining(Side::Black),
        };
        self.publish(&event).await;

        if outcome.is_terminal() {
            self.directory.retire(&session.lobby_id);
        }

        Ok(MoveResult {
            position: session.position.clone(),
            last_move: notation,
            is_game_over: outcome.is_terminal(),
            outcome,
        })
    }

    /// Overwrites both clocks with client-reported values.
    pub async fn sync_clock(
        &self,
        user_id: &str,
        request: &SyncClockRequest,
    ) -> Result<(), GameSessionServiceError> {
        let (white, black) = validate_clocks(
            request.white_remaining_seconds,
            request.black_remaining_seconds,
        )?;
        let Some(handle) = self.directory.get_session(&request.lobby_id) else {
            return Err(self.missing_session_error(&request.lobby_id).await);
        };
        let mut session = handle.lock().await;

        if session.is_terminal() {
            return Err(GameSessionServiceError::GameOver);
        }
        if session.side_of(user_id).is_none() {
            return Err(GameSessionServiceError::NotAPlayer);
        }

        session.clock.sync(white, black, Utc::now());
        debug!(
            "Clock synced in lobby {}: white {}s, black {}s",
            request.lobby_id, white, black
        );
        Ok(())
    }

    /// The session's view when one exists, otherwise the lobby's mirrored
    /// fields. Before a game the seats stand in for the sides; after it the
    /// mirror holds the final board, players and clocks.
    pub async fn game_state(
        &self,
        lobby_id: &Uuid,
    ) -> Result<GameStateResponse, GameSessionServiceError> {
        if let Some(session) = self.directory.snapshot(lobby_id).await {
            return Ok(self.session_view(&session).await);
        }

        let lobby = self
            .directory
            .get_lobby(lobby_id)
            .await
            .ok_or(GameSessionServiceError::NotFound)?;
        let board = lobby.board;
        let white_player_id = board.white_player_id.or(lobby.seat_a);
        let black_player_id = board.black_player_id.or(lobby.seat_b);

        Ok(GameStateResponse {
            position: board.position,
            last_move: board.last_move,
            side_to_move: board.side_to_move,
            is_game_over: board.is_game_over,
            result: board.result,
            white_remaining_seconds: board.white_remaining_seconds,
            black_remaining_seconds: board.black_remaining_seconds,
            white_player_name: self.player_name(white_player_id.as_deref()).await,
            black_player_name: self.player_name(black_player_id.as_deref()).await,
            white_player_id,
            black_player_id,
            flagged_side: None,
        })
    }

    pub async fn match_history(
        &self,
        player_id: &str,
    ) -> Result<Vec<MatchRecord>, GameSessionServiceError> {
        Ok(self
            .match_repository
            .list_matches_for_player(player_id)
            .await?)
    }

    async fn session_view(&self, session: &GameSession) -> GameStateResponse {
        let side_to_move = session.side_to_move();
        let flagged_side = if session.is_terminal() {
            None
        } else {
            session.clock.flagged_side(side_to_move, Utc::now())
        };

        GameStateResponse {
            position: session.position.clone(),
            last_move: session.last_move().map(MoveRecord::notation),
            side_to_move,
            is_game_over: session.is_terminal(),
            result: session.outcome.result_notation().map(str::to_string),
            white_remaining_seconds: session.clock.remaining(Side::White),
            black_remaining_seconds: session.clock.remaining(Side::Black),
            white_player_id: Some(session.white_player_id.clone()),
            black_player_id: Some(session.black_player_id.clone()),
            white_player_name: self.player_name(Some(&session.white_player_id)).await,
            black_player_name: self.player_name(Some(&session.black_player_id)).await,
            flagged_side,
        }
    }

    /// `GameOver` when the lobby's game already finished and its session was
    /// retired, `NotFound` otherwise.
    async fn missing_session_error(&self, lobby_id: &Uuid) -> GameSessionServiceError {
        match self.lobbies.get_lobby(lobby_id).await {
            Some(lobby) if lobby.is_game_finished() => GameSessionServiceError::GameOver,
            _ => GameSessionServiceError::NotFound,
        }
    }

    async fn player_name(&self, user_id: Option<&str>) -> String {
        match user_id {
            Some(user_id) => self.user_service.display_name(user_id).await,
            None => UNKNOWN_PLAYER.to_string(),
        }
    }

    /// Persists the match record and applies the rating change. Failures are
    /// logged; the in-memory session stays authoritative.
    async fn record_finished_game(&self, session: &GameSession) {
        match MatchRecord::from_session(session) {
            Some(record) => {
                if let Err(e) = self.match_repository.save_match(&record).await {
                    error!(
                        "Failed to save match record for lobby {}: {}",
                        session.lobby_id, e
                    );
                }
            }
            None => warn!("Finished game in lobby {} has no end time", session.lobby_id),
        }

        if let Err(e) = self
            .rating_service
            .apply_result(
                &session.white_player_id,
                &session.black_player_id,
                &session.outcome,
            )
            .await
        {
            error!(
                "Failed to update ratings for lobby {}: {}",
                session.lobby_id, e
            );
        }
    }

    async fn publish(&self, event: &MoveEvent) {
        match tokio::time::timeout(self.notify_timeout, self.notifier.notify_move(event)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Failed to notify lobby {}: {}", event.lobby_id, e),
            Err(_) => warn!(
                "Notification for move {} of lobby {} timed out",
                event.sequence, event.lobby_id
            ),
        }
    }
}

/// Remaining times sent along with a move: both or neither.
fn reported_clocks(
    request: &MakeMoveRequest,
) -> Result<Option<(u32, u32)>, GameSessionServiceError> {
    match (
        request.white_remaining_seconds,
        request.black_remaining_seconds,
    ) {
        (Some(white), Some(black)) => validate_clocks(white, black).map(Some),
        (None, None) => Ok(None),
        _ => Err(GameSessionServiceError::ValidationError(
            "White and black remaining times must be reported together".to_string(),
        )),
    }
}

fn validate_clocks(white: i64, black: i64) -> Result<(u32, u32), GameSessionServiceError> {
    match (checked_seconds(white), checked_seconds(black)) {
        (Some(white), Some(black)) => Ok((white, black)),
        _ => Err(GameSessionServiceError::ValidationError(
            "Remaining time must be a non-negative number of seconds".to_string(),
        )),
    }
}

/// First matching condition wins.
fn decide_outcome(report: &PositionReport) -> Outcome {
    match report {
        PositionReport {
            checkmated: Some(Side::White),
            ..
        } => Outcome::BlackWins,
        PositionReport {
            checkmated: Some(Side::Black),
            ..
        } => Outcome::WhiteWins,
        PositionReport {
            stalemated: Some(_),
            ..
        } => Outcome::Draw(DrawReason::Stalemate),
        PositionReport { draw: Some(_), .. } => Outcome::Draw(DrawReason::Generic),
        PositionReport {
            insufficient_material: true,
            ..
        } => Outcome::Draw(DrawReason::InsufficientMaterial),
        _ => Outcome::Pending,
    }
}
