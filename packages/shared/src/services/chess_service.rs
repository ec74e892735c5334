use chess::{Board, BoardStatus, ChessMove, Color, MoveGen, Piece, Square};
use std::str::FromStr;

use crate::{
    models::game_session::Side,
    services::errors::chess_service_errors::ChessServiceError,
};

pub const STARTING_POSITION: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

const FIFTY_MOVE_HALFMOVES: u32 = 100;
const REPETITION_LIMIT: usize = 3;

/// A move as submitted by a client, after notation has been normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateMove {
    pub origin: String,
    pub destination: String,
    pub promotion: Option<char>,
}

impl CandidateMove {
    /// Accepts `e2`/`e4`, a combined `e2e4` origin, a `e8q` destination or an
    /// explicit promotion. An explicit promotion wins over an embedded one.
    pub fn normalize(
        origin: &str,
        destination: &str,
        promotion: Option<&str>,
    ) -> Result<Self, ChessServiceError> {
        let origin = origin.trim().to_ascii_lowercase();
        let destination = destination.trim().to_ascii_lowercase();

        if !origin.is_ascii() || !destination.is_ascii() {
            return Err(ChessServiceError::InvalidNotation(format!(
                "{} {}",
                origin, destination
            )));
        }

        let (origin, destination, embedded) = if origin.len() == 4 || origin.len() == 5 {
            (
                origin[0..2].to_string(),
                origin[2..4].to_string(),
                origin.chars().nth(4),
            )
        } else if destination.len() == 3 {
            (origin, destination[0..2].to_string(), destination.chars().nth(2))
        } else {
            (origin, destination, None)
        };

        let explicit = promotion
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .and_then(|p| p.chars().next())
            .map(|c| c.to_ascii_lowercase());
        let promotion = explicit.or(embedded);

        if !is_square(&origin) {
            return Err(ChessServiceError::InvalidNotation(format!(
                "Invalid origin square '{}'",
                origin
            )));
        }
        if !is_square(&destination) {
            return Err(ChessServiceError::InvalidNotation(format!(
                "Invalid destination square '{}'",
                destination
            )));
        }
        if let Some(piece) = promotion {
            if !matches!(piece, 'q' | 'r' | 'b' | 'n') {
                return Err(ChessServiceError::InvalidNotation(format!(
                    "Invalid promotion piece '{}'",
                    piece
                )));
            }
        }

        Ok(CandidateMove {
            origin,
            destination,
            promotion,
        })
    }
}

fn is_square(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() == 2 && (b'a'..=b'h').contains(&bytes[0]) && (b'1'..=b'8').contains(&bytes[1])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawClaim {
    Repetition,
    FiftyMoveRule,
}

/// Terminal conditions holding in a position. Several may be reported at once;
/// the session engine decides which one becomes the outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionReport {
    pub checkmated: Option<Side>,
    pub stalemated: Option<Side>,
    pub draw: Option<DrawClaim>,
    pub insufficient_material: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    pub position: String,
    pub report: PositionReport,
}

/// Narrow interface onto the board-game rules.
pub trait RulesEngine: Send + Sync {
    fn starting_position(&self) -> String;

    /// Validates `candidate` against `position` and returns the resulting
    /// position. `prior_positions` are the positions reached earlier in the
    /// game, used for repetition detection.
    fn apply_move(
        &self,
        position: &str,
        prior_positions: &[String],
        candidate: &CandidateMove,
    ) -> Result<AppliedMove, ChessServiceError>;
}

#[derive(Clone, Default)]
pub struct ChessService;

impl ChessService {
    pub fn new() -> Self {
        ChessService
    }
}

impl RulesEngine for ChessService {
    fn starting_position(&self) -> String {
        STARTING_POSITION.to_string()
    }

    fn apply_move(
        &self,
        position: &str,
        prior_positions: &[String],
        candidate: &CandidateMove,
    ) -> Result<AppliedMove, ChessServiceError> {
        let board = parse_board(position)?;

        if board.status() != BoardStatus::Ongoing {
            return Err(ChessServiceError::IllegalMove(
                "Game is already over".to_string(),
            ));
        }

        let from_sq = Square::from_str(&candidate.origin).map_err(|_| {
            ChessServiceError::InvalidNotation(format!("Invalid from square {}", candidate.origin))
        })?;
        let to_sq = Square::from_str(&candidate.destination).map_err(|_| {
            ChessServiceError::InvalidNotation(format!(
                "Invalid to square {}",
                candidate.destination
            ))
        })?;

        let promotion = match candidate.promotion {
            Some('q') => Some(Piece::Queen),
            Some('r') => Some(Piece::Rook),
            Some('b') => Some(Piece::Bishop),
            Some('n') => Some(Piece::Knight),
            Some(other) => {
                return Err(ChessServiceError::InvalidNotation(format!(
                    "Invalid promotion piece {}",
                    other
                )))
            }
            None => None,
        };

        let chess_move = ChessMove::new(from_sq, to_sq, promotion);
        if !MoveGen::new_legal(&board).any(|m| m == chess_move) {
            return Err(ChessServiceError::IllegalMove(format!(
                "{}{} is not legal in this position",
                candidate.origin, candidate.destination
            )));
        }

        let (halfmove, fullmove) = move_counters(position);
        let resets_halfmove =
            board.piece_on(from_sq) == Some(Piece::Pawn) || board.piece_on(to_sq).is_some();
        let halfmove = if resets_halfmove { 0 } else { halfmove + 1 };
        let fullmove = if board.side_to_move() == Color::Black {
            fullmove + 1
        } else {
            fullmove
        };

        let new_board = board.make_move_new(chess_move);
        let new_position = with_counters(&new_board, halfmove, fullmove);

        let mut report = PositionReport::default();
        let to_move = side_from_color(new_board.side_to_move());
        match new_board.status() {
            BoardStatus::Checkmate => report.checkmated = Some(to_move),
            BoardStatus::Stalemate => report.stalemated = Some(to_move),
            BoardStatus::Ongoing => {}
        }

        let key = repetition_key(&new_position);
        let occurrences = 1 + prior_positions
            .iter()
            .chain(std::iter::once(&position.to_string()))
            .filter(|p| repetition_key(p) == key)
            .count();
        if occurrences >= REPETITION_LIMIT {
            report.draw = Some(DrawClaim::Repetition);
        } else if halfmove >= FIFTY_MOVE_HALFMOVES {
            report.draw = Some(DrawClaim::FiftyMoveRule);
        }

        report.insufficient_material = has_insufficient_material(&new_board);

        Ok(AppliedMove {
            position: new_position,
            report,
        })
    }
}

fn parse_board(position: &str) -> Result<Board, ChessServiceError> {
    Board::from_str(position)
        .map_err(|e| ChessServiceError::InvalidPosition(format!("Invalid FEN: {}", e)))
}

fn side_from_color(color: Color) -> Side {
    match color {
        Color::White => Side::White,
        Color::Black => Side::Black,
    }
}

/// Half-move clock and full-move number of a FEN, defaulting to `0 1`.
fn move_counters(position: &str) -> (u32, u32) {
    let mut fields = position.split_whitespace().skip(4);
    let halfmove = fields.next().and_then(|f| f.parse().ok()).unwrap_or(0);
    let fullmove = fields.next().and_then(|f| f.parse().ok()).unwrap_or(1);
    (halfmove, fullmove)
}

/// The `chess` crate always prints `0 1`; replace them with the real counters.
fn with_counters(board: &Board, halfmove: u32, fullmove: u32) -> String {
    let fen = board.to_string();
    let head: Vec<&str> = fen.split_whitespace().take(4).collect();
    format!("{} {} {}", head.join(" "), halfmove, fullmove)
}

/// Placement, side to move, castling rights and en passant square.
fn repetition_key(position: &str) -> String {
    position
        .split_whitespace()
        .take(4)
        .collect::<Vec<_>>()
        .join(" ")
}

fn has_insufficient_material(board: &Board) -> bool {
    let count = |piece: Piece| board.pieces(piece).popcnt();

    if count(Piece::Pawn) + count(Piece::Rook) + count(Piece::Queen) > 0 {
        return false;
    }

    let knights = count(Piece::Knight);
    let bishops = count(Piece::Bishop);

    match knights + bishops {
        0 | 1 => true,
        _ if knights == 0 => {
            // Bishops all on one square colour cannot force mate.
            let mut shades = (*board.pieces(Piece::Bishop))
                .map(|sq| (sq.get_rank().to_index() + sq.get_file().to_index()) % 2);
            match shades.next() {
                Some(first) => shades.all(|shade| shade == first),
                None => true,
            }
        }
        _ => false,
    }
}
