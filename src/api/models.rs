use serde::{Deserialize, Serialize};

use crate::engine::executor::{MoveOutcome, MoveRecord};
use crate::engine::game::Game;
use crate::engine::snapshot::PositionSnapshot;
use crate::engine::status::GameState;
use crate::engine::types::{Color, Move, Piece, PieceType, Square};

// ---------------------------------------------------------------------------
// Request models
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    /// Start from this position instead of the standard one.
    pub position: Option<PositionSnapshot>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub from: Square,
    pub to: Square,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionRequest {
    pub square: Square,
    pub piece: PieceType,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintRequest {
    pub depth: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayRequest {
    pub plies: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalMovesQuery {
    pub row: Option<u8>,
    pub col: Option<u8>,
}

// ---------------------------------------------------------------------------
// Response models
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub language: String,
    pub engine: String,
    pub uptime: u64,
    pub games: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    pub id: String,
    #[serde(flatten)]
    pub position: PositionSnapshot,
    pub status: String,
    pub current_player: Color,
    pub state: GameState,
    pub move_count: usize,
    pub captured_pieces: CapturedPieces,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_move: Option<MoveRecord>,
    pub created_at: String,
}

/// Captured pieces grouped by the color that lost them.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedPieces {
    pub white: Vec<Piece>,
    pub black: Vec<Piece>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResponse {
    #[serde(rename = "move")]
    pub record: MoveRecord,
    pub captured: Option<Piece>,
    pub promotion_pending: bool,
    pub game: GameResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalMovesResponse {
    pub moves: Vec<Move>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub moves: Vec<MoveRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HintResponse {
    pub hint: Option<Move>,
    pub evaluation: Option<f64>,
    pub depth: u32,
    pub nodes_searched: u64,
    pub thinking_time: u64,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn game_to_response(game: &Game) -> GameResponse {
    let mut captured = CapturedPieces::default();
    for piece in game.captured_pieces() {
        match piece.color {
            Color::White => captured.white.push(piece),
            Color::Black => captured.black.push(piece),
        }
    }

    GameResponse {
        id: game.id.clone(),
        position: game.export_position(),
        status: game.status().as_str().to_string(),
        current_player: game.position().side_to_move(),
        state: game.state(),
        move_count: game.export_history().len(),
        captured_pieces: captured,
        last_move: game.last_move().cloned(),
        created_at: game.created_at.to_rfc3339(),
    }
}

pub fn move_to_response(outcome: MoveOutcome, game: &Game) -> MoveResponse {
    MoveResponse {
        captured: outcome.captured(),
        promotion_pending: outcome.promotion_pending,
        record: outcome.record,
        game: game_to_response(game),
    }
}
