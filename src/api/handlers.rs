use std::time::Instant;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use crate::ai::MinimaxAi;
use crate::engine::game::{Game, SavedGame};
use crate::engine::snapshot::PositionSnapshot;
use crate::engine::types::{Move, Square};

use super::errors::ApiError;
use super::models::*;
use super::state::SharedState;

// =========================================================================
// Health
// =========================================================================

/// GET /health
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let uptime = state.start_time.elapsed().as_secs();
    let games = state.games.read().await.len();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        language: "rust".to_string(),
        engine: "web-chess".to_string(),
        uptime,
        games,
    })
}

// =========================================================================
// Create / Get / Delete
// =========================================================================

/// POST /api/games
pub async fn create_game(
    State(state): State<SharedState>,
    Json(input): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameResponse>), ApiError> {
    let game = match input.position {
        Some(ref snap) => Game::from_snapshot(snap)?,
        None => Game::new(),
    };

    let response = game_to_response(&game);
    tracing::info!(game = %game.id, "game created");
    state.games.write().await.insert(game.id.clone(), game);

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/games/:id
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, ApiError> {
    let games = state.games.read().await;
    let game = games
        .get(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;
    Ok(Json(game_to_response(game)))
}

/// DELETE /api/games/:id
pub async fn delete_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let mut games = state.games.write().await;
    games
        .remove(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;
    Ok(Json(DeleteResponse {
        success: true,
        message: "Game deleted".to_string(),
    }))
}

// =========================================================================
// Moves
// =========================================================================

/// POST /api/games/:id/moves
pub async fn make_move(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(input): Json<MoveRequest>,
) -> Result<Json<MoveResponse>, ApiError> {
    let from = valid_square(input.from)?;
    let to = valid_square(input.to)?;

    let mut games = state.games.write().await;
    let game = games
        .get_mut(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;

    let outcome = game.attempt_move(from, to)?;
    Ok(Json(move_to_response(outcome, game)))
}

/// POST /api/games/:id/promotion
pub async fn promote(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(input): Json<PromotionRequest>,
) -> Result<Json<MoveResponse>, ApiError> {
    let square = valid_square(input.square)?;

    let mut games = state.games.write().await;
    let game = games
        .get_mut(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;

    let outcome = game.promote(square, input.piece)?;
    Ok(Json(move_to_response(outcome, game)))
}

/// POST /api/games/:id/undo
pub async fn undo_move(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, ApiError> {
    let mut games = state.games.write().await;
    let game = games
        .get_mut(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;

    game.undo()?;
    Ok(Json(game_to_response(game)))
}

/// GET /api/games/:id/legal-moves?row=&col=
///
/// Without a square, lists every legal move of the side to move.
pub async fn legal_moves(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<LegalMovesQuery>,
) -> Result<Json<LegalMovesResponse>, ApiError> {
    let games = state.games.read().await;
    let game = games
        .get(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;

    let moves: Vec<Move> = match (query.row, query.col) {
        (Some(row), Some(col)) => game.legal_moves_from(valid_square(Square { row, col })?),
        (None, None) => game.legal_moves(),
        _ => {
            return Err(ApiError::InvalidRequest(
                "row and col must be given together".into(),
            ));
        }
    };

    Ok(Json(LegalMovesResponse { moves }))
}

// =========================================================================
// Hint
// =========================================================================

/// POST /api/games/:id/hint
pub async fn hint(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(input): Json<HintRequest>,
) -> Result<Json<HintResponse>, ApiError> {
    let position = {
        let games = state.games.read().await;
        let game = games
            .get(&id)
            .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;
        game.position().clone()
    };
    let depth = state.config.search_depth(input.depth);

    // Run the search on a blocking thread to avoid starving the async runtime.
    let (best, stats, thinking_time) = tokio::task::spawn_blocking(move || {
        let engine = MinimaxAi::new(depth);
        let start = Instant::now();
        let (best, stats) = engine.search(&position, position.side_to_move());
        (best, stats, start.elapsed().as_millis() as u64)
    })
    .await
    .map_err(|e| ApiError::InternalError(format!("Hint task panicked: {e}")))?;

    tracing::debug!(
        game = %id,
        depth = stats.depth,
        nodes = stats.nodes,
        thinking_time,
        "hint computed"
    );

    Ok(Json(HintResponse {
        hint: best,
        evaluation: best.map(|_| stats.score),
        depth: stats.depth,
        nodes_searched: stats.nodes,
        thinking_time,
    }))
}

// =========================================================================
// Position / History
// =========================================================================

/// GET /api/games/:id/position
pub async fn export_position(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<PositionSnapshot>, ApiError> {
    let games = state.games.read().await;
    let game = games
        .get(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;
    Ok(Json(game.export_position()))
}

/// PUT /api/games/:id/position
pub async fn import_position(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(input): Json<PositionSnapshot>,
) -> Result<Json<GameResponse>, ApiError> {
    let mut games = state.games.write().await;
    let game = games
        .get_mut(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;

    game.import_position(&input)?;
    Ok(Json(game_to_response(game)))
}

/// GET /api/games/:id/history
pub async fn history(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let games = state.games.read().await;
    let game = games
        .get(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;
    Ok(Json(HistoryResponse {
        moves: game.export_history().to_vec(),
    }))
}

/// POST /api/games/:id/replay
pub async fn replay(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(input): Json<ReplayRequest>,
) -> Result<Json<GameResponse>, ApiError> {
    let mut games = state.games.write().await;
    let game = games
        .get_mut(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;

    game.replay_to(input.plies)?;
    Ok(Json(game_to_response(game)))
}

// =========================================================================
// Save / Load
// =========================================================================

/// GET /api/games/:id/save
pub async fn save_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SavedGame>, ApiError> {
    let games = state.games.read().await;
    let game = games
        .get(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;
    Ok(Json(game.to_saved()))
}

/// POST /api/games/load
pub async fn load_game(
    State(state): State<SharedState>,
    Json(input): Json<SavedGame>,
) -> Result<(StatusCode, Json<GameResponse>), ApiError> {
    let game = Game::from_saved(&input).inspect_err(|e| {
        tracing::warn!(error = %e, "rejected saved game");
    })?;

    let response = game_to_response(&game);
    tracing::info!(game = %game.id, moves = input.moves.len(), "game loaded");
    state.games.write().await.insert(game.id.clone(), game);

    Ok((StatusCode::CREATED, Json(response)))
}

// =========================================================================
// Helpers
// =========================================================================

fn valid_square(sq: Square) -> Result<Square, ApiError> {
    if sq.is_valid() {
        Ok(sq)
    } else {
        Err(ApiError::InvalidRequest(format!(
            "invalid square: row {} col {}",
            sq.row, sq.col
        )))
    }
}

// =========================================================================
// Tests
// =========================================================================
