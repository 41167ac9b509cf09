//! Stateful game controller wrapping Position.
//!
//! `Game` owns the live position, the move records needed for undo and
//! history navigation, and the snapshot the game started from. It is the
//! primary type the API layer interacts with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::board::Position;
use crate::engine::executor::{MoveOutcome, MoveRecord};
use crate::engine::movegen;
use crate::engine::snapshot::PositionSnapshot;
use crate::engine::status::GameState;
use crate::engine::types::{ChessError, GameStatus, Move, Piece, PieceType, Square};

// =========================================================================
// SavedGame
// =========================================================================

/// Persisted form of a game: where it started and what was played.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGame {
    pub initial: PositionSnapshot,
    pub moves: Vec<MoveRecord>,
}

// =========================================================================
// Game
// =========================================================================

/// A chess game with history, undo and promotion handling.
#[derive(Clone, Debug)]
pub struct Game {
    position: Position,
    initial: PositionSnapshot,
    records: Vec<MoveRecord>,

    // Metadata
    pub id: String,
    pub created_at: DateTime<Utc>,
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// Create a new game from the standard starting position.
    pub fn new() -> Self {
        Self::from_position(Position::starting())
    }

    /// Start a game from an arbitrary, already validated position.
    pub fn from_position(position: Position) -> Self {
        Self {
            initial: position.to_snapshot(),
            position,
            records: Vec::new(),
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
        }
    }

    /// Start a game from an exported position.
    pub fn from_snapshot(snap: &PositionSnapshot) -> Result<Self, ChessError> {
        Ok(Self::from_position(Position::from_snapshot(snap)?))
    }

    /// Rebuild a saved game by replaying every recorded move.
    pub fn from_saved(saved: &SavedGame) -> Result<Self, ChessError> {
        let mut game = Self::from_snapshot(&saved.initial)?;
        game.replay(&saved.moves)?;
        Ok(game)
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    /// Current board position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Flags for the side to move.
    pub fn state(&self) -> GameState {
        self.position.game_state()
    }

    pub fn status(&self) -> GameStatus {
        self.state().status()
    }

    /// Legal moves of the piece on `sq`. Empty while a promotion is pending.
    pub fn legal_moves_from(&self, sq: Square) -> Vec<Move> {
        if self.position.pending_promotion().is_some() || !sq.is_valid() {
            return Vec::new();
        }
        movegen::legal_moves_from(&self.position, sq)
    }

    /// All legal moves for the side to move.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.position.pending_promotion().is_some() {
            return Vec::new();
        }
        movegen::legal_moves(&self.position, self.position.side_to_move())
    }

    /// Every executed move, oldest first.
    pub fn export_history(&self) -> &[MoveRecord] {
        &self.records
    }

    pub fn export_position(&self) -> PositionSnapshot {
        self.position.to_snapshot()
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.records.last()
    }

    /// Captured pieces in the order they were taken.
    pub fn captured_pieces(&self) -> Vec<Piece> {
        self.records.iter().filter_map(|r| r.captured).collect()
    }

    pub fn to_saved(&self) -> SavedGame {
        SavedGame {
            initial: self.initial.clone(),
            moves: self.records.clone(),
        }
    }

    // -----------------------------------------------------------------
    // Moves
    // -----------------------------------------------------------------

    /// Move the piece on `from` to `to`.
    pub fn attempt_move(&mut self, from: Square, to: Square) -> Result<MoveOutcome, ChessError> {
        let outcome = self.position.apply_move(from, to)?;
        self.records.push(outcome.record.clone());
        Ok(outcome)
    }

    /// Finish a pending promotion on `square`.
    ///
    /// A promotion that was pending in an imported position has no move
    /// record behind it. Completing it makes the promoted position the new
    /// starting point of the game.
    pub fn promote(&mut self, square: Square, kind: PieceType) -> Result<MoveOutcome, ChessError> {
        if let Some(record) = self.records.last_mut() {
            let state = self.position.complete_promotion(square, kind, record)?;
            return Ok(MoveOutcome {
                record: record.clone(),
                promotion_pending: false,
                state: Some(state),
            });
        }
        let (record, state) = self.position.complete_imported_promotion(square, kind)?;
        self.initial = self.position.to_snapshot();
        tracing::debug!(game = %self.id, square = %square, "imported promotion completed");
        Ok(MoveOutcome {
            record,
            promotion_pending: false,
            state: Some(state),
        })
    }

    /// Take back the last move, including a half-finished promotion.
    pub fn undo(&mut self) -> Result<MoveRecord, ChessError> {
        let record = self.records.pop().ok_or(ChessError::NothingToUndo)?;
        self.position.undo_move(&record);
        tracing::debug!(from = %record.from, to = %record.to, "move undone");
        Ok(record)
    }

    // -----------------------------------------------------------------
    // Load / replay
    // -----------------------------------------------------------------

    /// Replace the position, discarding history. Nothing changes on error.
    pub fn import_position(&mut self, snap: &PositionSnapshot) -> Result<(), ChessError> {
        let position = Position::from_snapshot(snap).inspect_err(|e| {
            tracing::warn!(error = %e, "rejected position import");
        })?;
        self.initial = snap.clone();
        self.position = position;
        self.records.clear();
        tracing::debug!(game = %self.id, "position imported");
        Ok(())
    }

    /// Rewind to the state after the first `plies` moves, dropping the rest.
    pub fn replay_to(&mut self, plies: usize) -> Result<(), ChessError> {
        let plies = plies.min(self.records.len());
        let moves: Vec<MoveRecord> = self.records[..plies].to_vec();
        let mut rebuilt = Self::from_snapshot(&self.initial)?;
        rebuilt.replay(&moves)?;
        self.position = rebuilt.position;
        self.records = rebuilt.records;
        tracing::debug!(game = %self.id, plies, "replayed");
        Ok(())
    }

    fn replay(&mut self, moves: &[MoveRecord]) -> Result<(), ChessError> {
        for (index, record) in moves.iter().enumerate() {
            let wrap = |e: ChessError| ChessError::InvalidHistory {
                index,
                source: Box::new(e),
            };
            self.attempt_move(record.from, record.to).map_err(wrap)?;
            if let Some(kind) = record.promotion {
                self.promote(record.to, kind).map_err(wrap)?;
            }
        }
        Ok(())
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::snapshot::PositionBuilder;
    use crate::engine::types::{Color, DrawReason};

    fn sq(name: &str) -> Square {
        let bytes = name.as_bytes();
        Square::new(b'8' - bytes[1], bytes[0] - b'a')
    }

    fn play(game: &mut Game, from: &str, to: &str) -> MoveOutcome {
        game.attempt_move(sq(from), sq(to))
            .unwrap_or_else(|e| panic!("{from}{to} rejected: {e}"))
    }

    // -----------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------

    #[test]
    fn new_game_is_active() {
        let g = Game::new();
        assert_eq!(g.status(), GameStatus::Active);
        assert_eq!(g.position().side_to_move(), Color::White);
        assert_eq!(g.legal_moves().len(), 20);
        assert!(g.export_history().is_empty());
        assert!(g.last_move().is_none());
    }

    // -----------------------------------------------------------------
    // Moves and undo
    // -----------------------------------------------------------------

    #[test]
    fn attempt_move_records_history() {
        let mut g = Game::new();
        play(&mut g, "e2", "e4");
        assert_eq!(g.export_history().len(), 1);
        assert_eq!(g.last_move().map(|r| r.to), Some(sq("e4")));
    }

    #[test]
    fn rejected_move_leaves_history_alone() {
        let mut g = Game::new();
        assert!(g.attempt_move(sq("e2"), sq("e5")).is_err());
        assert!(g.export_history().is_empty());
    }

    #[test]
    fn undo_nothing_errors() {
        let mut g = Game::new();
        assert_eq!(g.undo().unwrap_err(), ChessError::NothingToUndo);
    }

    #[test]
    fn undo_returns_to_start() {
        let mut g = Game::new();
        let start = g.export_position();
        play(&mut g, "e2", "e4");
        play(&mut g, "e7", "e5");
        g.undo().unwrap();
        g.undo().unwrap();
        assert_eq!(g.export_position(), start);
        assert_eq!(g.position().position_history().len(), 1);
    }

    #[test]
    fn fools_mate() {
        let mut g = Game::new();
        play(&mut g, "f2", "f3");
        play(&mut g, "e7", "e5");
        play(&mut g, "g2", "g4");
        let out = play(&mut g, "d8", "h4");
        assert!(out.record.checkmate);
        assert_eq!(g.status(), GameStatus::Checkmate);
        assert!(g.legal_moves().is_empty());
    }

    #[test]
    fn captured_pieces_follow_undo() {
        let mut g = Game::new();
        for (from, to) in [("e2", "e4"), ("d7", "d5"), ("e4", "d5"), ("d8", "d5")] {
            play(&mut g, from, to);
        }
        let captured = g.captured_pieces();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0].color, Color::Black);
        assert_eq!(captured[1].color, Color::White);
        g.undo().unwrap();
        assert_eq!(g.captured_pieces().len(), 1);
    }

    // -----------------------------------------------------------------
    // Promotion
    // -----------------------------------------------------------------

    fn promotion_game() -> Game {
        Game::from_position(
            PositionBuilder::new()
                .diagram([
                    "....k...", "P.......", "........", "........", "........", "........",
                    "........", "....K...",
                ])
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn promotion_flow() {
        let mut g = promotion_game();
        let out = play(&mut g, "a7", "a8");
        assert!(out.promotion_pending);
        assert!(g.legal_moves_from(sq("e1")).is_empty());
        assert_eq!(
            g.attempt_move(sq("e1"), sq("e2")).unwrap_err(),
            ChessError::PendingPromotionRequired(sq("a8"))
        );

        let out = g.promote(sq("a8"), PieceType::Queen).unwrap();
        assert!(!out.promotion_pending);
        assert!(out.record.check);
        assert_eq!(g.last_move().and_then(|r| r.promotion), Some(PieceType::Queen));
        assert_eq!(g.position().side_to_move(), Color::Black);
        assert_eq!(g.status(), GameStatus::Check);
    }

    #[test]
    fn promote_without_pending_fails() {
        let mut g = Game::new();
        assert_eq!(
            g.promote(sq("a8"), PieceType::Queen).unwrap_err(),
            ChessError::NoPendingPromotion(sq("a8"))
        );
        play(&mut g, "e2", "e4");
        assert!(g.promote(sq("e4"), PieceType::Queen).is_err());
    }

    #[test]
    fn undo_pending_promotion() {
        let mut g = promotion_game();
        let start = g.export_position();
        play(&mut g, "a7", "a8");
        g.undo().unwrap();
        assert_eq!(g.export_position(), start);
        assert!(g.position().pending_promotion().is_none());
    }

    #[test]
    fn promotion_pending_in_import_can_be_completed() {
        let mut g = promotion_game();
        play(&mut g, "a7", "a8");
        let mid = g.export_position();
        assert_eq!(mid.pending_promotion, Some(sq("a8")));

        let mut loaded = Game::from_snapshot(&mid).unwrap();
        assert!(loaded.legal_moves().is_empty());
        let out = loaded.promote(sq("a8"), PieceType::Rook).unwrap();
        assert_eq!(out.record.promotion, Some(PieceType::Rook));
        assert!(out.record.check);
        assert_eq!(loaded.status(), GameStatus::Check);

        g.promote(sq("a8"), PieceType::Rook).unwrap();
        assert_eq!(loaded.export_position(), g.export_position());

        play(&mut loaded, "e8", "e7");
        assert_eq!(loaded.export_history().len(), 1);
        let saved = loaded.to_saved();
        let reloaded = Game::from_saved(&saved).unwrap();
        assert_eq!(reloaded.export_position(), loaded.export_position());

        loaded.undo().unwrap();
        assert_eq!(loaded.undo().unwrap_err(), ChessError::NothingToUndo);
        assert_eq!(loaded.position().piece_at(sq("a8")).map(|p| p.kind), Some(PieceType::Rook));
    }

    #[test]
    fn import_of_pending_promotion_into_running_game() {
        let mut g = promotion_game();
        play(&mut g, "a7", "a8");
        let mid = g.export_position();

        let mut other = Game::new();
        play(&mut other, "e2", "e4");
        other.import_position(&mid).unwrap();
        assert!(other.promote(sq("b8"), PieceType::Queen).is_err());
        assert_eq!(
            other.attempt_move(sq("e1"), sq("e2")).unwrap_err(),
            ChessError::PendingPromotionRequired(sq("a8"))
        );
        other.promote(sq("a8"), PieceType::Queen).unwrap();
        assert_eq!(other.position().side_to_move(), Color::Black);
        assert!(!other.legal_moves().is_empty());

        other.replay_to(0).unwrap();
        assert_eq!(other.position().pending_promotion(), None);
        assert_eq!(other.position().piece_at(sq("a8")).map(|p| p.kind), Some(PieceType::Queen));
    }

    // -----------------------------------------------------------------
    // Import, replay, save/load
    // -----------------------------------------------------------------

    #[test]
    fn import_rejects_without_touching_game() {
        let mut g = Game::new();
        play(&mut g, "e2", "e4");
        let before = g.export_position();
        let mut bad = before.clone();
        bad.board[0][4] = None;
        assert!(g.import_position(&bad).is_err());
        assert_eq!(g.export_position(), before);
        assert_eq!(g.export_history().len(), 1);
    }

    #[test]
    fn import_resets_history() {
        let mut g = Game::new();
        play(&mut g, "e2", "e4");
        let snap = g.export_position();
        let mut other = Game::new();
        other.import_position(&snap).unwrap();
        assert_eq!(other.export_position(), snap);
        assert!(other.export_history().is_empty());
        assert_eq!(other.position().fingerprint(), g.position().fingerprint());
        assert_eq!(other.position().en_passant_target(), Some(sq("e3")));
    }

    #[test]
    fn replay_to_earlier_ply() {
        let mut g = Game::new();
        for (from, to) in [("e2", "e4"), ("e7", "e5"), ("g1", "f3"), ("b8", "c6")] {
            play(&mut g, from, to);
        }
        let mut reference = Game::new();
        play(&mut reference, "e2", "e4");
        play(&mut reference, "e7", "e5");

        g.replay_to(2).unwrap();
        assert_eq!(g.export_history().len(), 2);
        assert_eq!(g.export_position(), reference.export_position());

        g.replay_to(10).unwrap();
        assert_eq!(g.export_history().len(), 2);

        g.replay_to(0).unwrap();
        assert_eq!(g.export_position(), Game::new().export_position());
    }

    #[test]
    fn save_and_load_round_trip() {
        let mut g = promotion_game();
        play(&mut g, "a7", "a8");
        g.promote(sq("a8"), PieceType::Rook).unwrap();
        play(&mut g, "e8", "e7");

        let json = serde_json::to_string(&g.to_saved()).unwrap();
        let saved: SavedGame = serde_json::from_str(&json).unwrap();
        let loaded = Game::from_saved(&saved).unwrap();
        assert_eq!(loaded.export_position(), g.export_position());
        assert_eq!(loaded.export_history(), g.export_history());
        assert_eq!(
            loaded.position().position_history(),
            g.position().position_history()
        );
    }

    #[test]
    fn load_rejects_bad_history() {
        let mut g = Game::new();
        play(&mut g, "e2", "e4");
        let mut saved = g.to_saved();
        saved.moves[0].to = sq("e5");
        let err = Game::from_saved(&saved).unwrap_err();
        assert_eq!(err.code(), "INVALID_HISTORY");
    }

    // -----------------------------------------------------------------
    // Draws
    // -----------------------------------------------------------------

    #[test]
    fn knight_shuffle_repeats() {
        let mut g = Game::new();
        let shuffle = [("g1", "f3"), ("g8", "f6"), ("f3", "g1"), ("f6", "g8")];
        for (from, to) in shuffle {
            play(&mut g, from, to);
        }
        assert_ne!(g.status(), GameStatus::Draw(DrawReason::ThreefoldRepetition));
        for (from, to) in shuffle {
            play(&mut g, from, to);
        }
        assert_eq!(g.status(), GameStatus::Draw(DrawReason::ThreefoldRepetition));
    }
}
