//! Check, mate, stalemate and draw classification.

use serde::Serialize;

use crate::engine::attacks::is_square_attacked;
use crate::engine::board::{Board, Position};
use crate::engine::movegen;
use crate::engine::types::{Color, DrawReason, GameStatus, PieceType};

// =========================================================================
// GameState
// =========================================================================

/// Terminal-state flags for the side to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub side_to_move: Color,
    pub is_check: bool,
    pub is_checkmate: bool,
    pub is_stalemate: bool,
    pub is_draw_by_repetition: bool,
    pub is_draw_by_insufficient_material: bool,
    pub is_draw_by_fifty_move_rule: bool,
}

impl GameState {
    /// Collapse the flags into one status. Mate and stalemate win over draws.
    pub fn status(&self) -> GameStatus {
        if self.is_checkmate {
            GameStatus::Checkmate
        } else if self.is_stalemate {
            GameStatus::Stalemate
        } else if self.is_draw_by_fifty_move_rule {
            GameStatus::Draw(DrawReason::FiftyMoveRule)
        } else if self.is_draw_by_repetition {
            GameStatus::Draw(DrawReason::ThreefoldRepetition)
        } else if self.is_draw_by_insufficient_material {
            GameStatus::Draw(DrawReason::InsufficientMaterial)
        } else if self.is_check {
            GameStatus::Check
        } else {
            GameStatus::Active
        }
    }

    pub fn is_draw(&self) -> bool {
        self.is_draw_by_repetition
            || self.is_draw_by_insufficient_material
            || self.is_draw_by_fifty_move_rule
    }

    pub fn is_game_over(&self) -> bool {
        self.is_checkmate || self.is_stalemate || self.is_draw()
    }
}

// =========================================================================
// Position queries
// =========================================================================

impl Position {
    /// Whether `color`'s king is attacked.
    pub fn in_check(&self, color: Color) -> bool {
        is_square_attacked(&self.board, self.king_square(color), color)
    }

    pub fn has_no_legal_moves(&self, color: Color) -> bool {
        !movegen::has_legal_move(self, color)
    }

    pub fn is_checkmate(&self, color: Color) -> bool {
        self.in_check(color) && self.has_no_legal_moves(color)
    }

    pub fn is_stalemate(&self, color: Color) -> bool {
        !self.in_check(color) && self.has_no_legal_moves(color)
    }

    /// The current fingerprint occurs at least three times in the history.
    pub fn is_draw_by_repetition(&self) -> bool {
        let current = self.fingerprint();
        self.history.iter().filter(|f| **f == current).count() >= 3
    }

    pub fn is_draw_by_insufficient_material(&self) -> bool {
        is_insufficient_material(&self.board)
    }

    pub fn is_draw_by_fifty_move_rule(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Whether any draw condition holds, ignoring mate and stalemate.
    pub fn is_draw(&self) -> bool {
        self.is_draw_by_fifty_move_rule()
            || self.is_draw_by_repetition()
            || self.is_draw_by_insufficient_material()
    }

    /// All flags for the side to move.
    pub fn game_state(&self) -> GameState {
        let side = self.side_to_move;
        let in_check = self.in_check(side);
        let stuck = self.has_no_legal_moves(side);
        GameState {
            side_to_move: side,
            is_check: in_check,
            is_checkmate: in_check && stuck,
            is_stalemate: !in_check && stuck,
            is_draw_by_repetition: self.is_draw_by_repetition(),
            is_draw_by_insufficient_material: self.is_draw_by_insufficient_material(),
            is_draw_by_fifty_move_rule: self.is_draw_by_fifty_move_rule(),
        }
    }
}

/// Automatic draws by material: bare kings, a single knight or bishop
/// against a bare king, or two knights of one side against a bare king.
/// King and bishop against king and bishop is deliberately not included.
pub fn is_insufficient_material(board: &Board) -> bool {
    let extras: Vec<_> = board
        .pieces()
        .map(|(_, p)| p)
        .filter(|p| p.kind != PieceType::King)
        .collect();
    match extras.as_slice() {
        [] => true,
        [only] => matches!(only.kind, PieceType::Bishop | PieceType::Knight),
        [a, b] => a.kind == PieceType::Knight && b.kind == PieceType::Knight && a.color == b.color,
        _ => false,
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::snapshot::PositionBuilder;

    fn diagram(rows: [&str; 8], side: Color) -> Position {
        PositionBuilder::new()
            .diagram(rows)
            .side_to_move(side)
            .build()
            .unwrap()
    }

    #[test]
    fn starting_position_is_active() {
        let state = Position::starting().game_state();
        assert_eq!(state.status(), GameStatus::Active);
        assert!(!state.is_game_over());
    }

    #[test]
    fn back_rank_mate() {
        let pos = diagram(
            [
                "R.....k.", ".....ppp", "........", "........", "........", "........", "........",
                "......K.",
            ],
            Color::Black,
        );
        assert!(pos.in_check(Color::Black));
        assert!(pos.is_checkmate(Color::Black));
        assert!(!pos.is_stalemate(Color::Black));
        assert_eq!(pos.game_state().status(), GameStatus::Checkmate);
    }

    #[test]
    fn queen_stalemate() {
        // Black king a8, white king c7, white queen b6.
        let pos = diagram(
            [
                "k.......", "..K.....", ".Q......", "........", "........", "........", "........",
                "........",
            ],
            Color::Black,
        );
        assert!(!pos.in_check(Color::Black));
        assert!(pos.has_no_legal_moves(Color::Black));
        assert!(pos.is_stalemate(Color::Black));
        assert_eq!(pos.game_state().status(), GameStatus::Stalemate);
    }

    #[test]
    fn check_but_not_mate() {
        let pos = diagram(
            [
                "....k...", "........", "........", "........", "........", "........", "........",
                "....R..K",
            ],
            Color::Black,
        );
        let state = pos.game_state();
        assert!(state.is_check);
        assert!(!state.is_checkmate);
        assert_eq!(state.status(), GameStatus::Check);
    }

    // --- Insufficient material ---

    fn material(rows: [&str; 8]) -> bool {
        diagram(rows, Color::Black).is_draw_by_insufficient_material()
    }

    #[test]
    fn bare_kings() {
        assert!(material([
            "k.......", "........", "........", "........", "........", "........", "........",
            ".......K",
        ]));
    }

    #[test]
    fn single_minor_piece() {
        assert!(material([
            "k.......", "........", "........", "...B....", "........", "........", "........",
            ".......K",
        ]));
        assert!(material([
            "k.......", "........", "........", "...n....", "........", "........", "........",
            ".......K",
        ]));
    }

    #[test]
    fn two_knights_one_side() {
        assert!(material([
            "k.......", "........", "........", "...NN...", "........", "........", "........",
            ".......K",
        ]));
        assert!(!material([
            "k.......", "........", "........", "...Nn...", "........", "........", "........",
            ".......K",
        ]));
    }

    #[test]
    fn bishop_each_is_not_automatic() {
        assert!(!material([
            "k.......", "........", "........", "...Bb...", "........", "........", "........",
            ".......K",
        ]));
    }

    #[test]
    fn single_pawn_rook_or_queen_is_sufficient() {
        for piece in ["P", "R", "Q"] {
            let row = format!("...{piece}....");
            let rows = [
                "k.......", "........", "........", row.as_str(), "........", "........",
                "........", ".......K",
            ];
            assert!(!material(rows), "{piece} should be sufficient");
        }
    }

    // --- Fifty-move rule ---

    #[test]
    fn fifty_move_threshold() {
        let rows = [
            "k.......", "........", "........", "...R....", "........", "........", "........",
            ".......K",
        ];
        let at = |clock| {
            PositionBuilder::new()
                .diagram(rows)
                .halfmove_clock(clock)
                .build()
                .unwrap()
        };
        assert!(!at(99).is_draw_by_fifty_move_rule());
        assert!(at(100).is_draw_by_fifty_move_rule());
        assert_eq!(
            at(100).game_state().status(),
            GameStatus::Draw(DrawReason::FiftyMoveRule)
        );
    }
}
