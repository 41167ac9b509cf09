//! Move execution.
//!
//! [`Position::apply_move`] is the only way to change a live position and it
//! re-derives the legal move set itself, so callers cannot slip an illegal
//! move through. A pawn reaching the last rank leaves the move half-finished
//! until [`Position::complete_promotion`] supplies the new piece. Every move
//! produces a [`MoveRecord`] holding enough prior state for an exact undo.

use serde::{Deserialize, Serialize};

use crate::engine::board::Position;
use crate::engine::movegen::{self, rook_destination};
use crate::engine::status::GameState;
use crate::engine::types::{
    CastleSide, CastlingRights, ChessError, Color, Move, MoveKind, Piece, PieceType, SideRights,
    Square,
};

// =========================================================================
// MoveRecord
// =========================================================================

/// Counters and rights as they were before a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorState {
    pub castling_rights: CastlingRights,
    pub en_passant_target: Option<Square>,
    pub half_move_clock: u32,
    pub full_move_number: u32,
}

/// History entry for one executed move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    /// The moving piece as it stood on `from`, including its `has_moved` flag.
    pub piece: Piece,
    pub from: Square,
    pub to: Square,
    pub kind: MoveKind,
    pub captured: Option<Piece>,
    pub en_passant: bool,
    pub castle: Option<CastleSide>,
    /// Filled in when the promotion is completed.
    pub promotion: Option<PieceType>,
    /// Whether the opponent was left in check.
    pub check: bool,
    pub checkmate: bool,
    pub prior: PriorState,
}

impl MoveRecord {
    pub fn as_move(&self) -> Move {
        Move::new(self.from, self.to, self.kind)
    }

    /// A pawn reached the last rank and is still waiting for its new piece.
    pub fn is_pending_promotion(&self) -> bool {
        self.kind == MoveKind::Promotion && self.promotion.is_none()
    }
}

/// Result of a successful move or promotion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveOutcome {
    pub record: MoveRecord,
    pub promotion_pending: bool,
    /// Flags for the side now to move. `None` while a promotion is pending.
    pub state: Option<GameState>,
}

impl MoveOutcome {
    pub fn captured(&self) -> Option<Piece> {
        self.record.captured
    }
}

// =========================================================================
// Execution
// =========================================================================

impl Position {
    /// Play the piece on `from` to `to`.
    ///
    /// Fails without touching the position if a promotion is pending, the
    /// source is empty or belongs to the other side, or `to` is not among the
    /// piece's legal destinations.
    pub fn apply_move(&mut self, from: Square, to: Square) -> Result<MoveOutcome, ChessError> {
        if let Some(sq) = self.pending_promotion {
            return Err(ChessError::PendingPromotionRequired(sq));
        }
        if !from.is_valid() {
            return Err(ChessError::NoPieceAtSource(from));
        }
        let piece = self
            .board
            .get(from)
            .ok_or(ChessError::NoPieceAtSource(from))?;
        if piece.color != self.side_to_move {
            return Err(ChessError::WrongSideToMove(self.side_to_move));
        }
        let mv = movegen::legal_moves_from(self, from)
            .into_iter()
            .find(|m| m.to == to)
            .ok_or(ChessError::IllegalDestination { from, to })?;

        let prior = PriorState {
            castling_rights: self.castling,
            en_passant_target: self.en_passant,
            half_move_clock: self.halfmove_clock,
            full_move_number: self.fullmove_number,
        };

        let captured = match mv.kind {
            MoveKind::EnPassant => self.board.take(Square::new(from.row, to.col)),
            _ => self.board.take(to),
        };

        let castle = mv.kind.castle_side();
        if let Some(side) = castle {
            let rook_from = Square::new(from.row, side.rook_col());
            if let Some(rook) = self.board.take(rook_from) {
                self.board.set(
                    rook_destination(to, side),
                    Some(Piece {
                        has_moved: true,
                        ..rook
                    }),
                );
            }
        }

        self.en_passant = match mv.kind {
            MoveKind::DoublePawnPush => Some(Square::new((from.row + to.row) / 2, from.col)),
            _ => None,
        };

        self.board.set(from, None);
        self.board.set(
            to,
            Some(Piece {
                has_moved: true,
                ..piece
            }),
        );
        if piece.kind == PieceType::King {
            self.king_squares[piece.color.index()] = to;
        }
        self.revoke_castling(piece, from, captured, to);

        let mut record = MoveRecord {
            piece,
            from,
            to,
            kind: mv.kind,
            captured,
            en_passant: mv.kind == MoveKind::EnPassant,
            castle,
            promotion: None,
            check: false,
            checkmate: false,
            prior,
        };

        if mv.kind == MoveKind::Promotion {
            self.pending_promotion = Some(to);
            return Ok(MoveOutcome {
                record,
                promotion_pending: true,
                state: None,
            });
        }

        let state = self.finish_move(&mut record);
        Ok(MoveOutcome {
            record,
            promotion_pending: false,
            state: Some(state),
        })
    }

    /// Replace the pawn waiting on `square` with `kind` and finish the move
    /// described by `record`, which is updated in place.
    pub fn complete_promotion(
        &mut self,
        square: Square,
        kind: PieceType,
        record: &mut MoveRecord,
    ) -> Result<GameState, ChessError> {
        if self.pending_promotion != Some(square)
            || record.to != square
            || !record.is_pending_promotion()
        {
            return Err(ChessError::NoPendingPromotion(square));
        }
        if !kind.is_promotion_choice() {
            return Err(ChessError::InvalidPromotionPiece(kind));
        }
        self.board
            .set(square, Some(Piece::moved(kind, record.piece.color)));
        record.promotion = Some(kind);
        Ok(self.finish_move(record))
    }

    /// Finish a promotion that was already pending when the position was
    /// imported. The pawn's origin is unknown, so the returned record starts
    /// and ends on `square` and is not undoable.
    pub fn complete_imported_promotion(
        &mut self,
        square: Square,
        kind: PieceType,
    ) -> Result<(MoveRecord, GameState), ChessError> {
        let pawn = self
            .board
            .get(square)
            .filter(|_| self.pending_promotion == Some(square))
            .ok_or(ChessError::NoPendingPromotion(square))?;
        let mut record = MoveRecord {
            piece: pawn,
            from: square,
            to: square,
            kind: MoveKind::Promotion,
            captured: None,
            en_passant: false,
            castle: None,
            promotion: None,
            check: false,
            checkmate: false,
            prior: PriorState {
                castling_rights: self.castling,
                en_passant_target: self.en_passant,
                half_move_clock: self.halfmove_clock,
                full_move_number: self.fullmove_number,
            },
        };
        let state = self.complete_promotion(square, kind, &mut record)?;
        Ok((record, state))
    }

    /// Reverse `record`, which must be the most recent move on this position.
    pub fn undo_move(&mut self, record: &MoveRecord) {
        // A pending promotion never pushed a fingerprint.
        if self.pending_promotion.take().is_none() {
            self.history.pop();
        }

        self.board.set(record.to, None);
        self.board.set(record.from, Some(record.piece));
        if let Some(captured) = record.captured {
            let at = if record.en_passant {
                Square::new(record.from.row, record.to.col)
            } else {
                record.to
            };
            self.board.set(at, Some(captured));
        }
        if let Some(side) = record.castle
            && let Some(rook) = self.board.take(rook_destination(record.to, side))
        {
            self.board.set(
                Square::new(record.from.row, side.rook_col()),
                Some(Piece {
                    has_moved: false,
                    ..rook
                }),
            );
        }
        if record.piece.kind == PieceType::King {
            self.king_squares[record.piece.color.index()] = record.from;
        }

        self.side_to_move = record.piece.color;
        self.castling = record.prior.castling_rights;
        self.en_passant = record.prior.en_passant_target;
        self.halfmove_clock = record.prior.half_move_clock;
        self.fullmove_number = record.prior.full_move_number;
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    /// Counters, side switch, history and flags for a completed move.
    fn finish_move(&mut self, record: &mut MoveRecord) -> GameState {
        let mover = record.piece.color;
        self.halfmove_clock = if record.piece.kind == PieceType::Pawn || record.captured.is_some() {
            0
        } else {
            record.prior.half_move_clock + 1
        };
        if mover == Color::Black {
            self.fullmove_number = record.prior.full_move_number + 1;
        }
        self.side_to_move = !mover;
        self.pending_promotion = None;
        self.history.push(self.fingerprint());

        let state = self.game_state();
        record.check = state.is_check;
        record.checkmate = state.is_checkmate;
        state
    }

    fn revoke_castling(&mut self, piece: Piece, from: Square, captured: Option<Piece>, to: Square) {
        let home = piece.color.home_row();
        match piece.kind {
            PieceType::King => *self.castling.of_mut(piece.color) = SideRights::default(),
            PieceType::Rook => {
                for side in [CastleSide::KingSide, CastleSide::QueenSide] {
                    if from == Square::new(home, side.rook_col()) {
                        self.castling.of_mut(piece.color).revoke(side);
                    }
                }
            }
            _ => {}
        }

        if let Some(victim) = captured
            && victim.kind == PieceType::Rook
        {
            let victim_home = victim.color.home_row();
            for side in [CastleSide::KingSide, CastleSide::QueenSide] {
                if to == Square::new(victim_home, side.rook_col()) {
                    self.castling.of_mut(victim.color).revoke(side);
                }
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
