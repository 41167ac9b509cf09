//! Move generation.
//!
//! Pipeline:
//!   1. Generate pseudo-legal moves for one square (movement pattern and
//!      blocking only; king steps and castling already avoid attacked squares).
//!   2. Filter: simulate each move on a copy of the board and drop it if the
//!      mover's king ends up attacked.
//!
//! Nothing here mutates the position it is given.

use crate::engine::attacks::{
    BISHOP_DIRECTIONS, KING_OFFSETS, KNIGHT_OFFSETS, ROOK_DIRECTIONS, is_square_attacked,
};
use crate::engine::board::{Board, Position};
use crate::engine::types::{CastleSide, Color, Move, MoveKind, Piece, PieceType, Square};

// =========================================================================
// Public API
// =========================================================================

/// Strictly legal moves of the piece on `from`. Empty if the square is empty.
pub fn legal_moves_from(pos: &Position, from: Square) -> Vec<Move> {
    pseudo_legal_moves(pos, from)
        .into_iter()
        .filter(|mv| keeps_king_safe(pos, *mv))
        .collect()
}

/// Every legal move of `color`, scanning squares row-major.
pub fn legal_moves(pos: &Position, color: Color) -> Vec<Move> {
    pieces_of(pos, color)
        .flat_map(|sq| legal_moves_from(pos, sq))
        .collect()
}

/// Whether `color` has at least one legal move. Stops at the first one found.
pub fn has_legal_move(pos: &Position, color: Color) -> bool {
    pieces_of(pos, color).any(|sq| {
        pseudo_legal_moves(pos, sq)
            .into_iter()
            .any(|mv| keeps_king_safe(pos, mv))
    })
}

/// Candidate moves of the piece on `from` according to its movement rules.
pub fn pseudo_legal_moves(pos: &Position, from: Square) -> Vec<Move> {
    let Some(piece) = pos.board.get(from) else {
        return Vec::new();
    };
    let mut moves = Vec::with_capacity(28);
    match piece.kind {
        PieceType::Pawn => pawn_moves(pos, from, piece.color, &mut moves),
        PieceType::Knight => step_moves(&pos.board, from, piece.color, &KNIGHT_OFFSETS, &mut moves),
        PieceType::Bishop => slide_moves(&pos.board, from, piece.color, &BISHOP_DIRECTIONS, &mut moves),
        PieceType::Rook => slide_moves(&pos.board, from, piece.color, &ROOK_DIRECTIONS, &mut moves),
        PieceType::Queen => {
            slide_moves(&pos.board, from, piece.color, &ROOK_DIRECTIONS, &mut moves);
            slide_moves(&pos.board, from, piece.color, &BISHOP_DIRECTIONS, &mut moves);
        }
        PieceType::King => king_moves(pos, from, piece, &mut moves),
    }
    moves
}

/// Board after playing `mv`, without touching rights or counters.
///
/// Clears the captured pawn for en passant and relocates the rook when
/// castling. Used for legality checks only.
pub fn simulate(board: &Board, mv: Move) -> Board {
    let mut next = *board;
    let piece = next.take(mv.from);
    if mv.kind == MoveKind::EnPassant {
        next.set(Square::new(mv.from.row, mv.to.col), None);
    }
    if let Some(side) = mv.kind.castle_side() {
        let rook_from = Square::new(mv.from.row, side.rook_col());
        let rook = next.take(rook_from);
        next.set(rook_destination(mv.to, side), rook);
    }
    next.set(mv.to, piece);
    next
}

/// Where the rook lands when the king castles to `king_to`.
pub(crate) fn rook_destination(king_to: Square, side: CastleSide) -> Square {
    match side {
        CastleSide::KingSide => Square::new(king_to.row, king_to.col - 1),
        CastleSide::QueenSide => Square::new(king_to.row, king_to.col + 1),
    }
}

// =========================================================================
// Legality filter (internal)
// =========================================================================

fn keeps_king_safe(pos: &Position, mv: Move) -> bool {
    let Some(piece) = pos.board.get(mv.from) else {
        return false;
    };
    let after = simulate(&pos.board, mv);
    let king = if piece.kind == PieceType::King {
        mv.to
    } else {
        pos.king_square(piece.color)
    };
    !is_square_attacked(&after, king, piece.color)
}

fn pieces_of(pos: &Position, color: Color) -> impl Iterator<Item = Square> + '_ {
    pos.board
        .pieces()
        .filter(move |(_, p)| p.color == color)
        .map(|(sq, _)| sq)
}

// =========================================================================
// Per-piece generators (internal)
// =========================================================================

fn pawn_moves(pos: &Position, from: Square, color: Color, moves: &mut Vec<Move>) {
    let board = &pos.board;
    let dir = color.forward();
    let advance_kind = |to: Square, plain: MoveKind| {
        if to.row == color.promotion_row() {
            MoveKind::Promotion
        } else {
            plain
        }
    };

    if let Some(one) = from.offset(dir, 0)
        && board.is_empty(one)
    {
        moves.push(Move::new(from, one, advance_kind(one, MoveKind::Normal)));

        if from.row == color.pawn_row()
            && let Some(two) = one.offset(dir, 0)
            && board.is_empty(two)
        {
            moves.push(Move::new(from, two, MoveKind::DoublePawnPush));
        }
    }

    for dc in [-1, 1] {
        let Some(to) = from.offset(dir, dc) else {
            continue;
        };
        match board.get(to) {
            Some(target) if target.color != color => {
                moves.push(Move::new(from, to, advance_kind(to, MoveKind::Capture)));
            }
            None if pos.en_passant == Some(to) => {
                moves.push(Move::new(from, to, MoveKind::EnPassant));
            }
            _ => {}
        }
    }
}

fn step_moves(board: &Board, from: Square, color: Color, offsets: &[(i8, i8)], moves: &mut Vec<Move>) {
    for &(dr, dc) in offsets {
        let Some(to) = from.offset(dr, dc) else {
            continue;
        };
        match board.get(to) {
            None => moves.push(Move::new(from, to, MoveKind::Normal)),
            Some(p) if p.color != color => moves.push(Move::new(from, to, MoveKind::Capture)),
            Some(_) => {}
        }
    }
}

fn slide_moves(board: &Board, from: Square, color: Color, dirs: &[(i8, i8)], moves: &mut Vec<Move>) {
    for &(dr, dc) in dirs {
        let mut cur = from;
        while let Some(to) = cur.offset(dr, dc) {
            match board.get(to) {
                None => moves.push(Move::new(from, to, MoveKind::Normal)),
                Some(p) => {
                    if p.color != color {
                        moves.push(Move::new(from, to, MoveKind::Capture));
                    }
                    break;
                }
            }
            cur = to;
        }
    }
}

fn king_moves(pos: &Position, from: Square, king: Piece, moves: &mut Vec<Move>) {
    let mut steps = Vec::with_capacity(8);
    step_moves(&pos.board, from, king.color, &KING_OFFSETS, &mut steps);
    moves.extend(
        steps
            .into_iter()
            .filter(|mv| !is_square_attacked(&pos.board, mv.to, king.color)),
    );

    if king.has_moved || is_square_attacked(&pos.board, from, king.color) {
        return;
    }
    for side in [CastleSide::KingSide, CastleSide::QueenSide] {
        if let Some(mv) = castle_move(pos, from, king.color, side) {
            moves.push(mv);
        }
    }
}

/// Castling candidate, assuming the king itself is unmoved and not in check.
fn castle_move(pos: &Position, from: Square, color: Color, side: CastleSide) -> Option<Move> {
    if !pos.castling.has(color, side) {
        return None;
    }
    let rook_sq = Square::new(from.row, side.rook_col());
    let rook = pos.board.get(rook_sq)?;
    if !rook.is(PieceType::Rook, color) || rook.has_moved {
        return None;
    }

    let (lo, hi) = if rook_sq.col < from.col {
        (rook_sq.col + 1, from.col)
    } else {
        (from.col + 1, rook_sq.col)
    };
    if (lo..hi).any(|col| !pos.board.is_empty(Square::new(from.row, col))) {
        return None;
    }

    let step = side.king_step().signum();
    let transit = from.offset(0, step)?;
    let to = from.offset(0, side.king_step())?;
    if is_square_attacked(&pos.board, transit, color) || is_square_attacked(&pos.board, to, color) {
        return None;
    }

    let kind = match side {
        CastleSide::KingSide => MoveKind::CastleKingside,
        CastleSide::QueenSide => MoveKind::CastleQueenside,
    };
    Some(Move::new(from, to, kind))
}

// =========================================================================
// Tests
// =========================================================================
