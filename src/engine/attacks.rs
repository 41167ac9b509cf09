//! Attack detection over an arbitrary board.
//!
//! Works on a bare `Board` rather than a `Position` so the legality filter
//! can ask about hypothetical boards produced by simulating a move.

use crate::engine::board::Board;
use crate::engine::types::{Color, PieceType, Square};

// =========================================================================
// Offset tables
// =========================================================================

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

pub const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

// =========================================================================
// Public API
// =========================================================================

/// Whether any piece of `defender`'s opponent attacks `sq` on `board`.
pub fn is_square_attacked(board: &Board, sq: Square, defender: Color) -> bool {
    let attacker = !defender;

    // A pawn of `attacker` hits the two squares diagonally ahead of it, so
    // look one step *behind* `sq` from the attacker's point of view.
    let back = -attacker.forward();
    for dc in [-1, 1] {
        if let Some(from) = sq.offset(back, dc)
            && board.get(from).is_some_and(|p| p.is(PieceType::Pawn, attacker))
        {
            return true;
        }
    }

    if hits_any(board, sq, &KNIGHT_OFFSETS, PieceType::Knight, attacker) {
        return true;
    }
    if hits_any(board, sq, &KING_OFFSETS, PieceType::King, attacker) {
        return true;
    }

    ray_hits(board, sq, &ROOK_DIRECTIONS, PieceType::Rook, attacker)
        || ray_hits(board, sq, &BISHOP_DIRECTIONS, PieceType::Bishop, attacker)
}

// =========================================================================
// Helpers
// =========================================================================

/// Leaper check: any of `offsets` from `sq` holds `kind` of `attacker`.
fn hits_any(board: &Board, sq: Square, offsets: &[(i8, i8)], kind: PieceType, attacker: Color) -> bool {
    offsets.iter().any(|&(dr, dc)| {
        sq.offset(dr, dc)
            .and_then(|s| board.get(s))
            .is_some_and(|p| p.is(kind, attacker))
    })
}

/// Slider check: walking each direction, the first occupant is `kind` or a
/// queen of `attacker`.
fn ray_hits(board: &Board, sq: Square, dirs: &[(i8, i8)], kind: PieceType, attacker: Color) -> bool {
    for &(dr, dc) in dirs {
        let mut cur = sq;
        while let Some(next) = cur.offset(dr, dc) {
            if let Some(p) = board.get(next) {
                if p.color == attacker && (p.kind == kind || p.kind == PieceType::Queen) {
                    return true;
                }
                break;
            }
            cur = next;
        }
    }
    false
}

// =========================================================================
// Tests
// =========================================================================
