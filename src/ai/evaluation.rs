//! Static position evaluation.
//!
//! Scores are in pawns from the point of view of the color passed in.
//!
//! Components:
//!   1. Material (pawn 1, knight 3, bishop 3, rook 5, queen 9, king 100)
//!   2. Per-piece positional bonus, counted against the owner's opponent
//!   3. Mobility: 0.1 per legal move more than the opponent
//!   4. Check (±0.5) and mate (±100) adjustments
//!
//! Game phase is recomputed from the board on every call.

use crate::engine::board::{Board, Position};
use crate::engine::movegen::legal_moves;
use crate::engine::types::{CastleSide, Color, Piece, PieceType, Square};

/// Infinity sentinel for search windows.
pub const INF: f64 = f64::INFINITY;

/// Base score of a side that has been mated; the search subtracts the
/// remaining depth so quicker mates score further from zero.
pub const MATE: f64 = 1000.0;

const MOBILITY_WEIGHT: f64 = 0.1;
const CHECK_BONUS: f64 = 0.5;
const MATE_BONUS: f64 = 100.0;

/// Is this score a forced-mate score?
#[inline]
pub fn is_mate_score(score: f64) -> bool {
    score.abs() >= MATE
}

// =========================================================================
// Game phase
// =========================================================================

#[derive(Clone, Copy, Debug)]
struct Phase {
    early: bool,
    end: bool,
}

/// Fewer than four of the eight knight/bishop home squares have been vacated.
pub fn is_early_game(board: &Board) -> bool {
    let mut developed = 0;
    for color in Color::BOTH {
        let row = color.home_row();
        for (col, kind) in [
            (1, PieceType::Knight),
            (6, PieceType::Knight),
            (2, PieceType::Bishop),
            (5, PieceType::Bishop),
        ] {
            let still_home = board
                .get(Square::new(row, col))
                .is_some_and(|p| p.kind == kind);
            if !still_home {
                developed += 1;
            }
        }
    }
    developed < 4
}

/// At most six non-king, non-pawn pieces remain, or at most ten with no queens.
pub fn is_end_game(board: &Board) -> bool {
    let officers: Vec<Piece> = board
        .pieces()
        .map(|(_, p)| p)
        .filter(|p| !matches!(p.kind, PieceType::King | PieceType::Pawn))
        .collect();
    let has_queens = officers.iter().any(|p| p.kind == PieceType::Queen);
    officers.len() <= 6 || (officers.len() <= 10 && !has_queens)
}

// =========================================================================
// Evaluation
// =========================================================================

/// Evaluate `pos` for `color`. Positive means `color` is better.
pub fn evaluate(pos: &Position, color: Color) -> f64 {
    let board = pos.board();
    let phase = Phase {
        early: is_early_game(board),
        end: is_end_game(board),
    };

    let mut score = 0.0;
    for (sq, piece) in board.pieces() {
        let worth = piece.kind.value() + position_bonus(board, piece, sq, phase);
        if piece.color == color {
            score += worth;
        } else {
            score -= worth;
        }
    }

    let mine = legal_moves(pos, color).len();
    let theirs = legal_moves(pos, !color).len();
    score += MOBILITY_WEIGHT * (mine as f64 - theirs as f64);

    if pos.in_check(!color) {
        score += CHECK_BONUS;
        if theirs == 0 {
            score += MATE_BONUS;
        }
    }
    if pos.in_check(color) {
        score -= CHECK_BONUS;
        if mine == 0 {
            score -= MATE_BONUS;
        }
    }
    score
}

/// Positional bonus of `piece` on `sq`, from its owner's point of view.
fn position_bonus(board: &Board, piece: Piece, sq: Square, phase: Phase) -> f64 {
    let col = sq.col as f64;
    let rel = piece.color.relative_row(sq.row);
    let adj = rel as f64;
    let centrality = 0.05 * (4.0 - (col - 3.5).abs() - (adj - 3.5).abs());

    match piece.kind {
        PieceType::Pawn => {
            let mut bonus = 0.05 * (7.0 - adj);
            if (sq.col == 3 || sq.col == 4) && rel > 4 {
                bonus += 0.1;
            }
            let doubled = (0..8u8)
                .filter(|&r| r != sq.row)
                .filter(|&r| {
                    board
                        .get(Square::new(r, sq.col))
                        .is_some_and(|p| p.is(PieceType::Pawn, piece.color))
                })
                .count();
            bonus - 0.2 * doubled as f64
        }
        PieceType::Knight => {
            let mut bonus = centrality;
            if rel < 4 {
                bonus += 0.1;
            }
            bonus
        }
        PieceType::Bishop => {
            let open = open_diagonal_squares(board, sq);
            let mut bonus = 0.02 * open as f64;
            if open > 6 {
                bonus += 0.2;
            }
            bonus
        }
        PieceType::Rook => {
            let open_file = (0..8u8).filter(|&r| r != sq.row).all(|r| {
                board
                    .get(Square::new(r, sq.col))
                    .is_none_or(|p| p.kind != PieceType::Pawn)
            });
            let mut bonus = 0.0;
            if open_file {
                bonus += 0.3;
            }
            if rel == 1 {
                bonus += 0.3;
            }
            bonus
        }
        PieceType::Queen => {
            let mut bonus = 0.0;
            let out_early = rel > 5 || ((sq.col == 3 || sq.col == 4) && rel > 4);
            if phase.early && out_early {
                bonus -= 0.3;
            }
            if rel == 1 {
                bonus += 0.2;
            }
            bonus
        }
        PieceType::King => {
            if phase.end {
                return centrality;
            }
            let home = piece.color.home_row();
            // Squares next to the corner rooks, where a castled king shelters.
            let sheltered = [CastleSide::KingSide, CastleSide::QueenSide]
                .into_iter()
                .any(|side| sq.col == shelter_col(side));
            if sq.row == home && sheltered {
                0.5
            } else if sq.row == home && sq.col == 4 {
                -0.3
            } else {
                -0.5
            }
        }
    }
}

fn shelter_col(side: CastleSide) -> u8 {
    match side {
        CastleSide::KingSide => side.rook_col() - 1,
        CastleSide::QueenSide => side.rook_col() + 1,
    }
}

/// Empty squares reachable along the four diagonals.
fn open_diagonal_squares(board: &Board, sq: Square) -> usize {
    let mut open = 0;
    for (dr, dc) in [(-1, -1), (-1, 1), (1, -1), (1, 1)] {
        let mut cur = sq;
        while let Some(next) = cur.offset(dr, dc) {
            if !board.is_empty(next) {
                break;
            }
            open += 1;
            cur = next;
        }
    }
    open
}

// =========================================================================
// Tests
// =========================================================================
