//! AI engine: trait definition and MinimaxAi.
//!
//! The `AiEngine` trait defines the interface for move suggestion.
//! `MinimaxAi` runs a fixed-depth negamax search with alpha-beta pruning.
//! Each node works on its own clone of the position and moves are searched
//! in generation order, so results are fully deterministic.

use serde::Serialize;

use crate::engine::board::Position;
use crate::engine::movegen::legal_moves;
use crate::engine::types::{Color, Move, PieceType};

use super::evaluation::{INF, MATE, evaluate};

// =========================================================================
// AiEngine trait
// =========================================================================

/// The AI engine interface.
pub trait AiEngine: Send + Sync {
    /// Suggest a move for `color`, or `None` when it has nothing to play.
    fn best_move(&self, pos: &Position, color: Color) -> Option<Move>;

    /// Human-readable name for this engine.
    fn name(&self) -> &str;
}

// =========================================================================
// MinimaxAi
// =========================================================================

/// Search statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SearchStats {
    pub nodes: u64,
    pub depth: u32,
    /// Score of the chosen move from the searching side's point of view.
    pub score: f64,
}

/// Fixed-depth negamax with alpha-beta pruning.
#[derive(Clone, Copy, Debug)]
pub struct MinimaxAi {
    max_depth: u32,
}

impl MinimaxAi {
    pub const DEFAULT_DEPTH: u32 = 3;

    /// A depth of zero is raised to one ply.
    pub fn new(max_depth: u32) -> Self {
        Self {
            max_depth: max_depth.max(1),
        }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Search the root position. Returns (best_move, stats).
    ///
    /// Yields no move when `color` is not the side to move, a promotion is
    /// still waiting for its piece, or `color` has no legal moves.
    pub fn search(&self, pos: &Position, color: Color) -> (Option<Move>, SearchStats) {
        let mut stats = SearchStats {
            depth: self.max_depth,
            ..SearchStats::default()
        };
        if color != pos.side_to_move() || pos.pending_promotion().is_some() {
            return (None, stats);
        }

        let mut best: Option<Move> = None;
        let mut best_score = -INF;
        for mv in legal_moves(pos, color) {
            let Some(child) = play(pos, mv) else {
                continue;
            };
            let score = -minimax(&child, self.max_depth - 1, -INF, INF, !color, &mut stats);
            // Strict comparison keeps the first of equally scored moves.
            if best.is_none() || score > best_score {
                best = Some(mv);
                best_score = score;
            }
        }

        if best.is_some() {
            stats.score = best_score;
        }
        (best, stats)
    }
}

impl Default for MinimaxAi {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DEPTH)
    }
}

impl AiEngine for MinimaxAi {
    fn best_move(&self, pos: &Position, color: Color) -> Option<Move> {
        let (best, stats) = self.search(pos, color);
        tracing::debug!(
            engine = self.name(),
            %color,
            depth = stats.depth,
            nodes = stats.nodes,
            score = stats.score,
            "search finished"
        );
        best
    }

    fn name(&self) -> &str {
        "MinimaxAi"
    }
}

/// Clone `pos` and play `mv` on the copy. A pawn reaching the last rank
/// becomes a queen.
fn play(pos: &Position, mv: Move) -> Option<Position> {
    let mut child = pos.clone();
    let mut outcome = child.apply_move(mv.from, mv.to).ok()?;
    if outcome.promotion_pending {
        child
            .complete_promotion(mv.to, PieceType::Queen, &mut outcome.record)
            .ok()?;
    }
    Some(child)
}

/// Negamax with alpha-beta pruning.
///
/// Returns the score from `color`'s perspective. Mate and stalemate are scored
/// before the depth cutoff and draw rules fall back to `evaluate`.
fn minimax(
    pos: &Position,
    depth: u32,
    mut alpha: f64,
    beta: f64,
    color: Color,
    stats: &mut SearchStats,
) -> f64 {
    stats.nodes += 1;

    // Mate and stalemate are detected at every depth, including the leaves.
    let moves = legal_moves(pos, color);
    if moves.is_empty() {
        return if pos.in_check(color) {
            -MATE - depth as f64
        } else {
            0.0
        };
    }

    if depth == 0 || pos.is_draw() {
        return evaluate(pos, color);
    }

    let mut best_score = -INF;
    for mv in moves {
        let Some(child) = play(pos, mv) else {
            continue;
        };
        let score = -minimax(&child, depth - 1, -beta, -alpha, !color, stats);

        if score > best_score {
            best_score = score;
        }
        if score > alpha {
            alpha = score;
        }
        if alpha >= beta {
            break; // Beta cutoff.
        }
    }

    best_score
}

// =========================================================================
// Tests
// =========================================================================
