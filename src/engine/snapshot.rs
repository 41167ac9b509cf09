//! Position export/import and a builder for arbitrary positions.
//!
//! `PositionSnapshot` is the serializable form of a position. Importing one
//! validates everything first and only then produces a `Position`, so a bad
//! load never leaves a half-built value behind.

use serde::{Deserialize, Serialize};

use crate::engine::attacks::is_square_attacked;
use crate::engine::board::{Board, Position};
use crate::engine::types::{
    CastleSide, CastlingRights, ChessError, Color, Piece, PieceType, Square,
};

// =========================================================================
// PositionSnapshot
// =========================================================================

/// Lossless, serializable copy of a position's state.
///
/// Repetition history is not part of the snapshot. It restarts from the
/// imported position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSnapshot {
    /// Eight rows of eight optional pieces, row 0 first.
    pub board: Vec<Vec<Option<Piece>>>,
    pub side_to_move: Color,
    pub castling_rights: CastlingRights,
    pub en_passant_target: Option<Square>,
    pub half_move_clock: u32,
    pub full_move_number: u32,
    #[serde(default)]
    pub pending_promotion: Option<Square>,
}

impl Position {
    /// Export the current state.
    pub fn to_snapshot(&self) -> PositionSnapshot {
        PositionSnapshot {
            board: self.board.rows().iter().map(|row| row.to_vec()).collect(),
            side_to_move: self.side_to_move,
            castling_rights: self.castling,
            en_passant_target: self.en_passant,
            half_move_clock: self.halfmove_clock,
            full_move_number: self.fullmove_number,
            pending_promotion: self.pending_promotion,
        }
    }

    /// Build a position from a snapshot, rejecting structurally broken input.
    ///
    /// King squares are recomputed and the repetition history restarts with
    /// the imported position.
    pub fn from_snapshot(snap: &PositionSnapshot) -> Result<Position, ChessError> {
        let board = board_from_rows(&snap.board)?;

        let mut king_squares = [Square::new(0, 0); 2];
        for color in Color::BOTH {
            let kings: Vec<Square> = board
                .pieces()
                .filter(|(_, p)| p.is(PieceType::King, color))
                .map(|(sq, _)| sq)
                .collect();
            match kings.as_slice() {
                [only] => king_squares[color.index()] = *only,
                _ => {
                    return Err(invalid(format!(
                        "expected exactly one {color} king, found {}",
                        kings.len()
                    )));
                }
            }
        }

        if let Some(ep) = snap.en_passant_target {
            let expected_row = match snap.side_to_move {
                Color::White => 2,
                Color::Black => 5,
            };
            if !ep.is_valid() || ep.row != expected_row || !board.is_empty(ep) {
                return Err(invalid(format!("en passant target {ep:?} is not possible")));
            }
        }

        let mover = snap.side_to_move;
        match snap.pending_promotion {
            Some(sq) => {
                let is_pawn = sq.is_valid()
                    && sq.row == mover.promotion_row()
                    && board.get(sq).is_some_and(|p| p.is(PieceType::Pawn, mover));
                if !is_pawn {
                    return Err(invalid(format!("no {mover} pawn to promote on {sq:?}")));
                }
            }
            None => {
                let waiting = !mover;
                if is_square_attacked(&board, king_squares[waiting.index()], waiting) {
                    return Err(invalid(format!(
                        "{waiting} is in check but it is {mover}'s turn"
                    )));
                }
            }
        }

        let mut pos = Position {
            board,
            side_to_move: snap.side_to_move,
            castling: playable_rights(&board, snap.castling_rights),
            en_passant: snap.en_passant_target,
            halfmove_clock: snap.half_move_clock,
            fullmove_number: snap.full_move_number.max(1),
            king_squares,
            history: Vec::new(),
            pending_promotion: snap.pending_promotion,
        };
        if pos.pending_promotion.is_none() {
            pos.history.push(pos.fingerprint());
        }
        Ok(pos)
    }
}

/// Keep only the rights an unmoved king and rook on their home squares can
/// still use. Dead rights would otherwise split equal positions apart.
fn playable_rights(board: &Board, claimed: CastlingRights) -> CastlingRights {
    let mut rights = claimed;
    for color in Color::BOTH {
        let home = color.home_row();
        let unmoved = |sq: Square, kind: PieceType| {
            board
                .get(sq)
                .is_some_and(|p| p.is(kind, color) && !p.has_moved)
        };
        let king_home = unmoved(Square::new(home, 4), PieceType::King);
        for side in [CastleSide::KingSide, CastleSide::QueenSide] {
            if !king_home || !unmoved(Square::new(home, side.rook_col()), PieceType::Rook) {
                rights.of_mut(color).revoke(side);
            }
        }
    }
    rights
}

fn board_from_rows(rows: &[Vec<Option<Piece>>]) -> Result<Board, ChessError> {
    if rows.len() != 8 || rows.iter().any(|r| r.len() != 8) {
        return Err(invalid("board must be 8 rows of 8 squares".to_string()));
    }
    let mut board = Board::empty();
    for (row, cells) in rows.iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            board.set(Square::new(row as u8, col as u8), *cell);
        }
    }
    Ok(board)
}

fn invalid(reason: String) -> ChessError {
    ChessError::InvalidLoadedPosition(reason)
}

// =========================================================================
// PositionBuilder
// =========================================================================

/// Builds a position from a board diagram or individual placements.
///
/// Diagram rows run from row 0 (black's back rank) down to row 7; upper case
/// letters are white pieces and `.` marks an empty square. `has_moved` is
/// inferred on [`build`](PositionBuilder::build): a pawn on its starting row
/// is unmoved, a king or rook on its starting square is unmoved only while
/// the matching castling right is held, other pieces are unmoved on their
/// standard starting squares. Everything else counts as moved.
#[derive(Clone, Debug)]
pub struct PositionBuilder {
    placements: [[Option<(PieceType, Color)>; 8]; 8],
    diagram_error: Option<String>,
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl PositionBuilder {
    /// Empty board, white to move, no castling rights.
    pub fn new() -> Self {
        Self {
            placements: [[None; 8]; 8],
            diagram_error: None,
            side_to_move: Color::White,
            castling: CastlingRights::none(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Replace the board with an eight-row diagram.
    pub fn diagram(mut self, rows: [&str; 8]) -> Self {
        self.placements = [[None; 8]; 8];
        for (row, line) in rows.iter().enumerate() {
            let chars: Vec<char> = line.chars().collect();
            if chars.len() != 8 {
                self.diagram_error = Some(format!("diagram row {row} is not 8 squares: {line:?}"));
                return self;
            }
            for (col, c) in chars.into_iter().enumerate() {
                if c == '.' {
                    continue;
                }
                match PieceType::from_char(c) {
                    Some((color, kind)) => self.placements[row][col] = Some((kind, color)),
                    None => {
                        self.diagram_error = Some(format!("unknown piece letter {c:?}"));
                        return self;
                    }
                }
            }
        }
        self
    }

    pub fn place(mut self, sq: Square, kind: PieceType, color: Color) -> Self {
        self.placements[sq.row as usize][sq.col as usize] = Some((kind, color));
        self
    }

    pub fn clear(mut self, sq: Square) -> Self {
        self.placements[sq.row as usize][sq.col as usize] = None;
        self
    }

    pub fn side_to_move(mut self, color: Color) -> Self {
        self.side_to_move = color;
        self
    }

    pub fn castling(mut self, rights: CastlingRights) -> Self {
        self.castling = rights;
        self
    }

    pub fn en_passant(mut self, target: Option<Square>) -> Self {
        self.en_passant = target;
        self
    }

    pub fn halfmove_clock(mut self, clock: u32) -> Self {
        self.halfmove_clock = clock;
        self
    }

    pub fn fullmove_number(mut self, number: u32) -> Self {
        self.fullmove_number = number;
        self
    }

    /// The snapshot this builder describes, `has_moved` flags filled in.
    pub fn snapshot(&self) -> Result<PositionSnapshot, ChessError> {
        if let Some(err) = &self.diagram_error {
            return Err(invalid(err.clone()));
        }
        let board = (0..8u8)
            .map(|row| {
                (0..8u8)
                    .map(|col| {
                        self.placements[row as usize][col as usize].map(|(kind, color)| Piece {
                            kind,
                            color,
                            has_moved: self.infer_moved(Square::new(row, col), kind, color),
                        })
                    })
                    .collect()
            })
            .collect();
        Ok(PositionSnapshot {
            board,
            side_to_move: self.side_to_move,
            castling_rights: self.castling,
            en_passant_target: self.en_passant,
            half_move_clock: self.halfmove_clock,
            full_move_number: self.fullmove_number,
            pending_promotion: None,
        })
    }

    pub fn build(&self) -> Result<Position, ChessError> {
        Position::from_snapshot(&self.snapshot()?)
    }

    fn infer_moved(&self, sq: Square, kind: PieceType, color: Color) -> bool {
        let rights = self.castling.of(color);
        let home = color.home_row();
        match kind {
            PieceType::Pawn => sq.row != color.pawn_row(),
            PieceType::King => !(sq == Square::new(home, 4) && rights.any()),
            PieceType::Rook => {
                let unmoved = (sq == Square::new(home, 7) && rights.king_side)
                    || (sq == Square::new(home, 0) && rights.queen_side);
                !unmoved
            }
            PieceType::Knight => !(sq.row == home && (sq.col == 1 || sq.col == 6)),
            PieceType::Bishop => !(sq.row == home && (sq.col == 2 || sq.col == 5)),
            PieceType::Queen => sq != Square::new(home, 3),
        }
    }
}

impl Default for PositionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
