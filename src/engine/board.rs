//! Mailbox board and game position.
//!
//! `Board` is a plain 8×8 grid of optional pieces and is `Copy`, so legality
//! checks can simulate a move on a scratch copy. `Position` adds side to move,
//! castling rights, en-passant target, move counters, cached king squares and
//! the fingerprint history used for repetition detection. Cloning a
//! `Position` yields a fully independent value.

use crate::engine::types::{CastlingRights, Color, Piece, PieceType, Square};

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// 8×8 grid indexed `[row][col]`, row 0 being black's back rank.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
}

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

impl Board {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard initial arrangement.
    pub fn standard() -> Self {
        let mut board = Self::empty();
        for color in Color::BOTH {
            for (col, kind) in BACK_RANK.into_iter().enumerate() {
                board.set(Square::new(color.home_row(), col as u8), Some(Piece::new(kind, color)));
                board.set(
                    Square::new(color.pawn_row(), col as u8),
                    Some(Piece::new(PieceType::Pawn, color)),
                );
            }
        }
        board
    }

    #[inline]
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.row as usize][sq.col as usize]
    }

    #[inline]
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.squares[sq.row as usize][sq.col as usize] = piece;
    }

    /// Remove and return whatever stands on `sq`.
    #[inline]
    pub fn take(&mut self, sq: Square) -> Option<Piece> {
        self.squares[sq.row as usize][sq.col as usize].take()
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.get(sq).is_none()
    }

    /// Every occupied square with its piece, row-major.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|sq| self.get(sq).map(|p| (sq, p)))
    }

    pub fn piece_count(&self) -> usize {
        self.pieces().count()
    }

    /// First king of `color` found scanning row-major.
    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, p)| p.is(PieceType::King, color))
            .map(|(sq, _)| sq)
    }

    /// Rows of the grid, for serialization.
    pub fn rows(&self) -> &[[Option<Piece>; 8]; 8] {
        &self.squares
    }
}

// ---------------------------------------------------------------------------
// Fingerprint
// ---------------------------------------------------------------------------

/// Exact repetition key: piece placement, castling rights, en-passant target
/// and side to move. `has_moved` flags and move counters are left out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    squares: [u8; 64],
    castling: u8,
    en_passant: Option<Square>,
    side_to_move: Color,
}

fn piece_code(piece: Option<Piece>) -> u8 {
    match piece {
        None => 0,
        Some(p) => 1 + p.kind.index() as u8 + 6 * p.color.index() as u8,
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A live chess position.
#[derive(Clone, Debug)]
pub struct Position {
    pub(crate) board: Board,
    pub(crate) side_to_move: Color,
    pub(crate) castling: CastlingRights,
    /// Square behind a pawn that just advanced two squares.
    pub(crate) en_passant: Option<Square>,
    /// Half-moves since the last pawn move or capture.
    pub(crate) halfmove_clock: u32,
    /// Starts at 1, incremented after black moves.
    pub(crate) fullmove_number: u32,
    /// Cached king locations, `[white, black]`.
    pub(crate) king_squares: [Square; 2],
    /// Fingerprints of every completed position, including the current one.
    pub(crate) history: Vec<Fingerprint>,
    /// Square of a pawn waiting for its promotion choice.
    pub(crate) pending_promotion: Option<Square>,
}

impl Position {
    /// Standard starting position.
    pub fn starting() -> Self {
        let mut pos = Position {
            board: Board::standard(),
            side_to_move: Color::White,
            castling: CastlingRights::all(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            king_squares: [Square::new(7, 4), Square::new(0, 4)],
            history: Vec::new(),
            pending_promotion: None,
        };
        pos.history.push(pos.fingerprint());
        pos
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.board.get(sq)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.king_squares[color.index()]
    }

    pub fn position_history(&self) -> &[Fingerprint] {
        &self.history
    }

    pub fn pending_promotion(&self) -> Option<Square> {
        self.pending_promotion
    }

    // -----------------------------------------------------------------------
    // Fingerprint
    // -----------------------------------------------------------------------

    pub fn fingerprint(&self) -> Fingerprint {
        let mut squares = [0u8; 64];
        for (i, sq) in Square::all().enumerate() {
            squares[i] = piece_code(self.board.get(sq));
        }
        Fingerprint {
            squares,
            castling: self.castling.bits(),
            en_passant: self.en_passant,
            side_to_move: self.side_to_move,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::starting()
    }
}

impl std::fmt::Display for Position {
    /// Diagram with row 0 on top, `.` for empty squares.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.board.rows() {
            for cell in row {
                let c = cell.map_or('.', |p| p.kind.to_char(p.color));
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        write!(f, "{} to move, castling {}", self.side_to_move, self.castling)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
