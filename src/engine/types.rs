use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// The two sides in a chess game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const BOTH: [Color; 2] = [Color::White, Color::Black];

    /// Index for array lookups: White=0, Black=1.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Row holding this color's king and rooks at the start of the game.
    /// Row 0 is black's back rank.
    #[inline]
    pub const fn home_row(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// Row this color's pawns start on.
    #[inline]
    pub const fn pawn_row(self) -> u8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    /// Row on which this color's pawns promote.
    #[inline]
    pub const fn promotion_row(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// Row delta of a single pawn step.
    #[inline]
    pub const fn forward(self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// Row index as seen from this color: 0 is the far rank, 7 its own back rank.
    #[inline]
    pub const fn relative_row(self, row: u8) -> u8 {
        match self {
            Color::White => row,
            Color::Black => 7 - row,
        }
    }
}

impl std::ops::Not for Color {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

// ---------------------------------------------------------------------------
// PieceType
// ---------------------------------------------------------------------------

/// The six piece kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    /// All piece types in order.
    pub const ALL: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    /// Index for array lookups: Pawn=0 .. King=5.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Material value in pawns.
    pub fn value(self) -> f64 {
        match self {
            PieceType::Pawn => 1.0,
            PieceType::Knight => 3.0,
            PieceType::Bishop => 3.0,
            PieceType::Rook => 5.0,
            PieceType::Queen => 9.0,
            PieceType::King => 100.0,
        }
    }

    /// Whether a pawn may promote to this kind.
    pub fn is_promotion_choice(self) -> bool {
        matches!(
            self,
            PieceType::Knight | PieceType::Bishop | PieceType::Rook | PieceType::Queen
        )
    }

    /// Single uppercase letter for white, lowercase for black.
    pub fn to_char(self, color: Color) -> char {
        let c = match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        };
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Parse a piece letter; the case selects the color.
    pub fn from_char(c: char) -> Option<(Color, PieceType)> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let piece = match c.to_ascii_lowercase() {
            'p' => PieceType::Pawn,
            'n' => PieceType::Knight,
            'b' => PieceType::Bishop,
            'r' => PieceType::Rook,
            'q' => PieceType::Queen,
            'k' => PieceType::King,
            _ => return None,
        };
        Some((color, piece))
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceType::Pawn => write!(f, "pawn"),
            PieceType::Knight => write!(f, "knight"),
            PieceType::Bishop => write!(f, "bishop"),
            PieceType::Rook => write!(f, "rook"),
            PieceType::Queen => write!(f, "queen"),
            PieceType::King => write!(f, "king"),
        }
    }
}

// ---------------------------------------------------------------------------
// Piece
// ---------------------------------------------------------------------------

/// A piece standing on the board.
///
/// `has_moved` only gates castling eligibility. Pieces created out of band
/// (promotion, loaded positions) must set it explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    #[serde(rename = "type")]
    pub kind: PieceType,
    pub color: Color,
    pub has_moved: bool,
}

impl Piece {
    /// A piece that has not moved yet.
    pub const fn new(kind: PieceType, color: Color) -> Self {
        Self {
            kind,
            color,
            has_moved: false,
        }
    }

    pub const fn moved(kind: PieceType, color: Color) -> Self {
        Self {
            kind,
            color,
            has_moved: true,
        }
    }

    pub fn is(&self, kind: PieceType, color: Color) -> bool {
        self.kind == kind && self.color == color
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color, self.kind)
    }
}

// ---------------------------------------------------------------------------
// Square
// ---------------------------------------------------------------------------

/// A square addressed by row and column, both in `0..8`.
/// Row 0 is black's back rank, column 0 the a-file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Square {
    pub row: u8,
    pub col: u8,
}

impl Square {
    #[inline]
    pub const fn new(row: u8, col: u8) -> Self {
        debug_assert!(row < 8 && col < 8, "square out of range");
        Self { row, col }
    }

    /// Checked constructor for untrusted coordinates.
    pub fn try_new(row: i32, col: i32) -> Option<Self> {
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// Whether both coordinates are on the board. Deserialized squares may not be.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.row < 8 && self.col < 8
    }

    /// The square `dr` rows and `dc` columns away, if it is on the board.
    #[inline]
    pub fn offset(self, dr: i8, dc: i8) -> Option<Self> {
        Self::try_new(self.row as i32 + dr as i32, self.col as i32 + dc as i32)
    }

    /// All 64 squares, row-major from row 0.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|row| (0..8u8).map(move |col| Square { row, col }))
    }

    /// Algebraic name (`e4`), for logs and error messages.
    pub fn to_algebraic(self) -> String {
        let file = (b'a' + self.col) as char;
        let rank = 8 - self.row;
        format!("{file}{rank}")
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

/// What a move does besides relocating the piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoveKind {
    Normal,
    DoublePawnPush,
    Capture,
    EnPassant,
    CastleKingside,
    CastleQueenside,
    /// Pawn reaching the last rank, with or without a capture.
    Promotion,
}

impl MoveKind {
    pub fn castle_side(self) -> Option<CastleSide> {
        match self {
            MoveKind::CastleKingside => Some(CastleSide::KingSide),
            MoveKind::CastleQueenside => Some(CastleSide::QueenSide),
            _ => None,
        }
    }
}

/// A move value. The moving piece is looked up at execution time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub kind: MoveKind,
}

impl Move {
    pub const fn new(from: Square, to: Square, kind: MoveKind) -> Self {
        Self { from, to, kind }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

// ---------------------------------------------------------------------------
// CastlingRights
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

impl CastleSide {
    /// Column of the rook taking part in this castle.
    pub const fn rook_col(self) -> u8 {
        match self {
            CastleSide::KingSide => 7,
            CastleSide::QueenSide => 0,
        }
    }

    /// Column delta of the king's two-square step.
    pub const fn king_step(self) -> i8 {
        match self {
            CastleSide::KingSide => 2,
            CastleSide::QueenSide => -2,
        }
    }
}

/// Castling availability for one color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideRights {
    pub king_side: bool,
    pub queen_side: bool,
}

impl SideRights {
    pub fn get(self, side: CastleSide) -> bool {
        match side {
            CastleSide::KingSide => self.king_side,
            CastleSide::QueenSide => self.queen_side,
        }
    }

    pub fn revoke(&mut self, side: CastleSide) {
        match side {
            CastleSide::KingSide => self.king_side = false,
            CastleSide::QueenSide => self.queen_side = false,
        }
    }

    pub fn any(self) -> bool {
        self.king_side || self.queen_side
    }
}

/// Castling availability for both colors. Rights only ever shrink during play.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CastlingRights {
    pub white: SideRights,
    pub black: SideRights,
}

impl CastlingRights {
    pub const fn all() -> Self {
        let both = SideRights {
            king_side: true,
            queen_side: true,
        };
        Self {
            white: both,
            black: both,
        }
    }

    pub const fn none() -> Self {
        let neither = SideRights {
            king_side: false,
            queen_side: false,
        };
        Self {
            white: neither,
            black: neither,
        }
    }

    pub fn of(&self, color: Color) -> SideRights {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    pub fn of_mut(&mut self, color: Color) -> &mut SideRights {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    pub fn has(&self, color: Color, side: CastleSide) -> bool {
        self.of(color).get(side)
    }

    /// Packed as KQkq bits, for fingerprints.
    pub fn bits(&self) -> u8 {
        (self.white.king_side as u8)
            | (self.white.queen_side as u8) << 1
            | (self.black.king_side as u8) << 2
            | (self.black.queen_side as u8) << 3
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bits() == 0 {
            return write!(f, "-");
        }
        let flags = [
            (self.white.king_side, 'K'),
            (self.white.queen_side, 'Q'),
            (self.black.king_side, 'k'),
            (self.black.queen_side, 'q'),
        ];
        for (set, c) in flags {
            if set {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// GameStatus
// ---------------------------------------------------------------------------

/// Current status of a game, from the side to move's point of view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum GameStatus {
    Active,
    Check,
    Checkmate,
    Stalemate,
    Draw(DrawReason),
}

impl GameStatus {
    pub fn as_str(&self) -> &str {
        match self {
            GameStatus::Active => "active",
            GameStatus::Check => "check",
            GameStatus::Checkmate => "checkmate",
            GameStatus::Stalemate => "stalemate",
            GameStatus::Draw(reason) => reason.as_str(),
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(
            self,
            GameStatus::Checkmate | GameStatus::Stalemate | GameStatus::Draw(_)
        )
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reason for a draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DrawReason {
    FiftyMoveRule,
    ThreefoldRepetition,
    InsufficientMaterial,
}

impl DrawReason {
    pub fn as_str(&self) -> &str {
        match self {
            DrawReason::FiftyMoveRule => "fifty_move_rule",
            DrawReason::ThreefoldRepetition => "threefold_repetition",
            DrawReason::InsufficientMaterial => "insufficient_material",
        }
    }
}

// ---------------------------------------------------------------------------
// ChessError
// ---------------------------------------------------------------------------

/// Domain errors for the chess engine.
///
/// Every variant carries a stable [`code`](ChessError::code) so front ends
/// can localise the message themselves.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChessError {
    #[error("no piece on {0}")]
    NoPieceAtSource(Square),

    #[error("it is {0}'s turn to move")]
    WrongSideToMove(Color),

    #[error("illegal move: {from} -> {to}")]
    IllegalDestination { from: Square, to: Square },

    #[error("a pawn on {0} is waiting to be promoted")]
    PendingPromotionRequired(Square),

    #[error("invalid loaded position: {0}")]
    InvalidLoadedPosition(String),

    #[error("no promotion pending on {0}")]
    NoPendingPromotion(Square),

    #[error("cannot promote to {0}")]
    InvalidPromotionPiece(PieceType),

    #[error("no moves to undo")]
    NothingToUndo,

    #[error("saved move {index} could not be replayed: {source}")]
    InvalidHistory {
        index: usize,
        #[source]
        source: Box<ChessError>,
    },
}

impl ChessError {
    /// Machine-readable error kind.
    pub fn code(&self) -> &'static str {
        match self {
            ChessError::NoPieceAtSource(_) => "NO_PIECE_AT_SOURCE",
            ChessError::WrongSideToMove(_) => "WRONG_SIDE_TO_MOVE",
            ChessError::IllegalDestination { .. } => "ILLEGAL_DESTINATION",
            ChessError::PendingPromotionRequired(_) => "PENDING_PROMOTION_REQUIRED",
            ChessError::InvalidLoadedPosition(_) => "INVALID_LOADED_POSITION",
            ChessError::NoPendingPromotion(_) => "NO_PENDING_PROMOTION",
            ChessError::InvalidPromotionPiece(_) => "INVALID_PROMOTION_PIECE",
            ChessError::NothingToUndo => "NOTHING_TO_UNDO",
            ChessError::InvalidHistory { .. } => "INVALID_HISTORY",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
