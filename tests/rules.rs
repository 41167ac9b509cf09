//! Rule scenarios driven through the public `Game` API.

use web_chess::ai::{AiEngine, MinimaxAi};
use web_chess::engine::game::Game;
use web_chess::engine::movegen::{legal_moves_from, pseudo_legal_moves};
use web_chess::engine::snapshot::PositionBuilder;
use web_chess::engine::types::{
    CastlingRights, ChessError, Color, GameStatus, MoveKind, PieceType, SideRights, Square,
};
use web_chess::engine::{DrawReason, Position};

fn sq(name: &str) -> Square {
    let b = name.as_bytes();
    Square::new(b'8' - b[1], b[0] - b'a')
}

fn play(game: &mut Game, moves: &[(&str, &str)]) {
    for (from, to) in moves {
        game.attempt_move(sq(from), sq(to))
            .unwrap_or_else(|e| panic!("{from}{to} rejected: {e}"));
    }
}

fn game_from(rows: [&str; 8], side: Color, castling: CastlingRights) -> Game {
    let pos = PositionBuilder::new()
        .diagram(rows)
        .side_to_move(side)
        .castling(castling)
        .build()
        .unwrap();
    Game::from_position(pos)
}

// =====================================================================
// Errors
// =====================================================================

#[test]
fn move_errors_carry_their_kind() {
    let mut g = Game::new();
    assert_eq!(
        g.attempt_move(sq("e4"), sq("e5")).unwrap_err(),
        ChessError::NoPieceAtSource(sq("e4"))
    );
    assert_eq!(
        g.attempt_move(sq("e7"), sq("e5")).unwrap_err(),
        ChessError::WrongSideToMove(Color::White)
    );
    assert_eq!(
        g.attempt_move(sq("b1"), sq("b3")).unwrap_err(),
        ChessError::IllegalDestination {
            from: sq("b1"),
            to: sq("b3")
        }
    );
    assert!(g.export_history().is_empty());
}

// =====================================================================
// Legality
// =====================================================================

#[test]
fn pinned_knight_cannot_move() {
    let g = game_from(
        [
            "....r..k", "........", "........", "........", "........", "........", "....N...",
            "....K...",
        ],
        Color::White,
        CastlingRights::none(),
    );
    assert!(!pseudo_legal_moves(g.position(), sq("e2")).is_empty());
    assert!(g.legal_moves_from(sq("e2")).is_empty());
}

#[test]
fn king_cannot_castle_through_attacked_square() {
    let white_king_side = CastlingRights {
        white: SideRights {
            king_side: true,
            queen_side: false,
        },
        black: SideRights::default(),
    };
    let mut g = game_from(
        [
            "k....r..", "........", "........", "........", "........", "........", "........",
            "....K..R",
        ],
        Color::White,
        white_king_side,
    );
    assert!(
        g.legal_moves_from(sq("e1"))
            .iter()
            .all(|m| m.kind != MoveKind::CastleKingside)
    );
    assert!(matches!(
        g.attempt_move(sq("e1"), sq("g1")),
        Err(ChessError::IllegalDestination { .. })
    ));
}

#[test]
fn castling_moves_rook_and_undo_restores_it() {
    let mut g = Game::new();
    play(
        &mut g,
        &[("e2", "e4"), ("e7", "e5"), ("g1", "f3"), ("b8", "c6"), ("f1", "c4"), ("g8", "f6")],
    );
    let before = g.export_position();
    let out = g.attempt_move(sq("e1"), sq("g1")).unwrap();
    assert_eq!(out.record.kind, MoveKind::CastleKingside);
    let pos = g.position();
    assert_eq!(pos.piece_at(sq("f1")).map(|p| p.kind), Some(PieceType::Rook));
    assert!(pos.piece_at(sq("h1")).is_none());
    assert!(!pos.castling_rights().white.king_side);
    assert!(!pos.castling_rights().white.queen_side);

    g.undo().unwrap();
    assert_eq!(g.export_position(), before);
}

// =====================================================================
// Terminal states
// =====================================================================

#[test]
fn fools_mate_is_checkmate() {
    let mut g = Game::new();
    play(&mut g, &[("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")]);
    let state = g.state();
    assert!(state.is_checkmate);
    assert_eq!(g.status(), GameStatus::Checkmate);
    let pos = g.position();
    for square in Square::all() {
        if pos.piece_at(square).is_some_and(|p| p.color == Color::White) {
            assert!(legal_moves_from(pos, square).is_empty(), "{square} can move");
        }
    }
}

#[test]
fn cornered_king_is_stalemated() {
    let g = game_from(
        [
            "k.......", "..K.....", ".Q......", "........", "........", "........", "........",
            "........",
        ],
        Color::Black,
        CastlingRights::none(),
    );
    let state = g.state();
    assert!(state.is_stalemate);
    assert!(!state.is_check);
    assert!(g.legal_moves().is_empty());
}

#[test]
fn insufficient_material_boundary() {
    let lone_bishop = game_from(
        [
            "k.......", "........", "........", "........", "..B.....", "........", "........",
            ".......K",
        ],
        Color::Black,
        CastlingRights::none(),
    );
    assert_eq!(
        lone_bishop.status(),
        GameStatus::Draw(DrawReason::InsufficientMaterial)
    );

    let bishop_each = game_from(
        [
            "k.......", "........", "........", "........", "..B..b..", "........", "........",
            ".......K",
        ],
        Color::Black,
        CastlingRights::none(),
    );
    assert!(!bishop_each.state().is_draw_by_insufficient_material);
    assert_eq!(bishop_each.status(), GameStatus::Active);
}

// =====================================================================
// En passant
// =====================================================================

#[test]
fn en_passant_target_set_and_cleared() {
    let mut g = Game::new();
    play(&mut g, &[("e2", "e4")]);
    assert_eq!(g.position().en_passant_target(), Some(sq("e3")));
    play(&mut g, &[("a7", "a6")]);
    assert_eq!(g.position().en_passant_target(), None);
}

#[test]
fn en_passant_capture_removes_passed_pawn() {
    let mut g = Game::new();
    play(&mut g, &[("e2", "e4"), ("a7", "a6"), ("e4", "e5"), ("d7", "d5")]);
    let out = g.attempt_move(sq("e5"), sq("d6")).unwrap();
    assert!(out.record.en_passant);
    assert_eq!(out.captured().map(|p| p.kind), Some(PieceType::Pawn));
    assert!(g.position().piece_at(sq("d5")).is_none());
}

#[test]
fn delayed_en_passant_is_rejected() {
    let mut g = Game::new();
    play(
        &mut g,
        &[("e2", "e4"), ("a7", "a6"), ("e4", "e5"), ("d7", "d5"), ("h2", "h3"), ("h7", "h6")],
    );
    assert_eq!(
        g.attempt_move(sq("e5"), sq("d6")).unwrap_err(),
        ChessError::IllegalDestination {
            from: sq("e5"),
            to: sq("d6")
        }
    );
}

// =====================================================================
// Draw rules
// =====================================================================

const KNIGHT_SHUFFLE: [(&str, &str); 4] = [("g1", "f3"), ("g8", "f6"), ("f3", "g1"), ("f6", "g8")];

#[test]
fn fifty_move_rule_after_hundred_quiet_plies() {
    let mut g = Game::new();
    for _ in 0..24 {
        play(&mut g, &KNIGHT_SHUFFLE);
    }
    play(&mut g, &KNIGHT_SHUFFLE[..3]);
    assert_eq!(g.position().halfmove_clock(), 99);
    assert!(!g.state().is_draw_by_fifty_move_rule);

    play(&mut g, &KNIGHT_SHUFFLE[3..]);
    assert_eq!(g.position().halfmove_clock(), 100);
    assert!(g.state().is_draw_by_fifty_move_rule);
}

#[test]
fn pawn_move_resets_halfmove_clock() {
    let mut g = Game::new();
    play(&mut g, &KNIGHT_SHUFFLE);
    assert_eq!(g.position().halfmove_clock(), 4);
    play(&mut g, &[("e2", "e4")]);
    assert_eq!(g.position().halfmove_clock(), 0);
}

#[test]
fn threefold_repetition_by_knight_shuffle() {
    let mut g = Game::new();
    play(&mut g, &KNIGHT_SHUFFLE);
    assert!(!g.state().is_draw_by_repetition);
    play(&mut g, &KNIGHT_SHUFFLE);
    assert!(g.state().is_draw_by_repetition);
    assert_eq!(
        g.status(),
        GameStatus::Draw(DrawReason::ThreefoldRepetition)
    );
}

#[test]
fn forfeited_castling_right_changes_the_position() {
    let king_side = SideRights {
        king_side: true,
        queen_side: false,
    };
    let mut g = game_from(
        [
            "....k..r", "........", "........", "........", "........", "........", "........",
            "....K..R",
        ],
        Color::White,
        CastlingRights {
            white: king_side,
            black: king_side,
        },
    );
    let rook_shuffle = [("h1", "g1"), ("h8", "g8"), ("g1", "h1"), ("g8", "h8")];

    // The board matches the start after every cycle, but the rights do not.
    play(&mut g, &rook_shuffle);
    play(&mut g, &rook_shuffle);
    assert!(!g.state().is_draw_by_repetition);
    play(&mut g, &rook_shuffle);
    assert!(g.state().is_draw_by_repetition);
}

// =====================================================================
// Export / import
// =====================================================================

#[test]
fn export_import_keeps_fingerprint() {
    let mut g = Game::new();
    play(&mut g, &[("e2", "e4"), ("c7", "c5"), ("g1", "f3"), ("d7", "d5")]);
    let snap = g.export_position();
    let restored = Position::from_snapshot(&snap).unwrap();
    assert_eq!(restored.fingerprint(), g.position().fingerprint());
    assert_eq!(restored.en_passant_target(), Some(sq("d6")));
    assert_eq!(restored.to_snapshot(), snap);
}

#[test]
fn saved_game_replays_to_the_same_position() {
    let mut g = Game::new();
    play(&mut g, &[("e2", "e4"), ("e7", "e5"), ("d1", "h5"), ("b8", "c6")]);
    let saved = g.to_saved();
    let json = serde_json::to_string(&saved).unwrap();
    let loaded = Game::from_saved(&serde_json::from_str(&json).unwrap()).unwrap();
    assert_eq!(loaded.export_position(), g.export_position());
    assert_eq!(loaded.export_history(), g.export_history());
    assert_ne!(loaded.id, g.id);
}

// =====================================================================
// Search
// =====================================================================

#[test]
fn hint_finds_scholars_mate() {
    let mut g = Game::new();
    play(
        &mut g,
        &[("e2", "e4"), ("e7", "e5"), ("f1", "c4"), ("b8", "c6"), ("d1", "h5"), ("g8", "f6")],
    );
    for depth in 1..=3 {
        let ai = MinimaxAi::new(depth);
        let first = ai.best_move(g.position(), Color::White).unwrap();
        let again = ai.best_move(g.position(), Color::White).unwrap();
        assert_eq!(first, again);
        assert_eq!((first.from, first.to), (sq("h5"), sq("f7")), "depth {depth}");
    }
}
