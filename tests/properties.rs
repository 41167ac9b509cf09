//! Property tests over random playouts from the starting position.
//!
//! Each case is a list of random choices; choice `i` picks the legal move
//! played at ply `i` (and the promotion piece when a pawn reaches the last
//! rank). Invariants are checked at every ply along the way.

use std::collections::HashSet;

use proptest::prelude::*;

use web_chess::engine::attacks::is_square_attacked;
use web_chess::engine::board::Position;
use web_chess::engine::game::Game;
use web_chess::engine::movegen::{legal_moves_from, pseudo_legal_moves, simulate};
use web_chess::engine::types::{Color, Move, PieceType, Square};

const PROMOTIONS: [PieceType; 4] = [
    PieceType::Queen,
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Knight,
];

/// Play the move selected by `choice`. Returns false once the game is stuck.
fn play_choice(game: &mut Game, choice: u32) -> bool {
    let moves = game.legal_moves();
    if moves.is_empty() {
        return false;
    }
    let mv = moves[choice as usize % moves.len()];
    let outcome = game.attempt_move(mv.from, mv.to).unwrap();
    if outcome.promotion_pending {
        let kind = PROMOTIONS[(choice as usize / 7) % PROMOTIONS.len()];
        game.promote(mv.to, kind).unwrap();
    }
    true
}

/// Brute force: keep a pseudo-legal move iff the mover's king, found by
/// scanning the board after the move, is not attacked.
fn oracle(pos: &Position, from: Square) -> HashSet<Move> {
    let Some(piece) = pos.piece_at(from) else {
        return HashSet::new();
    };
    pseudo_legal_moves(pos, from)
        .into_iter()
        .filter(|mv| {
            let after = simulate(pos.board(), *mv);
            match after.find_king(piece.color) {
                Some(king) => !is_square_attacked(&after, king, piece.color),
                None => false,
            }
        })
        .collect()
}

fn choices() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(any::<u32>(), 0..60)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn legal_moves_match_brute_force(picks in choices()) {
        let mut game = Game::new();
        for choice in picks {
            let pos = game.position();
            for sq in Square::all() {
                let legal: HashSet<Move> = legal_moves_from(pos, sq).into_iter().collect();
                prop_assert_eq!(legal, oracle(pos, sq), "square {}", sq);
            }
            if !play_choice(&mut game, choice) {
                break;
            }
        }
    }

    #[test]
    fn export_import_round_trip(picks in choices()) {
        let mut game = Game::new();
        for choice in picks {
            if !play_choice(&mut game, choice) {
                break;
            }
            let snap = game.export_position();
            let restored = Position::from_snapshot(&snap).unwrap();
            prop_assert_eq!(restored.fingerprint(), game.position().fingerprint());
            prop_assert_eq!(restored.to_snapshot(), snap);
        }
    }

    #[test]
    fn undo_restores_prior_snapshot(picks in choices()) {
        let mut game = Game::new();
        for choice in picks {
            let before = game.export_position();
            let history = game.position().position_history().to_vec();
            if !play_choice(&mut game, choice) {
                break;
            }
            let after = game.export_position();

            game.undo().unwrap();
            prop_assert_eq!(&game.export_position(), &before);
            prop_assert_eq!(game.position().position_history(), history.as_slice());

            prop_assert!(play_choice(&mut game, choice));
            prop_assert_eq!(game.export_position(), after);
        }
    }

    #[test]
    fn bookkeeping_stays_consistent(picks in choices()) {
        let mut game = Game::new();
        for choice in picks {
            if !play_choice(&mut game, choice) {
                break;
            }
            let pos = game.position();
            for color in Color::BOTH {
                prop_assert_eq!(pos.board().find_king(color), Some(pos.king_square(color)));
            }
            prop_assert_eq!(
                pos.position_history().len(),
                game.export_history().len() + 1
            );
            let record = game.last_move().unwrap();
            prop_assert_eq!(record.check, pos.in_check(pos.side_to_move()));
            prop_assert!(pos.pending_promotion().is_none());
        }
    }
}
