pub mod attacks;
pub mod board;
pub mod executor;
pub mod game;
pub mod movegen;
pub mod snapshot;
pub mod status;
pub mod types;

pub use board::{Board, Fingerprint, Position};
pub use executor::{MoveOutcome, MoveRecord, PriorState};
pub use game::{Game, SavedGame};
pub use movegen::{legal_moves, legal_moves_from, pseudo_legal_moves};
pub use snapshot::{PositionBuilder, PositionSnapshot};
pub use status::GameState;
pub use types::*;
