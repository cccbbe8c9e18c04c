pub mod attacks;
pub mod board;
pub mod game;
pub mod legality;
pub mod movegen;
pub mod offsets;
pub mod state;
pub mod types;

pub use attacks::AttackMap;
pub use board::Board;
pub use game::{Game, MoveOutcome};
pub use legality::Verdict;
pub use state::{CastlingRights, EnPassant, GameState};
pub use types::*;
