//! Attack maps built by rescanning the whole board.
//!
//! A colour "attacks" every square its pieces could move to under the
//! pseudo-legal rules, castling excluded. Non-capturing pawn advances count
//! too; king-safety checks only ever ask about occupied king squares, where a
//! pawn advance can never land. Empty pawn diagonals are not marked, so the
//! castling gate does not see a square covered only by an enemy pawn's
//! capture. Maps are disposable snapshots: build one, query it, drop it.

use tracing::trace;

use crate::engine::board::Board;
use crate::engine::movegen::pseudo_legal_offsets;
use crate::engine::state::GameState;
use crate::engine::types::{Bitboard, Color, Square};

/// Squares reachable by each colour, one bitboard per colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttackMap {
    by_color: [Bitboard; 2],
}

impl AttackMap {
    /// Full rescan: union the pseudo-legal destinations of every piece.
    pub fn build(board: &Board, state: &GameState) -> Self {
        let mut map = AttackMap::default();
        for (from, piece) in board.pieces() {
            let reach = &mut map.by_color[piece.color.index()];
            for offset in pseudo_legal_offsets(piece, from, board, state) {
                if let Some(to) = from.offset(offset) {
                    reach.set(to);
                }
            }
        }
        trace!(
            white = map.attacked_by(Color::White).pop_count(),
            black = map.attacked_by(Color::Black).pop_count(),
            "attack map rebuilt"
        );
        map
    }

    /// Is `sq` attacked by any piece of colour `by`?
    #[inline]
    pub fn is_attacked(&self, sq: Square, by: Color) -> bool {
        self.by_color[by.index()].is_set(sq)
    }

    /// All squares attacked by `by`.
    #[inline]
    pub fn attacked_by(&self, by: Color) -> Bitboard {
        self.by_color[by.index()]
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::state::EnPassant;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn map(placement: &str) -> AttackMap {
        let board = Board::from_fen_placement(placement).unwrap();
        AttackMap::build(&board, &GameState::initial())
    }

    #[test]
    fn starting_position_covers_the_two_ranks_ahead() {
        let m = AttackMap::build(&Board::initial(), &GameState::initial());
        let white = m.attacked_by(Color::White);
        let black = m.attacked_by(Color::Black);
        assert_eq!(white.pop_count(), 16);
        assert_eq!(black.pop_count(), 16);
        assert!(white.iter().all(|s| s.rank() == 2 || s.rank() == 3));
        assert!(black.iter().all(|s| s.rank() == 4 || s.rank() == 5));
    }

    #[test]
    fn pawn_advance_counts_but_empty_diagonal_does_not() {
        let m = map("4k3/8/8/8/8/8/4P3/K7");
        assert!(m.is_attacked(sq("e3"), Color::White));
        assert!(m.is_attacked(sq("e4"), Color::White));
        assert!(!m.is_attacked(sq("d3"), Color::White));
        assert!(!m.is_attacked(sq("f3"), Color::White));
    }

    #[test]
    fn pawn_diagonal_counts_when_occupied_by_enemy() {
        let m = map("4k3/8/8/8/8/3n4/4P3/K7");
        assert!(m.is_attacked(sq("d3"), Color::White));
        assert!(!m.is_attacked(sq("f3"), Color::White));
    }

    #[test]
    fn slider_reach_ends_at_blocker() {
        let m = map("4k3/8/8/8/8/8/8/R2n3K");
        assert!(m.is_attacked(sq("d1"), Color::White));
        assert!(!m.is_attacked(sq("e1"), Color::White));
        // The knight itself reaches b2, c3, e3 and f2.
        assert!(m.is_attacked(sq("f2"), Color::Black));
    }

    #[test]
    fn king_square_marked_when_in_line() {
        let m = map("4k3/8/8/8/8/8/8/4K2r");
        assert!(m.is_attacked(sq("e1"), Color::Black));
        assert!(!m.is_attacked(sq("e8"), Color::White));
    }

    #[test]
    fn en_passant_capture_square_is_attacked() {
        let board = Board::from_fen_placement("4k3/8/8/8/3pP3/8/8/4K3").unwrap();
        let mut state = GameState::initial();
        state.side_to_move = Color::Black;
        state.en_passant = Some(EnPassant::after_double_step(sq("e4")));
        let m = AttackMap::build(&board, &state);
        assert!(m.is_attacked(sq("e3"), Color::Black));
    }

    #[test]
    fn rebuilding_is_deterministic() {
        let board = Board::initial();
        let state = GameState::initial();
        assert_eq!(
            AttackMap::build(&board, &state),
            AttackMap::build(&board, &state)
        );
    }
}
