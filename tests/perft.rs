//! Perft (PERFormance Test): exhaustive move-generation correctness suite.
//!
//! Each test verifies that the number of leaf nodes at a given depth matches
//! known-correct values for standard positions. The positions are chosen so
//! that the engine's simplifications (queen-only promotion, pawn advances
//! counted as attacks) cannot change the counts at the depths tested.
//!
//! Reference: <https://www.chessprogramming.org/Perft_Results>

use chess_rules::Game;
use chess_rules::engine::Square;

/// Every legal `(from, to)` pair for the side to move.
fn all_moves(game: &Game) -> Vec<(Square, Square)> {
    Square::all()
        .flat_map(|from| {
            game.legal_moves(from)
                .into_iter()
                .map(move |to| (from, to))
        })
        .collect()
}

/// Recursive perft: count leaf nodes at `depth`.
fn perft(game: &Game, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = all_moves(game);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0u64;
    for (from, to) in moves {
        let mut child = game.clone();
        child
            .try_move(from, to)
            .unwrap_or_else(|e| panic!("generated move {from}{to} rejected: {e}"));
        nodes += perft(&child, depth - 1);
    }
    nodes
}

// =====================================================================
// Position 1: starting position
// =====================================================================

#[test]
fn perft_start_depth_1() {
    assert_eq!(perft(&Game::new(), 1), 20);
}

#[test]
fn perft_start_depth_2() {
    assert_eq!(perft(&Game::new(), 2), 400);
}

#[test]
fn perft_start_depth_3() {
    assert_eq!(perft(&Game::new(), 3), 8_902);
}

// =====================================================================
// Position 2: "Kiwipete" (castling both ways, pins, many captures)
// =====================================================================

fn kiwipete() -> Game {
    Game::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
        .unwrap()
}

#[test]
fn perft_kiwipete_depth_1() {
    assert_eq!(perft(&kiwipete(), 1), 48);
}

#[test]
fn kiwipete_offers_both_castles() {
    let game = kiwipete();
    let king = game.legal_moves(Square::from_algebraic("e1").unwrap());
    for to in ["c1", "d1", "f1", "g1"] {
        assert!(
            king.contains(&Square::from_algebraic(to).unwrap()),
            "missing Ke1-{to}"
        );
    }
    assert_eq!(king.len(), 4);
}

// =====================================================================
// Legal-move enumeration never mutates the game
// =====================================================================

#[test]
fn enumeration_is_side_effect_free() {
    let game = kiwipete();
    let before = game.to_fen();
    let first = all_moves(&game);
    let second = all_moves(&game);
    assert_eq!(first, second);
    assert_eq!(game.to_fen(), before);
}
