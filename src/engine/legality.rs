//! Legality checking: pseudo-legal shape first, then king safety.
//!
//! Pipeline for one candidate move:
//!   1. Collect the piece's pseudo-legal offsets, plus castling for a king.
//!   2. Reject if the requested displacement is not among them.
//!   3. Simulate the move on the board and rebuild the attack map.
//!   4. Reject if the mover's king stands on an enemy-attacked square.
//!   5. Roll the simulation back (the guard does this on every path).
//!   6. Note whether the move attacks the enemy king.
//!
//! The cheap shape test runs before the board-wide rescan.

use crate::engine::attacks::AttackMap;
use crate::engine::board::Board;
use crate::engine::movegen::pseudo_legal_offsets;
use crate::engine::offsets::{MoveKind, single};
use crate::engine::state::GameState;
use crate::engine::types::{CastleSide, Color, MoveError, Offset, Piece, PieceType, Square};

// =========================================================================
// Verdict
// =========================================================================

/// An accepted move together with the side effects committing it will have.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub piece: Piece,
    pub from: Square,
    pub to: Square,
    /// Square of the piece this move removes (`to`, or the en-passant victim).
    pub captures: Option<Square>,
    pub en_passant: bool,
    pub double_step: bool,
    pub promotes: bool,
    pub castle: Option<CastleSide>,
    /// The enemy king is attacked in the simulated position.
    pub gives_check: bool,
}

// =========================================================================
// Public API
// =========================================================================

/// Decide whether the piece on `from` may move to `to`.
///
/// The board is mutated only inside a scoped simulation and is identical to
/// its input when this returns, whatever the outcome.
pub fn check_move(
    board: &mut Board,
    state: &GameState,
    from: Square,
    to: Square,
) -> Result<Verdict, MoveError> {
    let piece = board
        .get(from)
        .ok_or(MoveError::NoPieceAtOrigin { square: from })?;

    let pre_move = pre_move_attacks(piece, board, state);
    let offset = Offset::between(from, to);
    if !candidate_offsets(piece, from, board, state, pre_move.as_ref()).contains(&offset) {
        return Err(MoveError::InvalidMoveShape { from, to });
    }

    verify(board, state, piece, from, to)
}

/// Every square the piece on `from` may legally move to (empty if `from` is empty).
///
/// The pre-move attack map needed for castling is built once and shared by
/// all candidates.
pub fn legal_destinations(board: &mut Board, state: &GameState, from: Square) -> Vec<Square> {
    let Some(piece) = board.get(from) else {
        return Vec::new();
    };
    let pre_move = pre_move_attacks(piece, board, state);
    candidate_offsets(piece, from, board, state, pre_move.as_ref())
        .into_iter()
        .filter_map(|o| from.offset(o))
        .filter(|&to| verify(board, state, piece, from, to).is_ok())
        .collect()
}

/// Pseudo-legal offsets, with castling added for a king when `pre_move` is given.
pub fn candidate_offsets(
    piece: Piece,
    from: Square,
    board: &Board,
    state: &GameState,
    pre_move: Option<&AttackMap>,
) -> Vec<Offset> {
    let mut offsets = pseudo_legal_offsets(piece, from, board, state);
    if piece.kind == PieceType::King
        && let Some(attacks) = pre_move
    {
        offsets.extend(castling_offsets(piece.color, from, board, state, attacks));
    }
    offsets
}

/// Castling offsets open to a `color` king on `from`.
///
/// Each side requires: king and that rook unmoved, the rook still on its
/// corner, every square between them empty, and no square the king stands
/// on or crosses (destination included) attacked in `attacks`.
pub fn castling_offsets(
    color: Color,
    from: Square,
    board: &Board,
    state: &GameState,
    attacks: &AttackMap,
) -> Vec<Offset> {
    let home = Square::from_file_rank(4, color.back_rank());
    if from != home {
        return Vec::new();
    }
    let rights = state.castling_rights(color);

    CastleSide::BOTH
        .into_iter()
        .filter(|&side| {
            if !rights.can_castle(side) {
                return false;
            }
            let rook_sq = Square::from_file_rank(side.rook_file(), home.rank());
            if !board
                .get(rook_sq)
                .is_some_and(|p| p.is(color, PieceType::Rook))
            {
                return false;
            }
            if !board.is_rank_clear(home, rook_sq) {
                return false;
            }
            let step = single(MoveKind::Castle(side)).d_file.signum();
            (0..=2).all(|i| {
                Square::at(home.rank() as i8, home.file() as i8 + step * i)
                    .is_some_and(|sq| !attacks.is_attacked(sq, !color))
            })
        })
        .map(|side| single(MoveKind::Castle(side)))
        .collect()
}

// =========================================================================
// Internals
// =========================================================================

fn pre_move_attacks(piece: Piece, board: &Board, state: &GameState) -> Option<AttackMap> {
    (piece.kind == PieceType::King).then(|| AttackMap::build(board, state))
}

/// Steps 3–6 for a move whose shape is already known to be valid.
fn verify(
    board: &mut Board,
    state: &GameState,
    piece: Piece,
    from: Square,
    to: Square,
) -> Result<Verdict, MoveError> {
    let target = board.get(to);
    // Kings are never captured; their square only shows up in attack maps.
    if target.is_some_and(|p| p.kind == PieceType::King) {
        return Err(MoveError::InvalidMoveShape { from, to });
    }

    let is_pawn = piece.kind == PieceType::Pawn;
    let en_passant = is_pawn && from.file() != to.file() && target.is_none();
    let lifted = if en_passant {
        state.en_passant.map(|ep| ep.pawn_square)
    } else {
        None
    };

    let (safe, gives_check) = {
        let sim = board
            .simulate(from, to, lifted)
            .ok_or(MoveError::NoPieceAtOrigin { square: from })?;
        let attacks = AttackMap::build(&sim, state);
        let own_king = if piece.kind == PieceType::King {
            to
        } else {
            state.king_square(piece.color)
        };
        (
            !attacks.is_attacked(own_king, !piece.color),
            attacks.is_attacked(state.king_square(!piece.color), piece.color),
        )
    };

    if !safe {
        return Err(MoveError::SelfCheckViolation { from, to });
    }

    let d_file = to.file() as i8 - from.file() as i8;
    let castle = match (piece.kind, d_file) {
        (PieceType::King, 2) => Some(CastleSide::Short),
        (PieceType::King, -2) => Some(CastleSide::Long),
        _ => None,
    };

    Ok(Verdict {
        piece,
        from,
        to,
        captures: if en_passant { lifted } else { target.map(|_| to) },
        en_passant,
        double_step: is_pawn && from.rank().abs_diff(to.rank()) == 2,
        promotes: is_pawn && to.rank() == piece.color.promotion_rank(),
        castle,
        gives_check,
    })
}

// =========================================================================
// Tests
// =========================================================================
