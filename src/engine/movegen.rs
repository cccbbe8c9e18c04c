//! Pseudo-legal move generation.
//!
//! A piece's candidate offsets are drawn from the static tables and filtered
//! by board bounds, line of sight and occupancy. Whether the move exposes the
//! mover's own king is not considered here; castling is added by the
//! legality checker, which owns the attack-map lookups it needs.

use crate::engine::board::Board;
use crate::engine::offsets::{MoveKind, offsets, single};
use crate::engine::state::GameState;
use crate::engine::types::{Color, Offset, Piece, PieceType, Square};

// =========================================================================
// Public API
// =========================================================================

/// Offsets `piece` standing on `from` may move by, ignoring king safety.
///
/// Off-board destinations are dropped silently; a piece with nowhere to go
/// yields an empty list.
pub fn pseudo_legal_offsets(
    piece: Piece,
    from: Square,
    board: &Board,
    state: &GameState,
) -> Vec<Offset> {
    match MoveKind::for_piece(piece.kind) {
        None => pawn_offsets(piece.color, from, board, state),
        Some(table) => offsets(table)
            .iter()
            .copied()
            .filter(|&o| is_reachable(piece, from, o, board))
            .collect(),
    }
}

/// The en-passant capture available to a `color` pawn on `from`, if any.
///
/// The capture direction is chosen by comparing the capturer's file with the
/// double-stepped pawn's file.
pub fn en_passant_capture(
    color: Color,
    from: Square,
    board: &Board,
    state: &GameState,
) -> Option<Offset> {
    let ep = state.en_passant?;
    if !ep.is_eligible(from) {
        return None;
    }
    let victim = board.get(ep.pawn_square)?;
    if victim.kind != PieceType::Pawn || victim.color == color {
        return None;
    }

    let toward_higher_file = from.file() < ep.pawn_square.file();
    let kind = match (color, toward_higher_file) {
        (Color::White, true) | (Color::Black, false) => MoveKind::PawnCaptureRight(color),
        (Color::White, false) | (Color::Black, true) => MoveKind::PawnCaptureLeft(color),
    };
    let offset = single(kind);
    let to = from.offset(offset)?;
    (!board.is_occupied(to)).then_some(offset)
}

// =========================================================================
// Table-driven pieces
// =========================================================================

fn is_reachable(piece: Piece, from: Square, offset: Offset, board: &Board) -> bool {
    let Some(to) = from.offset(offset) else {
        return false;
    };
    if piece.kind.is_slider()
        && !(board.is_rank_clear(from, to)
            && board.is_file_clear(from, to)
            && board.is_diagonal_clear(from, to))
    {
        return false;
    }
    board.get(to).is_none_or(|target| target.color != piece.color)
}

// =========================================================================
// Pawns
// =========================================================================

fn pawn_offsets(color: Color, from: Square, board: &Board, state: &GameState) -> Vec<Offset> {
    let mut moves = Vec::with_capacity(4);

    // --- Forward steps: never onto an occupied square ---
    let push = single(MoveKind::PawnPush(color));
    if let Some(one) = from.offset(push)
        && !board.is_occupied(one)
    {
        moves.push(push);

        let double = single(MoveKind::PawnDoublePush(color));
        if from.rank() == color.pawn_rank()
            && let Some(two) = from.offset(double)
            && !board.is_occupied(two)
        {
            moves.push(double);
        }
    }

    // --- Diagonal captures: only onto an enemy piece ---
    for kind in [
        MoveKind::PawnCaptureLeft(color),
        MoveKind::PawnCaptureRight(color),
    ] {
        let capture = single(kind);
        if let Some(to) = from.offset(capture)
            && board.get(to).is_some_and(|p| p.color != color)
        {
            moves.push(capture);
        }
    }

    // --- En passant ---
    if let Some(capture) = en_passant_capture(color, from, board, state)
        && !moves.contains(&capture)
    {
        moves.push(capture);
    }

    moves
}

// =========================================================================
// Tests
// =========================================================================
