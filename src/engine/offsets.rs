//! Static displacement tables: the vocabulary of all move generation.
//!
//! Tables are built once (via `OnceLock`) and live for the lifetime of the
//! process. Every entry is a raw shape: board bounds, blocking and captures
//! are the move generator's business.

use std::sync::OnceLock;

use crate::engine::types::{CastleSide, Color, Offset, PieceType};

// =========================================================================
// Public API
// =========================================================================

/// Key for one offset table: piece kind, colour where it matters, and move category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveKind {
    PawnPush(Color),
    PawnDoublePush(Color),
    /// Diagonal capture towards the capturing side's left hand.
    PawnCaptureLeft(Color),
    /// Diagonal capture towards the capturing side's right hand.
    PawnCaptureRight(Color),
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
    Castle(CastleSide),
}

impl MoveKind {
    /// Table for a non-pawn piece's ordinary moves (castling excluded).
    pub fn for_piece(kind: PieceType) -> Option<MoveKind> {
        match kind {
            PieceType::Pawn => None,
            PieceType::Knight => Some(MoveKind::Knight),
            PieceType::Bishop => Some(MoveKind::Bishop),
            PieceType::Rook => Some(MoveKind::Rook),
            PieceType::Queen => Some(MoveKind::Queen),
            PieceType::King => Some(MoveKind::King),
        }
    }
}

/// The offsets registered under `kind`.
pub fn offsets(kind: MoveKind) -> &'static [Offset] {
    let t = tables();
    match kind {
        MoveKind::PawnPush(c) => &t.pawn_push[c.index()],
        MoveKind::PawnDoublePush(c) => &t.pawn_double[c.index()],
        MoveKind::PawnCaptureLeft(c) => &t.pawn_capture_left[c.index()],
        MoveKind::PawnCaptureRight(c) => &t.pawn_capture_right[c.index()],
        MoveKind::Rook => &t.rook,
        MoveKind::Knight => &t.knight,
        MoveKind::Bishop => &t.bishop,
        MoveKind::Queen => &t.queen,
        MoveKind::King => &t.king,
        MoveKind::Castle(CastleSide::Short) => &t.short_castle,
        MoveKind::Castle(CastleSide::Long) => &t.long_castle,
    }
}

/// The single offset of a one-entry table (pawn steps, castling).
#[inline]
pub fn single(kind: MoveKind) -> Offset {
    offsets(kind)[0]
}

// =========================================================================
// Tables
// =========================================================================

/// Get a reference to the global offset tables.
fn tables() -> &'static OffsetTables {
    static TABLES: OnceLock<OffsetTables> = OnceLock::new();
    TABLES.get_or_init(OffsetTables::init)
}

struct OffsetTables {
    /// Indexed by `Color::index()`.
    pawn_push: [[Offset; 1]; 2],
    pawn_double: [[Offset; 1]; 2],
    pawn_capture_left: [[Offset; 1]; 2],
    pawn_capture_right: [[Offset; 1]; 2],
    rook: [Offset; 28],
    knight: [Offset; 8],
    bishop: [Offset; 28],
    queen: [Offset; 56],
    king: [Offset; 8],
    short_castle: [Offset; 1],
    long_castle: [Offset; 1],
}

impl OffsetTables {
    fn init() -> Self {
        let rook = ray_table(&ROOK_DIRECTIONS);
        let bishop = ray_table(&BISHOP_DIRECTIONS);

        let mut queen = [Offset::new(0, 0); 56];
        queen[..28].copy_from_slice(&rook);
        queen[28..].copy_from_slice(&bishop);

        // Left and right are seen from the mover's side of the board, so the
        // black tables mirror the white ones in both axes.
        OffsetTables {
            pawn_push: [[Offset::new(1, 0)], [Offset::new(-1, 0)]],
            pawn_double: [[Offset::new(2, 0)], [Offset::new(-2, 0)]],
            pawn_capture_left: [[Offset::new(1, -1)], [Offset::new(-1, 1)]],
            pawn_capture_right: [[Offset::new(1, 1)], [Offset::new(-1, -1)]],
            rook,
            knight: KNIGHT,
            bishop,
            queen,
            king: KING,
            short_castle: [Offset::new(0, 2)],
            long_castle: [Offset::new(0, -2)],
        }
    }
}

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

const KNIGHT: [Offset; 8] = [
    Offset::new(-2, -1),
    Offset::new(-2, 1),
    Offset::new(-1, -2),
    Offset::new(-1, 2),
    Offset::new(1, -2),
    Offset::new(1, 2),
    Offset::new(2, -1),
    Offset::new(2, 1),
];

const KING: [Offset; 8] = [
    Offset::new(-1, -1),
    Offset::new(-1, 0),
    Offset::new(-1, 1),
    Offset::new(0, -1),
    Offset::new(0, 1),
    Offset::new(1, -1),
    Offset::new(1, 0),
    Offset::new(1, 1),
];

/// Every distance 1..=7 along each of four directions.
fn ray_table(directions: &[(i8, i8); 4]) -> [Offset; 28] {
    let mut table = [Offset::new(0, 0); 28];
    let mut i = 0;
    for &(dr, df) in directions {
        for distance in 1..=7 {
            table[i] = Offset::new(dr * distance, df * distance);
            i += 1;
        }
    }
    table
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_sizes() {
        assert_eq!(offsets(MoveKind::Rook).len(), 28);
        assert_eq!(offsets(MoveKind::Bishop).len(), 28);
        assert_eq!(offsets(MoveKind::Queen).len(), 56);
        assert_eq!(offsets(MoveKind::Knight).len(), 8);
        assert_eq!(offsets(MoveKind::King).len(), 8);
    }

    #[test]
    fn no_table_contains_null_or_duplicate_offsets() {
        for kind in [
            MoveKind::Rook,
            MoveKind::Bishop,
            MoveKind::Queen,
            MoveKind::Knight,
            MoveKind::King,
        ] {
            let table = offsets(kind);
            let unique: HashSet<_> = table.iter().collect();
            assert_eq!(unique.len(), table.len(), "{kind:?} has duplicates");
            assert!(!table.contains(&Offset::new(0, 0)));
        }
    }

    #[test]
    fn rook_and_bishop_shapes() {
        for o in offsets(MoveKind::Rook) {
            assert!(o.d_rank == 0 || o.d_file == 0);
        }
        for o in offsets(MoveKind::Bishop) {
            assert_eq!(o.d_rank.abs(), o.d_file.abs());
        }
        for o in offsets(MoveKind::Knight) {
            assert_eq!(o.d_rank.abs() * o.d_file.abs(), 2);
        }
    }

    #[test]
    fn pawn_tables_mirror_by_colour() {
        for (white, black) in [
            (MoveKind::PawnPush(Color::White), MoveKind::PawnPush(Color::Black)),
            (
                MoveKind::PawnDoublePush(Color::White),
                MoveKind::PawnDoublePush(Color::Black),
            ),
            (
                MoveKind::PawnCaptureLeft(Color::White),
                MoveKind::PawnCaptureLeft(Color::Black),
            ),
            (
                MoveKind::PawnCaptureRight(Color::White),
                MoveKind::PawnCaptureRight(Color::Black),
            ),
        ] {
            let w = single(white);
            let b = single(black);
            assert_eq!((w.d_rank, w.d_file), (-b.d_rank, -b.d_file));
        }
        assert_eq!(single(MoveKind::PawnPush(Color::White)), Offset::new(1, 0));
        assert_eq!(
            single(MoveKind::PawnCaptureLeft(Color::White)),
            Offset::new(1, -1)
        );
    }

    #[test]
    fn castling_offsets() {
        assert_eq!(single(MoveKind::Castle(CastleSide::Short)), Offset::new(0, 2));
        assert_eq!(single(MoveKind::Castle(CastleSide::Long)), Offset::new(0, -2));
    }

    #[test]
    fn for_piece_covers_everything_but_pawns() {
        assert_eq!(MoveKind::for_piece(PieceType::Pawn), None);
        assert_eq!(MoveKind::for_piece(PieceType::Queen), Some(MoveKind::Queen));
        assert_eq!(MoveKind::for_piece(PieceType::King), Some(MoveKind::King));
    }
}
